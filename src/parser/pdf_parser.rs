//! PDF page parser using lopdf.

use std::collections::HashSet;
use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId, Stream};

use crate::detect::{pdf_version, DocumentFormat};
use crate::engine::{ProvenanceMatcher, DEFAULT_MAX_GROUP_DEPTH, DEFAULT_TARGET_DOMAIN};
use crate::error::{Error, Result};
use crate::model::{
    Canvas, CanvasUnit, Container, ContainerKind, Document, ElementId, Geometry, LinkTarget,
    NodeAnchor, VisualElement,
};

use super::matrix::{number, Matrix};
use super::Package;

/// Bound on `/Parent` hops when looking up inherited page attributes.
const MAX_INHERITANCE: usize = 64;

/// Bounding box in PDF user space: `(x0, y0, x1, y1)`.
type Rect = (f64, f64, f64, f64);

/// PDF document parser.
pub struct PdfParser {
    doc: LopdfDocument,
    version: String,
    max_depth: usize,
    provenance: ProvenanceMatcher,
}

impl PdfParser {
    /// Open a PDF file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_bytes(&data)
    }

    /// Parse a PDF from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let version = pdf_version(data)?;
        let doc = LopdfDocument::load_mem(data)?;

        if doc.is_encrypted() {
            return Err(Error::Encrypted);
        }

        Ok(Self {
            doc,
            version,
            max_depth: DEFAULT_MAX_GROUP_DEPTH,
            provenance: ProvenanceMatcher::new(DEFAULT_TARGET_DOMAIN),
        })
    }

    /// Limit how deep nested form XObjects are expanded.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Domain used to pick a picture's link among overlapping annotations
    /// and to decide which of them go with it on removal.
    pub fn with_provenance(mut self, provenance: ProvenanceMatcher) -> Self {
        self.provenance = provenance;
        self
    }

    /// Get the number of pages.
    pub fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    /// Get PDF version from the header.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Build the page model.
    ///
    /// A page whose content stream cannot be decoded fails the whole parse.
    pub fn parse(self) -> Result<PdfPackage> {
        let mut model = Document::new(DocumentFormat::Pdf, CanvasUnit::Point, Canvas::empty());
        let mut pages = Vec::new();
        let mut next_id = 0u32;

        for (page_num, page_id) in self.doc.get_pages() {
            let name = format!("Page{}", page_num);
            let media = self
                .inherited(page_id, b"MediaBox")
                .and_then(|o| self.resolve(o))
                .and_then(rect_of)
                .map(MediaBox::from_rect)
                .unwrap_or(MediaBox::LETTER);

            let operations = self
                .doc
                .get_page_content(page_id)
                .and_then(|data| Content::decode(&data))
                .map(|content| content.operations)
                .map_err(|e| Error::ContainerAccess {
                    container: name.clone(),
                    reason: e.to_string(),
                })?;

            let (annots, links) = self.page_annotations(page_id);
            let resources = self
                .inherited(page_id, b"Resources")
                .and_then(|o| self.resolve_dict(o));

            let mut scan = Scan {
                media,
                links: &links,
                provenance: &self.provenance,
                next_id,
                visited: Vec::new(),
            };
            let mut container = Container::new(ContainerKind::Page, name, pages.len())
                .with_canvas(media.canvas());
            let mut draws = Vec::new();

            for placement in placements(&operations, Matrix::IDENTITY) {
                let (element, companions) =
                    self.build_element(&mut scan, &placement.name, placement.ctm, resources, 0);
                draws.push((placement.index, companions.clone()));
                container.add_element(element.with_anchor(NodeAnchor::ContentOperation {
                    index: placement.index,
                    annotations: companions,
                }));
            }
            next_id = scan.next_id;

            log::debug!(
                "{}: {} placements, {} link annotations",
                container.name,
                container.element_count(),
                links.len()
            );
            if model.is_empty() {
                model.canvas = media.canvas();
            }
            model.add_container(container);
            pages.push(PageSource {
                id: page_id,
                operations,
                annots,
                draws,
                rewritten: None,
            });
        }

        Ok(PdfPackage {
            doc: self.doc,
            version: self.version,
            model,
            pages,
        })
    }

    fn build_element<'a>(
        &'a self,
        scan: &mut Scan<'_>,
        name: &str,
        ctm: Matrix,
        resources: Option<&'a Dictionary>,
        depth: usize,
    ) -> (VisualElement, Vec<usize>) {
        let id = scan.allocate();
        let Some((object_id, stream)) = self.xobject(resources, name.as_bytes()) else {
            log::debug!("XObject /{} not found in resources", name);
            let geometry = scan.media.geometry(ctm.unit_square_bounds());
            return (VisualElement::other(id, name, geometry), Vec::new());
        };

        match stream.dict.get(b"Subtype").and_then(|o| o.as_name_str()) {
            Ok("Image") => {
                let bounds = ctm.unit_square_bounds();
                let (link, companions) = scan.link_for(bounds);
                let geometry = scan.media.geometry(bounds);
                (VisualElement::picture(id, name, geometry, link), companions)
            }
            Ok("Form") => {
                let form_ctm = form_matrix(stream).then(&ctm);
                let bounds = match stream.dict.get(b"BBox").ok().and_then(rect_of) {
                    Some(bbox) => form_ctm.rect_bounds(bbox),
                    None => ctm.unit_square_bounds(),
                };
                let children =
                    self.form_children(scan, object_id, stream, form_ctm, resources, depth + 1);
                let geometry = scan.media.geometry(bounds);
                (VisualElement::group(id, name, geometry, children), Vec::new())
            }
            _ => {
                let geometry = scan.media.geometry(ctm.unit_square_bounds());
                (VisualElement::other(id, name, geometry), Vec::new())
            }
        }
    }

    fn form_children<'a>(
        &'a self,
        scan: &mut Scan<'_>,
        object_id: Option<ObjectId>,
        stream: &'a Stream,
        ctm: Matrix,
        inherited: Option<&'a Dictionary>,
        depth: usize,
    ) -> Vec<VisualElement> {
        if depth > self.max_depth {
            log::warn!("form nesting deeper than {}; contents not read", self.max_depth);
            return Vec::new();
        }
        if let Some(id) = object_id {
            if scan.visited.contains(&id) {
                log::warn!("form XObject {:?} draws itself; contents not read", id);
                return Vec::new();
            }
        }

        let data = stream
            .decompressed_content()
            .unwrap_or_else(|_| stream.content.clone());
        let content = match Content::decode(&data) {
            Ok(content) => content,
            Err(e) => {
                log::warn!("form XObject content unreadable: {}", e);
                return Vec::new();
            }
        };
        let resources = stream
            .dict
            .get(b"Resources")
            .ok()
            .and_then(|o| self.resolve_dict(o))
            .or(inherited);

        if let Some(id) = object_id {
            scan.visited.push(id);
        }
        let children = placements(&content.operations, ctm)
            .into_iter()
            .map(|p| {
                let (element, _) = self.build_element(scan, &p.name, p.ctm, resources, depth);
                element.with_anchor(NodeAnchor::Nested)
            })
            .collect();
        if object_id.is_some() {
            scan.visited.pop();
        }
        children
    }

    /// Look up an attribute on the page or the nearest ancestor that has it.
    fn inherited(&self, page_id: ObjectId, key: &[u8]) -> Option<&Object> {
        let mut dict = self.doc.get_dictionary(page_id).ok()?;
        for _ in 0..MAX_INHERITANCE {
            if let Ok(value) = dict.get(key) {
                return Some(value);
            }
            let parent = dict.get(b"Parent").ok()?.as_reference().ok()?;
            dict = self.doc.get_dictionary(parent).ok()?;
        }
        None
    }

    fn resolve<'a>(&'a self, obj: &'a Object) -> Option<&'a Object> {
        match obj {
            Object::Reference(id) => self.doc.get_object(*id).ok(),
            other => Some(other),
        }
    }

    fn resolve_dict<'a>(&'a self, obj: &'a Object) -> Option<&'a Dictionary> {
        match self.resolve(obj)? {
            Object::Dictionary(dict) => Some(dict),
            Object::Stream(stream) => Some(&stream.dict),
            _ => None,
        }
    }

    fn xobject<'a>(
        &'a self,
        resources: Option<&'a Dictionary>,
        name: &[u8],
    ) -> Option<(Option<ObjectId>, &'a Stream)> {
        let xobjects = self.resolve_dict(resources?.get(b"XObject").ok()?)?;
        let entry = xobjects.get(name).ok()?;
        match self.resolve(entry)? {
            Object::Stream(stream) => Some((entry.as_reference().ok(), stream)),
            _ => None,
        }
    }

    /// The page's `/Annots` entries and the link annotations among them.
    fn page_annotations(&self, page_id: ObjectId) -> (Vec<Object>, Vec<LinkAnnotation>) {
        let entries = self
            .doc
            .get_dictionary(page_id)
            .ok()
            .and_then(|page| page.get(b"Annots").ok())
            .and_then(|o| self.resolve(o))
            .and_then(|o| o.as_array().ok());

        match entries {
            Some(entries) => {
                let links = entries
                    .iter()
                    .enumerate()
                    .filter_map(|(index, entry)| self.link_annotation(index, entry))
                    .collect();
                (entries.clone(), links)
            }
            None => (Vec::new(), Vec::new()),
        }
    }

    fn link_annotation(&self, index: usize, entry: &Object) -> Option<LinkAnnotation> {
        let dict = self.resolve_dict(entry)?;
        if dict.get(b"Subtype").and_then(|o| o.as_name_str()).ok()? != "Link" {
            return None;
        }
        let rect = dict
            .get(b"Rect")
            .ok()
            .and_then(|o| self.resolve(o))
            .and_then(rect_of)?;

        let target = match dict.get(b"A") {
            // A /Dest jump stays inside the document.
            Err(_) => AnnotTarget::Internal,
            Ok(action) => match self.resolve_dict(action) {
                None => AnnotTarget::Broken("link action unreadable".into()),
                Some(action) => match action.get(b"S").and_then(|o| o.as_name_str()) {
                    Ok("URI") => match action.get(b"URI").ok().and_then(|o| self.resolve(o)) {
                        Some(Object::String(bytes, _)) => {
                            AnnotTarget::Uri(String::from_utf8_lossy(bytes).into_owned())
                        }
                        _ => AnnotTarget::Broken("URI action without a URI string".into()),
                    },
                    _ => AnnotTarget::Internal,
                },
            },
        };

        Some(LinkAnnotation {
            index,
            rect,
            target,
        })
    }
}

/// Page media box, normalized so that `x0 <= x1` and `y0 <= y1`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct MediaBox {
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
}

impl MediaBox {
    /// US Letter, used when no media box is present.
    const LETTER: MediaBox = MediaBox {
        x0: 0.0,
        y0: 0.0,
        x1: 612.0,
        y1: 792.0,
    };

    fn from_rect((x0, y0, x1, y1): Rect) -> Self {
        Self { x0, y0, x1, y1 }
    }

    fn canvas(&self) -> Canvas {
        Canvas::new(self.x1 - self.x0, self.y1 - self.y0)
    }

    /// Convert a user-space box to top-left-origin geometry.
    fn geometry(&self, (x0, y0, x1, y1): Rect) -> Geometry {
        Geometry::new(x0 - self.x0, self.y1 - y1, x1 - x0, y1 - y0)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum AnnotTarget {
    Uri(String),
    Internal,
    Broken(String),
}

#[derive(Debug, Clone)]
struct LinkAnnotation {
    /// Position in the page's `/Annots` array
    index: usize,
    rect: Rect,
    target: AnnotTarget,
}

/// Per-page parse state.
struct Scan<'l> {
    media: MediaBox,
    links: &'l [LinkAnnotation],
    provenance: &'l ProvenanceMatcher,
    next_id: u32,
    /// Form XObjects on the current expansion path
    visited: Vec<ObjectId>,
}

impl Scan<'_> {
    fn allocate(&mut self) -> ElementId {
        let id = ElementId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Link provenance and companion annotations for a placed image.
    ///
    /// Among overlapping URI links, one pointing at the target domain wins,
    /// then the one with the smallest rectangle. Only target-domain links
    /// are companions; internal jumps and other sites stay on the page.
    fn link_for(&self, bounds: Rect) -> (LinkTarget, Vec<usize>) {
        let hits: Vec<&LinkAnnotation> = self
            .links
            .iter()
            .filter(|l| overlaps(l.rect, bounds))
            .collect();
        let uris: Vec<(&LinkAnnotation, &str)> = hits
            .iter()
            .filter_map(|l| match &l.target {
                AnnotTarget::Uri(uri) => Some((*l, uri.as_str())),
                _ => None,
            })
            .collect();

        let chosen = uris
            .iter()
            .find(|(_, uri)| self.provenance.matches(uri))
            .or_else(|| {
                uris.iter()
                    .min_by(|(a, _), (b, _)| area(a.rect).total_cmp(&area(b.rect)))
            });
        let target = match chosen {
            Some((_, uri)) => LinkTarget::Uri(uri.to_string()),
            None => hits
                .iter()
                .find_map(|l| match &l.target {
                    AnnotTarget::Broken(reason) => Some(LinkTarget::Unresolved(reason.clone())),
                    _ => None,
                })
                .unwrap_or_default(),
        };

        let companions = uris
            .iter()
            .filter(|(_, uri)| self.provenance.matches(uri))
            .map(|(l, _)| l.index)
            .collect();
        (target, companions)
    }
}

/// An XObject drawn by a `Do` operator.
#[derive(Debug, Clone, PartialEq)]
struct Placement {
    /// Index of the `Do` operator in its content stream
    index: usize,
    name: String,
    ctm: Matrix,
}

/// Track the CTM through `q`/`Q`/`cm` and collect every `Do`.
fn placements(operations: &[Operation], base: Matrix) -> Vec<Placement> {
    let mut ctm = base;
    let mut saved = Vec::new();
    let mut found = Vec::new();

    for (index, op) in operations.iter().enumerate() {
        match op.operator.as_str() {
            "q" => saved.push(ctm),
            "Q" => {
                if let Some(m) = saved.pop() {
                    ctm = m;
                }
            }
            "cm" => {
                if let Some(m) = Matrix::from_operands(&op.operands) {
                    ctm = m.then(&ctm);
                }
            }
            "Do" => {
                if let Some(name) = op.operands.first().and_then(|o| o.as_name().ok()) {
                    found.push(Placement {
                        index,
                        name: String::from_utf8_lossy(name).into_owned(),
                        ctm,
                    });
                }
            }
            _ => {}
        }
    }
    found
}

fn form_matrix(stream: &Stream) -> Matrix {
    stream
        .dict
        .get(b"Matrix")
        .ok()
        .and_then(|o| o.as_array().ok())
        .and_then(|a| Matrix::from_operands(a))
        .unwrap_or_default()
}

/// A normalized rectangle from a four-number array.
fn rect_of(obj: &Object) -> Option<Rect> {
    let values = obj.as_array().ok()?;
    if values.len() != 4 {
        return None;
    }
    let (a, b, c, d) = (
        number(&values[0])?,
        number(&values[1])?,
        number(&values[2])?,
        number(&values[3])?,
    );
    Some((a.min(c), b.min(d), a.max(c), b.max(d)))
}

fn area((x0, y0, x1, y1): Rect) -> f64 {
    (x1 - x0) * (y1 - y0)
}

/// Whether two rectangles intersect with positive area.
fn overlaps(a: Rect, b: Rect) -> bool {
    a.0 < b.2 && b.0 < a.2 && a.1 < b.3 && b.1 < a.3
}

/// Original state of one page, kept for serialization.
struct PageSource {
    id: ObjectId,
    operations: Vec<Operation>,
    annots: Vec<Object>,
    /// Top-level `Do` operators and their companion annotations
    draws: Vec<(usize, Vec<usize>)>,
    /// Content stream written by an earlier serialization
    rewritten: Option<ObjectId>,
}

/// A parsed PDF ready for cleaning and saving.
pub struct PdfPackage {
    doc: LopdfDocument,
    version: String,
    model: Document,
    pages: Vec<PageSource>,
}

impl PdfPackage {
    /// PDF version from the header.
    pub fn version(&self) -> &str {
        &self.version
    }
}

impl Package for PdfPackage {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Pdf
    }

    fn document(&self) -> &Document {
        &self.model
    }

    fn document_mut(&mut self) -> &mut Document {
        &mut self.model
    }

    fn serialize(&mut self) -> Result<Vec<u8>> {
        for (container, page) in self.model.containers.iter().zip(self.pages.iter_mut()) {
            let surviving: HashSet<usize> = container
                .elements
                .iter()
                .filter_map(|e| match &e.anchor {
                    NodeAnchor::ContentOperation { index, .. } => Some(*index),
                    _ => None,
                })
                .collect();
            let removed: Vec<&(usize, Vec<usize>)> = page
                .draws
                .iter()
                .filter(|(index, _)| !surviving.contains(index))
                .collect();
            if removed.is_empty() {
                continue;
            }

            let dropped_ops: HashSet<usize> = removed.iter().map(|(index, _)| *index).collect();
            let dropped_annots: HashSet<usize> = removed
                .iter()
                .flat_map(|(_, annots)| annots.iter().copied())
                .collect();

            let operations: Vec<Operation> = page
                .operations
                .iter()
                .enumerate()
                .filter(|(i, _)| !dropped_ops.contains(i))
                .map(|(_, op)| op.clone())
                .collect();
            let data = Content { operations }
                .encode()
                .map_err(|e| Error::Serialization(format!("{}: {}", container.name, e)))?;

            let mut stream = Stream::new(Dictionary::new(), data);
            if let Err(e) = stream.compress() {
                log::warn!("{}: content left uncompressed: {}", container.name, e);
            }
            let stream_id = match page.rewritten {
                Some(id) => {
                    self.doc.objects.insert(id, Object::Stream(stream));
                    id
                }
                None => self.doc.add_object(stream),
            };
            page.rewritten = Some(stream_id);

            let kept_annots: Vec<Object> = page
                .annots
                .iter()
                .enumerate()
                .filter(|(i, _)| !dropped_annots.contains(i))
                .map(|(_, a)| a.clone())
                .collect();

            let dict = self
                .doc
                .get_dictionary_mut(page.id)
                .map_err(|e| Error::Serialization(format!("{}: {}", container.name, e)))?;
            dict.set("Contents", Object::Reference(stream_id));
            if !dropped_annots.is_empty() {
                if kept_annots.is_empty() {
                    dict.remove(b"Annots");
                } else {
                    dict.set("Annots", Object::Array(kept_annots));
                }
            }

            log::debug!(
                "{}: dropped {} placements and {} annotations",
                container.name,
                dropped_ops.len(),
                dropped_annots.len()
            );
        }

        // Saving appends a fresh xref object, so save a copy.
        let mut buffer = Vec::new();
        self.doc
            .clone()
            .save_to(&mut buffer)
            .map_err(|e| Error::Serialization(e.to_string()))?;
        Ok(buffer)
    }
}
