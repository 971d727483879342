//! Presentation (OOXML) parser using zip and quick-xml.
//!
//! Only slide masters and slide layouts are read; slides themselves are
//! never touched. Each top-level shape of a master or layout keeps the byte
//! span of its XML so that removal can splice it out while every other
//! byte of the part, and every other archive entry, stays as it was.

use std::collections::{HashMap, HashSet};
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::detect::DocumentFormat;
use crate::error::{Error, Result};
use crate::model::{
    Canvas, CanvasUnit, Container, ContainerKind, Document, ElementId, ElementKind, Geometry,
    LinkTarget, NodeAnchor, VisualElement,
};

use super::rels::{part_rels_path, resolve_part_target, Relationships};
use super::Package;

const DEFAULT_MAIN_PART: &str = "ppt/presentation.xml";
const OFFICE_DOCUMENT_REL: &str = "/officeDocument";

/// Presentation parser.
pub struct PptxParser {
    data: Vec<u8>,
}

impl PptxParser {
    /// Open a presentation file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_bytes(&data)
    }

    /// Parse a presentation from bytes. The archive must be readable.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        ZipArchive::new(Cursor::new(data))?;
        Ok(Self {
            data: data.to_vec(),
        })
    }

    /// Build the master/layout model.
    ///
    /// A missing or malformed main presentation part fails the parse; a
    /// missing or malformed master or layout becomes a faulted container.
    pub fn parse(self) -> Result<PptxPackage> {
        let mut archive = ZipArchive::new(Cursor::new(self.data.as_slice()))?;
        let main_part = main_part(&mut archive)?;

        let presentation = read_part(&mut archive, &main_part)?
            .ok_or_else(|| Error::Parse(format!("{} is missing", main_part)))?;
        let presentation = std::str::from_utf8(&presentation)
            .map_err(|e| Error::Parse(format!("{}: {}", main_part, e)))?;
        let (canvas, master_ids) = scan_presentation(presentation)?;

        let main_rels = read_part(&mut archive, &part_rels_path(&main_part))?
            .ok_or_else(|| Error::Parse(format!("{} has no relationships part", main_part)))?;
        let main_rels = Relationships::parse(&main_rels)?;

        if !canvas.is_usable() {
            log::warn!("presentation has no usable slide size; nothing will be classified");
        }

        let mut loader = Loader {
            archive,
            next_id: 0,
            seen: HashSet::new(),
        };
        let mut model = Document::new(DocumentFormat::Pptx, CanvasUnit::Emu, canvas);
        let mut parts = Vec::new();

        for (m, rid) in master_ids.iter().enumerate() {
            let default_name = format!("SlideMaster{}", m + 1);
            let master_path = model.containers.len();
            let part = match main_rels.get(rid) {
                Some(rel) if !rel.external => resolve_part_target(&main_part, &rel.target),
                _ => {
                    model.add_container(Container::faulted(
                        ContainerKind::SlideMaster,
                        default_name,
                        m,
                        format!("relationship {} not found", rid),
                    ));
                    continue;
                }
            };

            let scanned = match loader.load(&part) {
                Ok(Some(scanned)) => scanned,
                Ok(None) => continue,
                Err(reason) => {
                    model.add_container(Container::faulted(
                        ContainerKind::SlideMaster,
                        default_name,
                        m,
                        reason,
                    ));
                    continue;
                }
            };

            let mut master = Container::new(
                ContainerKind::SlideMaster,
                scanned.name.clone().unwrap_or(default_name),
                m,
            );
            for (l, layout_rid) in scanned.id_list.iter().enumerate() {
                let default_name = format!("Layout{}", l + 1);
                let layout_path = vec![master_path, master.children.len()];
                let layout_part = match scanned.rels.as_ref().ok().and_then(|r| r.get(layout_rid)) {
                    Some(rel) if !rel.external => resolve_part_target(&part, &rel.target),
                    _ => {
                        master.add_child(Container::faulted(
                            ContainerKind::SlideLayout,
                            default_name,
                            l,
                            format!("relationship {} not found", layout_rid),
                        ));
                        continue;
                    }
                };

                match loader.load(&layout_part) {
                    Ok(Some(layout)) => {
                        let mut container = Container::new(
                            ContainerKind::SlideLayout,
                            layout.name.clone().unwrap_or(default_name),
                            l,
                        );
                        container.elements = layout.elements;
                        parts.push(PartSource {
                            path: layout_path,
                            part: layout_part,
                            xml: layout.xml,
                            spans: layout.spans,
                        });
                        master.add_child(container);
                    }
                    Ok(None) => {}
                    Err(reason) => master.add_child(Container::faulted(
                        ContainerKind::SlideLayout,
                        default_name,
                        l,
                        reason,
                    )),
                }
            }

            master.elements = scanned.elements;
            log::debug!(
                "{}: {} elements, {} layouts",
                master.name,
                master.element_count(),
                master.children.len()
            );
            parts.push(PartSource {
                path: vec![master_path],
                part,
                xml: scanned.xml,
                spans: scanned.spans,
            });
            model.add_container(master);
        }

        drop(loader);
        Ok(PptxPackage {
            data: self.data,
            model,
            parts,
        })
    }
}

/// Locate the main presentation part through the package relationships.
fn main_part<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<String> {
    let Some(rels) = read_part(archive, "_rels/.rels")? else {
        return Ok(DEFAULT_MAIN_PART.to_string());
    };
    let rels = Relationships::parse(&rels)?;
    let target = rels
        .iter()
        .find(|rel| rel.rel_type.ends_with(OFFICE_DOCUMENT_REL))
        .map(|rel| resolve_part_target("", &rel.target));
    Ok(target.unwrap_or_else(|| DEFAULT_MAIN_PART.to_string()))
}

fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<Option<Vec<u8>>> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut data = Vec::with_capacity(file.size() as usize);
    file.read_to_end(&mut data)?;
    Ok(Some(data))
}

/// Slide size and master relationship ids from the main part.
fn scan_presentation(xml: &str) -> Result<(Canvas, Vec<String>)> {
    let mut reader = Reader::from_str(xml);
    let mut canvas = Canvas::empty();
    let mut masters = Vec::new();
    let mut root = true;

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if root => {
                if e.local_name().as_ref() != b"presentation" {
                    return Err(Error::Parse("main part is not a presentation".into()));
                }
                root = false;
            }
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"sldSz" => {
                    let cx = attr(&e, b"cx").and_then(|v| v.parse().ok());
                    let cy = attr(&e, b"cy").and_then(|v| v.parse().ok());
                    if let (Some(cx), Some(cy)) = (cx, cy) {
                        canvas = Canvas::new(cx, cy);
                    }
                }
                b"sldMasterId" => masters.extend(rel_id(&e)),
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok((canvas, masters))
}

/// Unprefixed attribute value.
fn attr(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

/// The `r:id` attribute (any prefix bound to the relationships namespace).
fn rel_id(e: &BytesStart<'_>) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.prefix().is_some() && a.key.local_name().as_ref() == b"id")
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

/// Reads master and layout parts out of the archive.
struct Loader<'d> {
    archive: ZipArchive<Cursor<&'d [u8]>>,
    next_id: u32,
    seen: HashSet<String>,
}

impl Loader<'_> {
    /// `Ok(None)` when the part was already loaded through another reference.
    fn load(&mut self, part: &str) -> std::result::Result<Option<ScannedPart>, String> {
        if !self.seen.insert(part.to_string()) {
            log::warn!("{} is referenced more than once; later reference ignored", part);
            return Ok(None);
        }

        let data = read_part(&mut self.archive, part)
            .map_err(|e| e.to_string())?
            .ok_or_else(|| format!("{} is missing", part))?;
        let xml = String::from_utf8(data).map_err(|e| format!("{}: {}", part, e))?;

        let rels = match read_part(&mut self.archive, &part_rels_path(part)) {
            Ok(Some(data)) => Relationships::parse(&data).map_err(|e| e.to_string()),
            Ok(None) => Ok(Relationships::default()),
            Err(e) => Err(e.to_string()),
        };

        let scanner = PartScanner::new(&rels, self.next_id);
        let scanned = scanner
            .scan(&xml)
            .map_err(|e| format!("{}: {}", part, e))?;
        self.next_id = scanned.next_id;

        Ok(Some(ScannedPart {
            name: scanned.name,
            elements: scanned.elements,
            spans: scanned.spans,
            id_list: scanned.id_list,
            rels,
            xml,
        }))
    }
}

/// A master or layout part after scanning.
struct ScannedPart {
    /// `<p:cSld name>`
    name: Option<String>,
    elements: Vec<VisualElement>,
    spans: Vec<(ElementId, usize, usize)>,
    /// Layout relationship ids of a master
    id_list: Vec<String>,
    rels: std::result::Result<Relationships, String>,
    xml: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameKind {
    Picture,
    Group,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum XfrmState {
    NotSeen,
    Open(usize),
    Done,
}

/// A shape whose start tag has been read but not its end tag.
struct Frame {
    id: ElementId,
    kind: FrameKind,
    depth: usize,
    start: usize,
    name: String,
    link: LinkTarget,
    text_links: Vec<String>,
    xfrm: XfrmState,
    off: Option<(f64, f64)>,
    ext: Option<(f64, f64)>,
    ch_off: Option<(f64, f64)>,
    ch_ext: Option<(f64, f64)>,
    children: Vec<VisualElement>,
}

impl Frame {
    fn finish(self, end: usize, nested: bool) -> VisualElement {
        let geometry = Geometry {
            left: self.off.map(|o| o.0),
            top: self.off.map(|o| o.1),
            width: self.ext.map(|e| e.0),
            height: self.ext.map(|e| e.1),
        };
        let kind = match self.kind {
            FrameKind::Picture => ElementKind::Picture { link: self.link },
            FrameKind::Group => {
                let mut children = self.children;
                if let (Some(off), Some(ch_off)) = (self.off, self.ch_off) {
                    let transform = ChildTransform::new(off, self.ext, ch_off, self.ch_ext);
                    transform.apply_all(&mut children);
                }
                ElementKind::Group { children }
            }
            FrameKind::Other => ElementKind::Other,
        };

        let mut element = VisualElement::new(self.id, self.name, kind, geometry);
        element.text_links = self.text_links;
        element.anchor = if nested {
            NodeAnchor::Nested
        } else {
            NodeAnchor::XmlSpan {
                start: self.start,
                end,
            }
        };
        element
    }
}

/// Maps a group's child coordinate space into its parent's.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ChildTransform {
    off: (f64, f64),
    ch_off: (f64, f64),
    scale: (f64, f64),
}

impl ChildTransform {
    fn new(
        off: (f64, f64),
        ext: Option<(f64, f64)>,
        ch_off: (f64, f64),
        ch_ext: Option<(f64, f64)>,
    ) -> Self {
        let ratio = |outer: f64, inner: f64| if inner > 0.0 { outer / inner } else { 1.0 };
        let scale = match (ext, ch_ext) {
            (Some(ext), Some(ch_ext)) => (ratio(ext.0, ch_ext.0), ratio(ext.1, ch_ext.1)),
            _ => (1.0, 1.0),
        };
        Self { off, ch_off, scale }
    }

    fn apply(&self, g: Geometry) -> Geometry {
        Geometry {
            left: g.left.map(|x| self.off.0 + (x - self.ch_off.0) * self.scale.0),
            top: g.top.map(|y| self.off.1 + (y - self.ch_off.1) * self.scale.1),
            width: g.width.map(|w| w * self.scale.0),
            height: g.height.map(|h| h * self.scale.1),
        }
    }

    /// Apply to every descendant; inner groups are already in this
    /// group's child space.
    fn apply_all(&self, children: &mut [VisualElement]) {
        let mut stack: Vec<&mut VisualElement> = children.iter_mut().collect();
        while let Some(element) = stack.pop() {
            element.geometry = self.apply(element.geometry);
            if let Some(nested) = element.children_mut() {
                stack.extend(nested.iter_mut());
            }
        }
    }
}

/// Elements of the shape tree that describe the tree itself.
fn is_tree_property(local: &[u8]) -> bool {
    matches!(local, b"nvGrpSpPr" | b"grpSpPr" | b"extLst")
}

/// Single-pass scanner over one master or layout part.
struct PartScanner<'r> {
    rels: &'r std::result::Result<Relationships, String>,
    next_id: u32,
    name: Option<String>,
    id_list: Vec<String>,
    frames: Vec<Frame>,
    elements: Vec<VisualElement>,
    spans: Vec<(ElementId, usize, usize)>,
}

impl<'r> PartScanner<'r> {
    fn new(rels: &'r std::result::Result<Relationships, String>, next_id: u32) -> Self {
        Self {
            rels,
            next_id,
            name: None,
            id_list: Vec::new(),
            frames: Vec::new(),
            elements: Vec::new(),
            spans: Vec::new(),
        }
    }

    fn scan(mut self, xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        let mut path: Vec<Vec<u8>> = Vec::new();

        loop {
            let start = reader.buffer_position() as usize;
            let event = reader.read_event()?;
            let end = reader.buffer_position() as usize;
            match event {
                Event::Start(e) => {
                    self.open(&e, &path, start);
                    path.push(e.local_name().as_ref().to_vec());
                }
                Event::Empty(e) => {
                    self.open(&e, &path, start);
                    self.close(path.len(), end);
                }
                Event::End(_) => {
                    path.pop();
                    self.close(path.len(), end);
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !self.frames.is_empty() {
            return Err(Error::Parse("unterminated shape element".into()));
        }
        Ok(self)
    }

    fn open(&mut self, e: &BytesStart<'_>, path: &[Vec<u8>], start: usize) {
        let local = e.local_name();
        let local = local.as_ref();
        let depth = path.len();
        let parent = path.last().map(Vec::as_slice);

        match local {
            b"cSld" => self.name = attr(e, b"name").filter(|n| !n.is_empty()),
            b"sldLayoutId" => self.id_list.extend(rel_id(e)),
            _ => {}
        }

        let starts_frame = !is_tree_property(local)
            && match self.frames.last() {
                None => parent == Some(b"spTree".as_slice()),
                Some(top) => top.kind == FrameKind::Group && depth == top.depth + 1,
            };
        if starts_frame {
            let id = ElementId(self.next_id);
            self.next_id += 1;
            self.frames.push(Frame {
                id,
                kind: match local {
                    b"pic" => FrameKind::Picture,
                    b"grpSp" => FrameKind::Group,
                    _ => FrameKind::Other,
                },
                depth,
                start,
                name: String::new(),
                link: LinkTarget::None,
                text_links: Vec::new(),
                xfrm: XfrmState::NotSeen,
                off: None,
                ext: None,
                ch_off: None,
                ch_ext: None,
                children: Vec::new(),
            });
            return;
        }

        let Some(top) = self.frames.last_mut() else {
            return;
        };
        match local {
            b"cNvPr" if depth == top.depth + 2 => {
                top.name = attr(e, b"name").unwrap_or_default();
            }
            b"hlinkClick" if parent == Some(b"cNvPr".as_slice()) && depth == top.depth + 3 => {
                top.link = resolve_link(self.rels, rel_id(e));
            }
            b"hlinkClick" if matches!(parent, Some(b"rPr" | b"endParaRPr" | b"defRPr")) => {
                if let LinkTarget::Uri(uri) = resolve_link(self.rels, rel_id(e)) {
                    top.text_links.push(uri);
                }
            }
            b"xfrm" if top.xfrm == XfrmState::NotSeen => top.xfrm = XfrmState::Open(depth),
            b"off" | b"chOff" if top.xfrm == XfrmState::Open(depth.wrapping_sub(1)) => {
                let point = pair(e, b"x", b"y");
                if local == b"off" {
                    top.off = point;
                } else {
                    top.ch_off = point;
                }
            }
            b"ext" | b"chExt" if top.xfrm == XfrmState::Open(depth.wrapping_sub(1)) => {
                let size = pair(e, b"cx", b"cy");
                if local == b"ext" {
                    top.ext = size;
                } else {
                    top.ch_ext = size;
                }
            }
            _ => {}
        }
    }

    fn close(&mut self, depth: usize, end: usize) {
        let Some(top) = self.frames.last_mut() else {
            return;
        };
        if top.xfrm == XfrmState::Open(depth) {
            top.xfrm = XfrmState::Done;
        }
        if top.depth != depth {
            return;
        }

        let Some(frame) = self.frames.pop() else {
            return;
        };
        let start = frame.start;
        let element = frame.finish(end, !self.frames.is_empty());
        match self.frames.last_mut() {
            Some(parent) => parent.children.push(element),
            None => {
                self.spans.push((element.id, start, end));
                self.elements.push(element);
            }
        }
    }
}

/// Two numeric attributes, e.g. `x`/`y` or `cx`/`cy`.
fn pair(e: &BytesStart<'_>, a: &[u8], b: &[u8]) -> Option<(f64, f64)> {
    let a = attr(e, a)?.parse().ok()?;
    let b = attr(e, b)?.parse().ok()?;
    Some((a, b))
}

/// Resolve an `a:hlinkClick` relationship id.
fn resolve_link(
    rels: &std::result::Result<Relationships, String>,
    id: Option<String>,
) -> LinkTarget {
    let Some(id) = id.filter(|id| !id.is_empty()) else {
        return LinkTarget::None;
    };
    match rels {
        Err(reason) => LinkTarget::Unresolved(format!("relationships unreadable: {}", reason)),
        Ok(rels) => match rels.get(&id) {
            Some(rel) if rel.external => LinkTarget::Uri(rel.target.clone()),
            // Jump to another slide or part
            Some(_) => LinkTarget::None,
            None => LinkTarget::Unresolved(format!("relationship {} not found", id)),
        },
    }
}

/// Original state of one master or layout part, kept for serialization.
struct PartSource {
    /// Container path in the model
    path: Vec<usize>,
    part: String,
    xml: String,
    spans: Vec<(ElementId, usize, usize)>,
}

impl PartSource {
    /// The part without the spans of elements no longer in `container`.
    fn without_detached(&self, container: &Container) -> Option<String> {
        let surviving: HashSet<ElementId> = container.elements.iter().map(|e| e.id).collect();
        let mut removed: Vec<(usize, usize)> = self
            .spans
            .iter()
            .filter(|(id, _, _)| !surviving.contains(id))
            .map(|(_, start, end)| (*start, *end))
            .collect();
        if removed.is_empty() {
            return None;
        }
        removed.sort_unstable();

        let mut out = String::with_capacity(self.xml.len());
        let mut cursor = 0;
        for (start, end) in removed {
            out.push_str(&self.xml[cursor..start]);
            cursor = end;
        }
        out.push_str(&self.xml[cursor..]);
        Some(out)
    }
}

/// A parsed presentation ready for cleaning and saving.
pub struct PptxPackage {
    data: Vec<u8>,
    model: Document,
    parts: Vec<PartSource>,
}

impl Package for PptxPackage {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Pptx
    }

    fn document(&self) -> &Document {
        &self.model
    }

    fn document_mut(&mut self) -> &mut Document {
        &mut self.model
    }

    fn serialize(&mut self) -> Result<Vec<u8>> {
        let failed = |e: &dyn std::fmt::Display| Error::Serialization(e.to_string());

        let mut rewritten: HashMap<&str, Vec<u8>> = HashMap::new();
        for source in &self.parts {
            let Some(container) = self.model.container(&source.path) else {
                continue;
            };
            if let Some(xml) = source.without_detached(container) {
                log::debug!(
                    "{}: {} -> {} bytes",
                    source.part,
                    source.xml.len(),
                    xml.len()
                );
                rewritten.insert(source.part.as_str(), xml.into_bytes());
            }
        }

        let mut archive =
            ZipArchive::new(Cursor::new(self.data.as_slice())).map_err(|e| failed(&e))?;
        let mut writer = ZipWriter::new(Cursor::new(Vec::with_capacity(self.data.len())));

        for i in 0..archive.len() {
            let entry = archive.by_index_raw(i).map_err(|e| failed(&e))?;
            match rewritten.get(entry.name()) {
                Some(bytes) => {
                    let name = entry.name().to_string();
                    drop(entry);
                    writer
                        .start_file(name, deflated())
                        .map_err(|e| failed(&e))?;
                    writer.write_all(bytes).map_err(|e| failed(&e))?;
                }
                None => writer.raw_copy_file(entry).map_err(|e| failed(&e))?,
            }
        }

        let cursor = writer.finish().map_err(|e| failed(&e))?;
        Ok(cursor.into_inner())
    }
}

fn deflated() -> SimpleFileOptions {
    SimpleFileOptions::default().compression_method(CompressionMethod::Deflated)
}
