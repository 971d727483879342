//! In-memory fixtures shared by the integration tests.
//!
//! PDFs are assembled with lopdf, presentations with zip. Nothing touches
//! the filesystem until a test writes a fixture into a temp dir.

#![allow(dead_code)]

use std::io::{Cursor, Read, Write};

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

pub const SLIDE_W: i64 = 12_192_000;
pub const SLIDE_H: i64 = 6_858_000;

/// 92% / 95% of the slide: inside both the corner and the strict corner.
pub const CORNER: (i64, i64) = (11_216_640, 6_515_100);
/// Dead centre of the slide.
pub const CENTRE: (i64, i64) = (6_096_000, 3_429_000);
/// Logo-sized extent, below the size bounds.
pub const LOGO: (i64, i64) = (800_000, 300_000);

pub const GAMMA_URL: &str = "https://gamma.app/promo";
pub const OTHER_URL: &str = "https://example.com/about";

const NS: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;
const REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const REL_BASE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Hyperlink relationship ids available in every master and layout part.
pub const RID_GAMMA: &str = "rId20";
pub const RID_OTHER: &str = "rId21";
pub const RID_SHOUTY: &str = "rId22";
pub const RID_SLIDE: &str = "rId23";

// ---------------------------------------------------------------------------
// Presentation shapes
// ---------------------------------------------------------------------------

/// A picture shape with an optional click hyperlink.
pub fn pic(
    id: u32,
    name: &str,
    rid: Option<&str>,
    (x, y): (i64, i64),
    (cx, cy): (i64, i64),
) -> String {
    let link = rid
        .map(|r| format!(r#"<a:hlinkClick r:id="{}"/>"#, r))
        .unwrap_or_default();
    format!(
        r#"<p:pic><p:nvPicPr><p:cNvPr id="{id}" name="{name}">{link}</p:cNvPr><p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr userDrawn="1"/></p:nvPicPr><p:blipFill><a:blip r:embed="rId19"/><a:stretch><a:fillRect/></a:stretch></p:blipFill><p:spPr><a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr></p:pic>"#
    )
}

/// A text placeholder, optionally with a hyperlinked run.
pub fn text_shape(id: u32, name: &str, run_link: Option<&str>, (x, y): (i64, i64)) -> String {
    let rpr = run_link
        .map(|r| format!(r#"<a:rPr lang="en-US"><a:hlinkClick r:id="{}"/></a:rPr>"#, r))
        .unwrap_or_else(|| r#"<a:rPr lang="en-US"/>"#.to_string());
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="{name}"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr><p:spPr><a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="800000" cy="300000"/></a:xfrm></p:spPr><p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:r>{rpr}<a:t>Made with Gamma &amp; friends</a:t></a:r></a:p></p:txBody></p:sp>"#
    )
}

/// A group shape at `(x, y)` whose child space matches its own extent.
pub fn group(
    id: u32,
    name: &str,
    (x, y): (i64, i64),
    (cx, cy): (i64, i64),
    children: &str,
) -> String {
    format!(
        r#"<p:grpSp><p:nvGrpSpPr><p:cNvPr id="{id}" name="{name}"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/><a:chOff x="0" y="0"/><a:chExt cx="{cx}" cy="{cy}"/></a:xfrm></p:grpSpPr>{children}</p:grpSp>"#
    )
}

fn sp_tree(shapes: &str) -> String {
    format!(
        r#"<p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>{}</p:spTree>"#,
        shapes
    )
}

fn c_sld(name: Option<&str>, shapes: &str) -> String {
    match name {
        Some(name) => format!(r#"<p:cSld name="{}">{}</p:cSld>"#, name, sp_tree(shapes)),
        None => format!("<p:cSld>{}</p:cSld>", sp_tree(shapes)),
    }
}

// ---------------------------------------------------------------------------
// Presentation package
// ---------------------------------------------------------------------------

struct LayoutSpec {
    name: Option<String>,
    shapes: String,
    present: bool,
}

struct MasterSpec {
    name: Option<String>,
    shapes: String,
    layouts: Vec<LayoutSpec>,
}

/// Builds a minimal but well-formed presentation package.
pub struct DeckBuilder {
    masters: Vec<MasterSpec>,
    slide_shapes: String,
    corrupt_master_rels: bool,
}

impl DeckBuilder {
    pub fn new() -> Self {
        Self {
            masters: Vec::new(),
            slide_shapes: pic(2, "Slide Picture", Some(RID_GAMMA), CORNER, LOGO),
            corrupt_master_rels: false,
        }
    }

    /// Add a slide master.
    pub fn master(mut self, name: Option<&str>, shapes: &str) -> Self {
        self.masters.push(MasterSpec {
            name: name.map(str::to_string),
            shapes: shapes.to_string(),
            layouts: Vec::new(),
        });
        self
    }

    /// Add a layout under the most recent master.
    pub fn layout(mut self, name: Option<&str>, shapes: &str) -> Self {
        self.push_layout(LayoutSpec {
            name: name.map(str::to_string),
            shapes: shapes.to_string(),
            present: true,
        });
        self
    }

    /// Reference a layout from the most recent master without shipping its part.
    pub fn missing_layout(mut self) -> Self {
        self.push_layout(LayoutSpec {
            name: None,
            shapes: String::new(),
            present: false,
        });
        self
    }

    /// Truncate the relationships part of the first master.
    pub fn corrupt_master_rels(mut self) -> Self {
        self.corrupt_master_rels = true;
        self
    }

    fn push_layout(&mut self, layout: LayoutSpec) {
        if self.masters.is_empty() {
            self.masters.push(MasterSpec {
                name: None,
                shapes: String::new(),
                layouts: Vec::new(),
            });
        }
        if let Some(master) = self.masters.last_mut() {
            master.layouts.push(layout);
        }
    }

    pub fn build(self) -> Vec<u8> {
        let mut parts: Vec<(String, Vec<u8>)> = Vec::new();
        let mut layout_no = 0;
        let mut overrides = String::new();
        let mut master_ids = String::new();
        let mut pres_rels = String::new();

        for (m, master) in self.masters.iter().enumerate() {
            let master_no = m + 1;
            let mut ids = String::new();
            let mut rels = String::new();

            for (l, layout) in master.layouts.iter().enumerate() {
                layout_no += 1;
                let rid = format!("rId{}", l + 1);
                ids.push_str(&format!(
                    r#"<p:sldLayoutId id="{}" r:id="{}"/>"#,
                    2_147_483_649u64 + layout_no as u64,
                    rid
                ));
                rels.push_str(&format!(
                    r#"<Relationship Id="{}" Type="{}/slideLayout" Target="../slideLayouts/slideLayout{}.xml"/>"#,
                    rid, REL_BASE, layout_no
                ));
                if !layout.present {
                    continue;
                }

                let xml = format!(
                    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sldLayout {NS} preserve="1">{}<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"#,
                    c_sld(layout.name.as_deref(), &layout.shapes)
                );
                parts.push((
                    format!("ppt/slideLayouts/slideLayout{}.xml", layout_no),
                    xml.into_bytes(),
                ));
                let layout_rels = relationships(&format!(
                    r#"<Relationship Id="rId1" Type="{REL_BASE}/slideMaster" Target="../slideMasters/slideMaster{master_no}.xml"/><Relationship Id="rId19" Type="{REL_BASE}/image" Target="../media/image1.png"/>{}"#,
                    hyperlinks()
                ));
                parts.push((
                    format!("ppt/slideLayouts/_rels/slideLayout{}.xml.rels", layout_no),
                    layout_rels.into_bytes(),
                ));
                overrides.push_str(&format!(
                    r#"<Override PartName="/ppt/slideLayouts/slideLayout{}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/>"#,
                    layout_no
                ));
            }

            let xml = format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sldMaster {NS}>{}<p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/><p:sldLayoutIdLst>{}</p:sldLayoutIdLst></p:sldMaster>"#,
                c_sld(master.name.as_deref(), &master.shapes),
                ids
            );
            parts.push((
                format!("ppt/slideMasters/slideMaster{}.xml", master_no),
                xml.into_bytes(),
            ));

            let master_rels = if self.corrupt_master_rels && m == 0 {
                b"<Relationships xmlns=\"".to_vec()
            } else {
                relationships(&format!(
                    r#"{rels}<Relationship Id="rId19" Type="{REL_BASE}/image" Target="../media/image1.png"/>{}"#,
                    hyperlinks()
                ))
                .into_bytes()
            };
            parts.push((
                format!("ppt/slideMasters/_rels/slideMaster{}.xml.rels", master_no),
                master_rels,
            ));
            overrides.push_str(&format!(
                r#"<Override PartName="/ppt/slideMasters/slideMaster{}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"/>"#,
                master_no
            ));

            master_ids.push_str(&format!(
                r#"<p:sldMasterId id="{}" r:id="rId{}"/>"#,
                2_147_483_648u64 + m as u64 * 100,
                m + 1
            ));
            pres_rels.push_str(&format!(
                r#"<Relationship Id="rId{}" Type="{REL_BASE}/slideMaster" Target="slideMasters/slideMaster{}.xml"/>"#,
                m + 1,
                master_no
            ));
        }

        let slide_rid = format!("rId{}", self.masters.len() + 1);
        pres_rels.push_str(&format!(
            r#"<Relationship Id="{slide_rid}" Type="{REL_BASE}/slide" Target="slides/slide1.xml"/>"#
        ));

        let presentation = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation {NS} saveSubsetFonts="1"><p:sldMasterIdLst>{master_ids}</p:sldMasterIdLst><p:sldIdLst><p:sldId id="256" r:id="{slide_rid}"/></p:sldIdLst><p:sldSz cx="{SLIDE_W}" cy="{SLIDE_H}"/><p:notesSz cx="6858000" cy="9144000"/></p:presentation>"#
        );
        let slide = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld {NS}>{}</p:sld>"#,
            c_sld(None, &self.slide_shapes)
        );
        let slide_rels = relationships(&format!(
            r#"<Relationship Id="rId1" Type="{REL_BASE}/slideLayout" Target="../slideLayouts/slideLayout1.xml"/><Relationship Id="rId19" Type="{REL_BASE}/image" Target="../media/image1.png"/>{}"#,
            hyperlinks()
        ));

        let content_types = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Default Extension="png" ContentType="image/png"/><Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/><Override PartName="/ppt/slides/slide1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>{overrides}</Types>"#
        );
        let package_rels = relationships(&format!(
            r#"<Relationship Id="rId1" Type="{REL_BASE}/officeDocument" Target="ppt/presentation.xml"/>"#
        ));

        let mut entries: Vec<(String, Vec<u8>)> = vec![
            ("[Content_Types].xml".into(), content_types.into_bytes()),
            ("_rels/.rels".into(), package_rels.into_bytes()),
            ("ppt/presentation.xml".into(), presentation.into_bytes()),
            ("ppt/_rels/presentation.xml.rels".into(), relationships(&pres_rels).into_bytes()),
            ("ppt/slides/slide1.xml".into(), slide.into_bytes()),
            ("ppt/slides/_rels/slide1.xml.rels".into(), slide_rels.into_bytes()),
            ("ppt/media/image1.png".into(), PNG.to_vec()),
        ];
        entries.extend(parts);
        zip_entries(&entries)
    }
}

impl Default for DeckBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn hyperlinks() -> String {
    format!(
        r#"<Relationship Id="{RID_GAMMA}" Type="{REL_BASE}/hyperlink" Target="{GAMMA_URL}" TargetMode="External"/><Relationship Id="{RID_OTHER}" Type="{REL_BASE}/hyperlink" Target="{OTHER_URL}" TargetMode="External"/><Relationship Id="{RID_SHOUTY}" Type="{REL_BASE}/hyperlink" Target="https://SHARE.GAMMA.APP/x" TargetMode="External"/><Relationship Id="{RID_SLIDE}" Type="{REL_BASE}/slide" Target="../slides/slide1.xml"/>"#
    )
}

fn relationships(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="{REL_NS}">{body}</Relationships>"#
    )
}

/// Eight bytes standing in for an image payload.
pub const PNG: &[u8] = b"\x89PNG\r\n\x1a\n";

/// Zip named entries in order.
pub fn zip_entries(entries: &[(String, Vec<u8>)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data) in entries {
        writer
            .start_file(name.as_str(), SimpleFileOptions::default())
            .unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Read one entry out of a zip archive.
pub fn zip_entry(archive: &[u8], name: &str) -> Option<Vec<u8>> {
    let mut archive = ZipArchive::new(Cursor::new(archive)).ok()?;
    let mut file = archive.by_name(name).ok()?;
    let mut data = Vec::new();
    file.read_to_end(&mut data).ok()?;
    Some(data)
}

/// Entry names in archive order.
pub fn zip_names(archive: &[u8]) -> Vec<String> {
    let archive = ZipArchive::new(Cursor::new(archive)).unwrap();
    archive.file_names().map(str::to_string).collect::<Vec<_>>()
}

/// Entry text, for assertions.
pub fn zip_text(archive: &[u8], name: &str) -> String {
    String::from_utf8(zip_entry(archive, name).unwrap()).unwrap()
}

// ---------------------------------------------------------------------------
// PDF
// ---------------------------------------------------------------------------

enum Draw {
    Image { name: String, x: i64, y: i64, w: i64, h: i64 },
    Form { name: String, x: i64, y: i64, inner: Vec<(String, i64, i64, i64, i64)> },
    Text(String),
}

enum Link {
    Uri(String),
    Dest,
}

#[derive(Default)]
struct PagePlan {
    draws: Vec<Draw>,
    links: Vec<([i64; 4], Link)>,
}

/// Builds a small PDF with one shared image XObject.
///
/// Coordinates are PDF user space: origin bottom-left, 612 x 792 pages.
pub struct PdfBuilder {
    pages: Vec<PagePlan>,
}

impl PdfBuilder {
    pub fn new() -> Self {
        Self { pages: Vec::new() }
    }

    /// Start a new page.
    pub fn page(mut self) -> Self {
        self.pages.push(PagePlan::default());
        self
    }

    fn current(&mut self) -> &mut PagePlan {
        if self.pages.is_empty() {
            self.pages.push(PagePlan::default());
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    /// Draw the shared image at `(x, y)` scaled to `w x h`.
    pub fn image(mut self, name: &str, x: i64, y: i64, w: i64, h: i64) -> Self {
        self.current().draws.push(Draw::Image {
            name: name.to_string(),
            x,
            y,
            w,
            h,
        });
        self
    }

    /// Draw a form XObject at `(x, y)` that itself draws images.
    pub fn form(
        mut self,
        name: &str,
        x: i64,
        y: i64,
        inner: &[(&str, i64, i64, i64, i64)],
    ) -> Self {
        self.current().draws.push(Draw::Form {
            name: name.to_string(),
            x,
            y,
            inner: inner
                .iter()
                .map(|(n, x, y, w, h)| (n.to_string(), *x, *y, *w, *h))
                .collect(),
        });
        self
    }

    /// Show a line of text.
    pub fn text(mut self, text: &str) -> Self {
        self.current().draws.push(Draw::Text(text.to_string()));
        self
    }

    /// A URI link annotation over `[x0 y0 x1 y1]`.
    pub fn uri_link(mut self, rect: [i64; 4], uri: &str) -> Self {
        self.current().links.push((rect, Link::Uri(uri.to_string())));
        self
    }

    /// A link annotation that jumps within the document.
    pub fn dest_link(mut self, rect: [i64; 4]) -> Self {
        self.current().links.push((rect, Link::Dest));
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let image_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => Object::Integer(1),
                "Height" => Object::Integer(1),
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => Object::Integer(8),
            },
            vec![0u8],
        ));
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });

        let mut kids = Vec::new();
        let mut page_ids: Vec<ObjectId> = Vec::new();
        for page in &self.pages {
            let mut xobjects = Dictionary::new();
            let mut operations = Vec::new();

            for draw in &page.draws {
                match draw {
                    Draw::Image { name, x, y, w, h } => {
                        xobjects.set(name.as_bytes().to_vec(), Object::Reference(image_id));
                        operations.extend(place(name, *x, *y, *w, *h));
                    }
                    Draw::Form { name, x, y, inner } => {
                        let mut inner_x = Dictionary::new();
                        let mut inner_ops = Vec::new();
                        for (n, ix, iy, iw, ih) in inner {
                            inner_x.set(n.as_bytes().to_vec(), Object::Reference(image_id));
                            inner_ops.extend(place(n, *ix, *iy, *iw, *ih));
                        }
                        let form_id = doc.add_object(Stream::new(
                            dictionary! {
                                "Type" => "XObject",
                                "Subtype" => "Form",
                                "BBox" => ints(&[0, 0, 100, 100]),
                                "Resources" => dictionary! { "XObject" => inner_x },
                            },
                            Content { operations: inner_ops }.encode().unwrap(),
                        ));
                        xobjects.set(name.as_bytes().to_vec(), Object::Reference(form_id));
                        operations.extend(place(name, *x, *y, 1, 1));
                    }
                    Draw::Text(text) => {
                        operations.extend([
                            Operation::new("BT", vec![]),
                            Operation::new("Tf", vec!["F1".into(), Object::Integer(12)]),
                            Operation::new("Td", vec![Object::Integer(72), Object::Integer(700)]),
                            Operation::new("Tj", vec![Object::string_literal(text.as_str())]),
                            Operation::new("ET", vec![]),
                        ]);
                    }
                }
            }

            let content_id = doc.add_object(Stream::new(
                Dictionary::new(),
                Content { operations }.encode().unwrap(),
            ));

            let mut page_dict = dictionary! {
                "Type" => "Page",
                "Parent" => Object::Reference(pages_id),
                "Contents" => Object::Reference(content_id),
                "Resources" => dictionary! {
                    "XObject" => xobjects,
                    "Font" => dictionary! { "F1" => Object::Reference(font_id) },
                },
            };

            if !page.links.is_empty() {
                let annots: Vec<Object> = page
                    .links
                    .iter()
                    .map(|(rect, link)| {
                        let mut annot = dictionary! {
                            "Type" => "Annot",
                            "Subtype" => "Link",
                            "Rect" => ints(rect),
                        };
                        match link {
                            Link::Uri(uri) => annot.set(
                                "A",
                                dictionary! {
                                    "S" => "URI",
                                    "URI" => Object::string_literal(uri.as_str()),
                                },
                            ),
                            Link::Dest => annot.set(
                                "Dest",
                                vec![Object::Reference(pages_id), "Fit".into()],
                            ),
                        }
                        Object::Reference(doc.add_object(annot))
                    })
                    .collect();
                page_dict.set("Annots", annots);
            }

            let page_id = doc.add_object(page_dict);
            kids.push(Object::Reference(page_id));
            page_ids.push(page_id);
        }

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => Object::Integer(self.pages.len() as i64),
                "MediaBox" => ints(&[0, 0, 612, 792]),
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }
}

impl Default for PdfBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn ints(values: &[i64]) -> Object {
    Object::Array(values.iter().map(|v| Object::Integer(*v)).collect())
}

fn place(name: &str, x: i64, y: i64, w: i64, h: i64) -> Vec<Operation> {
    vec![
        Operation::new("q", vec![]),
        Operation::new(
            "cm",
            vec![
                Object::Integer(w),
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(h),
                Object::Integer(x),
                Object::Integer(y),
            ],
        ),
        Operation::new("Do", vec![Object::Name(name.as_bytes().to_vec())]),
        Operation::new("Q", vec![]),
    ]
}

/// Operators of every page's content stream, in page order.
pub fn page_operators(pdf: &[u8]) -> Vec<Vec<String>> {
    let doc = Document::load_mem(pdf).unwrap();
    doc.get_pages()
        .values()
        .map(|id| {
            let data = doc.get_page_content(*id).unwrap();
            Content::decode(&data)
                .unwrap()
                .operations
                .into_iter()
                .map(|op| match op.operands.first() {
                    Some(Object::Name(name)) if op.operator == "Do" => {
                        format!("Do /{}", String::from_utf8_lossy(name))
                    }
                    _ => op.operator,
                })
                .collect()
        })
        .collect()
}

/// Number of `/Annots` entries on each page.
pub fn page_annotation_counts(pdf: &[u8]) -> Vec<usize> {
    let doc = Document::load_mem(pdf).unwrap();
    doc.get_pages()
        .values()
        .map(|id| {
            doc.get_dictionary(*id)
                .unwrap()
                .get(b"Annots")
                .and_then(Object::as_array)
                .map(|a| a.len())
                .unwrap_or(0)
        })
        .collect()
}
