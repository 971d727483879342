//! Element tree dump used by `inspect`.

use std::fmt::Write;

use crate::model::{Container, Document, ElementKind, Geometry, LinkTarget, VisualElement};

/// Render every container and element of a document as an indented tree.
///
/// Shows what the parsers saw: kinds, names, raw geometry, click targets
/// and text-run hyperlinks, including the contents of groups.
pub fn element_tree(doc: &Document) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} canvas {:.0} x {:.0} ({:?})",
        doc.format, doc.canvas.width, doc.canvas.height, doc.unit
    );

    let mut stack: Vec<(&Container, usize)> = doc.containers.iter().rev().map(|c| (c, 0)).collect();
    while let Some((container, level)) = stack.pop() {
        let indent = "  ".repeat(level + 1);
        match &container.fault {
            Some(reason) => {
                let _ = writeln!(
                    out,
                    "{}{} {} (unreadable: {})",
                    indent, container.kind, container.name, reason
                );
            }
            None => {
                let _ = writeln!(
                    out,
                    "{}{} {} ({} elements)",
                    indent,
                    container.kind,
                    container.name,
                    container.element_count()
                );
            }
        }
        for element in &container.elements {
            write_element(&mut out, element, level + 2);
        }
        stack.extend(container.children.iter().rev().map(|c| (c, level + 1)));
    }

    out.trim_end().to_string()
}

fn write_element(out: &mut String, root: &VisualElement, level: usize) {
    let mut stack = vec![(root, level)];
    while let Some((element, level)) = stack.pop() {
        let indent = "  ".repeat(level);
        let link = match &element.kind {
            ElementKind::Picture { link: LinkTarget::Uri(uri) } => format!(" -> {}", uri),
            ElementKind::Picture { link: LinkTarget::Unresolved(reason) } => {
                format!(" (link unreadable: {})", reason)
            }
            _ => String::new(),
        };
        let _ = writeln!(
            out,
            "{}{} {:?} {}{}",
            indent,
            element.tag(),
            element.name,
            geometry(&element.geometry),
            link
        );
        for uri in &element.text_links {
            let _ = writeln!(out, "{}  text link -> {}", indent, uri);
        }
        stack.extend(element.children().iter().rev().map(|c| (c, level + 1)));
    }
}

fn geometry(g: &Geometry) -> String {
    let value = |v: Option<f64>| v.map(|v| format!("{:.0}", v)).unwrap_or_else(|| "?".to_string());
    format!(
        "@ ({}, {}) {} x {}",
        value(g.left),
        value(g.top),
        value(g.width),
        value(g.height)
    )
}
