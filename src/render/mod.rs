//! Rendering of reports and document trees for people and machines.

mod json;
mod text;
mod tree;

pub use json::{to_json, JsonFormat};
pub use text::{detection_summary, removal_summary, trace_listing};
pub use tree::element_tree;
