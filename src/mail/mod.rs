//! The mail tree: per-node fields, inheritance resolution, rendering.

mod fields;
mod render;
mod tree;

pub use fields::MailFields;
pub use tree::{Document, MailNode, ResolvedMail};
