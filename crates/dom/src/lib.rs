//! Arena-backed HTML tree: parsing, cloning with node pairing, mutation,
//! and serialization.

#![forbid(unsafe_code)]

pub mod parser;
pub mod printing;
pub mod tree;

pub use indextree::NodeId;
pub use parser::parse_html;
pub use printing::{serialize_children, serialize_node};
pub use tree::{Document, DomNode, NodeKind};
