//! Email-safe transcoder for the newsletter preview.
//!
//! Takes a styled preview subtree plus a computed-style oracle and emits
//! (a) a fragment with every style inlined and every grid/flex layout
//! rewritten into table-based hybrid structure, and (b) a standalone
//! preview document wrapping that fragment.
//!
//! The transform is a fixed, order-dependent sequence on a working copy
//! of the source subtree: strip disallowed content, inline styles while
//! tagging layout containers (pass 1), then resolve the tags into hybrid
//! tables (pass 2). The source tree is only written to for the scoped
//! width forcing around the capture read, and that mutation is rolled
//! back even when the transform fails.

#![forbid(unsafe_code)]

mod buttons;
mod cards;
mod classify;
mod hybrid;
mod inline;

pub mod export;
pub mod resolver;
pub mod schema;

pub use export::{ExportArtifacts, ExportError, confirmation_notice, export_email};
pub use resolver::{CapturedStyles, NodeCapture, StyleResolver};
pub use schema::{EXPORT_ROOT_ID, Recognizer, Region, find_export_root};
