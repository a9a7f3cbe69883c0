//! StudyHub Types - Pure type definitions
//!
//! Data model of the study content tree: folders own files, files own
//! ordered content items. No I/O and no async runtime, so the crate can
//! be shared with any front-end.

pub mod action;
pub mod generated;
pub mod id;
pub mod tree;

pub use action::*;
pub use generated::*;
pub use id::*;
pub use tree::*;
