//! StudyHub Core Library
//!
//! The content tree state machine with its lookup helpers, factories and
//! persistence, plus configuration and the ports to the AI and document
//! services.

pub mod config;
pub mod error;
pub mod factory;
pub mod ids;
pub mod import;
pub mod lookup;
pub mod persistence;
pub mod ports;
pub mod progress;
pub mod reducer;
pub mod seed;
pub mod store;

pub use config::*;
pub use error::*;
pub use persistence::*;
pub use reducer::reduce;
pub use store::TreeStore;
