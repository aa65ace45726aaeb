//! Core domain logic: node identity, templates, materialization, and the
//! master-flake patcher.

pub mod error;
pub mod flake;
pub mod materialize;
pub mod node;
pub mod sanitize;
pub mod templates;

pub use error::{Error, ErrorCode, Result};
pub use node::{NodeIdentity, NodeKind};
