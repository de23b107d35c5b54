//! # Domain Layer
//!
//! Signing, chunking and the data model. No network I/O lives here.

pub mod config;
pub mod credentials;
pub mod entities;
pub mod errors;
pub mod slicer;
