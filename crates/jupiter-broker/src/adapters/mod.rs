//! # Adapters Module
//!
//! Infrastructure adapters implementing the outbound ports.

pub mod http;
pub mod json;

pub use http::ReqwestExecutor;
pub use json::JsonCodec;
