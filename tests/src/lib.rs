//! # Jupiter Broker Test Suite
//!
//! Cross-module flows driven against a mock HTTP server.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── signing.rs     # Credentials + slicer working together
//!     ├── transport.rs   # HttpClient over real sockets
//!     └── producer.rs    # Gateway -> broker -> producer -> preflight
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p jupiter-tests
//!
//! # With SDK logs
//! JUPITER_LOG_LEVEL=jupiter_broker=debug cargo test -p jupiter-tests -- --nocapture
//! ```

pub mod integration;
