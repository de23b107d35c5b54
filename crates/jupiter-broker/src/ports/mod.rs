//! # Ports Layer
//!
//! Trait definitions for the hexagonal architecture. The transport and the
//! producer only talk to the outside world through these.

pub mod outbound;
