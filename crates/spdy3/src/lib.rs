//! SPDY/3 control frame codec.
//!
//! spdy3 reads and writes the eight SPDY/3 control frames over any blocking
//! byte stream. Header blocks stay opaque; compression and session state live
//! above this crate.
//!
//! # Crate Structure
//!
//! - [`frame`]: bit-exact words, frame payloads, name/value blocks, and the
//!   `Read`/`Write` framers
//!
//! The `spdy3` binary (behind the `cli` feature) decodes captures and builds
//! single frames from the command line.

/// Re-export frame types.
pub mod frame {
    pub use spdy3_frame::*;
}
