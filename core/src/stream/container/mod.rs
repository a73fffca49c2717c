//! stream/container
//! Block-record framing of the compressed container.
//!
//! The container is a flat sequence of records with no header, trailer or count:
//!
//! ```text
//! [ index (u32 LE) ][ payload_len (u32 LE) ][ payload ... ]
//! ```

pub mod types;
pub mod encode;
pub mod decode;

pub use types::*;
pub use encode::*;
pub use decode::*;
