//! Wire framing for Ferry connections
//!
//! Commands and list responses travel as newline-delimited JSON lines.
//! Download responses are a textual header line followed by a raw body
//! whose length the header declares. The reader and writer here own the
//! line discipline and the byte-counted body streaming; message types
//! live in [`crate::protocol`].

mod error;
mod reader;
mod writer;

pub use error::FrameError;
pub use reader::FrameReader;
pub use writer::FrameWriter;
