//! allergex-server: network front end for the extraction engine.
//!
//! Each frame on the wire is a 4-byte big-endian length followed by that many
//! bytes of UTF-8. A request frame carries raw text; the response frame is a
//! JSON [`Response`]. A connection may carry any number of requests and is
//! served by its own task.

pub mod protocol;
pub mod server;

pub use protocol::{read_frame, write_frame, Response};
pub use server::{handle_connection, serve};

pub type Result<T> = std::result::Result<T, ServerError>;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Frame of {size} bytes exceeds limit of {limit}")]
    FrameTooLarge { size: usize, limit: usize },

    #[error("Frame is not valid UTF-8")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
