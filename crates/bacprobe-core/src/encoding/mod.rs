/// Bounds-checked byte reader for decoding requests and responses.
pub mod reader;
/// Tag bytes of the request layout.
pub mod tag;
/// Growable byte writer used by the request encoder.
pub mod writer;
