//! Compression utilities

pub mod lzss;

pub use lzss::{compress, decompress};
