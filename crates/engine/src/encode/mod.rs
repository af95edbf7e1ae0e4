//! Encoder invocation assembly

pub mod ffmpeg;

pub use ffmpeg::{escape_filter_path, ArgumentCache, EncodePass, InvocationSettings};
