// src/process/mod.rs
pub mod date_parser;
pub mod reader;
pub mod utils;

pub use reader::{load_pod_file, PodReader, ReaderStats};
