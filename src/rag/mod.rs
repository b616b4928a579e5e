//! Retrieval-augmented generation building blocks.
//!
//! This module provides:
//! - `chunker`: splits extracted text into overlapping windows for indexing
//! - `context`: assembles the grounded prompt from retrieved material

pub mod chunker;
pub mod context;

pub use chunker::{chunk_text, Chunk};
