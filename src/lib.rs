// src/lib.rs

pub mod bucket;
pub mod config;
pub mod core;
pub mod error;
pub mod filter;
pub mod normalize;
pub mod persistence;
pub mod sources;
pub use crate::core::engine::{DedupEngine, DedupReport};
pub use crate::error::{Result, VocabError};
