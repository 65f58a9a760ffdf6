// src/core/mod.rs

pub mod context;
pub mod engine;
pub mod loader;
pub mod rebuilder;
pub mod resolver;
pub mod types;
pub mod writer;
