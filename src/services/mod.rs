pub mod assembler;
pub mod clustering;
pub mod dataset;
pub mod engine;

pub use engine::AnalysisEngine;
