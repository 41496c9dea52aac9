//! Analysis engine: turns a ticker into a complete report

pub mod analysis_engine;
pub mod result;

pub use analysis_engine::AnalysisEngine;
pub use result::{AnalysisReport, DataFreshness};
