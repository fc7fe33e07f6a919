pub mod acquisition;
pub mod analysis;
pub mod batch;
pub mod configuration;
pub mod correlation;
pub mod correlation_result;
pub mod error;
/// Ion trace (XIC) and spectrum extraction
pub mod extractor;
#[cfg(feature = "mzdata")]
pub mod reader;
pub mod report;
pub mod scan;
pub mod source;
pub mod spectrum;
pub mod summary;
pub mod trace;
// Various utilities
pub mod utils;
