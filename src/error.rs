use rustyms::error::CustomError as RustyMsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Empty {kind} range: {lo} > {hi}")]
    EmptyRange {
        kind: &'static str,
        lo: f64,
        hi: f64,
    },
    #[error("Scan {0} is outside of the acquisition ({1} scans)")]
    ScanNotFound(usize, usize),
    #[error("Trace is empty")]
    EmptyTrace,
    #[error("No candidate scan to match against scan {0}")]
    NoCandidate(usize),
    #[error("Scan {0} is not an MS2 scan with a precursor")]
    MissingPrecursor(usize),
    #[error("Unsupported MS level {1} for scan {0}")]
    UnsupportedMsLevel(usize, u8),
    #[error("Retention time decreases at scan {0}")]
    UnsortedAcquisition(usize),
    #[error("Expected scan index {0}, found {1}")]
    ScanIndexMismatch(usize, usize),
    #[error("m/z ({0}) and intensities ({1}) arrays must have the same length")]
    SpectrumShape(usize, usize),
    #[error("Acquisition contains no scans")]
    EmptyAcquisition,
    #[error("Invalid peptide sequence: {0}")]
    InvalidPeptideSequence(RustyMsError),
    #[error("No monoisotopic mass known for {0}")]
    UnknownElementMass(&'static str),
    #[error("Invalid charge state: {0}")]
    InvalidCharge(usize),
    #[error("Invalid target species `{0}`: expected label,charge,mz,rt[,tolerance[,rt_window]]")]
    InvalidTarget(String),
    #[error("Invalid intensity aggregation `{0}`: expected `sum` or `max`")]
    InvalidAggregation(String),
    #[cfg(feature = "mzdata")]
    #[error(transparent)]
    ArrayRetrieval(#[from] mzdata::spectrum::bindata::ArrayRetrievalError),
    #[error("Analysis cancelled before it started")]
    Cancelled,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
