/// MS2 scan matched to a precursor apex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FragmentMatch {
    pub scan_index: usize,
    pub retention_time: f64,
    pub isolation_center: f64,
    pub isolation_width: f64,
}

/// Outcome of matching a fragmentation scan to a precursor apex.
/// `matched` is `None` if no candidate MS2 scan was acquired for the precursor.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationResult {
    pub reference_scan: usize,
    pub candidates: Vec<usize>,
    pub matched: Option<FragmentMatch>,
}
