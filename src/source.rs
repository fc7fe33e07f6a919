use std::ops::{Range, RangeInclusive};

use crate::{error::Error, scan::MsLevel, spectrum::Spectrum};

/// Read access to the scans of one acquisition, as provided by an instrument file reader.
///
/// Scan indexes run from `0` to `scan_count() - 1` and retention times are
/// non-decreasing with the scan index.
pub trait ScanSource {
    fn scan_count(&self) -> usize;

    /// Retention time (minutes) of the scan
    fn retention_time(&self, scan_index: usize) -> Result<f64, Error>;

    /// Index of the scan nearest to the given retention time. A retention time exactly
    /// between two scans resolves to the earlier scan.
    fn scan_index_for(&self, retention_time: f64) -> Result<usize, Error>;

    fn spectrum(&self, scan_index: usize) -> Result<&Spectrum, Error>;

    fn ms_level(&self, scan_index: usize) -> Result<MsLevel, Error>;

    /// Precursor m/z, fails with [`Error::MissingPrecursor`] for MS1 scans
    fn precursor_mz(&self, scan_index: usize) -> Result<f64, Error>;

    /// Isolation width, fails with [`Error::MissingPrecursor`] for MS1 scans
    fn isolation_width(&self, scan_index: usize) -> Result<f64, Error>;

    /// Ion injection time (milliseconds), `None` if not reported
    fn injection_time(&self, scan_index: usize) -> Result<Option<f64>, Error>;

    /// Fails with [`Error::ScanNotFound`] if the scan index is outside the acquisition.
    fn check_scan_index(&self, scan_index: usize) -> Result<(), Error> {
        if scan_index >= self.scan_count() {
            return Err(Error::ScanNotFound(scan_index, self.scan_count()));
        }
        Ok(())
    }

    /// Half-open range of scan indexes whose retention time lies within `rt_range` (inclusive).
    ///
    /// # Arguments
    /// * `rt_range` - Retention time range in minutes
    ///
    fn scans_within(&self, rt_range: &RangeInclusive<f64>) -> Result<Range<usize>, Error> {
        let start = partition_point(self, |rt| rt < *rt_range.start())?;
        let end = partition_point(self, |rt| rt <= *rt_range.end())?;
        Ok(start..end.max(start))
    }
}

/// Index of the first scan for which `predicate` on its retention time is false.
/// The predicate must hold for a prefix of the acquisition only.
fn partition_point<S, P>(source: &S, predicate: P) -> Result<usize, Error>
where
    S: ScanSource + ?Sized,
    P: Fn(f64) -> bool,
{
    let mut lo = 0;
    let mut hi = source.scan_count();
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if predicate(source.retention_time(mid)?) {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    Ok(lo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::tests::synthetic_acquisition;

    #[test]
    fn test_scans_within() {
        let acquisition = synthetic_acquisition();
        assert_eq!(acquisition.scans_within(&(46.0..=47.2)).unwrap(), 2..6);
        assert_eq!(acquisition.scans_within(&(0.0..=100.0)).unwrap(), 0..8);
        assert_eq!(acquisition.scans_within(&(46.5..=46.6)).unwrap(), 4..4);
        assert_eq!(acquisition.scans_within(&(90.0..=100.0)).unwrap(), 8..8);
    }

    #[test]
    fn test_check_scan_index() {
        let acquisition = synthetic_acquisition();
        assert!(acquisition.check_scan_index(7).is_ok());
        assert!(matches!(
            acquisition.check_scan_index(8),
            Err(Error::ScanNotFound(8, 8))
        ));
    }
}
