use std::ops::RangeInclusive;

use crate::{
    configuration::TargetSpecies,
    correlation_result::{CorrelationResult, FragmentMatch},
    error::Error,
    scan::MsLevel,
    source::ScanSource,
    utils::validate_range,
};

/// Associates a precursor apex with the nearest MS2 scan acquired for it.
///
/// Retention time alone does not identify a fragmentation event, as co-eluting species
/// are fragmented at the same time. Candidates are therefore restricted by precursor m/z
/// before the nearest one (by scan index) is selected.
pub struct CorrelationEngine<'a, S: ScanSource + ?Sized> {
    source: &'a S,
}

impl<'a, S: ScanSource + ?Sized> CorrelationEngine<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    /// Maps an apex retention time to the nearest scan, ties resolve to the earlier scan.
    ///
    /// # Arguments
    /// * `apex_retention_time` - Retention time (minutes) of the apex
    ///
    pub fn locate_apex_scan(&self, apex_retention_time: f64) -> Result<usize, Error> {
        self.source.scan_index_for(apex_retention_time)
    }

    /// Enumerates all MS2 scans within the retention time range whose precursor m/z lies
    /// within `mass_tolerance` of `target_mz`, ordered by scan index. May be empty.
    ///
    /// # Arguments
    /// * `target_mz` - Precursor m/z to look for
    /// * `mass_tolerance` - Absolute m/z tolerance
    /// * `rt_range` - Inclusive retention time range (minutes)
    ///
    pub fn fragmentation_candidates(
        &self,
        target_mz: f64,
        mass_tolerance: f64,
        rt_range: &RangeInclusive<f64>,
    ) -> Result<Vec<usize>, Error> {
        validate_range("retention time", rt_range)?;

        let mut candidates = Vec::new();
        for scan_index in self.source.scans_within(rt_range)? {
            if self.source.ms_level(scan_index)? != MsLevel::Ms2 {
                continue;
            }
            if (self.source.precursor_mz(scan_index)? - target_mz).abs() <= mass_tolerance {
                candidates.push(scan_index);
            }
        }
        Ok(candidates)
    }

    /// Finds the MS2 scan for the target nearest to the reference (apex) scan.
    /// No candidate is reported as a result without a match, not as an error.
    ///
    /// # Arguments
    /// * `target` - Target species providing m/z, tolerance and retention time window
    /// * `reference_scan` - Scan index of the precursor apex
    ///
    pub fn correlate_fragment_scan(
        &self,
        target: &TargetSpecies,
        reference_scan: usize,
    ) -> Result<CorrelationResult, Error> {
        self.source.check_scan_index(reference_scan)?;
        let rt_range = target.rt_range();
        let candidates =
            self.fragmentation_candidates(target.mz, target.mass_tolerance, &rt_range)?;

        let matched = match nearest_scan(&candidates, reference_scan) {
            Ok(scan_index) => Some(FragmentMatch {
                scan_index,
                retention_time: self.source.retention_time(scan_index)?,
                isolation_center: self.source.precursor_mz(scan_index)?,
                isolation_width: self.source.isolation_width(scan_index)?,
            }),
            Err(Error::NoCandidate(_)) => {
                log::warn!(
                    "No MS2 scan found covering precursor {:.4} in range {:.2}-{:.2}",
                    target.mz,
                    rt_range.start(),
                    rt_range.end()
                );
                None
            }
            Err(err) => return Err(err),
        };

        Ok(CorrelationResult {
            reference_scan,
            candidates,
            matched,
        })
    }
}

/// Selects the candidate with the minimal scan index distance to the reference scan,
/// ties resolve to the smaller scan index.
///
/// # Arguments
/// * `candidates` - Candidate scan indexes
/// * `reference_scan` - Reference scan index
///
pub fn nearest_scan(candidates: &[usize], reference_scan: usize) -> Result<usize, Error> {
    candidates
        .iter()
        .copied()
        .min_by_key(|&candidate| (candidate.abs_diff(reference_scan), candidate))
        .ok_or(Error::NoCandidate(reference_scan))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::tests::{synthetic_acquisition, IRT_MZ};

    #[test]
    fn test_nearest_scan() {
        assert_eq!(nearest_scan(&[100, 150, 200], 140).unwrap(), 150);
        assert_eq!(nearest_scan(&[100], 140).unwrap(), 100);
        assert_eq!(nearest_scan(&[200, 100, 150], 140).unwrap(), 150);
    }

    #[test]
    fn test_nearest_scan_tie_resolves_to_smaller_index() {
        assert_eq!(nearest_scan(&[130, 150], 140).unwrap(), 130);
        assert_eq!(nearest_scan(&[150, 130], 140).unwrap(), 130);
    }

    #[test]
    fn test_nearest_scan_without_candidates() {
        assert!(matches!(
            nearest_scan(&[], 140),
            Err(Error::NoCandidate(140))
        ));
    }

    #[test]
    fn test_locate_apex_scan() {
        let acquisition = synthetic_acquisition();
        let engine = CorrelationEngine::new(&acquisition);
        assert_eq!(engine.locate_apex_scan(46.0).unwrap(), 2);
    }

    #[test]
    fn test_fragmentation_candidates() {
        let acquisition = synthetic_acquisition();
        let engine = CorrelationEngine::new(&acquisition);
        let candidates = engine
            .fragmentation_candidates(IRT_MZ, 0.01, &(41.75..=51.75))
            .unwrap();
        assert_eq!(candidates, vec![1, 5]);
        for candidate in candidates {
            let precursor = acquisition.precursor_mz(candidate).unwrap();
            assert!((precursor - IRT_MZ).abs() <= 0.01);
        }

        // retention time range excludes scan 1
        let candidates = engine
            .fragmentation_candidates(IRT_MZ, 0.01, &(46.0..=51.75))
            .unwrap();
        assert_eq!(candidates, vec![5]);

        // wider tolerance picks up scan 7
        let candidates = engine
            .fragmentation_candidates(IRT_MZ, 0.1, &(41.75..=51.75))
            .unwrap();
        assert_eq!(candidates, vec![1, 5, 7]);
    }

    #[test]
    fn test_correlate_fragment_scan() {
        let acquisition = synthetic_acquisition();
        let engine = CorrelationEngine::new(&acquisition);
        let target = TargetSpecies::pierce_irt();

        let result = engine.correlate_fragment_scan(&target, 2).unwrap();
        assert_eq!(result.reference_scan, 2);
        assert_eq!(result.candidates, vec![1, 5]);
        assert_eq!(
            result.matched,
            Some(FragmentMatch {
                scan_index: 1,
                retention_time: 45.1,
                isolation_center: 695.83,
                isolation_width: 1.6,
            })
        );

        let result = engine.correlate_fragment_scan(&target, 6).unwrap();
        assert_eq!(result.matched.unwrap().scan_index, 5);
    }

    #[test_log::test]
    fn test_correlate_fragment_scan_without_candidates() {
        let acquisition = synthetic_acquisition();
        let engine = CorrelationEngine::new(&acquisition);
        let target = TargetSpecies::new("absent", 2, 900.0, 46.0);

        let result = engine.correlate_fragment_scan(&target, 2).unwrap();
        assert!(result.candidates.is_empty());
        assert_eq!(result.matched, None);
    }

    #[test]
    fn test_correlate_fragment_scan_invalid_reference() {
        let acquisition = synthetic_acquisition();
        let engine = CorrelationEngine::new(&acquisition);
        assert!(matches!(
            engine.correlate_fragment_scan(&TargetSpecies::pierce_irt(), 42),
            Err(Error::ScanNotFound(42, 8))
        ));
    }
}
