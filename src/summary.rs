use std::ops::RangeInclusive;

use crate::{error::Error, scan::MsLevel, source::ScanSource, utils::validate_range};

/// Scan statistics and injection time distributions of an acquisition.
#[derive(Debug, Clone, PartialEq)]
pub struct AcquisitionSummary {
    pub scan_count: usize,
    pub ms1_count: usize,
    pub ms2_count: usize,
    /// First and last retention time, `None` for an empty acquisition
    pub rt_span: Option<(f64, f64)>,
    pub spectra_rt_range: RangeInclusive<f64>,
    /// MS1 scans within `spectra_rt_range`
    pub ms1_in_range: usize,
    /// MS2 scans within `spectra_rt_range`
    pub ms2_in_range: usize,
    /// Injection times (ms) of the MS1 scans within `spectra_rt_range`
    pub ms1_injection_times: Vec<f64>,
    /// Injection times (ms) of the MS2 scans within `spectra_rt_range`
    pub ms2_injection_times: Vec<f64>,
}

impl AcquisitionSummary {
    /// Summarizes the acquisition.
    ///
    /// # Arguments
    /// * `source` - Acquisition
    /// * `spectra_rt_range` - Retention time range for the in-range counts
    ///
    pub fn from_source<S: ScanSource + ?Sized>(
        source: &S,
        spectra_rt_range: RangeInclusive<f64>,
    ) -> Result<Self, Error> {
        validate_range("retention time", &spectra_rt_range)?;

        let scan_count = source.scan_count();
        let mut ms1_count = 0;
        let mut ms2_count = 0;
        for scan_index in 0..scan_count {
            match source.ms_level(scan_index)? {
                MsLevel::Ms1 => ms1_count += 1,
                MsLevel::Ms2 => ms2_count += 1,
            }
        }

        let mut ms1_in_range = 0;
        let mut ms2_in_range = 0;
        let mut ms1_injection_times = Vec::new();
        let mut ms2_injection_times = Vec::new();
        for scan_index in source.scans_within(&spectra_rt_range)? {
            let injection_time = source.injection_time(scan_index)?;
            match source.ms_level(scan_index)? {
                MsLevel::Ms1 => {
                    ms1_in_range += 1;
                    ms1_injection_times.extend(injection_time);
                }
                MsLevel::Ms2 => {
                    ms2_in_range += 1;
                    ms2_injection_times.extend(injection_time);
                }
            }
        }

        let rt_span = if scan_count > 0 {
            Some((
                source.retention_time(0)?,
                source.retention_time(scan_count - 1)?,
            ))
        } else {
            None
        };

        Ok(Self {
            scan_count,
            ms1_count,
            ms2_count,
            rt_span,
            spectra_rt_range,
            ms1_in_range,
            ms2_in_range,
            ms1_injection_times,
            ms2_injection_times,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::tests::synthetic_acquisition;

    #[test]
    fn test_summary() {
        let acquisition = synthetic_acquisition();
        let summary = AcquisitionSummary::from_source(&acquisition, 46.0..=47.5).unwrap();
        assert_eq!(summary.scan_count, 8);
        assert_eq!(summary.ms1_count, 4);
        assert_eq!(summary.ms2_count, 4);
        assert_eq!(summary.rt_span, Some((45.0, 48.1)));
        assert_eq!(summary.ms1_in_range, 2);
        assert_eq!(summary.ms2_in_range, 2);
        assert_eq!(summary.ms1_injection_times, vec![25.0, 30.0]);
        assert_eq!(summary.ms2_injection_times, vec![55.0, 60.0]);
    }

    #[test]
    fn test_injection_times_outside_range_are_ignored() {
        let acquisition = synthetic_acquisition();

        // scan 6 has no injection time, scan 7 is the only MS2 scan in range
        let summary = AcquisitionSummary::from_source(&acquisition, 47.5..=49.0).unwrap();
        assert_eq!(summary.ms1_in_range, 1);
        assert!(summary.ms1_injection_times.is_empty());
        assert_eq!(summary.ms2_injection_times, vec![65.0]);

        let summary = AcquisitionSummary::from_source(&acquisition, 90.0..=120.0).unwrap();
        assert!(summary.ms1_injection_times.is_empty());
        assert!(summary.ms2_injection_times.is_empty());

        let summary = AcquisitionSummary::from_source(&acquisition, 1.0..=120.0).unwrap();
        assert_eq!(summary.ms1_injection_times, vec![20.0, 25.0, 30.0]);
        assert_eq!(summary.ms2_injection_times, vec![50.0, 55.0, 60.0, 65.0]);
    }

    #[test]
    fn test_inverted_range() {
        let acquisition = synthetic_acquisition();
        assert!(matches!(
            AcquisitionSummary::from_source(&acquisition, 120.0..=1.0),
            Err(Error::EmptyRange { .. })
        ));
    }
}
