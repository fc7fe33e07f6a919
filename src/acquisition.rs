use crate::{
    error::Error,
    scan::{MsLevel, Scan},
    source::ScanSource,
    spectrum::Spectrum,
};

/// In-memory acquisition: all scans and their spectra of one instrument run.
#[derive(Debug, Clone)]
pub struct Acquisition {
    scans: Vec<Scan>,
    spectra: Vec<Spectrum>,
}

impl Acquisition {
    /// Creates a new acquisition and validates it.
    ///
    /// # Arguments
    /// * `scans` - Scan metadata, scan `i` must have index `i`
    /// * `spectra` - One spectrum per scan, in the same order
    ///
    pub fn new(scans: Vec<Scan>, spectra: Vec<Spectrum>) -> Result<Self, Error> {
        if scans.len() != spectra.len() {
            return Err(Error::SpectrumShape(scans.len(), spectra.len()));
        }

        for (expected, (scan, spectrum)) in scans.iter().zip(spectra.iter()).enumerate() {
            if scan.index != expected {
                return Err(Error::ScanIndexMismatch(expected, scan.index));
            }
            if spectrum.scan_index() != expected {
                return Err(Error::ScanIndexMismatch(expected, spectrum.scan_index()));
            }
            if scan.ms_level == MsLevel::Ms2 {
                scan.require_precursor()?;
            }
        }

        if let Some(unsorted) = scans
            .windows(2)
            .find(|pair| pair[1].retention_time < pair[0].retention_time)
        {
            return Err(Error::UnsortedAcquisition(unsorted[1].index));
        }

        Ok(Self { scans, spectra })
    }

    pub fn scans(&self) -> &[Scan] {
        &self.scans
    }

    pub fn scan(&self, scan_index: usize) -> Result<&Scan, Error> {
        self.scans
            .get(scan_index)
            .ok_or(Error::ScanNotFound(scan_index, self.scans.len()))
    }
}

impl ScanSource for Acquisition {
    fn scan_count(&self) -> usize {
        self.scans.len()
    }

    fn retention_time(&self, scan_index: usize) -> Result<f64, Error> {
        Ok(self.scan(scan_index)?.retention_time)
    }

    fn scan_index_for(&self, retention_time: f64) -> Result<usize, Error> {
        if self.scans.is_empty() {
            return Err(Error::EmptyAcquisition);
        }

        let after = self
            .scans
            .partition_point(|scan| scan.retention_time < retention_time);
        if after == 0 {
            return Ok(0);
        }
        if after == self.scans.len() {
            return Ok(self.scans.len() - 1);
        }

        let before_distance = retention_time - self.scans[after - 1].retention_time;
        let after_distance = self.scans[after].retention_time - retention_time;
        if before_distance <= after_distance {
            Ok(after - 1)
        } else {
            Ok(after)
        }
    }

    fn injection_time(&self, scan_index: usize) -> Result<Option<f64>, Error> {
        Ok(self.scan(scan_index)?.injection_time)
    }

    fn spectrum(&self, scan_index: usize) -> Result<&Spectrum, Error> {
        self.spectra
            .get(scan_index)
            .ok_or(Error::ScanNotFound(scan_index, self.spectra.len()))
    }

    fn ms_level(&self, scan_index: usize) -> Result<MsLevel, Error> {
        Ok(self.scan(scan_index)?.ms_level)
    }

    fn precursor_mz(&self, scan_index: usize) -> Result<f64, Error> {
        Ok(self.scan(scan_index)?.require_precursor()?.mz)
    }

    fn isolation_width(&self, scan_index: usize) -> Result<f64, Error> {
        Ok(self.scan(scan_index)?.require_precursor()?.isolation_width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::tests::synthetic_acquisition;

    #[test]
    fn test_accessors() {
        let acquisition = synthetic_acquisition();
        assert_eq!(acquisition.scan_count(), 8);
        assert_eq!(acquisition.retention_time(2).unwrap(), 46.0);
        assert_eq!(acquisition.ms_level(3).unwrap(), MsLevel::Ms2);
        assert_eq!(acquisition.precursor_mz(5).unwrap(), 695.835);
        assert_eq!(acquisition.isolation_width(5).unwrap(), 2.0);
        assert_eq!(acquisition.spectrum(4).unwrap().len(), 1);
        assert_eq!(acquisition.injection_time(3).unwrap(), Some(55.0));
        assert_eq!(acquisition.injection_time(6).unwrap(), None);
    }

    #[test]
    fn test_out_of_range_scan() {
        let acquisition = synthetic_acquisition();
        assert!(matches!(
            acquisition.retention_time(8),
            Err(Error::ScanNotFound(8, 8))
        ));
        assert!(matches!(
            acquisition.spectrum(100),
            Err(Error::ScanNotFound(100, 8))
        ));
    }

    #[test]
    fn test_precursor_of_ms1_scan() {
        let acquisition = synthetic_acquisition();
        assert!(matches!(
            acquisition.precursor_mz(0),
            Err(Error::MissingPrecursor(0))
        ));
        assert!(matches!(
            acquisition.isolation_width(2),
            Err(Error::MissingPrecursor(2))
        ));
    }

    #[test]
    fn test_scan_index_for() {
        let acquisition = synthetic_acquisition();
        // exact
        assert_eq!(acquisition.scan_index_for(46.0).unwrap(), 2);
        // nearest
        assert_eq!(acquisition.scan_index_for(46.08).unwrap(), 3);
        assert_eq!(acquisition.scan_index_for(46.3).unwrap(), 3);
        // before the first and after the last scan
        assert_eq!(acquisition.scan_index_for(1.0).unwrap(), 0);
        assert_eq!(acquisition.scan_index_for(120.0).unwrap(), 7);
    }

    #[test]
    fn test_scan_index_for_tie_resolves_to_earlier_scan() {
        let acquisition = Acquisition::new(
            vec![Scan::ms1(0, 1.0), Scan::ms1(1, 2.0)],
            vec![Spectrum::empty(0), Spectrum::empty(1)],
        )
        .unwrap();
        assert_eq!(acquisition.scan_index_for(1.5).unwrap(), 0);
    }

    #[test]
    fn test_scan_index_for_empty_acquisition() {
        let acquisition = Acquisition::new(vec![], vec![]).unwrap();
        assert!(matches!(
            acquisition.scan_index_for(1.0),
            Err(Error::EmptyAcquisition)
        ));
    }

    #[test]
    fn test_validation() {
        let unsorted = Acquisition::new(
            vec![Scan::ms1(0, 2.0), Scan::ms1(1, 1.0)],
            vec![Spectrum::empty(0), Spectrum::empty(1)],
        );
        assert!(matches!(unsorted, Err(Error::UnsortedAcquisition(1))));

        let mismatch = Acquisition::new(vec![Scan::ms1(1, 1.0)], vec![Spectrum::empty(1)]);
        assert!(matches!(mismatch, Err(Error::ScanIndexMismatch(0, 1))));

        let mut ms2 = Scan::ms2(0, 1.0, 500.0, 1.6);
        ms2.precursor = None;
        let missing_precursor = Acquisition::new(vec![ms2], vec![Spectrum::empty(0)]);
        assert!(matches!(
            missing_precursor,
            Err(Error::MissingPrecursor(0))
        ));
    }
}
