use crate::error::Error;

/// MS level of an acquired scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MsLevel {
    /// Precursor ion scan
    Ms1,
    /// Fragmentation scan
    Ms2,
}

impl MsLevel {
    /// Converts the numeric MS level reported by an instrument file.
    ///
    /// # Arguments
    /// * `scan_index` - Index of the scan, used for error reporting.
    /// * `level` - Numeric MS level.
    ///
    pub fn from_level(scan_index: usize, level: u8) -> Result<Self, Error> {
        match level {
            1 => Ok(MsLevel::Ms1),
            2 => Ok(MsLevel::Ms2),
            other => Err(Error::UnsupportedMsLevel(scan_index, other)),
        }
    }

    pub fn level(&self) -> u8 {
        match self {
            MsLevel::Ms1 => 1,
            MsLevel::Ms2 => 2,
        }
    }
}

/// Precursor selection of an MS2 scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Precursor {
    /// Isolation center (m/z)
    pub mz: f64,
    /// Full width of the isolation window (m/z)
    pub isolation_width: f64,
}

/// Metadata of one acquired spectrum.
#[derive(Debug, Clone, PartialEq)]
pub struct Scan {
    pub index: usize,
    /// Retention time in minutes
    pub retention_time: f64,
    pub ms_level: MsLevel,
    /// Only present for MS2 scans
    pub precursor: Option<Precursor>,
    /// Ion injection time in milliseconds, if reported by the instrument
    pub injection_time: Option<f64>,
}

impl Scan {
    pub fn ms1(index: usize, retention_time: f64) -> Self {
        Self {
            index,
            retention_time,
            ms_level: MsLevel::Ms1,
            precursor: None,
            injection_time: None,
        }
    }

    pub fn ms2(index: usize, retention_time: f64, precursor_mz: f64, isolation_width: f64) -> Self {
        Self {
            index,
            retention_time,
            ms_level: MsLevel::Ms2,
            precursor: Some(Precursor {
                mz: precursor_mz,
                isolation_width,
            }),
            injection_time: None,
        }
    }

    pub fn with_injection_time(mut self, injection_time: f64) -> Self {
        self.injection_time = Some(injection_time);
        self
    }

    /// Precursor of the scan, fails for MS1 scans or MS2 scans without a recorded precursor.
    pub fn require_precursor(&self) -> Result<&Precursor, Error> {
        match (self.ms_level, self.precursor.as_ref()) {
            (MsLevel::Ms2, Some(precursor)) => Ok(precursor),
            _ => Err(Error::MissingPrecursor(self.index)),
        }
    }
}
