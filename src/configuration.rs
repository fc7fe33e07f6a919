use std::{fmt, ops::RangeInclusive, str::FromStr};

use rustyms::CompoundPeptidoformIon;

use crate::{error::Error, utils::neutral_mass_to_mz};

/// Default m/z tolerance around the expected m/z of a target species.
pub const DEFAULT_MASS_TOLERANCE: f64 = 0.01;

/// Default retention time window (+/- minutes) around the expected retention time.
pub const DEFAULT_RT_WINDOW: f64 = 5.0;

/// How the intensities of multiple peaks within the m/z window of a trace are combined per scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IntensityAggregation {
    #[default]
    Sum,
    Max,
}

impl FromStr for IntensityAggregation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sum" => Ok(IntensityAggregation::Sum),
            "max" => Ok(IntensityAggregation::Max),
            _ => Err(Error::InvalidAggregation(s.to_string())),
        }
    }
}

impl fmt::Display for IntensityAggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntensityAggregation::Sum => write!(f, "sum"),
            IntensityAggregation::Max => write!(f, "max"),
        }
    }
}

/// A reference analyte of known m/z and elution time, e.g. a spiked-in iRT peptide.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetSpecies {
    pub label: String,
    /// ProForma sequence, if the species is a peptide
    pub sequence: Option<String>,
    pub charge: usize,
    /// Expected m/z
    pub mz: f64,
    /// Expected retention time (minutes)
    pub retention_time: f64,
    /// Absolute m/z tolerance
    pub mass_tolerance: f64,
    /// Search window (+/- minutes) around the expected retention time
    pub rt_window: f64,
}

impl TargetSpecies {
    /// Creates a new target with default tolerance and retention time window.
    ///
    /// # Arguments
    /// * `label` - Name shown in the report
    /// * `charge` - Charge state
    /// * `mz` - Expected m/z
    /// * `retention_time` - Expected retention time in minutes
    ///
    pub fn new(label: impl Into<String>, charge: usize, mz: f64, retention_time: f64) -> Self {
        Self {
            label: label.into(),
            sequence: None,
            charge,
            mz,
            retention_time,
            mass_tolerance: DEFAULT_MASS_TOLERANCE,
            rt_window: DEFAULT_RT_WINDOW,
        }
    }

    pub fn with_sequence(mut self, sequence: impl Into<String>) -> Self {
        self.sequence = Some(sequence.into());
        self
    }

    pub fn with_mass_tolerance(mut self, mass_tolerance: f64) -> Self {
        self.mass_tolerance = mass_tolerance;
        self
    }

    pub fn with_rt_window(mut self, rt_window: f64) -> Self {
        self.rt_window = rt_window;
        self
    }

    /// Pierce iRT peptide TASEFDSAIAQDK (heavy lysine), 2+.
    pub fn pierce_irt() -> Self {
        Self::new("TASEFDSAIAQDK", 2, 695.8324, 46.75).with_sequence("TASEFDSAIAQDK[+8.014199]")
    }

    /// m/z window for trace extraction: expected m/z +/- mass tolerance
    pub fn mz_range(&self) -> RangeInclusive<f64> {
        (self.mz - self.mass_tolerance)..=(self.mz + self.mass_tolerance)
    }

    /// Retention time search range: expected retention time +/- window
    pub fn rt_range(&self) -> RangeInclusive<f64> {
        (self.retention_time - self.rt_window)..=(self.retention_time + self.rt_window)
    }

    /// Checks whether the given m/z lies within tolerance of the expected m/z.
    pub fn matches_mz(&self, mz: f64) -> bool {
        (mz - self.mz).abs() <= self.mass_tolerance
    }

    /// Monoisotopic m/z of the sequence at the configured charge.
    /// `None` if no sequence is configured.
    ///
    pub fn theoretical_mz(&self) -> Result<Option<f64>, Error> {
        let sequence = match self.sequence.as_ref() {
            Some(sequence) => sequence,
            None => return Ok(None),
        };
        if self.charge == 0 {
            return Err(Error::InvalidCharge(self.charge));
        }

        let peptide = CompoundPeptidoformIon::pro_forma(sequence, None)
            .map_err(Error::InvalidPeptideSequence)?;

        match peptide.formulas().mass_bounds().into_option() {
            Some((min, _)) => Ok(Some(neutral_mass_to_mz(
                min.monoisotopic_mass().value,
                self.charge,
            )?)),
            None => Ok(None),
        }
    }
}

/// Parses `label,charge,mz,rt[,tolerance[,rt_window]]`
impl FromStr for TargetSpecies {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidTarget(s.to_string());
        let fields = s.split(',').map(str::trim).collect::<Vec<&str>>();
        if !(4..=6).contains(&fields.len()) || fields[0].is_empty() {
            return Err(invalid());
        }

        let charge = fields[1].parse::<usize>().map_err(|_| invalid())?;
        if charge == 0 {
            return Err(Error::InvalidCharge(charge));
        }
        // m/z, retention time and widths must be finite, widths must not be negative
        let parse = |field: &str, min: f64| match field.parse::<f64>() {
            Ok(value) if value.is_finite() && value >= min => Ok(value),
            _ => Err(invalid()),
        };
        let mz = parse(fields[2], 0.0)?;
        let retention_time = parse(fields[3], f64::MIN)?;

        let mut target = TargetSpecies::new(fields[0], charge, mz, retention_time);
        if let Some(tolerance) = fields.get(4) {
            target = target.with_mass_tolerance(parse(*tolerance, 0.0)?);
        }
        if let Some(rt_window) = fields.get(5) {
            target = target.with_rt_window(parse(*rt_window, 0.0)?);
        }
        Ok(target)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    pub aggregation: IntensityAggregation,
    pub targets: Vec<TargetSpecies>,
    /// Number of isotope spacings on each side of the target m/z shown in the MS1 panel
    pub isotope_offset: usize,
    /// Retention time range used for the acquisition summary
    pub spectra_rt_range: RangeInclusive<f64>,
}

impl Configuration {
    pub fn new(
        aggregation: IntensityAggregation,
        targets: Vec<TargetSpecies>,
        isotope_offset: usize,
        spectra_rt_range: RangeInclusive<f64>,
    ) -> Self {
        Self {
            aggregation,
            targets,
            isotope_offset,
            spectra_rt_range,
        }
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::new(
            IntensityAggregation::Sum,
            vec![TargetSpecies::pierce_irt()],
            2,
            1.0..=120.0,
        )
    }
}
