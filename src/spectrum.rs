use std::ops::RangeInclusive;

use ndarray::{Array1, Axis};

use crate::{configuration::IntensityAggregation, error::Error};

/// Peak list of a single scan, m/z ascending.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    scan_index: usize,
    mz: Array1<f64>,
    intensity: Array1<f64>,
}

impl Spectrum {
    /// Creates a new spectrum. Peaks are sorted by m/z if they are not already.
    ///
    /// # Arguments
    /// * `scan_index` - Index of the owning scan.
    /// * `mz` - m/z values
    /// * `intensity` - Intensities, same length as `mz`
    ///
    pub fn new(scan_index: usize, mz: Array1<f64>, intensity: Array1<f64>) -> Result<Self, Error> {
        if mz.len() != intensity.len() {
            return Err(Error::SpectrumShape(mz.len(), intensity.len()));
        }

        let is_sorted = mz.iter().zip(mz.iter().skip(1)).all(|(a, b)| a <= b);
        if is_sorted {
            return Ok(Self {
                scan_index,
                mz,
                intensity,
            });
        }

        let mut order = (0..mz.len()).collect::<Vec<usize>>();
        order.sort_by(|&a, &b| mz[a].total_cmp(&mz[b]));

        Ok(Self {
            scan_index,
            mz: mz.select(Axis(0), &order),
            intensity: intensity.select(Axis(0), &order),
        })
    }

    pub fn empty(scan_index: usize) -> Self {
        Self {
            scan_index,
            mz: Array1::zeros(0),
            intensity: Array1::zeros(0),
        }
    }

    pub fn scan_index(&self) -> usize {
        self.scan_index
    }

    pub fn mz(&self) -> &Array1<f64> {
        &self.mz
    }

    pub fn intensity(&self) -> &Array1<f64> {
        &self.intensity
    }

    pub fn len(&self) -> usize {
        self.mz.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mz.is_empty()
    }

    pub fn peaks(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.mz.iter().copied().zip(self.intensity.iter().copied())
    }

    /// Indexes of the peaks within the (inclusive) m/z window.
    fn window_indexes(&self, mz_window: &RangeInclusive<f64>) -> Vec<usize> {
        self.mz
            .iter()
            .enumerate()
            .skip_while(|(_, mz)| **mz < *mz_window.start())
            .take_while(|(_, mz)| **mz <= *mz_window.end())
            .map(|(index, _)| index)
            .collect()
    }

    /// Returns a new spectrum only containing the peaks within the (inclusive) m/z window.
    ///
    pub fn window(&self, mz_window: &RangeInclusive<f64>) -> Spectrum {
        let indexes = self.window_indexes(mz_window);
        Spectrum {
            scan_index: self.scan_index,
            mz: self.mz.select(Axis(0), &indexes),
            intensity: self.intensity.select(Axis(0), &indexes),
        }
    }

    /// Aggregates the intensities of all peaks within the m/z window.
    /// Returns 0.0 if no peak falls into the window.
    ///
    /// # Arguments
    /// * `mz_window` - Inclusive m/z window
    /// * `aggregation` - How to combine multiple peaks
    ///
    pub fn aggregate(&self, mz_window: &RangeInclusive<f64>, aggregation: IntensityAggregation) -> f64 {
        let intensities = self
            .window_indexes(mz_window)
            .into_iter()
            .map(|index| self.intensity[index]);

        match aggregation {
            IntensityAggregation::Sum => intensities.sum(),
            IntensityAggregation::Max => intensities.fold(0.0, f64::max),
        }
    }

    /// Most intense peak as (m/z, intensity)
    pub fn base_peak(&self) -> Option<(f64, f64)> {
        self.peaks()
            .fold(None, |best: Option<(f64, f64)>, peak| match best {
                Some(b) if b.1 >= peak.1 => Some(b),
                _ => Some(peak),
            })
    }
}
