use std::ops::RangeInclusive;

use ndarray::Array1;

use crate::error::Error;

/// Point of maximum intensity of a trace.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Apex {
    pub retention_time: f64,
    pub intensity: f64,
}

/// Extracted ion chromatogram (XIC): intensity vs. retention time for a fixed m/z window.
///
/// Points are ordered by retention time. Every MS1 scan within the retention time range
/// contributes a point, scans without matching peaks contribute zero intensity.
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    retention_time: Array1<f64>,
    intensity: Array1<f64>,
    mz_range: RangeInclusive<f64>,
    rt_range: RangeInclusive<f64>,
}

impl Trace {
    /// Creates a new trace.
    ///
    /// # Arguments
    /// * `points` - (retention time, intensity) pairs, retention time ascending
    /// * `mz_range` - m/z window the trace was extracted for
    /// * `rt_range` - retention time range the trace was extracted for
    ///
    pub fn new(
        points: Vec<(f64, f64)>,
        mz_range: RangeInclusive<f64>,
        rt_range: RangeInclusive<f64>,
    ) -> Self {
        let (retention_time, intensity): (Vec<f64>, Vec<f64>) = points.into_iter().unzip();
        Self {
            retention_time: Array1::from(retention_time),
            intensity: Array1::from(intensity),
            mz_range,
            rt_range,
        }
    }

    pub fn retention_time(&self) -> &Array1<f64> {
        &self.retention_time
    }

    pub fn intensity(&self) -> &Array1<f64> {
        &self.intensity
    }

    pub fn mz_range(&self) -> &RangeInclusive<f64> {
        &self.mz_range
    }

    pub fn rt_range(&self) -> &RangeInclusive<f64> {
        &self.rt_range
    }

    pub fn len(&self) -> usize {
        self.retention_time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.retention_time.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.retention_time
            .iter()
            .copied()
            .zip(self.intensity.iter().copied())
    }

    /// Point of maximum intensity, ties resolve to the earliest retention time.
    /// `None` for an empty trace.
    pub fn apex(&self) -> Option<Apex> {
        find_apex(self)
    }

    /// Same as [`Trace::apex`] but an empty trace is reported as [`Error::EmptyTrace`].
    pub fn require_apex(&self) -> Result<Apex, Error> {
        self.apex().ok_or(Error::EmptyTrace)
    }
}

/// Finds the apex of the trace.
///
/// # Arguments
/// * `trace` - Trace to search
///
pub fn find_apex(trace: &Trace) -> Option<Apex> {
    trace.points().fold(None, |apex, (retention_time, intensity)| match apex {
        // strictly greater keeps the earliest of equal maxima
        Some(current) if intensity <= current.intensity => Some(current),
        _ => Some(Apex {
            retention_time,
            intensity,
        }),
    })
}
