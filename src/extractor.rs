use std::ops::RangeInclusive;

use crate::{
    configuration::IntensityAggregation,
    error::Error,
    scan::MsLevel,
    source::ScanSource,
    spectrum::Spectrum,
    trace::Trace,
    utils::validate_range,
};

/// Builds ion traces and windowed spectra from a scan source.
pub struct IonTraceExtractor<'a, S: ScanSource + ?Sized> {
    source: &'a S,
    aggregation: IntensityAggregation,
}

impl<'a, S: ScanSource + ?Sized> IonTraceExtractor<'a, S> {
    /// Creates a new extractor.
    ///
    /// Arguments:
    /// * `source` - The acquisition to extract from.
    /// * `aggregation` - How intensities of multiple peaks within the m/z window are combined per scan.
    ///
    pub fn new(source: &'a S, aggregation: IntensityAggregation) -> Self {
        Self {
            source,
            aggregation,
        }
    }

    /// Builds the trace (XIC) of the m/z window over all MS1 scans within the retention time range.
    /// MS1 scans without peaks in the m/z window contribute a zero intensity point.
    ///
    /// Arguments:
    /// * `rt_range` - Inclusive retention time range (minutes)
    /// * `mz_range` - Inclusive m/z window
    ///
    pub fn build_trace(
        &self,
        rt_range: RangeInclusive<f64>,
        mz_range: RangeInclusive<f64>,
    ) -> Result<Trace, Error> {
        validate_range("retention time", &rt_range)?;
        validate_range("m/z", &mz_range)?;

        let mut points = Vec::new();
        for scan_index in self.source.scans_within(&rt_range)? {
            if self.source.ms_level(scan_index)? != MsLevel::Ms1 {
                continue;
            }
            let intensity = self
                .source
                .spectrum(scan_index)?
                .aggregate(&mz_range, self.aggregation);
            points.push((self.source.retention_time(scan_index)?, intensity));
        }

        log::debug!(
            "Trace m/z {:.4}-{:.4}, rt {:.2}-{:.2}: {} points",
            mz_range.start(),
            mz_range.end(),
            rt_range.start(),
            rt_range.end(),
            points.len()
        );

        Ok(Trace::new(points, mz_range, rt_range))
    }

    /// Returns the spectrum of a scan, optionally reduced to the (inclusive) m/z window.
    ///
    /// Arguments:
    /// * `scan_index` - Scan to extract
    /// * `mz_window` - Optional m/z window
    ///
    pub fn extract_spectrum(
        &self,
        scan_index: usize,
        mz_window: Option<RangeInclusive<f64>>,
    ) -> Result<Spectrum, Error> {
        self.source.check_scan_index(scan_index)?;
        let spectrum = self.source.spectrum(scan_index)?;
        match mz_window {
            Some(mz_window) => {
                validate_range("m/z", &mz_window)?;
                Ok(spectrum.window(&mz_window))
            }
            None => Ok(spectrum.clone()),
        }
    }
}

/// m/z window covering `isotope_offset` isotope spacings (1/charge) on each side of `mz`.
/// Pure arithmetic, the window may contain no peaks at all.
///
/// Arguments:
/// * `mz` - Center m/z
/// * `charge` - Charge state, at least 1
/// * `isotope_offset` - Number of isotope spacings on each side
///
pub fn isotope_window(
    mz: f64,
    charge: usize,
    isotope_offset: usize,
) -> Result<RangeInclusive<f64>, Error> {
    if charge == 0 {
        return Err(Error::InvalidCharge(charge));
    }
    let half_width = isotope_offset as f64 / charge as f64;
    Ok((mz - half_width)..=(mz + half_width))
}
