use std::path::Path;

use mzdata::{io::MZReader, prelude::*, spectrum::MultiLayerSpectrum};
use ndarray::Array1;

use crate::{
    acquisition::Acquisition,
    error::Error,
    scan::{MsLevel, Scan},
    spectrum::Spectrum,
};

/// Reads an instrument file (mzML or MGF) into an in-memory acquisition.
///
/// The file is read once, sequentially. Spectra with an MS level above 2 are skipped,
/// the remaining scans are re-indexed contiguously in file order.
///
/// # Arguments
/// * `path` - Path of the instrument file
///
pub fn read_acquisition<P: AsRef<Path>>(path: P) -> Result<Acquisition, Error> {
    let path = path.as_ref();
    log::info!("Reading {}", path.display());
    let reader = MZReader::open_path(path.to_path_buf())?;

    let mut scans = Vec::new();
    let mut spectra = Vec::new();
    let mut skipped = 0;
    for spectrum in reader {
        let index = scans.len();
        let ms_level = match MsLevel::from_level(index, spectrum.ms_level()) {
            Ok(ms_level) => ms_level,
            Err(err) => {
                log::debug!("Skipping {}: {err}", spectrum.id());
                skipped += 1;
                continue;
            }
        };

        let scan = match ms_level {
            MsLevel::Ms1 => Scan::ms1(index, spectrum.start_time()),
            MsLevel::Ms2 => {
                let precursor = spectrum
                    .precursor()
                    .ok_or(Error::MissingPrecursor(index))?;
                let ion = precursor
                    .ions
                    .first()
                    .ok_or(Error::MissingPrecursor(index))?;
                let window = &precursor.isolation_window;
                let isolation_width = (window.upper_bound - window.lower_bound).max(0.0) as f64;
                Scan::ms2(index, spectrum.start_time(), ion.mz, isolation_width)
            }
        };
        // readers report 0.0 if the injection time is unknown
        let scan = match spectrum
            .acquisition()
            .first_scan()
            .map(|event| event.injection_time as f64)
        {
            Some(injection_time) if injection_time > 0.0 => scan.with_injection_time(injection_time),
            _ => scan,
        };

        spectra.push(convert_spectrum(index, &spectrum)?);
        scans.push(scan);
    }

    if skipped > 0 {
        log::info!("Skipped {skipped} spectra with MS level > 2");
    }
    log::info!("Read {} scans from {}", scans.len(), path.display());
    Acquisition::new(scans, spectra)
}

fn convert_spectrum(index: usize, spectrum: &MultiLayerSpectrum) -> Result<Spectrum, Error> {
    let (mz, intensity): (Vec<f64>, Vec<f64>) = match (&spectrum.arrays, &spectrum.peaks) {
        (Some(arrays), _) => {
            let mz = arrays.mzs()?;
            let intensity = arrays.intensities()?;
            (
                mz.to_vec(),
                intensity.iter().map(|&i| i as f64).collect(),
            )
        }
        (None, Some(peaks)) => peaks
            .iter()
            .map(|peak| (peak.mz, peak.intensity as f64))
            .unzip(),
        (None, None) => (Vec::new(), Vec::new()),
    };
    Spectrum::new(index, Array1::from(mz), Array1::from(intensity))
}
