use std::ops::RangeInclusive;

use rustyms::Element::{Electron, H as Hydrogen};

use crate::error::Error;

/// Mass of a proton (Dalton): monoisotopic hydrogen minus one electron
pub fn proton_mass() -> Result<f64, Error> {
    let hydrogen = Hydrogen
        .mass(None)
        .ok_or(Error::UnknownElementMass("H"))?;
    let electron = Electron
        .mass(None)
        .ok_or(Error::UnknownElementMass("electron"))?;
    Ok(hydrogen.value - electron.value)
}

/// Converts a neutral mass (Dalton) into the m/z (Thompson) of the protonated ion.
///
/// # Arguments
/// * `mass` - Neutral monoisotopic mass
/// * `charge` - Charge
///
pub fn neutral_mass_to_mz(mass: f64, charge: usize) -> Result<f64, Error> {
    if charge == 0 {
        return Err(Error::InvalidCharge(charge));
    }
    let charge = charge as f64;
    Ok((mass + proton_mass()? * charge) / charge)
}

/// Fails with [`Error::EmptyRange`] if the range is inverted (or contains NaN).
pub fn validate_range(kind: &'static str, range: &RangeInclusive<f64>) -> Result<(), Error> {
    if range.is_empty() {
        return Err(Error::EmptyRange {
            kind,
            lo: *range.start(),
            hi: *range.end(),
        });
    }
    Ok(())
}
