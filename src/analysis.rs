use crate::{
    configuration::{Configuration, TargetSpecies},
    correlation::CorrelationEngine,
    correlation_result::FragmentMatch,
    error::Error,
    extractor::{isotope_window, IonTraceExtractor},
    source::ScanSource,
    spectrum::Spectrum,
    trace::{Apex, Trace},
};

/// Outcome of the target species check. Only `Found` carries all panels, the other
/// variants carry a diagnostic to show instead of the missing ones.
#[derive(Debug, Clone, PartialEq)]
pub enum TargetOutcome {
    /// No MS1 signal within the m/z and retention time window
    NoSignal { diagnostic: String },
    /// MS1 signal found, but no MS2 scan was acquired for the precursor
    NoFragmentScan {
        apex: Apex,
        apex_scan: usize,
        ms1: Spectrum,
        diagnostic: String,
    },
    Found {
        apex: Apex,
        apex_scan: usize,
        ms1: Spectrum,
        fragment: FragmentMatch,
        ms2: Spectrum,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TargetAnalysis {
    pub target: TargetSpecies,
    pub trace: Trace,
    pub outcome: TargetOutcome,
}

impl TargetAnalysis {
    pub fn diagnostic(&self) -> Option<&str> {
        match &self.outcome {
            TargetOutcome::NoSignal { diagnostic } => Some(diagnostic),
            TargetOutcome::NoFragmentScan { diagnostic, .. } => Some(diagnostic),
            TargetOutcome::Found { .. } => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self.outcome, TargetOutcome::Found { .. })
    }
}

/// Runs the full check of one target species: trace, apex, MS1 isotope window,
/// nearest MS2 scan and its spectrum.
///
/// Absent signal and absent MS2 scans are reported within the returned analysis,
/// only contract violations and reader failures are returned as errors.
///
/// # Arguments
/// * `source` - Acquisition to analyze
/// * `config` - Configuration (aggregation, isotope offset)
/// * `target` - Target species to look for
///
pub fn analyze_target<S: ScanSource + ?Sized>(
    source: &S,
    config: &Configuration,
    target: &TargetSpecies,
) -> Result<TargetAnalysis, Error> {
    check_theoretical_mz(target);

    let extractor = IonTraceExtractor::new(source, config.aggregation);
    let engine = CorrelationEngine::new(source);

    let trace = extractor.build_trace(target.rt_range(), target.mz_range())?;

    let apex = match trace.require_apex() {
        Ok(apex) if apex.intensity > 0.0 => apex,
        Ok(_) | Err(Error::EmptyTrace) => {
            let diagnostic = format!(
                "no MS1 signal for {} at m/z {:.4} +/- {} in range {:.2}-{:.2}",
                target.label,
                target.mz,
                target.mass_tolerance,
                target.rt_range().start(),
                target.rt_range().end()
            );
            log::warn!("{diagnostic}");
            return Ok(TargetAnalysis {
                target: target.clone(),
                trace,
                outcome: TargetOutcome::NoSignal { diagnostic },
            });
        }
        Err(err) => return Err(err),
    };

    let apex_scan = engine.locate_apex_scan(apex.retention_time)?;
    let ms1_window = isotope_window(target.mz, target.charge, config.isotope_offset)?;
    let ms1 = extractor.extract_spectrum(apex_scan, Some(ms1_window))?;

    let correlation = engine.correlate_fragment_scan(target, apex_scan)?;
    let outcome = match correlation.matched {
        Some(fragment) => {
            log::info!(
                "{}: apex at {:.2} min (scan {}), MS2 scan {} at {:.2} min",
                target.label,
                apex.retention_time,
                apex_scan,
                fragment.scan_index,
                fragment.retention_time
            );
            let ms2 = extractor.extract_spectrum(fragment.scan_index, None)?;
            TargetOutcome::Found {
                apex,
                apex_scan,
                ms1,
                fragment,
                ms2,
            }
        }
        None => TargetOutcome::NoFragmentScan {
            apex,
            apex_scan,
            ms1,
            diagnostic: format!(
                "no MS2 scan found covering precursor {:.4} in range {:.2}-{:.2}",
                target.mz,
                target.rt_range().start(),
                target.rt_range().end()
            ),
        },
    };

    Ok(TargetAnalysis {
        target: target.clone(),
        trace,
        outcome,
    })
}

/// Warns if the configured m/z does not match the m/z of the configured sequence.
fn check_theoretical_mz(target: &TargetSpecies) {
    match target.theoretical_mz() {
        Ok(Some(theoretical)) if !target.matches_mz(theoretical) => log::warn!(
            "{}: configured m/z {:.4} differs from theoretical m/z {:.4}",
            target.label,
            target.mz,
            theoretical
        ),
        Ok(_) => {}
        Err(err) => log::warn!("{}: cannot compute theoretical m/z: {err}", target.label),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        configuration::IntensityAggregation,
        utils::tests::{synthetic_acquisition, IRT_MZ},
    };

    #[test]
    fn test_analyze_target_found() {
        let acquisition = synthetic_acquisition();
        let config = Configuration::default();
        let analysis =
            analyze_target(&acquisition, &config, &TargetSpecies::pierce_irt()).unwrap();

        assert!(analysis.is_found());
        assert_eq!(analysis.diagnostic(), None);
        assert_eq!(analysis.trace.len(), 4);
        match analysis.outcome {
            TargetOutcome::Found {
                apex,
                apex_scan,
                ms1,
                fragment,
                ms2,
            } => {
                assert_eq!(apex.retention_time, 46.0);
                assert_eq!(apex.intensity, 75.0);
                assert_eq!(apex_scan, 2);
                assert_eq!(ms1.scan_index(), 2);
                assert_eq!(ms1.len(), 3);
                assert!(ms1.mz().iter().any(|mz| *mz == IRT_MZ));
                assert_eq!(fragment.scan_index, 1);
                assert_eq!(ms2.scan_index(), 1);
                assert_eq!(ms2.len(), 3);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn test_analyze_target_with_max_aggregation() {
        let acquisition = synthetic_acquisition();
        let config = Configuration {
            aggregation: IntensityAggregation::Max,
            ..Configuration::default()
        };
        let analysis =
            analyze_target(&acquisition, &config, &TargetSpecies::pierce_irt()).unwrap();
        assert_eq!(analysis.trace.apex().unwrap().intensity, 50.0);
    }

    #[test_log::test]
    fn test_analyze_target_no_signal() {
        let acquisition = synthetic_acquisition();
        let config = Configuration::default();

        // m/z without any peak
        let target = TargetSpecies::new("absent", 2, 900.0, 46.0);
        let analysis = analyze_target(&acquisition, &config, &target).unwrap();
        assert!(matches!(analysis.outcome, TargetOutcome::NoSignal { .. }));
        assert!(analysis.diagnostic().unwrap().contains("no MS1 signal"));

        // retention time outside of the acquisition
        let target = TargetSpecies::new("late", 2, IRT_MZ, 100.0);
        let analysis = analyze_target(&acquisition, &config, &target).unwrap();
        assert!(analysis.trace.is_empty());
        assert!(matches!(analysis.outcome, TargetOutcome::NoSignal { .. }));
    }

    #[test_log::test]
    fn test_analyze_target_without_fragment_scan() {
        let acquisition = synthetic_acquisition();
        let config = Configuration::default();

        // 500.0 has MS1 signal but was never selected for fragmentation
        let target = TargetSpecies::new("unfragmented", 1, 500.0, 46.0);
        let analysis = analyze_target(&acquisition, &config, &target).unwrap();
        match &analysis.outcome {
            TargetOutcome::NoFragmentScan {
                apex, apex_scan, ..
            } => {
                assert_eq!(apex.retention_time, 45.0);
                assert_eq!(*apex_scan, 0);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(
            analysis.diagnostic(),
            Some("no MS2 scan found covering precursor 500.0000 in range 41.00-51.00")
        );
    }
}
