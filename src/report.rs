use std::{fmt, fs, path::Path};

use plotly::{
    common::{DashType, Line, Mode},
    layout::{Axis, Layout},
    Bar, Histogram, Plot, Scatter,
};

use crate::{
    analysis::{analyze_target, TargetAnalysis, TargetOutcome},
    configuration::Configuration,
    correlation_result::FragmentMatch,
    error::Error,
    source::ScanSource,
    spectrum::Spectrum,
    summary::AcquisitionSummary,
    trace::Trace,
};

const PLOTLY_JS: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

/// One page QC summary of an acquisition.
#[derive(Debug, Clone, PartialEq)]
pub struct Datasheet {
    pub title: String,
    pub summary: AcquisitionSummary,
    /// One analysis per configured target species, empty if target checks were not requested
    pub analyses: Vec<TargetAnalysis>,
}

/// Generates the datasheet of an acquisition.
///
/// A missing target signal or MS2 scan does not fail the datasheet, it is reported
/// within the corresponding section instead.
///
/// # Arguments
/// * `title` - Page title, usually the file name
/// * `source` - Acquisition
/// * `config` - Configuration
/// * `include_targets` - Whether to check the configured target species
///
pub fn generate_datasheet<S: ScanSource + ?Sized>(
    title: impl Into<String>,
    source: &S,
    config: &Configuration,
    include_targets: bool,
) -> Result<Datasheet, Error> {
    let summary = AcquisitionSummary::from_source(source, config.spectra_rt_range.clone())?;

    let analyses = if include_targets {
        config
            .targets
            .iter()
            .map(|target| analyze_target(source, config, target))
            .collect::<Result<Vec<_>, Error>>()?
    } else {
        Vec::new()
    };

    Ok(Datasheet {
        title: title.into(),
        summary,
        analyses,
    })
}

impl Datasheet {
    /// Renders the datasheet as a standalone HTML page.
    pub fn to_html(&self) -> String {
        let mut body = String::new();
        body.push_str(&format!("<h1>{}</h1>\n", escape_html(&self.title)));
        body.push_str(&summary_html(&self.summary));
        body.push_str(&injection_times_html("MS1", &self.summary.ms1_injection_times));
        body.push_str(&injection_times_html("MS2", &self.summary.ms2_injection_times));

        for (index, analysis) in self.analyses.iter().enumerate() {
            body.push_str(&format!(
                "<h2>{} ({}+, m/z {:.4}, {:.2} min)</h2>\n",
                escape_html(&analysis.target.label),
                analysis.target.charge,
                analysis.target.mz,
                analysis.target.retention_time
            ));
            body.push_str(&section_html(index, analysis));
        }

        format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n\
             <script src=\"{PLOTLY_JS}\"></script>\n\
             <style>.warning {{ color: #b00020; font-weight: bold; }}</style>\n\
             </head>\n<body>\n{body}</body>\n</html>\n",
            escape_html(&self.title)
        )
    }

    /// Writes the HTML rendering to `path`.
    pub fn write_html<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        fs::write(path.as_ref(), self.to_html())?;
        log::info!("Datasheet written to {}", path.as_ref().display());
        Ok(())
    }
}

fn summary_html(summary: &AcquisitionSummary) -> String {
    let rt_span = match summary.rt_span {
        Some((first, last)) => format!("{first:.2} - {last:.2} min"),
        None => "-".to_string(),
    };
    format!(
        "<table>\n\
         <tr><td>Scans</td><td>{}</td></tr>\n\
         <tr><td>MS1 / MS2</td><td>{} / {}</td></tr>\n\
         <tr><td>Retention time</td><td>{}</td></tr>\n\
         <tr><td>MS1 / MS2 in {:.1} - {:.1} min</td><td>{} / {}</td></tr>\n\
         </table>\n",
        summary.scan_count,
        summary.ms1_count,
        summary.ms2_count,
        rt_span,
        summary.spectra_rt_range.start(),
        summary.spectra_rt_range.end(),
        summary.ms1_in_range,
        summary.ms2_in_range
    )
}

fn injection_times_html(level: &str, injection_times: &[f64]) -> String {
    if injection_times.is_empty() {
        return warning_html(&format!("no {level} injection times in range"));
    }
    injection_time_plot(level, injection_times).to_inline_html(Some(
        format!("injection-times-{}", level.to_ascii_lowercase()).as_str(),
    ))
}

fn section_html(index: usize, analysis: &TargetAnalysis) -> String {
    let mut html = trace_plot(&analysis.trace, &analysis.target.label)
        .to_inline_html(Some(format!("target-{index}-xic").as_str()));

    match &analysis.outcome {
        TargetOutcome::NoSignal { diagnostic } => {
            html.push_str(&warning_html(diagnostic));
        }
        TargetOutcome::NoFragmentScan {
            apex,
            ms1,
            diagnostic,
            ..
        } => {
            let title = format!(
                "{} | MS1 | {:.1}",
                analysis.target.label, apex.retention_time
            );
            html.push_str(
                &spectrum_plot(ms1, &title, Some(analysis.target.mz))
                    .to_inline_html(Some(format!("target-{index}-ms1").as_str())),
            );
            html.push_str(&warning_html(diagnostic));
        }
        TargetOutcome::Found {
            apex,
            ms1,
            fragment,
            ms2,
            ..
        } => {
            let title = format!(
                "{} | MS1 | {:.1}",
                analysis.target.label, apex.retention_time
            );
            html.push_str(
                &spectrum_plot(ms1, &title, Some(analysis.target.mz))
                    .to_inline_html(Some(format!("target-{index}-ms1").as_str())),
            );
            html.push_str(
                &spectrum_plot(ms2, &fragment_title(fragment), None)
                    .to_inline_html(Some(format!("target-{index}-ms2").as_str())),
            );
        }
    }
    html
}

fn fragment_title(fragment: &FragmentMatch) -> String {
    format!(
        "MS2|{:.1}+/-{} | {:.1}",
        fragment.isolation_center, fragment.isolation_width, fragment.retention_time
    )
}

fn warning_html(message: &str) -> String {
    format!("<p class=\"warning\">{}</p>\n", escape_html(message))
}

fn trace_plot(trace: &Trace, label: &str) -> Plot {
    let mut plot = Plot::new();
    plot.add_trace(
        Scatter::new(trace.retention_time().to_vec(), trace.intensity().to_vec())
            .mode(Mode::Lines)
            .name(label),
    );
    let title = format!(
        "{} XIC | m/z {:.4}-{:.4}",
        label,
        trace.mz_range().start(),
        trace.mz_range().end()
    );
    plot.set_layout(
        Layout::new()
            .title(title.as_str())
            .x_axis(Axis::new().title("Retention time (min)"))
            .y_axis(Axis::new().title("Intensity")),
    );
    plot
}

fn injection_time_plot(level: &str, injection_times: &[f64]) -> Plot {
    let mut plot = Plot::new();
    plot.add_trace(Histogram::new(injection_times.to_vec()).name(level));
    plot.set_layout(
        Layout::new()
            .title(format!("{level} injection times").as_str())
            .x_axis(Axis::new().title("Injection time (ms)"))
            .y_axis(Axis::new().title("Scans")),
    );
    plot
}

fn spectrum_plot(spectrum: &Spectrum, title: &str, marker_mz: Option<f64>) -> Plot {
    let mut plot = Plot::new();
    plot.add_trace(
        Bar::new(spectrum.mz().to_vec(), spectrum.intensity().to_vec())
            .name(format!("scan {}", spectrum.scan_index()).as_str()),
    );

    if let Some(mz) = marker_mz {
        let top = spectrum.base_peak().map(|(_, intensity)| intensity).unwrap_or(1.0);
        plot.add_trace(
            Scatter::new(vec![mz, mz], vec![0.0, top])
                .mode(Mode::Lines)
                .line(Line::new().dash(DashType::Dash).color("red"))
                .show_legend(false),
        );
    }

    plot.set_layout(
        Layout::new()
            .title(title)
            .x_axis(Axis::new().title("m/z"))
            .y_axis(Axis::new().title("Intensity")),
    );
    plot
}

fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let middle = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[middle - 1] + sorted[middle]) / 2.0)
    } else {
        Some(sorted[middle])
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Plain text rendering
impl fmt::Display for Datasheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(
            f,
            "  scans: {} (MS1 {}, MS2 {})",
            self.summary.scan_count, self.summary.ms1_count, self.summary.ms2_count
        )?;
        if let Some((first, last)) = self.summary.rt_span {
            writeln!(f, "  retention time: {first:.2} - {last:.2} min")?;
        }
        writeln!(
            f,
            "  in {:.1} - {:.1} min: MS1 {}, MS2 {}",
            self.summary.spectra_rt_range.start(),
            self.summary.spectra_rt_range.end(),
            self.summary.ms1_in_range,
            self.summary.ms2_in_range
        )?;
        for (level, injection_times) in [
            ("MS1", &self.summary.ms1_injection_times),
            ("MS2", &self.summary.ms2_injection_times),
        ] {
            if let Some(median_time) = median(injection_times) {
                writeln!(
                    f,
                    "  {level} injection time: median {median_time:.1} ms ({} scans)",
                    injection_times.len()
                )?;
            }
        }

        for analysis in &self.analyses {
            write!(f, "  {}: ", analysis.target.label)?;
            match &analysis.outcome {
                TargetOutcome::Found {
                    apex,
                    apex_scan,
                    fragment,
                    ..
                } => writeln!(
                    f,
                    "apex {:.2} min (scan {}, intensity {:.3e}), {}",
                    apex.retention_time,
                    apex_scan,
                    apex.intensity,
                    fragment_title(fragment)
                )?,
                TargetOutcome::NoFragmentScan {
                    apex,
                    apex_scan,
                    diagnostic,
                    ..
                } => writeln!(
                    f,
                    "apex {:.2} min (scan {}), WARNING: {}",
                    apex.retention_time, apex_scan, diagnostic
                )?,
                TargetOutcome::NoSignal { diagnostic } => writeln!(f, "WARNING: {diagnostic}")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{configuration::TargetSpecies, utils::tests::synthetic_acquisition};

    #[test]
    fn test_generate_datasheet() {
        let acquisition = synthetic_acquisition();
        let datasheet =
            generate_datasheet("run.mzML", &acquisition, &Configuration::default(), true)
                .unwrap();
        assert_eq!(datasheet.analyses.len(), 1);
        assert!(datasheet.analyses[0].is_found());

        let html = datasheet.to_html();
        assert!(html.contains("<h1>run.mzML</h1>"));
        assert!(html.contains("target-0-xic"));
        assert!(html.contains("target-0-ms1"));
        assert!(html.contains("target-0-ms2"));
        assert!(html.contains("injection-times-ms1"));
        assert!(html.contains("injection-times-ms2"));
        assert!(!html.contains("class=\"warning\""));

        let text = datasheet.to_string();
        assert!(text.contains("MS2|695.8+/-1.6 | 45.1"));
        assert!(text.contains("MS1 injection time: median 25.0 ms (3 scans)"));
        assert!(text.contains("MS2 injection time: median 57.5 ms (4 scans)"));
    }

    #[test]
    fn test_injection_times_outside_range() {
        let acquisition = synthetic_acquisition();
        let config = Configuration {
            spectra_rt_range: 90.0..=120.0,
            ..Configuration::default()
        };
        let datasheet = generate_datasheet("run", &acquisition, &config, false).unwrap();
        let html = datasheet.to_html();
        assert!(!html.contains("injection-times-ms1"));
        assert!(html.contains("no MS1 injection times in range"));
        assert!(html.contains("no MS2 injection times in range"));
        assert!(!datasheet.to_string().contains("injection time"));
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&[]), None);
        assert_eq!(median(&[30.0, 10.0, 20.0]), Some(20.0));
        assert_eq!(median(&[40.0, 10.0, 20.0, 30.0]), Some(25.0));
    }

    #[test]
    fn test_datasheet_without_targets() {
        let acquisition = synthetic_acquisition();
        let datasheet =
            generate_datasheet("run.mzML", &acquisition, &Configuration::default(), false)
                .unwrap();
        assert!(datasheet.analyses.is_empty());
        assert!(!datasheet.to_html().contains("target-0-xic"));
    }

    #[test_log::test]
    fn test_missing_target_degrades_gracefully() {
        let acquisition = synthetic_acquisition();
        let config = Configuration {
            targets: vec![
                TargetSpecies::new("unfragmented", 1, 500.0, 46.0),
                TargetSpecies::new("absent", 2, 900.0, 46.0),
                TargetSpecies::pierce_irt(),
            ],
            ..Configuration::default()
        };
        let datasheet = generate_datasheet("run", &acquisition, &config, true).unwrap();
        assert_eq!(datasheet.analyses.len(), 3);

        let html = datasheet.to_html();
        assert!(html.contains("no MS2 scan found covering precursor 500.0000"));
        assert!(html.contains("no MS1 signal for absent"));
        // the remaining panels are still rendered
        assert!(html.contains("target-0-ms1"));
        assert!(html.contains("target-2-ms2"));

        let text = datasheet.to_string();
        assert!(text.contains("WARNING: no MS2 scan found"));
    }

    #[test]
    fn test_write_html() {
        let acquisition = synthetic_acquisition();
        let datasheet =
            generate_datasheet("run", &acquisition, &Configuration::default(), true).unwrap();
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("run.html");
        datasheet.write_html(&path).unwrap();
        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, datasheet.to_html());
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a<b>&\"c\""), "a&lt;b&gt;&amp;&quot;c&quot;");
    }
}
