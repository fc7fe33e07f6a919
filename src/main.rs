use std::{
    ops::RangeInclusive,
    path::{Path, PathBuf},
    process::ExitCode,
    sync::atomic::{AtomicBool, Ordering},
};

use clap::Parser;
use env_logger::Env;

use msdatasheet::{
    batch,
    configuration::{Configuration, IntensityAggregation, TargetSpecies},
    error::Error,
    reader::read_acquisition,
    report::generate_datasheet,
};

/// Generate QC datasheets for mass spectrometry runs, either for a single instrument file
/// or for each instrument file (mzML, MGF, Thermo RAW with the `thermo` feature) in a directory.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Instrument file or directory of instrument files
    path: PathBuf,
    /// Print the datasheet instead of saving it
    #[arg(long)]
    display: bool,
    /// Suffix appended to the input file name for the saved datasheet
    #[arg(long, default_value_t = String::from(".html"))]
    extension: String,
    /// Retention time range for the scan statistics, format start,end
    #[arg(long, default_value = "1,120", value_parser = parse_rt_range)]
    spectra_rt_range: RangeInclusive<f64>,
    /// Check the internal retention time standard (default for single files only)
    #[arg(long, conflicts_with = "no_irts")]
    include_irts: bool,
    /// Skip the internal retention time standard check
    #[arg(long)]
    no_irts: bool,
    /// Target species as label,charge,mz,rt[,tolerance[,rt_window]]. Replaces the default iRT peptide, may be repeated
    #[arg(long = "target", value_parser = parse_target)]
    targets: Vec<TargetSpecies>,
    /// Per scan aggregation of trace intensities (sum or max)
    #[arg(long, default_value = "sum", value_parser = parse_aggregation)]
    aggregation: IntensityAggregation,
    /// Isotope spacings on each side of the target m/z in the MS1 panel
    #[arg(long, default_value_t = 2)]
    isotope_offset: usize,
    /// Number of files analyzed in parallel, defaults to the number of CPUs
    #[arg(long)]
    threads: Option<usize>,
    /// Do not start further files after the first failure
    #[arg(long)]
    fail_fast: bool,
    /// Increase log verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_rt_range(value: &str) -> Result<RangeInclusive<f64>, String> {
    let (start, end) = value
        .split_once(',')
        .ok_or_else(|| format!("expected start,end, got `{value}`"))?;
    let start = start.trim().parse::<f64>().map_err(|e| e.to_string())?;
    let end = end.trim().parse::<f64>().map_err(|e| e.to_string())?;
    if start > end {
        return Err(format!("start {start} is after end {end}"));
    }
    Ok(start..=end)
}

fn parse_target(value: &str) -> Result<TargetSpecies, String> {
    value.parse().map_err(|e: Error| e.to_string())
}

fn parse_aggregation(value: &str) -> Result<IntensityAggregation, String> {
    value.parse().map_err(|e: Error| e.to_string())
}

/// `<input file name><extension>` next to the input file
fn datasheet_path(input: &Path, extension: &str) -> PathBuf {
    let mut path = input.as_os_str().to_owned();
    if !extension.starts_with('.') {
        path.push(".");
    }
    path.push(extension);
    PathBuf::from(path)
}

fn process_file(
    path: &Path,
    args: &Args,
    config: &Configuration,
    include_targets: bool,
) -> Result<Option<PathBuf>, Error> {
    let acquisition = read_acquisition(path)?;
    let title = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let datasheet = generate_datasheet(title, &acquisition, config, include_targets)?;

    if args.display {
        println!("{datasheet}");
        return Ok(None);
    }
    let output = datasheet_path(path, &args.extension);
    datasheet.write_html(&output)?;
    Ok(Some(output))
}

fn main() -> ExitCode {
    let args = Args::parse();
    let level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    let targets = if args.targets.is_empty() {
        vec![TargetSpecies::pierce_irt()]
    } else {
        args.targets.clone()
    };
    let config = Configuration::new(
        args.aggregation,
        targets,
        args.isotope_offset,
        args.spectra_rt_range.clone(),
    );

    if !args.path.is_dir() {
        let include_targets = !args.no_irts;
        return match process_file(&args.path, &args, &config, include_targets) {
            Ok(_) => ExitCode::SUCCESS,
            Err(err) => {
                log::error!("{}: {err}", args.path.display());
                ExitCode::FAILURE
            }
        };
    }

    if let Some(threads) = args.threads {
        if let Err(err) = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
        {
            log::warn!("Cannot configure {threads} threads: {err}");
        }
    }

    let files = match batch::discover(&args.path, batch::DEFAULT_EXTENSIONS) {
        Ok(files) => files,
        Err(err) => {
            log::error!("{}: {err}", args.path.display());
            return ExitCode::FAILURE;
        }
    };
    log::info!("Analyzing {} files in {}", files.len(), args.path.display());

    let include_targets = args.include_irts;
    let cancel = AtomicBool::new(false);
    let outcomes = batch::run(&files, &cancel, |path| {
        let result = process_file(path, &args, &config, include_targets);
        if result.is_err() && args.fail_fast {
            cancel.store(true, Ordering::SeqCst);
        }
        result
    });

    let failed = outcomes
        .iter()
        .filter(|outcome| outcome.result.is_err())
        .count();
    if failed > 0 {
        log::error!("{failed} of {} files failed", outcomes.len());
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
