use std::{
    fs::{self, File},
    io::{BufReader, BufWriter},
    path::PathBuf,
    process::ExitCode,
    time::Instant,
};

use clap::Parser;
use hzz4l::{
    config::Config,
    event::FinalState,
    sample::{parse_list, Sample},
    skim::{read_events, Skimmer},
    Result,
};
use log::{debug, error, info, warn, LevelFilter};

/// Skim CMS open-data samples for H → ZZ → 4ℓ candidates
#[derive(Debug, Parser)]
#[command(version, about)]
struct Opt {
    /// Only process the first RANGE events of each sample, sequentially
    #[arg(long)]
    range: Option<usize>,

    /// Process events sequentially
    #[arg(long)]
    no_parallel: bool,

    /// Number of worker threads, 0 uses all cores
    #[arg(long)]
    n_workers: Option<usize>,

    /// Directory receiving the `Skim_data` output
    #[arg(long, default_value = ".")]
    output: PathBuf,

    /// Verbosity of the log output
    #[arg(long, default_value = "info")]
    log_level: LevelFilter,

    /// Comma separated final states or `all`
    #[arg(long, default_value = "all")]
    final_state: String,

    /// Comma separated samples or `all`
    #[arg(long, default_value = "all")]
    sample: String,

    /// Directory with one `<sample>.jsonl` event file per sample
    #[arg(long, default_value = ".")]
    base_path: PathBuf,

    /// JSON file overriding the default cuts and run settings
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let opt = Opt::parse();
    env_logger::builder().filter_level(opt.log_level).init();
    match run(opt) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(opt: Opt) -> Result<()> {
    let mut config = match &opt.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if opt.range.is_some() {
        config.range = opt.range;
    }
    if opt.no_parallel {
        config.parallel = false;
    }
    if let Some(n_workers) = opt.n_workers {
        config.n_workers = n_workers;
    }
    debug!("Settings: {config:#?}");

    let samples = parse_list(&opt.sample, &Sample::ALL)?;
    let final_states = parse_list(&opt.final_state, &FinalState::ALL)?;

    let out_dir = opt.output.join("Skim_data");
    fs::create_dir_all(&out_dir)?;

    for sample in samples {
        let input = opt.base_path.join(format!("{sample}.jsonl"));
        let file = match File::open(&input) {
            Ok(file) => file,
            Err(err) => {
                warn!("Skipping {sample}: failed to open {input:?}: {err}");
                continue;
            }
        };
        let events = read_events(BufReader::new(file))?;
        info!("Read {} events of {sample}", events.len());

        for &final_state in sample.final_states() {
            if !final_states.contains(&final_state) {
                continue;
            }
            let start = Instant::now();
            let skimmer = Skimmer::new(&config, final_state, sample.weight());
            let skim = skimmer.skim(&events)?;
            info!(
                "Selected {} {final_state} events of {sample} in {:.2}s",
                skim.records.len(),
                start.elapsed().as_secs_f64()
            );
            let degenerate = skim.degenerate();
            if degenerate > 0 {
                warn!("{degenerate} selected events without valid decay angles");
            }
            debug!("Cut flow for {sample} {final_state}:\n{}", skim.cut_flow);

            let output = out_dir.join(format!("{sample}{final_state}Skim.jsonl"));
            skim.write_records(BufWriter::new(File::create(&output)?))?;
            info!("Written to {output:?}");
        }
    }
    Ok(())
}
