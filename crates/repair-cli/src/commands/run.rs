//! Run repair sweeps and export the results
//!
//! Flags override values from `--config`, which in turn override the
//! built-in sweep defaults. Without `--design` or `--design-file` every
//! catalogue design is evaluated in turn.

use anyhow::{anyhow, bail, Context, Result};
use clap::Args;
use repair_sim::{
    catalog, export, run_design, write_records, BlockDesign, ExperimentReport, FaultKind,
    OutputFormat, Probability, RepairAlgorithm, SweepConfig,
};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Arguments for `repair-sim run`
#[derive(Args, Debug, Default)]
pub struct RunCommand {
    /// Catalogue design to evaluate (see `repair-sim designs`)
    #[arg(long, conflicts_with = "design_file")]
    pub design: Option<String>,

    /// Design file (TOML, or JSON by extension) with a `blocks` list
    #[arg(long)]
    pub design_file: Option<PathBuf>,

    /// Sweep config file (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Trials per cell
    #[arg(short = 'n', long)]
    pub trials: Option<u64>,

    /// Root RNG seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Availability probabilities (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub probabilities: Vec<Probability>,

    /// Fault kinds (comma-separated: permanent, transient)
    #[arg(long, value_delimiter = ',')]
    pub fault_kinds: Vec<FaultKind>,

    /// Algorithms (comma-separated names)
    #[arg(long, value_delimiter = ',')]
    pub algorithms: Vec<RepairAlgorithm>,

    /// Safety bound on contacts per repair attempt
    #[arg(long)]
    pub max_contacts: Option<u64>,

    /// Run trials on the current thread only
    #[arg(long)]
    pub sequential: bool,

    /// Output format: table, csv or json
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,

    /// Output file, or directory when several designs are evaluated
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl RunCommand {
    /// Resolve the effective sweep configuration
    pub fn sweep_config(&self) -> Result<SweepConfig> {
        let mut config = match &self.config {
            Some(path) => SweepConfig::load(path)
                .with_context(|| format!("loading sweep config {}", path.display()))?,
            None => SweepConfig::default(),
        };

        if !self.probabilities.is_empty() {
            config = config.with_probabilities(self.probabilities.iter().copied());
        }
        if !self.fault_kinds.is_empty() {
            config = config.with_fault_kinds(self.fault_kinds.iter().copied());
        }
        if !self.algorithms.is_empty() {
            config = config.with_algorithms(self.algorithms.iter().copied());
        }
        if let Some(trials) = self.trials {
            config = config.with_trials(trials);
        }
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        if let Some(max_contacts) = self.max_contacts {
            config = config.with_max_contacts(max_contacts);
        }
        if self.sequential {
            config = config.with_parallel(false);
        }

        config.validate().context("invalid sweep configuration")?;
        Ok(config)
    }

    /// Resolve the designs to evaluate
    pub fn designs(&self) -> Result<Vec<BlockDesign>> {
        if let Some(name) = &self.design {
            let design = catalog::get(name).ok_or_else(|| {
                let known = catalog::names().collect::<Vec<_>>().join(", ");
                anyhow!("unknown design '{name}', expected one of: {known}")
            })?;
            return Ok(vec![design]);
        }
        if let Some(path) = &self.design_file {
            let design = BlockDesign::load(path)
                .with_context(|| format!("loading design {}", path.display()))?;
            return Ok(vec![design]);
        }
        Ok(catalog::all())
    }
}

/// Run the sweep for every selected design.
///
/// Results go to `stdout` unless `--output` is set. Returns the files written.
pub fn handle_run_command(cmd: &RunCommand, stdout: &mut dyn Write) -> Result<Vec<PathBuf>> {
    let config = cmd.sweep_config()?;
    let designs = cmd.designs()?;
    if designs.is_empty() {
        bail!("no designs selected");
    }
    info!(
        designs = designs.len(),
        cells = config.cell_count(),
        trials = config.trials,
        "running repair sweep"
    );

    let Some(output) = &cmd.output else {
        export_to_stdout(cmd, &config, &designs, stdout)?;
        return Ok(Vec::new());
    };

    let output_dir = if designs.len() > 1 || output.is_dir() {
        fs::create_dir_all(output)
            .with_context(|| format!("creating output directory {}", output.display()))?;
        Some(output.as_path())
    } else {
        None
    };

    let mut written = Vec::new();
    for design in &designs {
        let report = run(design, &config)?;
        let path = match output_dir {
            Some(dir) => result_path(dir, &design.label(), cmd.format),
            None => output.clone(),
        };

        let file =
            fs::File::create(&path).with_context(|| format!("creating {}", path.display()))?;
        let mut sink = cmd.format.sink(BufWriter::new(file));
        export(&report, sink.as_mut()).with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "results written");
        written.push(path);
    }

    Ok(written)
}

/// Stream every design's results to `stdout`.
///
/// CSV and JSON lines share one sink across designs, so the CSV header is
/// written once. Tables are printed per design under a heading.
fn export_to_stdout(
    cmd: &RunCommand,
    config: &SweepConfig,
    designs: &[BlockDesign],
    stdout: &mut dyn Write,
) -> Result<()> {
    if cmd.format == OutputFormat::Table {
        for design in designs {
            let report = run(design, config)?;
            if designs.len() > 1 {
                writeln!(stdout, "\n{} {}", design.label(), report.parameters)?;
            }
            export(&report, cmd.format.sink(&mut *stdout).as_mut())?;
        }
        return Ok(());
    }

    let mut sink = cmd.format.sink(stdout);
    for design in designs {
        write_records(&run(design, config)?, sink.as_mut())?;
    }
    sink.finish()?;
    Ok(())
}

fn run(design: &BlockDesign, config: &SweepConfig) -> Result<ExperimentReport> {
    run_design(design, config.clone())
        .with_context(|| format!("running design {}", design.label()))
}

/// `<dir>/<label>-BIBD_results.<ext>`
pub fn result_path(dir: &Path, label: &str, format: OutputFormat) -> PathBuf {
    dir.join(format!("{label}-BIBD_results.{}", format.extension()))
}
