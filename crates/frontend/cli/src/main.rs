mod job_file;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use job_file::{Job, JobFile, DEFAULT_OUTPUT_BITS, DEFAULT_PHASE_BITS, DEFAULT_PROJECT};
use serde::Serialize;
use sintab_core::hexfile::HexFilePersister;
use sintab_core::legal;
use sintab_core::logging::{LogConfig, LogLevel};
use sintab_core::types::{ResetMode, Strategy};
use sintab_core::{GeneratedModule, GenerationRequest, Generator};
use sintab_direct::DirectGenerator;
use sintab_quarter::QuarterGenerator;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StrategyArg {
    /// Full-period table, one cycle of latency
    Direct,
    /// Quarter-period table, two cycles of latency
    Quarter,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Direct => Strategy::Direct,
            StrategyArg::Quarter => Strategy::Quarter,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ResetArg {
    None,
    /// Active-high synchronous i_reset
    Sync,
    /// Active-low asynchronous i_areset_n
    Async,
}

impl From<ResetArg> for ResetMode {
    fn from(arg: ResetArg) -> Self {
        match arg {
            ResetArg::None => ResetMode::None,
            ResetArg::Sync => ResetMode::Sync,
            ResetArg::Async => ResetMode::Async,
        }
    }
}

#[derive(Parser)]
#[command(name = "sintab", about = "Generate sine-table lookup modules in Verilog")]
struct Args {
    /// Lookup strategy
    #[arg(value_enum, requires = "output")]
    strategy: Option<StrategyArg>,

    /// Verilog file to write; the table goes to <module>.hex beside it
    output: Option<PathBuf>,

    /// Bits in the input phase word
    #[arg(long, default_value_t = DEFAULT_PHASE_BITS)]
    phase_bits: u32,

    /// Bits in each signed output sample
    #[arg(long, default_value_t = DEFAULT_OUTPUT_BITS)]
    output_bits: u32,

    /// Reset style of the generated module
    #[arg(long, value_enum, default_value = "none")]
    reset: ResetArg,

    /// Carry a one-bit side channel through the lookup
    #[arg(long, default_value_t = false)]
    aux: bool,

    /// Project label for the file header
    #[arg(long, default_value = DEFAULT_PROJECT)]
    project: String,

    /// Generate every module listed in this JSON job file
    #[arg(long, conflicts_with = "strategy")]
    jobs: Option<PathBuf>,

    /// Write a JSON summary of the generated modules here
    #[arg(long)]
    manifest: Option<PathBuf>,

    /// Generator log level: off, error, warn, info, debug or trace
    #[arg(long, default_value = "off")]
    log_level: String,

    /// Send generator logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

/// One manifest row: the module summary plus where its files went
#[derive(Debug, Serialize)]
struct ManifestEntry {
    #[serde(flatten)]
    module: GeneratedModule,
    verilog: PathBuf,
    table: PathBuf,
}

fn generator_for(strategy: Strategy) -> Box<dyn Generator> {
    match strategy {
        Strategy::Direct => Box::new(DirectGenerator::new()),
        Strategy::Quarter => Box::new(QuarterGenerator::new()),
    }
}

/// Generate one module and its table. Nothing is created if the
/// configuration is rejected.
fn run_job(job: &Job, output: &Path, project: &str) -> Result<ManifestEntry> {
    let generator = generator_for(job.strategy);
    let config = job.config();
    generator.validate(&config)?;

    let mut persister = HexFilePersister::beside(output);
    if persister.path_for(&legal::module_name(output)) == output {
        bail!(
            "{} is also where its table file would go; give the Verilog output another extension",
            output.display()
        );
    }

    if let Some(dir) = output.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    let file = File::create(output).with_context(|| format!("creating {}", output.display()))?;
    let mut out = BufWriter::new(file);

    let request = GenerationRequest::new(config, output, project);
    let module = generator.generate(&request, &mut out, &mut persister)?;
    let table = persister.path_for(&module.name);

    log::info!(
        "{} -> {} ({} entries, latency {})",
        module.name,
        output.display(),
        module.table_len,
        module.latency
    );

    Ok(ManifestEntry {
        module,
        verilog: output.to_path_buf(),
        table,
    })
}

fn configure_logging(args: &Args) -> Result<()> {
    let level = match LogLevel::from_str(&args.log_level) {
        Some(level) => level,
        None => bail!("Unknown log level: {}", args.log_level),
    };
    let config = LogConfig::global();
    config.set_global_level(level);
    if let Some(path) = args.log_file.as_ref() {
        config
            .set_log_file(path.clone())
            .with_context(|| format!("opening log file {}", path.display()))?;
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    configure_logging(&args)?;

    let (project, jobs) = match (args.jobs.as_ref(), args.strategy, args.output.as_ref()) {
        (Some(path), _, _) => {
            let file = JobFile::load(path)?;
            log::info!("Loaded {} job(s) from {}", file.jobs.len(), path.display());
            let outputs = file.resolve_outputs(path);
            let jobs: Vec<(Job, PathBuf)> = file.jobs.into_iter().zip(outputs).collect();
            (file.project, jobs)
        }
        (None, Some(strategy), Some(output)) => {
            let mut job = Job::new(strategy.into(), output.clone());
            job.phase_bits = args.phase_bits;
            job.output_bits = args.output_bits;
            job.reset = args.reset.into();
            job.aux = args.aux;
            (args.project.clone(), vec![(job, output.clone())])
        }
        _ => bail!("Give a STRATEGY and OUTPUT file, or --jobs FILE"),
    };

    let mut manifest = Vec::with_capacity(jobs.len());
    for (job, output) in &jobs {
        let entry = run_job(job, output, &project)
            .with_context(|| format!("generating {}", output.display()))?;
        manifest.push(entry);
    }

    if let Some(path) = args.manifest.as_ref() {
        fs::write(path, serde_json::to_string_pretty(&manifest)?)
            .with_context(|| format!("writing manifest {}", path.display()))?;
        log::info!("Wrote manifest for {} module(s) to {}", manifest.len(), path.display());
    }

    Ok(())
}
