/// JSON job files: several generation runs described in one document
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use sintab_core::types::{ResetMode, Strategy, TableConfig};
use std::fs;
use std::path::{Path, PathBuf};

/// Newest job file format this build understands
pub const CURRENT_VERSION: u32 = 1;

pub const DEFAULT_PHASE_BITS: u32 = 8;
pub const DEFAULT_OUTPUT_BITS: u32 = 16;
pub const DEFAULT_PROJECT: &str = "Signal generators";

fn default_phase_bits() -> u32 {
    DEFAULT_PHASE_BITS
}

fn default_output_bits() -> u32 {
    DEFAULT_OUTPUT_BITS
}

fn default_project() -> String {
    DEFAULT_PROJECT.to_string()
}

/// One module to generate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub strategy: Strategy,
    /// Verilog file to write, relative to the job file's directory
    pub output: PathBuf,
    #[serde(default = "default_phase_bits")]
    pub phase_bits: u32,
    #[serde(default = "default_output_bits")]
    pub output_bits: u32,
    #[serde(default)]
    pub reset: ResetMode,
    #[serde(default)]
    pub aux: bool,
}

impl Job {
    pub fn new(strategy: Strategy, output: impl Into<PathBuf>) -> Self {
        Self {
            strategy,
            output: output.into(),
            phase_bits: DEFAULT_PHASE_BITS,
            output_bits: DEFAULT_OUTPUT_BITS,
            reset: ResetMode::None,
            aux: false,
        }
    }

    pub fn config(&self) -> TableConfig {
        TableConfig::new(self.strategy, self.phase_bits, self.output_bits)
            .with_reset(self.reset)
            .with_aux(self.aux)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobFile {
    /// Job file format version
    pub version: u32,
    /// Label written into each generated header
    #[serde(default = "default_project")]
    pub project: String,
    pub jobs: Vec<Job>,
}

impl JobFile {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading job file {}", path.display()))?;
        let file: JobFile = serde_json::from_str(&contents)
            .with_context(|| format!("parsing job file {}", path.display()))?;
        if file.version == 0 || file.version > CURRENT_VERSION {
            bail!(
                "Unsupported job file version {} in {} (expected 1..={})",
                file.version,
                path.display(),
                CURRENT_VERSION
            );
        }
        Ok(file)
    }

    /// Output paths resolved against the directory holding the job file
    pub fn resolve_outputs(&self, job_file: &Path) -> Vec<PathBuf> {
        let base = job_file.parent().unwrap_or_else(|| Path::new(""));
        self.jobs.iter().map(|job| base.join(&job.output)).collect()
    }
}

#[cfg(test)]
impl JobFile {
    fn new(project: &str) -> Self {
        Self {
            version: CURRENT_VERSION,
            project: project.to_string(),
            jobs: Vec::new(),
        }
    }

    fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
