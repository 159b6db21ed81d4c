//! Core primitives for the sine-table HDL generators.
//!
//! This crate holds everything the individual lookup strategies share: the
//! configuration types, the numeric table builder, the Verilog IR and
//! renderer, the header/naming helpers, the hex table persister and the
//! [`Generator`] trait that ties them together into one generation run.

pub mod hdl;
pub mod hexfile;
pub mod legal;
pub mod logging;
pub mod table;

pub mod types {
    use serde::{Deserialize, Serialize};
    use std::fmt;

    /// Reset style of the generated module.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum ResetMode {
        /// No reset port and no reset logic at all
        #[default]
        None,
        /// Active-high `i_reset`, sampled on the clock edge
        Sync,
        /// Active-low `i_areset_n`, in the sensitivity list
        Async,
    }

    impl ResetMode {
        /// Name of the reset port, if the module has one
        pub fn port_name(self) -> Option<&'static str> {
            match self {
                ResetMode::None => None,
                ResetMode::Sync => Some("i_reset"),
                ResetMode::Async => Some("i_areset_n"),
            }
        }
    }

    /// Lookup strategy: which table layout and pipeline the module uses.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum Strategy {
        /// Full-period table, one register stage
        Direct,
        /// Quarter-period table reconstructed through a fold/fetch/apply pipeline
        Quarter,
    }

    impl fmt::Display for Strategy {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Strategy::Direct => write!(f, "direct"),
                Strategy::Quarter => write!(f, "quarter"),
            }
        }
    }

    /// Configuration of a single generation call.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct TableConfig {
        pub strategy: Strategy,
        /// Bits in the input phase word (PW)
        pub phase_width: u32,
        /// Bits in each signed output sample (OW)
        pub output_width: u32,
        #[serde(default)]
        pub reset: ResetMode,
        /// Carry a one-bit side channel alongside the samples
        #[serde(default)]
        pub aux: bool,
    }

    impl TableConfig {
        pub fn new(strategy: Strategy, phase_width: u32, output_width: u32) -> Self {
            Self {
                strategy,
                phase_width,
                output_width,
                reset: ResetMode::None,
                aux: false,
            }
        }

        pub fn with_reset(mut self, reset: ResetMode) -> Self {
            self.reset = reset;
            self
        }

        pub fn with_aux(mut self, aux: bool) -> Self {
            self.aux = aux;
            self
        }
    }

    /// Fixed-point sine samples, in table order.
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct SampleTable {
        pub output_width: u32,
        pub samples: Vec<i64>,
    }

    impl SampleTable {
        pub fn len(&self) -> usize {
            self.samples.len()
        }

        pub fn is_empty(&self) -> bool {
            self.samples.is_empty()
        }

        pub fn get(&self, index: usize) -> Option<i64> {
            self.samples.get(index).copied()
        }
    }

    /// Inputs sampled by a lookup module on one clock edge.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct CycleInputs {
        pub reset: bool,
        pub ce: bool,
        pub phase: u32,
        pub aux: bool,
    }
}

use serde::Serialize;
use serde_json::Value;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use types::{CycleInputs, SampleTable, Strategy, TableConfig};

use logging::{log, LogCategory, LogLevel};

#[derive(Debug, Error)]
pub enum GenError {
    #[error(
        "{strategy} table for a {phase_width}-bit phase exceeds the {limit}-bit limit.\n\
         This limit is arbitrary, but few FPGAs have that much block RAM. It guards \
         against accidentally requesting a multi-megaword table; beyond roughly 30 bits \
         integer overflow becomes a concern as well."
    )]
    ResourceLimit {
        strategy: Strategy,
        phase_width: u32,
        limit: u32,
    },
    #[error("Invalid {strategy} configuration: {reason}")]
    Precondition { strategy: Strategy, reason: String },
    #[error("Configuration is for a {found} table but was given to the {expected} generator")]
    StrategyMismatch { expected: Strategy, found: Strategy },
    #[error("Malformed table file: {0}")]
    TableFormat(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Cycle-level model of a generated lookup module.
///
/// `clock` corresponds to one rising edge of `i_clk`; state only advances
/// when `ce` is set, and reset wins over `ce`.
pub trait ClockedLookup {
    /// Clock edges between presenting a phase and seeing its sample
    fn latency(&self) -> u32;

    /// Clear every register, as the reset branch of the module does
    fn reset(&mut self);

    fn clock(&mut self, inputs: CycleInputs);

    /// Current `o_val`, sign-extended from the output width
    fn value(&self) -> i64;

    /// Current `o_aux`
    fn aux(&self) -> bool;

    /// JSON snapshot of all registers for debugging.
    fn registers(&self) -> Value;
}

/// Receives the table once the module text has been written.
pub trait TablePersister {
    fn persist(&mut self, module_name: &str, table: &SampleTable) -> Result<(), GenError>;
}

/// Where a module goes and how its header is labelled.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub config: TableConfig,
    /// Path of the Verilog file; the module name derives from it
    pub target: PathBuf,
    pub project: String,
}

impl GenerationRequest {
    pub fn new(config: TableConfig, target: impl Into<PathBuf>, project: impl Into<String>) -> Self {
        Self {
            config,
            target: target.into(),
            project: project.into(),
        }
    }

    pub fn target(&self) -> &Path {
        &self.target
    }
}

/// Summary of a finished generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedModule {
    pub name: String,
    pub strategy: Strategy,
    pub phase_width: u32,
    pub output_width: u32,
    pub table_len: usize,
    pub latency: u32,
}

/// A lookup strategy that can describe its module and fill its table.
pub trait Generator {
    fn strategy(&self) -> Strategy;

    /// Purpose comment placed in the file header
    fn purpose(&self) -> &'static str;

    /// Clock-enabled cycles from `i_phase` to `o_val`
    fn latency(&self) -> u32;

    /// Build the module IR. `config` has already been validated.
    fn module(&self, name: &str, config: &TableConfig) -> hdl::HdlModule;

    /// Reject configurations this generator cannot emit.
    fn validate(&self, config: &TableConfig) -> Result<(), GenError> {
        if config.strategy != self.strategy() {
            return Err(GenError::StrategyMismatch {
                expected: self.strategy(),
                found: config.strategy,
            });
        }
        table::check_limits(self.strategy(), config.phase_width, config.output_width)
    }

    /// Run one generation: validate, write header and module text to `out`,
    /// then build the table and hand it to `persister`.
    ///
    /// Nothing is written if validation fails.
    fn generate(
        &self,
        request: &GenerationRequest,
        out: &mut dyn Write,
        persister: &mut dyn TablePersister,
    ) -> Result<GeneratedModule, GenError> {
        let config = &request.config;
        self.validate(config)?;

        let name = legal::write_legal(out, request.target(), &request.project, self.purpose())?;
        let module = self.module(&name, config);
        write!(out, "{}", module)?;
        out.flush()?;
        log(LogCategory::Hdl, LogLevel::Info, || {
            format!(
                "Emitted {} module '{}' (PW={}, OW={}, reset={:?}, aux={})",
                self.strategy(),
                name,
                config.phase_width,
                config.output_width,
                config.reset,
                config.aux
            )
        });

        let table = table::build(self.strategy(), config.phase_width, config.output_width)?;
        persister.persist(&name, &table)?;

        Ok(GeneratedModule {
            name,
            strategy: self.strategy(),
            phase_width: config.phase_width,
            output_width: config.output_width,
            table_len: table.len(),
            latency: self.latency(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::ResetMode;

    struct MockGenerator;

    impl Generator for MockGenerator {
        fn strategy(&self) -> Strategy {
            Strategy::Direct
        }

        fn purpose(&self) -> &'static str {
            "Mock lookup"
        }

        fn latency(&self) -> u32 {
            1
        }

        fn module(&self, name: &str, config: &TableConfig) -> hdl::HdlModule {
            hdl::ModuleBuilder::new(name, config.reset)
                .parameter("PW", config.phase_width, "Number of bits in the input phase")
                .build()
        }
    }

    #[derive(Default)]
    struct MemoryPersister {
        tables: Vec<(String, SampleTable)>,
    }

    impl TablePersister for MemoryPersister {
        fn persist(&mut self, module_name: &str, table: &SampleTable) -> Result<(), GenError> {
            self.tables.push((module_name.to_string(), table.clone()));
            Ok(())
        }
    }

    #[test]
    fn test_generate_writes_text_then_table() {
        let gen = MockGenerator;
        let request = GenerationRequest::new(
            TableConfig::new(Strategy::Direct, 4, 8),
            "rtl/mock_table.v",
            "Test project",
        );
        let mut out = Vec::new();
        let mut persister = MemoryPersister::default();

        let summary = gen.generate(&request, &mut out, &mut persister).expect("generate");

        let text = String::from_utf8(out).expect("utf8");
        assert!(text.contains("module\tmock_table("));
        assert!(text.contains("Test project"));
        assert_eq!(summary.name, "mock_table");
        assert_eq!(summary.table_len, 16);
        assert_eq!(persister.tables.len(), 1);
        assert_eq!(persister.tables[0].0, "mock_table");
        assert_eq!(persister.tables[0].1.samples[4], 127);
    }

    #[test]
    fn test_generate_rejects_before_writing() {
        let gen = MockGenerator;
        let request = GenerationRequest::new(TableConfig::new(Strategy::Direct, 24, 8), "big.v", "p");
        let mut out = Vec::new();
        let mut persister = MemoryPersister::default();

        let err = gen.generate(&request, &mut out, &mut persister).unwrap_err();
        assert!(matches!(err, GenError::ResourceLimit { limit: 24, .. }));
        assert!(out.is_empty());
        assert!(persister.tables.is_empty());
    }

    #[test]
    fn test_strategy_mismatch() {
        let gen = MockGenerator;
        let err = gen
            .validate(&TableConfig::new(Strategy::Quarter, 8, 8))
            .unwrap_err();
        assert!(matches!(
            err,
            GenError::StrategyMismatch {
                expected: Strategy::Direct,
                found: Strategy::Quarter
            }
        ));
    }

    #[test]
    fn test_config_json_defaults() {
        let cfg: TableConfig =
            serde_json::from_str(r#"{"strategy":"quarter","phase_width":10,"output_width":12}"#)
                .expect("parse");
        assert_eq!(cfg.strategy, Strategy::Quarter);
        assert_eq!(cfg.reset, ResetMode::None);
        assert!(!cfg.aux);

        let cfg: TableConfig = serde_json::from_str(
            r#"{"strategy":"direct","phase_width":6,"output_width":8,"reset":"async","aux":true}"#,
        )
        .expect("parse");
        assert_eq!(cfg.reset, ResetMode::Async);
        assert!(cfg.aux);
    }

    #[test]
    fn test_reset_port_names() {
        assert_eq!(ResetMode::None.port_name(), None);
        assert_eq!(ResetMode::Sync.port_name(), Some("i_reset"));
        assert_eq!(ResetMode::Async.port_name(), Some("i_areset_n"));
    }
}
