//! Quarter-wave sine table lookup.
//!
//! Only the first quadrant of the period is stored. A sine wave is
//! symmetric about 90° and antisymmetric about 180°, so the other three
//! quadrants come from reflecting the index and negating the result. The
//! table shrinks by 4x; the price is a fold stage in front of the memory
//! and a sign stage behind it.
//!
//! # Pipeline
//!
//! - **Fold** (combinational): `index = i_phase[PW-2] ? ~sub : sub`
//! - **Stage 1 (fetch)**: `negate <= i_phase[PW-1]`,
//!   `tblvalue <= quartertable[index]`
//! - **Stage 2 (apply)**: `o_val <= negate ? -tblvalue : tblvalue`
//!
//! Reset clears `negate`, `tblvalue` and `o_val`, so the first outputs after
//! a reset are zero rather than stale table words.
//!
//! Samples are stored at bin centres (`2πk/N + π/N`), so the complemented
//! index of the descending half lands exactly on a stored sample.
//!
//! The auxiliary bit rides a two-deep shift register so it leaves the module
//! on the same edge as the sample it entered with.

mod pipeline;

pub use pipeline::{fold_phase, QuarterPipeline};

use sintab_core::hdl::{ClockedBlock, HdlModule, ModuleBuilder, NetKind, Port, Stmt};
use sintab_core::types::{Strategy, TableConfig};
use sintab_core::Generator;

/// Clock-enabled cycles from `i_phase` to `o_val`.
pub const LATENCY: u32 = 2;

const PURPOSE: &str = "A quarter-wave table lookup sine wave generator. A sine\n\
                       wave is symmetric enough that one quadrant determines the\n\
                       rest, cutting the table to a quarter of its full size in\n\
                       exchange for folding and sign logic and a second cycle of\n\
                       latency.";

#[derive(Debug, Clone, Copy, Default)]
pub struct QuarterGenerator;

impl QuarterGenerator {
    pub fn new() -> Self {
        Self
    }
}

fn pipeline_block() -> ClockedBlock {
    ClockedBlock::new()
        .clears("negate")
        .clears("tblvalue")
        .clears("o_val")
        .stmt(Stmt::comment("Stage 1: read the folded index from the stored quadrant"))
        .stmt(Stmt::assign("negate", "i_phase[(PW-1)]"))
        .stmt(Stmt::assign("tblvalue", "quartertable[index]"))
        .stmt(Stmt::comment("Stage 2: restore the sign"))
        .stmt(Stmt::if_else(
            "negate",
            vec![Stmt::assign("o_val", "-tblvalue")],
            vec![Stmt::assign("o_val", "tblvalue")],
        ))
}

impl Generator for QuarterGenerator {
    fn strategy(&self) -> Strategy {
        Strategy::Quarter
    }

    fn purpose(&self) -> &'static str {
        PURPOSE
    }

    fn latency(&self) -> u32 {
        LATENCY
    }

    fn module(&self, name: &str, config: &TableConfig) -> HdlModule {
        let builder = ModuleBuilder::new(name, config.reset)
            .port_if(config.aux, Port::input("i_aux", None))
            .port(Port::input("i_phase", Some("(PW-1):0")))
            .port(Port::output("o_val", NetKind::Reg, Some("(OW-1):0")))
            .port_if(config.aux, Port::output("o_aux", NetKind::Wire, None))
            .width_parameters(config.phase_width, config.output_width)
            .table_memory("quartertable", "(OW-1):0", "(1<<(PW-2))")
            .wire("index", Some("(PW-3):0"))
            .reg("negate", None)
            .reg("tblvalue", Some("(OW-1):0"))
            .assign(
                "index",
                "i_phase[(PW-2)] ? ~i_phase[(PW-3):0] : i_phase[(PW-3):0]",
            )
            .clocked(pipeline_block());

        if config.aux {
            builder
                .reg("aux", Some("1:0"))
                .assign("o_aux", "aux[1]")
                .clocked(
                    ClockedBlock::new()
                        .clears("aux")
                        .stmt(Stmt::assign("aux", "{ aux[0], i_aux }")),
                )
                .build()
        } else {
            builder.build()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sintab_core::hdl::{Declaration, Direction};
    use sintab_core::types::{ResetMode, SampleTable};
    use sintab_core::{GenError, GenerationRequest, TablePersister};

    #[derive(Debug, Default)]
    struct MemoryPersister {
        tables: Vec<(String, SampleTable)>,
    }

    impl TablePersister for MemoryPersister {
        fn persist(&mut self, module_name: &str, table: &SampleTable) -> Result<(), GenError> {
            self.tables.push((module_name.to_string(), table.clone()));
            Ok(())
        }
    }

    fn config(reset: ResetMode, aux: bool) -> TableConfig {
        TableConfig::new(Strategy::Quarter, 10, 16)
            .with_reset(reset)
            .with_aux(aux)
    }

    fn generate(config: TableConfig) -> Result<(String, MemoryPersister), GenError> {
        let request = GenerationRequest::new(config, "quarterwav.v", "Test");
        let mut out = Vec::new();
        let mut persister = MemoryPersister::default();
        QuarterGenerator::new().generate(&request, &mut out, &mut persister)?;
        Ok((String::from_utf8(out).unwrap(), persister))
    }

    #[test]
    fn test_port_shapes() {
        let gen = QuarterGenerator::new();
        for reset in [ResetMode::None, ResetMode::Sync, ResetMode::Async] {
            for aux in [false, true] {
                let module = gen.module("quarterwav", &config(reset, aux));
                let names = module.port_names();
                assert_eq!(names.contains(&"i_reset"), reset == ResetMode::Sync);
                assert_eq!(names.contains(&"i_areset_n"), reset == ResetMode::Async);
                assert_eq!(names.contains(&"i_aux"), aux);
                assert_eq!(names.contains(&"o_aux"), aux);
                assert_eq!(names.len(), 4 + aux as usize * 2 + reset.port_name().is_some() as usize);
            }
        }
    }

    #[test]
    fn test_aux_output_is_shift_register_tap() {
        let module = QuarterGenerator::new().module("quarterwav", &config(ResetMode::Sync, true));
        let o_aux = module.port("o_aux").expect("o_aux");
        assert_eq!(o_aux.direction, Direction::Output);
        assert_eq!(o_aux.kind, NetKind::Wire);
        assert!(module
            .assigns
            .contains(&("o_aux".to_string(), "aux[1]".to_string())));
        assert_eq!(
            module.declaration("aux"),
            Some(&Declaration::Reg {
                name: "aux".to_string(),
                range: Some("1:0".to_string())
            })
        );
    }

    #[test]
    fn test_reset_clears_every_pipeline_register() {
        let module = QuarterGenerator::new().module("quarterwav", &config(ResetMode::Async, true));
        let cleared: Vec<&str> = module
            .blocks
            .iter()
            .flat_map(|b| b.reset.iter())
            .filter_map(|s| match s {
                Stmt::Assign { lhs, .. } => Some(lhs.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(cleared, vec!["negate", "tblvalue", "o_val", "aux"]);
    }

    #[test]
    fn test_rendered_pipeline() {
        let text = QuarterGenerator::new()
            .module("quarterwav", &config(ResetMode::Sync, false))
            .to_string();
        assert!(text.starts_with("module\tquarterwav(i_clk, i_reset, i_ce, i_phase, o_val);\n"));
        assert!(text.contains("\treg\t[(OW-1):0]\tquartertable\t[0:((1<<(PW-2))-1)];\n"));
        assert!(text.contains("\tinitial\t$readmemh(\"quarterwav.hex\", quartertable);\n"));
        assert!(text.contains("\twire\t[(PW-3):0]\tindex;\n"));
        assert!(text.contains("\treg\t[(OW-1):0]\ttblvalue;\n"));
        assert!(text.contains(
            "\tassign\tindex = i_phase[(PW-2)] ? ~i_phase[(PW-3):0] : i_phase[(PW-3):0];\n"
        ));
        assert!(text.contains(
            "\tif (i_reset)\n\tbegin\n\t\tnegate <= 0;\n\t\ttblvalue <= 0;\n\t\to_val <= 0;\n\tend else if (i_ce)\n"
        ));
        assert!(text.contains("\t\tnegate <= i_phase[(PW-1)];\n\t\ttblvalue <= quartertable[index];\n"));
        assert!(text.contains("\t\tif (negate)\n\t\t\to_val <= -tblvalue;\n\t\telse\n\t\t\to_val <= tblvalue;\n"));
        assert!(!text.contains("aux"));
    }

    #[test]
    fn test_rendered_aux_shift_register() {
        let text = QuarterGenerator::new()
            .module("quarterwav", &config(ResetMode::None, true))
            .to_string();
        assert!(text.contains("\toutput\twire\t\to_aux;\n"));
        assert!(text.contains("\tassign\to_aux = aux[1];\n"));
        assert!(text.contains("\talways @(posedge i_clk)\n\tif (i_ce)\n\t\taux <= { aux[0], i_aux };\n"));
    }

    #[test]
    fn test_generate_persists_quarter_table() {
        let (text, persister) = generate(TableConfig::new(Strategy::Quarter, 4, 8)).expect("generate");
        let (name, table) = &persister.tables[0];
        assert_eq!(name, "quarterwav");
        assert_eq!(table.len(), 4);
        assert_eq!(table.samples[0], 24);
        assert!(text.contains("module\tquarterwav("));
    }

    #[test]
    fn test_generate_boundaries() {
        assert!(generate(TableConfig::new(Strategy::Quarter, 3, 8)).is_ok());

        let err = generate(TableConfig::new(Strategy::Quarter, 2, 8)).unwrap_err();
        assert!(matches!(err, GenError::Precondition { .. }));

        let err = generate(TableConfig::new(Strategy::Quarter, 26, 8)).unwrap_err();
        assert!(matches!(err, GenError::ResourceLimit { limit: 26, .. }));
    }

    #[test]
    fn test_generate_is_deterministic() {
        let cfg = config(ResetMode::Async, true);
        let (text_a, tables_a) = generate(cfg).expect("generate");
        let (text_b, tables_b) = generate(cfg).expect("generate");
        assert_eq!(text_a, text_b);
        assert_eq!(tables_a.tables, tables_b.tables);
    }
}
