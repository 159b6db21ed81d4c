//! Direct sine table lookup.
//!
//! The whole period is stored, so the phase word addresses the table as-is
//! and the sample is registered on the next clock-enabled edge. This is the
//! lowest-latency lookup (one cycle) and the most expensive in memory
//! (`2^PW` words).
//!
//! # Generated module
//!
//! - **Ports**: `i_clk`, optional reset, `i_ce`, optional `i_aux`, `i_phase`,
//!   `o_val`, optional `o_aux`
//! - **Memory**: `tbl[0:2^PW-1]`, loaded from `<module>.hex`
//! - **Aux**: `o_aux` is registered under the same reset/enable as `o_val`

mod model;

pub use model::DirectLookup;

use sintab_core::hdl::{ClockedBlock, HdlModule, ModuleBuilder, NetKind, Port, Stmt};
use sintab_core::types::{Strategy, TableConfig};
use sintab_core::Generator;

/// Clock-enabled cycles from `i_phase` to `o_val`.
pub const LATENCY: u32 = 1;

const PURPOSE: &str = "A direct table lookup sine wave generator. Every phase\n\
                       has its own table entry, giving the lowest latency of\n\
                       any sine wave generator at the cost of the largest table.";

#[derive(Debug, Clone, Copy, Default)]
pub struct DirectGenerator;

impl DirectGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl Generator for DirectGenerator {
    fn strategy(&self) -> Strategy {
        Strategy::Direct
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
            .port_if(config.aux, Port::output("o_aux", NetKind::Reg, None))
            .width_parameters(config.phase_width, config.output_width)
            .table_memory("tbl", "(OW-1):0", "(1<<PW)")
            .clocked(
                ClockedBlock::new()
                    .clears("o_val")
                    .stmt(Stmt::assign("o_val", "tbl[i_phase]")),
            );

        if config.aux {
            builder
                .clocked(
                    ClockedBlock::new()
                        .clears("o_aux")
                        .stmt(Stmt::assign("o_aux", "i_aux")),
                )
                .build()
        } else {
            builder.build()
        }
    }
}
