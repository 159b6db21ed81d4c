//! Register-level model of the quarter-wave pipeline.
//!
//! The register set here is the same one the emitted module declares:
//!
//! | edge | register   | contents                                      |
//! |------|------------|-----------------------------------------------|
//! | 1    | `negate`   | top phase bit: sample is in the second half   |
//! | 1    | `tblvalue` | `quartertable[index]`, index folded from phase |
//! | 2    | `o_val`    | `tblvalue`, negated if `negate`               |
//! | aux  | `aux`      | two-deep shift register, `o_aux = aux[1]`     |
//!
//! The fold itself is combinational, so a phase reaches `o_val` two
//! clock-enabled edges after it is presented and every value in flight
//! sits in a register that reset clears.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sintab_core::table;
use sintab_core::types::{CycleInputs, ResetMode, Strategy, TableConfig};
use sintab_core::{ClockedLookup, GenError};

/// Fold a phase word onto the stored quadrant.
///
/// Returns `(negate, index)`: whether the stored sample must be negated,
/// and the quarter-table entry to read. In odd quadrants the sub-index is
/// complemented, which reflects the descending half onto stored samples.
pub fn fold_phase(phase: u32, phase_width: u32) -> (bool, u32) {
    let sub_mask = (1u32 << (phase_width - 2)) - 1;
    let half = (phase >> (phase_width - 1)) & 1 != 0;
    let quad = (phase >> (phase_width - 2)) & 1 != 0;
    let sub = phase & sub_mask;
    let index = if quad { !sub & sub_mask } else { sub };
    (half, index)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuarterPipeline {
    #[serde(skip)]
    table: Vec<i64>,
    phase_width: u32,
    reset_mode: ResetMode,
    with_aux: bool,
    negate: bool,
    tblvalue: i64,
    value: i64,
    aux: [bool; 2],
}

impl QuarterPipeline {
    pub fn new(config: &TableConfig) -> Result<Self, GenError> {
        let table = table::build(Strategy::Quarter, config.phase_width, config.output_width)?;
        Ok(Self {
            table: table.samples,
            phase_width: config.phase_width,
            reset_mode: config.reset,
            with_aux: config.aux,
            negate: false,
            tblvalue: 0,
            value: 0,
            aux: [false; 2],
        })
    }

    /// Stored sample and sign for `phase`, as the first edge latches them
    pub fn lookup(&self, phase: u32) -> (bool, i64) {
        let (negate, index) = fold_phase(phase, self.phase_width);
        (negate, self.table[index as usize])
    }
}

impl ClockedLookup for QuarterPipeline {
    fn latency(&self) -> u32 {
        crate::LATENCY
    }

    fn reset(&mut self) {
        self.negate = false;
        self.tblvalue = 0;
        self.value = 0;
        self.aux = [false; 2];
    }

    fn clock(&mut self, inputs: CycleInputs) {
        if inputs.reset && self.reset_mode != ResetMode::None {
            self.reset();
            return;
        }
        if !inputs.ce {
            return;
        }

        // Every stage reads the registers as they were before this edge
        self.value = if self.negate {
            -self.tblvalue
        } else {
            self.tblvalue
        };
        let (negate, tblvalue) = self.lookup(inputs.phase);
        self.negate = negate;
        self.tblvalue = tblvalue;

        if self.with_aux {
            self.aux = [inputs.aux, self.aux[0]];
        }
    }

    fn value(&self) -> i64 {
        self.value
    }

    fn aux(&self) -> bool {
        self.aux[1]
    }

    fn registers(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
