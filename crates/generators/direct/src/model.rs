//! Cycle model of the direct lookup module.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sintab_core::table;
use sintab_core::types::{CycleInputs, ResetMode, Strategy, TableConfig};
use sintab_core::{ClockedLookup, GenError};

/// Registers of the direct module: `o_val` and `o_aux`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectLookup {
    #[serde(skip)]
    table: Vec<i64>,
    phase_mask: u32,
    reset_mode: ResetMode,
    with_aux: bool,
    value: i64,
    aux: bool,
}

impl DirectLookup {
    pub fn new(config: &TableConfig) -> Result<Self, GenError> {
        let table = table::build(Strategy::Direct, config.phase_width, config.output_width)?;
        Ok(Self {
            table: table.samples,
            phase_mask: ((1u64 << config.phase_width) - 1) as u32,
            reset_mode: config.reset,
            with_aux: config.aux,
            value: 0,
            aux: false,
        })
    }
}

impl ClockedLookup for DirectLookup {
    fn latency(&self) -> u32 {
        crate::LATENCY
    }

    fn reset(&mut self) {
        self.value = 0;
        self.aux = false;
    }

    fn clock(&mut self, inputs: CycleInputs) {
        if inputs.reset && self.reset_mode != ResetMode::None {
            self.reset();
        } else if inputs.ce {
            self.value = self.table[(inputs.phase & self.phase_mask) as usize];
            if self.with_aux {
                self.aux = inputs.aux;
            }
        }
    }

    fn value(&self) -> i64 {
        self.value
    }

    fn aux(&self) -> bool {
        self.aux
    }

    fn registers(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enabled(phase: u32, aux: bool) -> CycleInputs {
        CycleInputs {
            reset: false,
            ce: true,
            phase,
            aux,
        }
    }

    #[test]
    fn test_one_cycle_lookup() {
        let mut model = DirectLookup::new(&TableConfig::new(Strategy::Direct, 4, 8)).unwrap();
        assert_eq!(model.latency(), 1);
        model.clock(enabled(4, false));
        assert_eq!(model.value(), 127);
        model.clock(enabled(12, false));
        assert_eq!(model.value(), -127);
    }

    #[test]
    fn test_clock_enable_holds_state() {
        let mut model = DirectLookup::new(&TableConfig::new(Strategy::Direct, 4, 8)).unwrap();
        model.clock(enabled(4, false));
        model.clock(CycleInputs {
            ce: false,
            phase: 12,
            ..CycleInputs::default()
        });
        assert_eq!(model.value(), 127);
    }

    #[test]
    fn test_sync_reset_with_aux() {
        let config = TableConfig::new(Strategy::Direct, 4, 8)
            .with_reset(ResetMode::Sync)
            .with_aux(true);
        let mut model = DirectLookup::new(&config).unwrap();

        model.clock(enabled(4, true));
        assert_eq!(model.value(), 127);
        assert!(model.aux());

        // Reset wins over clock enable
        model.clock(CycleInputs {
            reset: true,
            ce: true,
            phase: 4,
            aux: true,
        });
        assert_eq!(model.value(), 0);
        assert!(!model.aux());

        // Aux follows the input sampled on the previous edge
        model.clock(enabled(4, true));
        assert!(model.aux());
        assert_eq!(model.value(), 127);
        model.clock(enabled(4, false));
        assert!(!model.aux());
    }

    #[test]
    fn test_reset_ignored_without_reset_port() {
        let mut model = DirectLookup::new(&TableConfig::new(Strategy::Direct, 4, 8)).unwrap();
        model.clock(CycleInputs {
            reset: true,
            ce: true,
            phase: 4,
            aux: false,
        });
        assert_eq!(model.value(), 127);
    }

    #[test]
    fn test_aux_absent_stays_low() {
        let mut model = DirectLookup::new(&TableConfig::new(Strategy::Direct, 4, 8)).unwrap();
        model.clock(enabled(1, true));
        assert!(!model.aux());
    }

    #[test]
    fn test_registers_snapshot() {
        let mut model = DirectLookup::new(&TableConfig::new(Strategy::Direct, 4, 8)).unwrap();
        model.clock(enabled(4, false));
        let regs = model.registers();
        assert_eq!(regs["value"], 127);
        assert_eq!(regs["aux"], false);
        assert!(regs.get("table").is_none());
    }

    #[test]
    fn test_rejects_oversized_table() {
        assert!(matches!(
            DirectLookup::new(&TableConfig::new(Strategy::Direct, 24, 8)),
            Err(GenError::ResourceLimit { .. })
        ));
    }
}
