//! Fixed-point sine table construction.
//!
//! Both strategies evaluate `sin` in `f64`, scale by the largest positive
//! sample and truncate toward zero. The truncation is part of the output
//! contract: tables must match previously generated hex files bit for bit.
//!
//! - **Direct**: `2^PW` samples at `2πk/N`, covering one full period.
//! - **Quarter**: `2^(PW-2)` samples at `2πk/N + π/N`, the first quadrant
//!   sampled at bin centres so no sample sits on a symmetry boundary.

use crate::logging::{log, LogCategory, LogLevel};
use crate::types::{SampleTable, Strategy};
use crate::GenError;
use std::f64::consts::PI;

/// Direct tables must use fewer phase bits than this (16M entries).
pub const DIRECT_PHASE_LIMIT: u32 = 24;

/// Quarter tables must use fewer phase bits than this (16M phases, 8M entries).
pub const QUARTER_PHASE_LIMIT: u32 = 26;

/// Narrowest and widest supported sample widths
pub const MIN_OUTPUT_WIDTH: u32 = 2;
pub const MAX_OUTPUT_WIDTH: u32 = 64;

/// Largest positive sample, `2^(OW-1) - 1`.
pub fn max_value(output_width: u32) -> i64 {
    ((1u64 << (output_width - 1)) - 1) as i64
}

/// Number of entries the table for `strategy` holds.
pub fn table_len(strategy: Strategy, phase_width: u32) -> usize {
    match strategy {
        Strategy::Direct => 1usize << phase_width,
        Strategy::Quarter => 1usize << (phase_width - 2),
    }
}

/// Validate widths without allocating anything.
pub fn check_limits(strategy: Strategy, phase_width: u32, output_width: u32) -> Result<(), GenError> {
    let (min_phase, limit) = match strategy {
        Strategy::Direct => (1, DIRECT_PHASE_LIMIT),
        // Quadrant bit, half bit and at least one index bit
        Strategy::Quarter => (3, QUARTER_PHASE_LIMIT),
    };

    if phase_width < min_phase {
        return Err(GenError::Precondition {
            strategy,
            reason: format!(
                "phase width must be at least {} bits, got {}",
                min_phase, phase_width
            ),
        });
    }
    if phase_width >= limit {
        return Err(GenError::ResourceLimit {
            strategy,
            phase_width,
            limit,
        });
    }
    if !(MIN_OUTPUT_WIDTH..=MAX_OUTPUT_WIDTH).contains(&output_width) {
        return Err(GenError::Precondition {
            strategy,
            reason: format!(
                "output width must be between {} and {} bits, got {}",
                MIN_OUTPUT_WIDTH, MAX_OUTPUT_WIDTH, output_width
            ),
        });
    }
    Ok(())
}

/// Build the sample table for `strategy`.
pub fn build(strategy: Strategy, phase_width: u32, output_width: u32) -> Result<SampleTable, GenError> {
    check_limits(strategy, phase_width, output_width)?;

    let entries = table_len(strategy, phase_width);
    let period = (1u64 << phase_width) as f64;
    let limit = max_value(output_width);
    let maxv = limit as f64;
    let offset = match strategy {
        Strategy::Direct => 0.0,
        Strategy::Quarter => PI / period,
    };

    let mut samples = Vec::with_capacity(entries);
    for k in 0..entries {
        let phase = 2.0 * PI * (k as f64) / period + offset;
        // Above 53 bits `maxv` rounds up in f64 and can overshoot the range
        samples.push(((maxv * phase.sin()) as i64).clamp(-limit, limit));
    }

    log(LogCategory::Table, LogLevel::Debug, || {
        format!(
            "Built {} table: {} entries of {} bits",
            strategy, entries, output_width
        )
    });

    Ok(SampleTable {
        output_width,
        samples,
    })
}
