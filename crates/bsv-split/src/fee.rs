//! Linear size and fee model for P2PKH transactions.
//!
//! `size = overhead + inputs·148 + outputs·34`, where the overhead is
//! version(4) + input count + output count + lock time(4). Both counts are
//! one-byte VarInts below 253, giving the familiar 10 bytes; larger counts
//! use their real VarInt width so the estimate never undershoots.

use bsv_primitives::util::VarInt;
use bsv_transaction::input::P2PKH_INPUT_SIZE;
use bsv_transaction::output::P2PKH_OUTPUT_SIZE;

/// Overhead for counts below 253.
pub const OVERHEAD_BYTES: usize = 10;
pub const PER_INPUT_BYTES: usize = P2PKH_INPUT_SIZE;
pub const PER_OUTPUT_BYTES: usize = P2PKH_OUTPUT_SIZE;

/// Tolerance when deciding that `size · rate` is already a whole number.
const WHOLE_EPSILON: f64 = 1e-9;

/// Estimated serialized size of a signed P2PKH transaction.
pub fn estimate_size(input_count: usize, output_count: usize) -> usize {
    let overhead = 4
        + VarInt::from(input_count).length()
        + VarInt::from(output_count).length()
        + 4;
    overhead + input_count * PER_INPUT_BYTES + output_count * PER_OUTPUT_BYTES
}

/// `ceil(estimate_size · fee_rate)`.
pub fn estimate_fee(input_count: usize, output_count: usize, fee_rate: f64) -> u64 {
    fee_for_size(estimate_size(input_count, output_count), fee_rate)
}

/// `ceil(size · fee_rate)`.
///
/// Products within rounding noise of an integer are taken as that integer,
/// so `200 · 0.05` costs 10 satoshis and not 11.
pub fn fee_for_size(size: usize, fee_rate: f64) -> u64 {
    let raw = size as f64 * fee_rate;
    if !raw.is_finite() || raw <= 0.0 {
        return 0;
    }
    let nearest = raw.round();
    if (raw - nearest).abs() < WHOLE_EPSILON {
        nearest as u64
    } else {
        raw.ceil() as u64
    }
}
