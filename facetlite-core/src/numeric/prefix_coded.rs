//! Shift-prefixed encoding for 64-bit integers.
//!
//! Every numeric value is indexed once per precision level. The first byte of a
//! term carries the shift; the rest carries the sortable bits of the value,
//! shifted right by that amount, as big-endian 7-bit groups. Shift 0 terms are
//! the full-precision value; coarser shifts exist only to prune range queries.

use thiserror::Error;

pub const SHIFT_START_INT64: u8 = 0x20;
pub const MAX_SHIFT: u32 = 63;

const SIGN_FLIP: u64 = 0x8000_0000_0000_0000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrefixCodedError {
  #[error("prefix coded term is empty")]
  Empty,

  #[error("shift byte {byte:#04x} is outside the int64 range")]
  InvalidShift { byte: u8 },

  #[error("shift {shift} exceeds the maximum of 63")]
  ShiftOutOfRange { shift: u32 },

  #[error("expected {expected} payload bytes for shift {shift}, found {found}")]
  Length {
    shift: u32,
    expected: usize,
    found: usize,
  },

  #[error("payload byte {byte:#04x} at offset {offset} has the high bit set")]
  InvalidByte { byte: u8, offset: usize },

  #[error("leading payload group overflows 64 bits")]
  Overflow,

  #[error("precision step must be between 1 and 64")]
  PrecisionStep,
}

fn payload_len(shift: u32) -> usize {
  ((MAX_SHIFT - shift) / 7 + 1) as usize
}

/// Encodes `value` at the given precision level.
pub fn encode_i64(value: i64, shift: u32) -> Result<Vec<u8>, PrefixCodedError> {
  if shift > MAX_SHIFT {
    return Err(PrefixCodedError::ShiftOutOfRange { shift });
  }
  let len = payload_len(shift);
  let mut out = vec![0u8; len + 1];
  out[0] = SHIFT_START_INT64 + shift as u8;
  let mut bits = ((value as u64) ^ SIGN_FLIP) >> shift;
  for slot in out[1..].iter_mut().rev() {
    *slot = (bits & 0x7F) as u8;
    bits >>= 7;
  }
  Ok(out)
}

/// Encodes `value` at every shift that is a multiple of `precision_step`.
pub fn encode_all_precisions(
  value: i64,
  precision_step: u32,
) -> Result<Vec<Vec<u8>>, PrefixCodedError> {
  if precision_step == 0 || precision_step > 64 {
    return Err(PrefixCodedError::PrecisionStep);
  }
  (0..=MAX_SHIFT)
    .step_by(precision_step as usize)
    .map(|shift| encode_i64(value, shift))
    .collect()
}

/// A borrowed view over an encoded term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefixCoded<'a> {
  bytes: &'a [u8],
}

impl<'a> PrefixCoded<'a> {
  pub fn new(bytes: &'a [u8]) -> Self {
    Self { bytes }
  }

  pub fn shift(&self) -> Result<u32, PrefixCodedError> {
    let first = *self.bytes.first().ok_or(PrefixCodedError::Empty)?;
    match first.checked_sub(SHIFT_START_INT64) {
      Some(shift) if u32::from(shift) <= MAX_SHIFT => Ok(u32::from(shift)),
      _ => Err(PrefixCodedError::InvalidShift { byte: first }),
    }
  }

  pub fn to_i64(&self) -> Result<i64, PrefixCodedError> {
    let shift = self.shift()?;
    let payload = &self.bytes[1..];
    let expected = payload_len(shift);
    if payload.len() != expected {
      return Err(PrefixCodedError::Length {
        shift,
        expected,
        found: payload.len(),
      });
    }
    // the leading group only carries what is left after the full 7-bit groups
    let lead_bits = (64 - shift) as usize - 7 * (expected - 1);
    let mut bits = 0u64;
    for (offset, &byte) in payload.iter().enumerate() {
      if byte & 0x80 != 0 {
        return Err(PrefixCodedError::InvalidByte { byte, offset });
      }
      if offset == 0 && lead_bits < 7 && byte >> lead_bits != 0 {
        return Err(PrefixCodedError::Overflow);
      }
      bits = (bits << 7) | u64::from(byte);
    }
    Ok(((bits << shift) ^ SIGN_FLIP) as i64)
  }
}
