//! Atomic read-modify-write ALU.
//!
//! Adapted from the host simulator's A-extension `atomic_alu`, narrowed to
//! the single `dbw`-wide word width every cache AMO operates on (the cache
//! never sees a double-width AMO; that distinction lives entirely on the
//! processor side of `cachereq`).

use crate::message::ReqType;

/// Computes the value to write back to memory for an AMO, given the
/// resident/fetched memory value and the request's operand.
///
/// # Panics
///
/// Panics if `op` is not one of the nine AMO variants.
#[must_use]
pub fn atomic_alu(op: ReqType, mem_val: u32, reg_val: u32) -> u32 {
    match op {
        ReqType::AmoSwap => reg_val,
        ReqType::AmoAdd => mem_val.wrapping_add(reg_val),
        ReqType::AmoXor => mem_val ^ reg_val,
        ReqType::AmoAnd => mem_val & reg_val,
        ReqType::AmoOr => mem_val | reg_val,
        ReqType::AmoMin => (mem_val as i32).min(reg_val as i32) as u32,
        ReqType::AmoMax => (mem_val as i32).max(reg_val as i32) as u32,
        ReqType::AmoMinu => mem_val.min(reg_val),
        ReqType::AmoMaxu => mem_val.max(reg_val),
        _ => unreachable!("atomic_alu called with non-AMO request type {op:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swap_returns_operand() {
        assert_eq!(atomic_alu(ReqType::AmoSwap, 5, 9), 9);
    }

    #[test]
    fn add_wraps() {
        assert_eq!(atomic_alu(ReqType::AmoAdd, u32::MAX, 1), 0);
    }

    #[test]
    fn min_is_signed() {
        assert_eq!(atomic_alu(ReqType::AmoMin, 0u32.wrapping_sub(1), 1), 0u32.wrapping_sub(1));
        assert_eq!(atomic_alu(ReqType::AmoMinu, 0u32.wrapping_sub(1), 1), 1);
    }
}
