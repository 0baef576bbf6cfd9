//! Byte-accurate functional reference model.
//!
//! This is the test oracle for [`crate::cache::Cache`]: a write-through model
//! over a flat simulated RAM that applies every request immediately and
//! returns the response it implies, with no pipelining, no tag array, and no
//! replacement policy. It deliberately shares no code with the pipelined
//! model so a bug common to both wouldn't cancel out in comparison tests.

use std::collections::HashMap;

use crate::config::CacheParams;
use crate::message::{CacheReq, CacheResp, ReqType, RespTest};

/// Computes the value an AMO writes back to memory, independently of
/// [`crate::cache::amo::atomic_alu`] — this model must not share the
/// pipelined cache's own ALU, or a bug in that ALU would cancel out instead
/// of surfacing in differential tests.
fn golden_amo_result(op: ReqType, mem_val: u32, reg_val: u32) -> u32 {
    match op {
        ReqType::AmoSwap => reg_val,
        ReqType::AmoAdd => mem_val.wrapping_add(reg_val),
        ReqType::AmoAnd => mem_val & reg_val,
        ReqType::AmoOr => mem_val | reg_val,
        ReqType::AmoXor => mem_val ^ reg_val,
        ReqType::AmoMin => i32::min(mem_val as i32, reg_val as i32) as u32,
        ReqType::AmoMax => i32::max(mem_val as i32, reg_val as i32) as u32,
        ReqType::AmoMinu => u32::min(mem_val, reg_val),
        ReqType::AmoMaxu => u32::max(mem_val, reg_val),
        _ => unreachable!("golden_amo_result called with non-AMO request type {op:?}"),
    }
}

/// A flat byte-addressable memory, sparse so large address spaces in tests
/// don't need to be materialized.
#[derive(Debug, Clone, Default)]
pub struct Ram {
    bytes: HashMap<u64, u8>,
}

impl Ram {
    /// An all-zero memory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads `len` bytes starting at `addr`, zero for any byte never
    /// written.
    #[must_use]
    pub fn read(&self, addr: u64, len: usize) -> u64 {
        let mut bytes = [0u8; 8];
        for i in 0..len.min(8) {
            bytes[i] = self.bytes.get(&(addr + i as u64)).copied().unwrap_or(0);
        }
        u64::from_le_bytes(bytes)
    }

    /// Writes `len` low bytes of `value` starting at `addr`.
    pub fn write(&mut self, addr: u64, len: usize, value: u64) {
        let le = value.to_le_bytes();
        for (i, byte) in le.iter().enumerate().take(len.min(8)) {
            self.bytes.insert(addr + i as u64, *byte);
        }
    }
}

/// The reference model: a [`Ram`] plus enough of [`CacheParams`] to know the
/// default access width for `len == 0` requests.
#[derive(Debug, Clone)]
pub struct ReferenceModel {
    ram: Ram,
    dbw_bytes: usize,
}

impl ReferenceModel {
    /// Builds an empty reference model sized for `params`'s data width.
    #[must_use]
    pub fn new(params: &CacheParams) -> Self {
        Self {
            ram: Ram::new(),
            dbw_bytes: (params.dbw / 8) as usize,
        }
    }

    /// The underlying memory, for seeding or inspecting golden state.
    #[must_use]
    pub const fn ram(&self) -> &Ram {
        &self.ram
    }

    /// A mutable handle to the underlying memory, for seeding golden state
    /// directly instead of via a `WriteInit` request.
    pub fn ram_mut(&mut self) -> &mut Ram {
        &mut self.ram
    }

    fn width(&self, len: u8) -> usize {
        if len == 0 {
            self.dbw_bytes
        } else {
            len as usize
        }
    }

    /// Applies one request immediately, returning the response it implies.
    ///
    /// `Inv` and `Flush` are no-ops against this model: it holds no resident
    /// state to invalidate or write back, so both always report a hit.
    #[must_use]
    pub fn apply(&mut self, req: CacheReq) -> CacheResp {
        match req.req_type {
            ReqType::Inv | ReqType::Flush => CacheResp {
                req_type: req.req_type,
                opaque: req.opaque,
                test: RespTest::Hit,
                len: 0,
                data: 0,
            },
            ReqType::Read => {
                let width = self.width(req.len);
                let data = self.ram.read(req.addr, width);
                CacheResp {
                    req_type: req.req_type,
                    opaque: req.opaque,
                    test: RespTest::Hit,
                    len: req.len,
                    data,
                }
            }
            ReqType::Write | ReqType::WriteInit => {
                let width = self.width(req.len);
                self.ram.write(req.addr, width, req.data);
                CacheResp {
                    req_type: req.req_type,
                    opaque: req.opaque,
                    test: RespTest::Hit,
                    len: req.len,
                    data: 0,
                }
            }
            _ if req.req_type.is_amo() => {
                let width = self.dbw_bytes;
                let mem_val = self.ram.read(req.addr, width) as u32;
                let new_val = golden_amo_result(req.req_type, mem_val, req.data as u32);
                self.ram.write(req.addr, width, u64::from(new_val));
                CacheResp {
                    req_type: req.req_type,
                    opaque: req.opaque,
                    test: RespTest::AmoHit,
                    len: 0,
                    data: u64::from(mem_val),
                }
            }
            ReqType::AmoAdd
            | ReqType::AmoAnd
            | ReqType::AmoOr
            | ReqType::AmoSwap
            | ReqType::AmoMin
            | ReqType::AmoMinu
            | ReqType::AmoMax
            | ReqType::AmoMaxu
            | ReqType::AmoXor => unreachable!("covered by the is_amo() arm above"),
        }
    }
}
