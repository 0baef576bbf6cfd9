//! Wire message types for the four cache ports: `cachereq`/`cacheresp` on the
//! processor side, `memreq`/`memresp` on the memory side.

/// Request type carried on `cachereq` and, for misses, mirrored onto
/// `memreq`.
///
/// AMO variants are kept contiguous so range checks (`is_amo`) stay a single
/// comparison, the way the host simulator keeps its `AtomicOp` variants
/// grouped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ReqType {
    /// Plain load.
    #[default]
    Read,
    /// Plain store.
    Write,
    /// Store that bypasses the tag compare entirely (used to seed memory
    /// contents in tests; never consults or updates tags beyond the write
    /// itself).
    WriteInit,
    /// Atomic add.
    AmoAdd,
    /// Atomic bitwise AND.
    AmoAnd,
    /// Atomic bitwise OR.
    AmoOr,
    /// Atomic swap.
    AmoSwap,
    /// Atomic signed minimum.
    AmoMin,
    /// Atomic unsigned minimum.
    AmoMinu,
    /// Atomic signed maximum.
    AmoMax,
    /// Atomic unsigned maximum.
    AmoMaxu,
    /// Atomic bitwise XOR.
    AmoXor,
    /// Invalidate: clear all valid bits, preserve dirty bits.
    Inv,
    /// Flush: write back every dirty line, then clear dirty bits.
    Flush,
}

impl ReqType {
    /// True for any of the nine AMO variants.
    #[must_use]
    pub const fn is_amo(self) -> bool {
        matches!(
            self,
            Self::AmoAdd
                | Self::AmoAnd
                | Self::AmoOr
                | Self::AmoSwap
                | Self::AmoMin
                | Self::AmoMinu
                | Self::AmoMax
                | Self::AmoMaxu
                | Self::AmoXor
        )
    }

    /// True for `Inv` or `Flush`, the two whole-cache requests that ignore
    /// `addr`/`len`/`data`.
    #[must_use]
    pub const fn is_whole_cache(self) -> bool {
        matches!(self, Self::Inv | Self::Flush)
    }
}

/// A request arriving on the processor-facing port.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CacheReq {
    /// Operation to perform.
    pub req_type: ReqType,
    /// Caller-supplied tag echoed back on the matching response.
    pub opaque: u32,
    /// Byte address. Ignored for `Inv`/`Flush`.
    pub addr: u64,
    /// Access length in bytes; `0` denotes a full data word (`dbw` bits).
    /// Ignored for `Inv`/`Flush`.
    pub len: u8,
    /// Store/AMO operand. Ignored for `Read`/`Inv`/`Flush`.
    pub data: u64,
}

/// Outcome classification carried on [`CacheResp`], observable only by
/// tests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RespTest {
    /// The request missed and required a memory round-trip.
    Miss,
    /// The request hit a resident line.
    Hit,
    /// The request was an AMO and its target line was resident.
    AmoHit,
}

/// A response returned on the processor-facing port.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CacheResp {
    /// Echoes the request's type.
    pub req_type: ReqType,
    /// Echoes the request's opaque id.
    pub opaque: u32,
    /// Hit/miss/amo-hit classification.
    pub test: RespTest,
    /// Echoes the request's length.
    pub len: u8,
    /// For reads and AMOs, the returned data (pre-op value for AMOs).
    pub data: u64,
}

/// A request issued on the memory-facing port.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemReq {
    /// `Read` to fill a line, `Write` to evict or write back a dirty line,
    /// or the original AMO type for an atomic round-trip.
    pub req_type: ReqType,
    /// Opaque id used to match the eventual [`MemResp`].
    pub opaque: u32,
    /// Offset-aligned address (to the start of a cacheline).
    pub addr: u64,
    /// `0` for a read, or the full cacheline width in bytes for a write.
    pub len: u16,
    /// Cacheline payload for a write; unused for reads.
    pub data: u128,
    /// Per-byte write mask, derived from the per-word dirty bitmap for
    /// evicts.
    pub wr_mask: u32,
}

/// A response returned on the memory-facing port.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemResp {
    /// Echoes the request's type.
    pub req_type: ReqType,
    /// Echoes the request's opaque id; used to validate against the
    /// outstanding MSHR entry.
    pub opaque: u32,
    /// Cacheline payload for a read refill.
    pub data: u128,
}
