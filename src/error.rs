//! Error taxonomy for the cache pipeline.
//!
//! This covers violated *preconditions* on an incoming request (a malformed
//! [`CacheReq`](crate::message::CacheReq)) and MSHR/memory-port protocol
//! violations the controller can detect at a live call site and hand back to
//! a driving harness instead of aborting the process. Dead branches the type
//! system can't rule out on its own (an exhaustive match over `ReqType` with
//! a wildcard arm already excluded by an `is_amo()` guard) are asserted with
//! `unreachable!()` rather than threaded through `Result` — they are
//! genuinely unreachable, not conditions a caller can trigger or a harness
//! can meaningfully recover from.

use thiserror::Error;

/// Something the pipeline controller cannot recover from.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheFault {
    /// M1 tried to allocate the MSHR while it already held an entry.
    #[error("MSHR allocation requested while already full")]
    MshrAllocWhileFull,

    /// A memory response arrived whose opaque id didn't match the
    /// outstanding MSHR entry.
    #[error("memory response opaque {got:#x} does not match outstanding request {expected:#x}")]
    OpaqueMismatch {
        /// Opaque id the MSHR was waiting for.
        expected: u32,
        /// Opaque id actually observed on the response.
        got: u32,
    },

    /// A request's address was not aligned to its length.
    #[error("address {addr:#x} is not aligned to a {len}-byte access")]
    MisalignedAccess {
        /// The offending address.
        addr: u64,
        /// The requested access length in bytes.
        len: u8,
    },

    /// An AMO request specified a length other than a full data word.
    #[error("AMO requests must use word length, got {len}")]
    InvalidAmoLength {
        /// The offending length in bytes.
        len: u8,
    },
}

/// Convenience alias used throughout the pipeline.
pub type Result<T> = std::result::Result<T, CacheFault>;
