//! Parameterizable, pipelined, write-back/write-allocate blocking cache.
//!
//! This crate implements a cycle-accurate blocking cache model with the
//! following:
//! 1. **Pipeline:** a single-MSHR controller (`Cache::tick`) that accepts one
//!    in-flight request at a time, walking it through tag compare, optional
//!    dirty eviction, memory fetch, and refill.
//! 2. **Arrays:** a set-associative tag array with per-word dirty bitmaps,
//!    and a byte-maskable data array.
//! 3. **Operations:** plain loads/stores, a tag-bypassing `WriteInit` for
//!    seeding memory, nine AMOs, whole-cache `Inv`, and whole-cache `Flush`.
//! 4. **Policy:** a pluggable replacement policy (none, PLRU, LRU, FIFO,
//!    MRU) selected at construction time.
//! 5. **Reference model:** a byte-accurate, non-pipelined functional model
//!    used as a test oracle, sharing no code with the pipelined cache.

/// Cache construction parameters and the replacement-policy selector.
pub mod config;
/// Error taxonomy for internal-invariant faults and request precondition
/// violations.
pub mod error;
/// Wire message types for the `cachereq`/`cacheresp`/`memreq`/`memresp`
/// ports.
pub mod message;
/// The pipelined cache itself: tag array, data array, MSHR, replacement
/// policy, and the tick-driven controller.
pub mod cache;
/// Byte-accurate functional model used as a test oracle.
pub mod reference;

/// Construction-time parameters for a [`Cache`]; see [`config::CacheParams`].
pub use crate::config::CacheParams;
/// The pipelined cache; see [`cache::Cache`].
pub use crate::cache::Cache;
/// Error type returned by [`Cache::tick`]; see [`error::CacheFault`].
pub use crate::error::CacheFault;
