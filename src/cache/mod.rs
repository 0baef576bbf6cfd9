//! The blocking cache itself: tag array, data array, MSHR, replacement
//! policy, and the controller that drives them across ticks.
//!
//! `Cache::tick` is the single entry point, modeling the four ready/valid
//! ports as one synchronous step: feed in whatever the processor and memory
//! offered this cycle, get back whatever the cache offers in return. A miss
//! spans several ticks (optional evict, fetch, refill) during which
//! `cachereq_rdy` stays low and the caller is expected to keep presenting
//! the same request, mirroring how a held `valid` signal behaves on a real
//! bus.

pub mod amo;
pub mod data_array;
pub mod mshr;
pub mod policies;
pub mod replicator;
pub mod tag_array;

use data_array::DataArray;
use mshr::Mshr;
use policies::ReplacementPolicy;
use tag_array::{tag_update, TagArray, TagEntry, TagUpdateCmd};

use crate::config::CacheParams;
use crate::error::{CacheFault, Result};
use crate::message::{CacheReq, CacheResp, MemReq, MemResp, ReqType, RespTest};

/// Per-tick diagnostics. Emits at `trace` level normally; the `always-trace`
/// feature bumps it to `debug` so a failing test can be re-run with verbose
/// per-tick output without touching the subscriber's filter.
macro_rules! tick_event {
    ($($arg:tt)*) => {
        #[cfg(feature = "always-trace")]
        tracing::debug!($($arg)*);
        #[cfg(not(feature = "always-trace"))]
        tracing::trace!($($arg)*);
    };
}

/// Consecutive stalled ticks (no new request accepted) before a long-running
/// stall is flagged. Diagnostic only; never gates correctness.
const STALL_WARN_THRESHOLD: u32 = 1_000;

/// Front-end state machine gating what M0 is allowed to do each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrontEnd {
    /// Walking the tag array at reset; `counter` is the next slot to clear.
    Init(usize),
    /// Normal operation.
    Ready,
}

/// What to do once an in-flight miss's memory round trip resolves.
#[derive(Debug, Clone, Copy)]
enum Follow {
    Read {
        req: CacheReq,
        way: usize,
        index: usize,
        tag: u64,
    },
    Write {
        req: CacheReq,
        way: usize,
        index: usize,
        tag: u64,
    },
    Amo {
        req: CacheReq,
        way: usize,
        index: usize,
        tag: u64,
    },
}

impl Follow {
    const fn req(self) -> CacheReq {
        match self {
            Self::Read { req, .. } | Self::Write { req, .. } | Self::Amo { req, .. } => req,
        }
    }
}

/// What the controller is busy doing across possibly several ticks.
#[derive(Debug, Clone, Copy)]
enum Phase {
    /// No miss, flush, or eviction is in flight; a new request may be
    /// accepted.
    Idle,
    /// A dirty victim must be written back before the fetch can be issued.
    PendingEvict {
        way: usize,
        index: usize,
        victim: TagEntry,
        follow: Follow,
    },
    /// The victim (if any) has been evicted; the fetch/AMO memreq is ready
    /// to be sent.
    ReadyToFetch(Follow),
    /// The fetch/AMO memreq is outstanding; waiting for `memresp`.
    AwaitingFill { expect_opaque: u32, follow: Follow },
    /// Walking the tag array writing back dirty lines.
    Flushing { cursor: usize, opaque: u32 },
}

/// Inputs to one clock tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInputs {
    /// A request from the processor, held valid until `cachereq_rdy`.
    pub cachereq: Option<CacheReq>,
    /// A response from memory for the outstanding fetch/AMO, if any.
    pub memresp: Option<MemResp>,
    /// Whether memory will accept a `memreq` issued this tick.
    pub memreq_rdy: bool,
    /// Whether the processor will accept a `cacheresp` issued this tick.
    pub cacheresp_rdy: bool,
}

/// Outputs of one clock tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickOutputs {
    /// Whether the cache will accept a new `cachereq` next tick.
    pub cachereq_rdy: bool,
    /// A response for the processor, if one completed this tick.
    pub cacheresp: Option<CacheResp>,
    /// A request for memory, if one was issued this tick.
    pub memreq: Option<MemReq>,
}

/// A parameterizable, pipelined, write-back/write-allocate blocking cache.
#[derive(Debug)]
pub struct Cache {
    params: CacheParams,
    tags: TagArray,
    data: DataArray,
    policy: Box<dyn ReplacementPolicy + Send + Sync>,
    mshr: Mshr,
    fsm: FrontEnd,
    phase: Phase,
    held_cacheresp: Option<CacheResp>,
    held_memreq: Option<MemReq>,
    stall_streak: u32,
}

impl Cache {
    /// Builds a cache, beginning in the cold-start `INIT` walk.
    #[must_use]
    pub fn new(params: CacheParams) -> Self {
        let policy = policies::build(params.policy, params.associativity, params.lines_per_way());
        Self {
            tags: TagArray::new(&params),
            data: DataArray::new(&params),
            policy,
            mshr: Mshr::new(),
            fsm: FrontEnd::Init(0),
            phase: Phase::Idle,
            held_cacheresp: None,
            held_memreq: None,
            stall_streak: 0,
            params,
        }
    }

    /// The parameters this cache was constructed with.
    #[must_use]
    pub const fn params(&self) -> &CacheParams {
        &self.params
    }

    fn dbw_bytes(&self) -> usize {
        (self.params.dbw / 8) as usize
    }

    fn line_bytes(&self) -> usize {
        self.params.line_bytes()
    }

    fn decode_addr(&self, addr: u64) -> (u64, usize, usize) {
        let offset_bits = self.params.offset_bits();
        let index_bits = self.params.index_bits();
        let offset_mask = (1u64 << offset_bits) - 1;
        let index_mask = if index_bits == 0 { 0 } else { (1u64 << index_bits) - 1 };
        let offset = (addr & offset_mask) as usize;
        let index = ((addr >> offset_bits) & index_mask) as usize;
        let tag = addr >> (offset_bits + index_bits);
        (tag, index, offset)
    }

    fn reconstruct_addr(&self, tag: u64, index: usize) -> u64 {
        let offset_bits = self.params.offset_bits();
        let index_bits = self.params.index_bits();
        (tag << (offset_bits + index_bits)) | ((index as u64) << offset_bits)
    }

    fn find_hit(&self, tag: u64, index: usize) -> Option<usize> {
        (0..self.params.associativity).find(|&way| {
            let entry = self.tags.read(way, index);
            entry.valid && entry.tag == tag
        })
    }

    fn dirty_bitmap_to_byte_mask(&self, dirty: u32) -> Vec<bool> {
        let dbw_bytes = self.dbw_bytes();
        let line_bytes = self.line_bytes();
        let mut mask = vec![false; line_bytes];
        for word in 0..self.params.words_per_line() as usize {
            if dirty & (1 << word) != 0 {
                for b in 0..dbw_bytes {
                    if word * dbw_bytes + b < line_bytes {
                        mask[word * dbw_bytes + b] = true;
                    }
                }
            }
        }
        mask
    }

    fn bytes_to_u128(bytes: &[u8]) -> u128 {
        let mut buf = [0u8; 16];
        buf[..bytes.len()].copy_from_slice(bytes);
        u128::from_le_bytes(buf)
    }

    fn u128_to_bytes(value: u128, len: usize) -> Vec<u8> {
        value.to_le_bytes()[..len].to_vec()
    }

    fn validate_precondition(req: &CacheReq) -> Result<()> {
        if req.req_type.is_amo() && req.len != 0 {
            return Err(CacheFault::InvalidAmoLength { len: req.len });
        }
        let width = if req.len == 0 { 4 } else { req.len as u64 };
        if !req.req_type.is_whole_cache() && req.addr % width != 0 {
            return Err(CacheFault::MisalignedAccess {
                addr: req.addr,
                len: req.len,
            });
        }
        Ok(())
    }

    fn build_evict_memreq(&self, way: usize, index: usize, entry: TagEntry) -> MemReq {
        let line = self.data.read(way, index).to_vec();
        let addr = self.reconstruct_addr(entry.tag, index);
        let byte_mask = self.dirty_bitmap_to_byte_mask(entry.dirty);
        let mut wr_mask = 0u32;
        for (i, &b) in byte_mask.iter().enumerate() {
            if b {
                wr_mask |= 1 << i;
            }
        }
        MemReq {
            req_type: ReqType::Write,
            opaque: 0,
            addr,
            len: line.len() as u16,
            data: Self::bytes_to_u128(&line),
            wr_mask,
        }
    }

    /// Advances the cache by one clock tick.
    ///
    /// # Errors
    ///
    /// Returns [`CacheFault`] if a request violates its alignment/length
    /// precondition, or if an internal invariant (MSHR double-alloc, opaque
    /// mismatch) is broken.
    pub fn tick(&mut self, inputs: TickInputs) -> Result<TickOutputs> {
        // CACHE_INIT: walk the tag array clearing every entry before
        // anything else happens.
        if let FrontEnd::Init(counter) = self.fsm {
            let (way, index) = self.tags.slot_to_way_index(counter);
            self.tags.write(way, index, TagEntry::default());
            let next = counter + 1;
            self.fsm = if next == self.tags.total_lines() {
                tick_event!("cache-init walk complete, {} lines cleared", next);
                FrontEnd::Ready
            } else {
                FrontEnd::Init(next)
            };
            return Ok(TickOutputs {
                cachereq_rdy: false,
                cacheresp: None,
                memreq: None,
            });
        }

        // A response or memreq left over from a prior tick because the
        // other side wasn't ready yet takes priority over generating new
        // traffic; both channels are independent single-entry buffers.
        if self.held_cacheresp.is_some() || self.held_memreq.is_some() {
            let cacheresp = if inputs.cacheresp_rdy {
                self.held_cacheresp.take()
            } else {
                self.held_cacheresp
            };
            let memreq = if inputs.memreq_rdy {
                self.held_memreq.take()
            } else {
                self.held_memreq
            };
            return Ok(TickOutputs {
                cachereq_rdy: false,
                cacheresp,
                memreq,
            });
        }

        let phase = std::mem::replace(&mut self.phase, Phase::Idle);
        tick_event!(?phase, "tick dispatch");
        let outputs = match phase {
            Phase::Idle => self.step_idle(inputs)?,
            Phase::PendingEvict {
                way,
                index,
                victim,
                follow,
            } => self.step_pending_evict(way, index, victim, follow, inputs.memreq_rdy)?,
            Phase::ReadyToFetch(follow) => self.step_ready_to_fetch(follow, inputs.memreq_rdy)?,
            Phase::AwaitingFill { expect_opaque, follow } => {
                self.step_awaiting_fill(expect_opaque, follow, inputs.memresp)?
            }
            Phase::Flushing { cursor, opaque } => self.step_flush(cursor, opaque, inputs.memreq_rdy)?,
        };

        if outputs.cachereq_rdy {
            self.stall_streak = 0;
        } else {
            self.stall_streak += 1;
            if self.stall_streak == STALL_WARN_THRESHOLD {
                tracing::warn!(
                    streak = self.stall_streak,
                    phase = ?self.phase,
                    "cache has not accepted a new request in an unusually long run of ticks"
                );
            }
        }

        // Anything the step produced that the other side can't accept this
        // tick is buffered for the next one instead of dropped.
        let cacheresp = if outputs.cacheresp.is_some() && !inputs.cacheresp_rdy {
            self.held_cacheresp = outputs.cacheresp;
            None
        } else {
            outputs.cacheresp
        };
        let memreq = if outputs.memreq.is_some() && !inputs.memreq_rdy {
            self.held_memreq = outputs.memreq;
            None
        } else {
            outputs.memreq
        };
        Ok(TickOutputs {
            cachereq_rdy: outputs.cachereq_rdy,
            cacheresp,
            memreq,
        })
    }

    fn step_idle(&mut self, inputs: TickInputs) -> Result<TickOutputs> {
        let Some(req) = inputs.cachereq else {
            return Ok(TickOutputs {
                cachereq_rdy: true,
                cacheresp: None,
                memreq: None,
            });
        };
        Self::validate_precondition(&req)?;

        match req.req_type {
            ReqType::Inv => {
                for slot in 0..self.tags.total_lines() {
                    let (way, index) = self.tags.slot_to_way_index(slot);
                    let entry = self.tags.read(way, index);
                    if entry.valid {
                        self.tags
                            .write(way, index, tag_update(entry, entry.tag, TagUpdateCmd::Invalidate));
                    }
                }
                Ok(TickOutputs {
                    cachereq_rdy: true,
                    cacheresp: Some(CacheResp {
                        req_type: ReqType::Inv,
                        opaque: req.opaque,
                        test: RespTest::Hit,
                        len: 0,
                        data: 0,
                    }),
                    memreq: None,
                })
            }
            ReqType::Flush => {
                self.phase = Phase::Flushing {
                    cursor: 0,
                    opaque: req.opaque,
                };
                Ok(TickOutputs {
                    cachereq_rdy: false,
                    cacheresp: None,
                    memreq: None,
                })
            }
            ReqType::WriteInit => {
                let (tag, index, offset) = self.decode_addr(req.addr);
                let dbw_bytes = self.dbw_bytes();
                let line_bytes = self.line_bytes();
                let word = (offset / dbw_bytes) as u32;
                // Reuse the resident way for a repeat init to the same
                // address, the same as a normal hit; only a genuinely new
                // address consults the replacement policy. Otherwise two
                // consecutive inits to the same address could land in
                // different ways (next_victim's answer changes once the
                // first init's `update` runs), leaving both valid with the
                // same tag.
                let (way, dirty) = if let Some(way) = self.find_hit(tag, index) {
                    self.policy.update(index, way, false);
                    let existing = self.tags.read(way, index);
                    (way, existing.dirty | (1 << word))
                } else {
                    let way = self.policy.next_victim(index);
                    self.policy.update(index, way, true);
                    (way, 1 << word)
                };
                self.tags.write(way, index, TagEntry { valid: true, dirty, tag });
                let repl = replicator::replicate(req.data, offset, req.len, dbw_bytes, line_bytes);
                let mask = replicator::byte_enable_mask(offset, req.len, dbw_bytes, line_bytes);
                self.data.write_masked(way, index, &repl, &mask);
                Ok(TickOutputs {
                    cachereq_rdy: true,
                    cacheresp: Some(CacheResp {
                        req_type: ReqType::WriteInit,
                        opaque: req.opaque,
                        test: RespTest::Hit,
                        len: req.len,
                        data: 0,
                    }),
                    memreq: None,
                })
            }
            ReqType::Read | ReqType::Write => self.dispatch_read_write(req),
            _ if req.req_type.is_amo() => self.dispatch_amo(req),
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

    fn dispatch_read_write(&mut self, req: CacheReq) -> Result<TickOutputs> {
        let (tag, index, offset) = self.decode_addr(req.addr);
        let dbw_bytes = self.dbw_bytes();
        let line_bytes = self.line_bytes();

        if let Some(way) = self.find_hit(tag, index) {
            self.policy.update(index, way, false);
            match req.req_type {
                ReqType::Read => {
                    let line = self.data.read(way, index);
                    let data = replicator::extract(line, offset, req.len, dbw_bytes);
                    Ok(TickOutputs {
                        cachereq_rdy: true,
                        cacheresp: Some(CacheResp {
                            req_type: req.req_type,
                            opaque: req.opaque,
                            test: RespTest::Hit,
                            len: req.len,
                            data,
                        }),
                        memreq: None,
                    })
                }
                _ => {
                    let repl = replicator::replicate(req.data, offset, req.len, dbw_bytes, line_bytes);
                    let mask = replicator::byte_enable_mask(offset, req.len, dbw_bytes, line_bytes);
                    self.data.write_masked(way, index, &repl, &mask);
                    let word = (offset / dbw_bytes) as u32;
                    let entry = self.tags.read(way, index);
                    self.tags
                        .write(way, index, tag_update(entry, entry.tag, TagUpdateCmd::WriteHit { word }));
                    Ok(TickOutputs {
                        cachereq_rdy: true,
                        cacheresp: Some(CacheResp {
                            req_type: req.req_type,
                            opaque: req.opaque,
                            test: RespTest::Hit,
                            len: req.len,
                            data: 0,
                        }),
                        memreq: None,
                    })
                }
            }
        } else {
            let way = self.policy.next_victim(index);
            let victim = self.tags.read(way, index);
            let follow = if req.req_type == ReqType::Read {
                Follow::Read { req, way, index, tag }
            } else {
                Follow::Write { req, way, index, tag }
            };
            if victim.valid && victim.is_dirty() {
                self.phase = Phase::PendingEvict { way, index, victim, follow };
            } else {
                self.phase = Phase::ReadyToFetch(follow);
            }
            Ok(TickOutputs {
                cachereq_rdy: false,
                cacheresp: None,
                memreq: None,
            })
        }
    }

    fn dispatch_amo(&mut self, req: CacheReq) -> Result<TickOutputs> {
        let (tag, index, _offset) = self.decode_addr(req.addr);
        let way_if_resident = self.find_hit(tag, index);
        let follow = Follow::Amo { req, way: way_if_resident.unwrap_or(0), index, tag };

        if let Some(way) = way_if_resident {
            let entry = self.tags.read(way, index);
            if entry.is_dirty() {
                self.phase = Phase::PendingEvict { way, index, victim: entry, follow };
            } else {
                self.tags
                    .write(way, index, tag_update(entry, entry.tag, TagUpdateCmd::Invalidate));
                self.phase = Phase::ReadyToFetch(follow);
            }
        } else {
            self.phase = Phase::ReadyToFetch(follow);
        }
        Ok(TickOutputs {
            cachereq_rdy: false,
            cacheresp: None,
            memreq: None,
        })
    }

    fn step_pending_evict(
        &mut self,
        way: usize,
        index: usize,
        victim: TagEntry,
        follow: Follow,
        memreq_rdy: bool,
    ) -> Result<TickOutputs> {
        if !memreq_rdy {
            self.phase = Phase::PendingEvict { way, index, victim, follow };
            return Ok(TickOutputs {
                cachereq_rdy: false,
                cacheresp: None,
                memreq: None,
            });
        }
        let memreq = self.build_evict_memreq(way, index, victim);
        // The evict memreq just discharged every dirty byte, so the slot
        // goes fully clean here rather than through `Invalidate`, which
        // only clears `valid` and would otherwise leave a stale dirty
        // bitmap behind for any follow-on that never rewrites this entry
        // (an AMO completion never touches the tag array).
        self.tags.write(
            way,
            index,
            TagEntry {
                valid: false,
                dirty: 0,
                tag: victim.tag,
            },
        );
        self.phase = Phase::ReadyToFetch(follow);
        Ok(TickOutputs {
            cachereq_rdy: false,
            cacheresp: None,
            memreq: Some(memreq),
        })
    }

    fn step_ready_to_fetch(&mut self, follow: Follow, memreq_rdy: bool) -> Result<TickOutputs> {
        if !memreq_rdy {
            self.phase = Phase::ReadyToFetch(follow);
            return Ok(TickOutputs {
                cachereq_rdy: false,
                cacheresp: None,
                memreq: None,
            });
        }
        let req = follow.req();
        let line_bytes = self.line_bytes() as u16;
        let memreq = match follow {
            Follow::Read { tag, index, .. } | Follow::Write { tag, index, .. } => MemReq {
                req_type: ReqType::Read,
                opaque: req.opaque,
                addr: self.reconstruct_addr(tag, index),
                len: line_bytes,
                data: 0,
                wr_mask: 0,
            },
            Follow::Amo { .. } => MemReq {
                req_type: req.req_type,
                opaque: req.opaque,
                addr: req.addr,
                len: self.dbw_bytes() as u16,
                data: u128::from(req.data as u32),
                wr_mask: 0,
            },
        };
        self.mshr.alloc(mshr::MshrEntry {
            req_type: req.req_type,
            opaque: req.opaque,
            addr: req.addr,
            len: req.len,
            data: req.data,
            repl_way: match follow {
                Follow::Read { way, .. } | Follow::Write { way, .. } | Follow::Amo { way, .. } => way,
            },
            evict_dirty: false,
            amo_hit: false,
        })?;
        self.phase = Phase::AwaitingFill {
            expect_opaque: req.opaque,
            follow,
        };
        Ok(TickOutputs {
            cachereq_rdy: false,
            cacheresp: None,
            memreq: Some(memreq),
        })
    }

    fn step_awaiting_fill(
        &mut self,
        expect_opaque: u32,
        follow: Follow,
        memresp: Option<MemResp>,
    ) -> Result<TickOutputs> {
        let Some(resp) = memresp else {
            self.phase = Phase::AwaitingFill { expect_opaque, follow };
            return Ok(TickOutputs {
                cachereq_rdy: false,
                cacheresp: None,
                memreq: None,
            });
        };
        if resp.opaque != expect_opaque {
            self.phase = Phase::AwaitingFill { expect_opaque, follow };
            return Err(CacheFault::OpaqueMismatch {
                expected: expect_opaque,
                got: resp.opaque,
            });
        }
        let _ = self.mshr.dealloc();
        let dbw_bytes = self.dbw_bytes();
        let line_bytes = self.line_bytes();

        match follow {
            Follow::Read { req, way, index, tag } => {
                self.tags
                    .write(way, index, tag_update(TagEntry::default(), tag, TagUpdateCmd::ReadRefill));
                let line = Self::u128_to_bytes(resp.data, line_bytes);
                let all_true = vec![true; line_bytes];
                self.data.write_masked(way, index, &line, &all_true);
                self.policy.update(index, way, true);
                let (_, _, offset) = self.decode_addr(req.addr);
                let data = replicator::extract(&line, offset, req.len, dbw_bytes);
                self.phase = Phase::Idle;
                Ok(TickOutputs {
                    cachereq_rdy: true,
                    cacheresp: Some(CacheResp {
                        req_type: req.req_type,
                        opaque: req.opaque,
                        test: RespTest::Miss,
                        len: req.len,
                        data,
                    }),
                    memreq: None,
                })
            }
            Follow::Write { req, way, index, tag } => {
                let (_, _, offset) = self.decode_addr(req.addr);
                let mut line = Self::u128_to_bytes(resp.data, line_bytes);
                let mask = replicator::byte_enable_mask(offset, req.len, dbw_bytes, line_bytes);
                let repl = replicator::replicate(req.data, offset, req.len, dbw_bytes, line_bytes);
                for i in 0..line_bytes {
                    if mask[i] {
                        line[i] = repl[i];
                    }
                }
                let word = (offset / dbw_bytes) as u32;
                self.tags
                    .write(way, index, tag_update(TagEntry::default(), tag, TagUpdateCmd::WriteRefill { word }));
                let all_true = vec![true; line_bytes];
                self.data.write_masked(way, index, &line, &all_true);
                self.policy.update(index, way, true);
                self.phase = Phase::Idle;
                Ok(TickOutputs {
                    cachereq_rdy: true,
                    cacheresp: Some(CacheResp {
                        req_type: req.req_type,
                        opaque: req.opaque,
                        test: RespTest::Miss,
                        len: req.len,
                        data: 0,
                    }),
                    memreq: None,
                })
            }
            Follow::Amo { req, .. } => {
                let mem_val = resp.data as u32;
                let reg_val = req.data as u32;
                let new_val = amo::atomic_alu(req.req_type, mem_val, reg_val);
                self.phase = Phase::Idle;
                // Fire-and-forget: no memresp is awaited for this write, so
                // the cache never holds a resident copy for an AMO address.
                let writeback = MemReq {
                    req_type: ReqType::Write,
                    opaque: req.opaque,
                    addr: req.addr,
                    len: self.dbw_bytes() as u16,
                    data: u128::from(new_val),
                    wr_mask: (1u32 << self.dbw_bytes()) - 1,
                };
                Ok(TickOutputs {
                    cachereq_rdy: true,
                    cacheresp: Some(CacheResp {
                        req_type: req.req_type,
                        opaque: req.opaque,
                        test: RespTest::AmoHit,
                        len: 0,
                        data: u64::from(mem_val),
                    }),
                    memreq: Some(writeback),
                })
            }
        }
    }

    fn step_flush(&mut self, cursor: usize, opaque: u32, memreq_rdy: bool) -> Result<TickOutputs> {
        let total = self.tags.total_lines();
        let mut idx = cursor;
        while idx < total {
            let (way, index) = self.tags.slot_to_way_index(idx);
            let entry = self.tags.read(way, index);
            if entry.dirty != 0 {
                if !memreq_rdy {
                    self.phase = Phase::Flushing { cursor: idx, opaque };
                    return Ok(TickOutputs {
                        cachereq_rdy: false,
                        cacheresp: None,
                        memreq: None,
                    });
                }
                let memreq = self.build_evict_memreq(way, index, entry);
                self.tags.write(way, index, TagEntry { dirty: 0, ..entry });
                self.phase = Phase::Flushing { cursor: idx + 1, opaque };
                return Ok(TickOutputs {
                    cachereq_rdy: false,
                    cacheresp: None,
                    memreq: Some(memreq),
                });
            }
            idx += 1;
        }
        self.phase = Phase::Idle;
        Ok(TickOutputs {
            cachereq_rdy: true,
            cacheresp: Some(CacheResp {
                req_type: ReqType::Flush,
                opaque,
                test: RespTest::Hit,
                len: 0,
                data: 0,
            }),
            memreq: None,
        })
    }
}
