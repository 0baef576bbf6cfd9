//! Pluggable replacement policies.
//!
//! The pipeline controller only ever calls [`ReplacementPolicy::next_victim`]
//! and [`ReplacementPolicy::update`]; it never branches on which concrete
//! policy is installed.

mod fifo;
mod lru;
mod mru;
mod none;
mod plru;

pub use fifo::FifoPolicy;
pub use lru::LruPolicy;
pub use mru::MruPolicy;
pub use none::NonePolicy;
pub use plru::PlruPolicy;

use crate::config::ReplacementPolicy as PolicyKind;

/// Capability a replacement policy must provide.
pub trait ReplacementPolicy: std::fmt::Debug {
    /// Selects the way to evict at `index` on a miss.
    fn next_victim(&mut self, index: usize) -> usize;

    /// Records that `way` at `index` was just accessed. `is_install` is
    /// true when this access just installed a fresh line (a miss refill),
    /// false for a hit; FIFO uses this to ignore hits entirely.
    fn update(&mut self, index: usize, way: usize, is_install: bool);
}

/// Builds the policy named by `kind`, sized for `ways` ways and
/// `lines_per_way` indices.
#[must_use]
pub fn build(kind: PolicyKind, ways: usize, lines_per_way: usize) -> Box<dyn ReplacementPolicy + Send + Sync> {
    match kind {
        PolicyKind::None => Box::new(NonePolicy::new()),
        PolicyKind::Plru => Box::new(PlruPolicy::new(ways, lines_per_way)),
        PolicyKind::Lru => Box::new(LruPolicy::new(ways, lines_per_way)),
        PolicyKind::Fifo => Box::new(FifoPolicy::new(ways, lines_per_way)),
        PolicyKind::Mru => Box::new(MruPolicy::new(ways, lines_per_way)),
    }
}
