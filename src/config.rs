//! Configuration for a cache instance.
//!
//! `CacheParams` is the construction-time parameter block: address/data/opaque
//! widths, cacheline width, total size, associativity, and the replacement
//! policy to use. It deserializes from JSON the same way the host simulator's
//! own hierarchical config does, with per-field defaults pulled from
//! [`defaults`].

use serde::Deserialize;

/// Default parameter values.
///
/// These match the worked boundary scenarios: a 32-byte, direct-mapped,
/// 128-bit-line cache over a 32-bit address/data bus.
mod defaults {
    /// Address bus width in bits.
    pub const ABW: u32 = 32;
    /// Data bus width in bits.
    pub const DBW: u32 = 32;
    /// Opaque id width in bits.
    pub const OBW: u32 = 8;
    /// Cacheline width in bits.
    pub const CLW: u32 = 128;
    /// Total cache capacity in bytes.
    pub const SIZE_BYTES: usize = 32;
    /// Associativity (number of ways).
    pub const ASSOCIATIVITY: usize = 1;
}

/// Replacement policy selector.
///
/// Mirrors the host simulator's own `ReplacementPolicy` config enum, trimmed
/// to the algorithms this cache actually implements (see
/// [`crate::cache::policies`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReplacementPolicy {
    /// No replacement state; only sound when associativity is 1.
    #[default]
    None,
    /// Single-bit pseudo-LRU, exact for associativity 2, approximate beyond
    /// that (see [`crate::cache::policies::plru`]).
    #[serde(alias = "plru")]
    Plru,
    /// True least-recently-used via a per-index recency stack.
    #[serde(alias = "lru")]
    Lru,
    /// First-in-first-out; hits do not change insertion order.
    #[serde(alias = "fifo")]
    Fifo,
    /// Evict the most-recently-used way.
    #[serde(alias = "mru")]
    Mru,
}

/// Construction-time parameters for a [`crate::cache::Cache`].
///
/// # Examples
///
/// ```
/// use blocking_cache::config::CacheParams;
///
/// let params = CacheParams::default();
/// assert_eq!(params.clw, 128);
/// assert_eq!(params.associativity, 1);
/// ```
///
/// ```
/// use blocking_cache::config::CacheParams;
///
/// let json = r#"{"size_bytes": 64, "associativity": 2, "policy": "plru"}"#;
/// let params: CacheParams = serde_json::from_str(json).unwrap();
/// assert_eq!(params.size_bytes, 64);
/// assert_eq!(params.associativity, 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CacheParams {
    /// Address bus width in bits.
    #[serde(default = "CacheParams::default_abw")]
    pub abw: u32,
    /// Data bus width in bits.
    #[serde(default = "CacheParams::default_dbw")]
    pub dbw: u32,
    /// Opaque id width in bits.
    #[serde(default = "CacheParams::default_obw")]
    pub obw: u32,
    /// Cacheline width in bits.
    #[serde(default = "CacheParams::default_clw")]
    pub clw: u32,
    /// Total cache capacity in bytes.
    #[serde(default = "CacheParams::default_size_bytes")]
    pub size_bytes: usize,
    /// Associativity (number of ways); must be 1 or a power of two.
    #[serde(default = "CacheParams::default_associativity")]
    pub associativity: usize,
    /// Replacement policy to install.
    #[serde(default)]
    pub policy: ReplacementPolicy,
}

impl CacheParams {
    fn default_abw() -> u32 {
        defaults::ABW
    }

    fn default_dbw() -> u32 {
        defaults::DBW
    }

    fn default_obw() -> u32 {
        defaults::OBW
    }

    fn default_clw() -> u32 {
        defaults::CLW
    }

    fn default_size_bytes() -> usize {
        defaults::SIZE_BYTES
    }

    fn default_associativity() -> usize {
        defaults::ASSOCIATIVITY
    }

    /// Cacheline width in bytes.
    #[must_use]
    pub const fn line_bytes(&self) -> usize {
        (self.clw / 8) as usize
    }

    /// Number of `{way, index}` lines per way.
    #[must_use]
    pub fn lines_per_way(&self) -> usize {
        self.size_bytes / self.associativity / self.line_bytes()
    }

    /// Number of offset bits (`log2(line_bytes)`).
    #[must_use]
    pub fn offset_bits(&self) -> u32 {
        self.line_bytes().trailing_zeros()
    }

    /// Number of index bits (`log2(lines_per_way)`).
    #[must_use]
    pub fn index_bits(&self) -> u32 {
        self.lines_per_way().trailing_zeros()
    }

    /// Number of tag bits (`abw - index_bits - offset_bits`).
    #[must_use]
    pub fn tag_bits(&self) -> u32 {
        self.abw - self.index_bits() - self.offset_bits()
    }

    /// Number of per-word dirty bits per line (`clw / dbw`).
    #[must_use]
    pub const fn words_per_line(&self) -> u32 {
        self.clw / self.dbw
    }
}

impl Default for CacheParams {
    fn default() -> Self {
        Self {
            abw: defaults::ABW,
            dbw: defaults::DBW,
            obw: defaults::OBW,
            clw: defaults::CLW,
            size_bytes: defaults::SIZE_BYTES,
            associativity: defaults::ASSOCIATIVITY,
            policy: ReplacementPolicy::default(),
        }
    }
}
