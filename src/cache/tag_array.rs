//! Tag array: `{valid, dirty-bitmap, tag}` per `{way, index}`.

use crate::config::CacheParams;

/// One tag-array entry.
///
/// `dirty` is a bitmap with one bit per `dbw`-sized word in the line
/// (`words_per_line` bits used, rest always zero). `dirty[i] == 1` means word
/// `i` has been written since the line was last refilled from memory.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TagEntry {
    /// Line currently holds a resident, coherent copy of `tag`'s data.
    pub valid: bool,
    /// Per-word dirty bitmap.
    pub dirty: u32,
    /// Upper address bits identifying which line is resident.
    pub tag: u64,
}

impl TagEntry {
    /// True if any word in the line has been modified since refill.
    #[must_use]
    pub const fn is_dirty(self) -> bool {
        self.dirty != 0
    }

    /// An *inval-hit*: the line was invalidated (valid cleared) while dirty
    /// words remained, and its tag still matches. FLUSH must still surface
    /// these, since INV never writes back.
    #[must_use]
    pub fn is_inval_hit(self, tag: u64) -> bool {
        !self.valid && self.dirty != 0 && self.tag == tag
    }
}

/// The command driving [`TagArray::update`], mirroring the update-unit
/// command set: refill-after-write, refill-after-read, hit-on-clean-word,
/// clear, and invalidate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TagUpdateCmd {
    /// A write missed; the line is now resident with exactly the written
    /// word marked dirty (plus whatever was already dirty in `refill_dty`,
    /// which is always 0 for a fresh refill but may carry bits forward for
    /// a replayed write).
    WriteRefill {
        /// Index of the `dbw`-wide word touched by the replayed write.
        word: u32,
    },
    /// A read missed; the line becomes resident and clean.
    ReadRefill,
    /// A write hit a clean word; mark it dirty, leave everything else.
    WriteHit {
        /// Index of the `dbw`-wide word touched.
        word: u32,
    },
    /// Clear the entry entirely (used by cache-init).
    Clear,
    /// Invalidate: clear `valid`, leave `dirty` and `tag` untouched.
    Invalidate,
}

/// Computes the next [`TagEntry`] from the current one and a command.
///
/// Kept as a standalone pure function, mirroring the original design's
/// dedicated tag-update unit, rather than inlined into the pipeline's M1
/// stage logic.
#[must_use]
pub fn tag_update(old: TagEntry, new_tag: u64, cmd: TagUpdateCmd) -> TagEntry {
    match cmd {
        TagUpdateCmd::WriteRefill { word } => TagEntry {
            valid: true,
            dirty: 1 << word,
            tag: new_tag,
        },
        TagUpdateCmd::ReadRefill => TagEntry {
            valid: true,
            dirty: 0,
            tag: new_tag,
        },
        TagUpdateCmd::WriteHit { word } => TagEntry {
            dirty: old.dirty | (1 << word),
            ..old
        },
        TagUpdateCmd::Clear => TagEntry::default(),
        TagUpdateCmd::Invalidate => TagEntry {
            valid: false,
            ..old
        },
    }
}

/// The `{way}[{index}]` tag store.
#[derive(Debug, Clone)]
pub struct TagArray {
    ways: usize,
    lines_per_way: usize,
    entries: Vec<TagEntry>,
}

impl TagArray {
    /// Builds a tag array sized for `params`, with every entry cleared.
    #[must_use]
    pub fn new(params: &CacheParams) -> Self {
        let ways = params.associativity;
        let lines_per_way = params.lines_per_way();
        Self {
            ways,
            lines_per_way,
            entries: vec![TagEntry::default(); ways * lines_per_way],
        }
    }

    fn slot(&self, way: usize, index: usize) -> usize {
        way * self.lines_per_way + index
    }

    /// Reads the entry at `{way, index}`.
    #[must_use]
    pub fn read(&self, way: usize, index: usize) -> TagEntry {
        self.entries[self.slot(way, index)]
    }

    /// Reads all ways at `index`, most useful for the parallel tag compare
    /// in M1.
    #[must_use]
    pub fn read_set(&self, index: usize) -> Vec<TagEntry> {
        (0..self.ways).map(|way| self.read(way, index)).collect()
    }

    /// Writes the entry at `{way, index}`.
    pub fn write(&mut self, way: usize, index: usize, entry: TagEntry) {
        let slot = self.slot(way, index);
        self.entries[slot] = entry;
    }

    /// Total number of `{way, index}` slots, used to drive the cache-init
    /// walk.
    #[must_use]
    pub const fn total_lines(&self) -> usize {
        self.ways * self.lines_per_way
    }

    /// Maps a linear init-counter value to `{way, index}`.
    #[must_use]
    pub const fn slot_to_way_index(&self, slot: usize) -> (usize, usize) {
        (slot / self.lines_per_way, slot % self.lines_per_way)
    }
}
