//! Sixteen-line fully-associative cache between the CPU and memory.
//!
//! Policy: write-through, write-allocate, FIFO replacement. The cache owns
//! its lines and fill queue; memory is borrowed per call so there is no
//! back-reference from cache to CPU.

use std::collections::VecDeque;
use std::fmt::Write as _;

use tracing::{event, Level};

use crate::{MachineFault, Memory};

/// Number of cache lines.
pub const CACHE_LINES: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct CacheLine {
    valid: bool,
    tag: u16,
    data: u16,
}

/// Read-only view of one cache line for operator displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct CacheLineView {
    /// Line index `0..16`.
    pub index: usize,
    /// Whether the line holds a word.
    pub valid: bool,
    /// Memory address cached by this line (meaningless when invalid).
    pub tag: u16,
    /// Cached word (meaningless when invalid).
    pub data: u16,
}

/// Ways the cache can disagree with memory or with its own fill queue.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CacheInvariantError {
    /// A valid line's data differs from memory at its tag.
    #[error("line {line} caches {tag:o} as {cached:o} but memory holds {actual:o}")]
    StaleLine {
        /// Line index.
        line: usize,
        /// Cached address.
        tag: u16,
        /// Word held by the line.
        cached: u16,
        /// Word held by memory.
        actual: u16,
    },
    /// Two valid lines share a tag.
    #[error("address {tag:o} cached by more than one line")]
    DuplicateTag {
        /// Duplicated address.
        tag: u16,
    },
    /// Fill queue does not list exactly the valid lines.
    #[error("fill queue {queue:?} does not match valid lines {valid:?}")]
    QueueMismatch {
        /// Queue contents in order.
        queue: Vec<usize>,
        /// Indices of valid lines.
        valid: Vec<usize>,
    },
}

/// Write-through, write-allocate, FIFO-evicting cache.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cache {
    lines: [CacheLine; CACHE_LINES],
    fifo: VecDeque<usize>,
}

impl Cache {
    /// Invalidates every line and empties the fill queue.
    pub fn reset(&mut self) {
        self.lines = [CacheLine::default(); CACHE_LINES];
        self.fifo.clear();
    }

    /// Reads `addr`, filling a line from memory on a miss.
    ///
    /// # Errors
    ///
    /// Returns [`MachineFault::IllegalMemoryAddress`] when a miss targets an
    /// address outside memory. The cache is unchanged in that case.
    pub fn read(&mut self, memory: &Memory, addr: u16) -> Result<u16, MachineFault> {
        if let Some(line) = self.lookup(addr) {
            event!(Level::TRACE, addr = addr, line = line, "cache hit");
            return Ok(self.lines[line].data);
        }
        let data = memory.read(addr)?;
        event!(Level::TRACE, addr = addr, "cache miss");
        self.install(addr, data);
        Ok(data)
    }

    /// Writes `value` through to memory and allocates or refreshes a line.
    ///
    /// # Errors
    ///
    /// Returns [`MachineFault::IllegalMemoryAddress`] when `addr` is outside
    /// memory. Neither memory nor the cache changes in that case.
    pub fn write(&mut self, memory: &mut Memory, addr: u16, value: u16) -> Result<(), MachineFault> {
        memory.write(addr, value)?;
        if let Some(line) = self.lookup(addr) {
            self.lines[line].data = value;
        } else {
            self.install(addr, value);
        }
        Ok(())
    }

    /// Refreshes a cached copy of `addr` in place without allocating.
    ///
    /// Used by operator deposits that bypass the CPU path.
    pub fn refresh(&mut self, addr: u16, value: u16) {
        if let Some(line) = self.lookup(addr) {
            self.lines[line].data = value;
        }
    }

    /// Returns the line index holding `addr`, if any.
    #[must_use]
    pub fn lookup(&self, addr: u16) -> Option<usize> {
        self.lines
            .iter()
            .position(|line| line.valid && line.tag == addr)
    }

    fn install(&mut self, addr: u16, data: u16) {
        let index = match self.lines.iter().position(|line| !line.valid) {
            Some(free) => free,
            None => {
                // A full cache always has a queue head: every valid line is queued.
                let Some(victim) = self.fifo.pop_front() else {
                    return;
                };
                event!(
                    Level::DEBUG,
                    line = victim,
                    evicted = self.lines[victim].tag,
                    installed = addr,
                    "cache eviction"
                );
                victim
            }
        };
        self.lines[index] = CacheLine {
            valid: true,
            tag: addr,
            data,
        };
        self.fifo.push_back(index);
    }

    /// Snapshot of all lines in index order.
    #[must_use]
    pub fn view(&self) -> [CacheLineView; CACHE_LINES] {
        let mut out = [CacheLineView::default(); CACHE_LINES];
        for (index, (slot, line)) in out.iter_mut().zip(self.lines.iter()).enumerate() {
            *slot = CacheLineView {
                index,
                valid: line.valid,
                tag: line.tag,
                data: line.data,
            };
        }
        out
    }

    /// Line indices in fill order, oldest first.
    #[must_use]
    pub fn fill_order(&self) -> Vec<usize> {
        self.fifo.iter().copied().collect()
    }

    /// Number of valid lines.
    #[must_use]
    pub fn occupied(&self) -> usize {
        self.fifo.len()
    }

    /// Renders one text row per line for the operator's cache pane.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (index, line) in self.lines.iter().enumerate() {
            if line.valid {
                let _ = writeln!(out, "L{index}: [M: {:04o}, V: {:06o}]", line.tag, line.data);
            } else {
                let _ = writeln!(out, "L{index}: [Invalid]");
            }
        }
        out
    }

    /// Checks write-through coherence, tag uniqueness and queue consistency.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn check_invariants(&self, memory: &Memory) -> Result<(), CacheInvariantError> {
        let mut valid = Vec::new();
        for (index, line) in self.lines.iter().enumerate() {
            if !line.valid {
                continue;
            }
            let actual = memory.read(line.tag).unwrap_or(!line.data);
            if actual != line.data {
                return Err(CacheInvariantError::StaleLine {
                    line: index,
                    tag: line.tag,
                    cached: line.data,
                    actual,
                });
            }
            if self.lines[..index]
                .iter()
                .any(|other| other.valid && other.tag == line.tag)
            {
                return Err(CacheInvariantError::DuplicateTag { tag: line.tag });
            }
            valid.push(index);
        }

        let mut queue = self.fill_order();
        let in_order = queue.clone();
        queue.sort_unstable();
        let has_duplicates = queue.windows(2).any(|pair| pair[0] == pair[1]);
        if has_duplicates || queue != valid {
            return Err(CacheInvariantError::QueueMismatch {
                queue: in_order,
                valid,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Cache, CACHE_LINES};
    use crate::{MachineFault, Memory};
    use proptest::prelude::*;

    fn memory_with(values: &[(u16, u16)]) -> Memory {
        let mut memory = Memory::default();
        for &(addr, value) in values {
            memory.write(addr, value).expect("test address in range");
        }
        memory
    }

    #[test]
    fn miss_installs_and_hit_reuses_line() {
        let memory = memory_with(&[(100, 0o1234)]);
        let mut cache = Cache::default();

        assert_eq!(cache.read(&memory, 100), Ok(0o1234));
        assert_eq!(cache.occupied(), 1);
        assert_eq!(cache.lookup(100), Some(0));

        assert_eq!(cache.read(&memory, 100), Ok(0o1234));
        assert_eq!(cache.occupied(), 1);
        assert_eq!(cache.fill_order(), vec![0]);
    }

    #[test]
    fn seventeenth_distinct_read_evicts_the_oldest_line() {
        let memory = Memory::default();
        let mut cache = Cache::default();

        for addr in 0..=16u16 {
            cache.read(&memory, addr).expect("in range");
        }

        let mut tags: Vec<u16> = cache
            .view()
            .iter()
            .filter(|line| line.valid)
            .map(|line| line.tag)
            .collect();
        tags.sort_unstable();
        assert_eq!(tags, (1..=16).collect::<Vec<_>>());
        // Line 0 held tag 0 and was recycled, so it is now the newest fill.
        assert_eq!(cache.fill_order().last(), Some(&0));
    }

    #[test]
    fn write_hits_update_in_place_without_queue_movement() {
        let mut memory = Memory::default();
        let mut cache = Cache::default();
        cache.read(&memory, 5).expect("in range");
        cache.read(&memory, 6).expect("in range");

        cache.write(&mut memory, 5, 77).expect("in range");

        assert_eq!(memory.read(5), Ok(77));
        assert_eq!(cache.fill_order(), vec![0, 1]);
        assert_eq!(cache.view()[0].data, 77);
    }

    #[test]
    fn write_miss_allocates_a_line() {
        let mut memory = Memory::default();
        let mut cache = Cache::default();

        cache.write(&mut memory, 300, 9).expect("in range");

        assert_eq!(memory.read(300), Ok(9));
        assert_eq!(cache.lookup(300), Some(0));
    }

    #[test]
    fn illegal_addresses_leave_cache_untouched() {
        let mut memory = Memory::default();
        let mut cache = Cache::default();

        assert_eq!(
            cache.read(&memory, 2048),
            Err(MachineFault::IllegalMemoryAddress)
        );
        assert_eq!(
            cache.write(&mut memory, 4000, 1),
            Err(MachineFault::IllegalMemoryAddress)
        );
        assert_eq!(cache.occupied(), 0);
    }

    #[test]
    fn reset_invalidates_everything() {
        let memory = Memory::default();
        let mut cache = Cache::default();
        for addr in 0..20u16 {
            cache.read(&memory, addr).expect("in range");
        }
        cache.reset();
        assert_eq!(cache.occupied(), 0);
        assert!(cache.view().iter().all(|line| !line.valid));
    }

    #[test]
    fn render_lists_every_line() {
        let memory = memory_with(&[(8, 42)]);
        let mut cache = Cache::default();
        cache.read(&memory, 8).expect("in range");

        let text = cache.render();
        let rows: Vec<&str> = text.lines().collect();
        assert_eq!(rows.len(), CACHE_LINES);
        assert_eq!(rows[0], "L0: [M: 0010, V: 000052]");
        assert_eq!(rows[1], "L1: [Invalid]");
    }

    #[derive(Debug, Clone)]
    enum Access {
        Read(u16),
        Write(u16, u16),
    }

    fn access() -> impl Strategy<Value = Access> {
        prop_oneof![
            (0u16..40).prop_map(Access::Read),
            (0u16..40, any::<u16>()).prop_map(|(addr, value)| Access::Write(addr, value)),
        ]
    }

    proptest! {
        #[test]
        fn invariants_hold_after_any_access_trace(trace in proptest::collection::vec(access(), 0..200)) {
            let mut memory = Memory::default();
            let mut cache = Cache::default();
            for step in trace {
                match step {
                    Access::Read(addr) => {
                        let expected = memory.read(addr).expect("in range");
                        prop_assert_eq!(cache.read(&memory, addr), Ok(expected));
                    }
                    Access::Write(addr, value) => {
                        cache.write(&mut memory, addr, value).expect("in range");
                        prop_assert_eq!(cache.read(&memory, addr), Ok(value));
                    }
                }
                prop_assert!(cache.check_invariants(&memory).is_ok());
                prop_assert!(cache.occupied() <= CACHE_LINES);
            }
        }
    }
}
