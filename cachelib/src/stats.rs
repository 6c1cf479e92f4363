use std::fmt::{Display, Formatter};
use serde::{Deserialize, Serialize};
use crate::cache::AccessType;

/// Counters for one stream of references. Traffic is counted in words
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub accesses: u64,
    pub misses: u64,
    /// Misses which had to evict a resident line
    pub replacements: u64,
    /// Words fetched from memory to service misses
    pub demand_fetches: u64,
    /// Words written from the cache, or by stores, back to memory
    pub copies_back: u64,
}

impl Statistics {
    pub fn hits(&self) -> u64 {
        self.accesses - self.misses
    }

    /// Miss rate, or `None` before the first access
    pub fn miss_rate(&self) -> Option<f64> {
        (self.accesses > 0).then(|| self.misses as f64 / self.accesses as f64)
    }

    pub fn hit_rate(&self) -> Option<f64> {
        self.miss_rate().map(|rate| 1.0 - rate)
    }
}

/// The instruction and data statistics of a simulation
///
/// Both buckets exist whether the caches are unified or split, in a unified cache the bucket only
/// records which kind of reference caused the event
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct CacheStatistics {
    pub instruction: Statistics,
    pub data: Statistics,
}

impl CacheStatistics {
    pub fn bucket(&self, kind: AccessType) -> &Statistics {
        if kind.is_instruction() {
            &self.instruction
        } else {
            &self.data
        }
    }

    pub fn bucket_mut(&mut self, kind: AccessType) -> &mut Statistics {
        if kind.is_instruction() {
            &mut self.instruction
        } else {
            &mut self.data
        }
    }

    /// Words fetched from memory by both streams
    pub fn total_demand_fetches(&self) -> u64 {
        self.instruction.demand_fetches + self.data.demand_fetches
    }

    /// Words written to memory by both streams
    pub fn total_copies_back(&self) -> u64 {
        self.instruction.copies_back + self.data.copies_back
    }
}

fn fmt_bucket(f: &mut Formatter<'_>, title: &str, stats: &Statistics) -> std::fmt::Result {
    writeln!(f, " {title}")?;
    writeln!(f, "  accesses:  {}", stats.accesses)?;
    writeln!(f, "  misses:    {}", stats.misses)?;
    match (stats.miss_rate(), stats.hit_rate()) {
        (Some(miss), Some(hit)) => writeln!(f, "  miss rate: {miss:.4} (hit rate {hit:.4})")?,
        _ => writeln!(f, "  miss rate: 0 (0)")?,
    }
    writeln!(f, "  replace:   {}", stats.replacements)
}

impl Display for CacheStatistics {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "*** CACHE STATISTICS ***")?;
        fmt_bucket(f, "INSTRUCTIONS", &self.instruction)?;
        fmt_bucket(f, "DATA", &self.data)?;
        writeln!(f, " TRAFFIC (in words)")?;
        writeln!(f, "  demand fetch:  {}", self.total_demand_fetches())?;
        write!(f, "  copies back:   {}", self.total_copies_back())
    }
}
