use log::trace;
use crate::config::{AllocationPolicy, CacheConfig, WritePolicy};
use crate::error::ConfigurationError;
use crate::lru::{CacheLine, Set};
use crate::stats::CacheStatistics;

/// The kind of memory reference in a trace
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum AccessType {
    InstructionLoad,
    DataLoad,
    DataStore,
}

impl AccessType {
    pub fn is_store(&self) -> bool {
        matches!(self, AccessType::DataStore)
    }

    pub fn is_instruction(&self) -> bool {
        matches!(self, AccessType::InstructionLoad)
    }
}

/// An address split into the fields used to locate a line
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct AddressParts {
    pub tag: u64,
    pub index: u64,
    /// Byte within the block. Not used by the model, there is no sub-block simulation
    pub offset: u64,
}

/// What a single access did to the cache it was routed to
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AccessOutcome {
    Hit,
    /// The block was fetched into the cache, replacing `evicted` if the set was full
    Miss { evicted: Option<CacheLine> },
    /// A store miss under no write allocate, the cache was left untouched
    Bypass,
}

impl AccessOutcome {
    pub fn is_hit(&self) -> bool {
        matches!(self, AccessOutcome::Hit)
    }
}

/// The derived shape of a single cache
///
/// The set selection mask and shifts are computed once here, decomposing an address is then two
/// masks and two shifts
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct CacheGeometry {
    pub size: u64,
    pub block_size: u64,
    pub associativity: u64,
    pub num_sets: u64,
    /// log2 of the block size, the shift which brings the index bits down to bit 0
    pub index_mask_offset: u32,
    pub index_bits: u32,
    /// Selects the index bits of an address, still in place
    pub index_mask: u64,
}

impl CacheGeometry {
    /// Derives the geometry of a cache, failing unless the block size, associativity and resulting
    /// number of sets are all powers of two
    ///
    /// # Arguments
    ///
    /// * `name`: Which size is being checked, used in error messages
    /// * `size`: Total cache capacity in bytes
    /// * `block_size`: Line size in bytes
    /// * `associativity`: Lines per set
    ///
    /// returns: Result<CacheGeometry, ConfigurationError>
    pub fn new(name: &'static str, size: u64, block_size: u64, associativity: u64) -> Result<Self, ConfigurationError> {
        if !block_size.is_power_of_two() {
            return Err(ConfigurationError::NotPowerOfTwo { name: "block size", value: block_size });
        }
        if !associativity.is_power_of_two() {
            return Err(ConfigurationError::NotPowerOfTwo { name: "associativity", value: associativity });
        }
        let invalid = || ConfigurationError::InvalidSetCount { name, size, associativity, block_size };
        let set_bytes = associativity.checked_mul(block_size).ok_or_else(invalid)?;
        if size == 0 || size % set_bytes != 0 {
            return Err(invalid());
        }
        let num_sets = size / set_bytes;
        if !num_sets.is_power_of_two() {
            return Err(ConfigurationError::NotPowerOfTwo { name: "number of sets", value: num_sets });
        }
        let index_mask_offset = block_size.trailing_zeros();
        Ok(Self {
            size,
            block_size,
            associativity,
            num_sets,
            index_mask_offset,
            index_bits: num_sets.trailing_zeros(),
            index_mask: (num_sets - 1) << index_mask_offset,
        })
    }

    pub fn decompose(&self, address: u64) -> AddressParts {
        AddressParts {
            // The shift reaches 64 only for a single set spanning the whole address space
            tag: address.checked_shr(self.index_mask_offset + self.index_bits).unwrap_or(0),
            index: (address & self.index_mask) >> self.index_mask_offset,
            offset: address & (self.block_size - 1),
        }
    }
}

/// A single set associative cache with LRU replacement
///
/// Direct mapped and fully associative caches are the associativity 1 and single set cases, no
/// separate implementation is needed
///
/// The cache owns its sets and their lines, but not its statistics. Every access is given the
/// simulator's statistics, so that unified and split caches share one access routine and only
/// differ in which cache an access is routed to
#[derive(Debug, Clone)]
pub struct Cache {
    geometry: CacheGeometry,
    write_policy: WritePolicy,
    allocation_policy: AllocationPolicy,
    words_per_block: u64,
    sets: Vec<Set>,
}

impl Cache {
    pub fn new(geometry: CacheGeometry, config: &CacheConfig) -> Self {
        Self {
            geometry,
            write_policy: config.write_policy,
            allocation_policy: config.allocation_policy,
            words_per_block: config.words_per_block(),
            sets: (0..geometry.num_sets).map(|_| Set::new(geometry.associativity as usize)).collect(),
        }
    }

    pub fn geometry(&self) -> &CacheGeometry {
        &self.geometry
    }

    /// Performs a single access, updating the recency order, the resident lines and `stats`
    ///
    /// Accesses, misses, replacements and demand fetches are charged to the bucket of the access
    /// type. Copies back are always charged to the data bucket, only stores and dirty victims
    /// generate them
    ///
    /// # Arguments
    ///
    /// * `address`: The referenced byte address
    /// * `kind`: Instruction load, data load or data store
    /// * `stats`: Both statistics buckets of the owning simulator
    ///
    /// returns: AccessOutcome
    pub fn access(&mut self, address: u64, kind: AccessType, stats: &mut CacheStatistics) -> AccessOutcome {
        let write_back = self.write_policy == WritePolicy::WriteBack;
        let words = self.words_per_block;
        let AddressParts { tag, index, .. } = self.geometry.decompose(address);
        stats.bucket_mut(kind).accesses += 1;

        let set = &mut self.sets[index as usize];
        if let Some(slot) = set.find(tag) {
            if kind.is_store() {
                if write_back {
                    set.line_mut(slot).dirty = true;
                } else {
                    stats.data.copies_back += 1;
                }
            }
            set.move_to_front(slot);
            return AccessOutcome::Hit;
        }

        stats.bucket_mut(kind).misses += 1;
        if kind.is_store() && self.allocation_policy == AllocationPolicy::NoWriteAllocate {
            stats.data.copies_back += if write_back { words } else { 1 };
            return AccessOutcome::Bypass;
        }

        stats.bucket_mut(kind).demand_fetches += words;
        if kind.is_store() && !write_back {
            stats.data.copies_back += 1;
        }

        let evicted = if set.is_full() { set.evict() } else { None };
        if let Some(victim) = evicted {
            trace!("set {index}: evicted tag {:#x} (dirty: {}) for tag {tag:#x}", victim.tag, victim.dirty);
            if victim.dirty && write_back {
                stats.data.copies_back += words;
            }
            stats.bucket_mut(kind).replacements += 1;
        }

        let line = CacheLine { tag, dirty: kind.is_store() && write_back };
        if let Err(violation) = set.insert(line) {
            panic!("cache set {index} is corrupt: {violation}");
        }
        AccessOutcome::Miss { evicted }
    }

    /// Empties every set, charging each dirty line to the data copies back under write back
    ///
    /// The geometry is kept, so the cache can be reused straight away. Returns the number of lines
    /// that were resident
    pub fn flush(&mut self, stats: &mut CacheStatistics) -> usize {
        let write_back = self.write_policy == WritePolicy::WriteBack;
        let mut drained = 0;
        for set in &mut self.sets {
            for line in set.drain() {
                if line.dirty && write_back {
                    stats.data.copies_back += self.words_per_block;
                }
                drained += 1;
            }
        }
        drained
    }

    /// Total number of resident lines
    pub fn occupancy(&self) -> usize {
        self.sets.iter().map(Set::len).sum()
    }

    pub fn set_occupancy(&self, index: u64) -> usize {
        self.sets[index as usize].len()
    }

    /// Tags resident in a set, most recently used first
    pub fn resident_tags(&self, index: u64) -> Vec<u64> {
        self.sets[index as usize].iter().map(|line| line.tag).collect()
    }

    pub fn dirty_lines(&self) -> usize {
        self.sets.iter().flat_map(Set::iter).filter(|line| line.dirty).count()
    }
}
