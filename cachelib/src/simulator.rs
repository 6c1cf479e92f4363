use std::time::{Duration, Instant};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use crate::cache::{AccessOutcome, AccessType, Cache, CacheGeometry};
use crate::config::CacheConfig;
use crate::error::{ConfigurationError, TraceError};
use crate::stats::CacheStatistics;
use crate::trace::TraceReader;

/// The caches being simulated, fixed for the lifetime of the simulator
#[derive(Debug, Clone)]
enum Caches {
    Unified(Cache),
    Split { instruction: Cache, data: Cache },
}

/// The simulator routes accesses to the right cache and owns the statistics they produce.
///
/// It supports calling simulate multiple times, and will update the time taken to simulate and the
/// statistics accordingly. Statistics are only reset by creating a new simulator
pub struct Simulator {
    config: CacheConfig,
    caches: Caches,
    statistics: CacheStatistics,
    simulation_time: Duration,
}

/// The configuration and final statistics of a run. Can be serialised to JSON
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct SimulationReport {
    pub configuration: CacheConfig,
    pub statistics: CacheStatistics,
}

impl Simulator {

    /// Creates a new simulator with empty caches and zeroed statistics
    ///
    /// # Arguments
    ///
    /// * `config`: A cache configuration, usually from a [`crate::config::CacheConfigBuilder`] or
    /// from parsing JSON. It is validated again here
    ///
    /// returns: Result<Simulator, ConfigurationError>
    pub fn new(config: &CacheConfig) -> Result<Self, ConfigurationError> {
        let caches = match config.validate()? {
            (unified, None) => {
                log_geometry("unified", &unified);
                Caches::Unified(Cache::new(unified, config))
            }
            (instruction, Some(data)) => {
                log_geometry("instruction", &instruction);
                log_geometry("data", &data);
                Caches::Split {
                    instruction: Cache::new(instruction, config),
                    data: Cache::new(data, config),
                }
            }
        };
        Ok(Self {
            config: config.clone(),
            caches,
            statistics: CacheStatistics::default(),
            simulation_time: Duration::new(0, 0),
        })
    }

    /// Simulates a single reference
    ///
    /// In a unified cache every reference goes to the one cache, in split caches instruction loads
    /// go to the instruction cache and everything else to the data cache
    pub fn access(&mut self, address: u64, kind: AccessType) -> AccessOutcome {
        let cache = match &mut self.caches {
            Caches::Unified(cache) => cache,
            Caches::Split { instruction, .. } if kind.is_instruction() => instruction,
            Caches::Split { data, .. } => data,
        };
        cache.access(address, kind, &mut self.statistics)
    }

    /// Writes back and drops every resident line of every cache, returning how many lines were
    /// resident. Dirty lines are charged to the data copies back
    pub fn flush(&mut self) -> usize {
        let before = self.statistics.data.copies_back;
        let drained = match &mut self.caches {
            Caches::Unified(cache) => cache.flush(&mut self.statistics),
            Caches::Split { instruction, data } => {
                instruction.flush(&mut self.statistics) + data.flush(&mut self.statistics)
            }
        };
        info!("flushed {drained} lines, {} words copied back", self.statistics.data.copies_back - before);
        drained
    }

    /// Simulates every record of a trace held in memory
    ///
    /// Records are read strictly in order, so a memory mapped trace can be advised as sequential.
    /// Stops at the first malformed record, the records before it stay simulated
    ///
    /// # Arguments
    ///
    /// * `bytes`: The trace, one `<label> <hex address>` record per line
    ///
    /// returns: Result<&CacheStatistics, TraceError>
    pub fn simulate(&mut self, bytes: &[u8]) -> Result<&CacheStatistics, TraceError> {
        let start = Instant::now();
        for record in TraceReader::new(bytes) {
            let record = record?;
            self.access(record.address, record.kind);
        }
        let end = Instant::now();
        self.simulation_time += end - start;
        Ok(&self.statistics)
    }

    /// A snapshot of the statistics, valid at any point during a run
    pub fn get_statistics(&self) -> &CacheStatistics {
        &self.statistics
    }

    /// The configuration this simulator was created with
    pub fn describe_configuration(&self) -> &CacheConfig {
        &self.config
    }

    /// Gets the wall-clock execution time spent in [`Simulator::simulate`]
    pub fn get_execution_time(&self) -> &Duration {
        &self.simulation_time
    }

    /// The caches with a display name each, unified or instruction first
    pub fn caches(&self) -> Vec<(&'static str, &Cache)> {
        match &self.caches {
            Caches::Unified(cache) => vec![("unified", cache)],
            Caches::Split { instruction, data } => vec![("instruction", instruction), ("data", data)],
        }
    }

    /// Gets the number of resident lines for each cache
    pub fn get_occupancy_counts(&self) -> Vec<u64> {
        self.caches().iter().map(|(_, cache)| cache.occupancy() as u64).collect()
    }

    pub fn report(&self) -> SimulationReport {
        SimulationReport {
            configuration: self.config.clone(),
            statistics: self.statistics,
        }
    }
}

fn log_geometry(name: &str, geometry: &CacheGeometry) {
    debug!(
        "{name} cache: {} bytes, {} sets of {} x {} byte blocks, index mask {:#x}",
        geometry.size, geometry.num_sets, geometry.associativity, geometry.block_size, geometry.index_mask
    );
}
