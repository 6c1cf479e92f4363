//! # CacheLib
//!
//! Cachelib is a library for trace driven cache simulation
//!
//! It replays a stream of instruction loads, data loads and data stores against a unified or split
//! set associative cache with LRU replacement, under any combination of write back or write through
//! and write allocate or no write allocate, and counts the resulting misses and memory traffic
//!
//! Configure with [`config::CacheConfigBuilder`], then drive the [`simulator::Simulator`] one
//! access at a time or with a whole trace

/// Contains the cache implementation, address decomposition and the per access policy logic
pub mod cache;

/// Contains the cache configuration, its builder, and the JSON configuration file format
pub mod config;

/// Contains the error types for configuration, internal consistency, and trace parsing
pub mod error;

/// Contains the helpers for loading trace files
pub mod io;

/// Contains the LRU ordered cache set
pub mod lru;

/// Contains the simulator which routes accesses to caches and owns the statistics
pub mod simulator;

/// Contains the instruction and data statistics
pub mod stats;

/// Contains the trace reader
pub mod trace;

// Generated from the build.rs, private
mod hex {
    include!(concat!(env!("OUT_DIR"), "/hex.rs"));
}
#[cfg(test)]
mod test;

/// Contains utilities for running tests and benchmarks.
pub mod util;
