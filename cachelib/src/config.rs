use std::fmt::{Display, Formatter};
use std::str::FromStr;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use crate::cache::CacheGeometry;
use crate::error::ConfigurationError;
use crate::simulator::Simulator;

/// Size of a machine word in bytes. All traffic statistics are counted in words
pub const WORD_SIZE: u64 = 4;

pub const DEFAULT_CACHE_SIZE: u64 = 8 * 1024;
pub const DEFAULT_BLOCK_SIZE: u64 = 16;
pub const DEFAULT_ASSOCIATIVITY: u64 = 1;

/// When stores are propagated to memory - on eviction (write back) or immediately (write through)
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default, Serialize, Deserialize, ValueEnum)]
pub enum WritePolicy {
    #[default]
    #[serde(alias = "wb", alias = "write_back")]
    #[value(alias = "wb")]
    WriteBack,
    #[serde(alias = "wt", alias = "write_through")]
    #[value(alias = "wt")]
    WriteThrough,
}

/// Whether a store miss fills the cache (write allocate) or bypasses it (no write allocate)
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default, Serialize, Deserialize, ValueEnum)]
pub enum AllocationPolicy {
    #[default]
    #[serde(alias = "wa", alias = "write_allocate")]
    #[value(alias = "wa")]
    WriteAllocate,
    #[serde(alias = "nwa", alias = "nw", alias = "no_write_allocate")]
    #[value(alias = "nwa", alias = "nw")]
    NoWriteAllocate,
}

impl Display for WritePolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            WritePolicy::WriteBack => write!(f, "WRITE BACK"),
            WritePolicy::WriteThrough => write!(f, "WRITE THROUGH"),
        }
    }
}

impl Display for AllocationPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AllocationPolicy::WriteAllocate => write!(f, "WRITE ALLOCATE"),
            AllocationPolicy::NoWriteAllocate => write!(f, "WRITE NO ALLOCATE"),
        }
    }
}

/// One cache shared by instructions and data, or a separate cache for each
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum CacheLayout {
    Unified { size: u64 },
    Split { instruction_size: u64, data_size: u64 },
}

/// A validated cache configuration
///
/// Obtained from [`CacheConfigBuilder::build`], or deserialised and then checked by
/// [`CacheConfig::validate`] when the simulator is created
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    pub block_size: u64,
    pub associativity: u64,
    pub layout: CacheLayout,
    pub write_policy: WritePolicy,
    pub allocation_policy: AllocationPolicy,
}

impl CacheConfig {
    /// Number of words moved between the cache and memory when a whole block is transferred
    pub fn words_per_block(&self) -> u64 {
        self.block_size / WORD_SIZE
    }

    pub fn is_split(&self) -> bool {
        matches!(self.layout, CacheLayout::Split { .. })
    }

    /// Checks the block size against the word size and the geometry of every cache, returning the geometry of each cache instance.
    /// The first geometry is the unified or instruction cache, the second is the data cache
    pub fn validate(&self) -> Result<(CacheGeometry, Option<CacheGeometry>), ConfigurationError> {
        if self.block_size % WORD_SIZE != 0 {
            return Err(ConfigurationError::BlockNotWordMultiple { block_size: self.block_size, word_size: WORD_SIZE });
        }
        match self.layout {
            CacheLayout::Unified { size } => {
                Ok((CacheGeometry::new("unified cache size", size, self.block_size, self.associativity)?, None))
            }
            CacheLayout::Split { instruction_size, data_size } => {
                let instruction = CacheGeometry::new("instruction cache size", instruction_size, self.block_size, self.associativity)?;
                let data = CacheGeometry::new("data cache size", data_size, self.block_size, self.associativity)?;
                Ok((instruction, Some(data)))
            }
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            associativity: DEFAULT_ASSOCIATIVITY,
            layout: CacheLayout::Unified { size: DEFAULT_CACHE_SIZE },
            write_policy: WritePolicy::default(),
            allocation_policy: AllocationPolicy::default(),
        }
    }
}

impl Display for CacheConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "*** CACHE SETTINGS ***")?;
        match self.layout {
            CacheLayout::Unified { size } => {
                writeln!(f, "  Unified I- D-cache")?;
                writeln!(f, "  Size: \t{size}")?;
            }
            CacheLayout::Split { instruction_size, data_size } => {
                writeln!(f, "  Split I- D-cache")?;
                writeln!(f, "  I-cache size: \t{instruction_size}")?;
                writeln!(f, "  D-cache size: \t{data_size}")?;
            }
        }
        writeln!(f, "  Associativity: \t{}", self.associativity)?;
        writeln!(f, "  Block size: \t{}", self.block_size)?;
        writeln!(f, "  Write policy: \t{}", self.write_policy)?;
        write!(f, "  Allocation policy: \t{}", self.allocation_policy)
    }
}

/// The kinds of parameter accepted by [`CacheConfigBuilder`]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ParameterKind {
    BlockSize,
    UnifiedSize,
    InstructionSize,
    DataSize,
    Associativity,
    WriteBack,
    WriteThrough,
    WriteAllocate,
    NoWriteAllocate,
}

/// Accepts the short flag names of the classic dinero-style simulators (`bs`, `us`, `is`, `ds`, `a`,
/// `wb`, `wt`, `wa`, `nw`) as well as the snake case names
impl FromStr for ParameterKind {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim_start_matches('-') {
            "bs" | "block_size" => Ok(ParameterKind::BlockSize),
            "us" | "unified_size" => Ok(ParameterKind::UnifiedSize),
            "is" | "instruction_size" => Ok(ParameterKind::InstructionSize),
            "ds" | "data_size" => Ok(ParameterKind::DataSize),
            "a" | "associativity" => Ok(ParameterKind::Associativity),
            "wb" | "write_back" => Ok(ParameterKind::WriteBack),
            "wt" | "write_through" => Ok(ParameterKind::WriteThrough),
            "wa" | "write_allocate" => Ok(ParameterKind::WriteAllocate),
            "nw" | "nwa" | "no_write_allocate" => Ok(ParameterKind::NoWriteAllocate),
            other => Err(ConfigurationError::UnknownParameter(other.to_string())),
        }
    }
}

/// A single configuration change, with its value where the kind needs one
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CacheParameter {
    BlockSize(u64),
    UnifiedSize(u64),
    InstructionSize(u64),
    DataSize(u64),
    Associativity(u64),
    WriteBack,
    WriteThrough,
    WriteAllocate,
    NoWriteAllocate,
}

impl CacheParameter {
    /// Pairs a parameter kind with its value. Flag kinds ignore the value
    pub fn new(kind: ParameterKind, value: Option<u64>) -> Result<Self, ConfigurationError> {
        let required = || value.ok_or_else(|| ConfigurationError::MissingValue(format!("{kind:?}")));
        Ok(match kind {
            ParameterKind::BlockSize => CacheParameter::BlockSize(required()?),
            ParameterKind::UnifiedSize => CacheParameter::UnifiedSize(required()?),
            ParameterKind::InstructionSize => CacheParameter::InstructionSize(required()?),
            ParameterKind::DataSize => CacheParameter::DataSize(required()?),
            ParameterKind::Associativity => CacheParameter::Associativity(required()?),
            ParameterKind::WriteBack => CacheParameter::WriteBack,
            ParameterKind::WriteThrough => CacheParameter::WriteThrough,
            ParameterKind::WriteAllocate => CacheParameter::WriteAllocate,
            ParameterKind::NoWriteAllocate => CacheParameter::NoWriteAllocate,
        })
    }
}

/// Collects parameters before the simulation starts
///
/// Setting a unified size switches to a unified cache, setting either the instruction or data
/// size switches to split caches. A split size which was never set keeps the default size.
/// The builder is consumed by [`CacheConfigBuilder::initialize`], so no parameter can change once
/// the simulator exists
#[derive(Debug, Clone)]
pub struct CacheConfigBuilder {
    block_size: u64,
    associativity: u64,
    split: bool,
    unified_size: u64,
    instruction_size: u64,
    data_size: u64,
    write_policy: WritePolicy,
    allocation_policy: AllocationPolicy,
}

impl Default for CacheConfigBuilder {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            associativity: DEFAULT_ASSOCIATIVITY,
            split: false,
            unified_size: DEFAULT_CACHE_SIZE,
            instruction_size: DEFAULT_CACHE_SIZE,
            data_size: DEFAULT_CACHE_SIZE,
            write_policy: WritePolicy::default(),
            allocation_policy: AllocationPolicy::default(),
        }
    }
}

impl CacheConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_parameter(&mut self, parameter: CacheParameter) -> &mut Self {
        match parameter {
            CacheParameter::BlockSize(value) => self.block_size = value,
            CacheParameter::UnifiedSize(value) => {
                self.split = false;
                self.unified_size = value;
            }
            CacheParameter::InstructionSize(value) => {
                self.split = true;
                self.instruction_size = value;
            }
            CacheParameter::DataSize(value) => {
                self.split = true;
                self.data_size = value;
            }
            CacheParameter::Associativity(value) => self.associativity = value,
            CacheParameter::WriteBack => self.write_policy = WritePolicy::WriteBack,
            CacheParameter::WriteThrough => self.write_policy = WritePolicy::WriteThrough,
            CacheParameter::WriteAllocate => self.allocation_policy = AllocationPolicy::WriteAllocate,
            CacheParameter::NoWriteAllocate => self.allocation_policy = AllocationPolicy::NoWriteAllocate,
        }
        self
    }

    /// Sets a parameter given by name, see [`ParameterKind::from_str`] for the accepted names
    pub fn set_named_parameter(&mut self, name: &str, value: Option<u64>) -> Result<&mut Self, ConfigurationError> {
        let kind = name.parse::<ParameterKind>()?;
        Ok(self.set_parameter(CacheParameter::new(kind, value)?))
    }

    pub fn set_parameters<I: IntoIterator<Item = CacheParameter>>(&mut self, parameters: I) -> &mut Self {
        for parameter in parameters {
            self.set_parameter(parameter);
        }
        self
    }

    /// Captures the parameters into a [`CacheConfig`], checking the geometry of every cache
    pub fn build(&self) -> Result<CacheConfig, ConfigurationError> {
        let layout = if self.split {
            CacheLayout::Split { instruction_size: self.instruction_size, data_size: self.data_size }
        } else {
            CacheLayout::Unified { size: self.unified_size }
        };
        let config = CacheConfig {
            block_size: self.block_size,
            associativity: self.associativity,
            layout,
            write_policy: self.write_policy,
            allocation_policy: self.allocation_policy,
        };
        config.validate()?;
        Ok(config)
    }

    /// Builds the configuration and creates a simulator with empty caches and zeroed statistics
    pub fn initialize(self) -> Result<Simulator, ConfigurationError> {
        Simulator::new(&self.build()?)
    }
}

/// The JSON configuration file format. Every field is optional, present fields are applied on top
/// of the defaults in the order they are declared here
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub block_size: Option<u64>,
    pub unified_size: Option<u64>,
    pub instruction_size: Option<u64>,
    pub data_size: Option<u64>,
    pub associativity: Option<u64>,
    pub write_policy: Option<WritePolicy>,
    pub allocation_policy: Option<AllocationPolicy>,
}

impl ConfigFile {
    pub fn parameters(&self) -> Vec<CacheParameter> {
        let mut out = Vec::new();
        if let Some(value) = self.block_size {
            out.push(CacheParameter::BlockSize(value));
        }
        if let Some(value) = self.unified_size {
            out.push(CacheParameter::UnifiedSize(value));
        }
        if let Some(value) = self.instruction_size {
            out.push(CacheParameter::InstructionSize(value));
        }
        if let Some(value) = self.data_size {
            out.push(CacheParameter::DataSize(value));
        }
        if let Some(value) = self.associativity {
            out.push(CacheParameter::Associativity(value));
        }
        match self.write_policy {
            Some(WritePolicy::WriteBack) => out.push(CacheParameter::WriteBack),
            Some(WritePolicy::WriteThrough) => out.push(CacheParameter::WriteThrough),
            None => {}
        }
        match self.allocation_policy {
            Some(AllocationPolicy::WriteAllocate) => out.push(CacheParameter::WriteAllocate),
            Some(AllocationPolicy::NoWriteAllocate) => out.push(CacheParameter::NoWriteAllocate),
            None => {}
        }
        out
    }
}
