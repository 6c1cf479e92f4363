use thiserror::Error;

/// Errors raised while configuring a cache, before any access is simulated
///
/// All of these are fatal, the simulator never attempts to run with a partial configuration
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("unknown cache parameter `{0}`")]
    UnknownParameter(String),
    #[error("cache parameter `{0}` requires a value")]
    MissingValue(String),
    #[error("{name} must be a power of two, got {value}")]
    NotPowerOfTwo { name: &'static str, value: u64 },
    #[error("block size {block_size} is not a multiple of the word size {word_size}")]
    BlockNotWordMultiple { block_size: u64, word_size: u64 },
    #[error("{name} of {size} bytes cannot be divided into sets of {associativity} x {block_size} byte blocks")]
    InvalidSetCount {
        name: &'static str,
        size: u64,
        associativity: u64,
        block_size: u64,
    },
}

/// Internal consistency failures of a set. These can only happen through a bug in the access
/// processor, the engine panics with the error as the message when it sees one
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("set already holds {capacity} lines, cannot insert tag {tag:#x}")]
    SetOverflow { capacity: usize, tag: u64 },
    #[error("tag {tag:#x} is already resident in the set")]
    DuplicateTag { tag: u64 },
}

/// A malformed record in a trace, line numbers start at 1
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TraceError {
    #[error("line {line}: missing {field}")]
    MissingField { line: usize, field: &'static str },
    #[error("line {line}: unknown access label `{label}`")]
    BadLabel { line: usize, label: String },
    #[error("line {line}: `{address}` is not a hexadecimal address")]
    BadAddress { line: usize, address: String },
}
