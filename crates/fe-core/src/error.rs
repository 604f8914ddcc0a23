use thiserror::Error;

/// Failures reported by [`Arena::try_allocate`](crate::memory::Arena::try_allocate).
///
/// `Arena::allocate` never returns these: an `AllocFailed` there is routed to
/// `std::alloc::handle_alloc_error` and the rest are contract violations.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryError {
    #[error("alignment {0} is not a power of two")]
    InvalidAlignment(usize),

    #[error("page of {size} bytes aligned to {align} exceeds the address space")]
    CapacityOverflow { size: usize, align: usize },

    #[error("global allocator refused a page of {size} bytes aligned to {align}")]
    AllocFailed { size: usize, align: usize },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Error, Debug)]
pub enum FeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Memory error: {0}")]
    Memory(#[from] MemoryError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, FeError>;
