#[derive(Debug, PartialEq)]
pub enum BalancerError {
    AllocationLengthMismatch {
        expected: usize,
        actual: usize,
    },
    AllocationSumMismatch {
        expected: u64,
        actual: u64,
    },
    EmptyGroups,
    ExceedsMaxUnits {
        index: usize,
        units: u32,
        max_units: f64,
    },
    InsufficientTotal {
        total: u32,
        num_groups: usize,
    },
    InvalidCandidate {
        candidate: Vec<u32>,
        reason: String,
    },
    InvalidExplorer {
        reason: String,
    },
    InvalidGroup {
        index: usize,
        field: &'static str,
    },
    InvalidMaxPasses,
    InvalidTolerance {
        tolerance: f64,
    },
    InvalidTotal,
    SeedInvariant {
        expected: u64,
        actual: u64,
    },
    UnrecoverableSeed {
        seed: Vec<u32>,
        index: usize,
    },
    ZeroEntry {
        index: usize,
    },
}

impl std::fmt::Display for BalancerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BalancerError::AllocationLengthMismatch { expected, actual } => write!(
                f,
                "Allocation has {} entries. Expected one per group ({})",
                actual, expected
            ),
            BalancerError::AllocationSumMismatch { expected, actual } => write!(
                f,
                "Allocation sums to {}. Expected total of {}",
                actual, expected
            ),
            BalancerError::EmptyGroups => write!(f, "At least one group is required"),
            BalancerError::ExceedsMaxUnits {
                index,
                units,
                max_units,
            } => write!(
                f,
                "Group {} is allocated {} units which exceeds its max units ({})",
                index, units, max_units
            ),
            BalancerError::InsufficientTotal { total, num_groups } => write!(
                f,
                "Total of {} units cannot give each of the {} groups at least one unit",
                total, num_groups
            ),
            BalancerError::InvalidCandidate { candidate, reason } => write!(
                f,
                "Neighbor explorer produced an invalid candidate {:?}: {}",
                candidate, reason
            ),
            BalancerError::InvalidExplorer { reason } => {
                write!(f, "Invalid neighbor explorer settings: {}", reason)
            }
            BalancerError::InvalidGroup { index, field } => {
                write!(f, "Group {} has invalid {}. Must be positive", index, field)
            }
            BalancerError::InvalidMaxPasses => write!(f, "max_passes must be positive"),
            BalancerError::InvalidTolerance { tolerance } => write!(
                f,
                "Tolerance ({}) must be finite and non-negative",
                tolerance
            ),
            BalancerError::InvalidTotal => write!(f, "Total units must be positive"),
            BalancerError::SeedInvariant { expected, actual } => write!(
                f,
                "Seed allocation sums to {} after remainder correction. Expected {}",
                actual, expected
            ),
            BalancerError::UnrecoverableSeed { seed, index } => write!(
                f,
                "Seed {:?} leaves group {} without units and no neighbor without a zero entry is within max units",
                seed, index
            ),
            BalancerError::ZeroEntry { index } => {
                write!(f, "Group {} is allocated zero units", index)
            }
        }
    }
}

impl std::error::Error for BalancerError {}

pub type BalancerResult<T> = std::result::Result<T, BalancerError>;
