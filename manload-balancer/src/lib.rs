mod error;
pub use error::*;
pub mod dispersion;
pub use dispersion::Deviation;
pub mod group;
pub use group::Group;
pub mod instance;
pub use instance::Instance;
pub mod neighbors;
pub use neighbors::{NeighborExplorer, PairwiseTransfer, SampledTransfer};
pub mod search;
pub use search::{Convergence, LocalSearch, SearchConfig, SearchOutcome, SearchState};
pub mod seed;
pub use seed::{initial_allocation, RemainderPolicy};

/// Units assigned per group, index-aligned with `Instance::groups`.
pub type Allocation = Vec<u32>;
