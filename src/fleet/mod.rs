//! Fleet selection for a single demand.

mod allocator;

pub use allocator::{Allocation, FleetAllocator, InsufficientCapacity};
