

pub mod allocation;

pub use allocation::{AllocationEngine, AllocationOutcome, AllocationRequest, AllocationResult};
