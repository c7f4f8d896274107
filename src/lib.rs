//! Sprint planning backend: greedy task allocation, sprint metrics with
//! burn-down series, and a completion-rate predictor with recommendations.

pub mod analytics;
pub mod core;
pub mod db;
pub mod mcp;
pub mod planner;
pub mod planning;
pub mod prediction;


pub use crate::core::config::PlannerConfig;
pub use crate::core::error::{PlannerError, Result};
pub use planner::{AllocationBatch, SprintPlanner};


pub const DEFAULT_COMPLETION_THRESHOLD: f64 = 0.8;


pub const DEFAULT_MAX_TASKS_PER_DAY: f64 = 1.5;


pub const DEFAULT_MAX_AVG_TASK_SIZE: f64 = 8.0;


pub const DEFAULT_PAGE_LIMIT: usize = 100;
