

pub mod burndown;
pub mod manager;
pub mod metrics;

pub use burndown::{BurnDownPoint, BurnDownSeries, BurnDownSeriesBuilder};
pub use manager::{SprintAnalytics, SprintOptimization};
pub use metrics::{MetricsCalculator, PerformanceMetrics};
