

pub mod clock;
pub mod config;
pub mod error;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::config::{AnalyticsConfig, PlannerConfig, PredictionConfig, StoreConfig};
pub use self::error::{PlannerError, Result};
