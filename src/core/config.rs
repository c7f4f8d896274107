
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::error::Result;
use crate::{
    DEFAULT_COMPLETION_THRESHOLD, DEFAULT_MAX_AVG_TASK_SIZE, DEFAULT_MAX_TASKS_PER_DAY,
    DEFAULT_PAGE_LIMIT,
};


#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub model_path: Option<PathBuf>,
    pub analytics: AnalyticsConfig,
    pub prediction: PredictionConfig,
    pub store: StoreConfig,
}


#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Report all-zero metrics for a sprint with no tasks instead of `NotFound`.
    pub allow_empty_sprints: bool,
}


#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionConfig {
    pub completion_threshold: f64,
    pub max_tasks_per_day: f64,
    pub max_avg_task_size: f64,
}


#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub default_page_limit: usize,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            completion_threshold: DEFAULT_COMPLETION_THRESHOLD,
            max_tasks_per_day: DEFAULT_MAX_TASKS_PER_DAY,
            max_avg_task_size: DEFAULT_MAX_AVG_TASK_SIZE,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            default_page_limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl PlannerConfig {

    pub fn new(model_path: Option<PathBuf>) -> Self {
        Self {
            model_path,
            analytics: AnalyticsConfig::default(),
            prediction: PredictionConfig::default(),
            store: StoreConfig::default(),
        }
    }


    pub fn from_env() -> Self {
        let mut config = Self::new(std::env::var("SPRINT_MODEL_PATH").ok().map(PathBuf::from));

        if let Some(allow) = env_parse::<bool>("SPRINT_ALLOW_EMPTY_SPRINTS") {
            config.analytics.allow_empty_sprints = allow;
        }
        if let Some(threshold) = env_parse::<f64>("SPRINT_COMPLETION_THRESHOLD") {
            config.prediction.completion_threshold = threshold;
        }
        if let Some(limit) = env_parse::<f64>("SPRINT_MAX_TASKS_PER_DAY") {
            config.prediction.max_tasks_per_day = limit;
        }
        if let Some(size) = env_parse::<f64>("SPRINT_MAX_AVG_TASK_SIZE") {
            config.prediction.max_avg_task_size = size;
        }
        if let Some(limit) = env_parse::<usize>("SPRINT_PAGE_LIMIT") {
            config.store.default_page_limit = limit;
        }

        config
    }

    /// Layers an optional config file under `SPRINT_PLANNER__*` environment overrides.
    ///
    /// Nested keys use a double underscore, e.g.
    /// `SPRINT_PLANNER__PREDICTION__MAX_AVG_TASK_SIZE=6`.
    /// A relative `model_path` is resolved against the directory holding the config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let settings = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(
                config::Environment::with_prefix("SPRINT_PLANNER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut config: Self = settings.try_deserialize()?;
        if let (Some(model_path), Some(dir)) = (&config.model_path, path.parent()) {
            if model_path.is_relative() && path.is_file() {
                config.model_path = Some(dir.join(model_path));
            }
        }
        Ok(config)
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self::new(None)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}
