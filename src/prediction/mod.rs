

pub mod features;
pub mod model;
pub mod predictor;

pub use features::{SprintFeatureBuilder, SprintFeatures, SprintSummary};
pub use model::{CompletionModel, ForestModel, LinearModel, ModelArtifact, TreeNode, load_model};
pub use predictor::{CompletionPredictor, SprintPrediction};
