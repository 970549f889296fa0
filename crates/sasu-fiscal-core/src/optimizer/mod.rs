pub mod candidates;
pub mod preferences;
pub mod scoring;
pub mod search;

pub use preferences::{PreferenceProfile, Preferences, ScoreScaling, ScoreWeights};
pub use scoring::Strategy;
pub use search::{optimize_distribution, optimize_distribution_with_table, OptimizationResult};
