pub mod config;
pub mod export;
pub mod level;
pub mod log;
pub mod refill;
pub mod snapshot;
pub mod usage;

pub use level::{EstimateSource, LevelEstimate, LevelEstimator};
pub use refill::{RefillLogic, RefillOutcome, RefillRequest};
pub use snapshot::{FleetSnapshot, FleetSource};
