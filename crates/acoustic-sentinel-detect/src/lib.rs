//! acoustic-sentinel detection logic.
//!
//! Everything between a validated sample and an alarm decision:
//!
//! - [`Calibrator`]: learns the background band energies over the first K
//!   blocks, then freezes them.
//! - [`DecisionForest`]: the production [`PredictiveModel`](acoustic_sentinel_core::PredictiveModel),
//!   loaded from a JSON artifact or the embedded default.
//! - [`Classifier`]: baseline normalization, model call and the low-band
//!   safety override.
//! - [`HysteresisFilter`]: W-block moving fault count mapped to
//!   `NORMAL`/`OBSERVING`/`ALARM`.
//! - [`PulseTimer`] / [`AlarmPulse`]: non-blocking indicator pulse.
//! - [`SentinelPipeline`]: the stage sequence, owning all detection state.
//! - [`Monitor`]: the cooperative control loop over a sample source.
//!
//! # Example
//!
//! ```rust
//! use acoustic_sentinel_core::SentinelConfig;
//! use acoustic_sentinel_detect::{DecisionForest, SentinelPipeline};
//!
//! let config = SentinelConfig {
//!     calibration_frames: 1,
//!     ..SentinelConfig::default()
//! };
//! let mut pipeline = SentinelPipeline::new(config, DecisionForest::embedded().unwrap()).unwrap();
//!
//! let mut silence = vec![0.0_f32; 1024];
//! let first = pipeline.process_block(&mut silence).unwrap();
//! assert!(first.completed_calibration());
//!
//! let second = pipeline.process_block(&mut silence).unwrap();
//! assert_eq!(second.state().unwrap().to_string(), "NORMAL");
//! ```

pub mod calibrator;
pub mod classifier;
pub mod hysteresis;
pub mod model;
pub mod monitor;
pub mod pipeline;
pub mod pulse;
pub mod report;

pub use calibrator::{Baseline, CalibrationEvent, CalibrationPhase, Calibrator};
pub use classifier::{Classification, Classifier};
pub use hysteresis::HysteresisFilter;
pub use model::stub::{ConstantModel, ScriptedModel};
pub use model::{DecisionForest, DecisionTree, TreeNode, DEFAULT_FOREST_JSON};
pub use monitor::{Monitor, MonitorStats, Tick};
pub use pipeline::{PipelineStats, SentinelPipeline};
pub use pulse::{AlarmPulse, PulseEdge, PulseTimer};
pub use report::{BlockReport, InferenceReport};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::calibrator::{Baseline, CalibrationEvent, Calibrator};
    pub use crate::classifier::Classifier;
    pub use crate::hysteresis::HysteresisFilter;
    pub use crate::model::DecisionForest;
    pub use crate::monitor::Monitor;
    pub use crate::pipeline::SentinelPipeline;
    pub use crate::report::BlockReport;
}
