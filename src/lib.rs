//! Webforge - AI Generation Backend
//!
//! The generation layer of the Webforge visual builder. It includes:
//! - Prompt formatting and the per-stage generation chains
//! - The step orchestrator driving the guided flow
//! - The transactional document store and section merging
//! - Request gating and response envelopes for the HTTP surface

pub mod chains;
pub mod components;
pub mod config;
pub mod error;
pub mod images;
pub mod jsx;
pub mod merge;
pub mod orchestrator;
pub mod prompt;
pub mod request;
pub mod service;
pub mod steps;
pub mod store;

// Re-export the service surface
pub use service::{
    GenerateRequest, GenerateService, GptProvider, ModelProvider, OpenPermit, Permit, Stage,
    StepResponse,
};
// Re-export the flow machinery
pub use orchestrator::{Orchestrator, SectionMerger, StepRunner};
pub use steps::{flow_entry, reduce, GenerationState, StepAction, StepId, FLOW};
pub use config::ServiceConfig;
pub use error::{AppError, AppResult};
