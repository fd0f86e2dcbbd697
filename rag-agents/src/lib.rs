#![deny(missing_docs)]
//! Logged call-sites and the query pipeline.
//!
//! Every model-backed step of the pipeline is a [`LoggedPredictor`]: a named
//! call-site that times each invocation, drains the LM's history buffer
//! afterwards and records the aggregated cost, tokens, prompts and outputs
//! in a shared [`CallLogger`]. [`AgentSuite`] builds one call-site per
//! catalog signature; [`RagPipeline`] routes a query through them.

pub mod error;
pub mod logger;
pub mod pipeline;
pub mod predictor;
pub mod suite;

pub use error::AgentError;
pub use logger::{CallLogger, CallSiteLog, LogEntry, LogSnapshot, LogTotals};
pub use pipeline::{
    Action, CodeExecutor, PipelineRequest, PipelineResponse, RagPipeline, RequestPlan,
};
pub use predictor::LoggedPredictor;
pub use suite::{AgentSuite, names};
