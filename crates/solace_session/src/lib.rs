//! Session layer: owns per-connection modality state for the streaming
//! variant and the request/response turn pipeline. Both drive the same
//! fusion → risk → mode → generation chain from solace_core.

pub mod event;
pub mod manager;
pub mod pipeline;

pub use event::InboundEvent;
pub use manager::{SessionManager, StreamOutcome};
pub use pipeline::{TurnOutcome, TurnPipeline, TurnRequest};
