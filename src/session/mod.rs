//! Per-session state and the controller that drives it.

mod controller;
mod export;
mod message;
mod registry;
mod state;

pub use controller::{
    AskOutcome, IgnoreReason, ProcessOutcome, SessionController, EMPTY_UPLOAD_WARNING,
};
pub use export::Transcript;
pub use message::Message;
pub use registry::{ActionGuard, Session, SessionRegistry, SharedSession};
pub use state::{SessionState, SessionStatus};
