pub mod events;
pub mod proctor;
pub mod quiz_ctx;
pub mod session;
pub mod submitter;
pub mod timer;

pub use events::QuizEvent;
pub use proctor::{ProctorGuard, ProctorState};
pub use quiz_ctx::QuizCtx;
pub use session::{QuizSession, SessionSnapshot, TickOutcome, DEFAULT_TIME_LIMIT_SECS};
pub use submitter::{SubmitOutcome, SubmitTrigger, Submitter};
pub use timer::{minutes_notice, QuizTimer};
