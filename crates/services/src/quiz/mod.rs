mod session;
mod workflow;

// Public API of the quiz subsystem.
pub use crate::error::QuizError;
pub use session::{QuizPhase, QuizSession};
pub use workflow::{AnswerOutcome, NextStep, QuizLoopService};
