//! Collaborators the quiz controller talks to: the presentation layer and the
//! telemetry sink.

use geoquiz_core::model::{CompletionSummary, MapId, Region, RegionId};
use geoquiz_core::picker::Question;
use thiserror::Error;
use tracing::info;

/// Outcome of a single guess, handed to the presentation layer before the next
/// question is shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerFeedback {
    pub chosen: RegionId,
    pub is_correct: bool,
    pub correct_region: Region,
}

/// Rendering side of the game. Implementations draw the map, choices and summary.
///
/// Answers flow back through [`crate::QuizLoopService::submit_answer`].
pub trait PresentationPort: Send + Sync {
    /// A new question: highlight `question.region_id()` and offer its choices.
    fn on_question(&self, prompt: &str, question: &Question);

    fn on_progress(&self, correct: usize, total: usize);

    fn on_mistake_count_changed(&self, mistakes: u32);

    fn on_answer_feedback(&self, _feedback: &AnswerFeedback) {}

    fn on_complete(&self, summary: &CompletionSummary);

    /// Regions missed at least once, for the final map colouring.
    fn on_final_review(&self, incorrect: &[RegionId]);
}

/// Analytics events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TelemetryEvent {
    MapSelected {
        map: MapId,
    },
    AnswerGiven {
        map: MapId,
        region: RegionId,
        is_correct: bool,
    },
    GameCompleted {
        map: MapId,
        mistakes: u32,
        duration_ms: u64,
    },
    Reset {
        map: MapId,
    },
}

impl TelemetryEvent {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            TelemetryEvent::MapSelected { .. } => "select_map",
            TelemetryEvent::AnswerGiven { .. } => "answer_given",
            TelemetryEvent::GameCompleted { .. } => "game_completed",
            TelemetryEvent::Reset { .. } => "reset_progress",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("telemetry delivery failed: {0}")]
pub struct TelemetryError(pub String);

/// Fire-and-forget event sink. Errors are logged by the caller and never retried.
pub trait Telemetry: Send + Sync {
    /// # Errors
    ///
    /// Returns `TelemetryError` if the event could not be delivered.
    fn track(&self, event: &TelemetryEvent) -> Result<(), TelemetryError>;
}

/// Default sink: writes events to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingTelemetry;

impl Telemetry for TracingTelemetry {
    fn track(&self, event: &TelemetryEvent) -> Result<(), TelemetryError> {
        info!(target: "geoquiz::telemetry", event = event.name(), ?event, "analytics event");
        Ok(())
    }
}
