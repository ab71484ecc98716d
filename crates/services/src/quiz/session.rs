use rand::SeedableRng;
use rand::rngs::StdRng;

use geoquiz_core::model::{CompletionSummary, RegionCatalogEntry, RegionId, SessionState};
use geoquiz_core::picker::{self, Pick, Question};

/// Where a session stands in the answer loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizPhase {
    AwaitingAnswer(RegionId),
    /// Between a guess and the next question.
    Evaluating,
    Complete(CompletionSummary),
}

/// In-memory quiz for one map.
///
/// Holds the session state, the pending question and the random source used to
/// pick questions. Persistence is driven by [`super::QuizLoopService`].
pub struct QuizSession {
    entry: RegionCatalogEntry,
    state: SessionState,
    question: Option<Question>,
    summary: Option<CompletionSummary>,
    rng: StdRng,
}

impl QuizSession {
    pub(crate) fn new(entry: RegionCatalogEntry, state: SessionState, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            entry,
            state,
            question: None,
            summary: None,
            rng,
        }
    }

    #[must_use]
    pub fn entry(&self) -> &RegionCatalogEntry {
        &self.entry
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub(crate) fn state_mut(&mut self) -> &mut SessionState {
        &mut self.state
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.question.as_ref()
    }

    #[must_use]
    pub fn summary(&self) -> Option<&CompletionSummary> {
        self.summary.as_ref()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.summary.is_some()
    }

    #[must_use]
    pub fn phase(&self) -> QuizPhase {
        match (&self.summary, &self.question) {
            (Some(summary), _) => QuizPhase::Complete(*summary),
            (None, Some(question)) => QuizPhase::AwaitingAnswer(question.region_id().clone()),
            (None, None) => QuizPhase::Evaluating,
        }
    }

    /// Take the pending question, leaving the session in `Evaluating`.
    pub(crate) fn take_question(&mut self) -> Option<Question> {
        self.question.take()
    }

    /// Ask the picker for the next question; stores it when there is one.
    pub(crate) fn pick_next(&mut self) -> Pick {
        let pick = picker::pick_next(&mut self.state, &mut self.rng);
        if let Pick::Question(question) = &pick {
            self.question = Some(question.clone());
        }
        pick
    }

    pub(crate) fn complete(&mut self, summary: CompletionSummary) {
        self.question = None;
        self.summary = Some(summary);
    }

    pub(crate) fn clear_completion(&mut self) {
        self.question = None;
        self.summary = None;
    }
}
