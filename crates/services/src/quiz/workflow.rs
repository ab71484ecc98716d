use std::sync::Arc;

use tracing::{debug, info, warn};

use geoquiz_core::model::{
    CompletionSummary, ProgressSnapshot, Region, RegionCatalogEntry, RegionId, SessionState,
    SessionStateError,
};
use geoquiz_core::picker::{Pick, Question};
use storage::repository::{ProgressRepository, StorageError};

use super::session::{QuizPhase, QuizSession};
use crate::Clock;
use crate::asset::RegionAssetLoader;
use crate::error::QuizError;
use crate::ports::{AnswerFeedback, PresentationPort, Telemetry, TelemetryEvent, TracingTelemetry};

/// What the session moved to after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextStep {
    Question(Question),
    Complete(CompletionSummary),
}

/// Result of answering the pending question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub is_correct: bool,
    pub correct_region: Region,
    pub next: NextStep,
}

/// Orchestrates session start, answering, completion and reset, persisting
/// progress after every transition.
#[derive(Clone)]
pub struct QuizLoopService {
    clock: Clock,
    progress: Arc<dyn ProgressRepository>,
    assets: RegionAssetLoader,
    presentation: Arc<dyn PresentationPort>,
    telemetry: Arc<dyn Telemetry>,
    rng_seed: Option<u64>,
}

impl QuizLoopService {
    #[must_use]
    pub fn new(
        clock: Clock,
        progress: Arc<dyn ProgressRepository>,
        assets: RegionAssetLoader,
        presentation: Arc<dyn PresentationPort>,
    ) -> Self {
        Self {
            clock,
            progress,
            assets,
            presentation,
            telemetry: Arc::new(TracingTelemetry),
            rng_seed: None,
        }
    }

    #[must_use]
    pub fn with_telemetry(mut self, telemetry: Arc<dyn Telemetry>) -> Self {
        self.telemetry = telemetry;
        self
    }

    /// Seed question selection so runs are reproducible.
    #[must_use]
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    /// Select a map: load its asset, restore stored progress and ask the first question.
    ///
    /// A map that was already finished comes back complete with its stored summary.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::AssetLoad` if the asset cannot be loaded,
    /// `QuizError::Session` if it contains no regions, or `QuizError::Storage`
    /// for repository failures other than unreadable records.
    pub async fn start(&self, entry: &RegionCatalogEntry) -> Result<QuizSession, QuizError> {
        self.track(&TelemetryEvent::MapSelected {
            map: entry.id().clone(),
        });
        let regions = self.assets.load(entry).await?;
        self.start_with_regions(entry, regions).await
    }

    /// Like [`Self::start`], with regions that were already extracted.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Session` for an empty region list, or `QuizError::Storage`.
    pub async fn start_with_regions(
        &self,
        entry: &RegionCatalogEntry,
        regions: Vec<Region>,
    ) -> Result<QuizSession, QuizError> {
        let now = self.clock.now();
        let mut state = SessionState::initialize(regions, now)?;
        if let Some(snapshot) = self.stored_progress(entry).await? {
            state.restore(snapshot, now);
        }
        let stored_summary = self.stored_summary(entry).await?;

        let mut session = QuizSession::new(entry.clone(), state, self.rng_seed);
        info!(
            map = %entry.id(),
            total = session.state().total(),
            correct = session.state().correct_count(),
            mistakes = session.state().mistakes(),
            "quiz session started"
        );

        self.publish_progress(&session);
        self.advance(&mut session, stored_summary).await?;
        Ok(session)
    }

    /// Answer the pending question with the region id behind the chosen button.
    ///
    /// Both outcomes persist progress and move on to a fresh pick; a missed region
    /// stays in the pool and can come up again later.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::SessionCompleted` once the map is finished,
    /// `QuizError::NoActiveQuestion` when nothing is pending,
    /// `QuizError::UnknownChoice` for an id that was not offered, or
    /// `QuizError::Storage` if persisting fails. After a storage failure the
    /// guess is already recorded; call [`Self::resume`] to continue.
    pub async fn submit_answer(
        &self,
        session: &mut QuizSession,
        choice: &RegionId,
    ) -> Result<AnswerOutcome, QuizError> {
        if session.is_complete() {
            return Err(QuizError::SessionCompleted);
        }
        let target = match session.current_question() {
            None => return Err(QuizError::NoActiveQuestion),
            Some(question) if question.choice(choice).is_none() => {
                return Err(QuizError::UnknownChoice(choice.clone()));
            }
            Some(question) => question.region_id().clone(),
        };
        let correct_region = session
            .state()
            .region(&target)
            .cloned()
            .ok_or_else(|| SessionStateError::UnknownRegion(target.clone()))?;

        session.take_question();
        let is_correct = *choice == target;
        if is_correct {
            session.state_mut().record_correct(&target)?;
        } else {
            session.state_mut().record_incorrect(&target)?;
        }

        self.progress
            .save_progress(session.entry().storage_key(), &session.state().snapshot())
            .await?;

        self.track(&TelemetryEvent::AnswerGiven {
            map: session.entry().id().clone(),
            region: target.clone(),
            is_correct,
        });
        self.presentation.on_answer_feedback(&AnswerFeedback {
            chosen: choice.clone(),
            is_correct,
            correct_region: correct_region.clone(),
        });
        self.publish_progress(session);

        let next = self.advance(session, None).await?;
        Ok(AnswerOutcome {
            is_correct,
            correct_region,
            next,
        })
    }

    /// Pick the next question for a session left between questions by a failed write.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Storage` if saving the completion summary fails.
    pub async fn resume(&self, session: &mut QuizSession) -> Result<NextStep, QuizError> {
        match session.phase() {
            QuizPhase::Evaluating => self.advance(session, None).await,
            QuizPhase::AwaitingAnswer(_) => session
                .current_question()
                .cloned()
                .map(NextStep::Question)
                .ok_or(QuizError::NoActiveQuestion),
            QuizPhase::Complete(summary) => Ok(NextStep::Complete(summary)),
        }
    }

    /// Erase stored progress and summary, then start the map over.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Storage` if the stored records cannot be removed.
    pub async fn reset(&self, session: &mut QuizSession) -> Result<NextStep, QuizError> {
        self.reset_stored(session.entry()).await?;
        session.state_mut().reset(self.clock.now());
        session.clear_completion();
        self.publish_progress(session);
        self.advance(session, None).await
    }

    /// Erase stored progress and summary for a map without loading it.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Storage` if the records cannot be removed.
    pub async fn reset_stored(&self, entry: &RegionCatalogEntry) -> Result<(), QuizError> {
        self.progress.clear(entry.storage_key()).await?;
        self.track(&TelemetryEvent::Reset {
            map: entry.id().clone(),
        });
        info!(map = %entry.id(), "progress reset");
        Ok(())
    }

    /// Stored progress for a map. Unreadable records count as absent.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Storage` for repository failures.
    pub async fn stored_progress(
        &self,
        entry: &RegionCatalogEntry,
    ) -> Result<Option<ProgressSnapshot>, QuizError> {
        let key = entry.storage_key();
        recover_unreadable(key, self.progress.load_progress(key).await)
    }

    /// Stored completion summary for a map. Unreadable records count as absent.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Storage` for repository failures.
    pub async fn stored_summary(
        &self,
        entry: &RegionCatalogEntry,
    ) -> Result<Option<CompletionSummary>, QuizError> {
        let key = entry.storage_key();
        recover_unreadable(key, self.progress.load_summary(key).await)
    }

    async fn advance(
        &self,
        session: &mut QuizSession,
        stored_summary: Option<CompletionSummary>,
    ) -> Result<NextStep, QuizError> {
        match session.pick_next() {
            Pick::Question(question) => {
                debug!(
                    map = %session.entry().id(),
                    region = %question.region_id(),
                    choices = question.choices().len(),
                    "next question"
                );
                self.presentation
                    .on_question(&session.entry().question_prompt(), &question);
                Ok(NextStep::Question(question))
            }
            Pick::Complete => {
                let summary = match stored_summary {
                    Some(summary) => summary,
                    None => self.finish(session).await?,
                };
                session.complete(summary);
                self.presentation.on_complete(&summary);
                let incorrect: Vec<RegionId> =
                    session.state().incorrect().iter().cloned().collect();
                self.presentation.on_final_review(&incorrect);
                Ok(NextStep::Complete(summary))
            }
        }
    }

    async fn finish(&self, session: &QuizSession) -> Result<CompletionSummary, QuizError> {
        let state = session.state();
        let total = u32::try_from(state.total()).unwrap_or(u32::MAX);
        let summary = CompletionSummary::from_run(
            state.mistakes(),
            total,
            state.started_at(),
            self.clock.now(),
        );
        self.progress
            .save_summary(session.entry().storage_key(), &summary)
            .await?;

        self.track(&TelemetryEvent::GameCompleted {
            map: session.entry().id().clone(),
            mistakes: summary.mistakes(),
            duration_ms: summary.duration_ms(),
        });
        info!(
            map = %session.entry().id(),
            mistakes = summary.mistakes(),
            duration_ms = summary.duration_ms(),
            "map completed"
        );
        Ok(summary)
    }

    fn publish_progress(&self, session: &QuizSession) {
        let state = session.state();
        self.presentation
            .on_progress(state.correct_count(), state.total());
        self.presentation.on_mistake_count_changed(state.mistakes());
    }

    fn track(&self, event: &TelemetryEvent) {
        if let Err(e) = self.telemetry.track(event) {
            warn!(event = event.name(), error = %e, "telemetry event dropped");
        }
    }
}

fn recover_unreadable<T>(
    key: &str,
    result: Result<Option<T>, StorageError>,
) -> Result<Option<T>, QuizError> {
    match result {
        Ok(value) => Ok(value),
        Err(e) if e.is_unreadable() => {
            warn!(%key, error = %e, "ignoring unreadable stored record");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}
