use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::{ProgressSnapshot, Region, RegionId};
use crate::score;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionStateError {
    #[error("map contains no regions")]
    EmptyRegionSet,

    #[error("region {0} is not part of this map")]
    UnknownRegion(RegionId),
}

/// In-memory quiz progress for a single map.
///
/// Invariants:
/// - every id in `correct` and `incorrect` belongs to `regions`
/// - the pending question is never an already-correct region
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    regions: Vec<Region>,
    correct: BTreeSet<RegionId>,
    incorrect: BTreeSet<RegionId>,
    mistakes: u32,
    started_at: DateTime<Utc>,
    current_question: Option<RegionId>,
}

impl SessionState {
    /// Start a fresh session over the given regions.
    ///
    /// # Errors
    ///
    /// Returns `SessionStateError::EmptyRegionSet` if `regions` is empty.
    pub fn initialize(
        regions: Vec<Region>,
        started_at: DateTime<Utc>,
    ) -> Result<Self, SessionStateError> {
        if regions.is_empty() {
            return Err(SessionStateError::EmptyRegionSet);
        }

        Ok(Self {
            regions,
            correct: BTreeSet::new(),
            incorrect: BTreeSet::new(),
            mistakes: 0,
            started_at,
            current_question: None,
        })
    }

    /// Replace progress with a persisted snapshot.
    ///
    /// Ids the current map does not know are dropped. The timer restarts at `now`,
    /// so durations are measured per visit.
    pub fn restore(&mut self, snapshot: ProgressSnapshot, now: DateTime<Utc>) {
        let known: BTreeSet<&RegionId> = self.regions.iter().map(Region::id).collect();
        self.correct = snapshot
            .correct
            .into_iter()
            .filter(|id| known.contains(id))
            .collect();
        self.incorrect = snapshot
            .incorrect
            .into_iter()
            .filter(|id| known.contains(id))
            .collect();
        self.mistakes = snapshot.mistakes;
        self.started_at = now;
        self.current_question = None;
    }

    /// Mark a region as answered correctly. Recording the same id twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `SessionStateError::UnknownRegion` for ids outside this map.
    pub fn record_correct(&mut self, id: &RegionId) -> Result<(), SessionStateError> {
        self.ensure_known(id)?;
        self.correct.insert(id.clone());
        if self.current_question.as_ref() == Some(id) {
            self.current_question = None;
        }
        Ok(())
    }

    /// Count a wrong guess. Every call adds a mistake; the region is remembered
    /// as missed only once.
    ///
    /// # Errors
    ///
    /// Returns `SessionStateError::UnknownRegion` for ids outside this map.
    pub fn record_incorrect(&mut self, id: &RegionId) -> Result<(), SessionStateError> {
        self.ensure_known(id)?;
        self.mistakes = self.mistakes.saturating_add(1);
        self.incorrect.insert(id.clone());
        Ok(())
    }

    /// Clear all progress and restart the timer.
    pub fn reset(&mut self, now: DateTime<Utc>) {
        self.correct.clear();
        self.incorrect.clear();
        self.mistakes = 0;
        self.started_at = now;
        self.current_question = None;
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.correct.len() == self.regions.len()
    }

    /// Regions not yet answered correctly, in asset order.
    #[must_use]
    pub fn remaining(&self) -> Vec<&Region> {
        self.regions
            .iter()
            .filter(|region| !self.correct.contains(region.id()))
            .collect()
    }

    #[must_use]
    pub fn region(&self, id: &RegionId) -> Option<&Region> {
        self.regions.iter().find(|region| region.id() == id)
    }

    #[must_use]
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.regions.len()
    }

    #[must_use]
    pub fn correct(&self) -> &BTreeSet<RegionId> {
        &self.correct
    }

    #[must_use]
    pub fn incorrect(&self) -> &BTreeSet<RegionId> {
        &self.incorrect
    }

    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.correct.len()
    }

    #[must_use]
    pub fn mistakes(&self) -> u32 {
        self.mistakes
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&RegionId> {
        self.current_question.as_ref()
    }

    /// Percentage of regions answered correctly.
    #[must_use]
    pub fn progress_percent(&self) -> f64 {
        score::progress_percent(self.correct.len(), self.regions.len())
    }

    #[must_use]
    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            correct: self.correct.iter().cloned().collect(),
            incorrect: self.incorrect.iter().cloned().collect(),
            mistakes: self.mistakes,
        }
    }

    pub(crate) fn set_current_question(&mut self, id: Option<RegionId>) {
        self.current_question = id;
    }

    fn ensure_known(&self, id: &RegionId) -> Result<(), SessionStateError> {
        if self.region(id).is_some() {
            Ok(())
        } else {
            Err(SessionStateError::UnknownRegion(id.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;
    use chrono::Duration;

    fn rid(id: &str) -> RegionId {
        RegionId::new(id).unwrap()
    }

    fn state(ids: &[&str]) -> SessionState {
        let regions = ids
            .iter()
            .map(|id| Region::new(*id, format!("Region {id}")).unwrap())
            .collect();
        SessionState::initialize(regions, fixed_now()).unwrap()
    }

    fn assert_partition(state: &SessionState) {
        assert_eq!(
            state.correct_count() + state.remaining().len(),
            state.total()
        );
    }

    #[test]
    fn initialize_rejects_empty_map() {
        let err = SessionState::initialize(Vec::new(), fixed_now()).unwrap_err();
        assert_eq!(err, SessionStateError::EmptyRegionSet);
    }

    #[test]
    fn record_correct_is_idempotent() {
        let mut once = state(&["A", "B"]);
        once.record_correct(&rid("A")).unwrap();

        let mut twice = state(&["A", "B"]);
        twice.record_correct(&rid("A")).unwrap();
        twice.record_correct(&rid("A")).unwrap();

        assert_eq!(once, twice);
        assert_partition(&twice);
    }

    #[test]
    fn record_incorrect_counts_every_miss_once_per_region() {
        let mut s = state(&["A", "B"]);
        s.record_incorrect(&rid("A")).unwrap();
        s.record_incorrect(&rid("A")).unwrap();
        s.record_incorrect(&rid("B")).unwrap();

        assert_eq!(s.mistakes(), 3);
        assert_eq!(s.incorrect().len(), 2);
        assert_partition(&s);
    }

    #[test]
    fn unknown_ids_are_rejected() {
        let mut s = state(&["A"]);
        assert_eq!(
            s.record_correct(&rid("Z")),
            Err(SessionStateError::UnknownRegion(rid("Z")))
        );
        assert!(s.record_incorrect(&rid("Z")).is_err());
        assert_eq!(s.mistakes(), 0);
    }

    #[test]
    fn completes_when_all_correct() {
        let mut s = state(&["A", "B"]);
        assert!(!s.is_complete());
        s.record_correct(&rid("A")).unwrap();
        assert_partition(&s);
        s.record_correct(&rid("B")).unwrap();
        assert!(s.is_complete());
        assert!(s.remaining().is_empty());
        assert!((s.progress_percent() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn correct_answer_clears_pending_question() {
        let mut s = state(&["A", "B"]);
        s.set_current_question(Some(rid("A")));
        s.record_incorrect(&rid("A")).unwrap();
        assert_eq!(s.current_question(), Some(&rid("A")));
        s.record_correct(&rid("A")).unwrap();
        assert_eq!(s.current_question(), None);
    }

    #[test]
    fn restore_drops_unknown_ids_and_restarts_timer() {
        let mut s = state(&["A", "B", "C"]);
        let later = fixed_now() + Duration::minutes(10);
        s.restore(
            ProgressSnapshot {
                correct: vec![rid("A"), rid("GONE")],
                incorrect: vec![rid("B"), rid("ALSO_GONE")],
                mistakes: 4,
            },
            later,
        );

        assert_eq!(s.correct().iter().collect::<Vec<_>>(), vec![&rid("A")]);
        assert_eq!(s.incorrect().iter().collect::<Vec<_>>(), vec![&rid("B")]);
        assert_eq!(s.mistakes(), 4);
        assert_eq!(s.started_at(), later);
        assert_partition(&s);
    }

    #[test]
    fn reset_clears_everything() {
        let mut s = state(&["A", "B"]);
        s.record_incorrect(&rid("A")).unwrap();
        s.record_correct(&rid("B")).unwrap();
        let later = fixed_now() + Duration::seconds(30);

        s.reset(later);

        assert_eq!(s.correct_count(), 0);
        assert!(s.incorrect().is_empty());
        assert_eq!(s.mistakes(), 0);
        assert_eq!(s.started_at(), later);
        assert!(s.snapshot().is_empty());
        assert_partition(&s);
    }

    #[test]
    fn snapshot_reflects_state() {
        let mut s = state(&["A", "B"]);
        s.record_incorrect(&rid("B")).unwrap();
        s.record_correct(&rid("B")).unwrap();
        let snap = s.snapshot();
        assert_eq!(snap.correct, vec![rid("B")]);
        assert_eq!(snap.incorrect, vec![rid("B")]);
        assert_eq!(snap.mistakes, 1);
    }
}
