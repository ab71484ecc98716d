use crate::model::ids::RegionId;

/// Persistable part of a session: what has been answered and how many mistakes
/// were made. No timestamps: each visit restarts the timer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub correct: Vec<RegionId>,
    pub incorrect: Vec<RegionId>,
    pub mistakes: u32,
}

impl ProgressSnapshot {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.correct.is_empty() && self.incorrect.is_empty() && self.mistakes == 0
    }
}
