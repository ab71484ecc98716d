use rand::Rng;
use rand::seq::SliceRandom;

use crate::model::{Region, RegionId, SessionState};

/// Upper bound on the number of answers offered per question.
pub const MAX_CHOICES: usize = 6;

/// One answer button: the player sees `name`, the controller compares `id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub id: RegionId,
    pub name: String,
}

impl From<&Region> for Choice {
    fn from(region: &Region) -> Self {
        Self {
            id: region.id().clone(),
            name: region.name().to_owned(),
        }
    }
}

/// A multiple-choice question about the highlighted region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    region_id: RegionId,
    choices: Vec<Choice>,
}

impl Question {
    /// Region to highlight on the map.
    #[must_use]
    pub fn region_id(&self) -> &RegionId {
        &self.region_id
    }

    #[must_use]
    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    #[must_use]
    pub fn choice(&self, id: &RegionId) -> Option<&Choice> {
        self.choices.iter().find(|choice| &choice.id == id)
    }
}

/// Result of asking the picker for the next question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pick {
    Question(Question),
    Complete,
}

/// Select the next unanswered region and build its shuffled choice set.
///
/// The chosen region becomes the session's pending question. When every region
/// has been answered correctly the pending question is cleared and
/// `Pick::Complete` is returned.
pub fn pick_next<R: Rng + ?Sized>(state: &mut SessionState, rng: &mut R) -> Pick {
    let target = {
        let remaining = state.remaining();
        if remaining.is_empty() {
            None
        } else {
            let index = rng.random_range(0..remaining.len());
            Some(remaining[index].clone())
        }
    };

    let Some(target) = target else {
        state.set_current_question(None);
        return Pick::Complete;
    };

    let choices = build_choices(state.regions(), &target, rng);
    state.set_current_question(Some(target.id().clone()));

    Pick::Question(Question {
        region_id: target.id().clone(),
        choices,
    })
}

/// The correct region plus up to `MAX_CHOICES - 1` distinct distractors, shuffled.
pub fn build_choices<R: Rng + ?Sized>(
    regions: &[Region],
    correct: &Region,
    rng: &mut R,
) -> Vec<Choice> {
    let mut distractors: Vec<&Region> = regions
        .iter()
        .filter(|region| region.id() != correct.id())
        .collect();
    distractors.shuffle(rng);
    distractors.truncate(MAX_CHOICES - 1);

    let mut choices: Vec<Choice> = Vec::with_capacity(distractors.len() + 1);
    choices.push(Choice::from(correct));
    choices.extend(distractors.into_iter().map(Choice::from));
    choices.shuffle(rng);
    choices
}
