use geoquiz_core::model::{CompletionSummary, RegionId};
use geoquiz_core::picker::Question;
use geoquiz_core::score::{format_accuracy, format_duration, progress_percent};
use services::{AnswerFeedback, PresentationPort};

/// Prints the game to stdout. Input is read by the play loop in `main`.
#[derive(Debug, Default)]
pub struct TerminalPresentation;

impl PresentationPort for TerminalPresentation {
    fn on_question(&self, prompt: &str, question: &Question) {
        println!();
        println!("{prompt}");
        for (i, choice) in question.choices().iter().enumerate() {
            println!("  {}) {}", i + 1, choice.name);
        }
    }

    fn on_progress(&self, correct: usize, total: usize) {
        println!(
            "Progress: {correct}/{total} ({:.0}%)",
            progress_percent(correct, total)
        );
    }

    fn on_mistake_count_changed(&self, mistakes: u32) {
        if mistakes > 0 {
            println!("Mistakes: {mistakes}");
        }
    }

    fn on_answer_feedback(&self, feedback: &AnswerFeedback) {
        if feedback.is_correct {
            println!("Correct! That was {}.", feedback.correct_region.name());
        } else {
            println!("Wrong. That was {}.", feedback.correct_region.name());
        }
    }

    fn on_complete(&self, summary: &CompletionSummary) {
        println!();
        println!("{}", summary.headline());
        println!("{}", summary.subtitle());
        println!(
            "  Accuracy: {}",
            format_accuracy(summary.total_questions(), summary.mistakes())
        );
        println!("  Mistakes: {}", summary.mistakes());
        println!("  Time:     {}", format_duration(summary.duration_ms()));
    }

    fn on_final_review(&self, incorrect: &[RegionId]) {
        if incorrect.is_empty() {
            return;
        }
        let ids: Vec<&str> = incorrect.iter().map(RegionId::as_str).collect();
        println!("  Missed at least once: {}", ids.join(", "));
    }
}

/// What the player typed at a question prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionInput {
    Choice(RegionId),
    Quit,
    Invalid,
}

/// Map a line of input to one of the offered choices (numbered from 1).
pub fn parse_choice(line: &str, question: &Question) -> QuestionInput {
    let line = line.trim();
    if line.eq_ignore_ascii_case("q") || line.eq_ignore_ascii_case("quit") {
        return QuestionInput::Quit;
    }
    line.parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| question.choices().get(i))
        .map_or(QuestionInput::Invalid, |choice| {
            QuestionInput::Choice(choice.id.clone())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoquiz_core::model::{Region, SessionState};
    use geoquiz_core::picker::{Pick, pick_next};
    use geoquiz_core::time::fixed_now;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn question() -> Question {
        let regions = vec![
            Region::new("A", "Alpha").unwrap(),
            Region::new("B", "Beta").unwrap(),
        ];
        let mut state = SessionState::initialize(regions, fixed_now()).unwrap();
        match pick_next(&mut state, &mut StdRng::seed_from_u64(3)) {
            Pick::Question(q) => q,
            Pick::Complete => panic!("expected a question"),
        }
    }

    #[test]
    fn numbers_select_offered_choices() {
        let q = question();
        assert_eq!(
            parse_choice(" 2 \n", &q),
            QuestionInput::Choice(q.choices()[1].id.clone())
        );
        assert_eq!(parse_choice("0", &q), QuestionInput::Invalid);
        assert_eq!(parse_choice("3", &q), QuestionInput::Invalid);
        assert_eq!(parse_choice("Alpha", &q), QuestionInput::Invalid);
        assert_eq!(parse_choice("Q", &q), QuestionInput::Quit);
    }
}
