//! Multiple-choice quizzes drawn from the active view.
//!
//! A session walks `Awaiting -> Answered -> Awaiting -> ... -> Finished`.
//! Each question's options are built when the question becomes current: the
//! question item's own description plus distractors taken from *other*
//! catalog items, across every domain.

use std::fmt;

use log::debug;
use rand::Rng;

use crate::catalog::{Catalog, ItemId, StudyItem};
use crate::error::QuizError;
use crate::progress::percent;
use crate::sample;

pub const MAX_QUESTIONS: usize = 10;
pub const OPTION_COUNT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionMark {
    Correct,
    Wrong,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizOption {
    pub text: String,
    /// Item the text was taken from.
    pub source: ItemId,
    /// Fixed at generation time; never re-derived from `text`.
    pub correct: bool,
    pub mark: Option<OptionMark>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerRecord {
    pub question: StudyItem,
    pub selected_text: String,
    pub correct: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    NotStarted,
    Awaiting,
    Answered,
    Finished,
}

impl QuizPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not started",
            Self::Awaiting => "awaiting an answer",
            Self::Answered => "answered",
            Self::Finished => "finished",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizReport {
    pub score: usize,
    pub question_count: usize,
    pub percent: u32,
    pub answers: Vec<AnswerRecord>,
}

impl fmt::Display for QuizReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} ({}%)", self.score, self.question_count, self.percent)
    }
}

pub fn question_text(item: &StudyItem) -> String {
    format!("Which of the following best describes \"{}\"?", item.topic)
}

/// One correct option plus up to three distractors drawn uniformly, without
/// replacement, from every other item in `catalog`, in random order.
pub fn generate_options<R: Rng + ?Sized>(
    correct: &StudyItem,
    catalog: &[StudyItem],
    rng: &mut R,
) -> Vec<QuizOption> {
    let others: Vec<&StudyItem> = catalog.iter().filter(|i| i.id != correct.id).collect();
    let mut options = vec![QuizOption {
        text: correct.description.clone(),
        source: correct.id.clone(),
        correct: true,
        mark: None,
    }];
    options.extend(
        sample::sample(&others, OPTION_COUNT - 1, rng)
            .into_iter()
            .map(|item| QuizOption {
                text: item.description.clone(),
                source: item.id.clone(),
                correct: false,
                mark: None,
            }),
    );
    sample::shuffle(&mut options, rng);
    options
}

#[derive(Debug, Clone)]
struct QuizSession {
    questions: Vec<StudyItem>,
    cursor: usize,
    score: usize,
    answers: Vec<AnswerRecord>,
    options: Vec<QuizOption>,
    selected: Option<usize>,
    phase: QuizPhase,
}

impl QuizSession {
    fn load_options<R: Rng + ?Sized>(&mut self, catalog: &Catalog, rng: &mut R) {
        self.options = generate_options(&self.questions[self.cursor], catalog.items(), rng);
        self.selected = None;
        self.phase = QuizPhase::Awaiting;
    }

    fn report(&self) -> QuizReport {
        QuizReport {
            score: self.score,
            question_count: self.questions.len(),
            percent: percent(self.score, self.questions.len()),
            answers: self.answers.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct QuizEngine {
    session: Option<QuizSession>,
}

impl QuizEngine {
    pub fn phase(&self) -> QuizPhase {
        self.session
            .as_ref()
            .map_or(QuizPhase::NotStarted, |s| s.phase)
    }

    /// Draws `min(10, pool.len())` questions from `pool` (catalog indices)
    /// and replaces any running session.
    pub fn start<R: Rng + ?Sized>(
        &mut self,
        catalog: &Catalog,
        pool: &[usize],
        rng: &mut R,
    ) -> Result<usize, QuizError> {
        if pool.is_empty() {
            return Err(QuizError::EmptyPool);
        }
        let questions: Vec<StudyItem> = sample::sample(pool, MAX_QUESTIONS, rng)
            .into_iter()
            .filter_map(|idx| catalog.get(idx).cloned())
            .collect();
        if questions.is_empty() {
            return Err(QuizError::EmptyPool);
        }
        let count = questions.len();
        let mut session = QuizSession {
            questions,
            cursor: 0,
            score: 0,
            answers: Vec::new(),
            options: Vec::new(),
            selected: None,
            phase: QuizPhase::Awaiting,
        };
        session.load_options(catalog, rng);
        self.session = Some(session);
        debug!("quiz started with {} questions", count);
        Ok(count)
    }

    fn active(&self) -> Option<&QuizSession> {
        self.session
            .as_ref()
            .filter(|s| matches!(s.phase, QuizPhase::Awaiting | QuizPhase::Answered))
    }

    pub fn current_question(&self) -> Option<&StudyItem> {
        self.active().map(|s| &s.questions[s.cursor])
    }

    pub fn question_text(&self) -> Option<String> {
        self.current_question().map(question_text)
    }

    pub fn options(&self) -> &[QuizOption] {
        self.active().map(|s| s.options.as_slice()).unwrap_or(&[])
    }

    pub fn selected(&self) -> Option<usize> {
        self.active().and_then(|s| s.selected)
    }

    pub fn score(&self) -> usize {
        self.session.as_ref().map_or(0, |s| s.score)
    }

    pub fn question_count(&self) -> usize {
        self.session.as_ref().map_or(0, |s| s.questions.len())
    }

    /// 1-based number of the current question.
    pub fn question_number(&self) -> usize {
        self.session
            .as_ref()
            .map_or(0, |s| (s.cursor + 1).min(s.questions.len()))
    }

    pub fn is_last_question(&self) -> bool {
        self.session
            .as_ref()
            .map_or(false, |s| s.cursor + 1 >= s.questions.len())
    }

    pub fn answers(&self) -> &[AnswerRecord] {
        self.session
            .as_ref()
            .map(|s| s.answers.as_slice())
            .unwrap_or(&[])
    }

    pub fn score_percent(&self) -> u32 {
        percent(self.score(), self.question_count())
    }

    pub fn progress_percent(&self) -> u32 {
        percent(self.question_number(), self.question_count())
    }

    pub fn select_option(&mut self, index: usize) -> Result<(), QuizError> {
        let session = self.session.as_mut().ok_or(QuizError::NotStarted)?;
        if session.phase != QuizPhase::Awaiting {
            return Err(QuizError::InvalidTransition {
                action: "select an option",
                phase: session.phase.as_str(),
            });
        }
        if index >= session.options.len() {
            return Err(QuizError::InvalidOption(index));
        }
        session.selected = Some(index);
        Ok(())
    }

    /// Grades the selected option. Returns whether it was correct.
    pub fn submit_answer(&mut self) -> Result<bool, QuizError> {
        let session = self.session.as_mut().ok_or(QuizError::NotStarted)?;
        if session.phase != QuizPhase::Awaiting {
            return Err(QuizError::InvalidTransition {
                action: "submit an answer",
                phase: session.phase.as_str(),
            });
        }
        let selected = session.selected.ok_or(QuizError::NoSelection)?;
        let correct = session.options[selected].correct;
        if correct {
            session.score += 1;
            session.options[selected].mark = Some(OptionMark::Correct);
        } else {
            session.options[selected].mark = Some(OptionMark::Wrong);
            for option in session.options.iter_mut().filter(|o| o.correct) {
                option.mark = Some(OptionMark::Correct);
            }
        }
        session.answers.push(AnswerRecord {
            question: session.questions[session.cursor].clone(),
            selected_text: session.options[selected].text.clone(),
            correct,
        });
        session.phase = QuizPhase::Answered;
        debug!(
            "question {} answered, correct={}, score={}",
            session.cursor + 1,
            correct,
            session.score
        );
        Ok(correct)
    }

    /// Moves past an answered question. Returns the new phase.
    pub fn advance<R: Rng + ?Sized>(
        &mut self,
        catalog: &Catalog,
        rng: &mut R,
    ) -> Result<QuizPhase, QuizError> {
        let session = self.session.as_mut().ok_or(QuizError::NotStarted)?;
        if session.phase != QuizPhase::Answered {
            return Err(QuizError::InvalidTransition {
                action: "move to the next question",
                phase: session.phase.as_str(),
            });
        }
        session.cursor += 1;
        if session.cursor >= session.questions.len() {
            session.phase = QuizPhase::Finished;
            session.options.clear();
            session.selected = None;
        } else {
            session.load_options(catalog, rng);
        }
        Ok(session.phase)
    }

    /// Drops any session without producing a report.
    pub fn reset(&mut self) {
        if self.session.take().is_some() {
            debug!("quiz abandoned");
        }
    }

    /// Ends the session, early if need be, and hands back the tally.
    pub fn finish(&mut self) -> Result<QuizReport, QuizError> {
        let session = self.session.take().ok_or(QuizError::NotStarted)?;
        let report = session.report();
        debug!("quiz finished: {}", report);
        Ok(report)
    }
}
