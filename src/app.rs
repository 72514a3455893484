//! Application state and the actions a learner can take.
//!
//! `StudyApp` owns the catalog, the filters, the navigator, the quiz engine,
//! the random source and the progress store. Each action runs to completion
//! and reports what happened as a [`Notice`] for the presentation layer.

use std::fmt;

use log::{info, warn};

use crate::catalog::{Catalog, DomainFilter, ItemId, StudyItem};
use crate::error::StudyError;
use crate::navigator::Navigator;
use crate::progress::{ProgressStore, ProgressSummary, StudiedSet};
use crate::quiz::{QuizEngine, QuizPhase, QuizReport};
use crate::sample::StudyRng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Study,
    Quiz,
    Review,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Study => "Study",
            Self::Quiz => "Quiz",
            Self::Review => "Review",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Study => Self::Quiz,
            Self::Quiz => Self::Review,
            Self::Review => Self::Study,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    StudiedToggled {
        id: ItemId,
        studied: bool,
        persisted: bool,
    },
    Shuffled,
    ProgressReset {
        persisted: bool,
    },
    FiltersApplied {
        matches: usize,
    },
    ReviewLoaded {
        count: usize,
    },
    QuizStarted {
        questions: usize,
    },
    AnswerSubmitted {
        correct: bool,
    },
    NextQuestion {
        number: usize,
    },
    QuizComplete,
    QuizFinished(QuizReport),
}

impl Notice {
    /// Notices the presentation layer should show as warnings.
    pub fn is_warning(&self) -> bool {
        match self {
            Self::StudiedToggled {
                studied, persisted, ..
            } => !studied || !persisted,
            Self::ProgressReset { .. } => true,
            Self::FiltersApplied { matches } => *matches == 0,
            Self::AnswerSubmitted { correct } => !correct,
            _ => false,
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StudiedToggled {
                studied, persisted, ..
            } => {
                if *studied {
                    write!(f, "Marked as studied")?;
                } else {
                    write!(f, "Studied mark removed")?;
                }
                if !persisted {
                    write!(f, " (progress could not be saved)")?;
                }
                Ok(())
            }
            Self::Shuffled => write!(f, "Cards shuffled"),
            Self::ProgressReset { persisted } => {
                write!(f, "Study progress reset")?;
                if !persisted {
                    write!(f, " (progress could not be saved)")?;
                }
                Ok(())
            }
            Self::FiltersApplied { matches: 0 } => write!(f, "No matching items"),
            Self::FiltersApplied { matches } => write!(f, "{matches} matching items"),
            Self::ReviewLoaded { count } => write!(f, "Loaded {count} studied items"),
            Self::QuizStarted { questions } => write!(f, "Quiz started: {questions} questions"),
            Self::AnswerSubmitted { correct: true } => write!(f, "Correct!"),
            Self::AnswerSubmitted { correct: false } => write!(f, "Wrong answer"),
            Self::NextQuestion { number } => write!(f, "Question {number}"),
            Self::QuizComplete => write!(f, "Last question answered, finish to see your score"),
            Self::QuizFinished(report) => write!(f, "Quiz complete! Score: {report}"),
        }
    }
}

pub struct StudyApp<S: ProgressStore> {
    catalog: Catalog,
    query: String,
    domain: DomainFilter,
    nav: Navigator,
    quiz: QuizEngine,
    rng: StudyRng,
    store: S,
    mode: Mode,
    last_report: Option<QuizReport>,
    persist_error: Option<String>,
}

impl<S: ProgressStore> StudyApp<S> {
    pub fn new(catalog: Catalog, store: S, rng: StudyRng) -> Self {
        let studied = store.load_studied();
        info!(
            "{} items in catalog, {} marked studied",
            catalog.len(),
            studied.len()
        );
        let view = catalog.apply_filters("", &DomainFilter::All);
        Self {
            catalog,
            query: String::new(),
            domain: DomainFilter::All,
            nav: Navigator::new(view, studied),
            quiz: QuizEngine::default(),
            rng,
            store,
            mode: Mode::Study,
            last_report: None,
            persist_error: None,
        }
    }

    // ---- read accessors ----

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn domain(&self) -> &DomainFilter {
        &self.domain
    }

    pub fn domains(&self) -> Vec<String> {
        self.catalog.domains()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    pub fn current_item(&self) -> Option<&StudyItem> {
        self.nav.current().and_then(|idx| self.catalog.get(idx))
    }

    /// 1-based position and size of the active view.
    pub fn position(&self) -> Option<(usize, usize)> {
        self.nav.position()
    }

    pub fn view_len(&self) -> usize {
        self.nav.view().len()
    }

    pub fn is_current_studied(&self) -> bool {
        self.nav.is_current_studied(&self.catalog)
    }

    pub fn studied(&self) -> &StudiedSet {
        self.nav.studied()
    }

    pub fn progress(&self) -> ProgressSummary {
        self.catalog.progress(self.nav.studied())
    }

    pub fn quiz(&self) -> &QuizEngine {
        &self.quiz
    }

    pub fn last_report(&self) -> Option<&QuizReport> {
        self.last_report.as_ref()
    }

    pub fn persist_error(&self) -> Option<&str> {
        self.persist_error.as_deref()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ---- filtering ----

    pub fn set_query(&mut self, query: impl Into<String>) -> Notice {
        self.query = query.into();
        self.refilter()
    }

    pub fn set_domain(&mut self, domain: DomainFilter) -> Notice {
        self.domain = domain;
        self.refilter()
    }

    /// Steps through "all" and then each domain in catalog order.
    pub fn cycle_domain(&mut self, forward: bool) -> Notice {
        let mut choices = vec![DomainFilter::All];
        choices.extend(self.catalog.domains().into_iter().map(DomainFilter::Only));
        let at = choices.iter().position(|d| d == &self.domain).unwrap_or(0);
        let next = if forward {
            (at + 1) % choices.len()
        } else {
            (at + choices.len() - 1) % choices.len()
        };
        self.set_domain(choices.swap_remove(next))
    }

    fn refilter(&mut self) -> Notice {
        let view = self.catalog.apply_filters(&self.query, &self.domain);
        let matches = view.len();
        self.nav.replace_view(view);
        Notice::FiltersApplied { matches }
    }

    // ---- study ----

    pub fn next_card(&mut self) -> Result<usize, StudyError> {
        Ok(self.nav.advance()?)
    }

    pub fn prev_card(&mut self) -> Result<usize, StudyError> {
        Ok(self.nav.retreat()?)
    }

    pub fn shuffle(&mut self) -> Notice {
        self.nav.shuffle(&mut self.rng);
        Notice::Shuffled
    }

    /// Flips the current item's studied flag and saves the set. A failed
    /// save is reported but the in-memory flag stands.
    pub fn toggle_studied(&mut self) -> Result<Notice, StudyError> {
        let (id, studied) = self.nav.toggle_studied(&self.catalog)?;
        let persisted = self.persist();
        Ok(Notice::StudiedToggled {
            id,
            studied,
            persisted,
        })
    }

    /// Irreversible. The caller confirms first.
    pub fn reset_progress(&mut self) -> Notice {
        self.nav.reset_progress();
        let persisted = self.persist();
        Notice::ProgressReset { persisted }
    }

    /// Loads the studied items, in catalog order, into the study view.
    pub fn review_studied_items(&mut self) -> Result<Notice, StudyError> {
        let view = self.catalog.studied_view(self.nav.studied());
        if view.is_empty() {
            return Err(StudyError::NoStudiedItems);
        }
        let count = view.len();
        self.nav.replace_view(view);
        self.mode = Mode::Study;
        Ok(Notice::ReviewLoaded { count })
    }

    fn persist(&mut self) -> bool {
        match self.store.save_studied(self.nav.studied()) {
            Ok(()) => {
                self.persist_error = None;
                true
            }
            Err(e) => {
                warn!("failed to save study progress: {}", e);
                self.persist_error = Some(e.to_string());
                false
            }
        }
    }

    // ---- quiz ----

    /// Samples questions from the current study view.
    pub fn start_quiz(&mut self) -> Result<Notice, StudyError> {
        let questions = self
            .quiz
            .start(&self.catalog, self.nav.view(), &mut self.rng)?;
        self.last_report = None;
        self.mode = Mode::Quiz;
        Ok(Notice::QuizStarted { questions })
    }

    pub fn select_option(&mut self, index: usize) -> Result<(), StudyError> {
        Ok(self.quiz.select_option(index)?)
    }

    pub fn submit_answer(&mut self) -> Result<Notice, StudyError> {
        let correct = self.quiz.submit_answer()?;
        Ok(Notice::AnswerSubmitted { correct })
    }

    pub fn next_question(&mut self) -> Result<Notice, StudyError> {
        match self.quiz.advance(&self.catalog, &mut self.rng)? {
            QuizPhase::Finished => Ok(Notice::QuizComplete),
            _ => Ok(Notice::NextQuestion {
                number: self.quiz.question_number(),
            }),
        }
    }

    /// Ends the running quiz (early, if need be) and keeps its report.
    pub fn finish_quiz(&mut self) -> Result<Notice, StudyError> {
        let report = self.quiz.finish()?;
        self.last_report = Some(report.clone());
        Ok(Notice::QuizFinished(report))
    }

    /// Back to idle: drops any running session and the last report.
    pub fn reset_quiz(&mut self) {
        self.quiz.reset();
        self.last_report = None;
    }
}
