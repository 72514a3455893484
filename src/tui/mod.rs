//! Terminal front end: ratatui rendering over crossterm, one key at a time.

pub mod draw;
pub mod keymap;
pub mod theme;

use std::collections::HashMap;
use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::app::{Mode, Notice, StudyApp};
use crate::catalog::DomainFilter;
use crate::error::StudyError;
use crate::progress::ProgressStore;
use crate::quiz::{QuizPhase, OPTION_COUNT};
use keymap::KeyAction;
use theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirm {
    ResetProgress,
    RestartQuiz,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub text: String,
    pub warning: bool,
}

pub struct TuiApp<S: ProgressStore> {
    pub study: StudyApp<S>,
    pub theme: Theme,
    pub keymap: HashMap<char, KeyAction>,
    pub search_active: bool,
    pub confirm: Option<Confirm>,
    pub status: Option<Status>,
}

impl<S: ProgressStore> TuiApp<S> {
    pub fn new(study: StudyApp<S>, theme: Theme, keymap: HashMap<char, KeyAction>) -> Self {
        Self {
            study,
            theme,
            keymap,
            search_active: false,
            confirm: None,
            status: None,
        }
    }

    fn notify(&mut self, notice: Notice) {
        self.status = Some(Status {
            text: notice.to_string(),
            warning: notice.is_warning(),
        });
    }

    fn report(&mut self, err: StudyError) {
        self.status = Some(Status {
            text: err.to_string(),
            warning: true,
        });
    }

    fn outcome(&mut self, res: Result<Notice, StudyError>) {
        match res {
            Ok(n) => self.notify(n),
            Err(e) => self.report(e),
        }
    }
}

pub fn run<S: ProgressStore>(app: &mut TuiApp<S>) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    res
}

fn run_app<B: ratatui::backend::Backend, S: ProgressStore>(
    terminal: &mut Terminal<B>,
    app: &mut TuiApp<S>,
) -> Result<()> {
    loop {
        terminal.draw(|f| draw::ui(f, app))?;
        if event::poll(Duration::from_millis(200))? {
            if let Event::Key(k) = event::read()? {
                if k.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key(app, k) {
                    break;
                }
            }
        }
    }
    Ok(())
}

/// Returns true when the user asked to quit.
pub fn handle_key<S: ProgressStore>(app: &mut TuiApp<S>, key: KeyEvent) -> bool {
    let KeyEvent {
        code, modifiers, ..
    } = key;

    if let Some(confirm) = app.confirm {
        handle_confirm(app, confirm, code);
        return false;
    }
    if app.search_active {
        handle_search(app, code);
        return false;
    }

    if modifiers.contains(KeyModifiers::CONTROL) {
        match code {
            KeyCode::Char('c') => return true,
            KeyCode::Char('r') if app.study.mode() == Mode::Study => {
                let n = app.study.shuffle();
                app.notify(n);
            }
            _ => {}
        }
        return false;
    }

    match code {
        KeyCode::Tab => {
            let next = app.study.mode().next();
            app.study.set_mode(next);
        }
        KeyCode::Esc => app.status = None,
        _ => {}
    }

    if app.study.mode() != Mode::Quiz {
        if let KeyCode::Char(ch @ '1'..='3') = code {
            app.study.set_mode(mode_for_digit(ch));
            return false;
        }
    }

    match app.study.mode() {
        Mode::Study => match code {
            KeyCode::Left => step_card(app, false),
            KeyCode::Right => step_card(app, true),
            KeyCode::Char(' ') => {
                let r = app.study.toggle_studied();
                app.outcome(r);
                return false;
            }
            _ => {}
        },
        Mode::Quiz => match code {
            KeyCode::Up => move_selection(app, false),
            KeyCode::Down => move_selection(app, true),
            KeyCode::Enter => quiz_enter(app),
            KeyCode::Char(ch @ '1'..='9') => {
                let idx = ch as usize - '1' as usize;
                if idx < OPTION_COUNT {
                    if let Err(e) = app.study.select_option(idx) {
                        app.report(e);
                    }
                }
                return false;
            }
            _ => {}
        },
        Mode::Review => {
            if code == KeyCode::Enter {
                let r = app.study.review_studied_items();
                app.outcome(r);
                return false;
            }
        }
    }

    if let KeyCode::Char(ch) = code {
        if let Some(action) = app.keymap.get(&ch).copied() {
            return apply_action(app, action);
        }
    }
    false
}

fn mode_for_digit(ch: char) -> Mode {
    match ch {
        '2' => Mode::Quiz,
        '3' => Mode::Review,
        _ => Mode::Study,
    }
}

fn handle_confirm<S: ProgressStore>(app: &mut TuiApp<S>, confirm: Confirm, code: KeyCode) {
    let answer = match code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => true,
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => false,
        _ => return,
    };
    app.confirm = None;
    match (confirm, answer) {
        (Confirm::ResetProgress, true) => {
            let n = app.study.reset_progress();
            app.notify(n);
        }
        (Confirm::ResetProgress, false) => {}
        (Confirm::RestartQuiz, true) => {
            let r = app.study.start_quiz();
            app.outcome(r);
        }
        (Confirm::RestartQuiz, false) => app.study.reset_quiz(),
    }
}

fn handle_search<S: ProgressStore>(app: &mut TuiApp<S>, code: KeyCode) {
    let mut query = app.study.query().to_string();
    match code {
        KeyCode::Enter => {
            app.search_active = false;
            return;
        }
        KeyCode::Esc => {
            app.search_active = false;
            query.clear();
        }
        KeyCode::Backspace => {
            query.pop();
        }
        KeyCode::Char(ch) => query.push(ch),
        _ => return,
    }
    let n = app.study.set_query(query);
    app.notify(n);
}

fn step_card<S: ProgressStore>(app: &mut TuiApp<S>, forward: bool) {
    let r = if forward {
        app.study.next_card()
    } else {
        app.study.prev_card()
    };
    if let Err(e) = r {
        app.report(e);
    }
}

fn move_selection<S: ProgressStore>(app: &mut TuiApp<S>, down: bool) {
    let n = app.study.quiz().options().len();
    if n == 0 || app.study.quiz().phase() != QuizPhase::Awaiting {
        return;
    }
    let next = match (app.study.quiz().selected(), down) {
        (None, true) => 0,
        (None, false) => n - 1,
        (Some(i), true) => (i + 1) % n,
        (Some(i), false) => (i + n - 1) % n,
    };
    if let Err(e) = app.study.select_option(next) {
        app.report(e);
    }
}

fn quiz_enter<S: ProgressStore>(app: &mut TuiApp<S>) {
    let r = match app.study.quiz().phase() {
        QuizPhase::NotStarted => app.study.start_quiz(),
        QuizPhase::Awaiting => app.study.submit_answer(),
        QuizPhase::Answered => app.study.next_question(),
        QuizPhase::Finished => return finish_quiz(app),
    };
    app.outcome(r);
}

fn finish_quiz<S: ProgressStore>(app: &mut TuiApp<S>) {
    match app.study.finish_quiz() {
        Ok(n) => {
            app.notify(n);
            app.confirm = Some(Confirm::RestartQuiz);
        }
        Err(e) => app.report(e),
    }
}

fn apply_action<S: ProgressStore>(app: &mut TuiApp<S>, action: KeyAction) -> bool {
    let study_only = matches!(
        action,
        KeyAction::NextCard | KeyAction::PrevCard | KeyAction::ToggleStudied | KeyAction::Shuffle
    );
    if study_only && app.study.mode() != Mode::Study {
        return false;
    }
    match action {
        KeyAction::NextCard => step_card(app, true),
        KeyAction::PrevCard => step_card(app, false),
        KeyAction::ToggleStudied => {
            let r = app.study.toggle_studied();
            app.outcome(r);
        }
        KeyAction::Shuffle => {
            let n = app.study.shuffle();
            app.notify(n);
        }
        KeyAction::ResetProgress => app.confirm = Some(Confirm::ResetProgress),
        KeyAction::Search => {
            app.study.set_mode(Mode::Study);
            app.search_active = true;
        }
        KeyAction::NextDomain => {
            let n = app.study.cycle_domain(true);
            app.notify(n);
        }
        KeyAction::PrevDomain => {
            let n = app.study.cycle_domain(false);
            app.notify(n);
        }
        KeyAction::ClearFilters => {
            app.study.set_query("");
            let n = app.study.set_domain(DomainFilter::All);
            app.notify(n);
        }
        KeyAction::StartQuiz => {
            let r = app.study.start_quiz();
            app.outcome(r);
        }
        KeyAction::NextQuestion => {
            let r = app.study.next_question();
            app.outcome(r);
        }
        KeyAction::FinishQuiz => finish_quiz(app),
        KeyAction::ReviewStudied => {
            let r = app.study.review_studied_items();
            app.outcome(r);
        }
        KeyAction::SwitchMode => {
            let next = app.study.mode().next();
            app.study.set_mode(next);
        }
        KeyAction::Quit => return true,
    }
    false
}
