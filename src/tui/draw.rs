use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, Paragraph, Wrap},
    Frame,
};
use regex::RegexBuilder;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::{Confirm, TuiApp};
use crate::app::Mode;
use crate::progress::ProgressStore;
use crate::quiz::{OptionMark, QuizPhase};

pub fn ui<S: ProgressStore>(f: &mut Frame, app: &TuiApp<S>) {
    let v = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(5),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(f.area());

    draw_header(f, v[0], app);
    match app.study.mode() {
        Mode::Study => draw_study(f, v[1], app),
        Mode::Quiz => draw_quiz(f, v[1], app),
        Mode::Review => draw_review(f, v[1], app),
    }
    draw_status(f, v[2], app);
    draw_footer(f, v[3], app);

    if let Some(confirm) = app.confirm {
        draw_confirm(f, app, confirm);
    }
}

fn draw_header<S: ProgressStore>(f: &mut Frame, area: Rect, app: &TuiApp<S>) {
    let th = app.theme;
    let bg = Block::default()
        .borders(Borders::NONE)
        .style(Style::default().bg(th.bar_bg));
    f.render_widget(bg, area);

    let progress = app.study.progress();
    let query = if app.search_active {
        format!("{}▏", app.study.query())
    } else {
        app.study.query().to_string()
    };
    let mut segs = vec![
        Span::styled(
            " CISSP Study ",
            Style::default().fg(th.accent).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("[{}]", app.study.mode().as_str()),
            Style::default().fg(th.warn).add_modifier(Modifier::BOLD),
        ),
        Span::styled(" | domain:", Style::default().fg(th.muted)),
        Span::styled(
            fit_width(app.study.domain().as_str(), 32),
            Style::default().fg(th.fg),
        ),
        Span::styled(" | search:", Style::default().fg(th.muted)),
        Span::styled(
            fit_width(&query, 24),
            Style::default().fg(if app.search_active { th.accent } else { th.fg }),
        ),
        Span::styled(" | studied:", Style::default().fg(th.muted)),
        Span::styled(
            format!("{}/{} ({}%)", progress.studied, progress.total, progress.percent),
            Style::default().fg(th.good),
        ),
    ];
    if app.study.persist_error().is_some() {
        segs.push(Span::styled(" | not saved", Style::default().fg(th.bad)));
    }
    f.render_widget(Paragraph::new(Line::from(segs)), area);
}

fn card_block<'a>(title: String, app_theme: &super::theme::Theme) -> Block<'a> {
    Block::default()
        .title(Span::styled(title, Style::default().fg(app_theme.accent)))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app_theme.muted))
}

fn draw_study<S: ProgressStore>(f: &mut Frame, area: Rect, app: &TuiApp<S>) {
    let th = app.theme;
    let Some(item) = app.study.current_item() else {
        let para = Paragraph::new(Line::from(Span::styled(
            "No matching items. Press [c] to clear filters.",
            Style::default().fg(th.muted),
        )))
        .block(card_block(" Study ".into(), &th));
        f.render_widget(para, area);
        return;
    };

    let (pos, len) = app.study.position().unwrap_or((0, 0));
    let studied = app.study.is_current_studied();
    let query = app.study.query();
    let base = Style::default().fg(th.fg);
    let hl = Style::default()
        .fg(th.bar_bg)
        .bg(th.warn)
        .add_modifier(Modifier::BOLD);

    let mut lines = vec![
        Line::from(vec![
            Span::styled(format!("{pos} / {len}"), Style::default().fg(th.muted)),
            Span::raw("  "),
            Span::styled(item.domain.clone(), Style::default().fg(th.info)),
            Span::raw("  "),
            if studied {
                Span::styled("✓ studied", Style::default().fg(th.good))
            } else {
                Span::styled("· not studied", Style::default().fg(th.muted))
            },
        ]),
        Line::from(""),
        highlight_line(&item.topic, query, base.add_modifier(Modifier::BOLD), hl),
        Line::from(""),
        highlight_line(&item.description, query, base, hl),
    ];
    if !item.reference.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("Reference: ", Style::default().fg(th.muted)),
            Span::styled(item.reference.clone(), Style::default().fg(th.muted)),
        ]));
    }

    let para = Paragraph::new(lines)
        .block(card_block(format!(" {} ", item.id), &th))
        .wrap(Wrap { trim: false });
    f.render_widget(para, area);
}

fn draw_quiz<S: ProgressStore>(f: &mut Frame, area: Rect, app: &TuiApp<S>) {
    let th = app.theme;
    let quiz = app.study.quiz();

    if quiz.phase() == QuizPhase::NotStarted {
        let mut lines = Vec::new();
        if let Some(report) = app.study.last_report() {
            lines.push(Line::from(Span::styled(
                format!("Last quiz: {report}"),
                Style::default().fg(th.good).add_modifier(Modifier::BOLD),
            )));
            for a in &report.answers {
                let (mark, color) = if a.correct { ("✓", th.good) } else { ("✗", th.bad) };
                lines.push(Line::from(vec![
                    Span::styled(format!(" {mark} "), Style::default().fg(color)),
                    Span::styled(a.question.topic.clone(), Style::default().fg(th.fg)),
                ]));
            }
            lines.push(Line::from(""));
        }
        lines.push(Line::from(Span::styled(
            format!(
                "Press [Enter] to start a quiz on the {} items in view.",
                app.study.view_len()
            ),
            Style::default().fg(th.muted),
        )));
        let para = Paragraph::new(lines)
            .block(card_block(" Quiz ".into(), &th))
            .wrap(Wrap { trim: false });
        f.render_widget(para, area);
        return;
    }

    let v = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(area);

    let gauge = Gauge::default()
        .block(card_block(" Progress ".into(), &th))
        .gauge_style(Style::default().fg(th.accent).bg(th.bar_bg))
        .percent(quiz.progress_percent().min(100) as u16)
        .label(format!(
            "Question {} of {}  ·  score {}",
            quiz.question_number(),
            quiz.question_count(),
            quiz.score()
        ));
    f.render_widget(gauge, v[0]);

    let mut lines = Vec::new();
    match quiz.phase() {
        QuizPhase::Finished => {
            lines.push(Line::from(Span::styled(
                format!(
                    "All questions answered: {}/{} correct.",
                    quiz.score(),
                    quiz.question_count()
                ),
                Style::default().fg(th.good).add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(Span::styled(
                "Press [Enter] to see your score.",
                Style::default().fg(th.muted),
            )));
        }
        _ => {
            if let Some(text) = quiz.question_text() {
                lines.push(Line::from(Span::styled(
                    text,
                    Style::default().fg(th.fg).add_modifier(Modifier::BOLD),
                )));
                lines.push(Line::from(""));
            }
            for (i, opt) in quiz.options().iter().enumerate() {
                let selected = quiz.selected() == Some(i);
                let (prefix, style) = match opt.mark {
                    Some(OptionMark::Correct) => ("✓", Style::default().fg(th.good)),
                    Some(OptionMark::Wrong) => ("✗", Style::default().fg(th.bad)),
                    None if selected => (
                        "▸",
                        Style::default().fg(th.fg).bg(th.selection_bg),
                    ),
                    None => (" ", Style::default().fg(th.fg)),
                };
                lines.push(Line::from(vec![
                    Span::styled(format!("{prefix} {}. ", i + 1), style),
                    Span::styled(opt.text.clone(), style),
                ]));
            }
            if quiz.phase() == QuizPhase::Answered {
                if let Some(q) = quiz.current_question() {
                    lines.push(Line::from(""));
                    lines.push(Line::from(vec![
                        Span::styled("Answer: ", Style::default().fg(th.info)),
                        Span::styled(q.description.clone(), Style::default().fg(th.fg)),
                    ]));
                    if !q.reference.is_empty() {
                        lines.push(Line::from(Span::styled(
                            format!("Reference: {}", q.reference),
                            Style::default().fg(th.muted),
                        )));
                    }
                }
            }
        }
    }
    let para = Paragraph::new(lines)
        .block(card_block(" Question ".into(), &th))
        .wrap(Wrap { trim: false });
    f.render_widget(para, v[1]);
}

fn draw_review<S: ProgressStore>(f: &mut Frame, area: Rect, app: &TuiApp<S>) {
    let th = app.theme;
    let progress = app.study.progress();
    let v = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(area);

    let gauge = Gauge::default()
        .block(card_block(" Study progress ".into(), &th))
        .gauge_style(Style::default().fg(th.good).bg(th.bar_bg))
        .percent(progress.percent.min(100) as u16)
        .label(format!(
            "{} of {} studied ({}%)",
            progress.studied, progress.total, progress.percent
        ));
    f.render_widget(gauge, v[0]);

    let mut lines = Vec::new();
    for domain in app.study.domains() {
        let (studied, total) = app
            .study
            .catalog()
            .items()
            .iter()
            .filter(|i| i.domain == domain)
            .fold((0, 0), |(s, t), i| {
                (s + usize::from(app.study.studied().contains(&i.id)), t + 1)
            });
        lines.push(Line::from(vec![
            Span::styled(format!("{studied:>4}/{total:<4} "), Style::default().fg(th.good)),
            Span::styled(domain, Style::default().fg(th.fg)),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Press [Enter] to review studied items.",
        Style::default().fg(th.muted),
    )));
    let para = Paragraph::new(lines)
        .block(card_block(" Review ".into(), &th))
        .wrap(Wrap { trim: false });
    f.render_widget(para, v[1]);
}

fn draw_status<S: ProgressStore>(f: &mut Frame, area: Rect, app: &TuiApp<S>) {
    let th = app.theme;
    let Some(status) = app.status.as_ref() else {
        return;
    };
    let color = if status.warning { th.warn } else { th.good };
    let line = Line::from(Span::styled(
        fit_width(&format!(" {}", status.text), area.width as usize),
        Style::default().fg(color),
    ));
    f.render_widget(Paragraph::new(line), area);
}

fn draw_footer<S: ProgressStore>(f: &mut Frame, area: Rect, app: &TuiApp<S>) {
    let th = app.theme;
    let bg = Block::default()
        .borders(Borders::NONE)
        .style(Style::default().bg(th.bar_bg));
    f.render_widget(bg, area);
    let tips = match app.study.mode() {
        _ if app.search_active => " type to search  [Enter] keep  [Esc] clear ",
        Mode::Study => {
            " [q]quit  [Tab]mode  [←/→]card  [Space]studied  [Ctrl+R]shuffle  [/]search  [d/D]domain  [c]clear  [X]reset "
        }
        Mode::Quiz => " [q]quit  [Tab]mode  [↑/↓/1-4]choose  [Enter]submit/next  [f]finish ",
        Mode::Review => " [q]quit  [Tab]mode  [Enter]review studied  [X]reset ",
    };
    let help = Paragraph::new(Line::from(Span::styled(
        fit_width(tips, area.width as usize),
        Style::default().fg(th.muted),
    )))
    .style(Style::default().bg(th.bar_bg));
    f.render_widget(help, area);
}

fn draw_confirm<S: ProgressStore>(f: &mut Frame, app: &TuiApp<S>, confirm: Confirm) {
    let th = app.theme;
    let (title, body) = match confirm {
        Confirm::ResetProgress => (
            " Reset progress ",
            "Clear every studied mark? This cannot be undone.".to_string(),
        ),
        Confirm::RestartQuiz => (
            " Quiz complete ",
            match app.study.last_report() {
                Some(r) => format!("Score: {r}. Start another quiz?"),
                None => "Start another quiz?".to_string(),
            },
        ),
    };
    let area = centered_rect(50, 30, f.area());
    f.render_widget(Clear, area);
    let para = Paragraph::new(vec![
        Line::from(Span::styled(body, Style::default().fg(th.fg))),
        Line::from(""),
        Line::from(Span::styled("[y] yes   [n] no", Style::default().fg(th.muted))),
    ])
    .block(
        Block::default()
            .title(Span::styled(title, Style::default().fg(th.warn)))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(th.warn)),
    )
    .wrap(Wrap { trim: false });
    f.render_widget(para, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);
    let horiz = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vert[1]);
    horiz[1]
}

/// Splits `text` into spans, styling every case-insensitive occurrence of
/// `query` with `hl`. A blank query highlights nothing.
pub fn highlight_line(text: &str, query: &str, base: Style, hl: Style) -> Line<'static> {
    if query.trim().is_empty() {
        return Line::from(Span::styled(text.to_string(), base));
    }
    let Ok(re) = RegexBuilder::new(&regex::escape(query))
        .case_insensitive(true)
        .build()
    else {
        return Line::from(Span::styled(text.to_string(), base));
    };
    let mut spans = Vec::new();
    let mut last = 0;
    for m in re.find_iter(text) {
        if m.start() > last {
            spans.push(Span::styled(text[last..m.start()].to_string(), base));
        }
        spans.push(Span::styled(m.as_str().to_string(), hl));
        last = m.end();
    }
    if last < text.len() {
        spans.push(Span::styled(text[last..].to_string(), base));
    }
    Line::from(spans)
}

/// Truncates to at most `max` terminal columns, ending in `…` when cut.
pub fn fit_width(s: &str, max: usize) -> String {
    if UnicodeWidthStr::width(s) <= max {
        return s.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut w = 0;
    for ch in s.chars() {
        let cw = UnicodeWidthChar::width(ch).unwrap_or(0);
        if w + cw + 1 > max {
            break;
        }
        out.push(ch);
        w += cw;
    }
    out.push('…');
    out
}
