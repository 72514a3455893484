// Single-character bindings, overridable through keymap.toml:
//
//   [keys]
//   "j" = "next_card"
//   "k" = "prev_card"

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    NextCard,
    PrevCard,
    ToggleStudied,
    Shuffle,
    ResetProgress,
    Search,
    NextDomain,
    PrevDomain,
    ClearFilters,
    StartQuiz,
    NextQuestion,
    FinishQuiz,
    ReviewStudied,
    SwitchMode,
    Quit,
}

#[derive(Deserialize)]
struct KeyMapToml {
    keys: HashMap<String, String>,
}

/// First readable file among `paths`; `Ok(None)` when none exists.
pub fn load_keymap(paths: &[PathBuf]) -> Result<Option<HashMap<char, KeyAction>>> {
    for p in paths {
        if p.exists() {
            let content = fs::read_to_string(p)
                .with_context(|| format!("failed to read key map {}", p.display()))?;
            let km: KeyMapToml = toml::from_str(&content)
                .with_context(|| format!("failed to parse key map {}", p.display()))?;
            return Ok(Some(parse_keymap(km.keys)));
        }
    }
    Ok(None)
}

/// User bindings layered over the defaults. Entries that are not a single
/// character or name no known action are skipped.
pub fn parse_keymap(map: HashMap<String, String>) -> HashMap<char, KeyAction> {
    let mut out = default_keymap();
    for (k, v) in map {
        let mut chars = k.chars();
        if let (Some(ch), None) = (chars.next(), chars.next()) {
            if let Some(act) = action_from_str(&v) {
                out.insert(ch, act);
            }
        }
    }
    out
}

pub fn action_from_str(s: &str) -> Option<KeyAction> {
    use KeyAction::*;
    Some(match s {
        "next_card" => NextCard,
        "prev_card" => PrevCard,
        "toggle_studied" => ToggleStudied,
        "shuffle" => Shuffle,
        "reset_progress" => ResetProgress,
        "search" => Search,
        "next_domain" => NextDomain,
        "prev_domain" => PrevDomain,
        "clear_filters" => ClearFilters,
        "start_quiz" => StartQuiz,
        "next_question" => NextQuestion,
        "finish_quiz" => FinishQuiz,
        "review_studied" => ReviewStudied,
        "switch_mode" => SwitchMode,
        "quit" => Quit,
        _ => return None,
    })
}

pub fn default_keymap() -> HashMap<char, KeyAction> {
    use KeyAction::*;
    let mut m = HashMap::new();
    m.insert('l', NextCard);
    m.insert('h', PrevCard);
    m.insert('m', ToggleStudied);
    m.insert('s', Shuffle);
    m.insert('X', ResetProgress);
    m.insert('/', Search);
    m.insert('d', NextDomain);
    m.insert('D', PrevDomain);
    m.insert('c', ClearFilters);
    m.insert('S', StartQuiz);
    m.insert('n', NextQuestion);
    m.insert('f', FinishQuiz);
    m.insert('r', ReviewStudied);
    m.insert('q', Quit);
    m
}
