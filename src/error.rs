use std::path::PathBuf;

use thiserror::Error;

/// A single catalog source that could not be read or parsed.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("failed to read {label} ({path}): {source}")]
    Read {
        label: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {label} ({path}): {source}")]
    Parse {
        label: String,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Startup failure. No partial catalog is ever exposed.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("{} catalog source(s) failed to load: {}", .0.len(), join_sources(.0))]
    Sources(Vec<SourceError>),

    #[error("duplicate item id {id} (in {first_domain} and {second_domain})")]
    DuplicateId {
        id: String,
        first_domain: String,
        second_domain: String,
    },

    #[error("no catalog sources configured")]
    NoSources,
}

fn join_sources(errors: &[SourceError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("progress file IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("progress file JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NavError {
    #[error("no items match the current filters")]
    EmptyView,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuizError {
    #[error("cannot start a quiz: no items match the current filters")]
    EmptyPool,

    #[error("select an answer first")]
    NoSelection,

    #[error("option {0} does not exist")]
    InvalidOption(usize),

    #[error("cannot {action} while the quiz is {phase}")]
    InvalidTransition {
        action: &'static str,
        phase: &'static str,
    },

    #[error("no quiz is running")]
    NotStarted,
}

/// Recoverable errors surfaced by the controller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StudyError {
    #[error(transparent)]
    Nav(#[from] NavError),

    #[error(transparent)]
    Quiz(#[from] QuizError),

    #[error("no studied items yet")]
    NoStudiedItems,
}
