//! CISSP study deck: a catalog of study items grouped by domain, a
//! navigator over the filtered view, multiple-choice quizzes and persisted
//! "studied" flags, with a terminal front end.

pub mod app;
pub mod catalog;
pub mod config;
pub mod error;
pub mod loader;
pub mod navigator;
pub mod progress;
pub mod quiz;
pub mod sample;
pub mod tui;

pub use app::{Mode, Notice, StudyApp};
pub use catalog::{Catalog, DomainFilter, ItemId, StudyItem};
pub use error::{LoadError, StudyError};
pub use loader::{default_sources, load_all, CatalogSource};
pub use progress::{JsonProgressStore, MemoryProgressStore, ProgressStore, StudiedSet};
pub use sample::{study_rng, StudyRng};
