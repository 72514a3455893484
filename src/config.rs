//! Where the data and the progress file live.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;

/// Environment variable naming the data directory.
pub const DATA_ENV: &str = "CISSP_STUDY_DATA";
pub const PROGRESS_FILE: &str = "progress.json";
pub const LOG_FILE: &str = "cissp-study.log";
pub const KEYMAP_FILE: &str = "keymap.toml";

pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "cissp-study")
}

/// `--data-dir`, then `$CISSP_STUDY_DATA`, then a `data/` directory holding
/// the first built-in collection in the current directory or an ancestor,
/// then plain `data`.
pub fn resolve_data_dir(explicit: Option<&Path>) -> PathBuf {
    resolve_data_dir_from(
        explicit,
        std::env::var(DATA_ENV).ok(),
        std::env::current_dir().ok(),
    )
}

pub fn resolve_data_dir_from(
    explicit: Option<&Path>,
    env: Option<String>,
    cwd: Option<PathBuf>,
) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }
    if let Some(p) = env.filter(|s| !s.trim().is_empty()) {
        return PathBuf::from(p);
    }
    let marker = crate::loader::DOMAIN_FILES[0].0;
    if let Some(cwd) = cwd {
        for anc in cwd.ancestors() {
            let candidate = anc.join("data");
            if candidate.join(marker).exists() {
                return candidate;
            }
        }
    }
    // may not exist; loading reports which files are missing
    PathBuf::from("data")
}

/// `--progress`, then the platform data directory, then beside the data.
pub fn resolve_progress_path(explicit: Option<&Path>, data_dir: &Path) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }
    match project_dirs() {
        Some(dirs) => dirs.data_dir().join(PROGRESS_FILE),
        None => data_dir.join(PROGRESS_FILE),
    }
}

/// Key map files, most specific first.
pub fn keymap_candidates() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(KEYMAP_FILE)];
    if let Some(dirs) = project_dirs() {
        paths.push(dirs.config_dir().join(KEYMAP_FILE));
    }
    paths
}
