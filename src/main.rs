// cissp-study: terminal flashcards and quizzes over the CISSP domain collections.
// - loads every collection under the data directory (or the given --source files)
// - study view with search, domain filter, shuffle and studied marks
// - 10-question multiple-choice quizzes drawn from the current view
// - studied marks are written back to progress.json

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};

use cissp_study::config::{self, LOG_FILE};
use cissp_study::loader::{default_sources, load_all, CatalogSource};
use cissp_study::progress::{JsonProgressStore, ProgressStore};
use cissp_study::sample::study_rng;
use cissp_study::tui::{self, keymap, theme};
use cissp_study::{Catalog, DomainFilter, StudyApp};

#[derive(Debug, Clone, Parser)]
#[command(name = "cissp-study", about = "CISSP study deck for the terminal", version)]
struct Cli {
    /// Directory holding the domain collections; defaults to $CISSP_STUDY_DATA or ./data
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Collection to load as LABEL=PATH (repeatable); replaces the built-in set
    #[arg(long = "source", short = 's', value_parser = CatalogSource::parse)]
    sources: Vec<CatalogSource>,

    /// Progress file (studied marks)
    #[arg(long)]
    progress: Option<PathBuf>,

    /// Seed for shuffling and quiz sampling
    #[arg(long)]
    seed: Option<u64>,

    /// Start filtered to one domain
    #[arg(long)]
    domain: Option<String>,

    #[arg(long, value_enum, default_value_t = theme::ThemeKind::Dark)]
    theme: theme::ThemeKind,

    /// Log file; defaults to cissp-study.log beside the progress file
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Print study progress and exit
    Stats,
    /// List the loaded domains and exit
    Domains,
}

fn init_logging(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create log directory {}", dir.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init()
        .context("failed to initialise logging")?;
    Ok(())
}

fn load_catalog(sources: &[CatalogSource]) -> Result<Catalog> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")?;
    let catalog = rt.block_on(load_all(sources))?;
    Ok(catalog)
}

fn print_stats(catalog: &Catalog, store: &JsonProgressStore) {
    let studied = store.load_studied();
    let summary = catalog.progress(&studied);
    println!("Total items: {}", summary.total);
    println!("Studied:     {} ({}%)", summary.studied, summary.percent);
    for domain in catalog.domains() {
        let items = catalog.items().iter().filter(|i| i.domain == domain);
        let (done, total) = items.fold((0usize, 0usize), |(d, t), i| {
            (d + usize::from(studied.contains(&i.id)), t + 1)
        });
        println!("  {done:>4}/{total:<4} {domain}");
    }
}

fn print_domains(catalog: &Catalog) {
    for domain in catalog.domains() {
        let n = catalog.items().iter().filter(|i| i.domain == domain).count();
        println!("{domain} ({n})");
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let data_dir = config::resolve_data_dir(cli.data_dir.as_deref());
    let progress_path = config::resolve_progress_path(cli.progress.as_deref(), &data_dir);
    let log_path = cli.log_file.clone().unwrap_or_else(|| {
        progress_path
            .parent()
            .map(|p| p.join(LOG_FILE))
            .unwrap_or_else(|| PathBuf::from(LOG_FILE))
    });
    if let Err(e) = init_logging(&log_path) {
        eprintln!("warning: {e:#}");
    }

    let sources = if cli.sources.is_empty() {
        default_sources(&data_dir)
    } else {
        cli.sources.clone()
    };
    info!("loading {} sources", sources.len());
    let catalog = load_catalog(&sources).context("failed to load the study catalog")?;
    let store = JsonProgressStore::new(progress_path.clone());

    match cli.command {
        Some(Command::Stats) => {
            print_stats(&catalog, &store);
            return Ok(());
        }
        Some(Command::Domains) => {
            print_domains(&catalog);
            return Ok(());
        }
        None => {}
    }

    let keymap = keymap::load_keymap(&config::keymap_candidates())
        .unwrap_or_else(|e| {
            warn!("ignoring key map: {:#}", e);
            None
        })
        .unwrap_or_else(keymap::default_keymap);

    let domain = match cli.domain.as_deref() {
        Some(name) => match catalog.resolve_domain(name) {
            Some(filter) => filter,
            None => {
                warn!("unknown domain {:?}", name);
                bail!(
                    "unknown domain {:?}; loaded domains: {}",
                    name,
                    catalog.domains().join(", ")
                );
            }
        },
        None => DomainFilter::All,
    };

    let mut study = StudyApp::new(catalog, store, study_rng(cli.seed));
    study.set_domain(domain);
    let mut app = tui::TuiApp::new(study, theme::theme_of(cli.theme), keymap);
    tui::run(&mut app)
}
