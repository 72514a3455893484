use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use cissp_study::catalog::{Collection, RawItem};
use cissp_study::error::StudyError;
use cissp_study::quiz::QuizPhase;
use cissp_study::{
    load_all, study_rng, Catalog, CatalogSource, DomainFilter, ItemId, JsonProgressStore,
    MemoryProgressStore, Mode, ProgressStore, StudyApp,
};

fn collection(domain: &str, prefix: &str, n: usize) -> Collection {
    Collection {
        domain: domain.to_string(),
        items: (1..=n)
            .map(|i| RawItem {
                id: ItemId::from(format!("{prefix}{i}")),
                topic: format!("{domain} topic {i}"),
                description: format!("{domain} description {i}"),
                reference: String::new(),
            })
            .collect(),
    }
}

fn twelve_items() -> Catalog {
    Catalog::from_collections(vec![
        collection("Asset Security", "a", 6),
        collection("Security Operations", "o", 6),
    ])
    .unwrap()
}

fn answer_all(app: &mut StudyApp<MemoryProgressStore>, correct_answers: usize) {
    let mut answered = 0;
    while app.quiz().phase() != QuizPhase::Finished {
        let want_correct = answered < correct_answers;
        let idx = app
            .quiz()
            .options()
            .iter()
            .position(|o| o.correct == want_correct)
            .unwrap();
        app.select_option(idx).unwrap();
        app.submit_answer().unwrap();
        app.next_question().unwrap();
        answered += 1;
    }
}

#[test]
fn filtered_quiz_scores_every_question() {
    let mut app = StudyApp::new(
        twelve_items(),
        MemoryProgressStore::default(),
        study_rng(Some(99)),
    );
    app.set_domain(DomainFilter::parse("Asset Security"));
    assert_eq!(app.view_len(), 6);

    app.start_quiz().unwrap();
    assert_eq!(app.mode(), Mode::Quiz);
    assert_eq!(app.quiz().question_count(), 6);
    answer_all(&mut app, 6);
    app.finish_quiz().unwrap();
    assert_eq!(app.last_report().unwrap().to_string(), "6/6 (100%)");

    app.start_quiz().unwrap();
    answer_all(&mut app, 3);
    app.finish_quiz().unwrap();
    let report = app.last_report().unwrap();
    assert_eq!(report.to_string(), "3/6 (50%)");
    assert!(report
        .answers
        .iter()
        .all(|a| a.question.domain == "Asset Security"));
}

#[test]
fn review_with_nothing_studied_leaves_the_view_alone() {
    let mut app = StudyApp::new(
        twelve_items(),
        MemoryProgressStore::default(),
        study_rng(Some(1)),
    );
    app.set_query("operations");
    let before = app.view_len();
    assert_eq!(before, 6);
    assert_eq!(
        app.review_studied_items(),
        Err(StudyError::NoStudiedItems)
    );
    assert_eq!(app.view_len(), before);
}

fn write_collection(dir: &Path, name: &str, body: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    path
}

#[tokio::test]
async fn studied_marks_survive_a_restart() {
    let dir = TempDir::new().unwrap();
    let a = write_collection(
        dir.path(),
        "assets.json",
        r#"[{"id": 1, "topic": "Data Owner", "description": "Accountable for data"},
            {"id": 2, "topic": "Custodian", "description": "Implements controls"}]"#,
    );
    let b = write_collection(
        dir.path(),
        "ops.json",
        r#"[{"id": "ops-1", "topic": "Patching", "description": "Fixes known flaws",
             "reference": "OSG ch. 16"}]"#,
    );
    let sources = vec![
        CatalogSource::new("Asset Security", a),
        CatalogSource::new("Security Operations", b),
    ];
    let progress = dir.path().join("state").join("progress.json");

    let catalog = load_all(&sources).await.unwrap();
    let mut app = StudyApp::new(
        catalog,
        JsonProgressStore::new(progress.clone()),
        study_rng(Some(5)),
    );
    app.next_card().unwrap();
    app.toggle_studied().unwrap();
    assert_eq!(app.progress().studied, 1);

    let catalog = load_all(&sources).await.unwrap();
    let store = JsonProgressStore::new(progress);
    assert!(store.load_studied().contains(&ItemId::from(2u64)));
    let mut app = StudyApp::new(catalog, store, study_rng(Some(5)));
    assert_eq!(app.progress().studied, 1);
    assert_eq!(app.progress().percent, 33);
    app.review_studied_items().unwrap();
    assert_eq!(app.current_item().unwrap().topic, "Custodian");
}
