mod common;

use std::sync::Arc;

use collab_core::state::{CollabDb, SessionManager, SessionStatus, SessionStore};
use collab_core::team::{Stage, StageOptions};
use common::{coordinator_with_store, ScriptedBackend};

#[tokio::test]
async fn sessions_survive_reopening_the_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".collab").join("collab.db");

    let stored_id = {
        let db = CollabDb::open_at(&path).unwrap();
        let store: Arc<dyn SessionStore> = Arc::new(SessionManager::new(&db));
        let backend = Arc::new(ScriptedBackend::new().reply(
            Stage::Writing,
            r#"{"title": "Ocean Currents", "content": "Currents move heat."}"#,
        ));
        let coordinator = coordinator_with_store(backend, store);

        let result = coordinator
            .run("Explain ocean currents", StageOptions::default())
            .await;
        assert!(result.warnings.is_empty());
        result.stored_session_id.unwrap()
    };

    let db = CollabDb::open_at(&path).unwrap();
    let store = SessionManager::new(&db);
    let record = store.get(&stored_id).unwrap().unwrap();

    assert_eq!(record.session.title, "Ocean Currents");
    assert_eq!(record.session.original_prompt, "Explain ocean currents");
    assert_eq!(record.session.status, SessionStatus::Completed);
    assert_eq!(record.session.summary.stages_completed, Stage::ALL.to_vec());
    assert_eq!(record.session.final_output.kind(), "reviewed_content");
    assert_eq!(record.session.results.len(), 4);
    assert!(record.session.end_time.is_some());
}

#[tokio::test]
async fn stored_title_falls_back_to_truncated_task() {
    let db = CollabDb::open_in_memory().unwrap();
    let store: Arc<dyn SessionStore> = Arc::new(SessionManager::new(&db));
    let backend = Arc::new(ScriptedBackend::new());
    let coordinator = coordinator_with_store(backend, store.clone());

    let task = "Compare the economic policies of several countries across the last two decades";
    let result = coordinator
        .run(task, StageOptions::only(&[Stage::Planning]))
        .await;

    let record = store.get(&result.stored_session_id.unwrap()).unwrap().unwrap();
    assert_eq!(record.session.title.chars().count(), 63);
    assert!(record.session.title.ends_with("..."));
    assert!(task.starts_with(record.session.title.trim_end_matches("...")));
}

#[tokio::test]
async fn history_listing_and_status_updates() {
    let db = CollabDb::open_in_memory().unwrap();
    let store: Arc<dyn SessionStore> = Arc::new(SessionManager::new(&db));
    let backend = Arc::new(ScriptedBackend::new());
    let coordinator = coordinator_with_store(backend, store.clone());

    let first = coordinator
        .run("first", StageOptions::only(&[Stage::Writing]))
        .await;
    let second = coordinator
        .run("second", StageOptions::only(&[Stage::Writing]))
        .await;

    let listed = store.list_all().unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].session.original_prompt, "second");
    assert_eq!(listed[1].session.original_prompt, "first");

    let first_id = first.stored_session_id.unwrap();
    let updated = store
        .update_status(&first_id, SessionStatus::Failed)
        .unwrap()
        .unwrap();
    assert_eq!(updated.session.status, SessionStatus::Failed);

    let stats = store.stats().unwrap();
    assert_eq!(stats.total, 2);
    assert_eq!(stats.completed, 1);
    assert_eq!(stats.failed, 1);

    assert!(store.delete(&second.stored_session_id.unwrap()).unwrap());
    assert_eq!(store.list_all().unwrap().len(), 1);
    assert!(store.get("missing").unwrap().is_none());
    assert!(store
        .update_status("missing", SessionStatus::Completed)
        .unwrap()
        .is_none());
}
