use std::thread;
use taskmanager_core::{
    Database, FieldUpdate, SqliteTaskRepository, TaskParams, TaskPatch, TaskRepository,
};

const WRITERS: usize = 16;
const WRITES_PER_WRITER: usize = 50;

#[test]
fn racing_patches_on_one_task_all_succeed() {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::bootstrap(dir.path().join("tasks.db")).unwrap();

    let task_id = {
        let session = db.open_session().unwrap();
        SqliteTaskRepository::new(session.connection())
            .create_task(&TaskParams::new("contended"))
            .unwrap()
            .id
    };

    let handles: Vec<_> = (0..WRITERS)
        .map(|writer| {
            let db = db.clone();
            thread::spawn(move || {
                let mut failures = Vec::new();
                for round in 0..WRITES_PER_WRITER {
                    let session = db.open_session().unwrap();
                    let repo = SqliteTaskRepository::new(session.connection());
                    let patch = TaskPatch {
                        completed: FieldUpdate::Set((writer + round) % 2 == 0),
                        description: FieldUpdate::Set(Some(format!("{writer}-{round}"))),
                        ..TaskPatch::default()
                    };
                    if let Err(err) = repo.patch_task(task_id, &patch) {
                        failures.push(err.to_string());
                    }
                }
                failures
            })
        })
        .collect();

    let failures: Vec<String> = handles
        .into_iter()
        .flat_map(|handle| handle.join().unwrap())
        .collect();
    assert!(failures.is_empty(), "concurrent patch failures: {failures:?}");
    assert_eq!(db.open_sessions(), 0);

    let session = db.open_session().unwrap();
    let task = SqliteTaskRepository::new(session.connection())
        .get_task(task_id)
        .unwrap()
        .unwrap();
    assert_eq!(task.title, "contended");
}

#[test]
fn racing_creates_and_replaces_all_succeed() {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::bootstrap(dir.path().join("tasks.db")).unwrap();

    let handles: Vec<_> = (0..WRITERS)
        .map(|writer| {
            let db = db.clone();
            thread::spawn(move || {
                let mut failures = Vec::new();
                for round in 0..10 {
                    let session = db.open_session().unwrap();
                    let repo = SqliteTaskRepository::new(session.connection());
                    let result = repo
                        .create_task(&TaskParams::new(format!("task {writer}-{round}")))
                        .and_then(|task| {
                            repo.replace_task(task.id, &TaskParams::new("replaced"))
                        });
                    if let Err(err) = result {
                        failures.push(err.to_string());
                    }
                }
                failures
            })
        })
        .collect();

    let failures: Vec<String> = handles
        .into_iter()
        .flat_map(|handle| handle.join().unwrap())
        .collect();
    assert!(failures.is_empty(), "concurrent write failures: {failures:?}");
}
