use taskmanager_core::db::open_db_in_memory;
use taskmanager_core::{
    FieldUpdate, RepoError, SqliteTaskRepository, TaskListQuery, TaskParams, TaskPatch,
    TaskRepository, TaskService,
};

#[test]
fn create_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);

    let params = TaskParams::new("Test Task").with_description("Test Description");
    let created = repo.create_task(&params).unwrap();

    let loaded = repo.get_task(created.id).unwrap().unwrap();
    assert_eq!(loaded, created);
    assert_eq!(loaded.title, "Test Task");
    assert_eq!(loaded.description.as_deref(), Some("Test Description"));
    assert!(!loaded.completed);
}

#[test]
fn ids_are_unique_and_not_reused_after_delete() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);

    let first = repo.create_task(&TaskParams::new("one")).unwrap();
    let second = repo.create_task(&TaskParams::new("two")).unwrap();
    assert_ne!(first.id, second.id);

    repo.delete_task(second.id).unwrap();
    let third = repo.create_task(&TaskParams::new("three")).unwrap();
    assert!(third.id > second.id);
}

#[test]
fn get_missing_returns_none() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);

    assert!(repo.get_task(9999).unwrap().is_none());
}

#[test]
fn list_filters_by_completed_flag() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);

    let done = repo
        .create_task(&TaskParams::new("Task 1").with_completed(true))
        .unwrap();
    let open = repo.create_task(&TaskParams::new("Task 2")).unwrap();

    let all = repo.list_tasks(&TaskListQuery::default()).unwrap();
    assert_eq!(
        all.iter().map(|task| task.id).collect::<Vec<_>>(),
        vec![done.id, open.id]
    );

    let completed = repo
        .list_tasks(&TaskListQuery {
            completed: Some(true),
        })
        .unwrap();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].id, done.id);

    let pending = repo
        .list_tasks(&TaskListQuery {
            completed: Some(false),
        })
        .unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, open.id);
}

#[test]
fn replace_overwrites_every_mutable_field() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);

    let created = repo
        .create_task(
            &TaskParams::new("draft")
                .with_description("notes")
                .with_completed(true),
        )
        .unwrap();

    let replaced = repo
        .replace_task(created.id, &TaskParams::new("final"))
        .unwrap();
    assert_eq!(replaced.id, created.id);
    assert_eq!(replaced.title, "final");
    assert_eq!(replaced.description, None);
    assert!(!replaced.completed);
    assert_eq!(replaced.created_at, created.created_at);
}

#[test]
fn patch_writes_only_present_fields() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);

    let created = repo
        .create_task(&TaskParams::new("Test Task").with_description("keep me"))
        .unwrap();

    let patch = TaskPatch {
        completed: FieldUpdate::Set(true),
        ..TaskPatch::default()
    };
    let patched = repo.patch_task(created.id, &patch).unwrap();
    assert!(patched.completed);
    assert_eq!(patched.title, "Test Task");
    assert_eq!(patched.description.as_deref(), Some("keep me"));
    assert_eq!(patched.created_at, created.created_at);
}

#[test]
fn patch_can_clear_description() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);

    let created = repo
        .create_task(&TaskParams::new("Test Task").with_description("old"))
        .unwrap();

    let patch = TaskPatch {
        description: FieldUpdate::Set(None),
        ..TaskPatch::default()
    };
    let patched = repo.patch_task(created.id, &patch).unwrap();
    assert_eq!(patched.description, None);
    assert_eq!(patched.title, "Test Task");
}

#[test]
fn empty_patch_leaves_task_unchanged() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);

    let created = repo.create_task(&TaskParams::new("steady")).unwrap();
    let patched = repo.patch_task(created.id, &TaskPatch::default()).unwrap();
    assert_eq!(patched, created);
}

#[test]
fn mutations_on_missing_id_return_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);

    let replace_err = repo
        .replace_task(9999, &TaskParams::new("Updated Title"))
        .unwrap_err();
    assert!(matches!(replace_err, RepoError::NotFound(9999)));

    let patch = TaskPatch {
        title: FieldUpdate::Set("Patched Title".to_string()),
        ..TaskPatch::default()
    };
    let patch_err = repo.patch_task(9999, &patch).unwrap_err();
    assert!(matches!(patch_err, RepoError::NotFound(9999)));

    let delete_err = repo.delete_task(9999).unwrap_err();
    assert!(matches!(delete_err, RepoError::NotFound(9999)));
}

#[test]
fn delete_then_get_is_gone() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);

    let created = repo.create_task(&TaskParams::new("short lived")).unwrap();
    repo.delete_task(created.id).unwrap();

    assert!(repo.get_task(created.id).unwrap().is_none());
    let err = repo.delete_task(created.id).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == created.id));
}

#[test]
fn failed_write_keeps_prior_state() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);

    let created = repo.create_task(&TaskParams::new("original")).unwrap();

    // Bypasses validation so the CHECK constraint is what rejects the write.
    let err = repo
        .replace_task(created.id, &TaskParams::new(""))
        .unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));

    let loaded = repo.get_task(created.id).unwrap().unwrap();
    assert_eq!(loaded.title, "original");
}

#[test]
fn corrupted_completed_value_is_reported() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "PRAGMA ignore_check_constraints = ON;
         INSERT INTO tasks (title, completed, created_at)
         VALUES ('broken', 7, '2024-01-01 00:00:00+00:00');",
    )
    .unwrap();
    let repo = SqliteTaskRepository::new(&conn);

    let err = repo.list_tasks(&TaskListQuery::default()).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

#[test]
fn service_maps_missing_get_to_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = TaskService::new(SqliteTaskRepository::new(&conn));

    let err = service.get_task(9999).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(9999)));
    assert_eq!(err.to_string(), "task not found: 9999");
}

#[test]
fn service_crud_flow() {
    let conn = open_db_in_memory().unwrap();
    let service = TaskService::new(SqliteTaskRepository::new(&conn));

    let created = service.create_task(&TaskParams::new("Test Task")).unwrap();
    assert_eq!(service.get_task(created.id).unwrap(), created);

    let updated = service
        .replace_task(
            created.id,
            &TaskParams::new("Updated Task").with_completed(true),
        )
        .unwrap();
    assert_eq!(updated.title, "Updated Task");
    assert!(updated.completed);

    assert_eq!(service.list_tasks(Some(true)).unwrap(), vec![updated]);
    assert!(service.list_tasks(Some(false)).unwrap().is_empty());

    service.delete_task(created.id).unwrap();
    assert!(service.list_tasks(None).unwrap().is_empty());
}
