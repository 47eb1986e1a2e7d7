mod common;

use anyhow::Result;
use common::Note;
use dalkit::{DalError, DataObject};

// Core CRUD behavior against the in-memory backend.

#[test]
fn save_assigns_id_and_timestamps() -> Result<()> {
    let mut repository = common::repository();
    let mut note = Note::new("save");

    repository.save(&mut note)?;

    assert!(note.id() > 0);
    assert!(note.created_at() > 0);
    assert_eq!(note.created_at(), note.updated_at());
    Ok(())
}

#[test]
fn save_existing_keeps_id_and_advances_updated_at() -> Result<()> {
    let mut repository = common::repository();
    let mut note = Note::new("first");

    repository.save(&mut note)?;

    let id = note.id();
    let created = note.created_at();
    let modified = note.updated_at();

    common::tick();
    note.title = "second".into();
    repository.save(&mut note)?;

    assert_eq!(id, note.id());
    assert_eq!(created, note.created_at());
    assert!(note.updated_at() > modified);
    Ok(())
}

#[test]
fn save_negative_id_is_treated_as_virtual() -> Result<()> {
    let mut repository = common::repository();
    let mut note = Note::new("negative");
    note.set_id(-1);

    repository.save(&mut note)?;

    assert!(note.id() > 0);
    Ok(())
}

#[test]
fn get_returns_saved_object() -> Result<()> {
    let mut repository = common::repository();
    let mut note = Note::new("roundtrip");

    repository.save(&mut note)?;

    let fetched = repository.get(note.id())?.expect("note not found");
    assert_eq!(fetched.id(), note.id());
    assert_eq!(fetched.title, "roundtrip");
    Ok(())
}

#[test]
fn get_not_existing_returns_none() -> Result<()> {
    let mut repository = common::repository();

    assert!(repository.get(9999)?.is_none());
    Ok(())
}

#[test]
fn get_many_returns_exactly_the_requested_ids() -> Result<()> {
    let mut repository = common::repository();
    let notes = common::seed(&mut repository, &["a", "b", "c", "d"]);

    let ids: Vec<i32> = notes.iter().take(2).map(|n| n.id()).collect();
    let fetched = repository.get_many(&ids)?;

    assert_eq!(fetched.len(), 2);
    for note in &fetched {
        assert!(ids.contains(&note.id()));
    }
    Ok(())
}

#[test]
fn get_many_omits_missing_ids_without_error() -> Result<()> {
    let mut repository = common::repository();
    let notes = common::seed(&mut repository, &["only"]);

    let fetched = repository.get_many(&[notes[0].id(), 4242])?;

    assert_eq!(fetched.len(), 1);
    assert_eq!(fetched[0].id(), notes[0].id());
    Ok(())
}

#[test]
fn save_many_assigns_ids_to_all() -> Result<()> {
    let mut repository = common::repository();
    let mut notes: Vec<Note> = (0..10).map(|i| Note::new(format!("batch-{i}"))).collect();

    repository.save_many(&mut notes)?;

    for note in &notes {
        assert!(note.id() > 0);
    }
    Ok(())
}

#[test]
fn delete_marks_and_removes_from_reads() -> Result<()> {
    let mut repository = common::repository();
    let mut note = Note::new("doomed");

    repository.save(&mut note)?;
    let id = note.id();

    repository.delete(&mut note)?;

    assert!(note.is_deleted());
    assert_eq!(note.id(), id);
    assert!(repository.get(id)?.is_none());
    Ok(())
}

#[test]
fn delete_virtual_skips_backend_but_marks_locally() -> Result<()> {
    let mut repository = common::repository();
    let mut saved = Note::new("kept");
    let mut unsaved = Note::new("never-persisted");
    unsaved.set_id(-1);

    repository.delete(&mut unsaved)?;
    repository.save(&mut saved)?;

    assert!(unsaved.id() <= 0);
    assert!(unsaved.is_deleted());
    assert!(saved.id() > 0);
    assert!(!saved.is_deleted());
    assert_eq!(repository.backend().len(), 1);
    Ok(())
}

#[test]
fn delete_many_removes_all() -> Result<()> {
    let mut repository = common::repository();
    let mut notes = common::seed(&mut repository, &["a", "b", "c"]);
    let ids: Vec<i32> = notes.iter().map(|n| n.id()).collect();

    repository.delete_many(&mut notes)?;

    for note in &notes {
        assert!(note.is_deleted());
    }
    for id in ids {
        assert!(repository.get(id)?.is_none());
    }
    Ok(())
}

#[test]
fn delete_by_ids_removes_all() -> Result<()> {
    let mut repository = common::repository();
    let notes = common::seed(&mut repository, &["a", "b", "c"]);
    let ids: Vec<i32> = notes.iter().map(|n| n.id()).collect();

    repository.delete_by_ids(&ids)?;

    for id in ids {
        assert!(repository.get(id)?.is_none());
    }
    Ok(())
}

#[test]
fn create_data_object_is_virtual() -> Result<()> {
    let repository = common::repository();

    let note = repository.create_data_object()?;

    assert!(note.is_virtual());
    assert!(!note.is_deleted());
    Ok(())
}

#[test]
fn save_any_accepts_matching_type() -> Result<()> {
    let mut repository = common::repository();
    let mut note = Note::new("any");

    repository.save_any(&mut note)?;

    assert!(note.id() > 0);
    Ok(())
}

#[test]
fn save_any_rejects_wrong_type() {
    let mut repository = common::repository();
    let mut not_a_note = String::from("not a data object");

    let result = repository.save_any(&mut not_a_note);

    assert!(matches!(result, Err(DalError::InvalidArgument(_))));
}

#[test]
fn delete_any_rejects_wrong_type() {
    let mut repository = common::repository();
    let mut not_a_note = 42_u64;

    let result = repository.delete_any(&mut not_a_note);

    assert!(matches!(result, Err(DalError::InvalidArgument(_))));
}
