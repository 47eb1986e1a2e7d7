#![allow(dead_code)]

use std::time::Duration;

use dalkit::{DataObject, EntityMeta, MemoryBackend, Repository};
use serde::{Deserialize, Serialize};

/// Minimal data object used across the integration tests
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Note {
    #[serde(flatten)]
    pub meta: EntityMeta,
    pub title: String,
}

impl Note {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            meta: EntityMeta::default(),
            title: title.into(),
        }
    }
}

impl DataObject for Note {
    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }
}

pub type NoteRepository = Repository<Note, MemoryBackend<Note>>;

pub fn repository() -> NoteRepository {
    Repository::new(MemoryBackend::new())
}

/// Saves one note per title and returns the saved notes
pub fn seed(repository: &mut NoteRepository, titles: &[&str]) -> Vec<Note> {
    let mut notes = Vec::with_capacity(titles.len());

    for title in titles {
        let mut note = Note::new(*title);
        repository.save(&mut note).expect("seed save failed");
        notes.push(note);
    }

    notes
}

/// Guarantees a nonzero interval between modification timestamps
pub fn tick() {
    std::thread::sleep(Duration::from_millis(2));
}
