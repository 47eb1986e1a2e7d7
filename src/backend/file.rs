use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::backend::Backend;
use crate::error::BoxError;
use crate::model::DataObject;

/// On-disk snapshot of the backend state
#[derive(Serialize, Deserialize)]
struct FileState<T> {
    last_id: i32,
    data_objects: Vec<T>,
}

/// File backend: the in-memory index mirrored to a JSON document after every
/// mutation. Reads are served from memory; construction loads whatever state
/// the file already holds.
pub struct JsonFileBackend<T> {
    path: PathBuf,
    data_objects: HashMap<i32, T>,
    last_id: i32,
}

impl<T> JsonFileBackend<T>
where
    T: DataObject + Clone + Default + Serialize + DeserializeOwned,
{
    /// Opens the backend at `path`, loading existing state if the file is
    /// present. Fails if the file exists but cannot be read or parsed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, BoxError> {
        let path = path.as_ref().to_path_buf();
        let mut backend = Self {
            path,
            data_objects: HashMap::new(),
            last_id: 0,
        };

        if backend.path.exists() {
            let raw = fs::read_to_string(&backend.path)?;
            let state: FileState<T> = serde_json::from_str(&raw)?;

            backend.last_id = state.last_id;
            backend.data_objects = state
                .data_objects
                .into_iter()
                .map(|o| (o.id(), o))
                .collect();

            debug!(
                path = %backend.path.display(),
                count = backend.data_objects.len(),
                "loaded file backend state"
            );
        }

        Ok(backend)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), BoxError> {
        let state = FileState {
            last_id: self.last_id,
            data_objects: self.data_objects.values().cloned().collect::<Vec<T>>(),
        };

        fs::write(&self.path, serde_json::to_string_pretty(&state)?)?;
        Ok(())
    }

    fn persist_one(&mut self, data_object: &mut T) {
        if data_object.id() < 1 {
            self.last_id += 1;
            data_object.set_id(self.last_id);
        }

        data_object.touch_timestamps();
        self.data_objects.insert(data_object.id(), data_object.clone());
    }
}

impl<T> Backend<T> for JsonFileBackend<T>
where
    T: DataObject + Clone + Default + Serialize + DeserializeOwned,
{
    fn fetch_by_id(&self, id: i32) -> Result<Option<T>, BoxError> {
        Ok(self.data_objects.get(&id).cloned())
    }

    fn fetch_by_ids(&self, ids: &[i32]) -> Result<Vec<T>, BoxError> {
        let found = self
            .data_objects
            .values()
            .filter(|o| ids.contains(&o.id()))
            .cloned()
            .collect();

        Ok(found)
    }

    fn fetch_changed(&self, watermark: i64) -> Result<Vec<T>, BoxError> {
        let changed = self
            .data_objects
            .values()
            .filter(|o| !o.is_deleted() && o.updated_at() > watermark)
            .cloned()
            .collect();

        Ok(changed)
    }

    fn persist(&mut self, data_object: &mut T) -> Result<(), BoxError> {
        self.persist_one(data_object);
        self.flush()
    }

    fn persist_many(&mut self, data_objects: &mut [T]) -> Result<(), BoxError> {
        for data_object in data_objects {
            self.persist_one(data_object);
        }
        self.flush()
    }

    fn soft_delete(&mut self, data_object: &mut T) -> Result<(), BoxError> {
        data_object.set_deleted(true);
        self.data_objects.remove(&data_object.id());
        self.flush()
    }

    fn soft_delete_many(&mut self, data_objects: &mut [T]) -> Result<(), BoxError> {
        for data_object in data_objects.iter_mut() {
            data_object.set_deleted(true);
            self.data_objects.remove(&data_object.id());
        }
        self.flush()
    }

    fn soft_delete_by_ids(&mut self, ids: &[i32]) -> Result<(), BoxError> {
        for id in ids {
            self.data_objects.remove(id);
        }
        self.flush()
    }

    fn reload_all(&self) -> Result<Vec<T>, BoxError> {
        Ok(self.data_objects.values().cloned().collect())
    }

    fn clear(&mut self) -> Result<(), BoxError> {
        self.data_objects.clear();
        self.last_id = 0;
        self.flush()
    }

    fn new_data_object(&self) -> Result<T, BoxError> {
        Ok(T::default())
    }
}
