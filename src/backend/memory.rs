use std::collections::HashMap;

use crate::backend::Backend;
use crate::error::BoxError;
use crate::model::DataObject;

/// In-memory backend: a plain id-to-object map with sequential id
/// assignment. Useful on its own for small working sets and as the reference
/// implementation of the adapter contract other backends follow.
#[derive(Debug, Default)]
pub struct MemoryBackend<T> {
    data_objects: HashMap<i32, T>,
    last_id: i32,
}

impl<T> MemoryBackend<T>
where
    T: DataObject + Clone + Default,
{
    pub fn new() -> Self {
        Self {
            data_objects: HashMap::new(),
            last_id: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.data_objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data_objects.is_empty()
    }

    fn persist_one(&mut self, data_object: &mut T) {
        if data_object.id() < 1 {
            self.last_id += 1;
            data_object.set_id(self.last_id);
        }

        data_object.touch_timestamps();
        self.data_objects.insert(data_object.id(), data_object.clone());
    }

    fn delete_one(&mut self, data_object: &mut T) {
        data_object.set_deleted(true);
        self.data_objects.remove(&data_object.id());
    }
}

impl<T> Backend<T> for MemoryBackend<T>
where
    T: DataObject + Clone + Default,
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
        Ok(())
    }

    fn persist_many(&mut self, data_objects: &mut [T]) -> Result<(), BoxError> {
        for data_object in data_objects {
            self.persist_one(data_object);
        }
        Ok(())
    }

    fn soft_delete(&mut self, data_object: &mut T) -> Result<(), BoxError> {
        self.delete_one(data_object);
        Ok(())
    }

    fn soft_delete_many(&mut self, data_objects: &mut [T]) -> Result<(), BoxError> {
        for data_object in data_objects {
            self.delete_one(data_object);
        }
        Ok(())
    }

    fn soft_delete_by_ids(&mut self, ids: &[i32]) -> Result<(), BoxError> {
        for id in ids {
            self.data_objects.remove(id);
        }
        Ok(())
    }

    fn reload_all(&self) -> Result<Vec<T>, BoxError> {
        Ok(self.data_objects.values().cloned().collect())
    }

    fn clear(&mut self) -> Result<(), BoxError> {
        self.data_objects.clear();
        self.last_id = 0;
        Ok(())
    }

    fn new_data_object(&self) -> Result<T, BoxError> {
        Ok(T::default())
    }
}
