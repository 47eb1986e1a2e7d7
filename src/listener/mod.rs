//! Listener contracts for the four repository operation families.
//!
//! Each family has a "before" phase that may remap or veto the request and an
//! "after" phase that observes (and may mutate) the result. All methods run
//! synchronously on the thread performing the triggering operation, have
//! default no-op implementations, and may fail; a listener failure is
//! funneled into [`DalError::Access`](crate::error::DalError) exactly like a
//! backend failure.

use crate::error::BoxError;
use crate::model::DataObject;

/// Notified before and after data objects are fetched
pub trait GetListener<T: DataObject>: Send + Sync {
    /// Called before a single object is fetched; may remap the id
    fn before_get(&self, id: i32) -> Result<i32, BoxError> {
        Ok(id)
    }

    /// Called before a batch fetch. `None` means "fetch all"; each
    /// registered listener sees the previous listener's output.
    fn before_get_many(&self, ids: Option<Vec<i32>>) -> Result<Option<Vec<i32>>, BoxError> {
        Ok(ids)
    }

    /// Called after a single fetch with the (possibly absent) result
    fn after_get(&self, _data_object: Option<&mut T>) -> Result<(), BoxError> {
        Ok(())
    }

    /// Called after a batch fetch; the listener may change the objects
    fn after_get_many(&self, _data_objects: &mut Vec<T>) -> Result<(), BoxError> {
        Ok(())
    }
}

/// Notified before and after data objects are saved
pub trait SaveListener<T: DataObject>: Send + Sync {
    /// Returning `false` vetoes the save: nothing is persisted, remaining
    /// listeners are not called and no after-listener fires.
    fn before_save(&self, _data_object: &mut T) -> Result<bool, BoxError> {
        Ok(true)
    }

    /// Batch counterpart of [`before_save`](Self::before_save); the listener
    /// may change the objects as well as the collection.
    fn before_save_many(&self, _data_objects: &mut Vec<T>) -> Result<bool, BoxError> {
        Ok(true)
    }

    fn after_save(&self, _data_object: &mut T) -> Result<(), BoxError> {
        Ok(())
    }

    fn after_save_many(&self, _data_objects: &mut Vec<T>) -> Result<(), BoxError> {
        Ok(())
    }
}

/// Notified before and after data objects are deleted
pub trait DeleteListener<T: DataObject>: Send + Sync {
    /// Returning `false` vetoes the delete
    fn before_delete(&self, _data_object: &mut T) -> Result<bool, BoxError> {
        Ok(true)
    }

    fn before_delete_many(&self, _data_objects: &mut Vec<T>) -> Result<bool, BoxError> {
        Ok(true)
    }

    /// The id-array path has no veto: listeners chain transforms of the id
    /// set instead, and an empty result deletes nothing.
    fn before_delete_ids(&self, ids: Vec<i32>) -> Result<Vec<i32>, BoxError> {
        Ok(ids)
    }

    fn after_delete(&self, _data_object: &mut T) -> Result<(), BoxError> {
        Ok(())
    }

    fn after_delete_many(&self, _data_objects: &mut Vec<T>) -> Result<(), BoxError> {
        Ok(())
    }

    fn after_delete_ids(&self, _ids: &[i32]) -> Result<(), BoxError> {
        Ok(())
    }
}

/// Notified before and after a full resynchronization
pub trait ReloadListener<T: DataObject>: Send + Sync {
    /// Called before the backend is asked for the full set. Objects pushed
    /// into `accumulator` are prepended to the output; returning `false`
    /// vetoes the reload and the accumulator as built so far is returned
    /// without touching the backend.
    fn before_reload(&self, _accumulator: &mut Vec<T>) -> Result<bool, BoxError> {
        Ok(true)
    }

    fn after_reload(&self, _data_objects: &mut Vec<T>) -> Result<(), BoxError> {
        Ok(())
    }
}
