//! Storage adapter contract.
//!
//! Every concrete storage medium implements [`Backend`]; the repository
//! depends only on this trait. Any method may fail with whatever error the
//! medium produces, and the repository wraps it uniformly into
//! [`DalError::Access`](crate::error::DalError).

pub mod file;
pub mod memory;

pub use file::JsonFileBackend;
pub use memory::MemoryBackend;

use crate::error::BoxError;
use crate::model::DataObject;

pub trait Backend<T: DataObject> {
    /// Fetches the object with the given id. Not-found is a normal outcome,
    /// not an error.
    fn fetch_by_id(&self, id: i32) -> Result<Option<T>, BoxError>;

    /// Fetches the objects with the given ids. Ids without a match are
    /// simply absent from the result; partial misses are not errors.
    fn fetch_by_ids(&self, ids: &[i32]) -> Result<Vec<T>, BoxError>;

    /// Fetches undeleted objects modified after the given watermark
    fn fetch_changed(&self, watermark: i64) -> Result<Vec<T>, BoxError>;

    /// Persists a single object. Virtual objects (id <= 0) are assigned a
    /// fresh positive id; timestamps are refreshed via
    /// [`touch_timestamps`](DataObject::touch_timestamps).
    fn persist(&mut self, data_object: &mut T) -> Result<(), BoxError>;

    fn persist_many(&mut self, data_objects: &mut [T]) -> Result<(), BoxError>;

    /// Marks the object deleted and removes it from the active index. The
    /// caller's copy keeps its id and timestamps.
    fn soft_delete(&mut self, data_object: &mut T) -> Result<(), BoxError>;

    fn soft_delete_many(&mut self, data_objects: &mut [T]) -> Result<(), BoxError>;

    fn soft_delete_by_ids(&mut self, ids: &[i32]) -> Result<(), BoxError>;

    /// Returns the full undeleted set, independent of any watermark
    fn reload_all(&self) -> Result<Vec<T>, BoxError>;

    /// Wipes the underlying storage and resets id assignment
    fn clear(&mut self) -> Result<(), BoxError>;

    /// Constructs a fresh virtual object of the concrete type
    fn new_data_object(&self) -> Result<T, BoxError>;
}
