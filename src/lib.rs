pub mod backend;
pub mod error;
pub mod listener;
pub mod model;
pub mod repository;

pub use backend::{Backend, JsonFileBackend, MemoryBackend};
pub use error::{BoxError, DalError, ErrorObserver};
pub use listener::{DeleteListener, GetListener, ReloadListener, SaveListener};
pub use model::{DataObject, EntityMeta};
pub use repository::Repository;
