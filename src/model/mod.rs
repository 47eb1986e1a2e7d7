use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Persistence metadata embedded in every data object: identity, lifecycle
/// timestamps and the soft-delete flag. Concrete data objects hold one of
/// these (typically `#[serde(flatten)]`-ed) and expose it through
/// [`DataObject`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityMeta {
    /// Numeric id in the backing store. Zero or smaller means the object was
    /// not persisted yet; the backend overwrites it on first save.
    pub id: i32,
    /// Milliseconds since epoch, assigned once at first persistence
    pub created_at: i64,
    /// Milliseconds since epoch, refreshed on every save
    pub updated_at: i64,
    /// Soft-delete marker; a deleted object is excluded from normal reads
    /// but keeps its id and timestamps for audit
    pub deleted: bool,
}

/// Equality is identity + version: id and both timestamps. Domain fields and
/// the deleted flag are deliberately excluded, so repositories can compare
/// and de-duplicate objects without inspecting their content.
impl PartialEq for EntityMeta {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.created_at == other.created_at
            && self.updated_at == other.updated_at
    }
}

impl Eq for EntityMeta {}

impl Hash for EntityMeta {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Base contract for any persistable object. Implementors only wire up the
/// two meta accessors; identity and lifecycle behavior comes for free.
pub trait DataObject {
    fn meta(&self) -> &EntityMeta;
    fn meta_mut(&mut self) -> &mut EntityMeta;

    fn id(&self) -> i32 {
        self.meta().id
    }

    fn set_id(&mut self, id: i32) {
        self.meta_mut().id = id;
    }

    /// Whether the object was never persisted (id of zero or smaller)
    fn is_virtual(&self) -> bool {
        self.id() <= 0
    }

    fn created_at(&self) -> i64 {
        self.meta().created_at
    }

    fn updated_at(&self) -> i64 {
        self.meta().updated_at
    }

    fn is_deleted(&self) -> bool {
        self.meta().deleted
    }

    fn set_deleted(&mut self, deleted: bool) {
        self.meta_mut().deleted = deleted;
    }

    /// Refreshes the lifecycle timestamps. To be called by the backend
    /// adapter immediately before persisting: sets `created_at` if it was
    /// never assigned, and always advances `updated_at`. A freshly created
    /// object therefore ends up with `created_at == updated_at`.
    fn touch_timestamps(&mut self) {
        let now = Utc::now().timestamp_millis();
        let meta = self.meta_mut();

        if meta.created_at < 1 {
            meta.created_at = now;
        }

        meta.updated_at = now;
    }
}
