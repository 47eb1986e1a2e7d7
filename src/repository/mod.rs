//! The generic repository: validates inputs, threads requests through the
//! registered listeners, delegates to the backend adapter, tracks the
//! modification watermark and funnels backend failures into [`DalError`].

use std::any::Any;
use std::sync::{Arc, Mutex};

use tracing::{debug, error};

use crate::backend::Backend;
use crate::error::{BoxError, DalError, ErrorObserver};
use crate::listener::{DeleteListener, GetListener, ReloadListener, SaveListener};
use crate::model::DataObject;

type Registry<L> = Mutex<Vec<Arc<L>>>;

/// Orchestrates CRUD operations against a backend adapter.
///
/// Listener registries are ordered: dispatch order is registration order.
/// Registering the same `Arc` twice is a no-op and unregistration compares by
/// `Arc` identity. Each operation dispatches over a snapshot taken at entry,
/// so a listener registered mid-dispatch is not part of that dispatch.
pub struct Repository<T: DataObject, B> {
    backend: B,
    /// Highest `updated_at` seen by the most recent incremental fetch;
    /// `get_all` returns only objects modified after this value.
    watermark: i64,
    get_listeners: Registry<dyn GetListener<T>>,
    save_listeners: Registry<dyn SaveListener<T>>,
    delete_listeners: Registry<dyn DeleteListener<T>>,
    reload_listeners: Registry<dyn ReloadListener<T>>,
    error_observer: Option<Arc<dyn ErrorObserver>>,
}

fn register<L: ?Sized>(registry: &Registry<L>, listener: Arc<L>) {
    let mut listeners = registry.lock().expect("listener registry lock poisoned");

    if !listeners.iter().any(|l| Arc::ptr_eq(l, &listener)) {
        listeners.push(listener);
    }
}

fn unregister<L: ?Sized>(registry: &Registry<L>, listener: &Arc<L>) {
    let mut listeners = registry.lock().expect("listener registry lock poisoned");

    listeners.retain(|l| !Arc::ptr_eq(l, listener));
}

fn snapshot<L: ?Sized>(registry: &Registry<L>) -> Vec<Arc<L>> {
    registry.lock().expect("listener registry lock poisoned").clone()
}

impl<T, B> Repository<T, B>
where
    T: DataObject + 'static,
    B: Backend<T>,
{
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            watermark: i64::MIN,
            get_listeners: Mutex::new(Vec::new()),
            save_listeners: Mutex::new(Vec::new()),
            delete_listeners: Mutex::new(Vec::new()),
            reload_listeners: Mutex::new(Vec::new()),
            error_observer: None,
        }
    }

    /// Attaches a diagnostic observer notified of every access error this
    /// repository constructs
    pub fn with_error_observer(mut self, observer: Arc<dyn ErrorObserver>) -> Self {
        self.error_observer = Some(observer);
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Current incremental-reload watermark
    pub fn watermark(&self) -> i64 {
        self.watermark
    }

    /// Builds the uniform access error and notifies the error observer. An
    /// observer failure is logged and suppressed; error creation never fails
    /// the operation that triggered it.
    fn access(&self, cause: BoxError) -> DalError {
        let dal_error = DalError::Access(cause);

        if let Some(observer) = &self.error_observer {
            if let Err(observer_error) = observer.on_error(&dal_error) {
                error!(error = %observer_error, "error observer failed; suppressing");
            }
        }

        dal_error
    }

    fn funnel<V>(&self, result: Result<V, BoxError>) -> Result<V, DalError> {
        result.map_err(|cause| self.access(cause))
    }

    // ========================================
    // Get
    // ========================================

    /// Fetches a single object. Not-found yields `Ok(None)`, never an error.
    pub fn get(&mut self, id: i32) -> Result<Option<T>, DalError> {
        debug!(id, "repository get");

        let listeners = snapshot(&self.get_listeners);
        let mut actual_id = id;

        for listener in &listeners {
            actual_id = self.funnel(listener.before_get(actual_id))?;
        }

        let fetched = self.backend.fetch_by_id(actual_id);
        let mut data_object = self.funnel(fetched)?;

        for listener in &listeners {
            self.funnel(listener.after_get(data_object.as_mut()))?;
        }

        Ok(data_object)
    }

    /// Fetches the objects with the given ids; missing ids are simply
    /// absent from the result
    pub fn get_many(&mut self, ids: &[i32]) -> Result<Vec<T>, DalError> {
        debug!(count = ids.len(), "repository get_many");
        self.fetch_filtered(Some(ids.to_vec()))
    }

    /// Fetches everything changed since the last incremental read and
    /// advances the watermark; a second call with no intervening mutation
    /// returns an empty set
    pub fn get_all(&mut self) -> Result<Vec<T>, DalError> {
        debug!(watermark = self.watermark, "repository get_all");
        self.fetch_filtered(None)
    }

    /// Shared path for `get_many`/`get_all`. `None` means "no explicit id
    /// filter": the incremental-reload policy applies, and a before-listener
    /// may switch a filtered call onto that path by returning `None`.
    fn fetch_filtered(&mut self, ids: Option<Vec<i32>>) -> Result<Vec<T>, DalError> {
        let listeners = snapshot(&self.get_listeners);
        let mut actual_ids = ids;

        for listener in &listeners {
            actual_ids = self.funnel(listener.before_get_many(actual_ids))?;
        }

        let mut data_objects = match actual_ids {
            Some(ids) => {
                let fetched = self.backend.fetch_by_ids(&ids);
                self.funnel(fetched)?
            }
            None => {
                let fetched = self.backend.fetch_changed(self.watermark);
                let changed = self.funnel(fetched)?;
                self.update_latest_modification(&changed);
                changed
            }
        };

        for listener in &listeners {
            self.funnel(listener.after_get_many(&mut data_objects))?;
        }

        Ok(data_objects)
    }

    /// Advances the watermark to the most recent modification timestamp in
    /// the set; no-op when the set is empty
    fn update_latest_modification(&mut self, data_objects: &[T]) {
        for data_object in data_objects {
            if data_object.updated_at() > self.watermark {
                self.watermark = data_object.updated_at();
            }
        }
    }

    // ========================================
    // Save
    // ========================================

    /// Persists a single object. A virtual object comes back with a positive
    /// id and fresh timestamps. A listener veto aborts silently: nothing is
    /// persisted and no after-listener fires.
    pub fn save(&mut self, data_object: &mut T) -> Result<(), DalError> {
        let listeners = snapshot(&self.save_listeners);

        for listener in &listeners {
            if !self.funnel(listener.before_save(data_object))? {
                debug!("save vetoed by listener");
                return Ok(());
            }
        }

        let persisted = self.backend.persist(data_object);
        self.funnel(persisted)?;

        for listener in &listeners {
            self.funnel(listener.after_save(data_object))?;
        }

        Ok(())
    }

    pub fn save_many(&mut self, data_objects: &mut Vec<T>) -> Result<(), DalError> {
        let listeners = snapshot(&self.save_listeners);

        for listener in &listeners {
            if !self.funnel(listener.before_save_many(data_objects))? {
                debug!("batch save vetoed by listener");
                return Ok(());
            }
        }

        let persisted = self.backend.persist_many(data_objects);
        self.funnel(persisted)?;

        for listener in &listeners {
            self.funnel(listener.after_save_many(data_objects))?;
        }

        Ok(())
    }

    /// Loosely-typed overload: accepts any object and validates its runtime
    /// type against this repository's data object type before delegating
    pub fn save_any(&mut self, data_object: &mut dyn Any) -> Result<(), DalError> {
        match data_object.downcast_mut::<T>() {
            Some(data_object) => self.save(data_object),
            None => Err(DalError::InvalidArgument("data_object")),
        }
    }

    // ========================================
    // Delete
    // ========================================

    /// Soft-deletes a single object. A virtual object (never persisted) is
    /// only marked deleted locally; the backend is not touched and no error
    /// is raised, but after-listeners still fire.
    pub fn delete(&mut self, data_object: &mut T) -> Result<(), DalError> {
        let listeners = snapshot(&self.delete_listeners);

        for listener in &listeners {
            if !self.funnel(listener.before_delete(data_object))? {
                debug!("delete vetoed by listener");
                return Ok(());
            }
        }

        if data_object.is_virtual() {
            data_object.set_deleted(true);
        } else {
            let deleted = self.backend.soft_delete(data_object);
            self.funnel(deleted)?;
        }

        for listener in &listeners {
            self.funnel(listener.after_delete(data_object))?;
        }

        Ok(())
    }

    pub fn delete_many(&mut self, data_objects: &mut Vec<T>) -> Result<(), DalError> {
        let listeners = snapshot(&self.delete_listeners);

        for listener in &listeners {
            if !self.funnel(listener.before_delete_many(data_objects))? {
                debug!("batch delete vetoed by listener");
                return Ok(());
            }
        }

        let deleted = self.backend.soft_delete_many(data_objects);
        self.funnel(deleted)?;

        for listener in &listeners {
            self.funnel(listener.after_delete_many(data_objects))?;
        }

        Ok(())
    }

    /// Deletes by id. Listeners chain transforms of the id set instead of
    /// vetoing; an empty transformed set deletes nothing.
    pub fn delete_by_ids(&mut self, ids: &[i32]) -> Result<(), DalError> {
        debug!(count = ids.len(), "repository delete_by_ids");

        let listeners = snapshot(&self.delete_listeners);
        let mut ids_to_delete = ids.to_vec();

        for listener in &listeners {
            ids_to_delete = self.funnel(listener.before_delete_ids(ids_to_delete))?;
        }

        let deleted = self.backend.soft_delete_by_ids(&ids_to_delete);
        self.funnel(deleted)?;

        for listener in &listeners {
            self.funnel(listener.after_delete_ids(&ids_to_delete))?;
        }

        Ok(())
    }

    /// Loosely-typed counterpart of [`delete`](Self::delete)
    pub fn delete_any(&mut self, data_object: &mut dyn Any) -> Result<(), DalError> {
        match data_object.downcast_mut::<T>() {
            Some(data_object) => self.delete(data_object),
            None => Err(DalError::InvalidArgument("data_object")),
        }
    }

    // ========================================
    // Reload / clear / construction
    // ========================================

    /// Full resynchronization: returns the complete undeleted set regardless
    /// of the watermark, and resets the watermark as a side effect. A
    /// listener veto returns the accumulator as built so far without
    /// touching the backend.
    pub fn reload_all(&mut self) -> Result<Vec<T>, DalError> {
        let listeners = snapshot(&self.reload_listeners);
        let mut data_objects = Vec::new();

        for listener in &listeners {
            if !self.funnel(listener.before_reload(&mut data_objects))? {
                debug!("reload vetoed by listener");
                return Ok(data_objects);
            }
        }

        self.watermark = i64::MIN;

        let reloaded = self.backend.reload_all();
        data_objects.extend(self.funnel(reloaded)?);

        for listener in &listeners {
            self.funnel(listener.after_reload(&mut data_objects))?;
        }

        Ok(data_objects)
    }

    /// Wipes the backend storage and resets the watermark. No listener
    /// family is attached to clear.
    pub fn clear(&mut self) -> Result<(), DalError> {
        let cleared = self.backend.clear();
        self.funnel(cleared)?;

        self.watermark = i64::MIN;
        Ok(())
    }

    /// Constructs a fresh virtual object via the backend
    pub fn create_data_object(&self) -> Result<T, DalError> {
        let created = self.backend.new_data_object();
        self.funnel(created)
    }

    // ========================================
    // Listener registration
    // ========================================

    pub fn register_on_get(&self, listener: Arc<dyn GetListener<T>>) {
        register(&self.get_listeners, listener);
    }

    pub fn unregister_on_get(&self, listener: &Arc<dyn GetListener<T>>) {
        unregister(&self.get_listeners, listener);
    }

    /// Snapshot of the get registry, never the live collection
    pub fn on_get_listeners(&self) -> Vec<Arc<dyn GetListener<T>>> {
        snapshot(&self.get_listeners)
    }

    pub fn register_on_save(&self, listener: Arc<dyn SaveListener<T>>) {
        register(&self.save_listeners, listener);
    }

    pub fn unregister_on_save(&self, listener: &Arc<dyn SaveListener<T>>) {
        unregister(&self.save_listeners, listener);
    }

    pub fn on_save_listeners(&self) -> Vec<Arc<dyn SaveListener<T>>> {
        snapshot(&self.save_listeners)
    }

    pub fn register_on_delete(&self, listener: Arc<dyn DeleteListener<T>>) {
        register(&self.delete_listeners, listener);
    }

    pub fn unregister_on_delete(&self, listener: &Arc<dyn DeleteListener<T>>) {
        unregister(&self.delete_listeners, listener);
    }

    pub fn on_delete_listeners(&self) -> Vec<Arc<dyn DeleteListener<T>>> {
        snapshot(&self.delete_listeners)
    }

    pub fn register_on_reload(&self, listener: Arc<dyn ReloadListener<T>>) {
        register(&self.reload_listeners, listener);
    }

    pub fn unregister_on_reload(&self, listener: &Arc<dyn ReloadListener<T>>) {
        unregister(&self.reload_listeners, listener);
    }

    pub fn on_reload_listeners(&self) -> Vec<Arc<dyn ReloadListener<T>>> {
        snapshot(&self.reload_listeners)
    }
}
