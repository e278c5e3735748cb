use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use tracing::{debug, info};

use super::event::{AlarmCallback, Event};

/// An event that can be reached from more than one place, e.g. from a
/// pending alarm.
///
/// Cloning the handle does not clone the event. Each pending alarm holds a
/// handle, so the event stays alive until every alarm has fired.
#[derive(Debug, Clone)]
pub struct SharedEvent {
    inner: Arc<RwLock<Event>>,
}

impl SharedEvent {
    pub fn new(event: Event) -> Self {
        Self {
            inner: Arc::new(RwLock::new(event)),
        }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, Event> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, Event> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Shallow copy of the current state.
    pub fn snapshot(&self) -> Event {
        self.read().clone()
    }

    pub fn ptr_eq(&self, other: &SharedEvent) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Calls `callback` once, `offset` after this call, with a handle to this
    /// event.
    ///
    /// Returns immediately. There is no way to cancel the alarm: calling this
    /// again only replaces the recorded offset and callback, and every timer
    /// already started still fires.
    ///
    /// Takes the write lock to record the alarm, so calling it while the same
    /// thread holds a guard from [`read`](Self::read) or
    /// [`write`](Self::write) on this handle deadlocks.
    pub fn set_alarm<F>(&self, offset: Duration, callback: F) -> &Self
    where
        F: Fn(SharedEvent) + Send + Sync + 'static,
    {
        let callback: AlarmCallback = Arc::new(callback);
        self.write().record_alarm(offset, Arc::clone(&callback));

        let event = self.clone();
        debug!(?offset, "scheduling alarm");
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(async move {
                    tokio::time::sleep(offset).await;
                    fire(event, callback);
                });
            }
            Err(_) => {
                std::thread::spawn(move || {
                    std::thread::sleep(offset);
                    fire(event, callback);
                });
            }
        }
        self
    }
}

impl From<Event> for SharedEvent {
    fn from(event: Event) -> Self {
        Self::new(event)
    }
}

fn fire(event: SharedEvent, callback: AlarmCallback) {
    info!(summary = %event.read().summary(), "alarm fired");
    callback(event);
}
