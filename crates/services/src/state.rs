use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use exam_core::model::NavigationState;

/// Navigation state shared by the controller, the provisioner and the
/// answer store.
///
/// Every access is a short synchronous critical section; the lock is never
/// held across an `.await`.
#[derive(Debug, Clone)]
pub struct SharedNavigation {
    inner: Arc<Mutex<NavigationState>>,
}

impl SharedNavigation {
    #[must_use]
    pub fn new(state: NavigationState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(state)),
        }
    }

    pub fn read<R>(&self, f: impl FnOnce(&NavigationState) -> R) -> R {
        f(&self.lock())
    }

    pub fn update<R>(&self, f: impl FnOnce(&mut NavigationState) -> R) -> R {
        f(&mut self.lock())
    }

    /// Owned copy for rendering.
    #[must_use]
    pub fn snapshot(&self) -> NavigationState {
        self.read(NavigationState::clone)
    }

    fn lock(&self) -> MutexGuard<'_, NavigationState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
