use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use photo_shield_core::{Scanner, Session};

/// Shared application state accessible to all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub scanner: Arc<Scanner>,
    /// The single working image. Requests take turns on it.
    pub session: Arc<Mutex<Session>>,
    pub jpeg_quality: u8,
}

impl AppState {
    pub fn new(scanner: Scanner, jpeg_quality: u8) -> Self {
        Self {
            scanner: Arc::new(scanner),
            session: Arc::new(Mutex::new(Session::new())),
            jpeg_quality,
        }
    }

    pub fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
