use std::sync::Arc;

use crate::application::services::SessionController;

#[derive(Clone)]
pub struct AppState {
    pub session: Arc<SessionController>,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(session: Arc<SessionController>, max_upload_bytes: usize) -> Self {
        Self {
            session,
            max_upload_bytes,
        }
    }
}
