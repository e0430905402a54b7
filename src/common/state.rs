use std::sync::Arc;

use crate::config::Config;
use crate::sensors::{RequestContext, SensorManager};

#[derive(Clone)]
pub struct AppState {
    pub sensors: Arc<dyn SensorManager>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(sensors: Arc<dyn SensorManager>, config: Config) -> Self {
        Self {
            sensors,
            config: Arc::new(config),
        }
    }

    /// Context for one store call made on behalf of an HTTP request.
    #[must_use]
    pub fn request_context(&self) -> RequestContext {
        RequestContext::with_timeout(self.config.db_timeout())
    }
}
