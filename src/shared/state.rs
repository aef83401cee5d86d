use std::sync::Arc;

use crate::config::AppConfig;
use crate::media::ImageStore;
use crate::payments::PaymentProvider;
use crate::shared::utils::DbPool;

pub struct AppState {
    pub conn: DbPool,
    pub config: AppConfig,
    pub images: Arc<dyn ImageStore>,
    pub payments: Arc<dyn PaymentProvider>,
}

impl Clone for AppState {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
            config: self.config.clone(),
            images: Arc::clone(&self.images),
            payments: Arc::clone(&self.payments),
        }
    }
}
