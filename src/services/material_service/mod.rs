use crate::config::PortalConfig;
use crate::services::{storage::StorageService, view_cache::ViewCache};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

pub mod delete;
pub mod listing;
pub mod types;
pub mod update;
pub mod upload;

pub use types::{ClassListing, DeleteOutcome, MaterialUpdate, NewMaterial, UploadedFile};

pub struct MaterialService {
    db: DatabaseConnection,
    storage: Arc<dyn StorageService>,
    cache: Arc<ViewCache>,
    config: PortalConfig,
}

impl MaterialService {
    pub fn new(
        db: DatabaseConnection,
        storage: Arc<dyn StorageService>,
        cache: Arc<ViewCache>,
        config: PortalConfig,
    ) -> Self {
        Self {
            db,
            storage,
            cache,
            config,
        }
    }
}
