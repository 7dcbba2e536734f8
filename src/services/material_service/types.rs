use crate::entities::{categories, materials};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// Raw upload form as received from the admin client.
pub struct NewMaterial {
    pub title: String,
    pub class: String,
    /// Unnormalized: may be empty or the literal "null".
    pub category_id: Option<String>,
    pub file: Option<UploadedFile>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct MaterialUpdate {
    pub title: String,
    pub class: String,
    pub category_id: Option<String>,
}

#[derive(Debug, Default)]
pub struct DeleteOutcome {
    /// Set when the row is gone but the stored file could not be removed.
    pub warning: Option<String>,
}

/// Everything a class page is rendered from before per-request filtering.
/// `categories` is the whole forest; descendant lookups need every node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassListing {
    pub materials: Vec<materials::Model>,
    pub categories: Vec<categories::Model>,
}
