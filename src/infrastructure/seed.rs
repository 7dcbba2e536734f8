use crate::entities::{categories, prelude::*};
use crate::models::ClassAssociation;
use chrono::{Duration, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, Set};
use tracing::info;
use uuid::Uuid;

pub const DEFAULT_CATEGORIES: [&str; 5] = [
    "Chapterwise Notes",
    "Previous Year Questions (PYQs)",
    "Sample Papers",
    "Textbooks",
    "Practicals",
];

/// Inserts the default top-level categories when the table is empty.
pub async fn seed_default_categories(db: &DatabaseConnection) -> anyhow::Result<usize> {
    if Categories::find().count(db).await? > 0 {
        return Ok(0);
    }

    info!("🌱 Seeding default categories...");

    // Distinct timestamps keep newest-first ordering stable
    let now = Utc::now();
    for (i, name) in DEFAULT_CATEGORIES.iter().enumerate() {
        let model = categories::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            name: Set(name.to_string()),
            class_association: Set(ClassAssociation::Both.as_str().to_string()),
            parent_id: Set(None),
            created_at: Set(now + Duration::milliseconds(i as i64)),
        };
        model.insert(db).await?;
    }

    info!("✅ Seeding completed.");
    Ok(DEFAULT_CATEGORIES.len())
}
