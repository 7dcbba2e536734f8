use crate::entities::{categories, materials};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Schema};
use std::env;
use std::time::Duration;
use tracing::info;

pub async fn setup_database() -> anyhow::Result<DatabaseConnection> {
    let db_url =
        env::var("DATABASE_URL").map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;

    info!("📂 Database: {}", db_url);

    let mut opt = ConnectOptions::new(&db_url);
    opt.max_connections(20)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(30))
        .acquire_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .sqlx_logging(true)
        .sqlx_logging_level(log::LevelFilter::Debug);

    let db = Database::connect(opt).await?;

    info!("✅ Database connected successfully");

    run_migrations(&db).await?;

    Ok(db)
}

pub async fn run_migrations(db: &DatabaseConnection) -> anyhow::Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    info!("🔄 Running auto-migrations...");

    // Categories first: materials reference them
    let stmts = vec![
        (
            "categories",
            schema
                .create_table_from_entity(categories::Entity)
                .if_not_exists()
                .to_owned(),
        ),
        (
            "materials",
            schema
                .create_table_from_entity(materials::Entity)
                .if_not_exists()
                .to_owned(),
        ),
    ];

    for (name, stmt) in stmts {
        let stmt = builder.build(&stmt);
        db.execute(stmt).await?;
        info!("   - Table '{}' checked/created", name);
    }

    let indexes = [
        "CREATE INDEX IF NOT EXISTS idx_categories_parent_id ON categories(parent_id)",
        "CREATE INDEX IF NOT EXISTS idx_materials_class ON materials(class)",
        "CREATE INDEX IF NOT EXISTS idx_materials_category_id ON materials(category_id)",
        "CREATE INDEX IF NOT EXISTS idx_materials_created_at ON materials(created_at)",
    ];

    for query in indexes {
        match db.execute_unprepared(query).await {
            Ok(_) => tracing::debug!("   - Executed schema update: {}", query),
            Err(e) => tracing::warn!("   - Schema update warning: {} -> {}", query, e),
        }
    }

    Ok(())
}
