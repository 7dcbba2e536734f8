use crate::config::PortalConfig;
use crate::services::storage::S3StorageService;
use anyhow::anyhow;
use aws_sdk_s3::config::Region;
use std::env;
use std::sync::Arc;
use tracing::info;

fn required(name: &str) -> anyhow::Result<String> {
    env::var(name).map_err(|_| anyhow!("{} must be set", name))
}

pub async fn setup_storage(config: &PortalConfig) -> anyhow::Result<Arc<S3StorageService>> {
    let endpoint_url = required("S3_ENDPOINT")?;
    let access_key = required("S3_ACCESS_KEY")?;
    let secret_key = required("S3_SECRET_KEY")?;
    let bucket = env::var("S3_BUCKET").unwrap_or_else(|_| "materials".to_string());

    info!("☁️  S3 Storage: {} (Bucket: {})", endpoint_url, bucket);

    let aws_config = aws_config::from_env()
        .endpoint_url(&endpoint_url)
        .region(Region::new(
            env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
        ))
        .credentials_provider(aws_sdk_s3::config::Credentials::new(
            access_key, secret_key, None, None, "static",
        ))
        .load()
        .await;

    let s3_config = aws_sdk_s3::config::Builder::from(&aws_config)
        .force_path_style(true)
        .build();

    let s3_client = aws_sdk_s3::Client::from_conf(s3_config);

    // Ensure bucket exists
    match s3_client.head_bucket().bucket(&bucket).send().await {
        Ok(_) => info!("✅ Bucket '{}' is ready", bucket),
        Err(_) => {
            info!("🪣 Bucket '{}' not found, creating...", bucket);
            if let Err(e) = s3_client.create_bucket().bucket(&bucket).send().await {
                tracing::error!("❌ Failed to create bucket '{}': {}", bucket, e);
            } else {
                info!("✅ Bucket '{}' created successfully", bucket);
            }
        }
    }

    let public_base_url = config
        .storage_public_url
        .clone()
        .or_else(|| Some(format!("{}/{}", endpoint_url.trim_end_matches('/'), bucket)));

    Ok(Arc::new(S3StorageService::new(
        s3_client,
        bucket,
        public_base_url,
    )))
}
