mod blob;
mod config;
mod db;
mod errors;
mod models;
mod prompts;
mod routes;
mod state;
mod store;
mod versioning;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::blob::{BlobStore, CachedBlobStore, MemoryBlobStore, S3BlobStore};
use crate::config::{BackendConfig, Config, S3Config};
use crate::db::create_pool;
use crate::prompts::PromptFacade;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::{MemoryMetadataStore, MetadataStore, PgMetadataStore};
use crate::versioning::{RetryPolicy, UuidGenerator, VersionManager};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting promptstore v{}", env!("CARGO_PKG_VERSION"));

    let (metadata, blobs): (Arc<dyn MetadataStore>, Arc<dyn BlobStore>) = match &config.backend {
        BackendConfig::Memory => {
            info!("Using in-memory storage; data will not survive a restart");
            (
                Arc::new(MemoryMetadataStore::new()),
                Arc::new(MemoryBlobStore::new()),
            )
        }
        BackendConfig::Aws { database_url, s3 } => {
            let pool = create_pool(database_url).await?;
            info!("PostgreSQL metadata store initialized");

            let client = build_s3_client(s3).await;
            info!("S3 blob store initialized (bucket: {})", s3.bucket);

            (
                Arc::new(PgMetadataStore::new(pool)),
                Arc::new(S3BlobStore::new(client, s3.bucket.clone())),
            )
        }
    };

    // Optional Redis read-through cache for prompt content
    let blobs: Arc<dyn BlobStore> = match &config.redis_url {
        Some(url) => {
            let client = redis::Client::open(url.as_str())?;
            let conn = client.get_multiplexed_async_connection().await?;
            info!("Redis content cache enabled (ttl: {}s)", config.cache_ttl_secs);
            Arc::new(CachedBlobStore::new(blobs, conn, config.cache_ttl_secs))
        }
        None => blobs,
    };

    let retry = RetryPolicy {
        max_attempts: config.cas_max_attempts,
        base_delay: config.cas_base_delay,
    };
    let manager = VersionManager::new(
        metadata,
        blobs,
        Arc::new(UuidGenerator),
        retry,
        config.max_prompt_bytes,
    );

    // Build app state
    let state = AppState {
        prompts: PromptFacade::new(Arc::new(manager)),
        config: config.clone(),
    };

    // Build router. A timed-out request drops its future, abandoning any
    // in-flight storage call before the next write is issued.
    let app = build_router(state)
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(s3: &S3Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &s3.access_key_id,
        &s3.secret_access_key,
        None,
        None,
        "promptstore-static",
    );

    let shared = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new(s3.region.clone()))
        .credentials_provider(credentials)
        .endpoint_url(&s3.endpoint)
        .load()
        .await;

    // MinIO only serves path-style bucket addressing.
    let s3_config = aws_sdk_s3::config::Builder::from(&shared)
        .force_path_style(true)
        .build();

    aws_sdk_s3::Client::from_conf(s3_config)
}
