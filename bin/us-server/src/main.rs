//! User Storage Server
//!
//! REST server for the user directory:
//! - Accounts: filtered listing, pagination, role-set lookup, mutations
//! - Roles, access points and role-access grants
//! - Health check and OpenAPI documentation
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `USER_STORAGE_CONFIG` | - | Path to a TOML config file |
//! | `USER_STORAGE_HTTP_PORT` | `8080` | HTTP API port |
//! | `USER_STORAGE_DATABASE_URL` | `mysql://root@127.0.0.1:3306/usersdb` | MySQL or SQLite connection URL |
//! | `USER_STORAGE_REDIS_ENABLED` | `true` | Evict cached accounts from Redis |
//! | `USER_STORAGE_REDIS_NODES` | `redis://redis:6379` | Comma-separated Redis node URLs |
//! | `USER_STORAGE_JWKS` / `JWT_SECRET` | - | JSON Web Key Set for identity tokens |
//! | `RUST_LOG` | `info` | Log level |

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::http::HeaderValue;
use tokio::{net::TcpListener, signal};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use utoipa_swagger_ui::SwaggerUi;

use us_config::{AppConfig, ConfigLoader};
use us_platform::store::{bootstrap_schema, connect, DatabaseBackend};
use us_platform::{
    platform_router, ActorIdentityExtractor, CacheInvalidator, NoopCacheInvalidator,
    PlatformServices, RedisCacheInvalidator, RouterSettings, TracingAuditSink,
};

#[tokio::main]
async fn main() -> Result<()> {
    us_common::logging::init_logging("us-server");

    info!("Starting User Storage Server");

    let config = ConfigLoader::new().load()?;

    let pool = connect(&config.database.url, config.database.max_connections).await?;
    if config.database.bootstrap_schema {
        let backend = DatabaseBackend::from_url(&config.database.url)?;
        bootstrap_schema(&pool, backend).await?;
        info!(backend = ?backend, "Schema bootstrapped");
    }

    let cache = cache_invalidator(&config).await?;

    let identity = ActorIdentityExtractor::new(config.auth.jwks.clone())
        .with_audience(config.auth.audience.clone());
    let services = PlatformServices::new(pool, cache, identity, Arc::new(TracingAuditSink));
    info!("Services initialized");

    let settings = RouterSettings {
        max_page_size: config.http.max_page_size,
    };
    let (router, openapi) = platform_router(&services, settings);

    let app = router
        .merge(SwaggerUi::new("/swagger-ui").url("/q/openapi", openapi))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.http.cors_origins));

    let addr = format!("{}:{}", config.http.host, config.http.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("API server listening on http://{}", addr);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("User Storage Server shutdown complete");
    Ok(())
}

/// Connect and ping the configured Redis nodes. An unreachable cache
/// aborts startup.
async fn cache_invalidator(config: &AppConfig) -> Result<Arc<dyn CacheInvalidator>> {
    if !config.redis.enabled {
        info!("Redis disabled; cache eviction is a no-op");
        return Ok(Arc::new(NoopCacheInvalidator));
    }

    let redis = RedisCacheInvalidator::connect(&config.redis.nodes).await?;
    redis.ping().await?;
    info!(nodes = config.redis.nodes.len(), "Connected to Redis");
    Ok(Arc::new(redis))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return base.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    base.allow_origin(AllowOrigin::list(allowed))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received...");
}
