//! Process startup plumbing shared by both service binaries

use anyhow::{Context, Result};
use axum::Router;
use std::env;
use std::path::{Path, PathBuf};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wagerhouse_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

pub fn load_env() {
    // 1) Standard dotenv search (cwd + parents)
    let _ = dotenv::dotenv();

    // 2) Also try the crate-root .env (common when running with --manifest-path
    // from elsewhere). CARGO_MANIFEST_DIR is fixed at compile time.
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));

    let candidates = [manifest_dir.join(".env"), manifest_dir.join("../.env")];

    for p in candidates {
        if p.exists() {
            let _ = dotenv::from_path(&p);
        }
    }
}

/// Resolve a database path from an env override, anchoring relative paths at
/// the crate directory so running from the repo root cannot silently create
/// a fresh empty DB somewhere else.
pub fn resolve_data_path(env_value: Option<String>, default_filename: &str) -> String {
    let base = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let Some(raw) = env_value.filter(|v| !v.trim().is_empty()) else {
        return base.join(default_filename).to_string_lossy().to_string();
    };

    let p = PathBuf::from(raw);
    if p.is_absolute() {
        return p.to_string_lossy().to_string();
    }

    base.join(p).to_string_lossy().to_string()
}

/// Read a port from the environment with a service-specific default.
pub fn port_from_env(var: &str, default: u16) -> u16 {
    env::var(var)
        .ok()
        .and_then(|v| v.parse::<u16>().ok())
        .unwrap_or(default)
}

/// Bind and serve a router with the standard middleware stack.
pub async fn serve(app: Router, service: &str, port: u16) -> Result<()> {
    let app = app
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = format!("0.0.0.0:{port}");
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("🌐 {service} listening on {addr}");
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_data_path_defaults_to_manifest_dir() {
        let resolved = resolve_data_path(None, "test.db");
        assert!(resolved.ends_with("test.db"));
        assert!(PathBuf::from(&resolved).is_absolute());
    }

    #[test]
    fn test_resolve_data_path_keeps_absolute_override() {
        let resolved = resolve_data_path(Some("/tmp/override.db".to_string()), "test.db");
        assert_eq!(resolved, "/tmp/override.db");
    }

    #[test]
    fn test_resolve_data_path_blank_override_falls_back() {
        let resolved = resolve_data_path(Some("   ".to_string()), "test.db");
        assert!(resolved.ends_with("test.db"));
    }
}
