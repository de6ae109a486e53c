//! Application state shared across all handlers.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::config::Config;
use crate::services::catalog::ApiCatalog;
use crate::services::sink::{AccessLogSink, ConsoleSink};
use crate::services::token::TokenService;

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// API description catalog.
    ///
    /// Frozen at startup: changing the description requires a restart.
    api_catalog: ApiCatalog,

    /// Bearer-token decoding service.
    token_service: TokenService,

    /// Destination for access-log records.
    access_log_sink: Arc<dyn AccessLogSink>,

    /// Whether the interceptor records access-log entries.
    access_log_enabled: bool,
}

impl AppState {
    /// Create application state from configuration.
    ///
    /// A missing API description file degrades to an empty catalog; a
    /// present but unparseable one aborts startup.
    pub fn new(config: &Config) -> Result<Self> {
        let api_catalog = if config.api_description_path.is_file() {
            let catalog = ApiCatalog::from_file(&config.api_description_path)
                .context("failed to load API description")?;
            info!(
                path = %config.api_description_path.display(),
                "API description loaded"
            );
            catalog
        } else {
            warn!(
                path = %config.api_description_path.display(),
                "API description not found; serving an empty document"
            );
            ApiCatalog::empty()
        };

        let token_service = TokenService::new(config.jwt_secret.as_bytes());

        Ok(Self::with_services(
            api_catalog,
            token_service,
            Arc::new(ConsoleSink),
            config.access_log_enabled,
        ))
    }

    /// Assemble state from explicit collaborators.
    ///
    /// Lets tests and alternate hosts substitute the catalog or the sink.
    pub fn with_services(
        api_catalog: ApiCatalog,
        token_service: TokenService,
        access_log_sink: Arc<dyn AccessLogSink>,
        access_log_enabled: bool,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                api_catalog,
                token_service,
                access_log_sink,
                access_log_enabled,
            }),
        }
    }

    /// API description catalog.
    pub fn api_catalog(&self) -> &ApiCatalog {
        &self.inner.api_catalog
    }

    /// Bearer-token decoding service.
    pub fn token_service(&self) -> &TokenService {
        &self.inner.token_service
    }

    /// Access-log sink.
    pub fn access_log_sink(&self) -> &Arc<dyn AccessLogSink> {
        &self.inner.access_log_sink
    }

    /// Whether access logging is enabled for intercepted requests.
    pub fn access_log_enabled(&self) -> bool {
        self.inner.access_log_enabled
    }
}
