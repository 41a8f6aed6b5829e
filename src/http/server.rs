//! HTTP server implementation.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::routing::post;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::MailgateConfig;
use crate::error::Result;
use crate::mail::MailRelay;
use crate::ratelimit::SlidingWindowLimiter;

use super::handlers;

/// Shared state injected into the request-handling path.
#[derive(Clone)]
pub struct AppState {
    /// The admission controller guarding the mail relay
    pub limiter: Arc<SlidingWindowLimiter>,
    /// Outbound mail delivery
    pub relay: Arc<dyn MailRelay>,
    /// Proxy addresses trusted to set `X-Forwarded-For`
    pub trusted_proxies: Arc<Vec<IpAddr>>,
}

/// HTTP server for the contact endpoint.
pub struct HttpServer {
    /// Address to bind to
    addr: SocketAddr,
    /// The assembled router
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server from the service configuration.
    ///
    /// Fails if a configured CORS origin is not a valid header value.
    pub fn new(config: &MailgateConfig, state: AppState) -> Result<Self> {
        let origins = config
            .cors_allowed_origins
            .iter()
            .map(|origin| Ok(origin.parse::<HeaderValue>()?))
            .collect::<Result<Vec<_>>>()?;

        let cors = CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::POST])
            .allow_headers([header::ORIGIN, header::CONTENT_TYPE, header::CONTENT_LENGTH]);

        Ok(Self {
            addr: config.bind_addr(),
            router: router(state, cors),
        })
    }

    /// Start the HTTP server with graceful shutdown.
    ///
    /// The server will shut down when the provided signal resolves.
    pub async fn serve_with_shutdown<F>(self, signal: F) -> Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(self.addr).await?;

        info!(addr = %self.addr, "Starting HTTP server for contact endpoint");

        axum::serve(
            listener,
            self.router
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(signal)
        .await?;

        Ok(())
    }
}

/// Assemble the router for the service.
pub(crate) fn router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/api/contact", post(handlers::submit_contact))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mail::ContactSubmission;
    use async_trait::async_trait;

    struct NullRelay;

    #[async_trait]
    impl MailRelay for NullRelay {
        async fn deliver(&self, _submission: &ContactSubmission) -> Result<()> {
            Ok(())
        }
    }

    fn test_config() -> MailgateConfig {
        serde_json::from_value(serde_json::json!({
            "email_from": "relay@example.com",
            "email_to": "inbox@example.com",
            "email_app_password": "secret",
        }))
        .unwrap()
    }

    fn test_state() -> AppState {
        AppState {
            limiter: Arc::new(SlidingWindowLimiter::default()),
            relay: Arc::new(NullRelay),
            trusted_proxies: Arc::new(Vec::new()),
        }
    }

    #[test]
    fn test_server_creation() {
        let _server = HttpServer::new(&test_config(), test_state()).unwrap();
    }

    #[test]
    fn test_invalid_cors_origin_rejected() {
        let mut config = test_config();
        config.cors_allowed_origins = vec!["bad\norigin".to_string()];
        assert!(HttpServer::new(&config, test_state()).is_err());
    }
}
