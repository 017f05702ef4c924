//! HTTP server core implementation
//!
//! This module provides the HttpServer struct and its core methods.

use crate::config::{Config, ServerConfig};
use crate::server::routes::{self, health::health_check};
use crate::server::state::AppState;
use crate::utils::error::{GatewayError, Result};
use actix_web::{
    App, HttpServer as ActixHttpServer,
    middleware::{DefaultHeaders, Logger},
    web,
};
use tracing::info;

/// HTTP server
pub struct HttpServer {
    /// Server configuration
    config: ServerConfig,
    /// Application state
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server, building store and providers from `config`
    pub async fn new(config: &Config) -> Result<Self> {
        info!("Creating HTTP server");

        let state = AppState::from_config(config.clone()).await?;
        info!(
            providers = state.service.registry().len(),
            "Verification providers registered"
        );

        Ok(Self::from_state(state))
    }

    /// Serve an already-wired state
    pub fn from_state(state: AppState) -> Self {
        Self {
            config: state.config.gateway.server.clone(),
            state,
        }
    }

    /// Create the Actix-web application
    pub fn create_app(
        state: web::Data<AppState>,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        let max_body_size = state.config.gateway.server.max_body_size;

        App::new()
            .app_data(state)
            .app_data(web::PayloadConfig::new(max_body_size))
            .app_data(web::JsonConfig::default().limit(max_body_size))
            .wrap(Logger::default())
            .wrap(DefaultHeaders::new().add(("Server", "verification-gateway")))
            .route("/health", web::get().to(health_check))
            .configure(routes::verifications::configure_routes)
            .configure(routes::jobs::configure_routes)
    }

    /// Start the HTTP server
    pub async fn start(self) -> Result<()> {
        let bind_addr = self.config.address();

        info!("Starting HTTP server on {}", bind_addr);

        let state = web::Data::new(self.state);
        let mut server = ActixHttpServer::new(move || Self::create_app(state.clone()));
        if let Some(workers) = self.config.workers {
            server = server.workers(workers);
        }

        let server = server
            .bind(&bind_addr)
            .map_err(|e| Self::format_bind_error(e, &bind_addr))?
            .run();

        info!("HTTP server listening on {}", bind_addr);

        server
            .await
            .map_err(|e| GatewayError::internal(format!("Server error: {}", e)))?;

        info!("HTTP server stopped");
        Ok(())
    }

    fn format_bind_error(err: std::io::Error, bind_addr: &str) -> GatewayError {
        match err.kind() {
            std::io::ErrorKind::AddrInUse => GatewayError::Config(format!(
                "Address {} is already in use; change server.port or stop the other process",
                bind_addr
            )),
            std::io::ErrorKind::PermissionDenied => GatewayError::Config(format!(
                "Permission denied binding {}; ports below 1024 need elevated privileges",
                bind_addr
            )),
            _ => GatewayError::Io(err),
        }
    }

    /// Get server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get application state
    pub fn state(&self) -> &AppState {
        &self.state
    }
}
