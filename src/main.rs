use axum::http::{HeaderValue, Method};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use resume_screener_api::config::Config;
use resume_screener_api::gemini::GeminiClient;
use resume_screener_api::handlers;

/// Builds the CORS layer from configuration.
///
/// Development restricts origins to the configured list; production allows
/// any origin (the service sits behind a platform proxy there).
fn cors_layer(config: &Config) -> CorsLayer {
    if config.is_production() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Main entry point for the application.
///
/// This function initializes the application, including:
/// - Logging and tracing.
/// - Configuration loading (fails startup if the Gemini API key is absent).
/// - The Gemini client.
/// - HTTP routes and middleware (CORS, rate limiting, body size limit).
///
/// It then starts the Axum server.
///
/// # Returns
///
/// * `anyhow::Result<()>` - Ok if the server runs successfully, or an error
///   if initialization fails.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "resume_screener_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration; a missing GEMINI_API_KEY aborts startup here.
    let config = Config::from_env()?;

    let gemini = GeminiClient::new(
        config.gemini_base_url.clone(),
        config.gemini_api_key.clone(),
        config.gemini_model.clone(),
    )
    .map_err(|e| anyhow::anyhow!("Failed to initialize Gemini client: {}", e))?;
    tracing::info!("Gemini client initialized: {}", config.gemini_base_url);

    let cors = cors_layer(&config);

    // Build application state
    let app_state = Arc::new(handlers::AppState {
        config: config.clone(),
        gemini,
    });

    // Configure rate limiter: 10 requests/second per IP, burst of 20
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(10)
            .burst_size(20)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .unwrap(),
    );

    // Upload routes get a body size cap and rate limiting; health and the
    // banner stay outside both.
    let protected_routes = axum::Router::new()
        .route("/screen-resume", axum::routing::post(handlers::screen_resume))
        .route("/extract-resume", axum::routing::post(handlers::extract_resume))
        .layer(
            ServiceBuilder::new()
                // Request size limit: 10MB max payload (covers the PDF upload)
                .layer(RequestBodyLimitLayer::new(10 * 1024 * 1024))
                // Rate limiting: 10 req/sec per IP, burst of 20
                .layer(GovernorLayer {
                    config: governor_conf,
                }),
        );

    let app = axum::Router::new()
        .route("/", axum::routing::get(handlers::root))
        .route("/health", axum::routing::get(handlers::health))
        .merge(protected_routes)
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
