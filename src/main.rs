use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{error, http::StatusCode, middleware, web, App, HttpResponse, HttpServer};
use intent_match::config::Settings;
use intent_match::core::{MatchingOrchestrator, PresetRegistry};
use intent_match::routes::{self, matching::AppState};
use intent_match::services::{LocalArtifactResolver, PostgresClient};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        let status = StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST);
        HttpResponse::build(status).json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(
    err: error::JsonPayloadError,
    req: &actix_web::HttpRequest,
) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

fn startup_error(context: &str, e: impl std::fmt::Display) -> std::io::Error {
    error!("{}: {}", context, e);
    std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", context, e))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Initialize logging
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }

    info!("Starting intent matching service...");

    // Load configuration
    let settings = Settings::load().map_err(|e| startup_error("Failed to load configuration", e))?;

    info!("Configuration loaded successfully");

    // Resolve presets once; a bad preset or model stops startup
    let scoring = Arc::new(settings.scoring.clone());
    let resolver = LocalArtifactResolver::new(settings.model.artifact_dir.clone());
    let presets = PresetRegistry::build(&settings.preset_definitions(), scoring, &resolver)
        .map_err(|e| startup_error("Invalid settings presets", e))?;

    info!("Settings presets ready: {:?}", presets.names());

    if presets.get(&settings.matching.default_preset).is_err() {
        return Err(startup_error(
            "Unknown default preset",
            &settings.matching.default_preset,
        ));
    }

    // Initialize PostgreSQL client
    let db_max_conn = settings.database.max_connections.unwrap_or(10);
    let db_min_conn = settings.database.min_connections.unwrap_or(1);

    let postgres = PostgresClient::new(&settings.database.url, db_max_conn, db_min_conn)
        .await
        .map_err(|e| startup_error("Failed to connect to PostgreSQL", e))?;

    info!("PostgreSQL client initialized (max: {} connections)", db_max_conn);

    let orchestrator = MatchingOrchestrator::new(
        postgres.clone(),
        postgres,
        Arc::new(presets),
        settings.matching.orchestrator(),
    );

    // Build application state
    let app_state = AppState {
        orchestrator: Arc::new(orchestrator),
        default_preset: settings.matching.default_preset.clone(),
        default_top_n: settings.matching.default_top_n,
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
