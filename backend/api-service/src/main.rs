use actix_cors::Cors;
use actix_middleware::{
    security_headers, Logging, RateLimitConfig, RateLimitMiddleware, RequestIdMiddleware,
};
use actix_web::{http::header, web, App, HttpServer};
use api_service::handlers;
use api_service::middleware::PgAccountGate;
use api_service::services::EmailService;
use sqlx::postgres::PgPoolOptions;
use std::io;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate =
            signal(SignalKind::terminate()).expect("Failed to install SIGTERM handler");

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = terminate.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,api_service=debug,actix_web=info,sqlx=warn".into());

    let json = std::env::var("LOG_FORMAT").map(|f| f == "json").unwrap_or(false);
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// API Service
///
/// Public REST API for the SNS platform.
#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = match api_service::Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Configuration loading failed: {}", e);
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!(
        env = %config.app.env,
        "Starting api-service v{}",
        env!("CARGO_PKG_VERSION")
    );

    crypto_core::jwt::initialize_jwt_secret(&config.jwt.secret)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;

    let db_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await
        .map_err(|e| {
            tracing::error!("Database connection failed: {}", e);
            io::Error::new(io::ErrorKind::ConnectionRefused, e.to_string())
        })?;
    tracing::info!("Database pool created");

    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .map_err(|e| {
            tracing::error!("Database migration failed: {}", e);
            io::Error::new(io::ErrorKind::Other, e.to_string())
        })?;
    tracing::info!("Database migrations applied");

    let email_service = EmailService::new(&config.email, &config.app)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;
    tokio::fs::create_dir_all(&config.media.dir).await?;

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    let rate_limits = RateLimitConfig::for_environment(&config.app.env);
    if config.app.env != "production" {
        tracing::warn!(
            auth_limit = rate_limits.auth_limit,
            general_limit = rate_limits.general_limit,
            "Rate limit relaxed for non-production environment"
        );
    }
    let rate_limiter = Arc::new(actix_middleware::RateLimiter::new(rate_limits.window));

    let gate: Arc<dyn actix_middleware::AccountGate> =
        Arc::new(PgAccountGate::new(db_pool.clone()));
    let config_data = web::Data::new(config.clone());
    let pool_data = web::Data::new(db_pool.clone());
    let email_data = web::Data::new(email_service);

    let server = HttpServer::new(move || {
        let mut cors = Cors::default();
        for origin in config_data.allowed_origins() {
            cors = cors.allowed_origin(&origin);
        }
        cors = cors
            .allowed_methods(["GET", "POST", "PUT", "DELETE", "PATCH", "OPTIONS"])
            .allowed_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
            .expose_headers(["X-Request-ID", "X-RateLimit-Remaining"])
            .supports_credentials()
            .max_age(3600);

        let gate = gate.clone();

        App::new()
            .app_data(config_data.clone())
            .app_data(pool_data.clone())
            .app_data(email_data.clone())
            .configure(handlers::extractor_config)
            .wrap(RateLimitMiddleware::with_limiter(
                rate_limits.clone(),
                rate_limiter.clone(),
            ))
            .wrap(security_headers(&config_data.app.env))
            .wrap(cors)
            .wrap(Logging)
            .wrap(RequestIdMiddleware)
            .wrap(tracing_actix_web::TracingLogger::default())
            .route("/health", web::get().to(handlers::health::health))
            .route("/uploads/{name}", web::get().to(handlers::media::serve_file))
            .service(web::scope("/api/v1").configure(move |cfg| handlers::configure(cfg, gate)))
    })
    .bind(&bind_address)?
    .run();

    tracing::info!("HTTP server listening on {}", bind_address);
    let server_handle = server.handle();

    let mut tasks: JoinSet<io::Result<()>> = JoinSet::new();

    tasks.spawn(async move {
        tracing::info!("HTTP server is running");
        server.await
    });

    let cleanup_pool = db_pool.clone();
    tasks.spawn(async move {
        api_service::jobs::start_token_cleanup(cleanup_pool).await;
        Ok(())
    });

    let mut first_error: Option<io::Error> = None;

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = tasks.join_next() => {
                match result {
                    Some(Ok(Ok(_))) => {
                        tracing::info!("Background task completed");
                    }
                    Some(Ok(Err(e))) => {
                        tracing::error!("Task returned error: {}", e);
                        first_error.get_or_insert(e);
                        server_handle.stop(true).await;
                        tasks.shutdown().await;
                        break;
                    }
                    Some(Err(e)) => {
                        tracing::error!("Task join error: {}", e);
                        first_error.get_or_insert(io::Error::new(io::ErrorKind::Other, e.to_string()));
                        server_handle.stop(true).await;
                        tasks.shutdown().await;
                        break;
                    }
                    None => break,
                }
            }
            _ = &mut shutdown => {
                tracing::info!("Shutdown signal received");
                server_handle.stop(true).await;
                tasks.shutdown().await;
                break;
            }
        }
    }

    db_pool.close().await;
    tracing::info!("api-service stopped");

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
