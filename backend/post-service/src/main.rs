use actix_cors::Cors;
use actix_web::{web, App, HttpResponse, HttpServer};
use anyhow::Context;
use post_service::db::{create_pool, DbConfig, PgCommentRepository, PgLikeRepository, PgPostRepository};
use post_service::geocoding::NominatimClient;
use post_service::handlers;
use post_service::services::{CommentService, LikeRegistry, LocationResolver, PostService};
use sqlx::PgPool;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

async fn health_summary(pool: web::Data<PgPool>) -> HttpResponse {
    match sqlx::query("SELECT 1").execute(pool.get_ref()).await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "status": "ok",
            "service": "post-service",
            "version": env!("CARGO_PKG_VERSION")
        })),
        Err(e) => HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "status": "unhealthy",
            "error": format!("PostgreSQL connection failed: {}", e),
            "service": "post-service"
        })),
    }
}

async fn liveness_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({"alive": true}))
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info,sqlx=warn".into());
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = match post_service::Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Configuration loading failed: {}", e);
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Starting post-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    let db_pool = create_pool(DbConfig::from(&config.database))
        .await
        .context("Failed to create database pool")?;

    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");

    let geocoder = NominatimClient::new(&config.geocoding)
        .context("Failed to build geocoding client")?;
    let resolver = LocationResolver::new(Arc::new(geocoder), config.geocoding.timeout());
    tracing::info!(
        base_url = %config.geocoding.base_url,
        timeout_ms = config.geocoding.timeout_ms,
        "Geocoding client configured"
    );

    let post_store = Arc::new(PgPostRepository::new(db_pool.clone()));
    let comment_store = Arc::new(PgCommentRepository::new(db_pool.clone()));
    let like_store = Arc::new(PgLikeRepository::new(db_pool.clone()));

    let posts_data = web::Data::new(PostService::new(
        post_store.clone(),
        comment_store.clone(),
        resolver,
    ));
    let comments_data = web::Data::new(CommentService::new(comment_store, post_store));
    let likes_data = web::Data::new(LikeRegistry::new(like_store));
    let pool_data = web::Data::new(db_pool);

    let bind_address = (config.app.host.clone(), config.app.port);
    tracing::info!("Starting HTTP server on {}:{}", bind_address.0, bind_address.1);

    let cors_origins = config.cors.allowed_origins.clone();
    HttpServer::new(move || {
        let mut cors = Cors::default();
        for origin in cors_origins.split(',') {
            let origin = origin.trim();
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else if !origin.is_empty() {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        App::new()
            .app_data(pool_data.clone())
            .app_data(posts_data.clone())
            .app_data(comments_data.clone())
            .app_data(likes_data.clone())
            .wrap(cors)
            .wrap(tracing_actix_web::TracingLogger::default())
            .route("/metrics", web::get().to(post_service::metrics::serve_metrics))
            .route("/api/v1/health", web::get().to(health_summary))
            .route("/api/v1/health/live", web::get().to(liveness_check))
            .configure(handlers::configure_routes)
    })
    .bind(bind_address)
    .context("Failed to bind HTTP server")?
    .run()
    .await
    .context("HTTP server error")?;

    tracing::info!("Post-service shutting down");
    Ok(())
}
