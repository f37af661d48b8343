use actix_cors::Cors;
use actix_files::Files;
use actix_web::middleware::Logger;
use actix_web::{App, HttpServer, web};
use dotenv::dotenv;
use gigmarket_backend::auth::TokenVerifier;
use gigmarket_backend::config::{AuthConfig, Config};
use gigmarket_backend::create_pool;
use gigmarket_backend::handlers;
use gigmarket_backend::notify::{ConnectionRegistry, Notifier};
use gigmarket_backend::validation::json_config;
use migration::{Migrator, MigratorTrait};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let config = Config::from_env().map_err(std::io::Error::other)?;

    let db = create_pool(&config).await.map_err(|e| {
        tracing::error!(error = %e, "failed to connect to the database");
        std::io::Error::other(e)
    })?;

    if config.run_migrations {
        Migrator::up(&db, None).await.map_err(|e| {
            tracing::error!(error = %e, "migrations failed");
            std::io::Error::other(e)
        })?;
        tracing::info!("Migrations applied");
    }
    let db_data = web::Data::new(db);

    match &config.auth {
        AuthConfig::Secret(_) => tracing::info!("Verifying tokens with JWT_SECRET (HS256)"),
        AuthConfig::Supabase { project_ref, .. } => {
            tracing::info!(%project_ref, "Verifying tokens against Supabase JWKS")
        }
    }
    let verifier = web::Data::new(TokenVerifier::from_config(&config.auth));

    // One registry for the whole process; every worker pushes through it.
    let registry = Arc::new(ConnectionRegistry::new());
    let registry_data = web::Data::new(registry.clone());
    let notifier = web::Data::new(Notifier::new(registry));

    let static_dir = config.static_dir.clone();
    let bind_addr = config.bind_addr();
    tracing::info!("Server running at http://{bind_addr}");

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .max_age(3600);

        let mut app = App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(json_config())
            .app_data(db_data.clone())
            .app_data(verifier.clone())
            .app_data(registry_data.clone())
            .app_data(notifier.clone())
            .service(web::scope("/api").configure(handlers::init_routes));

        if let Some(dir) = &static_dir {
            app = app.service(Files::new("/", dir).index_file("index.html"));
        }
        app
    })
    .bind(&bind_addr)?
    .run()
    .await
}
