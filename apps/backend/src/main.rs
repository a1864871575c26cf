use actix_web::{web, App, HttpServer};
use sorter_backend::config::game::GameConfig;
use sorter_backend::config::retention::RetentionConfig;
use sorter_backend::config::server::ServerConfig;
use sorter_backend::jobs::spawn_scheduler;
use sorter_backend::telemetry::init_tracing;
use sorter_backend::{
    build_state, cors_middleware, routes, DbProfile, RequestTrace, StructuredLogger, TraceSpan,
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    init_tracing();

    // Environment variables come from the runtime (docker env_file, or a
    // sourced .env in local dev).
    let configs = ServerConfig::from_env().and_then(|server| {
        Ok((server, GameConfig::from_env()?, RetentionConfig::from_env()?))
    });
    let (server, game, retention) = match configs {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    let app_state = match build_state()
        .with_db(DbProfile::Prod)
        .with_game(game)
        .with_retention(retention.clone())
        .build()
        .await
    {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, "failed to build application state");
            std::process::exit(1);
        }
    };

    let shutdown = CancellationToken::new();
    let scheduler = app_state
        .db()
        .cloned()
        .map(|db| spawn_scheduler(db, retention, shutdown.clone()));

    info!(host = %server.host, port = server.port, "starting sorter backend");
    let data = web::Data::new(app_state);

    let result = HttpServer::new(move || {
        App::new()
            .wrap(cors_middleware())
            .wrap(StructuredLogger)
            .wrap(TraceSpan)
            .wrap(RequestTrace)
            .app_data(data.clone())
            .configure(routes::configure)
    })
    .bind((server.host.as_str(), server.port))?
    .run()
    .await;

    shutdown.cancel();
    if let Some(handle) = scheduler {
        let _ = handle.await;
    }
    result
}
