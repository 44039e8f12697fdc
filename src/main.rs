use std::{process, sync::Arc};

use newsdesk::{
    application::{
        error::AppError,
        feed::HomeFeedService,
        placement::PlacementService,
        repos::{ArticlesRepo, ArticlesWriteRepo},
    },
    cache::{CacheConfig, HomeFeedCache},
    config,
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{self, AdminState, HttpState},
        memory::InMemoryArticles,
        telemetry,
    },
    util::clock::SystemClock,
};
use tokio::try_join;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Migrate(_) => run_migrate(settings).await,
    }
}

struct Stores {
    reader: Arc<dyn ArticlesRepo>,
    writer: Arc<dyn ArticlesWriteRepo>,
}

async fn init_stores(settings: &config::Settings) -> Result<Stores, AppError> {
    let Some(database_url) = settings.database.url.as_deref() else {
        warn!(
            target = "newsdesk::startup",
            "database url is not configured; articles are kept in memory and lost on exit"
        );
        let store = Arc::new(InMemoryArticles::new());
        return Ok(Stores {
            reader: store.clone(),
            writer: store,
        });
    };

    let pool = PostgresRepositories::connect(database_url, settings.database.max_connections.get())
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    if settings.database.run_migrations {
        PostgresRepositories::run_migrations(&pool)
            .await
            .map_err(|err| AppError::from(InfraError::migration(err.to_string())))?;
    }

    let repositories = Arc::new(PostgresRepositories::new(pool));
    Ok(Stores {
        reader: repositories.clone(),
        writer: repositories,
    })
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let stores = init_stores(&settings).await?;

    let cache = Arc::new(HomeFeedCache::new(
        CacheConfig::from(&settings.cache),
        Arc::new(SystemClock),
    ));

    let placement = PlacementService::new(stores.reader.clone(), stores.writer, cache.clone())
        .with_policy(settings.placement.policy())
        .with_scan_window(settings.placement.scan_window.get());
    let home = HomeFeedService::new(stores.reader.clone(), cache)
        .with_limits(settings.feed.limits());

    let http_state = HttpState {
        home: Arc::new(home),
        articles: stores.reader.clone(),
    };
    let admin_state = AdminState {
        placement: Arc::new(placement),
        articles: stores.reader,
    };

    serve_http(&settings, http_state, admin_state).await
}

async fn run_migrate(settings: config::Settings) -> Result<(), AppError> {
    let database_url = settings
        .database
        .url
        .as_deref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))
        .map_err(AppError::from)?;

    let pool = PostgresRepositories::connect(database_url, 1)
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;
    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::migration(err.to_string())))?;

    info!(target = "newsdesk::migrate", "Migrations applied");
    Ok(())
}

async fn serve_http(
    settings: &config::Settings,
    http_state: HttpState,
    admin_state: AdminState,
) -> Result<(), AppError> {
    let public_router = http::build_router(http_state);
    let admin_router = http::build_admin_router(admin_state);

    let public_listener = tokio::net::TcpListener::bind(settings.server.public_addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    let admin_listener = tokio::net::TcpListener::bind(settings.server.admin_addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "newsdesk::startup",
        public = %settings.server.public_addr,
        admin = %settings.server.admin_addr,
        featured_capacity = settings.placement.featured_capacity.get(),
        cache_enabled = settings.cache.enabled,
        cache_ttl_seconds = settings.cache.ttl_seconds.get(),
        "Listeners bound"
    );

    let public_server = axum::serve(public_listener, public_router.into_make_service());
    let admin_server = axum::serve(admin_listener, admin_router.into_make_service());

    try_join!(public_server, admin_server)
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;

    Ok(())
}
