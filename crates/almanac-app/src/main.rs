use std::sync::Arc;

use almanac_app::app::api::routes;
use almanac_app::calendar_handler::CalendarHandler;
use almanac_core::config::load_config;
use almanac_engine::CalendarContext;
use almanac_service::feed::HttpFeed;
use almanac_service::localization::load_catalog;
use salvo::conn::TcpListener;
use salvo::{Listener, Router};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (filter_layer, filter_handle) = reload::Layer::new(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    tracing::info!("Starting Almanac schedule occurrence server");

    let config = load_config()?;

    tracing::info!(config = ?config, "Configuration loaded");

    if let Ok(filter) = EnvFilter::try_new(config.logging.level.as_str()) {
        if let Err(e) = filter_handle.modify(|current| *current = filter) {
            tracing::warn!(error = %e, "Failed to update log filter from config");
        }
    } else {
        tracing::warn!(level = %config.logging.level, "Invalid log level in config, keeping debug");
    }

    let catalog = load_catalog(config.calendar.catalog_path.as_deref())?;
    let context = CalendarContext::from_settings(&config.calendar, Arc::new(catalog))?;
    let feed = HttpFeed::from_settings(&config.feed)?;

    match &feed {
        Some(_) => tracing::info!(url = ?config.feed.url, "Event feed configured"),
        None => tracing::info!("No event feed configured, GET occurrences is disabled"),
    }

    let bind_addr = config.server.bind_addr();
    let acceptor = TcpListener::new(bind_addr.clone()).bind().await;

    let router = Router::new()
        .hoop(CalendarHandler {
            context: Arc::new(context),
            feed: feed.map(Arc::new),
        })
        .push(routes()?);

    tracing::info!("Server listening on {bind_addr}");

    salvo::Server::new(acceptor).serve(router).await;

    Ok(())
}
