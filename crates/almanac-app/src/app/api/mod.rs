mod app_specific;
mod schedule;

use almanac_core::constants::API_ROUTE_COMPONENT;
use salvo::Router;

/// ## Summary
/// Constructs the main API router.
///
/// ## Errors
/// Returns an error if any child route handler fails to initialize.
pub fn routes() -> anyhow::Result<Router> {
    Ok(Router::with_path(API_ROUTE_COMPONENT)
        .push(app_specific::routes())
        .push(schedule::routes()))
}
