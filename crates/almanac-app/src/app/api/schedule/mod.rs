use almanac_core::constants::SCHEDULE_ROUTE_COMPONENT;
use salvo::Router;

mod occurrences;
#[cfg(test)]
mod occurrences_tests;

#[must_use]
pub fn routes() -> Router {
    Router::with_path(SCHEDULE_ROUTE_COMPONENT).push(occurrences::routes())
}
