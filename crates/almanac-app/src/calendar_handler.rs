use std::sync::Arc;

use almanac_core::error::CoreError;
use almanac_engine::CalendarContext;
use almanac_service::error::ServiceError;
use almanac_service::feed::HttpFeed;
use salvo::async_trait;

use crate::error::AppResult;

/// Injects the calendar context and, when configured, the upstream feed.
pub struct CalendarHandler {
    pub context: Arc<CalendarContext>,
    pub feed: Option<Arc<HttpFeed>>,
}

#[async_trait]
impl salvo::Handler for CalendarHandler {
    #[tracing::instrument(skip(self, _req, depot, _res, _ctrl))]
    async fn handle(
        &self,
        _req: &mut salvo::Request,
        depot: &mut salvo::Depot,
        _res: &mut salvo::Response,
        _ctrl: &mut salvo::FlowCtrl,
    ) {
        depot.inject(Arc::clone(&self.context));
        if let Some(feed) = &self.feed {
            depot.inject(Arc::clone(feed));
        }
    }
}

/// ## Summary
/// Retrieves the calendar context from the depot.
///
/// ## Errors
/// Returns an error if the context is not found in the depot.
pub fn get_context_from_depot(depot: &salvo::Depot) -> AppResult<Arc<CalendarContext>> {
    depot
        .obtain::<Arc<CalendarContext>>()
        .cloned()
        .map_err(|_err| CoreError::InvariantViolation("Calendar context not found in depot").into())
}

/// ## Summary
/// Retrieves the upstream event feed from the depot.
///
/// ## Errors
/// Returns `ServiceError::NoFeed` if no feed is configured.
pub fn get_feed_from_depot(depot: &salvo::Depot) -> AppResult<Arc<HttpFeed>> {
    depot
        .obtain::<Arc<HttpFeed>>()
        .cloned()
        .map_err(|_err| ServiceError::NoFeed.into())
}
