use std::sync::Arc;

use almanac_core::constants::OCCURRENCES_ROUTE_COMPONENT;
use almanac_engine::model::decode_events;
use almanac_engine::{
    CalendarContext, CalendarEventRenderModel, EngineError, Granularity, ViewWindow,
    compute_occurrences,
};
use almanac_service::error::ServiceError;
use almanac_service::feed::HttpFeed;
use almanac_service::view::load_occurrences;
use salvo::{Depot, Request, Response, Router, handler, http::StatusCode, writing::Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::calendar_handler::{get_context_from_depot, get_feed_from_depot};
use crate::error::{AppError, AppResult};

/// ## Summary
/// Error response payload
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// ## Summary
/// Occurrence computation request payload
///
/// `events` are raw schedule event records; malformed ones are skipped.
#[derive(Debug, Deserialize)]
pub struct OccurrencesRequest {
    #[serde(default)]
    pub events: Vec<Value>,
    /// Window start, epoch milliseconds
    pub start: i64,
    /// Window end (exclusive), epoch milliseconds
    pub end: i64,
    #[serde(default)]
    pub granularity: Granularity,
}

fn status_for(error: &AppError) -> StatusCode {
    match error {
        AppError::InvalidRequest(_)
        | AppError::EngineError(
            EngineError::InvalidWindow { .. } | EngineError::UnknownGranularity(_),
        ) => StatusCode::BAD_REQUEST,
        AppError::ServiceError(ServiceError::NoFeed) => StatusCode::SERVICE_UNAVAILABLE,
        AppError::ServiceError(
            ServiceError::Transport(_)
            | ServiceError::UpstreamStatus(_)
            | ServiceError::EngineError(_),
        ) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn respond(res: &mut Response, result: AppResult<Vec<CalendarEventRenderModel>>) {
    match result {
        Ok(models) => {
            tracing::debug!(count = models.len(), "Returning occurrences");
            res.render(Json(models));
        }
        Err(e) => {
            let status = status_for(&e);
            if status.is_server_error() {
                tracing::error!(error = %e, %status, "Failed to compute occurrences");
            } else {
                tracing::debug!(error = %e, %status, "Rejected occurrence request");
            }
            res.status_code(status);
            res.render(Json(ErrorResponse {
                error: e.to_string(),
            }));
        }
    }
}

async fn compute_from_body(
    req: &mut Request,
    ctx: &CalendarContext,
) -> AppResult<Vec<CalendarEventRenderModel>> {
    let body: OccurrencesRequest = req
        .parse_json()
        .await
        .map_err(|e| AppError::InvalidRequest(e.to_string()))?;
    let window = ViewWindow::new(body.start, body.end)?;
    let events = decode_events(body.events);
    Ok(compute_occurrences(ctx, &events, window, body.granularity))
}

/// Everything a feed-backed computation needs, resolved before any await.
struct FeedRequest {
    ctx: Arc<CalendarContext>,
    feed: Arc<HttpFeed>,
    window: ViewWindow,
    granularity: Granularity,
}

impl FeedRequest {
    fn from_parts(req: &Request, depot: &Depot) -> AppResult<Self> {
        let ctx = get_context_from_depot(depot)?;
        let feed = get_feed_from_depot(depot)?;

        let bound = |name: &str| {
            req.query::<i64>(name).ok_or_else(|| {
                AppError::InvalidRequest(format!("missing or non-numeric `{name}`"))
            })
        };
        let window = ViewWindow::new(bound("start")?, bound("end")?)?;
        let granularity = req
            .query::<String>("granularity")
            .map(|name| name.parse::<Granularity>())
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            ctx,
            feed,
            window,
            granularity,
        })
    }

    async fn run(self) -> AppResult<Vec<CalendarEventRenderModel>> {
        load_occurrences(self.feed.as_ref(), &self.ctx, self.window, self.granularity)
            .await
            .map_err(AppError::from)
    }
}

/// ## Summary
/// POST /api/schedule/occurrences - Compute entries for the posted events
///
/// ## Errors
/// Returns HTTP 400 for an unreadable body or an empty window
#[handler]
#[tracing::instrument(skip(req, depot, res), fields(path = %req.uri().path()))]
async fn compute(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    tracing::debug!("Processing occurrence computation request");
    let result = match get_context_from_depot(depot) {
        Ok(ctx) => compute_from_body(req, &ctx).await,
        Err(e) => Err(e),
    };
    respond(res, result);
}

/// ## Summary
/// GET /api/schedule/occurrences?start=&end=&granularity= - Compute entries
/// for the events served by the configured feed
///
/// ## Errors
/// Returns HTTP 400 for missing or invalid query parameters
/// Returns HTTP 503 if no feed is configured
/// Returns HTTP 502 if the feed fails or returns an unreadable body
#[handler]
#[tracing::instrument(skip(req, depot, res), fields(path = %req.uri().path()))]
async fn fetch(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    tracing::debug!("Processing feed occurrence request");
    let result = match FeedRequest::from_parts(req, depot) {
        Ok(request) => request.run().await,
        Err(e) => Err(e),
    };
    respond(res, result);
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path(OCCURRENCES_ROUTE_COMPONENT)
        .post(compute)
        .get(fetch)
}
