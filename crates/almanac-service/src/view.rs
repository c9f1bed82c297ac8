//! A calendar view that keeps at most one fetch in flight.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use almanac_engine::{
    CalendarContext, CalendarEventRenderModel, Granularity, ViewWindow, compute_occurrences,
};
use tokio::task::AbortHandle;

use crate::error::{ServiceError, ServiceResult};
use crate::feed::EventSource;

/// ## Summary
/// Fetches events for `window` and runs the occurrence pipeline on them.
///
/// ## Errors
/// Returns whatever error the source reports.
pub async fn load_occurrences<S: EventSource>(
    source: &S,
    ctx: &CalendarContext,
    window: ViewWindow,
    granularity: Granularity,
) -> ServiceResult<Vec<CalendarEventRenderModel>> {
    let events = source.fetch(window).await?;
    Ok(compute_occurrences(ctx, &events, window, granularity))
}

/// Refresh coordinator for one visible calendar.
///
/// Starting a refresh aborts the previous in-flight fetch. A refresh that
/// was overtaken resolves to `ServiceError::Superseded` instead of
/// returning stale entries.
#[derive(Debug)]
pub struct CalendarView<S> {
    source: Arc<S>,
    ctx: Arc<CalendarContext>,
    in_flight: Mutex<Option<AbortHandle>>,
    generation: AtomicU64,
}

impl<S: EventSource> CalendarView<S> {
    #[must_use]
    pub fn new(source: Arc<S>, ctx: Arc<CalendarContext>) -> Self {
        Self {
            source,
            ctx,
            in_flight: Mutex::new(None),
            generation: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn context(&self) -> &CalendarContext {
        &self.ctx
    }

    /// ## Summary
    /// Fetches events for the new window and recomputes every entry.
    ///
    /// ## Errors
    /// Returns `ServiceError::Superseded` when a newer refresh started before
    /// this one finished, or the source's error when the fetch fails.
    #[tracing::instrument(skip(self))]
    pub async fn refresh(
        &self,
        window: ViewWindow,
        granularity: Granularity,
    ) -> ServiceResult<Vec<CalendarEventRenderModel>> {
        let (generation, task) = {
            let mut in_flight = self
                .in_flight
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

            let source = Arc::clone(&self.source);
            let task = tokio::spawn(async move { source.fetch(window).await });
            if let Some(previous) = in_flight.replace(task.abort_handle()) {
                tracing::debug!("Aborting superseded fetch");
                previous.abort();
            }
            (generation, task)
        };

        let events = match task.await {
            Ok(result) => result?,
            Err(err) if err.is_cancelled() => return Err(ServiceError::Superseded),
            Err(err) => return Err(ServiceError::Join(err)),
        };

        if self.generation.load(Ordering::SeqCst) != generation {
            return Err(ServiceError::Superseded);
        }
        Ok(compute_occurrences(&self.ctx, &events, window, granularity))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    use almanac_engine::ScheduleEvent;

    use super::*;

    /// Serves one fixed event, sleeping longer for windows that start earlier.
    #[derive(Debug, Default)]
    struct SlowSource {
        calls: AtomicUsize,
    }

    impl EventSource for SlowSource {
        async fn fetch(&self, window: ViewWindow) -> ServiceResult<Vec<ScheduleEvent>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let delay = if window.start_ms() == 0 { 500 } else { 10 };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Ok(vec![ScheduleEvent::new(7, 3_600, 7_200)])
        }
    }

    #[derive(Debug)]
    struct FailingSource;

    impl EventSource for FailingSource {
        async fn fetch(&self, _window: ViewWindow) -> ServiceResult<Vec<ScheduleEvent>> {
            Err(ServiceError::UpstreamStatus(500))
        }
    }

    fn view<S: EventSource>(source: S) -> CalendarView<S> {
        CalendarView::new(Arc::new(source), Arc::new(CalendarContext::default()))
    }

    #[test_log::test(tokio::test)]
    async fn refresh_runs_pipeline() {
        let view = view(SlowSource::default());
        let window = ViewWindow::new(1, 86_400_000).expect("valid window");
        let models = view
            .refresh(window, Granularity::Month)
            .await
            .expect("refresh succeeds");
        assert_eq!(models.len(), 1);
        assert_eq!(models[0].id, 7);
    }

    #[test_log::test(tokio::test)]
    async fn newer_refresh_supersedes_older() {
        let view = view(SlowSource::default());
        let slow = ViewWindow::new(0, 86_400_000).expect("valid window");
        let fast = ViewWindow::new(1, 86_400_000).expect("valid window");

        let (older, newer) = tokio::join!(view.refresh(slow, Granularity::Month), async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            view.refresh(fast, Granularity::Week).await
        });

        assert!(matches!(older, Err(ServiceError::Superseded)));
        assert_eq!(newer.expect("latest refresh succeeds").len(), 1);
        assert_eq!(view.source.calls.load(Ordering::SeqCst), 2);
    }

    #[test_log::test(tokio::test)]
    async fn source_errors_propagate() {
        let view = view(FailingSource);
        let window = ViewWindow::new(0, 1_000).expect("valid window");
        assert!(matches!(
            view.refresh(window, Granularity::Day).await,
            Err(ServiceError::UpstreamStatus(500))
        ));
    }

    #[test_log::test(tokio::test)]
    async fn load_occurrences_uses_source_directly() {
        let source = SlowSource::default();
        let ctx = CalendarContext::default();
        let window = ViewWindow::new(1, 86_400_000).expect("valid window");
        let models = load_occurrences(&source, &ctx, window, Granularity::Day)
            .await
            .expect("load succeeds");
        assert_eq!(models.len(), 1);
    }
}
