//! Retrieval strategies built on [`SearchBackend::fetch_page`]
//!
//! - [`run_once`]: a single page with scope only
//! - [`follow`]: poll forever, cursoring by the last seen `max_id`
//! - [`scan_time_range`]: start server-side from a time, continue by id, stop
//!   at `max_time` or when the service reports the end
//!
//! Each strategy owns its continue/stop decision. The engine never loops.

use super::{QueryBounds, SearchBackend};
use crate::api::EventId;
use crate::output::Renderer;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::io::Write;
use std::time::Duration;

/// Time bounds of a range scan. Either side may be absent.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TimeRange {
    pub min: Option<DateTime<Utc>>,
    pub max: Option<DateTime<Utc>>,
}

/// Why a range scan stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStop {
    /// An event or the indexed time went past `max_time`
    PastMaxTime,
    /// The service reported no more data for the bound set
    ReachedEnd,
    /// The page carried no `max_id` to continue from
    NoCursor,
    /// An empty page did not move the cursor forward
    Stalled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanSummary {
    pub pages: usize,
    pub events: usize,
    pub stop: ScanStop,
}

/// One page, scope only, rendered once
pub fn run_once<B, W>(
    backend: &B,
    query: &str,
    scope: &QueryBounds,
    renderer: &mut Renderer<W>,
) -> Result<()>
where
    B: SearchBackend + ?Sized,
    W: Write,
{
    let page = backend
        .fetch_page(query, scope)
        .context("Search request failed")?;
    renderer.render_page(&page).context("Failed to write output")?;
    Ok(())
}

/// Poll for new events forever
///
/// The first poll has no id bound. Every later poll asks for events after
/// the highest `max_id` seen so far. `pause` is called with `delay` between
/// polls. Only an error ends the loop; interruption is left to the process.
pub fn follow<B, W, P>(
    backend: &B,
    query: &str,
    scope: &QueryBounds,
    renderer: &mut Renderer<W>,
    delay: Duration,
    mut pause: P,
) -> Result<()>
where
    B: SearchBackend + ?Sized,
    W: Write,
    P: FnMut(Duration),
{
    let mut cursor: Option<EventId> = None;

    loop {
        let bounds = match cursor {
            Some(id) => scope.with_min_id(id),
            None => scope.clone(),
        }
        .with_tail(true);

        let page = backend
            .fetch_page(query, &bounds)
            .context("Search request failed")?;
        renderer.render_page(&page).context("Failed to write output")?;

        // Never move the cursor backwards
        cursor = cursor.max(page.max_id);

        pause(delay);
    }
}

/// Scan forward through a time range
///
/// The first request is bounded by `range.min`; all continuations are bounded
/// by the previous page's `max_id`, so no event is delivered twice and none is
/// skipped. `range.max` is applied client-side: the first event past it ends
/// the scan without rendering it.
pub fn scan_time_range<B, W>(
    backend: &B,
    query: &str,
    scope: &QueryBounds,
    range: TimeRange,
    renderer: &mut Renderer<W>,
) -> Result<ScanSummary>
where
    B: SearchBackend + ?Sized,
    W: Write,
{
    let mut pages = 0;
    let mut events = 0;
    let mut cursor: Option<EventId> = None;

    let mut page = backend
        .fetch_page(query, &scope.with_min_time(range.min).with_tail(false))
        .context("Search request failed")?;

    let stop = loop {
        pages += 1;
        tracing::debug!(
            page = pages,
            events = page.events.len(),
            max_id = ?page.max_id,
            "Scanning page"
        );

        let mut past_max = false;
        for event in &page.events {
            if range.max.is_some_and(|max| event.received_at_utc() > max) {
                past_max = true;
                break;
            }
            renderer
                .render_event(event)
                .context("Failed to write output")?;
            events += 1;
        }
        renderer.flush().context("Failed to write output")?;

        if past_max {
            break ScanStop::PastMaxTime;
        }

        if let (Some(max), Some(indexed)) = (range.max, page.max_time_at_utc()) {
            if indexed > max {
                break ScanStop::PastMaxTime;
            }
        }

        if page.reached_end {
            break ScanStop::ReachedEnd;
        }

        let Some(max_id) = page.max_id else {
            break ScanStop::NoCursor;
        };

        if page.events.is_empty() && cursor == Some(max_id) {
            break ScanStop::Stalled;
        }
        cursor = Some(max_id);

        page = backend
            .fetch_page(query, &scope.with_min_id(max_id).with_tail(false))
            .context("Search request failed")?;
    };

    tracing::debug!(pages, events, ?stop, "Range scan finished");

    Ok(ScanSummary {
        pages,
        events,
        stop,
    })
}
