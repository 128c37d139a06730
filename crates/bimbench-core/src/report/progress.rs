//! Progress reporting. The runner emits done/total in completion order; the
//! console layer consumes events through a sink.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// One progress update: how many tasks are done and the total count.
#[derive(Debug, Clone, Copy)]
pub struct ProgressEvent {
    pub done: usize,
    pub total: usize,
}

/// Sink for progress events. Implementations may throttle.
pub type ProgressSink = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

#[must_use]
pub fn format_progress_line(done: usize, total: usize) -> String {
    format!("Running question {done}/{total}...")
}

/// Minimum interval between progress updates to avoid log spam.
const PROGRESS_MIN_INTERVAL_MS: u64 = 200;

/// For large catalogs, emit at most every this many questions.
pub(crate) fn progress_step(total: usize) -> usize {
    if total <= 10 {
        1
    } else {
        std::cmp::max(1, total / 10)
    }
}

struct ThrottleState {
    last_emit: Option<Instant>,
}

/// A throttled sink printing to stderr. Returns `None` for 0/1-question
/// runs; always emits the final event.
pub fn default_progress_sink(total: usize) -> Option<ProgressSink> {
    if total <= 1 {
        return None;
    }
    let step = progress_step(total);
    let state = Arc::new(Mutex::new(ThrottleState { last_emit: None }));
    Some(Arc::new(move |ev: ProgressEvent| {
        if ev.total == 0 {
            return;
        }
        let now = Instant::now();
        let should_emit = {
            let mut guard = state.lock().expect("progress throttle lock");
            let emit_final = ev.done == ev.total;
            let emit_step = ev.done % step == 0 || ev.done == 1;
            let interval_ok = guard
                .last_emit
                .map(|t| {
                    now.saturating_duration_since(t)
                        >= Duration::from_millis(PROGRESS_MIN_INTERVAL_MS)
                })
                .unwrap_or(true);
            let ok = emit_final || (emit_step && interval_ok);
            if ok {
                guard.last_emit = Some(now);
            }
            ok
        };
        if should_emit {
            eprintln!("{}", format_progress_line(ev.done, ev.total));
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_contains_done_and_total() {
        let line = format_progress_line(3, 10);
        assert!(line.contains("3/10"), "expected '3/10' in {line:?}");
    }

    #[test]
    fn no_sink_for_trivial_runs() {
        assert!(default_progress_sink(0).is_none());
        assert!(default_progress_sink(1).is_none());
        assert!(default_progress_sink(2).is_some());
    }

    #[test]
    fn step_scales_with_catalog_size() {
        assert_eq!(progress_step(5), 1);
        assert_eq!(progress_step(10), 1);
        assert_eq!(progress_step(25), 2);
        assert_eq!(progress_step(130), 13);
    }
}
