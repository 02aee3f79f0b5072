//! Last-wins coalescing of terminal resize notifications.

use std::pin::Pin;
use std::time::Duration;

use tokio::time::{sleep, Sleep};
use ttygate_common::Geometry;

/// Default quiescence window.
pub const DEFAULT_RESIZE_DEBOUNCE: Duration = Duration::from_millis(50);

struct PendingResize {
    geometry: Geometry,
    timer: Pin<Box<Sleep>>,
}

/// Holds at most one pending resize. Every `schedule` replaces the target
/// geometry and restarts the window.
pub struct ResizeDebouncer {
    window: Duration,
    pending: Option<PendingResize>,
}

impl ResizeDebouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    pub fn schedule(&mut self, geometry: Geometry) {
        self.pending = Some(PendingResize {
            geometry,
            timer: Box::pin(sleep(self.window)),
        });
    }

    /// Drop the pending resize, if any.
    pub fn cancel(&mut self) -> Option<Geometry> {
        self.pending.take().map(|p| p.geometry)
    }

    /// Resolves with the pending geometry once the window has elapsed
    /// without a newer `schedule`. Never resolves while idle.
    ///
    /// Cancel-safe: dropping the future keeps the pending resize and its
    /// deadline.
    pub async fn fired(&mut self) -> Geometry {
        let Some(pending) = self.pending.as_mut() else {
            return std::future::pending().await;
        };
        pending.timer.as_mut().await;
        let geometry = pending.geometry;
        self.pending = None;
        geometry
    }
}

impl Default for ResizeDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_RESIZE_DEBOUNCE)
    }
}
