// src/services/location.rs

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::{config::Config, errors::AppResult, models::GpsFix, services::geo::usable_fix};

/// Anything that can produce a GPS fix: a device bridge, a test double.
#[async_trait]
pub trait LocationSource: Send + Sync {
    async fn current_fix(&self) -> AppResult<GpsFix>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocationStatus {
    Unknown,
    Fix(GpsFix),
}

impl LocationStatus {
    pub fn fix(&self) -> Option<&GpsFix> {
        match self {
            LocationStatus::Fix(fix) => Some(fix),
            LocationStatus::Unknown => None,
        }
    }
}

/// Turns one poll outcome into a status. Unstamped fixes are taken as captured now.
pub fn classify(outcome: AppResult<GpsFix>, now: DateTime<Utc>, max_age: Duration) -> LocationStatus {
    match outcome {
        Ok(mut fix) => {
            fix.captured_at.get_or_insert(now);
            if usable_fix(&fix, now, max_age) {
                LocationStatus::Fix(fix)
            } else {
                LocationStatus::Unknown
            }
        }
        Err(e) => {
            debug!(error = %e, "Location source returned no fix");
            LocationStatus::Unknown
        }
    }
}

/// Background task polling a `LocationSource` on a fixed interval.
///
/// The latest status is published on a watch channel. A poll that fails or
/// exceeds `fix_timeout` publishes `Unknown`; so does a held fix once it is
/// older than `max_age`.
pub struct LocationWatcher {
    status: watch::Receiver<LocationStatus>,
    stop: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl LocationWatcher {
    pub fn spawn(
        source: Arc<dyn LocationSource>,
        interval: Duration,
        fix_timeout: Duration,
        max_age: Duration,
    ) -> Self {
        let (tx, rx) = watch::channel(LocationStatus::Unknown);
        let (stop_tx, mut stop_rx) = oneshot::channel();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    _ = ticker.tick() => {}
                }

                let outcome = match tokio::time::timeout(fix_timeout, source.current_fix()).await {
                    Ok(outcome) => outcome,
                    Err(_) => {
                        warn!(timeout_ms = fix_timeout.as_millis() as u64, "GPS fix timed out");
                        tx.send_replace(LocationStatus::Unknown);
                        continue;
                    }
                };
                tx.send_replace(classify(outcome, Utc::now(), max_age));
            }
            debug!("Location watcher stopped");
        });

        Self {
            status: rx,
            stop: Some(stop_tx),
            task,
        }
    }

    /// Starts a watcher with the poll interval, fix timeout and max fix age from `config`.
    pub fn from_config(source: Arc<dyn LocationSource>, config: &Config) -> Self {
        Self::spawn(
            source,
            config.location_poll_interval,
            config.location_fix_timeout,
            config.location_max_fix_age,
        )
    }

    /// Latest status, re-checked for staleness against `now`.
    pub fn current(&self, now: DateTime<Utc>, max_age: Duration) -> LocationStatus {
        match *self.status.borrow() {
            LocationStatus::Fix(fix) if usable_fix(&fix, now, max_age) => LocationStatus::Fix(fix),
            _ => LocationStatus::Unknown,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<LocationStatus> {
        self.status.clone()
    }

    /// Stops polling and waits for the task to finish.
    pub async fn shutdown(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        let _ = (&mut self.task).await;
    }
}

impl Drop for LocationWatcher {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn office_fix() -> GpsFix {
        GpsFix {
            latitude: -6.2607,
            longitude: 106.7816,
            accuracy_meters: Some(8.0),
            captured_at: None,
        }
    }

    struct Steady;

    #[async_trait]
    impl LocationSource for Steady {
        async fn current_fix(&self) -> AppResult<GpsFix> {
            Ok(office_fix())
        }
    }

    struct Denied;

    #[async_trait]
    impl LocationSource for Denied {
        async fn current_fix(&self) -> AppResult<GpsFix> {
            Err(AppError::LocationUnavailable("permission denied".to_string()))
        }
    }

    /// Answers once, then hangs.
    struct StallsAfterFirst {
        calls: AtomicU32,
    }

    #[async_trait]
    impl LocationSource for StallsAfterFirst {
        async fn current_fix(&self) -> AppResult<GpsFix> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(office_fix())
            } else {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(office_fix())
            }
        }
    }

    #[test]
    fn stale_fix_is_unknown() {
        let now = Utc::now();
        let mut fix = office_fix();
        fix.captured_at = Some(now - chrono::Duration::seconds(300));
        assert_eq!(
            classify(Ok(fix), now, Duration::from_secs(120)),
            LocationStatus::Unknown
        );

        fix.captured_at = Some(now - chrono::Duration::seconds(30));
        assert!(matches!(
            classify(Ok(fix), now, Duration::from_secs(120)),
            LocationStatus::Fix(_)
        ));
    }

    #[test]
    fn source_error_is_unknown() {
        let outcome = Err(AppError::LocationUnavailable("denied".to_string()));
        assert_eq!(
            classify(outcome, Utc::now(), Duration::from_secs(120)),
            LocationStatus::Unknown
        );
    }

    #[tokio::test]
    async fn publishes_fix_from_source() {
        let watcher = LocationWatcher::spawn(
            Arc::new(Steady),
            Duration::from_millis(20),
            Duration::from_millis(200),
            Duration::from_secs(120),
        );
        let mut rx = watcher.subscribe();
        rx.changed().await.unwrap();
        let status = *rx.borrow();
        let fix = status.fix().copied().unwrap();
        assert!(fix.captured_at.is_some());
        assert!(matches!(
            watcher.current(Utc::now(), Duration::from_secs(120)),
            LocationStatus::Fix(_)
        ));
        watcher.shutdown().await;
    }

    #[tokio::test]
    async fn from_config_uses_configured_timings() {
        let config = Config {
            location_poll_interval: Duration::from_millis(20),
            location_fix_timeout: Duration::from_millis(200),
            ..Config::default()
        };
        let watcher = LocationWatcher::from_config(Arc::new(Steady), &config);
        let mut rx = watcher.subscribe();
        rx.changed().await.unwrap();
        assert!(rx.borrow().fix().is_some());
        // A second publish only arrives if the configured 20 ms interval is in effect.
        tokio::time::timeout(Duration::from_secs(2), rx.changed())
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(
            watcher.current(Utc::now(), config.location_max_fix_age),
            LocationStatus::Fix(_)
        ));
        watcher.shutdown().await;
    }

    #[tokio::test]
    async fn denied_source_stays_unknown() {
        let watcher = LocationWatcher::spawn(
            Arc::new(Denied),
            Duration::from_millis(20),
            Duration::from_millis(200),
            Duration::from_secs(120),
        );
        let mut rx = watcher.subscribe();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), LocationStatus::Unknown);
        watcher.shutdown().await;
    }

    #[tokio::test]
    async fn stalled_poll_drops_back_to_unknown() {
        let source = Arc::new(StallsAfterFirst {
            calls: AtomicU32::new(0),
        });
        let watcher = LocationWatcher::spawn(
            source,
            Duration::from_millis(20),
            Duration::from_millis(250),
            Duration::from_secs(120),
        );
        let mut rx = watcher.subscribe();
        rx.changed().await.unwrap();
        assert!(rx.borrow().fix().is_some());
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), LocationStatus::Unknown);
        watcher.shutdown().await;
    }

    #[tokio::test]
    async fn held_fix_goes_stale() {
        let watcher = LocationWatcher::spawn(
            Arc::new(Steady),
            Duration::from_secs(3600),
            Duration::from_millis(200),
            Duration::from_secs(120),
        );
        let mut rx = watcher.subscribe();
        rx.changed().await.unwrap();
        let later = Utc::now() + chrono::Duration::seconds(600);
        assert_eq!(
            watcher.current(later, Duration::from_secs(120)),
            LocationStatus::Unknown
        );
    }
}
