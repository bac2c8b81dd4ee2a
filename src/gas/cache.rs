/*
 * Background-refreshed single value cache
 */

use chrono::Utc;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::{watch, Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};
use crate::gas::ScalarSource;
use crate::models::{CachedScalar, RefreshStats, Result};

/// Keeps one scalar warm by polling a [`ScalarSource`] on a fixed interval.
///
/// A failed refresh never clears a previously cached value. Readers get the
/// last successfully fetched value, or trigger one inline fetch when nothing
/// has been cached yet.
///
/// `stop` guarantees no refresh begins after it returns. A refresh that was
/// already in flight may still complete and publish its value.
pub struct RefreshingScalarCache {
    source: Arc<dyn ScalarSource>,
    interval: Duration,
    current: RwLock<Option<CachedScalar>>,
    stats: RwLock<RefreshStats>,
    poller: Mutex<Option<Poller>>,
}

struct Poller {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl RefreshingScalarCache {
    /// A zero interval is raised to one millisecond.
    #[must_use]
    pub fn new(source: Arc<dyn ScalarSource>, interval: Duration) -> Self {
        Self {
            source,
            interval: interval.max(Duration::from_millis(1)),
            current: RwLock::new(None),
            stats: RwLock::new(RefreshStats::default()),
            poller: Mutex::new(None),
        }
    }

    /// Warms the cache once, then spawns the periodic refresh task.
    ///
    /// Calling this while a refresh task is already running does nothing.
    pub async fn start(self: &Arc<Self>) {
        let mut poller = self.poller.lock().await;
        if poller.as_ref().is_some_and(|p| !p.handle.is_finished()) {
            warn!("Background refresh already running, ignoring start");
            return;
        }

        // Failure is already logged and recorded; the cache just stays empty.
        let _ = self.refresh_once().await;

        info!(
            "Starting background refresh with interval {}ms",
            self.interval.as_millis()
        );

        let (shutdown, rx) = watch::channel(false);
        let handle = tokio::spawn(Self::run(Arc::downgrade(self), self.interval, rx));
        *poller = Some(Poller { shutdown, handle });
    }

    /// Stops the periodic refresh. Safe to call when never started.
    pub async fn stop(&self) {
        if let Some(poller) = self.poller.lock().await.take() {
            // Err only means the task is already gone.
            let _ = poller.shutdown.send(true);
            info!("Stopped background refresh");
        }
    }

    /// Whether a refresh task is currently active.
    pub async fn is_running(&self) -> bool {
        self.poller
            .lock()
            .await
            .as_ref()
            .is_some_and(|p| !p.handle.is_finished())
    }

    /// Current value, fetching inline if nothing has been cached yet.
    ///
    /// Never fails: an inline fetch error yields `None`.
    pub async fn read(&self) -> Option<CachedScalar> {
        if let Some(current) = self.snapshot().await {
            return Some(current);
        }

        debug!("Cache empty, fetching inline");
        let _ = self.refresh_once().await;
        self.snapshot().await
    }

    /// Current value without any remote call.
    pub async fn snapshot(&self) -> Option<CachedScalar> {
        self.current.read().await.clone()
    }

    pub async fn stats(&self) -> RefreshStats {
        self.stats.read().await.clone()
    }

    /// Fetches once and replaces the cached value on success.
    ///
    /// On failure the cached value is left untouched and the error is logged
    /// and recorded before being returned.
    pub async fn refresh_once(&self) -> Result<CachedScalar> {
        match self.fetch().await {
            Ok(scalar) => {
                *self.current.write().await = Some(scalar.clone());

                let mut stats = self.stats.write().await;
                stats.successes += 1;
                stats.last_success_at = Some(Utc::now());

                debug!("Cached value updated: raw={}, value={}", scalar.raw, scalar.value);
                Ok(scalar)
            }
            Err(e) => {
                error!("Failed to refresh cached value: {e}");

                let mut stats = self.stats.write().await;
                stats.failures += 1;
                stats.last_failure_at = Some(Utc::now());
                stats.last_error = Some(e.to_string());

                Err(e)
            }
        }
    }

    async fn fetch(&self) -> Result<CachedScalar> {
        let raw = self.source.fetch_raw().await?;
        CachedScalar::from_raw(raw)
    }

    async fn run(cache: Weak<Self>, period: Duration, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.changed() => break,
                _ = ticker.tick() => {}
            }

            if *shutdown.borrow() {
                break;
            }

            let Some(cache) = cache.upgrade() else {
                break;
            };
            let _ = cache.refresh_once().await;
        }

        debug!("Background refresh task exited");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GasPriceResponse, GaugeError};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const INTERVAL: Duration = Duration::from_millis(1000);

    struct ScriptedSource {
        responses: std::sync::Mutex<VecDeque<Result<String>>>,
        calls: AtomicUsize,
    }

    impl ScriptedSource {
        fn new(responses: Vec<Result<String>>) -> Arc<Self> {
            Arc::new(Self {
                responses: std::sync::Mutex::new(responses.into()),
                calls: AtomicUsize::new(0),
            })
        }

        fn push(&self, response: Result<String>) {
            self.responses.lock().unwrap().push_back(response);
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ScalarSource for ScriptedSource {
        async fn fetch_raw(&self) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(GaugeError::RpcError("no scripted response".into())))
        }
    }

    fn ok(raw: &str) -> Result<String> {
        Ok(raw.to_string())
    }

    fn down() -> Result<String> {
        Err(GaugeError::RpcError("rpc down".into()))
    }

    fn cache_over(source: &Arc<ScriptedSource>) -> Arc<RefreshingScalarCache> {
        Arc::new(RefreshingScalarCache::new(source.clone(), INTERVAL))
    }

    #[tokio::test(start_paused = true)]
    async fn warms_on_start_and_serves_from_memory() {
        let source = ScriptedSource::new(vec![ok("0x3b9aca00")]);
        let cache = cache_over(&source);

        cache.start().await;
        let first = cache.read().await.unwrap();

        assert_eq!(first.raw, "0x3b9aca00");
        assert_eq!(first.value, 1_000_000_000);
        assert_eq!(source.calls(), 1);
        assert!(cache.is_running().await);

        cache.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn background_tick_replaces_value() {
        let source = ScriptedSource::new(vec![ok("0x3b9aca00"), ok("0x4a817c800")]);
        let cache = cache_over(&source);

        cache.start().await;
        time::sleep(INTERVAL + Duration::from_millis(10)).await;

        let second = cache.read().await.unwrap();
        assert_eq!(second.raw, "0x4a817c800");
        assert_eq!(second.value, 20_000_000_000);
        assert_eq!(source.calls(), 2);

        cache.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn failed_refresh_keeps_previous_value() {
        let source = ScriptedSource::new(vec![ok("0x1"), down()]);
        let cache = cache_over(&source);

        cache.start().await;
        let seeded = cache.read().await.unwrap();
        assert_eq!(seeded.value, 1);

        time::sleep(INTERVAL + Duration::from_millis(10)).await;

        assert_eq!(cache.read().await, Some(seeded));
        let stats = cache.stats().await;
        assert_eq!(stats.successes, 1);
        assert_eq!(stats.failures, 1);
        assert!(stats.last_error.unwrap().contains("rpc down"));

        cache.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn stop_halts_polling() {
        let source = ScriptedSource::new(vec![ok("0x2")]);
        let cache = cache_over(&source);

        cache.start().await;
        cache.stop().await;
        let calls_before = source.calls();

        time::sleep(INTERVAL * 3).await;

        assert_eq!(source.calls(), calls_before);
        assert!(!cache.is_running().await);
        assert_eq!(cache.read().await.unwrap().value, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_without_start_is_harmless() {
        let source = ScriptedSource::new(vec![]);
        let cache = cache_over(&source);

        cache.stop().await;

        assert_eq!(source.calls(), 0);
        assert!(!cache.is_running().await);
    }

    #[tokio::test(start_paused = true)]
    async fn second_start_is_ignored() {
        let source = ScriptedSource::new(vec![ok("0x1"), ok("0x2")]);
        let cache = cache_over(&source);

        cache.start().await;
        cache.start().await;

        assert_eq!(source.calls(), 1);
        assert_eq!(cache.read().await.unwrap().value, 1);

        // a single timer means a single fetch per period
        time::sleep(INTERVAL + Duration::from_millis(10)).await;
        assert_eq!(source.calls(), 2);

        cache.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn restart_after_stop_warms_again() {
        let source = ScriptedSource::new(vec![ok("0x1"), ok("0x2")]);
        let cache = cache_over(&source);

        cache.start().await;
        cache.stop().await;
        cache.start().await;

        assert_eq!(source.calls(), 2);
        assert_eq!(cache.read().await.unwrap().value, 2);

        cache.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn failed_warm_up_is_not_fatal() {
        let source = ScriptedSource::new(vec![down(), ok("0x9")]);
        let cache = cache_over(&source);

        cache.start().await;
        assert!(cache.snapshot().await.is_none());
        assert!(cache.is_running().await);

        time::sleep(INTERVAL + Duration::from_millis(10)).await;
        assert_eq!(cache.snapshot().await.unwrap().value, 9);

        cache.stop().await;
    }

    #[tokio::test]
    async fn cold_read_fetches_inline_once() {
        let source = ScriptedSource::new(vec![ok("0x5")]);
        let cache = cache_over(&source);

        let res = cache.read().await.unwrap();
        assert_eq!(res, CachedScalar { raw: "0x5".into(), value: 5 });
        assert_eq!(source.calls(), 1);

        cache.read().await;
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn cold_read_failure_reports_absent_fields() {
        let source = ScriptedSource::new(vec![down()]);
        let cache = cache_over(&source);

        let res = GasPriceResponse::from(cache.read().await);

        assert_eq!(res.gas_price_raw, None);
        assert_eq!(res.gas_price, None);
        assert_eq!(cache.stats().await.failures, 1);
    }

    #[tokio::test]
    async fn malformed_value_is_never_cached() {
        let source = ScriptedSource::new(vec![ok("0xnothex")]);
        let cache = cache_over(&source);

        assert!(cache.read().await.is_none());

        source.push(ok("0x7"));
        let recovered = cache.read().await.unwrap();
        assert_eq!(recovered.value, 7);
    }

    #[tokio::test]
    async fn cached_value_always_matches_raw() {
        let raws = ["0x0", "0x1", "0xff", "0x3b9aca00", "0xffffffffffffffffffffffffffffffff"];
        let source = ScriptedSource::new(raws.iter().map(|r| ok(r)).collect());
        let cache = cache_over(&source);

        for raw in raws {
            let scalar = cache.refresh_once().await.unwrap();
            assert_eq!(scalar.raw, raw);
            assert_eq!(
                scalar.value,
                u128::from_str_radix(raw.trim_start_matches("0x"), 16).unwrap()
            );
            assert_eq!(cache.snapshot().await, Some(scalar));
        }
    }
}
