use crate::api::Error;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// A fetch function polled on a fixed interval by a `Coordinator`.
#[async_trait]
pub trait UpdateSource: Send + Sync {
    type Data: Send + Sync + 'static;

    /// Name used in log lines and the `update_ok` metric label.
    fn name(&self) -> &'static str;

    async fn fetch(&self) -> Result<Self::Data, Error>;
}

/// Owns the most recent snapshot of one polled data set and hands it out to
/// read-only consumers. Dropped-in replacement for the host platform's
/// refresh scheduler: fixed interval, last-good data retained across failed
/// polls, failures reported through a flag rather than through consumers.
pub struct Coordinator<T: Send + Sync + 'static> {
    source: Box<dyn UpdateSource<Data = T>>,
    interval: Duration,
    snapshot: RwLock<Arc<T>>,
    update_ok: AtomicBool,
}

impl<T: Send + Sync + 'static> Coordinator<T> {
    /// Run the first refresh inline. Startup is aborted when it fails; there
    /// is nothing sensible to serve before one full snapshot exists.
    pub async fn start<S>(source: S, interval: Duration) -> Result<Arc<Self>, Error>
    where
        S: UpdateSource<Data = T> + 'static,
    {
        let first = source.fetch().await?;
        log::info!("{}: first refresh complete", source.name());

        Ok(Arc::new(Coordinator {
            source: Box::new(source),
            interval,
            snapshot: RwLock::new(Arc::new(first)),
            update_ok: AtomicBool::new(true),
        }))
    }

    /// Most recent successfully fetched snapshot.
    pub fn data(&self) -> Arc<T> {
        match self.snapshot.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Whether the most recent poll succeeded. A false value means `data()`
    /// is serving a stale snapshot.
    pub fn last_update_ok(&self) -> bool {
        self.update_ok.load(Ordering::Relaxed)
    }

    pub async fn refresh(&self) {
        match self.source.fetch().await {
            Ok(data) => {
                let snapshot = Arc::new(data);
                match self.snapshot.write() {
                    Ok(mut guard) => *guard = snapshot,
                    Err(poisoned) => {
                        let mut guard = poisoned.into_inner();
                        *guard = snapshot;
                    }
                }
                self.update_ok.store(true, Ordering::Relaxed);
            }
            Err(e) => {
                /* previous snapshot stays in place; retry happens on the
                next regular tick */
                self.update_ok.store(false, Ordering::Relaxed);
                log::warn!("{}: update failed: {:?}", self.source.name(), e);
            }
        }
    }

    /// Spawn the interval loop. The first tick fires immediately and is
    /// skipped, `start()` already fetched that snapshot.
    pub fn spawn(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            ticker.tick().await;

            loop {
                ticker.tick().await;
                self.refresh().await;
            }
        })
    }
}
