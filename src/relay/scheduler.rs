use std::future::Future;
use std::time::Duration;
use tokio::time::{self, Instant, MissedTickBehavior};

use super::{bootstrap_sync, incremental_sync, RelayContext};
use crate::db::FeedItemStore;
use crate::feeds::FeedSource;
use crate::publish::Publisher;

/// Runs one bootstrap sync, then an incremental sync every `period` until `shutdown`
/// resolves. Syncs run one at a time on this task; shutdown is only observed between
/// syncs, so a post is never cut off before it is recorded.
pub async fn run<S, P, F, D>(ctx: &RelayContext<S, P, F>, period: Duration, shutdown: D)
where
    S: FeedItemStore,
    P: Publisher,
    F: FeedSource,
    D: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    bootstrap_sync(ctx).await.log();

    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    log::info!("Checking for new items every {}s", period.as_secs());

    loop {
        tokio::select! {
            biased;
            () = &mut shutdown => {
                log::info!("Shutting down");
                break;
            }
            _ = ticker.tick() => incremental_sync(ctx).await.log(),
        }
    }
}
