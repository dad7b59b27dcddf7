use std::sync::Arc;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::NaiveDate;
use chrono::TimeZone;
use chrono::Utc;
use chrono_et::Et;
use tokio::sync::watch;

use crate::config::Config;
use crate::error::Error;
use crate::models::EpisodeRecord;
use crate::models::ShowStatus;
use crate::schedule::Scheduler;

mod mock;
mod tvmaze;

pub use mock::MockSource;
pub use tvmaze::TvMazeSource;

// The calculator answers "is the show live" from the wall clock alone.  A
// listing source knows about preemptions and specials, so a fetched record
// always overrides the calculator's judgment; the calculator is strictly a
// fallback when every source fails or has nothing for the night.

const CONFIDENCE_FALLBACK: f64 = 0.5;
const CONFIDENCE_SINGLE_SOURCE: f64 = 0.9;
const CONFIDENCE_PER_EXTRA_SOURCE: f64 = 0.05;
const CONFIDENCE_MAX: f64 = 0.95;

const SCHEDULE_SOURCE_NAME: &str = "schedule";

/// A third-party show-listing API, queried for one broadcast night at a time.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListingsSource: Send + Sync {
    fn name(&self) -> &str;
    async fn fetch(&self, date: NaiveDate) -> Result<Option<EpisodeRecord>, Error>;
}

/// Spawns the polling task and returns a channel carrying the latest
/// aggregated status.
pub fn start(config: Arc<Config>, scheduler: Scheduler) -> watch::Receiver<ShowStatus> {
    let sources = build_sources(&config);
    let interval = config.listings.update_interval;

    // Publish a fallback immediately so the web layer never sees an empty
    // channel.
    let initial = fallback_status(&scheduler, &Et::now());
    let (sender, receiver) = watch::channel(initial);

    tokio::spawn(async move {
        loop {
            let status = aggregate(&scheduler, &sources, &Et::now()).await;
            tracing::debug!(
                status.is_live,
                status.confidence,
                sources = ?status.sources,
                "Updated",
            );
            if sender.send(status).is_err() {
                // Every receiver is gone, the server has shut down.
                return;
            }
            tokio::time::sleep(interval).await;
        }
    });

    receiver
}

fn build_sources(config: &Config) -> Vec<Box<dyn ListingsSource>> {
    let mut sources: Vec<Box<dyn ListingsSource>> = vec![];
    if config.listings.tvmaze.enabled {
        tracing::info!(source.name = "tvmaze", "Enabled");
        sources.push(Box::new(TvMazeSource::new(&config.listings)));
    }
    // The mock coexists with the remote sources, so multi-source merging is
    // exercisable from a config file alone.
    if let Some(ref record) = config.listings.mock {
        tracing::info!(source.name = "mock", "Enabled");
        sources.push(Box::new(MockSource::new(record.clone())));
    }
    sources
}

/// Queries every source for tonight's (or the next) broadcast date and merges
/// the answers into one best-effort status.
async fn aggregate<Tz: TimeZone>(
    scheduler: &Scheduler,
    sources: &[Box<dyn ListingsSource>],
    now: &DateTime<Tz>,
) -> ShowStatus {
    let snapshot = scheduler.snapshot(now);
    let target_date = if snapshot.is_live_now {
        snapshot.current_occurrence.date_naive()
    } else {
        snapshot.next_occurrence.date_naive()
    };

    let mut records: Vec<(String, EpisodeRecord)> = vec![];
    for source in sources.iter() {
        match source.fetch(target_date).await {
            Ok(Some(record)) => {
                records.push((source.name().to_string(), record));
            }
            Ok(None) => {
                tracing::debug!(source.name = source.name(), %target_date, "No record");
            }
            Err(err) => {
                tracing::warn!(%err, source.name = source.name(), "Fetch failed");
            }
        }
    }

    let Some((_, primary)) = records.first() else {
        return fallback_status(scheduler, now);
    };

    // Only sources that agree with the primary on live/rerun raise the
    // confidence; a contradicting source contributes its record but no bonus.
    let agreeing = records
        .iter()
        .filter(|(_, record)| record.is_live == primary.is_live)
        .count();
    let confidence = (CONFIDENCE_SINGLE_SOURCE
        + CONFIDENCE_PER_EXTRA_SOURCE * (agreeing - 1) as f64)
        .min(CONFIDENCE_MAX);
    ShowStatus {
        // A rerun listed for a live-window night is still a rerun.
        is_live: primary.is_live && snapshot.is_live_now,
        show_date: Some(primary.air_date),
        host: primary.host.clone(),
        musical_guest: primary.musical_guest.clone(),
        confidence,
        sources: records.iter().map(|(name, _)| name.clone()).collect(),
        last_updated: Utc::now(),
    }
}

/// What the calculator alone can say: live during the weekly window unless
/// the week falls in a hiatus.
fn fallback_status<Tz: TimeZone>(scheduler: &Scheduler, now: &DateTime<Tz>) -> ShowStatus {
    let snapshot = scheduler.snapshot(now);
    let show_date = if snapshot.is_live_now {
        snapshot.current_occurrence.date_naive()
    } else {
        snapshot.next_occurrence.date_naive()
    };
    ShowStatus {
        is_live: snapshot.is_live_now && !snapshot.is_hiatus_week,
        show_date: Some(show_date),
        host: None,
        musical_guest: None,
        confidence: CONFIDENCE_FALLBACK,
        sources: vec![SCHEDULE_SOURCE_NAME.to_string()],
        last_updated: Utc::now(),
    }
}

// </coverage:exclude>
