// Poll loop - Drives fetch, decode, scale and apply on a fixed cadence
use crate::application::axis_scaler::{compute_bounds, ScaleMode};
use crate::application::chart_renderer::ChartRenderer;
use crate::application::controls::{Controls, ControlsError, ControlsUpdate, TickSelection};
use crate::application::series_decoder::{decode, DecodeError};
use crate::application::series_fetcher::{FetchError, RawBatch, SeriesFetcher};
use crate::domain::dashboard::{ChartState, ChartUpdate, RenderConfig, SlotState, SLOT_COUNT};
use crate::domain::telemetry::Series;
use crate::domain::topic::Catalog;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinSet;
use tokio::time::{interval, MissedTickBehavior};

#[derive(Debug, Clone, Copy)]
pub struct PollSettings {
    pub interval: Duration,
    /// Upper bound for one fetch; kept below `interval`
    pub fetch_timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TickError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl TickError {
    fn is_benign(&self) -> bool {
        matches!(self, Self::Fetch(e) if e.is_benign())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Stopped,
    EmptySelection,
    TornDown,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    Applied { generation: u64 },
    Skipped(SkipReason),
    /// A later tick was started before this one completed
    Stale { generation: u64 },
    /// Completed after teardown
    Abandoned { generation: u64 },
    Failed { generation: u64, error: TickError },
}

/// A started tick: its generation tag and the selection it was planned with.
#[derive(Debug, Clone, PartialEq)]
pub struct TickPlan {
    pub generation: u64,
    pub selection: TickSelection,
}

pub struct PollLoop {
    fetcher: Arc<dyn SeriesFetcher>,
    catalog: Arc<Catalog>,
    renderer: Arc<dyn ChartRenderer>,
    settings: PollSettings,
    controls: RwLock<Controls>,
    state: RwLock<ChartState>,
    generation: AtomicU64,
    torn_down: AtomicBool,
}

impl PollLoop {
    pub fn new(
        fetcher: Arc<dyn SeriesFetcher>,
        catalog: Arc<Catalog>,
        renderer: Arc<dyn ChartRenderer>,
        settings: PollSettings,
        controls: Controls,
    ) -> Self {
        let state = ChartState::new(controls.limit, controls.align_axes, controls.stopped);
        Self {
            fetcher,
            catalog,
            renderer,
            settings,
            controls: RwLock::new(controls),
            state: RwLock::new(state),
            generation: AtomicU64::new(0),
            torn_down: AtomicBool::new(false),
        }
    }

    pub async fn state(&self) -> ChartState {
        self.state.read().await.clone()
    }

    pub async fn render_config(&self) -> RenderConfig {
        RenderConfig::from_state(&*self.state.read().await)
    }

    pub async fn controls(&self) -> Controls {
        self.controls.read().await.clone()
    }

    /// Apply a UI change. Selection, limit and alignment are picked up by the
    /// next tick. Stopping also invalidates ticks still in flight.
    pub async fn update_controls(&self, update: ControlsUpdate) -> Result<Controls, ControlsError> {
        let mut controls = self.controls.write().await;
        let next = controls.merged(update)?;

        if next.stopped != controls.stopped {
            if next.stopped {
                self.generation.fetch_add(1, Ordering::SeqCst);
            }
            self.state.write().await.stopped = next.stopped;
            tracing::info!(stopped = next.stopped, "Poll loop toggled");
        }

        *controls = next.clone();
        Ok(next)
    }

    /// Start a tick: assign it the next generation and snapshot the controls.
    pub async fn prepare_tick(&self) -> Result<TickPlan, SkipReason> {
        if self.torn_down.load(Ordering::SeqCst) {
            return Err(SkipReason::TornDown);
        }

        let controls = self.controls.read().await.clone();
        if controls.stopped {
            return Err(SkipReason::Stopped);
        }

        let selection = controls.plan(&self.catalog);
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        if selection.request.is_empty() {
            tracing::debug!(generation, "No fields selected, skipping fetch");
            return Err(SkipReason::EmptySelection);
        }

        Ok(TickPlan {
            generation,
            selection,
        })
    }

    /// Fetch, decode and scale, then apply the result if this tick is still
    /// the latest one. Failures leave the chart untouched.
    pub async fn execute(&self, plan: TickPlan) -> TickOutcome {
        let TickPlan {
            generation,
            selection,
        } = plan;

        let timeout = self.settings.fetch_timeout;
        let fetched = match tokio::time::timeout(timeout, self.fetcher.fetch(&selection.request)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(timeout)),
        };

        let update = match fetched
            .map_err(TickError::from)
            .and_then(|raw| build_update(&raw, &selection))
        {
            Ok(update) => update,
            Err(error) => {
                if error.is_benign() {
                    tracing::debug!(generation, %error, "Tick produced no update");
                } else {
                    tracing::warn!(generation, %error, "Tick failed, keeping last chart");
                }
                return TickOutcome::Failed { generation, error };
            }
        };

        {
            let mut state = self.state.write().await;

            if self.torn_down.load(Ordering::SeqCst) {
                tracing::debug!(generation, "Dropping result that completed after teardown");
                return TickOutcome::Abandoned { generation };
            }

            let latest = self.generation.load(Ordering::SeqCst);
            if generation != latest {
                tracing::debug!(generation, latest, "Dropping stale result");
                return TickOutcome::Stale { generation };
            }

            state.apply(update, generation, Utc::now());
            // Rendered under the guard so `shutdown` also waits for it
            self.renderer.render(&RenderConfig::from_state(&state));
        }

        tracing::debug!(generation, "Chart updated");
        TickOutcome::Applied { generation }
    }

    pub async fn tick(&self) -> TickOutcome {
        match self.prepare_tick().await {
            Ok(plan) => self.execute(plan).await,
            Err(reason) => TickOutcome::Skipped(reason),
        }
    }

    /// Tear down: no state update happens once this returns.
    pub async fn shutdown(&self) {
        self.torn_down.store(true, Ordering::SeqCst);
        self.generation.fetch_add(1, Ordering::SeqCst);
        // Wait out an apply or render that already holds the state
        drop(self.state.write().await);
    }

    /// Tick on the configured interval until `shutdown` flips to true or its
    /// sender is dropped. Each tick runs as its own task so a slow fetch never
    /// delays the schedule; superseded results are dropped by generation.
    pub async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(
            interval_ms = self.settings.interval.as_millis() as u64,
            fetch_timeout_ms = self.settings.fetch_timeout.as_millis() as u64,
            "Starting poll loop"
        );

        let mut ticker = interval(self.settings.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut in_flight = JoinSet::new();

        while !*shutdown.borrow() {
            tokio::select! {
                _ = ticker.tick() => match self.prepare_tick().await {
                    Ok(plan) => {
                        let this = Arc::clone(&self);
                        in_flight.spawn(async move { this.execute(plan).await });
                    }
                    Err(reason) => tracing::trace!(?reason, "Tick skipped"),
                },
                Some(joined) = in_flight.join_next() => {
                    if let Err(e) = joined {
                        tracing::error!(error = %e, "Tick task failed");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        self.shutdown().await;
        in_flight.abort_all();
        tracing::info!("Poll loop stopped");
    }
}

fn build_update(raw: &RawBatch, selection: &TickSelection) -> Result<ChartUpdate, TickError> {
    let series = decode(raw, &selection.slots)?;

    let active: Vec<Option<&Series>> = selection
        .slots
        .iter()
        .zip(&series)
        .map(|(slot, s)| slot.as_ref().map(|_| s))
        .collect();
    let scales = compute_bounds(&active, selection.mode);

    let mut series = series.into_iter();
    let slots: [SlotState; SLOT_COUNT] = std::array::from_fn(|i| {
        let points = series.next().unwrap_or_default();
        match &selection.slots[i] {
            Some(slot) => SlotState {
                label: slot.channel.label.clone(),
                series: points,
                scale: scales[i],
            },
            None => SlotState::inactive(i),
        }
    });

    Ok(ChartUpdate {
        slots,
        axes_aligned: selection.mode == ScaleMode::Aligned,
        limit: selection.limit,
    })
}
