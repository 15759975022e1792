use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::ports::{OutputSink, StatisticsSource};

/// One-shot rendering: check the sink, run its lifecycle once, finish.
pub struct RenderUsecase<'a> {
    pub source: &'a dyn StatisticsSource,
    pub sink: &'a mut dyn OutputSink,
}

impl<'a> RenderUsecase<'a> {
    pub fn run(&mut self) -> Result<()> {
        self.sink.sanity_check().context("Output sanity check failed")?;
        self.sink.start().context("Failed to start output")?;
        if self.sink.should_update(self.source) {
            self.sink.update(self.source).context("Failed to update output")?;
        }
        self.sink.done(self.source).context("Failed to finish output")
    }
}

/// Polling loop for live outputs.
///
/// Every tick the profile is reloaded and pushed when it changed. A profile
/// that fails to load (e.g. half-written by the profiler) skips the tick.
pub struct LiveUsecase<'a, S, L>
where
    S: StatisticsSource,
    L: FnMut() -> Result<S>,
{
    pub sink: &'a mut dyn OutputSink,
    pub loader: L,
    pub interval: Duration,
    /// Stop after this many ticks; run until killed when `None`.
    pub ticks: Option<u64>,
}

impl<'a, S, L> LiveUsecase<'a, S, L>
where
    S: StatisticsSource,
    L: FnMut() -> Result<S>,
{
    /// Returns the number of updates pushed.
    pub fn run(&mut self) -> Result<u64> {
        self.sink.sanity_check().context("Output sanity check failed")?;
        self.sink.start().context("Failed to start live output")?;

        let mut tick = 0u64;
        let mut updates = 0u64;
        let mut last_source: Option<S> = None;

        loop {
            if self.ticks.is_some_and(|limit| tick >= limit) {
                break;
            }
            if tick > 0 {
                thread::sleep(self.interval);
            }

            match (self.loader)() {
                Ok(source) => {
                    if self.sink.should_update(&source) {
                        self.sink.update(&source).context("Failed to push live update")?;
                        updates += 1;
                    }
                    last_source = Some(source);
                }
                Err(e) => {
                    let reason = format!("{:#}", e);
                    warn!(error = %reason, tick, "profile unavailable, skipping tick");
                }
            }

            tick += 1;
        }

        if let Some(source) = &last_source {
            self.sink.done(source).context("Failed to finish live output")?;
        }
        info!(ticks = tick, updates, "live session ended");
        Ok(updates)
    }
}
