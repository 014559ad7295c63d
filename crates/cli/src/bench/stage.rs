//! Bench stage: synthetic sources and children around one ProcessorPipe.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use bytes::Bytes;
use contracts::{BenchConfig, CommitToken, ContractError, Message, Pipe, Pump, Source};
use observability::PipeMonitor;
use pipe::ProcessorPipe;
use tracing::{debug, info};

use super::BenchStats;

/// Stage name used in logs and metrics
pub const STAGE_NAME: &str = "bench";

/// Source acknowledging `u64` offsets
pub struct OffsetSource {
    name: String,
    committed: Mutex<Option<u64>>,
}

impl OffsetSource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            committed: Mutex::new(None),
        }
    }

    /// Highest offset acknowledged so far
    pub fn committed(&self) -> Option<u64> {
        self.committed.lock().map(|guard| *guard).unwrap_or(None)
    }
}

impl Source for OffsetSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn commit(&self, token: &CommitToken) -> Result<(), ContractError> {
        let offset = *token
            .downcast_ref::<u64>()
            .ok_or_else(|| ContractError::commit(&self.name, "token is not an offset"))?;

        let mut committed = self
            .committed
            .lock()
            .map_err(|_| ContractError::commit(&self.name, "offset lock poisoned"))?;
        *committed = Some(committed.map_or(offset, |current| current.max(offset)));
        Ok(())
    }
}

/// Child counting what it receives, optionally rejecting every Nth message
pub struct CountingPump {
    name: String,
    processed: Arc<AtomicU64>,
    fail_every: Option<u64>,
}

impl CountingPump {
    pub fn new(name: impl Into<String>, fail_every: Option<u64>) -> Self {
        Self {
            name: name.into(),
            processed: Arc::new(AtomicU64::new(0)),
            fail_every,
        }
    }

    /// Shared counter of accepted messages
    pub fn processed(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.processed)
    }
}

impl Pump for CountingPump {
    fn name(&self) -> &str {
        &self.name
    }

    fn process(&mut self, msg: &Message) -> Result<(), ContractError> {
        let seen = self.processed.load(Ordering::Relaxed) + 1;
        if let Some(every) = self.fail_every {
            if seen.is_multiple_of(every) {
                // Count the rejected message so the cadence stays fixed
                self.processed.fetch_add(1, Ordering::Relaxed);
                return Err(ContractError::process(
                    &self.name,
                    format!("rejected message of {} bytes", msg.value().len()),
                ));
            }
        }
        self.processed.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

/// One processing stage driving a ProcessorPipe serially
pub struct BenchStage {
    config: BenchConfig,
    report_interval: Duration,
    sources: Vec<Arc<OffsetSource>>,
    pipe: ProcessorPipe,
    monitor: PipeMonitor,
}

impl BenchStage {
    /// Wire `config.consumers` children and `config.sources` sources
    ///
    /// The last child rejects every `fail_every`th message when configured.
    pub fn new(config: BenchConfig, report_interval: Duration) -> Self {
        let children = (0..config.consumers)
            .map(|i| {
                let fail_every = if i + 1 == config.consumers {
                    config.fail_every
                } else {
                    None
                };
                Box::new(CountingPump::new(format!("child-{i}"), fail_every)) as Box<dyn Pump>
            })
            .collect();

        let sources = (0..config.sources)
            .map(|i| Arc::new(OffsetSource::new(format!("source-{i}"))))
            .collect();

        observability::record_children(STAGE_NAME, config.consumers);

        Self {
            config,
            report_interval,
            sources,
            pipe: ProcessorPipe::new(children),
            monitor: PipeMonitor::new(),
        }
    }

    /// Run until `config.messages` are pushed or `stop` is raised
    ///
    /// Rejected messages are skipped and not committed.
    pub fn run(mut self, stop: &AtomicBool) -> BenchStats {
        let started = Instant::now();
        let mut window_started = started;
        let payload = Bytes::from(vec![0u8; self.config.payload_bytes]);

        let mut stats = BenchStats {
            children: self.pipe.children_len(),
            ..Default::default()
        };

        let mut offset = 0u64;
        while !stop.load(Ordering::Relaxed)
            && (self.config.messages == 0 || offset < self.config.messages)
        {
            let msg = self.message(offset, payload.clone());

            match self.pipe.forward_all(&msg) {
                Ok(()) => {
                    stats.forwarded += 1;
                    self.monitor.note_forward(STAGE_NAME, true);

                    if (offset + 1).is_multiple_of(self.config.commit_every) {
                        self.commit(&msg, &mut stats);
                    }
                }
                Err(e) => {
                    stats.forward_failures += 1;
                    self.monitor.note_forward(STAGE_NAME, false);
                    debug!(offset = offset, error = %e, "Forward failed, message skipped");
                }
            }

            offset += 1;

            if window_started.elapsed() >= self.report_interval {
                self.close_window(offset);
                window_started = Instant::now();
            }
        }

        self.close_window(offset);

        stats.messages = offset;
        stats.duration = started.elapsed();
        stats.committed_offsets = self
            .sources
            .iter()
            .map(|s| (s.name().to_string(), s.committed()))
            .collect();
        stats.monitor = self.monitor.summary();
        stats
    }

    fn message(&self, offset: u64, payload: Bytes) -> Message {
        self.sources.iter().fold(
            Message::new(payload).with_key(offset.to_be_bytes().to_vec()),
            |msg, source| msg.with_origin(source.clone(), CommitToken::new(offset)),
        )
    }

    fn commit(&mut self, msg: &Message, stats: &mut BenchStats) {
        match self.pipe.commit(msg) {
            Ok(()) => {
                stats.commits += 1;
                self.monitor.note_commit(STAGE_NAME, true);
            }
            Err(e) => {
                stats.commit_failures += 1;
                self.monitor.note_commit(STAGE_NAME, false);
                debug!(error = %e, "Commit failed");
            }
        }
    }

    fn close_window(&mut self, offset: u64) {
        let spent = self.monitor.observe(STAGE_NAME, &mut self.pipe);
        info!(
            stage = STAGE_NAME,
            offset = offset,
            pipe_ms = spent.as_secs_f64() * 1000.0,
            "Reporting window closed"
        );
    }
}
