//! Pipeline wiring: one thread per sampling task plus the dispatcher.
//!
//! The builder enforces at compile time that at least one sink is attached
//! before `start()` is available; `try_start()` checks everything at run
//! time instead.

use std::collections::HashSet;
use std::marker::PhantomData;
use std::thread::{self, JoinHandle};

use eyre::WrapErr;
use spoke_traits::{AdvertisementSource, Clock, ContactInput, LineSink, SignalLine};
use tracing::{info, warn};

use crate::bit::PolledBitSampler;
use crate::config::PipelineCfg;
use crate::dispatch::{DispatchStats, Dispatcher};
use crate::error::{BuildError, Result, SpokeError};
use crate::event::SourceId;
use crate::filter::NoiseFilter;
use crate::queue::event_queue;
use crate::tasks::{self, ContactTask, GaugeTask, SamplingTask, ScaleTask, Shutdown};

pub struct Missing;
pub struct Set;

pub struct PipelineBuilder<S> {
    cfg: PipelineCfg,
    tasks: Vec<Box<dyn SamplingTask>>,
    sinks: Vec<Box<dyn LineSink + Send>>,
    shutdown: Shutdown,
    _s: PhantomData<S>,
}

impl PipelineBuilder<Missing> {
    pub fn new(cfg: PipelineCfg) -> Self {
        Self {
            cfg,
            tasks: Vec::new(),
            sinks: Vec::new(),
            shutdown: Shutdown::new(),
            _s: PhantomData,
        }
    }
}

impl<S> PipelineBuilder<S> {
    pub fn cfg(&self) -> &PipelineCfg {
        &self.cfg
    }

    /// Share an existing stop flag (e.g. one a signal handler raises).
    pub fn with_shutdown(mut self, shutdown: Shutdown) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Add a prebuilt sampling task.
    pub fn with_task(mut self, task: impl SamplingTask + 'static) -> Self {
        self.tasks.push(Box::new(task));
        self
    }

    /// Add a gauge read through a polled sampler with the configured
    /// comparator, timeouts and filter.
    pub fn with_gauge<L, D, K>(
        self,
        source: SourceId,
        clock_line: L,
        data_line: D,
        clock: K,
    ) -> Self
    where
        L: SignalLine + Send + 'static,
        D: SignalLine + Send + 'static,
        K: Clock + Clone + Send + 'static,
    {
        let sampler =
            PolledBitSampler::new(clock_line, data_line, self.cfg.comparator, clock.clone());
        let filter = NoiseFilter::new(self.cfg.filter);
        let timing = self.cfg.timing;
        self.with_task(GaugeTask::new(source, sampler, clock, timing, filter))
    }

    pub fn with_contact<I, K>(self, source: SourceId, input: I, clock: K) -> Self
    where
        I: ContactInput + Send + 'static,
        K: Clock + Send + 'static,
    {
        let poll = self.cfg.timing.contact_poll;
        self.with_task(ContactTask::new(source, input, clock, poll))
    }

    pub fn with_scale<A, K>(self, source: SourceId, scanner: A, clock: K) -> Self
    where
        A: AdvertisementSource + Send + 'static,
        K: Clock + Send + 'static,
    {
        let cfg = self.cfg.scale;
        self.with_task(ScaleTask::new(source, scanner, clock, cfg))
    }

    pub fn with_sink(self, sink: impl LineSink + Send + 'static) -> PipelineBuilder<Set> {
        let mut sinks = self.sinks;
        sinks.push(Box::new(sink));
        PipelineBuilder {
            cfg: self.cfg,
            tasks: self.tasks,
            sinks,
            shutdown: self.shutdown,
            _s: PhantomData,
        }
    }

    /// Validate and spawn every thread.
    pub fn try_start(self) -> Result<Pipeline> {
        if self.sinks.is_empty() {
            return Err(eyre::Report::new(BuildError::MissingSink));
        }
        if self.tasks.is_empty() {
            return Err(eyre::Report::new(BuildError::NoSources));
        }
        if self.cfg.queue.capacity == 0 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "queue capacity must be >= 1",
            )));
        }
        let mut seen = HashSet::new();
        for t in &self.tasks {
            if !seen.insert(t.source()) {
                return Err(eyre::Report::new(BuildError::DuplicateSource(t.source())));
            }
        }

        // declared before the queue so an early return drops the sender first
        let mut pipeline = Pipeline {
            shutdown: self.shutdown,
            producers: Vec::with_capacity(self.tasks.len()),
            dispatcher: None,
        };
        let (tx, rx) = event_queue(self.cfg.queue.capacity);

        let dispatcher = Dispatcher::new(self.sinks);
        let handle = thread::Builder::new()
            .name("spoke-dispatch".into())
            .spawn(move || dispatcher.run(&rx))
            .wrap_err("spawning dispatcher thread")?;
        pipeline.dispatcher = Some(handle);

        for mut task in self.tasks {
            let name = format!("spoke-{}-{}", task.kind(), task.source());
            let tx = tx.clone();
            let stop = pipeline.shutdown.clone();
            let handle = thread::Builder::new()
                .name(name.clone())
                .spawn(move || tasks::run(&mut task, &tx, &stop))
                .wrap_err_with(|| format!("spawning {name}"))?;
            pipeline.producers.push((name, handle));
        }
        info!(
            producers = pipeline.producers.len(),
            capacity = self.cfg.queue.capacity,
            "pipeline started"
        );
        Ok(pipeline)
    }
}

impl PipelineBuilder<Set> {
    pub fn start(self) -> Result<Pipeline> {
        self.try_start()
    }
}

/// Handle on running sampling and dispatch threads.
///
/// Dropping it stops the pipeline and joins every thread.
#[derive(Debug)]
pub struct Pipeline {
    shutdown: Shutdown,
    producers: Vec<(String, JoinHandle<()>)>,
    dispatcher: Option<JoinHandle<DispatchStats>>,
}

impl Pipeline {
    pub fn builder(cfg: PipelineCfg) -> PipelineBuilder<Missing> {
        PipelineBuilder::new(cfg)
    }

    pub fn shutdown_handle(&self) -> Shutdown {
        self.shutdown.clone()
    }

    pub fn producer_names(&self) -> impl Iterator<Item = &str> {
        self.producers.iter().map(|(n, _)| n.as_str())
    }

    /// Request a stop, let the dispatcher drain, and join everything.
    pub fn stop(mut self) -> Result<DispatchStats> {
        self.shutdown.request();
        self.join_all()
    }

    /// Block until someone else raises the shutdown flag and the pipeline
    /// has drained.
    pub fn wait(mut self) -> Result<DispatchStats> {
        self.join_all()
    }

    fn join_all(&mut self) -> Result<DispatchStats> {
        let mut first_panic = None;
        for (name, handle) in self.producers.drain(..) {
            if handle.join().is_err() {
                warn!(task = %name, "sampling thread panicked");
                first_panic.get_or_insert(name);
            }
        }
        // every sender is gone now, so the dispatcher finishes once drained
        let stats = match self.dispatcher.take() {
            Some(h) => h
                .join()
                .map_err(|_| SpokeError::TaskPanicked("spoke-dispatch".into()))?,
            None => DispatchStats::default(),
        };
        if let Some(name) = first_panic {
            return Err(SpokeError::TaskPanicked(name).into());
        }
        info!(delivered = stats.delivered, sink_errors = stats.sink_errors, "pipeline stopped");
        Ok(stats)
    }
}

impl Drop for Pipeline {
    fn drop(&mut self) {
        if self.dispatcher.is_none() && self.producers.is_empty() {
            return;
        }
        self.shutdown.request();
        if let Err(e) = self.join_all() {
            warn!(error = %e, "pipeline shutdown during drop");
        }
    }
}
