use spoke_traits::Clock;
use tracing::debug;

use super::{SamplingTask, Shutdown};
use crate::bit::BitSampler;
use crate::config::TimingCfg;
use crate::error::SpokeError;
use crate::event::{Event, SourceId};
use crate::filter::{NoiseFilter, Verdict};
use crate::packet::{Measurement, interpret, read_packet};
use crate::queue::EventSender;

/// Per-gauge state: the reference value for the noise filter.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GaugeState {
    pub last_mm: f32,
}

/// Feed one measurement through the filter; `Some` when it should be sent.
pub fn process_reading(
    source: SourceId,
    filter: &NoiseFilter,
    state: &mut GaugeState,
    m: Measurement,
) -> Option<Event> {
    match filter.accept(m.mm(), &mut state.last_mm) {
        Verdict::Accepted => Some(Event::gauge(source, m)),
        Verdict::Inactive if !m.is_reading() => {
            debug!(source_id = source, "no packet before deadline");
            None
        }
        verdict => {
            debug!(source_id = source, mm = m.mm(), ?verdict, "reading dropped");
            None
        }
    }
}

/// Polls one dial gauge: wait, read a packet, interpret, filter, emit.
pub struct GaugeTask<B, K> {
    source: SourceId,
    sampler: B,
    clock: K,
    timing: TimingCfg,
    filter: NoiseFilter,
    state: GaugeState,
}

impl<B, K> GaugeTask<B, K>
where
    B: BitSampler,
    K: Clock,
{
    pub fn new(
        source: SourceId,
        sampler: B,
        clock: K,
        timing: TimingCfg,
        filter: NoiseFilter,
    ) -> Self {
        Self {
            source,
            sampler,
            clock,
            timing,
            filter,
            state: GaugeState::default(),
        }
    }

    pub fn state(&self) -> GaugeState {
        self.state
    }

    /// Read and interpret one packet, without the pacing delay.
    pub fn measure(&mut self) -> Measurement {
        interpret(read_packet(
            &mut self.sampler,
            &self.clock,
            self.timing.bit_timeout,
            self.timing.packet_timeout,
        ))
    }
}

impl<B, K> SamplingTask for GaugeTask<B, K>
where
    B: BitSampler + Send,
    K: Clock + Send,
{
    fn source(&self) -> SourceId {
        self.source
    }

    fn kind(&self) -> &'static str {
        "gauge"
    }

    fn poll_once(&mut self, tx: &EventSender, shutdown: &Shutdown) -> Result<(), SpokeError> {
        if !shutdown.pause(&self.clock, self.timing.gauge_poll) {
            return Ok(());
        }
        let m = self.measure();
        match process_reading(self.source, &self.filter, &mut self.state, m) {
            Some(ev) => tx.push(ev),
            None => Ok(()),
        }
    }
}
