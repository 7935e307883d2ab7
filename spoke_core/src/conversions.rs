//! `From` implementations bridging `spoke_config` types to `spoke_core` types.

use std::time::Duration;

use crate::config::{Comparator, FilterCfg, PipelineCfg, QueueCfg, ScaleCfg, TimingCfg};

// ── FilterCfg ────────────────────────────────────────────────────────────────

impl From<&spoke_config::Filter> for FilterCfg {
    fn from(c: &spoke_config::Filter) -> Self {
        Self {
            min_active_mm: c.min_active_mm,
            min_change_mm: c.min_change_mm,
            max_step_mm: c.max_step_mm,
        }
    }
}

// ── TimingCfg ────────────────────────────────────────────────────────────────

impl From<&spoke_config::Timing> for TimingCfg {
    fn from(c: &spoke_config::Timing) -> Self {
        Self {
            bit_timeout: Duration::from_millis(c.bit_timeout_ms),
            packet_timeout: Duration::from_millis(c.packet_timeout_ms),
            gauge_poll: Duration::from_millis(c.gauge_poll_ms),
            contact_poll: Duration::from_millis(c.contact_poll_ms),
        }
    }
}

// ── Comparator ───────────────────────────────────────────────────────────────

impl From<spoke_config::Comparator> for Comparator {
    fn from(c: spoke_config::Comparator) -> Self {
        match c {
            spoke_config::Comparator::Analog { threshold } => Self::Analog { threshold },
            spoke_config::Comparator::DigitalInverted => Self::DigitalInverted,
        }
    }
}

// ── ScaleCfg ─────────────────────────────────────────────────────────────────

impl From<&spoke_config::Scale> for ScaleCfg {
    fn from(c: &spoke_config::Scale) -> Self {
        Self {
            manufacturer_id: c.manufacturer_id,
            weight_offset: c.weight_offset,
            scan_window: Duration::from_millis(c.scan_window_ms),
            rest: Duration::from_millis(c.rest_ms),
        }
    }
}

// ── PipelineCfg ──────────────────────────────────────────────────────────────

impl From<&spoke_config::Config> for PipelineCfg {
    fn from(c: &spoke_config::Config) -> Self {
        Self {
            timing: (&c.timing).into(),
            comparator: c.comparator.into(),
            filter: (&c.filter).into(),
            scale: (&c.scale).into(),
            queue: QueueCfg {
                capacity: c.queue.capacity,
            },
        }
    }
}
