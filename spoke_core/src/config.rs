//! Runtime configuration for the sampling pipeline.
//!
//! These are the structs the tasks and the pipeline builder consume. They
//! are separate from the TOML schema in `spoke_config`; see
//! `conversions.rs` for the mapping.

use std::time::Duration;

pub use crate::bit::Comparator;

/// Noise filter thresholds, in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterCfg {
    /// Readings below this mean the gauge is not in use.
    pub min_active_mm: f32,
    /// Changes smaller than this are jitter.
    pub min_change_mm: f32,
    /// Changes larger than this are glitches.
    pub max_step_mm: f32,
}

impl Default for FilterCfg {
    fn default() -> Self {
        Self {
            min_active_mm: 0.6,
            min_change_mm: 0.01,
            max_step_mm: 1.0,
        }
    }
}

/// Timeouts and loop pacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingCfg {
    pub bit_timeout: Duration,
    pub packet_timeout: Duration,
    /// Delay before each gauge read.
    pub gauge_poll: Duration,
    /// Delay after each contact sample.
    pub contact_poll: Duration,
}

impl Default for TimingCfg {
    fn default() -> Self {
        Self {
            bit_timeout: Duration::from_millis(100),
            packet_timeout: Duration::from_millis(250),
            gauge_poll: Duration::from_millis(50),
            contact_poll: Duration::from_millis(10),
        }
    }
}

/// Scale advertisement handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaleCfg {
    pub manufacturer_id: u16,
    pub weight_offset: usize,
    pub scan_window: Duration,
    /// Pause between scan windows.
    pub rest: Duration,
}

impl Default for ScaleCfg {
    fn default() -> Self {
        Self {
            manufacturer_id: crate::advert::WHC06_MANUFACTURER_ID,
            weight_offset: crate::advert::WEIGHT_OFFSET,
            scan_window: Duration::from_secs(5),
            rest: Duration::from_millis(2000),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueCfg {
    pub capacity: usize,
}

impl Default for QueueCfg {
    fn default() -> Self {
        Self {
            capacity: crate::queue::DEFAULT_CAPACITY,
        }
    }
}

/// Everything the pipeline needs besides the sensors themselves.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PipelineCfg {
    pub timing: TimingCfg,
    pub comparator: Comparator,
    pub filter: FilterCfg,
    pub scale: ScaleCfg,
    pub queue: QueueCfg,
}
