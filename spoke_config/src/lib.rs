#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the sensor link.
//!
//! `Config` and its sections are deserialized from TOML and then checked
//! with [`Config::validate`]. Every section is optional; missing keys fall
//! back to the values the reference hardware uses.
use eyre::WrapErr;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Timing {
    /// Longest wait for one clock cycle on a gauge.
    pub bit_timeout_ms: u64,
    /// Longest wait for a whole 24-bit packet, resyncs included.
    pub packet_timeout_ms: u64,
    /// Delay before each gauge read.
    pub gauge_poll_ms: u64,
    /// Delay between contact samples.
    pub contact_poll_ms: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            bit_timeout_ms: 100,
            packet_timeout_ms: 250,
            gauge_poll_ms: 50,
            contact_poll_ms: 10,
        }
    }
}

fn default_threshold() -> u16 {
    1100
}

/// How raw gauge line levels are judged.
///
/// ```toml
/// [comparator]
/// mode = "analog"
/// threshold = 1100
/// ```
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum Comparator {
    Analog {
        #[serde(default = "default_threshold")]
        threshold: u16,
    },
    DigitalInverted,
}

impl Default for Comparator {
    fn default() -> Self {
        Self::Analog {
            threshold: default_threshold(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Filter {
    pub min_active_mm: f32,
    pub min_change_mm: f32,
    pub max_step_mm: f32,
}

impl Default for Filter {
    fn default() -> Self {
        Self {
            min_active_mm: 0.6,
            min_change_mm: 0.01,
            max_step_mm: 1.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Gauge {
    pub source_id: u8,
    pub clock_pin: u8,
    pub data_pin: u8,
    /// Simulated readings for this gauge; overrides `[simulation].readings_mm`.
    #[serde(default)]
    pub sim_readings_mm: Option<Vec<f32>>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, Clone)]
pub struct Contact {
    pub source_id: u8,
    pub pin: u8,
    /// Enable the internal pull-up (contact closes to ground).
    #[serde(default = "default_true")]
    pub pull_up: bool,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Scale {
    pub enabled: bool,
    pub source_id: u8,
    pub manufacturer_id: u16,
    pub weight_offset: usize,
    pub scan_window_ms: u64,
    pub rest_ms: u64,
}

impl Default for Scale {
    fn default() -> Self {
        Self {
            enabled: false,
            source_id: 9,
            manufacturer_id: 256,
            weight_offset: 32,
            scan_window_ms: 5000,
            rest_ms: 2000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Queue {
    pub capacity: usize,
}

impl Default for Queue {
    fn default() -> Self {
        Self { capacity: 20 }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

/// Parameters for the simulated sensors used when no hardware backend is
/// compiled in.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Simulation {
    /// Gauge readings cycled through, in millimetres.
    pub readings_mm: Vec<f32>,
    /// How long each reading is held.
    pub hold_ms: u64,
    /// Gauge clock period per bit.
    pub bit_period_us: u64,
    /// Idle time between gauge frames.
    pub frame_gap_ms: u64,
    /// Contact pattern: pressed for `press_steps` out of every `period_steps`.
    pub contact_period_steps: usize,
    pub contact_press_steps: usize,
    pub contact_step_ms: u64,
    /// Weights the simulated scale advertises, in kilograms.
    pub weights_kg: Vec<f32>,
}

impl Default for Simulation {
    fn default() -> Self {
        Self {
            readings_mm: vec![0.0, 0.75, 1.20, 1.45, 1.45, 0.90, 0.0],
            hold_ms: 1500,
            bit_period_us: 400,
            frame_gap_ms: 80,
            contact_period_steps: 40,
            contact_press_steps: 10,
            contact_step_ms: 100,
            weights_kg: vec![72.5, 72.55, 72.6],
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Config {
    pub timing: Timing,
    pub comparator: Comparator,
    pub filter: Filter,
    pub gauges: Vec<Gauge>,
    pub contacts: Vec<Contact>,
    pub scale: Scale,
    pub queue: Queue,
    pub logging: Logging,
    pub simulation: Simulation,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Read, parse and validate a config file.
pub fn load_file(path: impl AsRef<Path>) -> eyre::Result<Config> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("reading config {}", path.display()))?;
    let cfg = load_toml(&text).wrap_err_with(|| format!("parsing config {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

fn check_mm(name: &str, v: f32) -> eyre::Result<()> {
    if !v.is_finite() || v < 0.0 {
        eyre::bail!("filter.{name} must be finite and >= 0");
    }
    Ok(())
}

impl Config {
    /// Source ids of every configured sensor, in declaration order.
    pub fn source_ids(&self) -> Vec<u8> {
        let mut ids: Vec<u8> = self.gauges.iter().map(|g| g.source_id).collect();
        ids.extend(self.contacts.iter().map(|c| c.source_id));
        if self.scale.enabled {
            ids.push(self.scale.source_id);
        }
        ids
    }

    pub fn validate(&self) -> eyre::Result<()> {
        // Timing
        let t = &self.timing;
        if t.bit_timeout_ms == 0 {
            eyre::bail!("timing.bit_timeout_ms must be >= 1");
        }
        if t.packet_timeout_ms == 0 {
            eyre::bail!("timing.packet_timeout_ms must be >= 1");
        }
        if t.packet_timeout_ms < t.bit_timeout_ms {
            eyre::bail!("timing.packet_timeout_ms must be >= timing.bit_timeout_ms");
        }
        if t.gauge_poll_ms > 60_000 || t.contact_poll_ms > 60_000 {
            eyre::bail!("timing poll intervals are unreasonably large (>60s)");
        }

        // Comparator
        if let Comparator::Analog { threshold } = self.comparator
            && threshold >= 4096
        {
            eyre::bail!("comparator.threshold must be < 4096 (12-bit ADC)");
        }

        // Filter
        check_mm("min_active_mm", self.filter.min_active_mm)?;
        check_mm("min_change_mm", self.filter.min_change_mm)?;
        check_mm("max_step_mm", self.filter.max_step_mm)?;
        if self.filter.min_change_mm >= self.filter.max_step_mm {
            eyre::bail!("filter.min_change_mm must be < filter.max_step_mm");
        }

        // Scale
        if self.scale.enabled {
            if self.scale.scan_window_ms == 0 {
                eyre::bail!("scale.scan_window_ms must be >= 1");
            }
            if self.scale.weight_offset < 2 {
                eyre::bail!("scale.weight_offset must be >= 2 (bytes 0..2 hold the company id)");
            }
        }

        // Queue
        if self.queue.capacity == 0 {
            eyre::bail!("queue.capacity must be >= 1");
        }

        // Sensors
        let ids = self.source_ids();
        if ids.is_empty() {
            eyre::bail!("at least one sensor must be configured ([[gauges]], [[contacts]] or [scale])");
        }
        let mut seen = HashSet::new();
        for id in ids {
            if !seen.insert(id) {
                eyre::bail!("source_id {id} is used by more than one sensor");
            }
        }
        let mut pins = HashSet::new();
        let gauge_pins = self.gauges.iter().flat_map(|g| [g.clock_pin, g.data_pin]);
        for pin in gauge_pins.chain(self.contacts.iter().map(|c| c.pin)) {
            if !pins.insert(pin) {
                eyre::bail!("pin {pin} is assigned more than once");
            }
        }

        // Simulation
        let sim = &self.simulation;
        if sim.bit_period_us < 2 {
            eyre::bail!("simulation.bit_period_us must be >= 2");
        }
        if sim.readings_mm.iter().any(|v| !v.is_finite()) {
            eyre::bail!("simulation.readings_mm must be finite");
        }
        if sim.contact_press_steps > sim.contact_period_steps {
            eyre::bail!("simulation.contact_press_steps must be <= contact_period_steps");
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_parses_to_defaults_but_needs_a_sensor() {
        let cfg = load_toml("").expect("parse");
        assert_eq!(cfg.timing.bit_timeout_ms, 100);
        assert_eq!(cfg.queue.capacity, 20);
        assert_eq!(cfg.comparator, Comparator::Analog { threshold: 1100 });
        let err = cfg.validate().expect_err("no sensors");
        assert!(err.to_string().contains("at least one sensor"));
    }

    #[test]
    fn comparator_modes_parse() {
        let cfg = load_toml("[comparator]\nmode = \"digital-inverted\"\n").expect("parse");
        assert_eq!(cfg.comparator, Comparator::DigitalInverted);
        let cfg = load_toml("[comparator]\nmode = \"analog\"\n").expect("parse");
        assert_eq!(cfg.comparator, Comparator::Analog { threshold: 1100 });
    }
}
