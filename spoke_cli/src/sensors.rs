//! Sensor assembly: turns the `[[gauges]]`, `[[contacts]]` and `[scale]`
//! sections into line handles for the selected backend.

use spoke_config::Config;
use spoke_core::pipeline::PipelineBuilder;
use spoke_traits::{AdvertisementSource, ContactInput, MonotonicClock, SignalLine};

pub type Line = Box<dyn SignalLine + Send>;

pub struct GaugeLines {
    pub source: u8,
    pub clock: Line,
    pub data: Line,
}

pub struct ContactHandle {
    pub source: u8,
    pub input: Box<dyn ContactInput + Send>,
}

pub struct ScaleHandle {
    pub source: u8,
    pub scanner: Box<dyn AdvertisementSource + Send>,
}

pub struct Sensors {
    pub gauges: Vec<GaugeLines>,
    pub contacts: Vec<ContactHandle>,
    pub scale: Option<ScaleHandle>,
}

impl Sensors {
    /// Register every sensor with the pipeline, all on the real clock.
    pub fn attach<S>(self, mut builder: PipelineBuilder<S>) -> PipelineBuilder<S> {
        for g in self.gauges {
            builder = builder.with_gauge(g.source, g.clock, g.data, MonotonicClock::new());
        }
        for c in self.contacts {
            builder = builder.with_contact(c.source, c.input, MonotonicClock::new());
        }
        if let Some(s) = self.scale {
            builder = builder.with_scale(s.source, s.scanner, MonotonicClock::new());
        }
        builder
    }

    pub fn count(&self) -> usize {
        self.gauges.len() + self.contacts.len() + usize::from(self.scale.is_some())
    }
}

#[cfg(not(all(feature = "hardware", target_os = "linux")))]
pub fn open(cfg: &Config) -> eyre::Result<Sensors> {
    use spoke_hardware::sim::{
        GaugeTiming, LineEncoding, SimulatedContact, SimulatedGauge, SimulatedScale,
    };
    use std::time::Duration;

    let sim = &cfg.simulation;
    let encoding = match cfg.comparator {
        spoke_config::Comparator::Analog { threshold } => LineEncoding::Analog {
            active: threshold.saturating_add(700),
            inactive: threshold.saturating_sub(900),
        },
        spoke_config::Comparator::DigitalInverted => LineEncoding::DigitalInverted,
    };
    let timing = GaugeTiming {
        bit_period: Duration::from_micros(sim.bit_period_us),
        frame_gap: Duration::from_millis(sim.frame_gap_ms),
    };
    let hold = Duration::from_millis(sim.hold_ms);

    let gauges = cfg
        .gauges
        .iter()
        .map(|g| {
            let readings = g.sim_readings_mm.as_deref().unwrap_or(sim.readings_mm.as_slice());
            let (clock, data) = SimulatedGauge::new(MonotonicClock::new(), encoding)
                .with_timing(timing)
                .with_readings_mm(readings, hold)
                .into_lines();
            tracing::debug!(source_id = g.source_id, "simulated gauge");
            GaugeLines {
                source: g.source_id,
                clock: Box::new(clock),
                data: Box::new(data),
            }
        })
        .collect();

    let contacts = cfg
        .contacts
        .iter()
        .map(|c| ContactHandle {
            source: c.source_id,
            input: Box::new(SimulatedContact::pedal(
                MonotonicClock::new(),
                sim.contact_period_steps,
                sim.contact_press_steps,
                Duration::from_millis(sim.contact_step_ms),
            )),
        })
        .collect();

    let scale = cfg.scale.enabled.then(|| ScaleHandle {
        source: cfg.scale.source_id,
        scanner: Box::new(SimulatedScale::new(
            MonotonicClock::new(),
            cfg.scale.manufacturer_id,
            cfg.scale.weight_offset,
            sim.weights_kg.clone(),
        )),
    });

    Ok(Sensors {
        gauges,
        contacts,
        scale,
    })
}

#[cfg(all(feature = "hardware", target_os = "linux"))]
pub fn open(cfg: &Config) -> eyre::Result<Sensors> {
    use eyre::WrapErr;
    use spoke_hardware::HwError;
    use spoke_hardware::gpio::GpioLine;

    if !matches!(cfg.comparator, spoke_config::Comparator::DigitalInverted) {
        return Err(HwError::Unsupported(
            "analog comparator needs an ADC; set [comparator] mode = \"digital-inverted\"",
        )
        .into());
    }
    if cfg.scale.enabled {
        return Err(HwError::Unsupported("BLE advertisement scanning").into());
    }

    let mut gauges = Vec::with_capacity(cfg.gauges.len());
    for g in &cfg.gauges {
        let clock = GpioLine::input(g.clock_pin)
            .wrap_err_with(|| format!("open gauge {} clock pin", g.source_id))?;
        let data = GpioLine::input(g.data_pin)
            .wrap_err_with(|| format!("open gauge {} data pin", g.source_id))?;
        gauges.push(GaugeLines {
            source: g.source_id,
            clock: Box::new(clock),
            data: Box::new(data),
        });
    }

    let mut contacts = Vec::with_capacity(cfg.contacts.len());
    for c in &cfg.contacts {
        let pin = if c.pull_up {
            GpioLine::input_pullup(c.pin)
        } else {
            GpioLine::input(c.pin)
        }
        .wrap_err_with(|| format!("open contact {} pin", c.source_id))?;
        contacts.push(ContactHandle {
            source: c.source_id,
            input: Box::new(pin),
        });
    }

    Ok(Sensors {
        gauges,
        contacts,
        scale: None,
    })
}
