//! Command bodies: `run`, `decode` and `self-check`.

use eyre::WrapErr;
use spoke_config::Config;
use spoke_core::packet::{INCH_BIT, MAGNITUDE_MASK, SIGN_BIT};
use spoke_core::tasks::GaugeTask;
use spoke_core::{
    NoiseFilter, Packet, Pipeline, PipelineCfg, PolledBitSampler, Shutdown, WeightExtractor,
    WriterSink, interpret,
};
use spoke_traits::{AdvertisementSource, Clock, ContactInput, MonotonicClock};
use std::fs::OpenOptions;
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::sensors;

fn open_mirror(path: &Path) -> eyre::Result<std::fs::File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .wrap_err_with(|| format!("open mirror {}", path.display()))
}

/// Stream events until Ctrl-C (or `duration_ms`), then drain and exit.
pub fn run(cfg: &Config, mirror: Option<&Path>, duration_ms: Option<u64>) -> eyre::Result<()> {
    let sensors = sensors::open(cfg)?;
    let shutdown = Shutdown::new();
    {
        let stop = shutdown.clone();
        ctrlc::set_handler(move || stop.request()).wrap_err("installing Ctrl-C handler")?;
    }

    let count = sensors.count();
    let builder = sensors
        .attach(Pipeline::builder(PipelineCfg::from(cfg)).with_shutdown(shutdown.clone()))
        .with_sink(WriterSink::new(std::io::stdout()));
    let builder = match mirror {
        Some(path) => builder.with_sink(WriterSink::new(open_mirror(path)?)),
        None => builder,
    };
    let pipeline = builder.start()?;
    info!(sensors = count, mirror = ?mirror, "streaming events");

    if let Some(ms) = duration_ms {
        let clock = MonotonicClock::new();
        if shutdown.pause(&clock, Duration::from_millis(ms)) {
            info!(duration_ms = ms, "run duration reached");
            shutdown.request();
        }
    }
    let stats = pipeline.wait()?;
    info!(
        delivered = stats.delivered,
        sink_errors = stats.sink_errors,
        "run finished"
    );
    Ok(())
}

/// Parse `0x900064`, `900064` or `0X900064` into a 24-bit packet.
pub fn parse_packet(text: &str) -> eyre::Result<u32> {
    let trimmed = text.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    let raw = u32::from_str_radix(digits, 16)
        .map_err(|e| eyre::eyre!("invalid packet hex {text:?}: {e}"))?;
    if raw > 0xFF_FFFF {
        eyre::bail!("invalid packet hex {text:?}: more than 24 bits");
    }
    Ok(raw)
}

pub fn decode(text: &str, json: bool) -> eyre::Result<()> {
    let raw = parse_packet(text)?;
    let mm = interpret(Packet::Valid(raw));
    let inch = raw & INCH_BIT != 0;
    let negative = raw & SIGN_BIT != 0;
    if json {
        let obj = serde_json::json!({
            "packet": format!("0x{raw:06X}"),
            "magnitude": raw & MAGNITUDE_MASK,
            "negative": negative,
            "inch": inch,
            "mm": (f64::from(mm.mm()) * 100.0).round() / 100.0,
        });
        println!("{obj}");
    } else {
        let unit = if inch { "inch mode" } else { "metric" };
        let sign = if negative { ", negative" } else { "" };
        println!("packet 0x{raw:06X}: {mm} mm ({unit}{sign})");
    }
    Ok(())
}

/// Take one reading from every sensor and report it. Fails when a gauge
/// yields no packet at all.
pub fn self_check(cfg: &Config) -> eyre::Result<()> {
    let core = PipelineCfg::from(cfg);
    let sensors = sensors::open(cfg)?;
    let clock = MonotonicClock::new();
    let mut silent = Vec::new();

    for g in sensors.gauges {
        let sampler = PolledBitSampler::new(g.clock, g.data, core.comparator, clock);
        let filter = NoiseFilter::new(core.filter);
        let mut task = GaugeTask::new(g.source, sampler, clock, core.timing, filter);
        let m = task.measure();
        if m.is_reading() {
            println!("gauge {}: {m} mm", g.source);
        } else {
            println!("gauge {}: no packet within {:?}", g.source, core.timing.packet_timeout);
            silent.push(g.source);
        }
    }
    for mut c in sensors.contacts {
        let level = if c.input.is_high() { "high" } else { "low" };
        println!("contact {}: {level}", c.source);
    }
    if let Some(mut s) = sensors.scale {
        let window = core.scale.scan_window;
        let start = clock.now();
        let extractor = WeightExtractor::new(core.scale.manufacturer_id, core.scale.weight_offset);
        match s.scanner.scan(window) {
            Ok(payloads) => {
                let weights: Vec<f32> = payloads
                    .iter()
                    .filter_map(|p| extractor.extract(p))
                    .collect();
                match weights.last() {
                    Some(kg) => println!("scale {}: {kg:.2} kg", s.source),
                    None => println!(
                        "scale {}: no matching advertisement in {} ms ({} payloads)",
                        s.source,
                        clock.ms_since(start),
                        payloads.len()
                    ),
                }
            }
            Err(e) => println!("scale {}: scan failed: {e}", s.source),
        }
    }

    if !silent.is_empty() {
        eyre::bail!("self-check failed: no packet from gauge(s) {silent:?}");
    }
    info!(comparator = ?core.comparator, "self-check passed");
    println!("self-check ok");
    Ok(())
}
