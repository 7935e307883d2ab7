#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Sensor sampling and fan-in pipeline (hardware-agnostic).
//!
//! All line and radio access goes through the `spoke_traits` interfaces, so
//! everything here runs against simulated sensors as well as real pins.
//!
//! ## Architecture
//!
//! - **Bits and packets**: `BitSampler` recovers one bit per clock cycle,
//!   `read_packet` assembles 24 of them with resync on timeout (`bit`, `packet`)
//! - **Readings**: `interpret` turns a packet into millimetres, `NoiseFilter`
//!   drops idle, jitter and glitch readings (`packet`, `filter`)
//! - **Contacts**: full-toggle debounce (`debounce`)
//! - **Scale**: weight extraction from manufacturer data (`advert`)
//! - **Fan-in**: fixed-size `Event`s over a bounded queue to one `Dispatcher`
//!   (`event`, `queue`, `dispatch`)
//! - **Runtime**: one thread per `SamplingTask`, wired by `Pipeline` (`tasks`, `pipeline`)

pub mod advert;
pub mod bit;
pub mod config;
mod conversions;
pub mod debounce;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod filter;
pub mod mocks;
pub mod packet;
pub mod pipeline;
pub mod queue;
pub mod tasks;
pub mod util;

pub use advert::WeightExtractor;
pub use bit::{BitSampler, Comparator, PolledBitSampler, RawBit};
pub use config::{FilterCfg, PipelineCfg, QueueCfg, ScaleCfg, TimingCfg};
pub use debounce::DebounceState;
pub use dispatch::{DispatchStats, Dispatcher, WriterSink};
pub use error::{BuildError, SpokeError};
pub use event::{Event, EventLine, ParseEventError, SourceId};
pub use filter::{NoiseFilter, Verdict};
pub use packet::{Measurement, Packet, interpret, read_packet};
pub use pipeline::{Pipeline, PipelineBuilder};
pub use queue::{EventReceiver, EventSender, event_queue};
pub use tasks::{SamplingTask, Shutdown};
