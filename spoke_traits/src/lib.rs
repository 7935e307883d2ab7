pub mod clock;

pub use clock::{Clock, MonotonicClock};

use std::time::Duration;

/// Error type carried across the hardware trait boundary.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A single polled input line: raw ADC counts on analog inputs, 0/1 on
/// digital ones. How a level maps to "active" is the sampler's business.
pub trait SignalLine {
    fn level(&mut self) -> u16;
}

/// A digital contact (pedal, push button) read as a plain pin level.
pub trait ContactInput {
    fn is_high(&mut self) -> bool;
}

/// Pull interface onto a wireless scanner: run one scan window and return
/// the manufacturer-data payloads seen during it.
pub trait AdvertisementSource {
    fn scan(&mut self, window: Duration) -> Result<Vec<Vec<u8>>, BoxError>;
}

/// A textual transport that accepts one event line at a time.
pub trait LineSink {
    fn write_line(&mut self, line: &str) -> Result<(), BoxError>;
}

impl<T: SignalLine + ?Sized> SignalLine for Box<T> {
    fn level(&mut self) -> u16 {
        (**self).level()
    }
}

impl<T: ContactInput + ?Sized> ContactInput for Box<T> {
    fn is_high(&mut self) -> bool {
        (**self).is_high()
    }
}

impl<T: AdvertisementSource + ?Sized> AdvertisementSource for Box<T> {
    fn scan(&mut self, window: Duration) -> Result<Vec<Vec<u8>>, BoxError> {
        (**self).scan(window)
    }
}

impl<T: LineSink + ?Sized> LineSink for Box<T> {
    fn write_line(&mut self, line: &str) -> Result<(), BoxError> {
        (**self).write_line(line)
    }
}
