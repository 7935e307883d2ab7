//! Raspberry Pi GPIO inputs via `rppal`.
//!
//! The Pi has no ADC, so gauge lines opened here only work with the
//! inverted-digital comparator (a transistor stage on clock and data).

use rppal::gpio::{Gpio, InputPin};
use spoke_traits::{ContactInput, SignalLine};
use tracing::debug;

use crate::error::{HwError, Result};

/// Process-wide GPIO handle, opened once on first use.
pub fn gpio() -> Result<&'static Gpio> {
    use std::sync::OnceLock;
    static GPIO: OnceLock<Gpio> = OnceLock::new();
    if let Some(g) = GPIO.get() {
        return Ok(g);
    }
    let opened = Gpio::new().map_err(|e| HwError::Gpio(format!("open gpio: {e}")))?;
    Ok(GPIO.get_or_init(|| opened))
}

pub struct GpioLine {
    pin: InputPin,
}

impl GpioLine {
    /// Floating input, used for gauge clock/data lines.
    pub fn input(bcm: u8) -> Result<Self> {
        let pin = gpio()?
            .get(bcm)
            .map_err(|e| HwError::Gpio(format!("open pin {bcm}: {e}")))?
            .into_input();
        debug!(pin = bcm, "gauge line opened");
        Ok(Self { pin })
    }

    /// Input with the internal pull-up enabled, used for contacts.
    pub fn input_pullup(bcm: u8) -> Result<Self> {
        let pin = gpio()?
            .get(bcm)
            .map_err(|e| HwError::Gpio(format!("open pin {bcm}: {e}")))?
            .into_input_pullup();
        debug!(pin = bcm, "contact opened");
        Ok(Self { pin })
    }
}

impl SignalLine for GpioLine {
    #[inline]
    fn level(&mut self) -> u16 {
        u16::from(self.pin.is_high())
    }
}

impl ContactInput for GpioLine {
    #[inline]
    fn is_high(&mut self) -> bool {
        self.pin.is_high()
    }
}
