//! Weight extraction from the scale's BLE manufacturer data.

use tracing::trace;

/// Company id the WH-C06 scale advertises with.
pub const WHC06_MANUFACTURER_ID: u16 = 256;
/// Byte offset of the big-endian weight field in the manufacturer data.
pub const WEIGHT_OFFSET: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeightExtractor {
    manufacturer_id: u16,
    weight_offset: usize,
}

impl Default for WeightExtractor {
    fn default() -> Self {
        Self::new(WHC06_MANUFACTURER_ID, WEIGHT_OFFSET)
    }
}

impl WeightExtractor {
    pub fn new(manufacturer_id: u16, weight_offset: usize) -> Self {
        Self {
            manufacturer_id,
            weight_offset,
        }
    }

    pub fn manufacturer_id(&self) -> u16 {
        self.manufacturer_id
    }

    /// Weight in kilograms, or `None` for foreign or truncated payloads.
    pub fn extract(&self, payload: &[u8]) -> Option<f32> {
        let company = payload.get(..2)?;
        let company = u16::from_le_bytes([company[0], company[1]]);
        if company != self.manufacturer_id {
            return None;
        }
        let end = self.weight_offset.checked_add(2)?;
        let Some(field) = payload.get(self.weight_offset..end) else {
            trace!(len = payload.len(), need = end, "scale payload too short");
            return None;
        };
        let raw = u16::from_be_bytes([field[0], field[1]]);
        Some(f32::from(raw) / 100.0)
    }
}
