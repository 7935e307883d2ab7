use spoke_traits::{AdvertisementSource, Clock};
use tracing::{debug, warn};

use super::{SamplingTask, Shutdown};
use crate::advert::WeightExtractor;
use crate::config::ScaleCfg;
use crate::error::SpokeError;
use crate::event::{Event, SourceId};
use crate::queue::EventSender;

/// Pulls advertisement payloads one scan window at a time and forwards
/// every weight the extractor recognises.
pub struct ScaleTask<A, K> {
    source: SourceId,
    scanner: A,
    clock: K,
    cfg: ScaleCfg,
    extractor: WeightExtractor,
}

impl<A, K> ScaleTask<A, K>
where
    A: AdvertisementSource,
    K: Clock,
{
    pub fn new(source: SourceId, scanner: A, clock: K, cfg: ScaleCfg) -> Self {
        Self {
            source,
            scanner,
            clock,
            extractor: WeightExtractor::new(cfg.manufacturer_id, cfg.weight_offset),
            cfg,
        }
    }

    /// Run one scan window and return the weight events found in it.
    pub fn scan(&mut self) -> Vec<Event> {
        let payloads = match self.scanner.scan(self.cfg.scan_window) {
            Ok(p) => p,
            Err(e) => {
                warn!(source_id = self.source, error = %e, "advertisement scan failed");
                return Vec::new();
            }
        };
        let seen = payloads.len();
        let events: Vec<Event> = payloads
            .iter()
            .filter_map(|p| self.extractor.extract(p))
            .map(|kg| Event::weight(self.source, kg))
            .collect();
        debug!(source_id = self.source, seen, matched = events.len(), "scan window done");
        events
    }
}

impl<A, K> SamplingTask for ScaleTask<A, K>
where
    A: AdvertisementSource + Send,
    K: Clock + Send,
{
    fn source(&self) -> SourceId {
        self.source
    }

    fn kind(&self) -> &'static str {
        "scale"
    }

    fn poll_once(&mut self, tx: &EventSender, shutdown: &Shutdown) -> Result<(), SpokeError> {
        for ev in self.scan() {
            tx.push(ev)?;
        }
        shutdown.pause(&self.clock, self.cfg.rest);
        Ok(())
    }
}
