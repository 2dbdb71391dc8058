use crate::types::Id;
use std::time::{SystemTime, UNIX_EPOCH};

const COUNTER_MASK: u32 = 0x00FF_FFFF;

///
/// IdGenerator
///
/// Produces distinct identifiers for one process. The discriminator
/// separates generators; the 24-bit counter separates ids minted within
/// the same second and wraps silently.
///

#[derive(Clone, Debug)]
pub struct IdGenerator {
    discriminator: [u8; 5],
    counter: u32,
}

impl IdGenerator {
    #[must_use]
    pub const fn new(discriminator: [u8; 5], counter_seed: u32) -> Self {
        Self {
            discriminator,
            counter: counter_seed & COUNTER_MASK,
        }
    }

    /// Generate an id stamped with the current wall-clock second.
    /// Clocks before the epoch stamp zero; clocks past 2106 saturate.
    pub fn generate(&mut self) -> Id {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| {
                u32::try_from(elapsed.as_secs()).unwrap_or(u32::MAX)
            });

        self.generate_at(secs)
    }

    /// Generate an id stamped with an explicit timestamp.
    pub const fn generate_at(&mut self, timestamp_secs: u32) -> Id {
        let counter = self.counter;
        self.counter = counter.wrapping_add(1) & COUNTER_MASK;

        Id::from_parts(timestamp_secs, self.discriminator, counter)
    }
}
