//! Registry telemetry: slot allocation counters.
//!
//! The counters live on the registry itself (one set per VM instance) so
//! tests can prove that a sequence of handle operations leaks no slots.

use serde::Serialize;

/// Running counters maintained by the registry.
#[derive(Debug, Default, Clone)]
pub struct RegistryCounters {
    registered: u64,
    released: u64,
    high_water: u64,
}

impl RegistryCounters {
    pub fn record_register(&mut self) {
        self.registered += 1;
        self.high_water = self.high_water.max(self.live());
    }

    pub fn record_release(&mut self) {
        self.released += 1;
    }

    /// Slots currently registered and not yet released.
    pub fn live(&self) -> u64 {
        self.registered - self.released
    }

    pub fn snapshot(&self) -> RegistryStats {
        RegistryStats {
            registered: self.registered,
            released: self.released,
            live: self.live(),
            high_water: self.high_water,
        }
    }
}

/// Point-in-time view of the registry counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RegistryStats {
    pub registered: u64,
    pub released: u64,
    pub live: u64,
    pub high_water: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_track_live_and_high_water() {
        let mut counters = RegistryCounters::default();
        counters.record_register();
        counters.record_register();
        counters.record_release();
        counters.record_register();

        let stats = counters.snapshot();
        assert_eq!(stats.registered, 3);
        assert_eq!(stats.released, 1);
        assert_eq!(stats.live, 2);
        assert_eq!(stats.high_water, 2);
    }
}
