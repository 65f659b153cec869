use std::time::Duration;

use euchre_core::model::player::PlayerPosition;
use serde::Serialize;

/// Per-seat counters accumulated over one or more hands.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeatStats {
    decisions: u32,
    determinizations: u32,
    failures: u32,
    total: Duration,
    slowest: Duration,
}

impl SeatStats {
    pub fn record_decision(&mut self) {
        self.decisions += 1;
    }

    pub fn record_sample(&mut self, elapsed: Duration) {
        self.determinizations += 1;
        self.total += elapsed;
        self.slowest = self.slowest.max(elapsed);
    }

    pub fn record_failure(&mut self) {
        self.failures += 1;
    }

    pub fn absorb(&mut self, other: &SeatStats) {
        self.decisions += other.decisions;
        self.determinizations += other.determinizations;
        self.failures += other.failures;
        self.total += other.total;
        self.slowest = self.slowest.max(other.slowest);
    }

    pub fn decisions(&self) -> u32 {
        self.decisions
    }

    pub fn determinizations(&self) -> u32 {
        self.determinizations
    }

    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Mean wall time of a successful determinization, in milliseconds.
    pub fn avg_ms(&self) -> f64 {
        if self.determinizations == 0 {
            0.0
        } else {
            self.total.as_secs_f64() * 1000.0 / f64::from(self.determinizations)
        }
    }

    pub fn max_ms(&self) -> f64 {
        self.slowest.as_secs_f64() * 1000.0
    }

    pub fn summarize(&self, seat: PlayerPosition) -> SeatSummary {
        SeatSummary {
            seat,
            decisions: self.decisions,
            determinizations: self.determinizations,
            failures: self.failures,
            avg_ms_per_determinization: self.avg_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SeatSummary {
    pub seat: PlayerPosition,
    pub decisions: u32,
    pub determinizations: u32,
    pub failures: u32,
    pub avg_ms_per_determinization: f64,
}
