use std::fs;
use std::path::Path;

use euchre_core::model::player::{PlayerPosition, Team};
use euchre_core::model::suit::Suit;
use serde::Serialize;
use thiserror::Error;

use crate::config::BenchmarkConfig;
use crate::rollout::{HandOutcome, SeatStats};

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Folds hand outcomes into run-level totals.
pub struct AnalyticsCollector {
    run_id: String,
    determinizations_per_decision: usize,
    hands: usize,
    team_wins: [usize; 2],
    tricks: [u64; 2],
    trump_counts: [usize; 4],
    seats: [SeatStats; 4],
}

impl AnalyticsCollector {
    pub fn new(config: &BenchmarkConfig) -> Self {
        Self {
            run_id: config.run_id.clone(),
            determinizations_per_decision: config.rollouts.determinizations_per_decision,
            hands: 0,
            team_wins: [0; 2],
            tricks: [0; 2],
            trump_counts: [0; 4],
            seats: Default::default(),
        }
    }

    pub fn record_hand(&mut self, outcome: &HandOutcome) {
        self.hands += 1;
        self.team_wins[outcome.winner.index()] += 1;
        for team in Team::BOTH {
            self.tricks[team.index()] += u64::from(outcome.tricks_won_by_team[team.index()]);
        }
        self.trump_counts[outcome.trump as usize] += 1;
        for (total, hand) in self.seats.iter_mut().zip(outcome.seats.iter()) {
            total.absorb(hand);
        }
    }

    pub fn finalize(self) -> AnalyticsSummary {
        let seats = PlayerPosition::LOOP
            .iter()
            .map(|&seat| {
                let stats = &self.seats[seat.index()];
                SeatReport {
                    seat,
                    decisions: stats.decisions(),
                    determinizations: stats.determinizations(),
                    failures: stats.failures(),
                    avg_ms: stats.avg_ms(),
                    max_ms: stats.max_ms(),
                }
            })
            .collect::<Vec<_>>();

        let determinizations = seats.iter().map(|s| u64::from(s.determinizations)).sum();
        let failures = seats.iter().map(|s| u64::from(s.failures)).sum();

        AnalyticsSummary {
            run_id: self.run_id,
            determinizations_per_decision: self.determinizations_per_decision,
            hands: self.hands,
            team_wins: self.team_wins,
            tricks: self.tricks,
            trump_counts: self.trump_counts,
            determinizations,
            failures,
            seats,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SeatReport {
    pub seat: PlayerPosition,
    pub decisions: u32,
    pub determinizations: u32,
    pub failures: u32,
    pub avg_ms: f64,
    pub max_ms: f64,
}

#[derive(Debug, Serialize)]
pub struct AnalyticsSummary {
    pub run_id: String,
    pub determinizations_per_decision: usize,
    pub hands: usize,
    pub team_wins: [usize; 2],
    pub tricks: [u64; 2],
    pub trump_counts: [usize; 4],
    pub determinizations: u64,
    pub failures: u64,
    pub seats: Vec<SeatReport>,
}

impl AnalyticsSummary {
    pub fn win_rate(&self, team: Team) -> f64 {
        if self.hands == 0 {
            0.0
        } else {
            self.team_wins[team.index()] as f64 / self.hands as f64
        }
    }

    pub fn render_markdown(&self) -> String {
        let mut rows = String::new();
        rows.push_str(&format!("# Rollout Summary: {}\n\n", self.run_id));
        rows.push_str(&format!(
            "{} hands, {} determinizations per decision, {} samples, {} failures\n\n",
            self.hands, self.determinizations_per_decision, self.determinizations, self.failures
        ));

        rows.push_str("| Team | Hands won | Win % | Tricks |\n");
        rows.push_str("|------|-----------|-------|--------|\n");
        for team in Team::BOTH {
            rows.push_str(&format!(
                "| {team} | {wins} | {rate:.1}% | {tricks} |\n",
                wins = self.team_wins[team.index()],
                rate = self.win_rate(team) * 100.0,
                tricks = self.tricks[team.index()],
            ));
        }

        rows.push_str("\n| Seat | Decisions | Determinizations | Failures | Avg ms | Max ms |\n");
        rows.push_str("|------|-----------|------------------|----------|--------|--------|\n");
        for seat in &self.seats {
            rows.push_str(&format!(
                "| {} | {} | {} | {} | {:.3} | {:.3} |\n",
                seat.seat,
                seat.decisions,
                seat.determinizations,
                seat.failures,
                seat.avg_ms,
                seat.max_ms
            ));
        }

        rows.push_str("\n| Trump | Hands |\n");
        rows.push_str("|-------|-------|\n");
        for suit in Suit::ALL {
            rows.push_str(&format!(
                "| {} | {} |\n",
                suit.symbol(),
                self.trump_counts[suit as usize]
            ));
        }
        rows
    }

    pub fn write_markdown(&self, path: impl AsRef<Path>) -> Result<(), AnalyticsError> {
        fs::write(path.as_ref(), self.render_markdown()).map_err(|e| AnalyticsError::Io {
            context: "writing summary markdown",
            source: e,
        })?;
        Ok(())
    }
}
