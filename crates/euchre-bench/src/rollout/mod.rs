mod stats;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use euchre_core::game::{Euchre, EuchreError, EuchreSetup, Game};
use euchre_core::model::card::Card;
use euchre_core::model::player::{PlayerPosition, Team};
use euchre_core::model::suit::Suit;
use rand::seq::SliceRandom;
use rand::{Rng, RngCore, SeedableRng, rngs::StdRng};
use serde::Serialize;
use thiserror::Error;
use tracing::{Level, debug, event, warn};

use crate::analytics::{AnalyticsCollector, AnalyticsError};
use crate::config::{BenchmarkConfig, ResolvedOutputs};

pub use stats::{SeatStats, SeatSummary};

/// Plays seeded hands and measures how the determinizer behaves at every
/// decision point along the way.
pub struct RolloutRunner {
    config: BenchmarkConfig,
    outputs: ResolvedOutputs,
    logging_enabled: bool,
}

/// Summary details returned after a run.
pub struct RunSummary {
    pub hands_played: usize,
    pub rows_written: usize,
    pub team_wins: [usize; 2],
    pub determinizations: u64,
    pub failures: u64,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
}

/// Result of one hand played to completion.
pub struct HandOutcome {
    pub trump: Suit,
    pub winner: Team,
    pub tricks_won_by_team: [u8; 2],
    pub plays: Vec<Card>,
    pub seats: [SeatStats; 4],
}

impl RolloutRunner {
    pub fn new(config: BenchmarkConfig, outputs: ResolvedOutputs) -> Result<Self, RunnerError> {
        if outputs.jsonl == outputs.summary_md {
            return Err(RunnerError::OutputCollision {
                path: outputs.jsonl,
            });
        }

        Ok(Self {
            logging_enabled: config.logging.enable_structured,
            config,
            outputs,
        })
    }

    /// Execute the run, streaming one JSONL row per hand to disk.
    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        ensure_parent(self.outputs.jsonl.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;

        let mut writer = BufWriter::new(File::create(&self.outputs.jsonl)?);
        let mut rng = StdRng::seed_from_u64(self.config.deals.seed.unwrap_or(0));
        let mut analytics = AnalyticsCollector::new(&self.config);
        let mut rows_written = 0usize;

        for hand_index in 0..self.config.deals.hands {
            let deal_seed = rng.next_u64();
            let outcome = self.play_hand(hand_index, deal_seed)?;
            analytics.record_hand(&outcome);
            write_hand_row(&mut writer, &self.config, hand_index, deal_seed, &outcome)?;
            rows_written += 1;
        }

        writer.flush()?;

        let summary = analytics.finalize();
        summary.write_markdown(&self.outputs.summary_md)?;

        Ok(RunSummary {
            hands_played: summary.hands,
            rows_written,
            team_wins: summary.team_wins,
            determinizations: summary.determinizations,
            failures: summary.failures,
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
        })
    }

    /// Plays a single hand from a fresh seed through the [`Game`] contract.
    /// The first determinization of North's opening view becomes the true
    /// deal; every later sample is drawn from what the acting seat can see.
    pub fn play_hand(&self, hand_index: usize, deal_seed: u64) -> Result<HandOutcome, RunnerError> {
        let mut rng = StdRng::seed_from_u64(deal_seed);
        let opening = Euchre::initial_state(EuchreSetup::default(), &mut rng)?;
        let mut truth = Euchre::determine(&opening, &mut rng)?;
        let mut seats: [SeatStats; 4] = Default::default();
        let samples = self.config.rollouts.determinizations_per_decision;

        while Euchre::get_winner(&truth).is_none() {
            let seat = truth.current_player();
            let stats = &mut seats[seat.index()];
            stats.record_decision();

            if self.config.rollouts.observes(seat) {
                let view = truth.observed_by(seat);
                for _ in 0..samples {
                    let start = Instant::now();
                    match Euchre::determine(&view, &mut rng) {
                        Ok(_) => stats.record_sample(start.elapsed()),
                        Err(err) => {
                            stats.record_failure();
                            warn!(
                                target: "euchre_bench::rollout",
                                hand_index,
                                seat = %seat,
                                error = %err,
                                "determinization failed"
                            );
                        }
                    }
                }
            }

            let (_, moves) = Euchre::get_moves(&truth);
            let card = random_move(&moves, &mut rng)
                .ok_or(RunnerError::NoLegalMove { hand_index, seat })?;
            let log_play = self.logging_enabled
                && tracing::enabled!(target: "euchre_bench::play", Level::INFO);
            if log_play {
                event!(
                    target: "euchre_bench::play",
                    Level::INFO,
                    run_id = %self.config.run_id,
                    hand_index = hand_index as u32,
                    seat = %seat,
                    card = %card,
                    legal = moves.len() as u32,
                    trick = truth.tricks_completed() as u32,
                );
            }
            truth = Euchre::apply_move(&truth, card)?;
        }

        let winner = Euchre::get_winner(&truth).ok_or(RunnerError::Unfinished { hand_index })?;
        debug!(
            target: "euchre_bench::rollout",
            hand_index,
            winner = %winner,
            "hand complete"
        );

        Ok(HandOutcome {
            trump: truth.trump(),
            winner,
            tricks_won_by_team: truth.tricks_won_by_team(),
            plays: truth.cards_played().to_vec(),
            seats,
        })
    }
}

/// Uniform choice among the legal moves; the harness never evaluates
/// positions.
fn random_move<R: Rng + ?Sized>(moves: &[Card], rng: &mut R) -> Option<Card> {
    moves.choose(rng).copied()
}

fn ensure_parent(path: Option<&Path>) -> Result<(), RunnerError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

fn write_hand_row(
    writer: &mut BufWriter<File>,
    config: &BenchmarkConfig,
    hand_index: usize,
    deal_seed: u64,
    outcome: &HandOutcome,
) -> Result<(), RunnerError> {
    let seats = PlayerPosition::LOOP
        .iter()
        .map(|&seat| outcome.seats[seat.index()].summarize(seat))
        .collect();
    let row = HandLogRow {
        run_id: config.run_id.clone(),
        hand_id: format!("H{hand_index:05}"),
        hand_index,
        deal_seed,
        trump: outcome.trump,
        winner: outcome.winner,
        tricks_won_by_team: outcome.tricks_won_by_team,
        plays: outcome.plays.clone(),
        seats,
    };

    serde_json::to_writer(&mut *writer, &row)?;
    writer.write_all(b"\n")?;
    Ok(())
}

#[derive(Serialize)]
struct HandLogRow {
    run_id: String,
    hand_id: String,
    hand_index: usize,
    deal_seed: u64,
    trump: Suit,
    winner: Team,
    tricks_won_by_team: [u8; 2],
    plays: Vec<Card>,
    seats: Vec<SeatSummary>,
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failed to serialize log row: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
    #[error("engine error: {0}")]
    Engine(#[from] EuchreError),
    #[error("hand {hand_index}: {seat} has no legal move")]
    NoLegalMove {
        hand_index: usize,
        seat: PlayerPosition,
    },
    #[error("hand {hand_index} ended without a winner")]
    Unfinished { hand_index: usize },
    #[error("jsonl and summary outputs both resolve to {path:?}")]
    OutputCollision { path: PathBuf },
    #[error("analytics error: {0}")]
    Analytics(#[from] AnalyticsError),
}
