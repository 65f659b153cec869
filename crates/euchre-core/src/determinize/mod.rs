//! Resolves hidden hands into one concrete deal consistent with the public
//! history of a [`GameState`].
//!
//! - `solver`: backtracking all-different search used once voids constrain
//!   which cards a seat may hold.

mod solver;

pub use solver::{AllDifferentProblem, Assignment, SolveStats};

use crate::game::state::{GameState, HAND_SIZE};
use crate::model::card::Card;
use crate::model::deck::Deck;
use crate::model::hand::Hand;
use crate::model::player::PlayerPosition;
use crate::model::suit_mask::SuitMask;
use rand::Rng;
use rand::seq::SliceRandom;
use std::array;
use thiserror::Error;
use tracing::{debug, trace};

/// Samples complete deals from partially observed states.
#[derive(Debug, Default)]
pub struct Determinizer;

impl Determinizer {
    /// Returns a copy of `state` in which every hidden hand holds concrete
    /// cards. Visible hands and the public history are unchanged.
    ///
    /// Hidden seats receive only cards that are unaccounted for and whose
    /// effective suit is not among the seat's recorded voids. Each call
    /// draws fresh randomness from `rng`.
    pub fn determine<R: Rng + ?Sized>(
        state: &GameState,
        rng: &mut R,
    ) -> Result<GameState, DeterminizeError> {
        let targets: [usize; 4] = array::from_fn(|index| {
            PlayerPosition::from_index(index).map_or(0, |seat| state.expected_hand_size(seat))
        });

        for seat in PlayerPosition::LOOP {
            let hand = state.hand(seat);
            if !hand.is_empty() && hand.len() != targets[seat.index()] {
                return Err(DeterminizeError::HandSize {
                    seat,
                    expected: targets[seat.index()],
                    found: hand.len(),
                });
            }
        }

        let hidden: Vec<PlayerPosition> = PlayerPosition::LOOP
            .into_iter()
            .filter(|seat| state.is_hidden(*seat))
            .collect();
        if hidden.is_empty() {
            return Ok(state.clone());
        }

        let mut pool = unaccounted_cards(state);
        pool.shuffle(rng);

        let needed: usize = hidden.iter().map(|seat| targets[seat.index()]).sum();
        if needed > pool.len() {
            return Err(DeterminizeError::PoolExhausted {
                needed,
                available: pool.len(),
            });
        }

        let voids_known = hidden.iter().any(|seat| !state.voids(*seat).is_empty());
        let hands = if state.remaining_hand_size() == HAND_SIZE && !voids_known {
            debug!(hidden = hidden.len(), pool = pool.len(), "dealing hidden hands");
            deal_chunks(state, &hidden, &targets, &pool)
        } else {
            solve_constrained(state, &targets, pool)?
        };

        Ok(state.with_hands(hands))
    }
}

/// Deck minus every card whose location is known.
pub fn unaccounted_cards(state: &GameState) -> Vec<Card> {
    let accounted = state
        .accounted_cards()
        .fold(0u32, |mask, card| mask | 1 << card.to_id());
    Deck::standard()
        .cards()
        .iter()
        .copied()
        .filter(|card| accounted & (1 << card.to_id()) == 0)
        .collect()
}

fn deal_chunks(
    state: &GameState,
    hidden: &[PlayerPosition],
    targets: &[usize; 4],
    pool: &[Card],
) -> [Hand; 4] {
    let mut hands = state.hands().clone();
    let mut offset = 0;
    for seat in hidden {
        let take = targets[seat.index()];
        hands[seat.index()] = Hand::with_cards(pool[offset..offset + take].to_vec());
        offset += take;
    }
    hands
}

fn solve_constrained(
    state: &GameState,
    targets: &[usize; 4],
    pool: Vec<Card>,
) -> Result<[Hand; 4], DeterminizeError> {
    let trump = state.trump();
    let mut problem = AllDifferentProblem::new(pool);
    for seat in PlayerPosition::LOOP {
        let hand = state.hand(seat);
        let voids = state.voids(seat);
        for slot in 0..targets[seat.index()] {
            match hand.cards().get(slot) {
                Some(&card) => problem.pin(seat, slot, card),
                None => problem.add_free(seat, slot, |card| {
                    !voids.contains(card.effective_suit(trump))
                }),
            }
        }
    }

    let (solution, stats) = problem.solve();
    trace!(
        variables = problem.variable_count(),
        nodes = stats.nodes,
        backtracks = stats.backtracks,
        "constraint search finished"
    );
    let Some(mut assignments) = solution else {
        debug!(voids = ?state.voids_by_player(), "no deal satisfies recorded voids");
        return Err(DeterminizeError::Infeasible {
            voids: *state.voids_by_player(),
        });
    };

    assignments.sort_by_key(|a| (a.seat.index(), a.slot));
    let mut hands: [Hand; 4] = array::from_fn(|_| Hand::new());
    for assignment in assignments {
        hands[assignment.seat.index()].add(assignment.card);
    }
    Ok(hands)
}

/// Reasons a state cannot be determinized. All of them point at
/// inconsistent bookkeeping upstream rather than bad luck; retrying with a
/// different seed does not help.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeterminizeError {
    #[error("{seat} holds {found} cards but should hold {expected}")]
    HandSize {
        seat: PlayerPosition,
        expected: usize,
        found: usize,
    },
    #[error("hidden hands need {needed} cards but only {available} are unaccounted for")]
    PoolExhausted { needed: usize, available: usize },
    #[error("no deal satisfies the recorded voids {voids:?}")]
    Infeasible { voids: [SuitMask; 4] },
}
