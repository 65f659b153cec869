use crate::determinize::DeterminizeError;
use crate::model::card::{Card, ParseCardError};
use crate::model::player::{PlayerPosition, Team};
use crate::model::suit::{ParseSuitError, Suit};
use thiserror::Error;

/// Rejections raised while building the opening state of a hand.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetupError {
    #[error("visible hand must hold exactly 5 cards but has {found}")]
    HandSize { found: usize },
    #[error("card {0} appears more than once in the visible hand")]
    DuplicateCard(Card),
    #[error(transparent)]
    Card(#[from] ParseCardError),
    #[error(transparent)]
    Trump(#[from] ParseSuitError),
}

/// Rejected plays. The state the move was attempted on is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("hand is over; {winner} already won")]
    GameOver { winner: Team },
    #[error("{seat} is known to be void in {suit} and cannot play {card}")]
    VoidSuit {
        seat: PlayerPosition,
        card: Card,
        suit: Suit,
    },
    #[error("{seat} must follow {lead} and cannot play {card}")]
    MustFollowSuit {
        seat: PlayerPosition,
        card: Card,
        lead: Suit,
    },
    #[error("{seat} does not hold {card}")]
    CardNotInHand { seat: PlayerPosition, card: Card },
    #[error("{card} is already held or played elsewhere")]
    CardUnavailable { card: Card },
}

/// Umbrella error for callers driving the engine through [`crate::game::Game`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EuchreError {
    #[error("invalid setup: {0}")]
    Setup(#[from] SetupError),
    #[error("illegal move: {0}")]
    Move(#[from] MoveError),
    #[error("determinization failed: {0}")]
    Determinize(#[from] DeterminizeError),
}
