//! The narrow interface an external tree search uses to drive a game.

use crate::determinize::Determinizer;
use crate::game::error::EuchreError;
use crate::game::state::GameState;
use crate::model::card::Card;
use crate::model::player::Team;
use crate::model::suit::Suit;
use rand::Rng;

/// Game abstraction consumed by search. States are values: implementations
/// return new states and never modify one in place, so a search may keep
/// any number of them alive at once.
pub trait Game {
    type State: Clone;
    type Move: Copy + Eq;
    type Player: Copy + Eq;
    type Setup;
    type Error: std::error::Error + Send + Sync + 'static;

    fn initial_state<R: Rng + ?Sized>(
        setup: Self::Setup,
        rng: &mut R,
    ) -> Result<Self::State, Self::Error>;

    fn apply_move(state: &Self::State, mv: Self::Move) -> Result<Self::State, Self::Error>;

    /// Returns `(is_chance_node, moves)`.
    fn get_moves(state: &Self::State) -> (bool, Vec<Self::Move>);

    fn get_winner(state: &Self::State) -> Option<Self::Player>;

    fn current_player(state: &Self::State) -> Self::Player;

    /// Samples a fully observed state from a partially observed one. Callers
    /// running rollouts in parallel must each call this for themselves.
    fn determine<R: Rng + ?Sized>(
        state: &Self::State,
        rng: &mut R,
    ) -> Result<Self::State, Self::Error>;
}

/// Optional inputs for a new hand; anything left out is drawn at random.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EuchreSetup {
    pub visible_hand: Option<Vec<Card>>,
    pub trump: Option<Suit>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Euchre;

impl Game for Euchre {
    type State = GameState;
    type Move = Card;
    type Player = Team;
    type Setup = EuchreSetup;
    type Error = EuchreError;

    fn initial_state<R: Rng + ?Sized>(
        setup: EuchreSetup,
        rng: &mut R,
    ) -> Result<GameState, EuchreError> {
        Ok(GameState::initial_state(
            setup.visible_hand.as_deref(),
            setup.trump,
            rng,
        )?)
    }

    fn apply_move(state: &GameState, mv: Card) -> Result<GameState, EuchreError> {
        Ok(state.apply_move(mv)?)
    }

    fn get_moves(state: &GameState) -> (bool, Vec<Card>) {
        state.get_moves()
    }

    fn get_winner(state: &GameState) -> Option<Team> {
        state.winner()
    }

    fn current_player(state: &GameState) -> Team {
        state.current_player_team()
    }

    fn determine<R: Rng + ?Sized>(
        state: &GameState,
        rng: &mut R,
    ) -> Result<GameState, EuchreError> {
        Ok(Determinizer::determine(state, rng)?)
    }
}
