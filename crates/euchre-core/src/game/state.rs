use crate::game::error::{MoveError, SetupError};
use crate::model::card::Card;
use crate::model::deck::Deck;
use crate::model::hand::Hand;
use crate::model::player::{PlayerPosition, Team};
use crate::model::suit::Suit;
use crate::model::suit_mask::SuitMask;
use crate::model::trick::{legal_plays, winning_card};
use rand::Rng;
use serde::Serialize;
use std::array;
use std::collections::HashSet;
use tracing::{debug, trace};

/// Cards dealt to each seat, and therefore tricks in a hand.
pub const HAND_SIZE: usize = 5;

/// Immutable snapshot of one hand of play.
///
/// Every transition returns a fresh value; nothing here is mutated after
/// construction. An empty hand for a seat that still has cards to play is a
/// hidden hand, filled in by [`crate::determinize::Determinizer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameState {
    hands: [Hand; 4],
    cards_played_by_player: [Option<Card>; 4],
    current_player: PlayerPosition,
    lead_card: Option<Card>,
    trump: Suit,
    winning_team: Option<Team>,
    tricks_won_by_team: [u8; 2],
    cards_played: Vec<Card>,
    voids_by_player: [SuitMask; 4],
}

impl GameState {
    /// Opens a hand with North's five cards visible and every other seat
    /// hidden. Missing inputs are drawn from `rng`.
    pub fn initial_state<R: Rng + ?Sized>(
        visible_hand: Option<&[Card]>,
        trump: Option<Suit>,
        rng: &mut R,
    ) -> Result<Self, SetupError> {
        let visible: Vec<Card> = match visible_hand {
            Some(cards) => cards.to_vec(),
            None => Deck::shuffled(rng).cards()[..HAND_SIZE].to_vec(),
        };
        if visible.len() != HAND_SIZE {
            return Err(SetupError::HandSize {
                found: visible.len(),
            });
        }
        let mut seen = HashSet::with_capacity(HAND_SIZE);
        for card in &visible {
            if !seen.insert(*card) {
                return Err(SetupError::DuplicateCard(*card));
            }
        }

        let trump = match trump {
            Some(suit) => suit,
            None => Suit::ALL[rng.gen_range(0..Suit::ALL.len())],
        };

        let mut hands: [Hand; 4] = array::from_fn(|_| Hand::new());
        hands[PlayerPosition::North.index()] = Hand::with_cards(visible);

        Ok(Self {
            hands,
            cards_played_by_player: [None; 4],
            current_player: PlayerPosition::North,
            lead_card: None,
            trump,
            winning_team: None,
            tricks_won_by_team: [0, 0],
            cards_played: Vec::with_capacity(HAND_SIZE * 4),
            voids_by_player: [SuitMask::EMPTY; 4],
        })
    }

    /// Same as [`GameState::initial_state`] but from text tokens such as
    /// `"0d"` and `"h"`.
    pub fn from_tokens<R: Rng + ?Sized>(
        visible_hand: Option<&[&str]>,
        trump: Option<&str>,
        rng: &mut R,
    ) -> Result<Self, SetupError> {
        let visible = visible_hand
            .map(|tokens| {
                tokens
                    .iter()
                    .map(|token| token.parse::<Card>())
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?;
        let trump = trump.map(str::parse::<Suit>).transpose()?;
        Self::initial_state(visible.as_deref(), trump, rng)
    }

    /// Plays `card` for the seat to act and returns the resulting state.
    pub fn apply_move(&self, card: Card) -> Result<GameState, MoveError> {
        if let Some(winner) = self.winning_team {
            return Err(MoveError::GameOver { winner });
        }

        let seat = self.current_player;
        let played_suit = card.effective_suit(self.trump);
        if self.voids_by_player[seat.index()].contains(played_suit) {
            return Err(MoveError::VoidSuit {
                seat,
                card,
                suit: played_suit,
            });
        }

        let lead_suit = self.lead_suit();
        let hand = &self.hands[seat.index()];
        if self.is_hidden(seat) {
            if self.accounted_cards().any(|known| known == card) {
                return Err(MoveError::CardUnavailable { card });
            }
        } else {
            if !hand.contains(card) {
                return Err(MoveError::CardNotInHand { seat, card });
            }
            if let Some(lead) = lead_suit {
                if !legal_plays(self.trump, Some(lead), hand).contains(&card) {
                    return Err(MoveError::MustFollowSuit { seat, card, lead });
                }
            }
        }

        let mut next = self.clone();
        next.cards_played_by_player[seat.index()] = Some(card);
        next.hands[seat.index()].remove(card);
        let lead = match lead_suit {
            Some(lead) => lead,
            None => {
                next.lead_card = Some(card);
                played_suit
            }
        };

        if played_suit != lead {
            next.voids_by_player[seat.index()] = next.voids_by_player[seat.index()].with(lead);
            trace!(%seat, %lead, %card, "void inferred");
        }

        next.current_player = seat.next();

        if let Some(trick) = complete_trick(&next.cards_played_by_player) {
            next.resolve_trick(trick, lead);
        }

        if next.tricks_completed() == HAND_SIZE {
            let [north_south, east_west] = next.tricks_won_by_team;
            let winner = if north_south > east_west {
                Team::NorthSouth
            } else {
                Team::EastWest
            };
            debug!(%winner, north_south, east_west, "hand complete");
            next.winning_team = Some(winner);
        }

        Ok(next)
    }

    fn resolve_trick(&mut self, trick: [Card; 4], lead: Suit) {
        let winner = self.trick_winner().unwrap_or(self.current_player);
        let team = winner.team();
        self.tricks_won_by_team[team.index()] += 1;
        self.cards_played.extend_from_slice(&trick);
        self.cards_played_by_player = [None; 4];
        self.lead_card = None;
        self.current_player = winner;
        debug!(
            %winner,
            %team,
            %lead,
            trump = %self.trump,
            tricks = self.tricks_completed(),
            "trick resolved"
        );
    }

    /// Legal plays for the seat to act. The flag is always `false`: play is
    /// a decision node, never a chance node. A hidden seat has no moves until
    /// the state is determinized.
    pub fn get_moves(&self) -> (bool, Vec<Card>) {
        if self.is_terminal() {
            return (false, Vec::new());
        }
        let hand = &self.hands[self.current_player.index()];
        (false, legal_plays(self.trump, self.lead_suit(), hand))
    }

    /// Seat currently taking the trick on the table; `None` before a lead.
    pub fn trick_winner(&self) -> Option<PlayerPosition> {
        let lead = self.lead_suit()?;
        let on_table: Vec<Card> = self
            .cards_played_by_player
            .iter()
            .flatten()
            .copied()
            .collect();
        let best = winning_card(self.trump, lead, &on_table)?;
        self.cards_played_by_player
            .iter()
            .position(|&played| played == Some(best))
            .and_then(PlayerPosition::from_index)
    }

    pub fn winner(&self) -> Option<Team> {
        self.winning_team
    }

    pub fn current_player_team(&self) -> Team {
        self.current_player.team()
    }

    pub fn is_terminal(&self) -> bool {
        self.winning_team.is_some()
    }

    /// Information set of `seat`: the same public history with every other
    /// hand hidden.
    pub fn observed_by(&self, seat: PlayerPosition) -> GameState {
        let mut view = self.clone();
        for other in PlayerPosition::LOOP {
            if other != seat {
                view.hands[other.index()] = Hand::new();
            }
        }
        view
    }

    pub fn hand(&self, seat: PlayerPosition) -> &Hand {
        &self.hands[seat.index()]
    }

    pub fn hands(&self) -> &[Hand; 4] {
        &self.hands
    }

    pub fn cards_played_by_player(&self) -> &[Option<Card>; 4] {
        &self.cards_played_by_player
    }

    pub fn current_player(&self) -> PlayerPosition {
        self.current_player
    }

    pub fn lead_card(&self) -> Option<Card> {
        self.lead_card
    }

    pub fn lead_suit(&self) -> Option<Suit> {
        self.lead_card.map(|card| card.effective_suit(self.trump))
    }

    pub fn trump(&self) -> Suit {
        self.trump
    }

    pub fn tricks_won_by_team(&self) -> [u8; 2] {
        self.tricks_won_by_team
    }

    pub fn tricks_won(&self, team: Team) -> u8 {
        self.tricks_won_by_team[team.index()]
    }

    pub fn tricks_completed(&self) -> usize {
        self.tricks_won_by_team.iter().map(|&t| t as usize).sum()
    }

    pub fn cards_played(&self) -> &[Card] {
        &self.cards_played
    }

    pub fn voids(&self, seat: PlayerPosition) -> SuitMask {
        self.voids_by_player[seat.index()]
    }

    pub fn voids_by_player(&self) -> &[SuitMask; 4] {
        &self.voids_by_player
    }

    /// Cards each seat held at the start of the current trick.
    pub fn remaining_hand_size(&self) -> usize {
        HAND_SIZE - self.tricks_completed()
    }

    /// Cards `seat` should be holding right now.
    pub fn expected_hand_size(&self, seat: PlayerPosition) -> usize {
        let played = usize::from(self.cards_played_by_player[seat.index()].is_some());
        self.remaining_hand_size().saturating_sub(played)
    }

    /// A hand is hidden when it is empty but the seat still has cards to play.
    pub fn is_hidden(&self, seat: PlayerPosition) -> bool {
        self.hands[seat.index()].is_empty() && self.expected_hand_size(seat) > 0
    }

    /// Every card whose location is known: visible hands, completed tricks,
    /// and the trick on the table.
    pub fn accounted_cards(&self) -> impl Iterator<Item = Card> + '_ {
        self.hands
            .iter()
            .flat_map(|hand| hand.iter().copied())
            .chain(self.cards_played.iter().copied())
            .chain(self.cards_played_by_player.iter().flatten().copied())
    }

    /// Copy of this state with `hands` replaced; public history is kept.
    pub(crate) fn with_hands(&self, hands: [Hand; 4]) -> GameState {
        GameState {
            hands,
            ..self.clone()
        }
    }
}

fn complete_trick(plays: &[Option<Card>; 4]) -> Option<[Card; 4]> {
    match plays {
        [Some(a), Some(b), Some(c), Some(d)] => Some([*a, *b, *c, *d]),
        _ => None,
    }
}
