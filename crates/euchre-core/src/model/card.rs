use crate::model::rank::Rank;
use crate::model::suit::Suit;
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }

    /// Jack of the trump suit.
    pub fn is_right_bower(self, trump: Suit) -> bool {
        self.rank == Rank::Jack && self.suit == trump
    }

    /// Jack of the suit sharing trump's colour.
    pub fn is_left_bower(self, trump: Suit) -> bool {
        self.rank == Rank::Jack && self.suit == trump.same_color()
    }

    /// Suit the card counts as once trump is fixed.
    pub fn effective_suit(self, trump: Suit) -> Suit {
        if self.is_left_bower(trump) {
            trump
        } else {
            self.suit
        }
    }

    /// Dense index in `0..24`, suit-major. Card sets are `u32` masks over it.
    pub const fn to_id(self) -> u8 {
        (self.suit as u8) * 6 + (self.rank as u8 - Rank::Nine as u8)
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank, self.suit)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseCardError {
    #[error("card token {0:?} must be exactly two characters")]
    Length(String),
    #[error("unknown rank {rank:?} in card token {token:?}")]
    Rank { token: String, rank: char },
    #[error("unknown suit {suit:?} in card token {token:?}")]
    Suit { token: String, suit: char },
}

impl FromStr for Card {
    type Err = ParseCardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let (Some(rank_char), Some(suit_char), None) = (chars.next(), chars.next(), chars.next())
        else {
            return Err(ParseCardError::Length(s.to_string()));
        };
        let rank = Rank::from_char(rank_char).ok_or_else(|| ParseCardError::Rank {
            token: s.to_string(),
            rank: rank_char,
        })?;
        let suit = Suit::from_char(suit_char).ok_or_else(|| ParseCardError::Suit {
            token: s.to_string(),
            suit: suit_char,
        })?;
        Ok(Card::new(rank, suit))
    }
}

impl Serialize for Card {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Card {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        token.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::{Card, ParseCardError, Rank, Suit};
    use crate::model::deck::Deck;

    #[test]
    fn left_bower_counts_as_trump() {
        let jd = Card::new(Rank::Jack, Suit::Diamonds);
        assert!(jd.is_left_bower(Suit::Hearts));
        assert!(!jd.is_right_bower(Suit::Hearts));
        assert_eq!(jd.effective_suit(Suit::Hearts), Suit::Hearts);
        assert_eq!(jd.effective_suit(Suit::Diamonds), Suit::Diamonds);
        assert_eq!(jd.effective_suit(Suit::Spades), Suit::Diamonds);
    }

    #[test]
    fn non_jacks_keep_printed_suit() {
        let qd = Card::new(Rank::Queen, Suit::Diamonds);
        assert_eq!(qd.effective_suit(Suit::Hearts), Suit::Diamonds);
    }

    #[test]
    fn parses_two_character_tokens() {
        assert_eq!("0d".parse::<Card>(), Ok(Card::new(Rank::Ten, Suit::Diamonds)));
        assert_eq!("JH".parse::<Card>(), Ok(Card::new(Rank::Jack, Suit::Hearts)));
        assert_eq!(Card::new(Rank::Ace, Suit::Spades).to_string(), "as");
    }

    #[test]
    fn malformed_tokens_fail() {
        assert!(matches!("j".parse::<Card>(), Err(ParseCardError::Length(_))));
        assert!(matches!("jhh".parse::<Card>(), Err(ParseCardError::Length(_))));
        assert!(matches!(
            "2h".parse::<Card>(),
            Err(ParseCardError::Rank { rank: '2', .. })
        ));
        assert!(matches!(
            "9x".parse::<Card>(),
            Err(ParseCardError::Suit { suit: 'x', .. })
        ));
    }

    #[test]
    fn ids_are_dense_over_the_deck() {
        let mut mask = 0u32;
        for card in Deck::standard().cards() {
            assert!(card.to_id() < 24);
            mask |= 1 << card.to_id();
        }
        assert_eq!(mask, (1 << 24) - 1);
        assert_eq!(Card::new(Rank::Nine, Suit::Clubs).to_id(), 0);
        assert_eq!(Card::new(Rank::Ace, Suit::Hearts).to_id(), 23);
    }

    #[test]
    fn serde_uses_token_form() {
        let card = Card::new(Rank::King, Suit::Clubs);
        let json = serde_json::to_string(&card).unwrap();
        assert_eq!(json, "\"kc\"");
        let back: Card = serde_json::from_str(&json).unwrap();
        assert_eq!(back, card);
        assert!(serde_json::from_str::<Card>("\"zz\"").is_err());
    }
}
