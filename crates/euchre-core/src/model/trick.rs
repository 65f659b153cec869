//! Trick resolution and follow-suit rules under a fixed trump.

use crate::model::card::Card;
use crate::model::hand::Hand;
use crate::model::suit::Suit;

/// Suit `card` belongs to once `trump` is fixed (left bower moves to trump).
pub fn effective_suit(trump: Suit, card: Card) -> Suit {
    card.effective_suit(trump)
}

/// Ordering key for trick resolution; larger wins.
fn trick_strength(trump: Suit, lead_suit: Suit, card: Card) -> (bool, bool, bool, bool, u8) {
    let suit = card.effective_suit(trump);
    (
        card.is_right_bower(trump),
        card.is_left_bower(trump),
        suit == trump,
        suit == lead_suit,
        card.rank.value(),
    )
}

/// Highest card of a trick: right bower, left bower, other trump, then the
/// led suit by face value. Off-suit, non-trump cards never win unless every
/// card is off-suit.
pub fn winning_card(trump: Suit, lead_suit: Suit, cards: &[Card]) -> Option<Card> {
    cards
        .iter()
        .copied()
        .max_by_key(|&card| (trick_strength(trump, lead_suit, card), card.suit))
}

/// Cards `hand` may play. Must follow the led suit when able; a void hand
/// may throw anything.
pub fn legal_plays(trump: Suit, lead_suit: Option<Suit>, hand: &Hand) -> Vec<Card> {
    let Some(lead) = lead_suit else {
        return hand.cards().to_vec();
    };

    let must_play: Vec<Card> = hand
        .iter()
        .copied()
        .filter(|card| card.effective_suit(trump) == lead)
        .collect();
    if must_play.is_empty() {
        hand.cards().to_vec()
    } else {
        must_play
    }
}

pub fn can_follow(trump: Suit, lead_suit: Suit, hand: &Hand) -> bool {
    hand.iter()
        .any(|card| card.effective_suit(trump) == lead_suit)
}

#[cfg(test)]
mod tests {
    use super::{can_follow, effective_suit, legal_plays, winning_card};
    use crate::model::card::Card;
    use crate::model::deck::Deck;
    use crate::model::hand::Hand;
    use crate::model::rank::Rank;
    use crate::model::suit::Suit;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use rand::seq::SliceRandom;
    use std::collections::HashSet;

    fn cards(tokens: &[&str]) -> Vec<Card> {
        tokens.iter().map(|t| t.parse().unwrap()).collect()
    }

    #[test]
    fn right_bower_beats_ace_of_trump() {
        let played = cards(&["ks", "9s", "ah", "jh"]);
        assert_eq!(
            winning_card(Suit::Hearts, Suit::Spades, &played),
            Some("jh".parse().unwrap())
        );
    }

    #[test]
    fn trump_jack_wins_on_off_suit_lead() {
        let played = cards(&["kd", "qd", "jh", "9h"]);
        assert_eq!(
            winning_card(Suit::Hearts, Suit::Diamonds, &played),
            Some("jh".parse().unwrap())
        );
    }

    #[test]
    fn left_bower_beats_ace_of_trump_and_own_suit() {
        let played = cards(&["ad", "ah", "jd", "kh"]);
        assert_eq!(
            winning_card(Suit::Hearts, Suit::Diamonds, &played),
            Some("jd".parse().unwrap())
        );
    }

    #[test]
    fn off_suit_cards_cannot_win_without_trump() {
        let played = cards(&["9c", "ac", "as", "0c"]);
        assert_eq!(
            winning_card(Suit::Hearts, Suit::Clubs, &played),
            Some("ac".parse().unwrap())
        );
        let played = cards(&["9c", "ad", "as", "0c"]);
        assert_eq!(
            winning_card(Suit::Hearts, Suit::Clubs, &played),
            Some("0c".parse().unwrap())
        );
    }

    /// All 24 orderings of a four-card trick.
    fn orderings(trick: [Card; 4]) -> Vec<[Card; 4]> {
        let mut out = Vec::with_capacity(24);
        for a in 0..4 {
            for b in (0..4).filter(|&b| b != a) {
                for c in (0..4).filter(|&c| c != a && c != b) {
                    let d = 6 - a - b - c;
                    out.push([trick[a], trick[b], trick[c], trick[d]]);
                }
            }
        }
        out
    }

    #[test]
    fn winner_is_independent_of_order() {
        let deck = Deck::standard();
        let mut rng = SmallRng::seed_from_u64(0x5eed);
        for trump in Suit::ALL {
            for lead in Suit::ALL {
                for _ in 0..200 {
                    let drawn: Vec<Card> =
                        deck.cards().choose_multiple(&mut rng, 4).copied().collect();
                    let trick = [drawn[0], drawn[1], drawn[2], drawn[3]];
                    let expected = winning_card(trump, lead, &trick).unwrap();
                    assert!(trick.contains(&expected));
                    for order in orderings(trick) {
                        assert_eq!(winning_card(trump, lead, &order), Some(expected));
                    }
                }
            }
        }
    }

    #[test]
    fn orderings_are_distinct() {
        let trick: [Card; 4] = cards(&["9c", "0c", "jc", "qc"]).try_into().unwrap();
        let all = orderings(trick);
        let unique: HashSet<[Card; 4]> = all.iter().copied().collect();
        assert_eq!(unique.len(), 24);
    }

    #[test]
    fn trump_jack_always_wins() {
        let deck = Deck::standard();
        for trump in Suit::ALL {
            let jack = Card::new(Rank::Jack, trump);
            let others: Vec<Card> = deck.cards().iter().copied().filter(|&c| c != jack).collect();
            for lead in Suit::ALL {
                for i in 0..others.len() {
                    for j in i + 1..others.len() {
                        for k in j + 1..others.len() {
                            let trick = [others[i], others[j], others[k], jack];
                            assert_eq!(winning_card(trump, lead, &trick), Some(jack));
                            let jack_first = [jack, others[k], others[i], others[j]];
                            assert_eq!(winning_card(trump, lead, &jack_first), Some(jack));
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn left_bower_beats_everything_but_the_right() {
        let deck = Deck::standard();
        for trump in Suit::ALL {
            let right = Card::new(Rank::Jack, trump);
            let left = Card::new(Rank::Jack, trump.same_color());
            for lead in Suit::ALL {
                for &other in deck.cards() {
                    if other == left {
                        continue;
                    }
                    let expected = if other == right { right } else { left };
                    assert_eq!(winning_card(trump, lead, &[other, left]), Some(expected));
                    assert_eq!(winning_card(trump, lead, &[left, other]), Some(expected));
                }
            }
        }
    }

    #[test]
    fn empty_trick_has_no_winner() {
        assert_eq!(winning_card(Suit::Hearts, Suit::Hearts, &[]), None);
    }

    #[test]
    fn must_follow_effective_suit() {
        let hand = Hand::with_cards(cards(&["jd", "ad", "9c", "kh"]));
        let legal = legal_plays(Suit::Hearts, Some(Suit::Hearts), &hand);
        assert_eq!(legal, cards(&["jd", "kh"]));
        let legal = legal_plays(Suit::Hearts, Some(Suit::Diamonds), &hand);
        assert_eq!(legal, cards(&["ad"]));
        assert!(can_follow(Suit::Hearts, Suit::Clubs, &hand));
    }

    #[test]
    fn void_hand_may_throw_anything() {
        let hand = Hand::with_cards(cards(&["jd", "ad", "kh"]));
        assert!(!can_follow(Suit::Hearts, Suit::Spades, &hand));
        let legal = legal_plays(Suit::Hearts, Some(Suit::Spades), &hand);
        assert_eq!(legal, hand.cards().to_vec());
    }

    #[test]
    fn leading_allows_whole_hand() {
        let hand = Hand::with_cards(cards(&["9d", "0d", "jd"]));
        assert_eq!(legal_plays(Suit::Spades, None, &hand), hand.cards().to_vec());
    }

    #[test]
    fn free_function_matches_card_method() {
        let jc: Card = "jc".parse().unwrap();
        assert_eq!(effective_suit(Suit::Spades, jc), Suit::Spades);
        assert_eq!(effective_suit(Suit::Hearts, jc), Suit::Clubs);
    }
}
