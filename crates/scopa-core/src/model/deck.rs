use crate::model::card::Card;
use crate::model::rank::Rank;
use crate::model::suit::Suit;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::collections::HashSet;
use thiserror::Error;

pub const DECK_SIZE: usize = 40;

const fn fixed(value: u8, suit: usize) -> Card {
    match (Rank::from_value(value), Suit::from_index(suit)) {
        (Some(rank), Some(suit)) => Card::new(rank, suit),
        _ => panic!("fixed deck entry out of range"),
    }
}

/// Reproducible ordering; the last card is dealt first.
const FIXED_ORDER: [Card; DECK_SIZE] = [
    fixed(4, 1),
    fixed(5, 2),
    fixed(5, 1),
    fixed(8, 1),
    fixed(4, 3),
    fixed(1, 2),
    fixed(3, 0),
    fixed(6, 1),
    fixed(9, 1),
    fixed(7, 2),
    fixed(7, 1),
    fixed(6, 2),
    fixed(10, 1),
    fixed(10, 3),
    fixed(9, 2),
    fixed(2, 1),
    fixed(2, 2),
    fixed(10, 2),
    fixed(10, 0),
    fixed(1, 0),
    fixed(3, 1),
    fixed(4, 0),
    fixed(5, 0),
    fixed(2, 0),
    fixed(2, 3),
    fixed(7, 3),
    fixed(8, 0),
    fixed(5, 3),
    fixed(6, 3),
    fixed(3, 3),
    fixed(8, 2),
    fixed(9, 3),
    fixed(7, 0),
    fixed(4, 2),
    fixed(6, 0),
    fixed(3, 2),
    fixed(9, 0),
    fixed(1, 3),
    fixed(1, 1),
    fixed(8, 3),
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeckError {
    #[error("cannot deal {requested} cards from a deck holding {remaining}")]
    EmptyDeck { requested: usize, remaining: usize },
    #[error("a full deck needs {expected} cards but {found} were supplied")]
    Incomplete { expected: usize, found: usize },
    #[error("card {0} appears more than once")]
    Duplicate(Card),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    pub fn standard() -> Self {
        let mut cards = Vec::with_capacity(DECK_SIZE);
        for suit in Suit::ALL.iter().copied() {
            for rank in Rank::ORDERED.iter().copied() {
                cards.push(Card::new(rank, suit));
            }
        }
        Self { cards }
    }

    pub fn shuffled<R: rand::Rng + ?Sized>(rng: &mut R) -> Self {
        let mut deck = Self::standard();
        deck.cards.shuffle(rng);
        deck
    }

    pub fn shuffled_with_seed(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::shuffled(&mut rng)
    }

    pub fn fixed() -> Self {
        Self {
            cards: FIXED_ORDER.to_vec(),
        }
    }

    /// Accepts any ordering of the 40 distinct cards.
    pub fn from_cards(cards: Vec<Card>) -> Result<Self, DeckError> {
        if cards.len() != DECK_SIZE {
            return Err(DeckError::Incomplete {
                expected: DECK_SIZE,
                found: cards.len(),
            });
        }
        Self::partial(cards)
    }

    /// A deck that has already been partly dealt; only distinctness is checked.
    pub fn partial(cards: Vec<Card>) -> Result<Self, DeckError> {
        let mut seen = HashSet::with_capacity(cards.len());
        if let Some(card) = cards.iter().find(|card| !seen.insert(**card)) {
            return Err(DeckError::Duplicate(*card));
        }
        Ok(Self { cards })
    }

    /// Removes `count` cards from the end of the deck, in the order they come off.
    pub fn deal(&mut self, count: usize) -> Result<Vec<Card>, DeckError> {
        if count > self.cards.len() {
            return Err(DeckError::EmptyDeck {
                requested: count,
                remaining: self.cards.len(),
            });
        }
        let split = self.cards.len() - count;
        let mut dealt = self.cards.split_off(split);
        dealt.reverse();
        Ok(dealt)
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{DECK_SIZE, Deck, DeckError};
    use crate::model::card::Card;
    use std::collections::HashSet;

    #[test]
    fn standard_deck_has_40_unique_cards() {
        let deck = Deck::standard();
        let unique: HashSet<_> = deck.cards().iter().copied().collect();
        assert_eq!(deck.len(), DECK_SIZE);
        assert_eq!(unique.len(), DECK_SIZE);
    }

    #[test]
    fn fixed_deck_is_a_permutation() {
        let deck = Deck::fixed();
        assert!(Deck::from_cards(deck.cards().to_vec()).is_ok());
        assert_eq!(deck.cards()[0].to_string(), "4C");
        assert_eq!(deck.cards()[DECK_SIZE - 1].to_string(), "8B");
    }

    #[test]
    fn shuffle_with_seed_is_deterministic() {
        let deck_a = Deck::shuffled_with_seed(42);
        let deck_b = Deck::shuffled_with_seed(42);
        assert_eq!(deck_a.cards(), deck_b.cards());
        assert_ne!(deck_a.cards(), Deck::shuffled_with_seed(43).cards());
    }

    #[test]
    fn deal_pops_from_the_end() {
        let mut deck = Deck::fixed();
        let table: Vec<String> = deck.deal(4).unwrap().iter().map(Card::to_string).collect();
        assert_eq!(table, vec!["8B", "1C", "1B", "9S"]);
        assert_eq!(deck.len(), DECK_SIZE - 4);
    }

    #[test]
    fn overdealing_fails_without_mutation() {
        let mut deck = Deck::fixed();
        deck.deal(38).unwrap();
        assert_eq!(
            deck.deal(3),
            Err(DeckError::EmptyDeck {
                requested: 3,
                remaining: 2
            })
        );
        assert_eq!(deck.len(), 2);
        assert_eq!(deck.deal(2).unwrap().len(), 2);
        assert!(deck.is_empty());
    }

    #[test]
    fn from_cards_rejects_short_and_duplicate_decks() {
        let mut cards = Deck::standard().cards().to_vec();
        cards.pop();
        assert!(matches!(
            Deck::from_cards(cards.clone()),
            Err(DeckError::Incomplete { found: 39, .. })
        ));
        cards.push(cards[0]);
        assert_eq!(Deck::from_cards(cards), Err(DeckError::Duplicate(Deck::standard().cards()[0])));
    }
}
