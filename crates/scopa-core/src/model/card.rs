use crate::model::rank::Rank;
use crate::model::suit::Suit;
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub const SETTEBELLO: Card = Card::new(Rank::Sette, Suit::Denari);

    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }

    pub const fn from_value(value: u8, suit: Suit) -> Option<Self> {
        match Rank::from_value(value) {
            Some(rank) => Some(Self::new(rank, suit)),
            None => None,
        }
    }

    pub const fn value(self) -> u8 {
        self.rank.value()
    }

    pub const fn is_denari(self) -> bool {
        self.suit.is_denari()
    }

    pub const fn is_settebello(self) -> bool {
        matches!(self.rank, Rank::Sette) && self.suit.is_denari()
    }

    pub const fn primiera_points(self) -> u8 {
        self.rank.primiera_points()
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank, self.suit)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CardParseError {
    #[error("invalid card token '{0}' (expected a value 1-10 followed by S, C, D or B)")]
    InvalidCardToken(String),
}

impl FromStr for Card {
    type Err = CardParseError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let invalid = || CardParseError::InvalidCardToken(token.to_string());

        let mut chars = token.chars();
        let suit = chars
            .next_back()
            .and_then(Suit::from_letter)
            .ok_or_else(invalid)?;

        let digits = chars.as_str();
        if digits.is_empty() || digits.starts_with('0') || !digits.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let value: u8 = digits.parse().map_err(|_| invalid())?;
        Card::from_value(value, suit).ok_or_else(invalid)
    }
}

impl TryFrom<String> for Card {
    type Error = CardParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Card> for String {
    fn from(card: Card) -> Self {
        card.to_string()
    }
}

/// Parses a list such as `"1C, 1B 4D"`; commas and whitespace both separate tokens.
pub fn parse_cards(text: &str) -> Result<Vec<Card>, CardParseError> {
    text.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(str::parse)
        .collect()
}

/// Renders a card slice as `[8B, 1C, 1B]`.
#[derive(Debug, Clone, Copy)]
pub struct CardList<'a>(pub &'a [Card]);

impl fmt::Display for CardList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (index, card) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{card}")?;
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use super::{Card, CardList, CardParseError, parse_cards};
    use crate::model::rank::Rank;
    use crate::model::suit::Suit;

    #[test]
    fn parses_compact_tokens() {
        assert_eq!("8S".parse::<Card>(), Ok(Card::new(Rank::Fante, Suit::Spade)));
        assert_eq!("10D".parse::<Card>(), Ok(Card::new(Rank::Re, Suit::Denari)));
        assert_eq!("1B".parse::<Card>(), Ok(Card::new(Rank::Asso, Suit::Bastoni)));
    }

    #[test]
    fn display_inverts_parsing() {
        for suit in Suit::ALL {
            for rank in Rank::ORDERED {
                let card = Card::new(rank, suit);
                assert_eq!(card.to_string().parse::<Card>(), Ok(card));
            }
        }
    }

    #[test]
    fn rejects_out_of_domain_tokens() {
        for token in ["", "D", "0D", "11C", "7d", "7H", "07S", "+7S", "seven", "7 S", "10"] {
            assert_eq!(
                token.parse::<Card>(),
                Err(CardParseError::InvalidCardToken(token.to_string())),
                "{token:?} should be rejected"
            );
        }
    }

    #[test]
    fn settebello_is_seven_of_denari() {
        assert!(Card::SETTEBELLO.is_settebello());
        assert!(Card::SETTEBELLO.is_denari());
        assert!(!Card::new(Rank::Sette, Suit::Coppe).is_settebello());
    }

    #[test]
    fn parse_cards_accepts_commas_and_spaces() {
        let cards = parse_cards("1C, 1B 4D").unwrap();
        assert_eq!(CardList(&cards).to_string(), "[1C, 1B, 4D]");
        assert!(parse_cards("").unwrap().is_empty());
        assert!(parse_cards("1C, XX").is_err());
    }

    #[test]
    fn serde_uses_compact_notation() {
        let json = serde_json::to_string(&Card::SETTEBELLO).unwrap();
        assert_eq!(json, "\"7D\"");
        let back: Card = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Card::SETTEBELLO);
        assert!(serde_json::from_str::<Card>("\"12D\"").is_err());
    }
}
