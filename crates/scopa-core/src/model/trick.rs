use crate::model::card::Card;
use serde::Serialize;
use std::fmt;

/// A completed capture, or the terminal sweep of leftover table cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Trick {
    played: Option<Card>,
    picked_up: Vec<Card>,
    scopa: bool,
}

impl Trick {
    pub fn capture(played: Card, picked_up: Vec<Card>, scopa: bool) -> Self {
        Self {
            played: Some(played),
            picked_up,
            scopa,
        }
    }

    /// Never a scopa.
    pub fn sweep(leftover: Vec<Card>) -> Self {
        Self {
            played: None,
            picked_up: leftover,
            scopa: false,
        }
    }

    pub fn played(&self) -> Option<Card> {
        self.played
    }

    pub fn picked_up(&self) -> &[Card] {
        &self.picked_up
    }

    pub fn is_scopa(&self) -> bool {
        self.scopa
    }

    pub fn is_sweep(&self) -> bool {
        self.played.is_none()
    }

    /// Every card the trick puts in its owner's pile.
    pub fn cards(&self) -> impl Iterator<Item = Card> + '_ {
        self.played.into_iter().chain(self.picked_up.iter().copied())
    }

    pub fn card_count(&self) -> usize {
        usize::from(self.played.is_some()) + self.picked_up.len()
    }
}

impl fmt::Display for Trick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        match self.played {
            Some(card) => write!(f, "{card}")?,
            None => f.write_str("sweep")?,
        }
        for card in &self.picked_up {
            write!(f, ", {card}")?;
        }
        write!(f, ", {})", u8::from(self.scopa))
    }
}
