use core::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Suit {
    Spade = 0,
    Coppe = 1,
    Denari = 2,
    Bastoni = 3,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Spade, Suit::Coppe, Suit::Denari, Suit::Bastoni];

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Suit::Spade),
            1 => Some(Suit::Coppe),
            2 => Some(Suit::Denari),
            3 => Some(Suit::Bastoni),
            _ => None,
        }
    }

    /// Case-sensitive: only the upper-case initials are accepted.
    pub const fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'S' => Some(Suit::Spade),
            'C' => Some(Suit::Coppe),
            'D' => Some(Suit::Denari),
            'B' => Some(Suit::Bastoni),
            _ => None,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn letter(self) -> char {
        match self {
            Suit::Spade => 'S',
            Suit::Coppe => 'C',
            Suit::Denari => 'D',
            Suit::Bastoni => 'B',
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Suit::Spade => "Spade",
            Suit::Coppe => "Coppe",
            Suit::Denari => "Denari",
            Suit::Bastoni => "Bastoni",
        }
    }

    pub const fn is_denari(self) -> bool {
        matches!(self, Suit::Denari)
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}
