use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
#[repr(u8)]
pub enum Rank {
    Asso = 1,
    Due = 2,
    Tre = 3,
    Quattro = 4,
    Cinque = 5,
    Sei = 6,
    Sette = 7,
    Fante = 8,
    Cavallo = 9,
    Re = 10,
}

impl Rank {
    pub const ORDERED: [Rank; 10] = [
        Rank::Asso,
        Rank::Due,
        Rank::Tre,
        Rank::Quattro,
        Rank::Cinque,
        Rank::Sei,
        Rank::Sette,
        Rank::Fante,
        Rank::Cavallo,
        Rank::Re,
    ];

    pub const fn from_value(value: u8) -> Option<Self> {
        match value {
            1 => Some(Rank::Asso),
            2 => Some(Rank::Due),
            3 => Some(Rank::Tre),
            4 => Some(Rank::Quattro),
            5 => Some(Rank::Cinque),
            6 => Some(Rank::Sei),
            7 => Some(Rank::Sette),
            8 => Some(Rank::Fante),
            9 => Some(Rank::Cavallo),
            10 => Some(Rank::Re),
            _ => None,
        }
    }

    /// Capture value, 1 through 10.
    pub const fn value(self) -> u8 {
        self as u8
    }

    /// Points this rank is worth when it is the best card of its suit in the primiera.
    pub const fn primiera_points(self) -> u8 {
        match self {
            Rank::Sette => 21,
            Rank::Sei => 18,
            Rank::Asso => 16,
            Rank::Cinque => 15,
            Rank::Quattro => 14,
            Rank::Tre => 13,
            Rank::Due => 12,
            Rank::Fante | Rank::Cavallo | Rank::Re => 10,
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}
