use crate::model::card::Card;
use crate::model::player::PlayerId;
use crate::model::suit::Suit;
use crate::model::trick::Trick;
use serde::Serialize;

/// More than this many cards (half the deck) wins the card-count point.
pub const CARD_MAJORITY: u32 = 20;
/// More than this many denari (half the suit) wins the denari point.
pub const DENARI_MAJORITY: u32 = 5;

/// Raw counts gathered from one player's trick pile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PlayerTally {
    pub scopa_count: u32,
    pub card_count: u32,
    pub denari_count: u32,
    pub settebello: u32,
    pub primiera_score: u32,
    /// Best primiera card per suit, indexed by `Suit::index`.
    pub primiera_cards: [Option<Card>; 4],
}

impl PlayerTally {
    pub fn from_tricks<'a>(tricks: impl IntoIterator<Item = &'a Trick>) -> Self {
        let mut tally = PlayerTally::default();

        for trick in tricks {
            tally.scopa_count += u32::from(trick.is_scopa());
            for card in trick.cards() {
                tally.card_count += 1;
                if card.is_denari() {
                    tally.denari_count += 1;
                }
                if card.is_settebello() {
                    tally.settebello = 1;
                }
                let best = &mut tally.primiera_cards[card.suit.index()];
                // Equal points (8, 9, 10) resolve to the higher rank so the pick
                // does not depend on trick order.
                let better = match best {
                    Some(current) => {
                        (card.primiera_points(), card.value())
                            > (current.primiera_points(), current.value())
                    }
                    None => true,
                };
                if better {
                    *best = Some(card);
                }
            }
        }

        tally.primiera_score = tally
            .primiera_cards
            .iter()
            .flatten()
            .map(|card| u32::from(card.primiera_points()))
            .sum();
        tally
    }

    pub fn primiera_card(&self, suit: Suit) -> Option<Card> {
        self.primiera_cards[suit.index()]
    }
}

/// Match points earned in each category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PointBreakdown {
    pub scopa: u32,
    pub cards: u32,
    pub denari: u32,
    pub settebello: u32,
    pub primiera: u32,
}

impl PointBreakdown {
    pub fn total(&self) -> u32 {
        self.scopa + self.cards + self.denari + self.settebello + self.primiera
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreBoard {
    tallies: [PlayerTally; 2],
    breakdown: [PointBreakdown; 2],
}

impl ScoreBoard {
    pub fn from_tallies(tallies: [PlayerTally; 2]) -> Self {
        let [one, two] = tallies;
        let mut breakdown = [PointBreakdown::default(); 2];

        for player in PlayerId::LOOP {
            let tally = &tallies[player.index()];
            let points = &mut breakdown[player.index()];
            points.scopa = tally.scopa_count;
            points.cards = u32::from(tally.card_count > CARD_MAJORITY);
            points.denari = u32::from(tally.denari_count > DENARI_MAJORITY);
            points.settebello = tally.settebello;
        }

        match one.primiera_score.cmp(&two.primiera_score) {
            std::cmp::Ordering::Greater => breakdown[PlayerId::One.index()].primiera = 1,
            std::cmp::Ordering::Less => breakdown[PlayerId::Two.index()].primiera = 1,
            std::cmp::Ordering::Equal => {}
        }

        Self {
            tallies,
            breakdown,
        }
    }

    pub fn score(&self, player: PlayerId) -> u32 {
        self.breakdown[player.index()].total()
    }

    pub fn standings(&self) -> [u32; 2] {
        [self.score(PlayerId::One), self.score(PlayerId::Two)]
    }

    pub fn breakdown(&self, player: PlayerId) -> &PointBreakdown {
        &self.breakdown[player.index()]
    }

    pub fn tally(&self, player: PlayerId) -> &PlayerTally {
        &self.tallies[player.index()]
    }

    /// `None` when the match is drawn.
    pub fn leader(&self) -> Option<PlayerId> {
        let [one, two] = self.standings();
        match one.cmp(&two) {
            std::cmp::Ordering::Greater => Some(PlayerId::One),
            std::cmp::Ordering::Less => Some(PlayerId::Two),
            std::cmp::Ordering::Equal => None,
        }
    }
}
