use crate::model::card::{Card, CardList};
use crate::model::deck::{DECK_SIZE, Deck, DeckError};
use crate::model::hand::{HAND_SIZE, Hand};
use crate::model::player::PlayerId;
use crate::model::score::{PlayerTally, ScoreBoard};
use crate::model::trick::Trick;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Cards dealt face up to the table at the start of a match.
pub const TABLE_DEAL: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DealError {
    #[error(transparent)]
    Deck(#[from] DeckError),
    #[error("the table has already been dealt")]
    TableAlreadyDealt,
    #[error("{0} still holds cards; hands are only dealt when both are empty")]
    HandsNotEmpty(PlayerId),
}

/// Where every card of the deck currently sits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Census {
    pub missing: Vec<Card>,
    pub duplicated: Vec<Card>,
}

impl Census {
    pub fn is_conserved(&self) -> bool {
        self.missing.is_empty() && self.duplicated.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct MatchState {
    pub(crate) deck: Deck,
    pub(crate) tabletop: Vec<Card>,
    pub(crate) hands: [Hand; 2],
    pub(crate) tricks: [Vec<Trick>; 2],
    pub(crate) last_capturer: Option<PlayerId>,
    pub(crate) turns_played: u32,
    seed: Option<u64>,
}

impl MatchState {
    pub fn new() -> Self {
        let seed: u64 = rand::random();
        Self::with_seed(seed)
    }

    pub fn with_seed(seed: u64) -> Self {
        let mut state = Self::with_deck(Deck::shuffled_with_seed(seed));
        state.seed = Some(seed);
        state
    }

    /// Nothing is dealt yet; see [`MatchState::deal_opening`].
    pub fn with_deck(deck: Deck) -> Self {
        Self {
            deck,
            tabletop: Vec::with_capacity(TABLE_DEAL + 2 * HAND_SIZE),
            hands: [Hand::new(), Hand::new()],
            tricks: [Vec::new(), Vec::new()],
            last_capturer: None,
            turns_played: 0,
            seed: None,
        }
    }

    /// Builds a mid-match position. The parts are taken as given.
    pub fn from_parts(deck: Deck, tabletop: Vec<Card>, hands: [Vec<Card>; 2]) -> Self {
        let [one, two] = hands;
        let mut state = Self::with_deck(deck);
        state.tabletop = tabletop;
        state.hands = [Hand::with_cards(one), Hand::with_cards(two)];
        state
    }

    pub fn with_tricks(mut self, tricks: [Vec<Trick>; 2], last_capturer: Option<PlayerId>) -> Self {
        self.tricks = tricks;
        self.last_capturer = last_capturer;
        self
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn deck_remaining(&self) -> usize {
        self.deck.len()
    }

    pub fn tabletop(&self) -> &[Card] {
        &self.tabletop
    }

    pub fn hand(&self, player: PlayerId) -> &Hand {
        &self.hands[player.index()]
    }

    pub fn tricks(&self, player: PlayerId) -> &[Trick] {
        &self.tricks[player.index()]
    }

    pub fn last_capturer(&self) -> Option<PlayerId> {
        self.last_capturer
    }

    /// Cards played so far, placements and captures alike.
    pub fn turns_played(&self) -> u32 {
        self.turns_played
    }

    pub fn hands_empty(&self) -> bool {
        self.hands.iter().all(Hand::is_empty)
    }

    pub fn needs_deal(&self) -> bool {
        self.hands_empty() && !self.deck.is_empty()
    }

    pub fn is_finished(&self) -> bool {
        self.hands_empty() && self.deck.is_empty()
    }

    pub fn deal_table(&mut self) -> Result<(), DealError> {
        if self.turns_played > 0 || !self.tabletop.is_empty() {
            return Err(DealError::TableAlreadyDealt);
        }
        let cards = self.deck.deal(TABLE_DEAL)?;
        self.tabletop.extend(cards);
        Ok(())
    }

    /// Gives each player three cards, Player 1 first.
    pub fn deal_hands(&mut self) -> Result<(), DealError> {
        if let Some(player) = PlayerId::LOOP
            .into_iter()
            .find(|player| !self.hand(*player).is_empty())
        {
            return Err(DealError::HandsNotEmpty(player));
        }
        if self.deck.len() < 2 * HAND_SIZE {
            return Err(DeckError::EmptyDeck {
                requested: 2 * HAND_SIZE,
                remaining: self.deck.len(),
            }
            .into());
        }
        for player in PlayerId::LOOP {
            let cards = self.deck.deal(HAND_SIZE)?;
            self.hands[player.index()].extend(cards);
        }
        Ok(())
    }

    pub fn deal_opening(&mut self) -> Result<(), DealError> {
        self.deal_table()?;
        self.deal_hands()
    }

    /// Credits the leftover table to the last capturer once the match is over.
    /// Returns the recipient, or `None` if there was nothing to sweep or nobody captured.
    pub fn sweep_tabletop(&mut self) -> Option<PlayerId> {
        if !self.is_finished() || self.tabletop.is_empty() {
            return None;
        }
        let recipient = self.last_capturer?;
        let leftover = std::mem::take(&mut self.tabletop);
        self.tricks[recipient.index()].push(Trick::sweep(leftover));
        Some(recipient)
    }

    pub fn tally_tricks(&self) -> [PlayerTally; 2] {
        PlayerId::LOOP.map(|player| PlayerTally::from_tricks(self.tricks(player)))
    }

    pub fn score_match(&self) -> ScoreBoard {
        ScoreBoard::from_tallies(self.tally_tricks())
    }

    /// Every card currently accounted for, wherever it sits.
    pub fn all_cards(&self) -> impl Iterator<Item = Card> + '_ {
        self.deck
            .cards()
            .iter()
            .copied()
            .chain(self.tabletop.iter().copied())
            .chain(self.hands.iter().flat_map(|hand| hand.iter().copied()))
            .chain(self.tricks.iter().flatten().flat_map(Trick::cards))
    }

    /// Compares the cards in play against a full deck.
    pub fn census(&self) -> Census {
        let mut counts: HashMap<Card, usize> = HashMap::with_capacity(DECK_SIZE);
        for card in self.all_cards() {
            *counts.entry(card).or_default() += 1;
        }

        let mut census = Census::default();
        for card in Deck::standard().cards().iter().copied() {
            match counts.get(&card).copied().unwrap_or(0) {
                0 => census.missing.push(card),
                1 => {}
                _ => census.duplicated.push(card),
            }
        }
        census
    }
}

impl Default for MatchState {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "tabletop: {}", CardList(&self.tabletop))?;
        for player in PlayerId::LOOP {
            write!(f, "{player}: hand {}, tricks [", CardList(self.hand(player).cards()))?;
            for (index, trick) in self.tricks(player).iter().enumerate() {
                if index > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{trick}")?;
            }
            writeln!(f, "]")?;
        }
        write!(f, "deck: {} cards", self.deck.len())
    }
}

#[cfg(test)]
mod tests {
    use super::{DealError, MatchState};
    use crate::model::card::{CardList, parse_cards};
    use crate::model::deck::{Deck, DeckError};
    use crate::model::player::PlayerId;
    use crate::model::trick::Trick;

    fn opened_fixed_match() -> MatchState {
        let mut state = MatchState::with_deck(Deck::fixed());
        state.deal_opening().unwrap();
        state
    }

    #[test]
    fn opening_deal_matches_fixed_deck() {
        let state = opened_fixed_match();
        assert_eq!(CardList(state.tabletop()).to_string(), "[8B, 1C, 1B, 9S]");
        assert_eq!(
            CardList(state.hand(PlayerId::One).cards()).to_string(),
            "[3D, 6S, 4D]"
        );
        assert_eq!(
            CardList(state.hand(PlayerId::Two).cards()).to_string(),
            "[7S, 9B, 8D]"
        );
        assert_eq!(state.deck_remaining(), 30);
        assert!(state.census().is_conserved());
    }

    #[test]
    fn table_is_dealt_once() {
        let mut state = opened_fixed_match();
        assert_eq!(state.deal_table(), Err(DealError::TableAlreadyDealt));
    }

    #[test]
    fn hands_are_dealt_only_when_both_are_empty() {
        let mut state = opened_fixed_match();
        assert_eq!(state.deal_hands(), Err(DealError::HandsNotEmpty(PlayerId::One)));
        assert_eq!(state.deck_remaining(), 30);
    }

    #[test]
    fn short_deck_reports_empty_deck_without_dealing() {
        let deck = Deck::partial(parse_cards("1S 2S 3S 4S").unwrap()).unwrap();
        let mut state = MatchState::from_parts(deck, Vec::new(), [Vec::new(), Vec::new()]);
        assert_eq!(
            state.deal_hands(),
            Err(DealError::Deck(DeckError::EmptyDeck {
                requested: 6,
                remaining: 4
            }))
        );
        assert!(state.hands_empty());
        assert_eq!(state.deck_remaining(), 4);
    }

    #[test]
    fn sweep_goes_to_last_capturer_when_finished() {
        let table = parse_cards("3D 7S").unwrap();
        let mut state = MatchState::from_parts(Deck::default(), table, [Vec::new(), Vec::new()])
            .with_tricks([Vec::new(), Vec::new()], Some(PlayerId::Two));

        assert_eq!(state.sweep_tabletop(), Some(PlayerId::Two));
        assert!(state.tabletop().is_empty());
        assert_eq!(state.tricks(PlayerId::Two), &[Trick::sweep(parse_cards("3D 7S").unwrap())]);
    }

    #[test]
    fn sweep_is_a_no_op_without_any_capture() {
        let table = parse_cards("3D 7S").unwrap();
        let mut state = MatchState::from_parts(Deck::default(), table, [Vec::new(), Vec::new()]);
        assert_eq!(state.sweep_tabletop(), None);
        assert_eq!(state.tabletop().len(), 2);
    }

    #[test]
    fn sweep_waits_for_the_end_of_the_match() {
        let mut state = opened_fixed_match();
        state.last_capturer = Some(PlayerId::One);
        assert_eq!(state.sweep_tabletop(), None);
        assert_eq!(state.tabletop().len(), 4);
    }

    #[test]
    fn census_flags_missing_and_duplicated_cards() {
        let mut state = opened_fixed_match();
        let lost = state.tabletop.pop().unwrap();
        state.tabletop.push(state.tabletop[0]);
        let census = state.census();
        assert_eq!(census.missing, vec![lost]);
        assert_eq!(census.duplicated, vec![state.tabletop[0]]);
    }

    #[test]
    fn seeded_matches_are_reproducible() {
        let a = MatchState::with_seed(7);
        let b = MatchState::with_seed(7);
        assert_eq!(a.deck(), b.deck());
        assert_eq!(a.seed(), Some(7));
    }

    #[test]
    fn display_lists_table_hands_and_deck() {
        let state = opened_fixed_match();
        let rendered = state.to_string();
        assert!(rendered.starts_with("tabletop: [8B, 1C, 1B, 9S]\n"));
        assert!(rendered.contains("Player 1: hand [3D, 6S, 4D], tricks []"));
        assert!(rendered.ends_with("deck: 30 cards"));
    }
}
