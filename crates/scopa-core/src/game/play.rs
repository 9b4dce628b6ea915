use crate::game::match_state::MatchState;
use crate::game::moves::Move;
use crate::model::card::Card;
use crate::model::player::PlayerId;
use crate::model::trick::Trick;
use thiserror::Error;

/// Why a play was refused. The state is never touched when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlayError {
    #[error("{card} is not in {player}'s hand")]
    NotInHand { player: PlayerId, card: Card },
    #[error("{card} is not on the table")]
    NotOnTable { card: Card },
    #[error("captured cards add up to {captured} but {card} is worth {}", card.value())]
    SumMismatch { card: Card, captured: u32 },
    #[error("{card} must take {matching} alone")]
    AmbiguousCapture { card: Card, matching: Card },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    Placed,
    Captured { cards: usize, scopa: bool },
}

impl MatchState {
    /// Checks a play without applying it. Rules are checked in a fixed order and the
    /// first one broken is reported.
    pub fn verify_play(
        &self,
        player: PlayerId,
        card: Card,
        capture: &[Card],
    ) -> Result<(), PlayError> {
        if !self.hand(player).contains(card) {
            return Err(PlayError::NotInHand { player, card });
        }

        // A card listed twice can only be taken once.
        for (index, taken) in capture.iter().enumerate() {
            if !self.tabletop.contains(taken) || capture[..index].contains(taken) {
                return Err(PlayError::NotOnTable { card: *taken });
            }
        }

        if capture.is_empty() {
            return Ok(());
        }

        let captured: u32 = capture.iter().map(|c| u32::from(c.value())).sum();
        if captured != u32::from(card.value()) {
            return Err(PlayError::SumMismatch { card, captured });
        }

        if capture.len() > 1
            && let Some(matching) = self
                .tabletop
                .iter()
                .copied()
                .find(|on_table| on_table.value() == card.value())
        {
            return Err(PlayError::AmbiguousCapture { card, matching });
        }

        Ok(())
    }

    /// Plays `card` from `player`'s hand. An empty `capture` places the card on the table;
    /// otherwise the listed table cards are taken into a new trick.
    pub fn play_card(
        &mut self,
        player: PlayerId,
        card: Card,
        capture: &[Card],
    ) -> Result<PlayOutcome, PlayError> {
        self.verify_play(player, card, capture)?;

        let final_play = self.deck.is_empty()
            && self.hands.iter().map(|hand| hand.len()).sum::<usize>() == 1;

        self.hands[player.index()].remove(card);
        self.turns_played += 1;

        if capture.is_empty() {
            self.tabletop.push(card);
            return Ok(PlayOutcome::Placed);
        }

        self.tabletop.retain(|on_table| !capture.contains(on_table));
        // The last card of the match clears the table for free, so it never scores a scopa.
        let scopa = self.tabletop.is_empty() && !final_play;
        self.tricks[player.index()].push(Trick::capture(card, capture.to_vec(), scopa));
        self.last_capturer = Some(player);

        Ok(PlayOutcome::Captured {
            cards: capture.len() + 1,
            scopa,
        })
    }

    pub fn apply_move(&mut self, player: PlayerId, mv: &Move) -> Result<PlayOutcome, PlayError> {
        self.play_card(player, mv.card, &mv.capture)
    }
}

#[cfg(test)]
mod tests {
    use super::{PlayError, PlayOutcome};
    use crate::game::match_state::MatchState;
    use crate::model::card::{Card, CardList, parse_cards};
    use crate::model::deck::Deck;
    use crate::model::player::PlayerId;

    fn card(token: &str) -> Card {
        token.parse().unwrap()
    }

    fn cards(text: &str) -> Vec<Card> {
        parse_cards(text).unwrap()
    }

    fn opened_fixed_match() -> MatchState {
        let mut state = MatchState::with_deck(Deck::fixed());
        state.deal_opening().unwrap();
        state
    }

    #[test]
    fn card_to_play_must_be_in_hand() {
        let state = opened_fixed_match();
        assert_eq!(
            state.verify_play(PlayerId::One, card("6C"), &[]),
            Err(PlayError::NotInHand {
                player: PlayerId::One,
                card: card("6C")
            })
        );
        assert_eq!(state.verify_play(PlayerId::One, card("6S"), &[]), Ok(()));
        assert!(matches!(
            state.verify_play(PlayerId::Two, card("9S"), &cards("9S")),
            Err(PlayError::NotInHand { .. })
        ));
        assert_eq!(state.verify_play(PlayerId::Two, card("9B"), &cards("9S")), Ok(()));
    }

    #[test]
    fn captured_cards_must_be_on_the_table() {
        let state = opened_fixed_match();
        assert_eq!(
            state.verify_play(PlayerId::Two, card("8D"), &cards("8C")),
            Err(PlayError::NotOnTable { card: card("8C") })
        );
        assert_eq!(state.verify_play(PlayerId::Two, card("8D"), &cards("8B")), Ok(()));
    }

    #[test]
    fn the_same_table_card_cannot_be_taken_twice() {
        let state = MatchState::from_parts(Deck::default(), cards("1C 5S"), [cards("2D"), Vec::new()]);
        assert_eq!(
            state.verify_play(PlayerId::One, card("2D"), &cards("1C 1C")),
            Err(PlayError::NotOnTable { card: card("1C") })
        );
    }

    #[test]
    fn capture_must_add_up_to_the_played_value() {
        let mut state = opened_fixed_match();
        state.play_card(PlayerId::One, card("6S"), &[]).unwrap();
        assert_eq!(state.verify_play(PlayerId::Two, card("7S"), &cards("6S 1B")), Ok(()));
        assert_eq!(
            state.verify_play(PlayerId::Two, card("7S"), &cards("9S 1B")),
            Err(PlayError::SumMismatch {
                card: card("7S"),
                captured: 10
            })
        );
    }

    #[test]
    fn exact_single_match_blocks_multi_card_capture() {
        let mut state = opened_fixed_match();
        state.play_card(PlayerId::One, card("6S"), &[]).unwrap();
        assert_eq!(
            state.verify_play(PlayerId::Two, card("9B"), &cards("8B 1B")),
            Err(PlayError::AmbiguousCapture {
                card: card("9B"),
                matching: card("9S")
            })
        );
        assert_eq!(state.verify_play(PlayerId::Two, card("9B"), &cards("9S")), Ok(()));
    }

    #[test]
    fn rejected_play_leaves_state_untouched() {
        let mut state = opened_fixed_match();
        let before = state.to_string();
        assert!(state.play_card(PlayerId::Two, card("9B"), &cards("8B 1C")).is_err());
        assert_eq!(state.to_string(), before);
        assert_eq!(state.turns_played(), 0);
    }

    #[test]
    fn placement_and_capture_update_state() {
        let mut state = opened_fixed_match();

        assert_eq!(state.play_card(PlayerId::One, card("4D"), &[]), Ok(PlayOutcome::Placed));
        assert_eq!(CardList(state.tabletop()).to_string(), "[8B, 1C, 1B, 9S, 4D]");

        assert_eq!(
            state.play_card(PlayerId::Two, card("9B"), &cards("9S")),
            Ok(PlayOutcome::Captured {
                cards: 2,
                scopa: false
            })
        );
        assert_eq!(CardList(state.tabletop()).to_string(), "[8B, 1C, 1B, 4D]");
        assert_eq!(state.tricks(PlayerId::Two)[0].to_string(), "(9B, 9S, 0)");
        assert_eq!(state.last_capturer(), Some(PlayerId::Two));
        assert_eq!(state.turns_played(), 2);
    }

    #[test]
    fn clearing_the_table_scores_a_scopa() {
        let mut state = MatchState::from_parts(
            Deck::partial(cards("1S 2S 3S 4S 5S 6S")).unwrap(),
            cards("8B"),
            [cards("3D"), cards("8D 7S")],
        );
        let outcome = state.play_card(PlayerId::Two, card("8D"), &cards("8B")).unwrap();
        assert_eq!(outcome, PlayOutcome::Captured { cards: 2, scopa: true });
        assert!(state.tricks(PlayerId::Two)[0].is_scopa());
    }

    #[test]
    fn final_card_of_the_match_never_scores_a_scopa() {
        let mut state = MatchState::from_parts(Deck::default(), cards("2C 3B"), [Vec::new(), cards("5D")]);
        let outcome = state.play_card(PlayerId::Two, card("5D"), &cards("2C 3B")).unwrap();
        assert_eq!(outcome, PlayOutcome::Captured { cards: 3, scopa: false });
        assert!(state.tabletop().is_empty());
        assert!(state.is_finished());
    }

    #[test]
    fn clearing_with_cards_still_in_hand_scores_even_with_empty_deck() {
        let mut state = MatchState::from_parts(Deck::default(), cards("5C"), [cards("1D"), cards("5D")]);
        let outcome = state.play_card(PlayerId::Two, card("5D"), &cards("5C")).unwrap();
        assert_eq!(outcome, PlayOutcome::Captured { cards: 2, scopa: true });
    }

    #[test]
    fn play_errors_describe_the_rule() {
        let err = PlayError::SumMismatch {
            card: card("7S"),
            captured: 10,
        };
        assert_eq!(err.to_string(), "captured cards add up to 10 but 7S is worth 7");
    }
}
