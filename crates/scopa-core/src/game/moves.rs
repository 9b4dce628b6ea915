use crate::game::match_state::MatchState;
use crate::model::card::{Card, CardList};
use crate::model::player::PlayerId;
use serde::Serialize;
use std::fmt;

/// A card to play and the table cards it takes; an empty capture is a placement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Move {
    pub card: Card,
    pub capture: Vec<Card>,
}

impl Move {
    pub fn place(card: Card) -> Self {
        Self {
            card,
            capture: Vec::new(),
        }
    }

    pub fn capture(card: Card, capture: Vec<Card>) -> Self {
        Self { card, capture }
    }

    pub fn is_capture(&self) -> bool {
        !self.capture.is_empty()
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.capture.is_empty() {
            write!(f, "{} to the table", self.card)
        } else {
            write!(f, "{} takes {}", self.card, CardList(&self.capture))
        }
    }
}

impl MatchState {
    pub fn possible_plays(&self, player: PlayerId) -> Vec<Move> {
        possible_plays(self.hand(player).cards(), self.tabletop())
    }
}

/// Lists every legal move for `hand` against `tabletop`.
///
/// Captures come first, ordered by the number of table cards taken, then one placement
/// for each hand card that cannot capture anything. A multi-card capture is never listed
/// for a card whose value is matched by a single table card.
pub fn possible_plays(hand: &[Card], tabletop: &[Card]) -> Vec<Move> {
    let Some(max_value) = hand.iter().map(|card| u32::from(card.value())).max() else {
        return Vec::new();
    };

    let mut subsets = Vec::new();
    let mut current = Vec::with_capacity(tabletop.len());
    collect_subsets(tabletop, 0, 0, max_value, &mut current, &mut subsets);
    // Stable, so subsets of equal size keep table order.
    subsets.sort_by_key(|(indices, _)| indices.len());

    let mut moves = Vec::new();
    let mut can_capture = vec![false; hand.len()];
    for (indices, sum) in &subsets {
        for (slot, card) in hand.iter().enumerate() {
            if u32::from(card.value()) != *sum {
                continue;
            }
            if indices.len() > 1 && tabletop.iter().any(|t| t.value() == card.value()) {
                continue;
            }
            can_capture[slot] = true;
            moves.push(Move::capture(
                *card,
                indices.iter().map(|&index| tabletop[index]).collect(),
            ));
        }
    }

    for (slot, card) in hand.iter().enumerate() {
        if !can_capture[slot] {
            moves.push(Move::place(*card));
        }
    }
    moves
}

/// Depth-first walk over the non-empty subsets of `tabletop`. Branches whose sum
/// already exceeds `limit` cannot match any hand card and are cut.
fn collect_subsets(
    tabletop: &[Card],
    start: usize,
    sum: u32,
    limit: u32,
    current: &mut Vec<usize>,
    out: &mut Vec<(Vec<usize>, u32)>,
) {
    for index in start..tabletop.len() {
        let next = sum + u32::from(tabletop[index].value());
        if next > limit {
            continue;
        }
        current.push(index);
        out.push((current.clone(), next));
        collect_subsets(tabletop, index + 1, next, limit, current, out);
        current.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::{Move, possible_plays};
    use crate::model::card::{Card, parse_cards};

    fn card(token: &str) -> Card {
        token.parse().unwrap()
    }

    fn cards(text: &str) -> Vec<Card> {
        parse_cards(text).unwrap()
    }

    #[test]
    fn lists_every_capture_by_subset_size_then_placements() {
        let moves = possible_plays(&cards("6S 9B 2D"), &cards("1C 5B 2S 4D 9S"));
        let rendered: Vec<String> = moves.iter().map(Move::to_string).collect();
        assert_eq!(
            rendered,
            vec![
                "2D takes [2S]",
                "9B takes [9S]",
                "6S takes [1C, 5B]",
                "6S takes [2S, 4D]",
            ]
        );
    }

    #[test]
    fn placement_follows_captures_for_cards_that_cannot_take() {
        let moves = possible_plays(&cards("3D 5C"), &cards("2B 1S"));
        assert_eq!(
            moves,
            vec![
                Move::capture(card("3D"), cards("2B 1S")),
                Move::place(card("5C")),
            ]
        );
    }

    #[test]
    fn exact_match_hides_multi_card_alternatives() {
        let moves = possible_plays(&cards("9B"), &cards("8B 1C 1B 9S"));
        assert_eq!(moves, vec![Move::capture(card("9B"), cards("9S"))]);
    }

    #[test]
    fn card_without_capture_is_placed() {
        let moves = possible_plays(&cards("3D 6S 4D"), &cards("8B 1C 1B 9S"));
        assert_eq!(
            moves,
            vec![Move::place(card("3D")), Move::place(card("6S")), Move::place(card("4D"))]
        );
    }

    #[test]
    fn multi_card_capture_allowed_when_no_single_match() {
        let moves = possible_plays(&cards("6S"), &cards("8B 1C 1B 4D"));
        assert_eq!(moves, vec![Move::capture(card("6S"), cards("1C 1B 4D"))]);
    }

    #[test]
    fn empty_table_only_allows_placements() {
        let moves = possible_plays(&cards("7S 10C"), &[]);
        assert_eq!(moves, vec![Move::place(card("7S")), Move::place(card("10C"))]);
    }

    #[test]
    fn empty_hand_has_no_moves() {
        assert!(possible_plays(&[], &cards("1C 2C")).is_empty());
    }

    #[test]
    fn display_distinguishes_placement_and_capture() {
        assert_eq!(Move::place(card("4D")).to_string(), "4D to the table");
        assert_eq!(
            Move::capture(card("6S"), cards("1C 1B 4D")).to_string(),
            "6S takes [1C, 1B, 4D]"
        );
    }
}
