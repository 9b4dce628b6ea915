use super::match_state::MatchState;
use crate::model::card::Card;
use crate::model::player::PlayerId;
use crate::model::trick::Trick;
use serde::Serialize;

/// Read-only export of everything observable about a match.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MatchSnapshot {
    pub seed: Option<u64>,
    pub turns_played: u32,
    pub deck: Vec<Card>,
    pub tabletop: Vec<Card>,
    pub hands: [Vec<Card>; 2],
    pub tricks: [Vec<Trick>; 2],
    pub last_capturer: Option<PlayerId>,
}

impl MatchSnapshot {
    pub fn capture(state: &MatchState) -> Self {
        MatchSnapshot {
            seed: state.seed(),
            turns_played: state.turns_played(),
            deck: state.deck().cards().to_vec(),
            tabletop: state.tabletop().to_vec(),
            hands: PlayerId::LOOP.map(|player| state.hand(player).cards().to_vec()),
            tricks: PlayerId::LOOP.map(|player| state.tricks(player).to_vec()),
            last_capturer: state.last_capturer(),
        }
    }

    pub fn to_json(state: &MatchState) -> serde_json::Result<String> {
        let snapshot = Self::capture(state);
        serde_json::to_string_pretty(&snapshot)
    }

    pub fn to_value(state: &MatchState) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(Self::capture(state))
    }
}
