use crate::game::match_state::{DealError, MatchState};
use crate::game::moves::Move;
use crate::game::play::{PlayError, PlayOutcome};
use crate::model::card::CardList;
use crate::model::deck::DECK_SIZE;
use crate::model::player::PlayerId;
use crate::model::score::ScoreBoard;
use thiserror::Error;
use tracing::{debug, info};

/// Supplies the next move for a player. Implementations may block (for example on user
/// input); the driver waits synchronously.
pub trait MoveSource {
    /// `legal` is never empty while the player holds cards. Returning `None` abandons
    /// the match.
    fn request_move(&mut self, player: PlayerId, state: &MatchState, legal: &[Move])
    -> Option<Move>;
}

impl<F> MoveSource for F
where
    F: FnMut(PlayerId, &MatchState, &[Move]) -> Option<Move>,
{
    fn request_move(
        &mut self,
        player: PlayerId,
        state: &MatchState,
        legal: &[Move],
    ) -> Option<Move> {
        self(player, state, legal)
    }
}

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("dealing failed: {0}")]
    Deal(#[from] DealError),
    #[error("{player} did not choose a move")]
    NoMove { player: PlayerId },
    #[error("{player} chose an illegal move ({mv}): {source}")]
    IllegalMove {
        player: PlayerId,
        mv: Move,
        #[source]
        source: PlayError,
    },
}

/// One played card, as reported by [`MatchDriver::play_turn`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnRecord {
    pub player: PlayerId,
    pub mv: Move,
    pub outcome: PlayOutcome,
}

#[derive(Debug, Clone)]
pub struct MatchResult {
    pub state: MatchState,
    pub score: ScoreBoard,
    /// Who received the leftover table, if anything was swept.
    pub swept_to: Option<PlayerId>,
}

/// Runs a match from the opening deal to the final sweep.
#[derive(Debug, Clone)]
pub struct MatchDriver {
    state: MatchState,
    next_player: PlayerId,
}

impl MatchDriver {
    pub fn new(state: MatchState) -> Self {
        Self {
            state,
            next_player: PlayerId::One,
        }
    }

    pub fn starting_with(mut self, player: PlayerId) -> Self {
        self.next_player = player;
        self
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn next_player(&self) -> PlayerId {
        self.next_player
    }

    /// Deals whatever is due and plays one card. Returns `None` once the match is over.
    pub fn play_turn(
        &mut self,
        sources: &mut [&mut dyn MoveSource; 2],
    ) -> Result<Option<TurnRecord>, DriverError> {
        if self.state.deck_remaining() == DECK_SIZE {
            self.state.deal_table()?;
            debug!(table = %CardList(self.state.tabletop()), "dealt the table");
        }

        if self.state.is_finished() {
            return Ok(None);
        }

        if self.state.needs_deal() {
            self.state.deal_hands()?;
            debug!(
                deck_remaining = self.state.deck_remaining(),
                "dealt a round of hands"
            );
        }

        // A player who has run out waits for the opponent to finish the round.
        if self.state.hand(self.next_player).is_empty() {
            self.next_player = self.next_player.opponent();
        }

        let player = self.next_player;
        let legal = self.state.possible_plays(player);
        let mv = sources[player.index()]
            .request_move(player, &self.state, &legal)
            .ok_or(DriverError::NoMove { player })?;

        let outcome = self
            .state
            .apply_move(player, &mv)
            .map_err(|source| DriverError::IllegalMove {
                player,
                mv: mv.clone(),
                source,
            })?;

        debug!(
            %player,
            mv = %mv,
            turn = self.state.turns_played(),
            scopa = matches!(outcome, PlayOutcome::Captured { scopa: true, .. }),
            "card played"
        );

        self.next_player = player.opponent();
        Ok(Some(TurnRecord {
            player,
            mv,
            outcome,
        }))
    }

    pub fn run(mut self, mut sources: [&mut dyn MoveSource; 2]) -> Result<MatchResult, DriverError> {
        while self.play_turn(&mut sources)?.is_some() {}

        let swept_to = self.state.sweep_tabletop();
        if let Some(player) = swept_to {
            debug!(%player, "swept the leftover table");
        }

        let score = self.state.score_match();
        let [one, two] = score.standings();
        info!(
            turns = self.state.turns_played(),
            player_one = one,
            player_two = two,
            "match finished"
        );

        Ok(MatchResult {
            state: self.state,
            score,
            swept_to,
        })
    }
}
