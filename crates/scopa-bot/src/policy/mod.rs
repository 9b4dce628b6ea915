mod random;

pub use random::RandomPolicy;

use scopa_core::game::driver::MoveSource;
use scopa_core::game::match_state::MatchState;
use scopa_core::game::moves::Move;
use scopa_core::model::player::PlayerId;
use serde::Deserialize;

/// Context provided to policies for decision-making
pub struct PolicyContext<'a> {
    pub player: PlayerId,
    pub state: &'a MatchState,
    pub legal: &'a [Move],
}

/// Interface for automated move selection
pub trait Policy: Send {
    fn name(&self) -> &'static str;

    /// Choose one of `ctx.legal`; `None` only when there is nothing to choose from.
    fn choose_play(&mut self, ctx: &PolicyContext<'_>) -> Option<Move>;
}

/// Per-agent parameters, read from the `params` block of an agent definition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicyConfig {
    /// Mixed into the run seed so two agents of the same kind do not mirror each other.
    pub seed_offset: u64,
}

/// Seats a boxed policy at the table as a [`MoveSource`].
pub struct PolicySeat {
    policy: Box<dyn Policy>,
}

impl PolicySeat {
    pub fn new(policy: Box<dyn Policy>) -> Self {
        Self { policy }
    }

    pub fn name(&self) -> &'static str {
        self.policy.name()
    }
}

impl MoveSource for PolicySeat {
    fn request_move(
        &mut self,
        player: PlayerId,
        state: &MatchState,
        legal: &[Move],
    ) -> Option<Move> {
        let ctx = PolicyContext {
            player,
            state,
            legal,
        };
        self.policy.choose_play(&ctx)
    }
}
