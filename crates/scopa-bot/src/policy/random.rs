use super::{Policy, PolicyConfig, PolicyContext};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use scopa_core::game::driver::MoveSource;
use scopa_core::game::match_state::MatchState;
use scopa_core::game::moves::Move;
use scopa_core::model::player::PlayerId;
use tracing::{Level, event};

/// Picks uniformly among the legal moves.
pub struct RandomPolicy {
    rng: StdRng,
}

impl RandomPolicy {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_config(config: &PolicyConfig, base_seed: u64) -> Self {
        Self::new(base_seed.wrapping_add(config.seed_offset))
    }
}

impl Policy for RandomPolicy {
    fn name(&self) -> &'static str {
        "random"
    }

    fn choose_play(&mut self, ctx: &PolicyContext<'_>) -> Option<Move> {
        let choice = ctx.legal.choose(&mut self.rng).cloned();
        if let Some(mv) = choice.as_ref() {
            event!(
                target: "scopa_bot::random",
                Level::TRACE,
                player = %ctx.player,
                options = ctx.legal.len(),
                chosen = %mv
            );
        }
        choice
    }
}

impl MoveSource for RandomPolicy {
    fn request_move(
        &mut self,
        player: PlayerId,
        state: &MatchState,
        legal: &[Move],
    ) -> Option<Move> {
        self.choose_play(&PolicyContext {
            player,
            state,
            legal,
        })
    }
}
