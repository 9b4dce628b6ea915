use std::time::{Duration, Instant};

use scopa_bot::policy::{PolicyConfig, PolicySeat, RandomPolicy};
use scopa_core::game::driver::MoveSource;
use scopa_core::game::match_state::MatchState;
use scopa_core::game::moves::Move;
use scopa_core::model::player::PlayerId;
use serde::Serialize;
use tracing::{Level, event};

use super::AgentError;
use crate::config::{AgentConfig, AgentKind};

/// Parsed agent definition, ready to seat a fresh policy for every match.
pub(super) struct AgentBlueprint {
    pub(super) name: String,
    implementation: AgentImplementation,
}

enum AgentImplementation {
    Random(PolicyConfig),
}

impl AgentBlueprint {
    pub(super) fn from_configs(configs: &[AgentConfig]) -> Result<Vec<Self>, AgentError> {
        configs.iter().map(Self::from_config).collect()
    }

    fn from_config(config: &AgentConfig) -> Result<Self, AgentError> {
        let implementation = match config.kind {
            AgentKind::Random => {
                let params = if config.params.is_null() {
                    PolicyConfig::default()
                } else {
                    serde_yaml::from_value(config.params.clone()).map_err(|source| {
                        AgentError::InvalidParams {
                            name: config.name.clone(),
                            source,
                        }
                    })?
                };
                AgentImplementation::Random(params)
            }
        };

        Ok(Self {
            name: config.name.clone(),
            implementation,
        })
    }

    fn spawn_seat(&self, agent_seed: u64) -> PolicySeat {
        match &self.implementation {
            AgentImplementation::Random(params) => {
                PolicySeat::new(Box::new(RandomPolicy::from_config(params, agent_seed)))
            }
        }
    }
}

/// One agent sitting at one side of the table for a single match.
pub(super) struct SeatState {
    pub(super) player: PlayerId,
    pub(super) agent_name: String,
    seat: PolicySeat,
    metrics: DecisionMetrics,
    trace: Option<PlayTrace>,
}

struct PlayTrace {
    run_id: String,
    match_id: String,
}

impl SeatState {
    pub(super) fn new(player: PlayerId, agent: &AgentBlueprint, agent_seed: u64) -> Self {
        Self {
            player,
            agent_name: agent.name.clone(),
            seat: agent.spawn_seat(agent_seed),
            metrics: DecisionMetrics::default(),
            trace: None,
        }
    }

    /// Emit one event per decision, tagged with the run and match.
    pub(super) fn with_play_trace(mut self, run_id: &str, match_id: &str) -> Self {
        self.trace = Some(PlayTrace {
            run_id: run_id.to_string(),
            match_id: match_id.to_string(),
        });
        self
    }

    pub(super) fn finish(self) -> DecisionSummary {
        self.metrics.finalize()
    }
}

impl MoveSource for SeatState {
    fn request_move(
        &mut self,
        player: PlayerId,
        state: &MatchState,
        legal: &[Move],
    ) -> Option<Move> {
        let started = Instant::now();
        let choice = self.seat.request_move(player, state, legal);
        let elapsed_ms = self.metrics.record(started.elapsed());

        if let Some(trace) = self.trace.as_ref()
            && tracing::enabled!(Level::INFO)
        {
            let chosen = choice.as_ref().map(ToString::to_string).unwrap_or_default();
            event!(
                target: "scopa_bench::play",
                Level::INFO,
                run_id = %trace.run_id,
                match_id = %trace.match_id,
                agent = %self.agent_name,
                %player,
                turn = state.turns_played(),
                options = legal.len(),
                chosen = %chosen,
                elapsed_ms
            );
        }

        choice
    }
}

#[derive(Default)]
struct DecisionMetrics {
    total: Duration,
    decisions: u32,
}

impl DecisionMetrics {
    fn record(&mut self, duration: Duration) -> f64 {
        self.total += duration;
        self.decisions += 1;
        duration.as_secs_f64() * 1000.0
    }

    fn finalize(self) -> DecisionSummary {
        let avg_ms = if self.decisions == 0 {
            0.0
        } else {
            self.total.as_secs_f64() * 1000.0 / f64::from(self.decisions)
        };

        DecisionSummary {
            decisions: self.decisions,
            avg_ms_per_decision: avg_ms,
            total_ms: self.total.as_secs_f64() * 1000.0,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DecisionSummary {
    pub decisions: u32,
    pub avg_ms_per_decision: f64,
    pub total_ms: f64,
}

#[cfg(test)]
mod tests {
    use super::{AgentBlueprint, DecisionMetrics};
    use crate::config::{AgentConfig, AgentKind};
    use crate::runner::AgentError;
    use std::time::Duration;

    fn agent(params: &str) -> AgentConfig {
        AgentConfig {
            name: "alpha".to_string(),
            kind: AgentKind::Random,
            params: serde_yaml::from_str(params).unwrap(),
        }
    }

    #[test]
    fn random_params_accept_seed_offset() {
        let blueprints = AgentBlueprint::from_configs(&[agent("seed_offset: 5"), agent("~")])
            .expect("valid params");
        assert_eq!(blueprints.len(), 2);
        assert_eq!(blueprints[0].name, "alpha");
    }

    #[test]
    fn unknown_random_param_is_rejected() {
        let err = AgentBlueprint::from_configs(&[agent("difficulty: hard")])
            .err()
            .expect("unknown field");
        assert!(matches!(err, AgentError::InvalidParams { ref name, .. } if name == "alpha"));
    }

    #[test]
    fn decision_metrics_average_over_decisions() {
        let mut metrics = DecisionMetrics::default();
        assert!((metrics.record(Duration::from_millis(2)) - 2.0).abs() < 1e-9);
        metrics.record(Duration::from_millis(4));
        let summary = metrics.finalize();
        assert_eq!(summary.decisions, 2);
        assert!((summary.avg_ms_per_decision - 3.0).abs() < 1e-9);
        assert!((summary.total_ms - 6.0).abs() < 1e-9);
    }

    #[test]
    fn empty_metrics_report_zero_average() {
        let summary = DecisionMetrics::default().finalize();
        assert_eq!(summary.decisions, 0);
        assert_eq!(summary.avg_ms_per_decision, 0.0);
    }
}
