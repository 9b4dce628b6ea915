mod seat;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use rand::{RngCore, SeedableRng, rngs::StdRng};
use scopa_core::game::driver::{DriverError, MatchDriver};
use scopa_core::game::match_state::MatchState;
use scopa_core::game::serialization::MatchSnapshot;
use scopa_core::model::deck::Deck;
use scopa_core::model::player::PlayerId;
use scopa_core::model::score::{PlayerTally, PointBreakdown};
use serde::Serialize;
use thiserror::Error;
use tracing::{Level, event};

use crate::analytics::{AnalyticsCollector, AnalyticsError};
use crate::config::{AGENT_COUNT, BenchmarkConfig, ResolvedOutputs};

pub use seat::DecisionSummary;
use seat::{AgentBlueprint, SeatState};

/// Plays the configured series of matches and writes the run artifacts.
pub struct MatchRunner {
    config: BenchmarkConfig,
    outputs: ResolvedOutputs,
    agents: Vec<AgentBlueprint>,
    logging_enabled: bool,
}

/// Summary details returned after a run.
pub struct RunSummary {
    pub matches_played: usize,
    pub rows_written: usize,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
    pub telemetry_path: Option<PathBuf>,
}

impl MatchRunner {
    /// Build a runner from a validated configuration.
    pub fn new(config: BenchmarkConfig, outputs: ResolvedOutputs) -> Result<Self, RunnerError> {
        let agents = AgentBlueprint::from_configs(&config.agents)?;

        if agents.len() != AGENT_COUNT {
            return Err(RunnerError::SeatCount {
                found: agents.len(),
            });
        }

        Ok(Self {
            logging_enabled: config.logging.enable_structured,
            config,
            outputs,
            agents,
        })
    }

    /// Play every match, streaming one JSONL row per match to disk.
    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        ensure_parent(self.outputs.jsonl.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;

        let mut writer = BufWriter::new(File::create(&self.outputs.jsonl)?);
        let mut rng = StdRng::seed_from_u64(self.config.matches.seed.unwrap_or(0));
        let mut rows_written = 0usize;
        let mut analytics = AnalyticsCollector::new(&self.config)?;

        for match_index in 0..self.config.matches.count {
            let seeds = MatchSeeds::draw(&mut rng);
            let outcome = self.play_match(match_index, seeds)?;
            analytics.record_match(&outcome)?;
            write_match_row(&mut writer, &self.config, &outcome)?;
            rows_written += 1;
        }

        writer.flush()?;

        let summary = analytics.finalize()?;
        summary.write_markdown(&self.outputs.summary_md)?;

        let telemetry_path = if self.logging_enabled {
            let dir = self
                .outputs
                .summary_md
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            Some(dir.join("telemetry.jsonl"))
        } else {
            None
        };

        Ok(RunSummary {
            matches_played: self.config.matches.count,
            rows_written,
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
            telemetry_path,
        })
    }

    /// Agent indices seated as Player 1 and Player 2 for this match.
    fn seating_for(&self, match_index: usize) -> [usize; AGENT_COUNT] {
        if self.config.matches.swap_seats && match_index % 2 == 1 {
            [1, 0]
        } else {
            [0, 1]
        }
    }

    fn play_match(&self, match_index: usize, seeds: MatchSeeds) -> Result<MatchOutcome, RunnerError> {
        let match_id = match_id(match_index);
        let match_seed = seeds.deck;
        let seating = self.seating_for(match_index);
        let play_details = self.logging_enabled && self.config.logging.play_details;

        let mut seats = PlayerId::LOOP.map(|player| {
            let agent = seating[player.index()];
            let seat = SeatState::new(player, &self.agents[agent], seeds.agents[agent]);
            if play_details {
                seat.with_play_trace(&self.config.run_id, &match_id)
            } else {
                seat
            }
        });

        let state = if self.config.matches.fixed_deck {
            MatchState::with_deck(Deck::fixed())
        } else {
            MatchState::with_seed(match_seed)
        };

        let result = {
            let [one, two] = &mut seats;
            MatchDriver::new(state)
                .run([one, two])
                .map_err(|source| RunnerError::Match {
                    match_id: match_id.clone(),
                    source,
                })?
        };

        let winner = result
            .score
            .leader()
            .map(|player| seats[player.index()].agent_name.clone());
        let swept_to = result
            .swept_to
            .map(|player| seats[player.index()].agent_name.clone());
        let snapshot = self
            .config
            .outputs
            .include_snapshots
            .then(|| MatchSnapshot::capture(&result.state));

        let seat_results: Vec<SeatResult> = seats
            .into_iter()
            .map(|seat| {
                let player = seat.player;
                SeatResult {
                    agent_name: seat.agent_name.clone(),
                    player,
                    points: result.score.score(player),
                    breakdown: *result.score.breakdown(player),
                    tally: *result.score.tally(player),
                    metrics: seat.finish(),
                }
            })
            .collect();

        if self.logging_enabled && tracing::enabled!(Level::INFO) {
            event!(
                target: "scopa_bench::match",
                Level::INFO,
                run_id = %self.config.run_id,
                match_id = %match_id,
                match_seed,
                player_one = %seat_results[0].agent_name,
                player_two = %seat_results[1].agent_name,
                points_one = seat_results[0].points,
                points_two = seat_results[1].points,
                winner = winner.as_deref().unwrap_or("draw"),
                swept_to = swept_to.as_deref().unwrap_or("none"),
                turns = result.state.turns_played()
            );
        }

        Ok(MatchOutcome {
            match_id,
            match_index,
            match_seed,
            seat_results,
            winner,
            swept_to,
            turns: result.state.turns_played(),
            snapshot,
        })
    }
}

/// Independent seeds for one match: the deck shuffle and each agent's own generator.
/// Agent seeds follow the agent, not the seat it occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MatchSeeds {
    deck: u64,
    agents: [u64; AGENT_COUNT],
}

impl MatchSeeds {
    fn draw(rng: &mut StdRng) -> Self {
        let deck = rng.next_u64();
        let agents = [rng.next_u64(), rng.next_u64()];
        Self { deck, agents }
    }
}

fn match_id(match_index: usize) -> String {
    format!("M{match_index:05}")
}

fn ensure_parent(path: Option<&Path>) -> Result<(), RunnerError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

fn write_match_row(
    writer: &mut BufWriter<File>,
    config: &BenchmarkConfig,
    outcome: &MatchOutcome,
) -> Result<(), RunnerError> {
    let row = MatchLogRow {
        run_id: &config.run_id,
        match_id: &outcome.match_id,
        match_index: outcome.match_index,
        match_seed: outcome.match_seed,
        fixed_deck: config.matches.fixed_deck,
        seats: outcome
            .seat_results
            .iter()
            .map(|seat| SeatLogRow {
                seat: seat.player.to_string(),
                bot: &seat.agent_name,
                points: seat.points,
                breakdown: &seat.breakdown,
                tally: &seat.tally,
                speed_ms_turn: seat.metrics.avg_ms_per_decision,
                decisions: seat.metrics.decisions,
            })
            .collect(),
        winner: outcome.winner.as_deref(),
        swept_to: outcome.swept_to.as_deref(),
        turns: outcome.turns,
        snapshot: outcome.snapshot.as_ref(),
    };

    serde_json::to_writer(&mut *writer, &row)?;
    writer.write_all(b"\n")?;
    Ok(())
}

/// Everything the analytics and the log row need from one finished match.
pub struct MatchOutcome {
    pub match_id: String,
    pub match_index: usize,
    pub match_seed: u64,
    /// Indexed by player: Player 1 first.
    pub seat_results: Vec<SeatResult>,
    /// Name of the agent with more points, `None` on a draw.
    pub winner: Option<String>,
    pub swept_to: Option<String>,
    pub turns: u32,
    pub snapshot: Option<MatchSnapshot>,
}

pub struct SeatResult {
    pub agent_name: String,
    pub player: PlayerId,
    pub points: u32,
    pub breakdown: PointBreakdown,
    pub tally: PlayerTally,
    pub metrics: DecisionSummary,
}

#[derive(Serialize)]
struct MatchLogRow<'a> {
    run_id: &'a str,
    match_id: &'a str,
    match_index: usize,
    match_seed: u64,
    fixed_deck: bool,
    seats: Vec<SeatLogRow<'a>>,
    winner: Option<&'a str>,
    swept_to: Option<&'a str>,
    turns: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    snapshot: Option<&'a MatchSnapshot>,
}

#[derive(Serialize)]
struct SeatLogRow<'a> {
    seat: String,
    bot: &'a str,
    points: u32,
    breakdown: &'a PointBreakdown,
    tally: &'a PlayerTally,
    speed_ms_turn: f64,
    decisions: u32,
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("{0}")]
    Agent(#[from] AgentError),
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failed to serialize log row: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
    #[error("match {match_id} failed: {source}")]
    Match {
        match_id: String,
        #[source]
        source: DriverError,
    },
    #[error("configuration requires exactly two agents but found {found}")]
    SeatCount { found: usize },
    #[error("analytics error: {0}")]
    Analytics(#[from] AnalyticsError),
}

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("invalid parameters for agent '{name}': {source}")]
    InvalidParams {
        name: String,
        #[source]
        source: serde_yaml::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::{MatchSeeds, match_id};
    use rand::{Rng, SeedableRng, rngs::StdRng};
    use scopa_bot::policy::{Policy, PolicyConfig, PolicyContext, RandomPolicy};
    use scopa_core::game::match_state::MatchState;
    use scopa_core::model::deck::Deck;
    use scopa_core::model::player::PlayerId;

    #[test]
    fn match_ids_are_zero_padded() {
        assert_eq!(match_id(0), "M00000");
        assert_eq!(match_id(42), "M00042");
    }

    #[test]
    fn deck_and_agent_seeds_are_distinct() {
        let mut rng = StdRng::seed_from_u64(12345);
        let mut previous = Vec::new();
        for _ in 0..50 {
            let seeds = MatchSeeds::draw(&mut rng);
            assert_ne!(seeds.deck, seeds.agents[0]);
            assert_ne!(seeds.deck, seeds.agents[1]);
            assert_ne!(seeds.agents[0], seeds.agents[1]);
            assert!(!previous.contains(&seeds));
            previous.push(seeds);
        }
    }

    #[test]
    fn zero_offset_agent_does_not_replay_the_shuffle() {
        let seeds = MatchSeeds::draw(&mut StdRng::seed_from_u64(12345));
        let draws = |seed: u64| -> Vec<u32> {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..5).map(|_| rng.gen_range(0..40)).collect()
        };
        let zero_offset = PolicyConfig { seed_offset: 0 };

        // The policy seeds its generator with the agent seed plus its offset.
        let deck_stream = draws(seeds.deck);
        assert_ne!(draws(seeds.agents[0].wrapping_add(zero_offset.seed_offset)), deck_stream);
        assert_ne!(draws(seeds.agents[1].wrapping_add(zero_offset.seed_offset)), deck_stream);
        assert_ne!(draws(seeds.agents[0]), draws(seeds.agents[1]));

        // Two zero-offset agents choose independently.
        let mut policies = seeds
            .agents
            .map(|seed| RandomPolicy::from_config(&zero_offset, seed));
        let mut state = MatchState::with_deck(Deck::fixed());
        state.deal_opening().unwrap();
        let legal = state.possible_plays(PlayerId::Two);
        let ctx = PolicyContext {
            player: PlayerId::Two,
            state: &state,
            legal: &legal,
        };
        let picks: Vec<Vec<_>> = policies
            .iter_mut()
            .map(|policy| (0..32).map(|_| policy.choose_play(&ctx).unwrap()).collect())
            .collect();
        assert_ne!(picks[0], picks[1]);
    }
}
