use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};
use thiserror::Error;

use crate::config::{AgentKind, BenchmarkConfig};
use crate::runner::{DecisionSummary, MatchOutcome};

const CONFIDENCE_Z: f64 = 1.96; // 95% CI

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("baseline agent '{0}' not present in match results")]
    MissingBaseline(String),
    #[error("agent '{0}' defined in results but missing from configuration")]
    UnknownAgent(String),
    #[error("baseline '{0}' missing for match {1}")]
    MissingBaselineMatch(String, String),
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

pub struct AnalyticsCollector {
    baseline: String,
    agents: HashMap<String, AgentAccumulator>,
    comparisons: HashMap<String, ComparisonAccumulator>,
    agent_order: Vec<String>,
    fixed_deck: bool,
}

impl AnalyticsCollector {
    pub fn new(config: &BenchmarkConfig) -> Result<Self, AnalyticsError> {
        let baseline = config
            .metrics
            .baseline
            .clone()
            .ok_or_else(|| AnalyticsError::MissingBaseline("<unset>".into()))?;

        let mut agents = HashMap::new();
        let mut order = Vec::new();
        for agent in &config.agents {
            agents.insert(
                agent.name.clone(),
                AgentAccumulator::new(agent.name.clone(), agent.kind),
            );
            order.push(agent.name.clone());
        }

        if !agents.contains_key(&baseline) {
            return Err(AnalyticsError::MissingBaseline(baseline));
        }

        Ok(Self {
            baseline,
            agents,
            comparisons: HashMap::new(),
            agent_order: order,
            fixed_deck: config.matches.fixed_deck,
        })
    }

    pub fn record_match(&mut self, outcome: &MatchOutcome) -> Result<(), AnalyticsError> {
        let baseline_points = outcome
            .seat_results
            .iter()
            .find(|seat| seat.agent_name == self.baseline)
            .map(|seat| f64::from(seat.points))
            .ok_or_else(|| {
                AnalyticsError::MissingBaselineMatch(
                    self.baseline.clone(),
                    outcome.match_id.clone(),
                )
            })?;

        for seat in &outcome.seat_results {
            let acc = self
                .agents
                .get_mut(&seat.agent_name)
                .ok_or_else(|| AnalyticsError::UnknownAgent(seat.agent_name.clone()))?;

            let result = match outcome.winner.as_deref() {
                None => MatchResultKind::Draw,
                Some(name) if name == seat.agent_name => MatchResultKind::Win,
                Some(_) => MatchResultKind::Loss,
            };

            acc.record_match(SeatSample {
                points: f64::from(seat.points),
                result,
                scopas: seat.breakdown.scopa,
                settebello: seat.tally.settebello > 0,
                primiera: seat.breakdown.primiera > 0,
                metrics: &seat.metrics,
            });
        }

        for seat in &outcome.seat_results {
            if seat.agent_name == self.baseline {
                continue;
            }
            let diff = f64::from(seat.points) - baseline_points;
            self.comparisons
                .entry(seat.agent_name.clone())
                .or_insert_with(ComparisonAccumulator::new)
                .record(diff);
        }

        Ok(())
    }

    pub fn finalize(mut self) -> Result<AnalyticsSummary, AnalyticsError> {
        let mut reports = Vec::new();
        for name in &self.agent_order {
            if let Some(acc) = self.agents.remove(name) {
                reports.push(acc.into_report());
            }
        }

        let mut comparisons = Vec::new();
        for report in &reports {
            if report.name == self.baseline {
                comparisons.push(ComparisonReport {
                    agent: report.name.clone(),
                    p_value: 1.0,
                    sample_size: report.matches,
                });
                continue;
            }
            let (p_value, sample_size) = self
                .comparisons
                .remove(&report.name)
                .map(ComparisonAccumulator::wilcoxon_signed_rank)
                .unwrap_or((1.0, 0));
            comparisons.push(ComparisonReport {
                agent: report.name.clone(),
                p_value,
                sample_size,
            });
        }

        Ok(AnalyticsSummary {
            baseline: self.baseline,
            fixed_deck: self.fixed_deck,
            agents: reports,
            comparisons,
        }
        .enrich())
    }
}

#[derive(Clone, Copy)]
enum MatchResultKind {
    Win,
    Draw,
    Loss,
}

struct SeatSample<'a> {
    points: f64,
    result: MatchResultKind,
    scopas: u32,
    settebello: bool,
    primiera: bool,
    metrics: &'a DecisionSummary,
}

struct AgentAccumulator {
    name: String,
    kind: AgentKind,
    total_points: f64,
    matches: u32,
    wins: u32,
    draws: u32,
    scopas: u32,
    settebelli: u32,
    primiere: u32,
    per_match_points: Vec<f64>,
    total_latency_ms: f64,
    total_decisions: u64,
}

impl AgentAccumulator {
    fn new(name: String, kind: AgentKind) -> Self {
        Self {
            name,
            kind,
            total_points: 0.0,
            matches: 0,
            wins: 0,
            draws: 0,
            scopas: 0,
            settebelli: 0,
            primiere: 0,
            per_match_points: Vec::new(),
            total_latency_ms: 0.0,
            total_decisions: 0,
        }
    }

    fn record_match(&mut self, sample: SeatSample<'_>) {
        self.total_points += sample.points;
        self.matches += 1;
        self.per_match_points.push(sample.points);
        match sample.result {
            MatchResultKind::Win => self.wins += 1,
            MatchResultKind::Draw => self.draws += 1,
            MatchResultKind::Loss => {}
        }
        self.scopas += sample.scopas;
        if sample.settebello {
            self.settebelli += 1;
        }
        if sample.primiera {
            self.primiere += 1;
        }
        self.total_latency_ms += sample.metrics.total_ms;
        self.total_decisions += u64::from(sample.metrics.decisions);
    }

    fn into_report(self) -> AgentReport {
        let avg_points = if self.matches == 0 {
            0.0
        } else {
            self.total_points / f64::from(self.matches)
        };

        let (ci_low, ci_high) = confidence_interval(&self.per_match_points);

        let avg_latency = if self.total_decisions == 0 {
            0.0
        } else {
            self.total_latency_ms / self.total_decisions as f64
        };

        AgentReport {
            name: self.name,
            kind: self.kind,
            matches: self.matches as usize,
            avg_points,
            ci95: (ci_low, ci_high),
            wins: self.wins as usize,
            draws: self.draws as usize,
            scopas: self.scopas as usize,
            settebelli: self.settebelli as usize,
            primiere: self.primiere as usize,
            average_ms_per_decision: avg_latency,
            delta_vs_baseline: 0.0, // Filled later once we know baseline report
        }
    }
}

#[derive(Clone)]
struct ComparisonAccumulator {
    diffs: Vec<f64>,
}

impl ComparisonAccumulator {
    fn new() -> Self {
        Self { diffs: Vec::new() }
    }

    fn record(&mut self, diff: f64) {
        self.diffs.push(diff);
    }

    /// Two-sided signed-rank test on the paired point margins, normal approximation.
    fn wilcoxon_signed_rank(self) -> (f64, usize) {
        let diffs: Vec<f64> = self
            .diffs
            .into_iter()
            .filter(|d| d.abs() > f64::EPSILON)
            .collect();
        let n = diffs.len();
        if n == 0 {
            return (1.0, 0);
        }

        let mut paired: Vec<(f64, f64)> =
            diffs.into_iter().map(|d| (d.abs(), d.signum())).collect();
        paired.sort_by(|a, b| a.0.total_cmp(&b.0));

        // Tied magnitudes share the average rank
        let mut ranks = Vec::with_capacity(n);
        let mut tie_sizes = Vec::new();
        let mut i = 0;
        while i < paired.len() {
            let mut j = i;
            while j + 1 < paired.len() && (paired[j + 1].0 - paired[i].0).abs() < 1e-12 {
                j += 1;
            }
            let rank = (i + j + 2) as f64 / 2.0;
            ranks.extend(paired[i..=j].iter().map(|&(_, sign)| (rank, sign)));
            if j > i {
                tie_sizes.push(j - i + 1);
            }
            i = j + 1;
        }

        let w_plus: f64 = ranks
            .iter()
            .filter(|(_, sign)| *sign > 0.0)
            .map(|(rank, _)| *rank)
            .sum();
        let w_minus: f64 = ranks
            .iter()
            .filter(|(_, sign)| *sign < 0.0)
            .map(|(rank, _)| *rank)
            .sum();

        let w = w_plus.min(w_minus);
        let n_f = n as f64;
        let mean_w = n_f * (n_f + 1.0) / 4.0;

        let tie_adjustment: f64 = tie_sizes
            .into_iter()
            .map(|count| {
                let c = count as f64;
                (c.powi(3) - c) / 48.0
            })
            .sum();
        let variance_w = n_f * (n_f + 1.0) * (2.0 * n_f + 1.0) / 24.0 - tie_adjustment;
        if variance_w <= 0.0 {
            return (1.0, n);
        }

        let Ok(normal) = Normal::new(0.0, 1.0) else {
            return (1.0, n);
        };
        let z = ((w - mean_w).abs() - 0.5).max(0.0) / variance_w.sqrt();
        let p = 2.0 * (1.0 - normal.cdf(z));
        (p.clamp(0.0, 1.0), n)
    }
}

#[derive(Debug, Serialize)]
pub struct AnalyticsSummary {
    pub baseline: String,
    pub fixed_deck: bool,
    pub agents: Vec<AgentReport>,
    pub comparisons: Vec<ComparisonReport>,
}

impl AnalyticsSummary {
    pub fn enrich(mut self) -> Self {
        let baseline_avg = self
            .agents
            .iter()
            .find(|agent| agent.name == self.baseline)
            .map(|agent| agent.avg_points)
            .unwrap_or(0.0);

        for agent in &mut self.agents {
            agent.delta_vs_baseline = agent.avg_points - baseline_avg;
        }

        self
    }

    pub fn render_markdown(&self) -> String {
        let mut rows = String::new();
        rows.push_str("# Match Summary\n\n");
        rows.push_str(&format!(
            "Baseline: {} ({})\n\n",
            self.baseline,
            if self.fixed_deck {
                "fixed deck"
            } else {
                "seeded shuffles"
            }
        ));
        rows.push_str("| Agent | Kind | Matches | Avg Points | Δ vs baseline | 95% CI | Win % | Draw % | Scopas/match | Settebello % | Primiera % | Avg ms/decision | p-value |\n");
        rows.push_str("|-------|------|---------|------------|----------------|--------|-------|--------|--------------|--------------|------------|------------------|---------|\n");

        for agent in &self.agents {
            let comparison = self
                .comparisons
                .iter()
                .find(|c| c.agent == agent.name)
                .map(|c| c.p_value)
                .unwrap_or(1.0);

            rows.push_str(&format!(
                "| {name} | {kind:?} | {matches} | {avg:.3} | {delta:+.3} | [{ci_low:.3}, {ci_high:.3}] | {win:.1}% | {draw:.1}% | {scopas:.2} | {sette:.1}% | {prim:.1}% | {latency:.3} | {pval:.3} |\n",
                name = agent.name,
                kind = agent.kind,
                matches = agent.matches,
                avg = agent.avg_points,
                delta = agent.delta_vs_baseline,
                ci_low = agent.ci95.0,
                ci_high = agent.ci95.1,
                win = rate(agent.wins, agent.matches) * 100.0,
                draw = rate(agent.draws, agent.matches) * 100.0,
                scopas = rate(agent.scopas, agent.matches),
                sette = rate(agent.settebelli, agent.matches) * 100.0,
                prim = rate(agent.primiere, agent.matches) * 100.0,
                latency = agent.average_ms_per_decision,
                pval = comparison,
            ));
        }

        rows
    }

    pub fn write_markdown(&self, path: impl AsRef<Path>) -> Result<(), AnalyticsError> {
        fs::write(path.as_ref(), self.render_markdown()).map_err(|e| AnalyticsError::Io {
            context: "writing summary markdown",
            source: e,
        })?;
        Ok(())
    }
}

fn rate(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentReport {
    pub name: String,
    pub kind: AgentKind,
    pub matches: usize,
    pub avg_points: f64,
    pub ci95: (f64, f64),
    pub wins: usize,
    pub draws: usize,
    pub scopas: usize,
    pub settebelli: usize,
    pub primiere: usize,
    pub average_ms_per_decision: f64,
    pub delta_vs_baseline: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    pub agent: String,
    pub p_value: f64,
    pub sample_size: usize,
}

fn confidence_interval(points: &[f64]) -> (f64, f64) {
    if points.is_empty() {
        return (0.0, 0.0);
    }
    let n = points.len() as f64;
    let mean = points.iter().sum::<f64>() / n;
    if points.len() == 1 {
        return (mean, mean);
    }
    let variance = points
        .iter()
        .map(|value| {
            let diff = value - mean;
            diff * diff
        })
        .sum::<f64>()
        / (n - 1.0);
    let std_err = (variance / n).sqrt();
    let delta = CONFIDENCE_Z * std_err;
    (mean - delta, mean + delta)
}
