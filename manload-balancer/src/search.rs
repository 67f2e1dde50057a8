use crate::{Allocation, BalancerError, BalancerResult, Instance, NeighborExplorer};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// When a pass counts as the last one.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Convergence {
    /// Stop once a pass fails to lower the score by more than `tolerance`,
    /// keeping the vector the pass started from.
    NoImprovement {
        #[serde(default)]
        tolerance: f64,
    },
    /// Always move to the pass champion and stop once its score is within
    /// `tolerance` of the previous pass's score. The first pass compares
    /// against infinity.
    ScoreEquality {
        #[serde(default)]
        tolerance: f64,
    },
}

impl Default for Convergence {
    fn default() -> Self {
        Convergence::NoImprovement { tolerance: 0.0 }
    }
}

impl Convergence {
    pub fn tolerance(&self) -> f64 {
        match *self {
            Convergence::NoImprovement { tolerance } | Convergence::ScoreEquality { tolerance } => {
                tolerance
            }
        }
    }

    pub fn with_tolerance(self, tolerance: f64) -> Self {
        match self {
            Convergence::NoImprovement { .. } => Convergence::NoImprovement { tolerance },
            Convergence::ScoreEquality { .. } => Convergence::ScoreEquality { tolerance },
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    pub max_passes: u32,
    pub convergence: Convergence,
    /// Score candidates on the rayon pool. The champion fold stays sequential
    /// so results match the single threaded run exactly.
    pub parallel: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_passes: 10_000,
            convergence: Convergence::default(),
            parallel: false,
        }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> BalancerResult<()> {
        if self.max_passes == 0 {
            return Err(BalancerError::InvalidMaxPasses);
        }
        let tolerance = self.convergence.tolerance();
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(BalancerError::InvalidTolerance { tolerance });
        }
        Ok(())
    }
}

#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SearchState {
    Searching,
    Converged,
    /// Stopped by `max_passes` before converging.
    Exhausted,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub allocation: Allocation,
    pub score: f64,
    pub service_ratios: Vec<f64>,
    /// Passes that did not end the search.
    pub iterations: u32,
    pub passes: u32,
    pub state: SearchState,
    /// Score of the current vector after each pass.
    pub history: Vec<f64>,
}

#[derive(Debug, Copy, Clone, PartialEq)]
struct Champion {
    /// `None` while the pass's starting vector is still winning.
    index: Option<usize>,
    score: f64,
}

/// Iterated best-neighbor descent on the dispersion score.
pub struct LocalSearch<'a> {
    instance: &'a Instance,
    config: SearchConfig,
}

impl<'a> LocalSearch<'a> {
    pub fn new(instance: &'a Instance, config: SearchConfig) -> BalancerResult<Self> {
        config.validate()?;
        Ok(Self { instance, config })
    }

    pub fn run<E>(&self, seed: Allocation, explorer: &mut E) -> BalancerResult<SearchOutcome>
    where
        E: NeighborExplorer + ?Sized,
    {
        self.instance.check_shape(&seed)?;
        // a seed with an empty group must be left on the first pass, so any
        // zero-free feasible candidate beats it
        let empty_group = seed.iter().position(|&units| units == 0);
        let mut current_score = match empty_group {
            Some(index) => {
                warn!(
                    index,
                    seed = ?seed,
                    "seed leaves a group without units"
                );
                f64::INFINITY
            }
            None => self.instance.dispersion(&seed),
        };

        let mut state = SearchState::Searching;
        let mut current = seed;
        let mut best_score = f64::INFINITY;
        let mut iterations = 0u32;
        let mut passes = 0u32;
        let mut history = Vec::new();

        while state == SearchState::Searching {
            if passes >= self.config.max_passes {
                warn!(
                    max_passes = self.config.max_passes,
                    score = current_score,
                    "pass ceiling reached before convergence"
                );
                state = SearchState::Exhausted;
                break;
            }

            let candidates = explorer.neighbors(&current);
            for candidate in candidates.iter() {
                self.instance
                    .check_shape(candidate)
                    .map_err(|e| BalancerError::InvalidCandidate {
                        candidate: candidate.clone(),
                        reason: e.to_string(),
                    })?;
            }
            let champion = self.fold(current_score, &candidates);
            passes += 1;
            if passes == 1 && champion.index.is_none() {
                if let Some(index) = empty_group {
                    return Err(BalancerError::UnrecoverableSeed {
                        seed: current,
                        index,
                    });
                }
            }

            let (champion_allocation, champion_score) = match champion.index {
                Some(i) => (&candidates[i], champion.score),
                None => (&current, current_score),
            };
            debug!(
                pass = passes,
                allocation = ?champion_allocation,
                service_ratios = ?self.instance.service_ratios(champion_allocation),
                score = champion_score,
                num_candidates = candidates.len(),
                "pass champion"
            );

            match self.config.convergence {
                Convergence::NoImprovement { tolerance } => {
                    if current_score - champion_score <= tolerance {
                        state = SearchState::Converged;
                    } else {
                        current = champion_allocation.clone();
                        current_score = champion_score;
                        iterations += 1;
                    }
                }
                Convergence::ScoreEquality { tolerance } => {
                    current = champion_allocation.clone();
                    current_score = champion_score;
                    if (current_score - best_score).abs() <= tolerance {
                        state = SearchState::Converged;
                    } else {
                        best_score = current_score;
                        iterations += 1;
                    }
                }
            }
            history.push(current_score);
        }

        if state == SearchState::Converged {
            info!(
                passes,
                iterations,
                score = current_score,
                allocation = ?current,
                "search converged"
            );
        }
        Ok(SearchOutcome {
            service_ratios: self.instance.service_ratios(&current),
            allocation: current,
            score: current_score,
            iterations,
            passes,
            state,
            history,
        })
    }

    /// Scores every candidate without a zero entry. Output is index-aligned
    /// with `candidates` in both modes.
    fn score_candidates(&self, candidates: &[Allocation]) -> Vec<Option<f64>> {
        let instance = self.instance;
        let score = |candidate: &Allocation| {
            if candidate.contains(&0) {
                None
            } else {
                Some(instance.dispersion(candidate))
            }
        };
        if self.config.parallel {
            candidates.par_iter().map(score).collect()
        } else {
            candidates.iter().map(score).collect()
        }
    }

    /// Left fold of `better_of` over the candidates, seeded with the vector
    /// the pass started from.
    fn fold(&self, current_score: f64, candidates: &[Allocation]) -> Champion {
        let scores = self.score_candidates(candidates);
        candidates.iter().zip(scores).enumerate().fold(
            Champion {
                index: None,
                score: current_score,
            },
            |champion, (index, (candidate, score))| {
                self.better_of(champion, index, candidate, score)
            },
        )
    }

    /// The candidate wins ties, so of several equally good feasible
    /// candidates the last one survives.
    fn better_of(
        &self,
        champion: Champion,
        index: usize,
        candidate: &[u32],
        score: Option<f64>,
    ) -> Champion {
        // zero entry
        let Some(score) = score else {
            return champion;
        };
        if champion.score < score {
            return champion;
        }
        if let Some(group) = self.instance.first_exceeding(candidate) {
            debug!(
                allocation = ?candidate,
                group,
                max_units = self.instance.max_units()[group],
                "candidate exceeds max units"
            );
            return champion;
        }
        Champion {
            index: Some(index),
            score,
        }
    }
}
