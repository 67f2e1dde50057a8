use crate::{Allocation, BalancerError, BalancerResult};
use rand::{rngs::SmallRng, Rng, SeedableRng};

/// Produces the candidate allocations the search evaluates around `current`.
///
/// Every candidate must have the same length as `current` and the same sum;
/// the search aborts on a candidate that does not.
pub trait NeighborExplorer {
    fn neighbors(&mut self, current: &[u32]) -> Vec<Allocation>;
}

impl<F> NeighborExplorer for F
where
    F: FnMut(&[u32]) -> Vec<Allocation>,
{
    fn neighbors(&mut self, current: &[u32]) -> Vec<Allocation> {
        self(current)
    }
}

/// Every move of `step` units from one group to another.
#[derive(Debug, Clone)]
pub struct PairwiseTransfer {
    step: u32,
}

impl Default for PairwiseTransfer {
    fn default() -> Self {
        Self { step: 1 }
    }
}

impl PairwiseTransfer {
    pub fn new(step: u32) -> BalancerResult<Self> {
        if step == 0 {
            return Err(BalancerError::InvalidExplorer {
                reason: "transfer step must be positive".to_string(),
            });
        }
        Ok(Self { step })
    }
}

impl NeighborExplorer for PairwiseTransfer {
    fn neighbors(&mut self, current: &[u32]) -> Vec<Allocation> {
        let n = current.len();
        let mut candidates = Vec::with_capacity(n * n.saturating_sub(1));
        for from in 0..n {
            if current[from] < self.step {
                continue;
            }
            for to in (0..n).filter(|&to| to != from) {
                candidates.push(transfer(current, from, to, self.step));
            }
        }
        candidates
    }
}

/// `samples` random transfers per call, reproducible from `seed`.
#[derive(Debug, Clone)]
pub struct SampledTransfer {
    rng: SmallRng,
    samples: usize,
    step: u32,
}

impl SampledTransfer {
    pub fn new(seed: u64, samples: usize, step: u32) -> BalancerResult<Self> {
        if samples == 0 {
            return Err(BalancerError::InvalidExplorer {
                reason: "sample count must be positive".to_string(),
            });
        }
        if step == 0 {
            return Err(BalancerError::InvalidExplorer {
                reason: "transfer step must be positive".to_string(),
            });
        }
        Ok(Self {
            rng: SmallRng::seed_from_u64(seed),
            samples,
            step,
        })
    }
}

impl NeighborExplorer for SampledTransfer {
    fn neighbors(&mut self, current: &[u32]) -> Vec<Allocation> {
        let n = current.len();
        if n < 2 {
            return Vec::new();
        }
        let mut candidates = Vec::with_capacity(self.samples);
        for _ in 0..self.samples {
            let from = self.rng.gen_range(0..n);
            // draw from the n - 1 other groups
            let mut to = self.rng.gen_range(0..n - 1);
            if to >= from {
                to += 1;
            }
            if current[from] >= self.step {
                candidates.push(transfer(current, from, to, self.step));
            }
        }
        candidates
    }
}

fn transfer(current: &[u32], from: usize, to: usize, step: u32) -> Allocation {
    let mut candidate = current.to_vec();
    candidate[from] -= step;
    candidate[to] += step;
    candidate
}
