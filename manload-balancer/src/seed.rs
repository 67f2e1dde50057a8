use crate::{Allocation, BalancerError, BalancerResult, Instance};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Where the units lost to flooring the weighted average go.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RemainderPolicy {
    /// The whole shortfall goes to the first group.
    #[default]
    FirstGroup,
    /// One unit at a time to the groups with the largest fractional share,
    /// lower index first on ties.
    LargestRemainder,
}

/// Seeds the search by splitting the total in proportion to each group's
/// saturation ceiling, flooring, then correcting for the rounding loss.
pub fn initial_allocation(instance: &Instance, policy: RemainderPolicy) -> BalancerResult<Allocation> {
    let total = instance.total();
    let sum_max_units = instance.max_units().iter().sum::<f64>();
    debug!(
        max_units = ?instance.max_units(),
        sum_max_units,
        "computing weighted average allocation"
    );

    let shares = instance
        .max_units()
        .iter()
        .map(|&max_units| max_units / sum_max_units * total as f64)
        .collect::<Vec<f64>>();
    let mut allocation = shares
        .iter()
        .map(|share| share.floor() as u32)
        .collect::<Allocation>();

    let floored = allocation.iter().map(|&units| units as u64).sum::<u64>();
    let shortfall = (total as u64)
        .checked_sub(floored)
        .ok_or(BalancerError::SeedInvariant {
            expected: total as u64,
            actual: floored,
        })?;

    match policy {
        RemainderPolicy::FirstGroup => allocation[0] += shortfall as u32,
        RemainderPolicy::LargestRemainder => {
            let mut order = (0..allocation.len()).collect::<Vec<usize>>();
            // stable sort keeps lower indices first among equal remainders
            order.sort_by(|&a, &b| {
                let rem_a = shares[a] - shares[a].floor();
                let rem_b = shares[b] - shares[b].floor();
                rem_b.total_cmp(&rem_a)
            });
            for &i in order.iter().cycle().take(shortfall as usize) {
                allocation[i] += 1;
            }
        }
    }

    let sum = allocation.iter().map(|&units| units as u64).sum::<u64>();
    if sum != total as u64 {
        return Err(BalancerError::SeedInvariant {
            expected: total as u64,
            actual: sum,
        });
    }
    debug!(?allocation, shortfall, ?policy, "seed allocation");
    Ok(allocation)
}
