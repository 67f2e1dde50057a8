use crate::{
    dispersion::{std_dev, Deviation},
    BalancerError, BalancerResult, Group,
};

/// A validated problem: the groups, the total number of units to hand out and
/// each group's saturation ceiling. Immutable once built.
#[derive(Debug, Clone)]
pub struct Instance {
    groups: Vec<Group>,
    total: u32,
    max_units: Vec<f64>,
    deviation: Deviation,
}

impl Instance {
    pub fn new(groups: Vec<Group>, total: u32, deviation: Deviation) -> BalancerResult<Self> {
        if groups.is_empty() {
            return Err(BalancerError::EmptyGroups);
        }
        if total == 0 {
            return Err(BalancerError::InvalidTotal);
        }
        for (index, group) in groups.iter().enumerate() {
            group.validate(index)?;
        }
        if (total as usize) < groups.len() {
            return Err(BalancerError::InsufficientTotal {
                total,
                num_groups: groups.len(),
            });
        }
        let max_units = groups.iter().map(Group::max_units).collect();
        Ok(Self {
            groups,
            total,
            max_units,
            deviation,
        })
    }

    pub fn num_groups(&self) -> usize {
        self.groups.len()
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn max_units(&self) -> &[f64] {
        &self.max_units
    }

    pub fn deviation(&self) -> Deviation {
        self.deviation
    }

    pub fn service_ratios(&self, allocation: &[u32]) -> Vec<f64> {
        self.groups
            .iter()
            .zip(allocation)
            .map(|(group, &units)| group.service_ratio(units))
            .collect()
    }

    /// Standard deviation of the service ratios. Lower is fairer.
    pub fn dispersion(&self, allocation: &[u32]) -> f64 {
        std_dev(&self.service_ratios(allocation), self.deviation)
    }

    /// First group whose allocation is above its saturation ceiling.
    pub fn first_exceeding(&self, allocation: &[u32]) -> Option<usize> {
        allocation
            .iter()
            .zip(&self.max_units)
            .position(|(&units, &max_units)| units as f64 > max_units)
    }

    /// Checks the allocation has one entry per group and conserves the total.
    pub fn check_shape(&self, allocation: &[u32]) -> BalancerResult<()> {
        if allocation.len() != self.groups.len() {
            return Err(BalancerError::AllocationLengthMismatch {
                expected: self.groups.len(),
                actual: allocation.len(),
            });
        }
        let sum = allocation.iter().map(|&units| units as u64).sum::<u64>();
        if sum != self.total as u64 {
            return Err(BalancerError::AllocationSumMismatch {
                expected: self.total as u64,
                actual: sum,
            });
        }
        Ok(())
    }

    pub fn verify_allocation(&self, allocation: &[u32]) -> BalancerResult<()> {
        self.check_shape(allocation)?;
        if let Some(index) = allocation.iter().position(|&units| units == 0) {
            return Err(BalancerError::ZeroEntry { index });
        }
        if let Some(index) = self.first_exceeding(allocation) {
            return Err(BalancerError::ExceedsMaxUnits {
                index,
                units: allocation[index],
                max_units: self.max_units[index],
            });
        }
        Ok(())
    }
}
