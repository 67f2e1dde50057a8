use crate::{BalancerError, BalancerResult};
use serde::{Deserialize, Serialize};

/// One allocation target.
///
/// `demand` is the quota of work the group must serve, `rate` scales the
/// work performed into served demand, `capacity` caps the work the group can
/// absorb and `unit_cost` is the work each assigned unit performs.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
pub struct Group {
    pub demand: u32,
    pub rate: u32,
    pub capacity: u32,
    pub unit_cost: u32,
}

impl From<[u32; 4]> for Group {
    fn from(arr: [u32; 4]) -> Self {
        Self {
            demand: arr[0],
            rate: arr[1],
            capacity: arr[2],
            unit_cost: arr[3],
        }
    }
}

impl Group {
    pub fn validate(&self, index: usize) -> BalancerResult<()> {
        for (field, value) in [
            ("demand", self.demand),
            ("rate", self.rate),
            ("capacity", self.capacity),
            ("unit_cost", self.unit_cost),
        ] {
            if value == 0 {
                return Err(BalancerError::InvalidGroup { index, field });
            }
        }
        Ok(())
    }

    /// Units beyond which `capacity` saturates and extra units add no work.
    pub fn max_units(&self) -> f64 {
        self.capacity as f64 / self.unit_cost as f64
    }

    /// Fraction of `demand` served when `units` are assigned, in `[0, 1]`.
    pub fn service_ratio(&self, units: u32) -> f64 {
        let work = (units as u64 * self.unit_cost as u64).min(self.capacity as u64);
        let served = (work * self.rate as u64).min(self.demand as u64);
        served as f64 / self.demand as f64
    }
}
