use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Which standard deviation formula scores an allocation. A run must stick to
/// one since only the ordering of scores matters.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Deviation {
    /// Bessel-corrected, `n - 1` denominator.
    #[default]
    Sample,
    Population,
}

pub fn std_dev(values: &[f64], deviation: Deviation) -> f64 {
    // sample deviation is undefined below two values
    if values.len() < 2 {
        return 0.0;
    }
    match deviation {
        Deviation::Sample => values.iter().std_dev(),
        Deviation::Population => values.iter().population_std_dev(),
    }
}
