use crate::serializable_struct_with_defaults;
use manload_balancer::{Allocation, Instance, SearchOutcome, SearchState};
use manload_utils::jsonify;
use serde::{Deserialize, Serialize};

serializable_struct_with_defaults! {
    AllocationReport {
        total: u32,
        max_units: Vec<f64>,
        seed: Allocation,
        seed_score: f64,
        allocation: Allocation,
        service_ratios: Vec<f64>,
        score: f64,
        iterations: u32,
        passes: u32,
        state: SearchState,
        feasible: bool,
        violation: Option<String>,
        history: Option<Vec<f64>>,
    }
}

impl AllocationReport {
    /// `violation` is set when the final allocation still breaks a ceiling,
    /// which only happens when the seed already did.
    pub fn new(instance: &Instance, seed: Allocation, outcome: SearchOutcome) -> Self {
        let violation = instance
            .verify_allocation(&outcome.allocation)
            .err()
            .map(|e| e.to_string());
        Self {
            total: instance.total(),
            max_units: instance.max_units().to_vec(),
            seed_score: instance.dispersion(&seed),
            seed,
            allocation: outcome.allocation,
            service_ratios: outcome.service_ratios,
            score: outcome.score,
            iterations: outcome.iterations,
            passes: outcome.passes,
            state: outcome.state,
            feasible: violation.is_none(),
            violation,
            history: Some(outcome.history),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        jsonify(self)
    }
}

serializable_struct_with_defaults! {
    EvaluationReport {
        allocation: Allocation,
        service_ratios: Vec<f64>,
        score: f64,
        feasible: bool,
        violation: Option<String>,
    }
}

impl EvaluationReport {
    /// Scores `allocation` as given and records the first rule it breaks, if
    /// any.
    pub fn new(instance: &Instance, allocation: Allocation) -> Self {
        let violation = instance
            .verify_allocation(&allocation)
            .err()
            .map(|e| e.to_string());
        Self {
            service_ratios: instance.service_ratios(&allocation),
            score: instance.dispersion(&allocation),
            feasible: violation.is_none(),
            violation,
            allocation,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        jsonify(self)
    }
}
