use crate::serializable_struct_with_defaults;
use manload_balancer::{
    BalancerResult, Deviation, Group, Instance, NeighborExplorer, PairwiseTransfer,
    RemainderPolicy, SampledTransfer, SearchConfig,
};
use serde::{Deserialize, Serialize};

serializable_struct_with_defaults! {
    BalancerConfig {
        total: u32,
        groups: Vec<Group>,
        deviation: Option<Deviation>,
        remainder: Option<RemainderPolicy>,
        search: Option<SearchConfig>,
        explorer: Option<ExplorerConfig>,
    }
}

impl BalancerConfig {
    /// Four groups sharing 200 units.
    pub fn sample() -> Self {
        Self {
            total: 200,
            groups: vec![
                Group::from([200000, 200, 899, 5]),
                Group::from([10000, 20, 100, 10]),
                Group::from([100, 1, 40, 1]),
                Group::from([2000, 100, 20, 5]),
            ],
            deviation: None,
            remainder: None,
            search: None,
            explorer: None,
        }
    }

    pub fn instance(&self) -> BalancerResult<Instance> {
        Instance::new(self.groups.clone(), self.total, self.deviation())
    }

    /// Validates every section so a bad config fails before any search runs.
    pub fn validate(&self) -> BalancerResult<()> {
        self.instance()?;
        self.search().validate()?;
        self.explorer().build()?;
        Ok(())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExplorerConfig {
    Pairwise {
        #[serde(default = "default_step")]
        step: u32,
    },
    Sampled {
        samples: usize,
        #[serde(default = "default_step")]
        step: u32,
        #[serde(default)]
        seed: u64,
    },
}

fn default_step() -> u32 {
    1
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        ExplorerConfig::Pairwise { step: 1 }
    }
}

impl ExplorerConfig {
    pub fn build(&self) -> BalancerResult<Box<dyn NeighborExplorer>> {
        let explorer: Box<dyn NeighborExplorer> = match *self {
            ExplorerConfig::Pairwise { step } => Box::new(PairwiseTransfer::new(step)?),
            ExplorerConfig::Sampled {
                samples,
                step,
                seed,
            } => Box::new(SampledTransfer::new(seed, samples, step)?),
        };
        Ok(explorer)
    }
}
