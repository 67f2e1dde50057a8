mod logging;

use anyhow::{anyhow, Result};
use clap::{arg, Arg, ArgAction, ArgMatches, Command};
use manload_balancer::{
    initial_allocation, Allocation, Convergence, Deviation, LocalSearch, RemainderPolicy,
    SearchState,
};
use manload_structs::{
    config::{BalancerConfig, ExplorerConfig},
    core::{AllocationReport, EvaluationReport},
};
use manload_utils::{dejsonify, read_json_arg};
use std::{fs, path::PathBuf};
use tracing::{info, warn};

const DEFAULT_SAMPLES: usize = 32;

fn config_arg() -> Arg {
    arg!([CONFIG] "Config json string, path to json file, or '-' for stdin (default: built-in sample table)")
        .value_parser(clap::value_parser!(String))
}

fn deviation_arg() -> Arg {
    arg!(--deviation [DEVIATION] "Standard deviation formula")
        .value_parser(["sample", "population"])
}

fn remainder_arg() -> Arg {
    arg!(--remainder [REMAINDER] "Where units lost to rounding the seed go")
        .value_parser(["first", "largest"])
}

fn cli() -> Command {
    Command::new("manload")
        .about("Allocates units across groups so their service levels are as even as possible")
        .arg_required_else_help(true)
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .help("Log level (trace, debug, info, warn, error)")
                .default_value("info")
                .global(true),
        )
        .subcommand(
            Command::new("balance")
                .about("Seeds an allocation and refines it with local search")
                .arg(config_arg())
                .arg(deviation_arg())
                .arg(remainder_arg())
                .arg(
                    Arg::new("max-passes")
                        .long("max-passes")
                        .value_name("MAX_PASSES")
                        .help("Stop after this many search passes even if not converged")
                        .value_parser(clap::value_parser!(u32)),
                )
                .arg(
                    arg!(--tolerance [TOLERANCE] "Score difference treated as no change")
                        .value_parser(clap::value_parser!(f64)),
                )
                .arg(
                    arg!(--convergence [RULE] "Stop on a pass without improvement, or on equal consecutive scores")
                        .value_parser(["improvement", "equality"]),
                )
                .arg(
                    arg!(--parallel "Score candidates on all cores")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    arg!(--explorer [EXPLORER] "How neighbor candidates are generated")
                        .value_parser(["pairwise", "sampled"]),
                )
                .arg(
                    arg!(--step [STEP] "Units moved per transfer")
                        .value_parser(clap::value_parser!(u32)),
                )
                .arg(
                    arg!(--samples [SAMPLES] "Transfers drawn per pass by the sampled explorer")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(--seed [SEED] "Random seed for the sampled explorer")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    arg!(--output [OUTPUT_FILE] "If set, the report is written to this file path instead of stdout")
                        .value_parser(clap::value_parser!(PathBuf)),
                ),
        )
        .subcommand(
            Command::new("seed")
                .about("Prints the initial allocation before local search")
                .arg(config_arg())
                .arg(deviation_arg())
                .arg(remainder_arg()),
        )
        .subcommand(
            Command::new("evaluate")
                .about("Scores a given allocation and checks it is feasible")
                .arg(
                    arg!(<ALLOCATION> "Comma separated units per group, e.g. 148,10,40,2")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(config_arg())
                .arg(deviation_arg()),
        )
}

fn main() {
    let matches = cli().get_matches();
    let Some((name, sub_m)) = matches.subcommand() else {
        eprintln!("Error: Missing subcommand");
        std::process::exit(1);
    };
    logging::init_tracing(
        sub_m
            .get_one::<String>("log-level")
            .map(String::as_str)
            .unwrap_or("info"),
    );

    if let Err(e) = match name {
        "balance" => balance(sub_m),
        "seed" => seed(sub_m),
        "evaluate" => evaluate(sub_m),
        _ => Err(anyhow!("Invalid subcommand")),
    } {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

pub fn balance(sub_m: &ArgMatches) -> Result<()> {
    let config = load_config(sub_m)?;
    config.validate()?;
    let instance = config.instance()?;
    let seed = initial_allocation(&instance, config.remainder())?;
    let search = LocalSearch::new(&instance, config.search())?;
    let mut explorer = config.explorer().build()?;

    info!(
        num_groups = instance.num_groups(),
        total = instance.total(),
        ?seed,
        "starting search"
    );
    let outcome = search.run(seed.clone(), &mut *explorer)?;
    if outcome.state == SearchState::Exhausted {
        warn!(
            passes = outcome.passes,
            "reporting best allocation found before the pass ceiling"
        );
    }

    let report = AllocationReport::new(&instance, seed, outcome);
    if let Some(violation) = &report.violation {
        warn!(%violation, "reporting an infeasible allocation");
    }
    let json = report.to_json()?;
    if let Some(path) = sub_m.get_one::<PathBuf>("output") {
        fs::write(path, json)?;
        println!("report written to: {:?}", path);
    } else {
        println!("{}", json);
    }
    Ok(())
}

pub fn seed(sub_m: &ArgMatches) -> Result<()> {
    let config = load_config(sub_m)?;
    let instance = config.instance()?;
    let seed = initial_allocation(&instance, config.remainder())?;
    println!("{}", EvaluationReport::new(&instance, seed).to_json()?);
    Ok(())
}

pub fn evaluate(sub_m: &ArgMatches) -> Result<()> {
    let config = load_config(sub_m)?;
    let instance = config.instance()?;
    let allocation = parse_allocation(
        sub_m
            .get_one::<String>("ALLOCATION")
            .ok_or_else(|| anyhow!("Missing allocation"))?,
    )?;

    let report = EvaluationReport::new(&instance, allocation);
    println!("{}", report.to_json()?);
    if let Some(violation) = report.violation {
        eprintln!("Allocation is infeasible: {}", violation);
        std::process::exit(1);
    }
    Ok(())
}

fn load_config(sub_m: &ArgMatches) -> Result<BalancerConfig> {
    let mut config = match sub_m.get_one::<String>("CONFIG") {
        Some(arg) => dejsonify::<BalancerConfig>(&read_json_arg(arg)?)
            .map_err(|e| anyhow!("Failed to parse config: {}", e))?,
        None => BalancerConfig::sample(),
    };
    apply_overrides(&mut config, sub_m)?;
    Ok(config)
}

/// Value of an optional argument, `None` also when the subcommand does not
/// define it.
fn opt<T>(sub_m: &ArgMatches, id: &str) -> Option<T>
where
    T: Clone + Send + Sync + 'static,
{
    sub_m.try_get_one::<T>(id).ok().flatten().cloned()
}

/// Command line flags take precedence over the config's own sections.
fn apply_overrides(config: &mut BalancerConfig, sub_m: &ArgMatches) -> Result<()> {
    match opt::<String>(sub_m, "deviation").as_deref() {
        Some("sample") => config.deviation = Some(Deviation::Sample),
        Some("population") => config.deviation = Some(Deviation::Population),
        Some(other) => return Err(anyhow!("Unknown deviation '{}'", other)),
        None => {}
    }
    match opt::<String>(sub_m, "remainder").as_deref() {
        Some("first") => config.remainder = Some(RemainderPolicy::FirstGroup),
        Some("largest") => config.remainder = Some(RemainderPolicy::LargestRemainder),
        Some(other) => return Err(anyhow!("Unknown remainder policy '{}'", other)),
        None => {}
    }

    let mut search = config.search();
    if let Some(max_passes) = opt::<u32>(sub_m, "max-passes") {
        search.max_passes = max_passes;
    }
    let tolerance = opt::<f64>(sub_m, "tolerance").unwrap_or(search.convergence.tolerance());
    search.convergence = match opt::<String>(sub_m, "convergence").as_deref() {
        Some("improvement") => Convergence::NoImprovement { tolerance },
        Some("equality") => Convergence::ScoreEquality { tolerance },
        Some(other) => return Err(anyhow!("Unknown convergence rule '{}'", other)),
        None => search.convergence.with_tolerance(tolerance),
    };
    if opt::<bool>(sub_m, "parallel").unwrap_or(false) {
        search.parallel = true;
    }
    config.search = Some(search);

    // switching kind starts from that kind's defaults
    let mut explorer = match opt::<String>(sub_m, "explorer").as_deref() {
        Some("pairwise") => ExplorerConfig::Pairwise { step: 1 },
        Some("sampled") => ExplorerConfig::Sampled {
            samples: DEFAULT_SAMPLES,
            step: 1,
            seed: 0,
        },
        Some(other) => return Err(anyhow!("Unknown explorer '{}'", other)),
        None => config.explorer(),
    };
    match &mut explorer {
        ExplorerConfig::Pairwise { step } => {
            if let Some(v) = opt::<u32>(sub_m, "step") {
                *step = v;
            }
        }
        ExplorerConfig::Sampled {
            samples,
            step,
            seed,
        } => {
            if let Some(v) = opt::<usize>(sub_m, "samples") {
                *samples = v;
            }
            if let Some(v) = opt::<u32>(sub_m, "step") {
                *step = v;
            }
            if let Some(v) = opt::<u64>(sub_m, "seed") {
                *seed = v;
            }
        }
    }
    config.explorer = Some(explorer);
    Ok(())
}

fn parse_allocation(s: &str) -> Result<Allocation> {
    s.split(',')
        .map(|units| {
            units
                .trim()
                .parse::<u32>()
                .map_err(|e| anyhow!("Invalid units '{}': {}", units, e))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sub_matches(args: &[&str]) -> ArgMatches {
        let matches = cli().try_get_matches_from(args).unwrap();
        matches.subcommand().unwrap().1.clone()
    }

    #[test]
    fn test_parse_allocation() {
        assert_eq!(parse_allocation("148,10, 40 ,2").unwrap(), vec![148, 10, 40, 2]);
        assert!(parse_allocation("148,-1").is_err());
        assert!(parse_allocation("").is_err());
    }

    #[test]
    fn test_defaults_to_sample_table() {
        let config = load_config(&sub_matches(&["manload", "balance"])).unwrap();
        assert_eq!(config.groups, BalancerConfig::sample().groups);
        assert_eq!(config.total, 200);
        assert_eq!(config.search(), manload_balancer::SearchConfig::default());
        assert_eq!(config.explorer(), ExplorerConfig::Pairwise { step: 1 });
    }

    #[test]
    fn test_overrides() {
        let config = load_config(&sub_matches(&[
            "manload",
            "balance",
            "--max-passes",
            "5",
            "--tolerance",
            "0.001",
            "--convergence",
            "equality",
            "--parallel",
            "--explorer",
            "sampled",
            "--samples",
            "8",
            "--seed",
            "11",
            "--remainder",
            "largest",
            "--deviation",
            "population",
        ]))
        .unwrap();
        let search = config.search();
        assert_eq!(search.max_passes, 5);
        assert_eq!(
            search.convergence,
            Convergence::ScoreEquality { tolerance: 0.001 }
        );
        assert!(search.parallel);
        assert_eq!(
            config.explorer(),
            ExplorerConfig::Sampled {
                samples: 8,
                step: 1,
                seed: 11
            }
        );
        assert_eq!(config.remainder(), RemainderPolicy::LargestRemainder);
        assert_eq!(config.deviation(), Deviation::Population);
    }

    #[test]
    fn test_inline_config_with_seed_subcommand() {
        let config = load_config(&sub_matches(&[
            "manload",
            "seed",
            r#"{"total":8,"groups":[{"demand":10,"rate":1,"capacity":1,"unit_cost":1},{"demand":10,"rate":1,"capacity":3,"unit_cost":1}]}"#,
        ]))
        .unwrap();
        let instance = config.instance().unwrap();
        assert_eq!(
            initial_allocation(&instance, config.remainder()).unwrap(),
            vec![2, 6]
        );
    }

    #[test]
    fn test_invalid_config_is_reported() {
        let err = load_config(&sub_matches(&["manload", "seed", "{\"total\": 1}"])).unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse config"));
    }

    #[test]
    fn test_cli_is_consistent() {
        cli().debug_assert();
    }
}
