use manload_balancer::{initial_allocation, Deviation, Group, Instance, RemainderPolicy};
use rand::{rngs::SmallRng, Rng, SeedableRng};

fn sample_instance() -> Instance {
    Instance::new(
        vec![
            Group::from([200000, 200, 899, 5]),
            Group::from([10000, 20, 100, 10]),
            Group::from([100, 1, 40, 1]),
            Group::from([2000, 100, 20, 5]),
        ],
        200,
        Deviation::Sample,
    )
    .unwrap()
}

#[test]
fn test_shortfall_goes_to_first_group() {
    // floors are [153, 8, 34, 3], two units short
    assert_eq!(
        initial_allocation(&sample_instance(), RemainderPolicy::FirstGroup).unwrap(),
        vec![155, 8, 34, 3]
    );
}

#[test]
fn test_largest_remainder() {
    // fractional shares are .81, .55, .22, .42
    assert_eq!(
        initial_allocation(&sample_instance(), RemainderPolicy::LargestRemainder).unwrap(),
        vec![154, 9, 34, 3]
    );
}

#[test]
fn test_largest_remainder_ties_prefer_lower_index() {
    let instance = Instance::new(vec![Group::from([1, 1, 1, 1]); 3], 4, Deviation::Sample).unwrap();
    assert_eq!(
        initial_allocation(&instance, RemainderPolicy::LargestRemainder).unwrap(),
        vec![2, 1, 1]
    );
    assert_eq!(
        initial_allocation(&instance, RemainderPolicy::FirstGroup).unwrap(),
        vec![2, 1, 1]
    );
}

#[test]
fn test_seed_sums_to_total() {
    let mut rng = SmallRng::seed_from_u64(42);
    for _ in 0..500 {
        let num_groups = rng.gen_range(1..12);
        let groups = (0..num_groups)
            .map(|_| Group {
                demand: rng.gen_range(1..100_000),
                rate: rng.gen_range(1..500),
                capacity: rng.gen_range(1..5_000),
                unit_cost: rng.gen_range(1..50),
            })
            .collect::<Vec<Group>>();
        let total = rng.gen_range(num_groups as u32..10_000);
        let instance = Instance::new(groups, total, Deviation::Sample).unwrap();
        for policy in [RemainderPolicy::FirstGroup, RemainderPolicy::LargestRemainder] {
            let seed = initial_allocation(&instance, policy).unwrap();
            assert_eq!(seed.len(), num_groups);
            assert_eq!(seed.iter().map(|&u| u as u64).sum::<u64>(), total as u64);
        }
    }
}
