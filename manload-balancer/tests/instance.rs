use manload_balancer::{BalancerError, Deviation, Group, Instance};

fn sample_groups() -> Vec<Group> {
    vec![
        Group::from([200000, 200, 899, 5]),
        Group::from([10000, 20, 100, 10]),
        Group::from([100, 1, 40, 1]),
        Group::from([2000, 100, 20, 5]),
    ]
}

#[test]
fn test_new_rejects_degenerate_input() {
    assert_eq!(
        Instance::new(vec![], 10, Deviation::Sample).unwrap_err(),
        BalancerError::EmptyGroups
    );
    assert_eq!(
        Instance::new(sample_groups(), 0, Deviation::Sample).unwrap_err(),
        BalancerError::InvalidTotal
    );
    assert_eq!(
        Instance::new(sample_groups(), 3, Deviation::Sample).unwrap_err(),
        BalancerError::InsufficientTotal {
            total: 3,
            num_groups: 4
        }
    );
    let mut groups = sample_groups();
    groups[1].capacity = 0;
    assert_eq!(
        Instance::new(groups, 200, Deviation::Sample).unwrap_err(),
        BalancerError::InvalidGroup {
            index: 1,
            field: "capacity"
        }
    );
}

#[test]
fn test_max_units_fixed_at_construction() {
    let instance = Instance::new(sample_groups(), 200, Deviation::Sample).unwrap();
    assert_eq!(instance.max_units(), &[179.8, 10.0, 40.0, 4.0]);
    assert_eq!(instance.num_groups(), 4);
    assert_eq!(instance.total(), 200);
}

#[test]
fn test_dispersion_zero_when_ratios_equal() {
    // every group serves half its demand at 1 unit
    let groups = vec![Group::from([10, 5, 100, 1]); 3];
    let instance = Instance::new(groups, 3, Deviation::Sample).unwrap();
    assert_eq!(instance.service_ratios(&[1, 1, 1]), vec![0.5, 0.5, 0.5]);
    assert_eq!(instance.dispersion(&[1, 1, 1]), 0.0);
    assert!(instance.dispersion(&[2, 1, 0]) > 0.0);
}

#[test]
fn test_dispersion_formulas() {
    let instance = Instance::new(sample_groups(), 200, Deviation::Sample).unwrap();
    assert_eq!(
        instance.service_ratios(&[155, 8, 34, 3]),
        vec![0.775, 0.16, 0.34, 0.75]
    );
    assert!((instance.dispersion(&[155, 8, 34, 3]) - 0.3050512252065216).abs() < 1e-12);

    let instance = Instance::new(sample_groups(), 200, Deviation::Population).unwrap();
    let sample = 0.22449944320643644;
    let population = instance.dispersion(&[148, 10, 40, 2]);
    assert!((population - sample * (3.0f64 / 4.0).sqrt()).abs() < 1e-12);
}

#[test]
fn test_single_group_has_no_dispersion() {
    let instance = Instance::new(vec![Group::from([10, 1, 10, 1])], 5, Deviation::Sample).unwrap();
    assert_eq!(instance.dispersion(&[5]), 0.0);
}

#[test]
fn test_verify_allocation() {
    let instance = Instance::new(sample_groups(), 200, Deviation::Sample).unwrap();
    assert_eq!(instance.verify_allocation(&[148, 10, 40, 2]), Ok(()));
    assert_eq!(
        instance.verify_allocation(&[148, 10, 42]),
        Err(BalancerError::AllocationLengthMismatch {
            expected: 4,
            actual: 3
        })
    );
    assert_eq!(
        instance.verify_allocation(&[148, 10, 40, 3]),
        Err(BalancerError::AllocationSumMismatch {
            expected: 200,
            actual: 201
        })
    );
    assert_eq!(
        instance.verify_allocation(&[150, 10, 40, 0]),
        Err(BalancerError::ZeroEntry { index: 3 })
    );
    assert_eq!(
        instance.verify_allocation(&[145, 11, 40, 4]),
        Err(BalancerError::ExceedsMaxUnits {
            index: 1,
            units: 11,
            max_units: 10.0
        })
    );
    // the seed's first group sits inside its ceiling
    assert_eq!(instance.first_exceeding(&[155, 8, 34, 3]), None);
}
