use manload_balancer::{BalancerError, NeighborExplorer, PairwiseTransfer, SampledTransfer};

#[test]
fn test_pairwise_transfer_order() {
    let mut explorer = PairwiseTransfer::default();
    assert_eq!(
        explorer.neighbors(&[2, 0, 1]),
        vec![vec![1, 1, 1], vec![1, 0, 2], vec![3, 0, 0], vec![2, 1, 0]]
    );
}

#[test]
fn test_pairwise_transfer_step() {
    let mut explorer = PairwiseTransfer::new(3).unwrap();
    assert_eq!(explorer.neighbors(&[3, 2]), vec![vec![0, 5]]);
    assert!(matches!(
        PairwiseTransfer::new(0),
        Err(BalancerError::InvalidExplorer { .. })
    ));
}

#[test]
fn test_sampled_transfer_conserves_total() {
    let mut explorer = SampledTransfer::new(7, 64, 1).unwrap();
    let current = vec![5, 1, 9, 3, 2];
    let candidates = explorer.neighbors(&current);
    assert!(!candidates.is_empty());
    for candidate in candidates.iter() {
        assert_eq!(candidate.len(), current.len());
        assert_eq!(candidate.iter().sum::<u32>(), 20);
        let changed = candidate
            .iter()
            .zip(current.iter())
            .filter(|(a, b)| a != b)
            .count();
        assert_eq!(changed, 2);
    }
}

#[test]
fn test_sampled_transfer_is_reproducible() {
    let current = vec![4, 4, 4, 4];
    let a = SampledTransfer::new(99, 10, 1).unwrap().neighbors(&current);
    let b = SampledTransfer::new(99, 10, 1).unwrap().neighbors(&current);
    assert_eq!(a, b);
    assert!(SampledTransfer::new(99, 0, 1).is_err());
    assert!(SampledTransfer::new(99, 1, 1).unwrap().neighbors(&[4]).is_empty());
}
