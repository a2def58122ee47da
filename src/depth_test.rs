use crate::depth::Depth;

#[test]
fn test_depth_empty() {
    let depth = Depth::new();
    assert_eq!(depth.samples(), 0);
    assert_eq!(depth.min(), 0);
    assert_eq!(depth.max(), 0);
    assert_eq!(depth.mean(), 0);
    assert!(depth.percentiles().is_empty());
}

#[test]
fn test_depth_sample() {
    let mut depth = Depth::new();
    for d in [3, 2, 3, 4, 3].iter() {
        depth.sample(*d);
    }
    assert_eq!(depth.samples(), 5);
    assert_eq!(depth.min(), 2);
    assert_eq!(depth.max(), 4);
    assert_eq!(depth.mean(), 3);

    // 2 -> 20%, 3 -> 80%, 4 -> 100%
    assert_eq!(depth.percentiles(), vec![(100, 4)]);
}

#[test]
fn test_depth_zero() {
    // an empty tree samples a single leaf at the root.
    let mut depth = Depth::new();
    depth.sample(0);
    assert_eq!(depth.samples(), 1);
    assert_eq!(depth.min(), 0);
    assert_eq!(depth.max(), 0);
    assert_eq!(depth.percentiles(), vec![(100, 0)]);
}

#[test]
fn test_depth_percentiles() {
    let mut depth = Depth::new();
    (0..90).for_each(|_| depth.sample(5));
    (0..5).for_each(|_| depth.sample(6));
    (0..5).for_each(|_| depth.sample(7));

    assert_eq!(depth.percentiles(), vec![(90, 5), (95, 6), (100, 7)]);
    assert_eq!(
        depth.json(),
        "{ \"samples\": 100, \"min\": 5, \"mean\": 5, \"max\": 7, \
         \"percentiles\": { \"90\": 5, \"95\": 6, \"100\": 7 } }"
    );
}
