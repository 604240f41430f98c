//! Unit tests for qn-core primitives.

#[cfg(test)]
mod ids {
    use crate::{AgentKey, EdgeId, EdgeType, NodeId};

    #[test]
    fn index_roundtrip() {
        let id = AgentKey(42);
        assert_eq!(id.index(), 42);
    }

    #[test]
    fn ordering() {
        assert!(NodeId(0) < NodeId(1));
        assert!(EdgeType(100) > EdgeType(99));
    }

    #[test]
    fn display() {
        assert_eq!(NodeId(7).to_string(), "NodeId(7)");
        assert_eq!(EdgeId(3).to_string(), "EdgeId(3)");
    }
}

#[cfg(test)]
mod time {
    use crate::{CoreError, SimTime};

    #[test]
    fn rejects_negative_and_nan() {
        assert_eq!(SimTime::new(-1.0), Err(CoreError::InvalidTime(-1.0)));
        assert!(SimTime::new(f64::NAN).is_err());
        assert!(SimTime::new(f64::INFINITY).is_err());
    }

    #[test]
    fn negative_zero_equals_zero() {
        let t = SimTime::new(-0.0).unwrap();
        assert_eq!(t, SimTime::ZERO);
        assert_eq!(t.cmp(&SimTime::ZERO), std::cmp::Ordering::Equal);
    }

    #[test]
    fn ordering_is_numeric() {
        let a = SimTime::new(0.5).unwrap();
        let b = SimTime::new(1.25).unwrap();
        assert!(a < b);
        assert_eq!(b.since(a), 0.75);
        assert_eq!(a.since(b), -0.75);
    }
}

#[cfg(test)]
mod class {
    use crate::{ClassTag, CoreError};

    #[test]
    fn empty_tag_rejected() {
        assert_eq!(ClassTag::new(""), Err(CoreError::EmptyClassTag));
    }

    #[test]
    fn static_and_owned_compare_equal() {
        let a = ClassTag::from_static("fast");
        let b = ClassTag::new(String::from("fast")).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "fast");
    }

    #[test]
    fn default_tag() {
        assert_eq!(ClassTag::default().as_str(), "default");
    }
}

#[cfg(test)]
mod rng {
    use crate::SimRng;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = SimRng::new(7);
        let mut b = SimRng::new(7);
        for _ in 0..100 {
            assert_eq!(a.random::<u64>(), b.random::<u64>());
        }
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = SimRng::new(1);
        let mut b = SimRng::new(2);
        let xs: Vec<u64> = (0..8).map(|_| a.random()).collect();
        let ys: Vec<u64> = (0..8).map(|_| b.random()).collect();
        assert_ne!(xs, ys);
    }

    #[test]
    fn child_seeds_are_reproducible_and_distinct() {
        let mut root_a = SimRng::new(9);
        let mut root_b = SimRng::new(9);
        let xs: Vec<u64> = (0..4).map(|i| root_a.child_seed(i)).collect();
        let ys: Vec<u64> = (0..4).map(|i| root_b.child_seed(i)).collect();
        assert_eq!(xs, ys);
        assert!(xs.windows(2).all(|w| w[0] != w[1]));
    }
}
