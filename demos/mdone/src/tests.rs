//! Tests for scenario loading and network construction.

#[cfg(test)]
mod scenario_tests {
    use std::io::Write;

    use qn_core::EdgeType;

    use crate::scenario::{ENTRY_EDGES, FAST, FIRST_SERVER, SECOND_SERVER, SLOW, Scenario, ScenarioFile};

    fn file_with(json: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, "{json}").unwrap();
        f
    }

    #[test]
    fn presets_validate() {
        Scenario::preset(1).validate().unwrap();
        Scenario::preset(2).validate().unwrap();
        assert_eq!(Scenario::preset(2).events, 20_000);
    }

    #[test]
    fn bad_node_count_rejected() {
        assert!(Scenario::preset(3).validate().is_err());
        let s = ScenarioFile::default().resolve(Some(0));
        assert!(s.validate().is_err());
    }

    #[test]
    fn missing_fields_come_from_the_chosen_preset() {
        let f = file_with(r#"{ "nodes": 2, "seed": 9 }"#);
        let s = ScenarioFile::load(f.path()).unwrap().resolve(None);
        let two = Scenario::preset(2);
        assert_eq!((s.nodes, s.seed), (2, 9));
        assert_eq!(s.events, two.events);
        assert_eq!(s.slow_rate, two.slow_rate);
        assert_eq!(s.second_service, two.second_service);
    }

    #[test]
    fn nodes_flag_overrides_the_file() {
        let f = file_with(r#"{ "nodes": 2, "events": 500 }"#);
        let s = ScenarioFile::load(f.path()).unwrap().resolve(Some(1));
        assert_eq!(s.nodes, 1);
        assert_eq!(s.events, 500);
        assert_eq!(s.slow_rate, Scenario::preset(1).slow_rate);
    }

    #[test]
    fn unknown_fields_rejected() {
        let f = file_with(r#"{ "node": 2 }"#);
        assert!(ScenarioFile::load(f.path()).is_err());
    }

    #[test]
    fn bundled_two_node_file_matches_preset() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/scenarios/two_node.json");
        let s = ScenarioFile::load(std::path::Path::new(path)).unwrap().resolve(None);
        let two = Scenario::preset(2);
        assert_eq!((s.nodes, s.events, s.seed), (two.nodes, two.events, two.seed));
        assert_eq!(s.fast_rate, two.fast_rate);
    }

    #[test]
    fn second_server_only_in_two_node_layout() {
        let one = Scenario::preset(1).topology().unwrap();
        assert!(one.is_sink(FIRST_SERVER));
        assert!(!one.contains(SECOND_SERVER));

        let two = Scenario::preset(2).topology().unwrap();
        let edge = two.find_edge(FIRST_SERVER, SECOND_SERVER).unwrap();
        assert_eq!(two.edge(edge).unwrap().edge_type, EdgeType(3));
        assert!(two.is_sink(SECOND_SERVER));
    }

    #[test]
    fn short_run_produces_both_classes() {
        // One-node rates keep the slow class frequent enough to show up.
        let s = Scenario { nodes: 2, events: 3_000, ..Scenario::preset(1) };
        let mut sim = s.build(s.seed).unwrap();
        sim.initialize(&ENTRY_EDGES).unwrap();
        assert_eq!(sim.simulate(s.events).unwrap(), s.events);

        let rec = sim.recorder();
        assert!(rec.class_histories(&FAST).count() > 0);
        assert!(rec.class_histories(&SLOW).count() > 0);
        for h in rec.iter().filter(|h| h.is_sealed()) {
            let nodes: Vec<_> = h.records().iter().map(|r| r.node).collect();
            assert_eq!(&nodes[1..], [FIRST_SERVER, SECOND_SERVER]);
        }
    }
}
