//! Unit tests for qn-agent.

#[cfg(test)]
mod helpers {
    use qn_core::{AgentKey, ClassTag, NodeId, SimTime};

    use crate::{AgentId, AgentStore, DataRecorder};

    pub fn t(secs: f64) -> SimTime {
        SimTime::new(secs).unwrap()
    }

    /// A store and recorder holding one registered agent headed for node 2.
    pub fn one_agent(class: &'static str) -> (AgentStore, DataRecorder, AgentKey) {
        let mut store = AgentStore::new();
        let mut rec = DataRecorder::new();
        let id = AgentId::new(0, 0, ClassTag::from_static(class));
        let key = store.spawn(id.clone(), t(0.0), NodeId(2));
        rec.register(key, id).unwrap();
        (store, rec, key)
    }
}

// ── AgentStore ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod store_tests {
    use qn_core::{AgentKey, ClassTag, NodeId};

    use super::helpers::{one_agent, t};
    use crate::{AgentError, AgentId, AgentLocation, AgentStore};

    #[test]
    fn spawn_assigns_dense_keys() {
        let mut store = AgentStore::new();
        let a = store.spawn(AgentId::new(0, 0, ClassTag::DEFAULT), t(0.0), NodeId(1));
        let b = store.spawn(AgentId::new(0, 1, ClassTag::DEFAULT), t(1.0), NodeId(1));
        assert_eq!(a, AgentKey(0));
        assert_eq!(b, AgentKey(1));
        assert_eq!(store.len(), 2);
        assert_eq!(store.awaiting_entry(), 2);
        assert_eq!(store.in_transit(), 0);
        assert_eq!(store.in_flight(), 0);
    }

    #[test]
    fn unknown_key_is_an_error() {
        let store = AgentStore::new();
        assert_eq!(store.get(AgentKey(3)).unwrap_err(), AgentError::UnknownAgent(AgentKey(3)));
    }

    #[test]
    fn location_counts() {
        let (mut store, _, key) = one_agent("fast");
        assert_eq!((store.awaiting_entry(), store.in_flight()), (1, 0));

        store.set_location(key, AgentLocation::Waiting(NodeId(2))).unwrap();
        assert_eq!((store.awaiting_entry(), store.in_flight()), (0, 1));
        assert_eq!(store.get(key).unwrap().location().node(), Some(NodeId(2)));

        store.set_location(key, AgentLocation::InTransit { to: NodeId(3) }).unwrap();
        assert_eq!((store.in_transit(), store.in_flight()), (1, 1));

        store.set_location(key, AgentLocation::Departed).unwrap();
        assert_eq!((store.in_transit(), store.in_flight(), store.completed()), (0, 0, 1));
        assert!(store.get(key).unwrap().is_departed());
    }

    #[test]
    fn counts_track_a_long_run() {
        let mut store = AgentStore::new();
        for seq in 0..1_000 {
            let key = store.spawn(AgentId::new(0, seq, ClassTag::DEFAULT), t(f64::from(seq)), NodeId(1));
            store.set_location(key, AgentLocation::InService(NodeId(1))).unwrap();
            if seq < 990 {
                store.set_location(key, AgentLocation::Departed).unwrap();
            }
        }
        assert_eq!(store.completed(), 990);
        assert_eq!(store.in_flight(), 10);

        let scanned = store.iter().filter(|a| a.is_departed()).count();
        assert_eq!(scanned, store.completed());
    }

    #[test]
    fn set_location_on_unknown_key_fails() {
        let mut store = AgentStore::new();
        assert_eq!(
            store.set_location(AgentKey(0), AgentLocation::Departed).unwrap_err(),
            AgentError::UnknownAgent(AgentKey(0))
        );
        assert_eq!(store.completed(), 0);
    }

    #[test]
    fn id_display_and_order() {
        let a = AgentId::new(1, 0, ClassTag::from_static("slow"));
        let b = AgentId::new(1, 1, ClassTag::from_static("fast"));
        assert!(a < b);
        assert_eq!(a.to_string(), "(1, 0, slow)");
    }
}

// ── DataRecorder ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod recorder_tests {
    use qn_core::{AgentKey, ClassTag, NodeId};

    use super::helpers::{one_agent, t};
    use crate::{AgentError, AgentId, DataRecorder, HISTORY_COLUMNS};

    #[test]
    fn full_visit_lifecycle() {
        let (_, mut rec, key) = one_agent("fast");
        rec.record_arrival(key, NodeId(2), t(1.0), 1, 2).unwrap();
        rec.record_service_start(key, t(1.5)).unwrap();
        rec.record_departure(key, t(2.0)).unwrap();
        rec.seal(key).unwrap();

        let h = rec.by_key(key).unwrap();
        assert!(h.is_sealed());
        let r = h.records()[0];
        assert_eq!(r.arrival, t(1.0));
        assert_eq!(r.service_start, Some(t(1.5)));
        assert_eq!(r.departure, Some(t(2.0)));
        assert_eq!(r.queue_length_before, 1);
        assert_eq!(r.total_in_system, 2);
        assert_eq!(r.waiting_time(), Some(0.5));
        assert_eq!(h.sojourn_time(), Some(1.0));
    }

    #[test]
    fn sealed_history_rejects_writes() {
        let (_, mut rec, key) = one_agent("fast");
        rec.record_arrival(key, NodeId(2), t(0.0), 0, 1).unwrap();
        rec.record_service_start(key, t(0.0)).unwrap();
        rec.record_departure(key, t(1.0)).unwrap();
        rec.seal(key).unwrap();
        assert!(matches!(
            rec.record_arrival(key, NodeId(3), t(1.0), 0, 1),
            Err(AgentError::Sealed(_))
        ));
        assert!(matches!(rec.seal(key), Err(AgentError::Sealed(_))));
    }

    #[test]
    fn double_arrival_rejected() {
        let (_, mut rec, key) = one_agent("fast");
        rec.record_arrival(key, NodeId(2), t(0.0), 0, 1).unwrap();
        assert!(matches!(
            rec.record_arrival(key, NodeId(3), t(0.5), 0, 1),
            Err(AgentError::VisitStillOpen { open_at: NodeId(2), .. })
        ));
    }

    #[test]
    fn departure_requires_service_start() {
        let (_, mut rec, key) = one_agent("fast");
        rec.record_arrival(key, NodeId(2), t(0.0), 1, 2).unwrap();
        assert!(matches!(rec.record_departure(key, t(1.0)), Err(AgentError::NotStarted(_))));
    }

    #[test]
    fn times_cannot_run_backwards() {
        let (_, mut rec, key) = one_agent("fast");
        rec.record_arrival(key, NodeId(2), t(2.0), 0, 1).unwrap();
        assert!(matches!(
            rec.record_service_start(key, t(1.0)),
            Err(AgentError::OutOfOrder { .. })
        ));
        rec.record_service_start(key, t(2.0)).unwrap();
        assert!(matches!(
            rec.record_service_start(key, t(3.0)),
            Err(AgentError::AlreadyStarted(_))
        ));
    }

    #[test]
    fn seal_with_open_visit_rejected() {
        let (_, mut rec, key) = one_agent("fast");
        rec.record_arrival(key, NodeId(2), t(0.0), 0, 1).unwrap();
        assert!(matches!(rec.seal(key), Err(AgentError::SealWithOpenVisit { .. })));
    }

    #[test]
    fn iteration_skips_agents_without_visits() {
        let mut rec = DataRecorder::new();
        rec.register(AgentKey(0), AgentId::new(0, 0, ClassTag::from_static("slow"))).unwrap();
        rec.register(AgentKey(1), AgentId::new(1, 0, ClassTag::from_static("fast"))).unwrap();
        rec.record_arrival(AgentKey(1), NodeId(2), t(0.0), 0, 1).unwrap();

        assert_eq!(rec.len(), 1);
        let fast = ClassTag::from_static("fast");
        let slow = ClassTag::from_static("slow");
        assert_eq!(rec.class_histories(&fast).count(), 1);
        assert_eq!(rec.class_histories(&slow).count(), 0);
        assert!(rec.get(&AgentId::new(1, 0, fast)).is_some());
    }

    #[test]
    fn len_counts_agents_not_visits() {
        let mut rec = DataRecorder::new();
        rec.register(AgentKey(0), AgentId::new(0, 0, ClassTag::DEFAULT)).unwrap();
        rec.register(AgentKey(1), AgentId::new(0, 1, ClassTag::DEFAULT)).unwrap();
        assert!(rec.is_empty());

        rec.record_arrival(AgentKey(0), NodeId(2), t(0.0), 0, 1).unwrap();
        rec.record_service_start(AgentKey(0), t(0.0)).unwrap();
        rec.record_departure(AgentKey(0), t(1.0)).unwrap();
        rec.record_arrival(AgentKey(0), NodeId(3), t(1.0), 0, 1).unwrap();
        assert_eq!(rec.len(), 1);

        rec.record_arrival(AgentKey(1), NodeId(2), t(2.0), 0, 1).unwrap();
        assert_eq!(rec.len(), 2);
        assert_eq!(rec.len(), rec.iter().count());
    }

    #[test]
    fn out_of_order_registration_rejected() {
        let mut rec = DataRecorder::new();
        assert!(rec.register(AgentKey(1), AgentId::new(0, 0, ClassTag::DEFAULT)).is_err());
    }

    #[test]
    fn iter_by_id_sorts_by_identity() {
        let mut rec = DataRecorder::new();
        rec.register(AgentKey(0), AgentId::new(5, 0, ClassTag::DEFAULT)).unwrap();
        rec.register(AgentKey(1), AgentId::new(1, 0, ClassTag::DEFAULT)).unwrap();
        for k in [AgentKey(0), AgentKey(1)] {
            rec.record_arrival(k, NodeId(0), t(0.0), 0, 1).unwrap();
        }
        let origins: Vec<u32> = rec.iter_by_id().map(|h| h.id.origin).collect();
        assert_eq!(origins, vec![1, 5]);
    }

    #[test]
    fn time_between_nodes() {
        let (_, mut rec, key) = one_agent("slow");
        rec.record_arrival(key, NodeId(2), t(1.0), 0, 1).unwrap();
        rec.record_service_start(key, t(1.0)).unwrap();
        rec.record_departure(key, t(3.0)).unwrap();
        rec.record_arrival(key, NodeId(3), t(3.0), 0, 1).unwrap();
        rec.record_service_start(key, t(3.0)).unwrap();
        rec.record_departure(key, t(4.5)).unwrap();
        let h = rec.by_key(key).unwrap();
        assert_eq!(h.time_between(NodeId(2), NodeId(2)), Some(2.0));
        assert_eq!(h.time_between(NodeId(2), NodeId(3)), Some(3.5));
    }

    #[test]
    fn header_matches_columns() {
        assert_eq!(DataRecorder::header().split(',').count(), HISTORY_COLUMNS.len());
        assert!(DataRecorder::header().starts_with("node_id,arrival_time"));
    }
}
