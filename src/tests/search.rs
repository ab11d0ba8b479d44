//! AI search channel tests.

#[cfg(test)]
pub mod tests {
    use std::sync::{Arc, Mutex};

    use pretty_assertions::assert_eq;

    use crate::bus::{EventBus, StoreEvent};
    use crate::search::{get_server_snapshot, AiSearchChannel};
    use crate::testing::product;

    #[test]
    fn test_snapshot_pointer_stable_between_changes() {
        let bus = EventBus::new();
        let channel = AiSearchChannel::new();
        let _attached = channel.attach(&bus);

        let first = channel.get_snapshot();
        let second = channel.get_snapshot();
        assert!(Arc::ptr_eq(&first, &second));

        // Unrelated events leave it alone.
        bus.publish(StoreEvent::Cart);
        assert!(Arc::ptr_eq(&first, &channel.get_snapshot()));

        bus.publish(StoreEvent::product_search("laptops", vec![product("p-1", 999.0)]));
        let after = channel.get_snapshot();
        assert!(!Arc::ptr_eq(&first, &after));
        assert!(Arc::ptr_eq(&after, &channel.get_snapshot()));
        assert_eq!(after.query.as_deref(), Some("laptops"));
        assert_eq!(after.results.len(), 1);
        assert!(after.is_active);
    }

    #[test]
    fn test_clear_resets_and_notifies() {
        let bus = EventBus::new();
        let channel = AiSearchChannel::new();
        let _attached = channel.attach(&bus);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let _listener = {
            let seen = seen.clone();
            channel.subscribe(move |snapshot| seen.lock().unwrap().push(snapshot.is_active))
        };

        bus.publish(StoreEvent::product_search("headphones", Vec::new()));
        channel.clear();

        assert_eq!(*seen.lock().unwrap(), vec![true, false]);
        let cleared = channel.get_snapshot();
        assert!(Arc::ptr_eq(&cleared, &get_server_snapshot()));
        assert_eq!(cleared.query, None);
        assert!(cleared.results.is_empty());
    }

    #[test]
    fn test_server_snapshot_is_shared_default() {
        let a = get_server_snapshot();
        let b = get_server_snapshot();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!a.is_active);

        let channel = AiSearchChannel::new();
        assert!(Arc::ptr_eq(&channel.get_snapshot(), &a));
    }

    #[test]
    fn test_empty_result_search_is_still_active() {
        let bus = EventBus::new();
        let channel = AiSearchChannel::new();
        let _attached = channel.attach(&bus);

        bus.publish(StoreEvent::product_search("unobtainium", Vec::new()));
        let snapshot = channel.get_snapshot();
        assert!(snapshot.is_active);
        assert!(snapshot.results.is_empty());
    }

    #[test]
    fn test_panicking_listener_does_not_block_others() {
        let channel = AiSearchChannel::new();
        let calls = Arc::new(Mutex::new(0));
        let _bad = channel.subscribe(|_| panic!("render failed"));
        let _good = {
            let calls = calls.clone();
            channel.subscribe(move |_| *calls.lock().unwrap() += 1)
        };

        channel.clear();
        assert_eq!(*calls.lock().unwrap(), 1);
    }
}
