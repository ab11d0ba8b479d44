//! Optimistic likes tests.

#[cfg(test)]
pub mod tests {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;

    use crate::bus::{EventBus, StoreEvent};
    use crate::cache::{CacheStatus, LikesCache};
    use crate::core::cart::CartSnapshot;
    use crate::core::likes::{LikesIntent, LikesSnapshot};
    use crate::testing::{RecordingNotifier, ScriptedBackend};

    fn setup(initial: &[&str]) -> (Arc<ScriptedBackend>, Arc<LikesCache>, Arc<RecordingNotifier>) {
        let backend = ScriptedBackend::new(CartSnapshot::empty());
        backend.set_likes(LikesSnapshot::new(initial.iter().copied()));
        let notifier = RecordingNotifier::new();
        let cache = Arc::new(LikesCache::for_backend(backend.clone(), notifier.clone()));
        (backend, cache, notifier)
    }

    #[test]
    fn test_toggle_twice_is_identity() {
        let start = LikesSnapshot::new(["a", "b"]);
        let once = LikesIntent::toggle("c").apply(&start);
        assert!(once.contains("c"));
        let twice = LikesIntent::toggle("c").apply(&once);
        assert_eq!(twice, start);

        let removed = LikesIntent::toggle("a").apply(&start);
        assert!(!removed.contains("a"));
        assert_eq!(LikesIntent::toggle("a").apply(&removed), start);
    }

    #[tokio::test]
    async fn test_cache_toggle_twice_returns_to_original() {
        let (_backend, cache, _) = setup(&["p-1"]);
        let original = cache.read().await.unwrap();

        cache.toggle_like("p-2").await.unwrap();
        assert!(cache.is_liked("p-2"));
        cache.toggle_like("p-2").await.unwrap();

        assert_eq!(*cache.snapshot(), *original);
    }

    #[tokio::test]
    async fn test_rejected_toggle_rolls_back() {
        let (backend, cache, notifier) = setup(&["p-1", "p-3"]);
        let before = cache.read().await.unwrap();

        backend.fail_commits(true);
        assert!(cache.toggle_like("p-1").await.is_err());

        assert_eq!(*cache.snapshot(), *before);
        assert!(cache.is_liked("p-1"));
        assert_eq!(notifier.errors().len(), 1);
    }

    #[tokio::test]
    async fn test_optimistic_toggle_visible_while_pending() {
        let (backend, cache, _) = setup(&[]);
        cache.read().await.unwrap();

        backend.gate_commits();
        let task = {
            let cache = cache.clone();
            tokio::spawn(async move { cache.toggle_like("p-9").await })
        };
        tokio::task::yield_now().await;
        assert!(cache.is_liked("p-9"));

        backend.release_commit();
        task.await.unwrap().unwrap();
        assert_eq!(backend.commits(), vec!["toggle p-9".to_string()]);
    }

    #[tokio::test]
    async fn test_likes_event_invalidates_only_likes() {
        let (backend, cache, _) = setup(&[]);
        let bus = EventBus::new();
        let _subscription = cache.listen(&bus);
        cache.read().await.unwrap();

        bus.publish(StoreEvent::Cart);
        assert_eq!(cache.peek().status, CacheStatus::Fresh);

        backend.set_likes(LikesSnapshot::new(["p-5"]));
        bus.publish(StoreEvent::Likes);
        assert_eq!(cache.peek().status, CacheStatus::Stale);
        assert!(cache.read().await.unwrap().contains("p-5"));
    }

    #[tokio::test]
    async fn test_listener_outlived_by_bus_is_inert() {
        let (_backend, cache, _) = setup(&[]);
        let bus = EventBus::new();
        let subscription = cache.listen(&bus);
        drop(cache);

        let report = bus.publish(StoreEvent::Likes);
        assert_eq!(report.failed, 0);
        drop(subscription);
        assert_eq!(bus.subscriber_count(), 0);
    }
}
