use chrono::{Duration, Utc};
use hotline_core::session::{
    MessageType, NewSessionRequest, Priority, Session, SessionEngine, SessionStatus, SessionStore,
    StatsAggregator, SubscriptionTier,
};
use hotline_infrastructure::{CatalogQuotaGate, InMemorySessionStore, TierCatalog};
use std::sync::Arc;

fn request(title: &str) -> NewSessionRequest {
    NewSessionRequest {
        title: title.to_string(),
        description: "integration scenario".to_string(),
        tags: vec!["rust".to_string()],
        technical: None,
    }
}

fn harness() -> (Arc<InMemorySessionStore>, Arc<CatalogQuotaGate>, SessionEngine) {
    let store = Arc::new(InMemorySessionStore::new());
    let quota = Arc::new(CatalogQuotaGate::new(TierCatalog::default()));
    let engine = SessionEngine::new(store.clone(), quota.clone());
    (store, quota, engine)
}

#[tokio::test]
async fn full_lifecycle_from_open_to_rating() {
    let (_store, quota, engine) = harness();
    quota.register_tier("alice", SubscriptionTier::Enterprise).await;

    // Open: enterprise tier lands in the high-priority lane.
    let session = engine.create_session("alice", request("prod down")).await.unwrap();
    assert_eq!(session.priority, Priority::High);
    assert_eq!(session.status, SessionStatus::Waiting);

    // Dispatch: the session is visible in the waiting queue.
    let waiting = engine.list_waiting_sessions().await.unwrap();
    assert_eq!(waiting.len(), 1);

    // Assignment: expert picks it up.
    let session = engine.assign_expert(&session.id, "bob").await.unwrap();
    assert_eq!(session.status, SessionStatus::InProgress);
    assert!(engine
        .list_expert_sessions("bob")
        .await
        .unwrap()
        .iter()
        .any(|s| s.id == session.id));

    // Conversation: both participants post, outsiders cannot.
    engine
        .send_message(&session.id, "alice", "here is the trace", MessageType::UserMessage, None, None)
        .await
        .unwrap();
    let solution = engine
        .send_message(
            &session.id,
            "bob",
            "bump the pool size",
            MessageType::Solution,
            Some("pool.max = 64".to_string()),
            Some("toml".to_string()),
        )
        .await
        .unwrap();
    assert!(engine
        .send_message(&session.id, "mallory", "hi", MessageType::UserMessage, None, None)
        .await
        .unwrap_err()
        .is_access_denied());

    // Resolution, acceptance, closure, rating.
    engine.accept_solution(&session.id, &solution.id, "alice").await.unwrap();
    let session = engine.mark_resolved(&session.id, "bob", "pool exhausted").await.unwrap();
    assert_eq!(session.status, SessionStatus::Resolved);
    let session = engine.close_session(&session.id, "alice").await.unwrap();
    let session = engine
        .rate_satisfaction(&session.id, "alice", 5, Some("fast!".to_string()))
        .await
        .unwrap();
    assert_eq!(session.satisfaction_rating, Some(5));

    // The thread tells the whole story in order: open, join, resolve, close
    // system messages interleaved with the participant posts.
    let thread = engine.list_session_messages(&session.id, "alice").await.unwrap();
    let system_count = thread
        .iter()
        .filter(|m| m.message_type == MessageType::SystemMessage)
        .count();
    assert_eq!(system_count, 4);
    assert!(thread.windows(2).all(|w| w[0].created_at <= w[1].created_at));
}

#[tokio::test]
async fn quota_gate_blocks_free_tier_after_one_session() {
    let (_store, _quota, engine) = harness();

    // Unregistered user defaults to the free tier: one session per period.
    engine.create_session("carol", request("first")).await.unwrap();
    let err = engine.create_session("carol", request("second")).await.unwrap_err();

    assert!(err.is_quota_exceeded());
}

#[tokio::test]
async fn waiting_queue_interleaves_tiers_correctly() {
    let (_store, quota, engine) = harness();
    quota.register_tier("vip", SubscriptionTier::Vip).await;
    quota.register_tier("startup", SubscriptionTier::Startup).await;

    let normal = engine.create_session("startup", request("older normal")).await.unwrap();
    let high = engine.create_session("vip", request("newer high")).await.unwrap();

    let waiting = engine.list_waiting_sessions().await.unwrap();
    let ids: Vec<&str> = waiting.iter().map(|s| s.id.as_str()).collect();

    // Higher priority dispatches first even though it was created later.
    assert_eq!(ids, vec![&high.id, &normal.id]);
}

#[tokio::test]
async fn statistics_respect_the_date_window() {
    let (store, _quota, engine) = harness();

    let t0 = Utc::now();
    // Three sessions inside the window, one outside.
    for offset in [0, 5, 10] {
        let session = Session::new(
            format!("user-{offset}"),
            request("in range"),
            Priority::Normal,
            t0 + Duration::minutes(offset),
        );
        store.insert_session(session).await.unwrap();
    }
    let outside = Session::new(
        "user-out",
        request("out of range"),
        Priority::Normal,
        t0 - Duration::days(2),
    );
    store.insert_session(outside).await.unwrap();

    let stats = StatsAggregator::new(store.clone())
        .compute(Some(t0), Some(t0 + Duration::hours(1)))
        .await
        .unwrap();
    assert_eq!(stats.total_sessions, 3);
    assert_eq!(stats.resolved_sessions, 0);

    // Resolve one in-window session through the engine and re-aggregate.
    let sessions = engine.list_user_sessions("user-0").await.unwrap();
    let target = &sessions[0];
    engine.assign_expert(&target.id, "bob").await.unwrap();
    engine.mark_resolved(&target.id, "bob", "done").await.unwrap();

    let stats = StatsAggregator::new(store.clone())
        .compute(Some(t0), Some(t0 + Duration::hours(1)))
        .await
        .unwrap();
    assert_eq!(stats.resolved_sessions, 1);
    assert!(stats.average_resolution_time >= 0.0);
}

#[tokio::test]
async fn stats_over_empty_store_are_all_zero() {
    let (store, _quota, _engine) = harness();

    let stats = StatsAggregator::new(store).compute(None, None).await.unwrap();

    assert_eq!(stats.total_sessions, 0);
    assert_eq!(stats.resolved_sessions, 0);
    assert_eq!(stats.average_response_time, 0.0);
    assert_eq!(stats.average_resolution_time, 0.0);
    assert_eq!(stats.satisfaction_average, 0.0);
}
