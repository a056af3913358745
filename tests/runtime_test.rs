//! Tests for the coordinator task.

use strictly_relay::{
    ClientEvent, ConnectionId, CoordinatorStopped, MoveRequest, Phase, RecordingTransport,
    ServerEvent, spawn_coordinator,
};

fn join(game: &str) -> ClientEvent {
    ClientEvent::JoinGame(game.into())
}

fn play(game: &str, index: usize) -> ClientEvent {
    ClientEvent::MakeMove(MoveRequest {
        game_id: game.into(),
        index,
    })
}

#[tokio::test]
async fn test_events_applied_in_submission_order() {
    let transport = RecordingTransport::new();
    let handle = spawn_coordinator(transport.clone());

    handle.submit("x".into(), join("g1")).unwrap();
    handle.submit("o".into(), join("g1")).unwrap();
    handle.submit("x".into(), play("g1", 4)).unwrap();
    // Out of turn, dropped.
    handle.submit("x".into(), play("g1", 0)).unwrap();
    handle.submit("o".into(), play("g1", 0)).unwrap();

    let session = handle.inspect("g1".into()).await.unwrap().unwrap();
    assert_eq!(session.phase(), Phase::Active);
    assert_eq!(session.current_player(), Some(&ConnectionId::from("x")));

    let inbox = transport.inbox(&"o".into());
    assert_eq!(inbox.len(), 3);
    assert!(matches!(inbox[0], ServerEvent::GameStart { .. }));
    assert!(matches!(inbox[2], ServerEvent::MoveMade { index: 0, .. }));
}

#[tokio::test]
async fn test_disconnect_is_applied_by_the_task() {
    let transport = RecordingTransport::new();
    let handle = spawn_coordinator(transport.clone());

    handle.submit("x".into(), join("g1")).unwrap();
    handle.submit("x".into(), join("g2")).unwrap();
    assert_eq!(handle.session_count().await.unwrap(), 2);

    handle.disconnect("x".into()).unwrap();
    assert_eq!(handle.session_count().await.unwrap(), 0);
    assert!(handle.inspect("g1".into()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_concurrent_submitters_never_overfill() {
    let transport = RecordingTransport::new();
    let handle = spawn_coordinator(transport.clone());

    let mut tasks = Vec::new();
    for n in 0..16 {
        let handle = handle.clone();
        tasks.push(tokio::spawn(async move {
            handle
                .submit(format!("conn-{n}").into(), join("crowded"))
                .unwrap();
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    let session = handle.inspect("crowded".into()).await.unwrap().unwrap();
    assert_eq!(session.players().len(), 2);
    assert_eq!(session.phase(), Phase::Active);

    let turned_away = (0..16)
        .filter(|n| transport.inbox(&format!("conn-{n}").into()) == vec![ServerEvent::GameFull])
        .count();
    assert_eq!(turned_away, 14);
}

#[tokio::test]
async fn test_shutdown_returns_store_and_stops_handles() {
    let transport = RecordingTransport::new();
    let handle = spawn_coordinator(transport);
    let other = handle.clone();

    handle.submit("x".into(), join("g1")).unwrap();
    let store = handle.shutdown().await.unwrap();
    assert_eq!(store.len(), 1);

    assert_eq!(other.session_count().await, Err(CoordinatorStopped));
}
