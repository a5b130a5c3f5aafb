//! Socket-based integration tests for the client against a scripted server.

use std::time::Duration;

use arena_client::WsSession;
use arena_shared::config::ArenaSettings;
use arena_shared::math::Vec2;
use arena_shared::render::{DrawCall, RecordingRenderer};
use arena_tests::{bind_ephemeral, sample_snapshot};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}

/// Full round trip: join, receive snapshots, render, send actions.
#[tokio::test]
async fn client_server_full_roundtrip() -> anyhow::Result<()> {
    init_tracing();
    let (server, cfg) = bind_ephemeral().await?;

    let server_handle = tokio::spawn(async move {
        let mut conn = server.accept_one().await?;
        let join = conn.recv_json(Duration::from_secs(2)).await?;

        for (i, ts) in [10_000, 10_050, 10_100].into_iter().enumerate() {
            conn.send_snapshot(&sample_snapshot(ts, 100.0 + i as f32, 200.0))
                .await?;
        }

        let mut actions = Vec::new();
        while actions.len() < 3 {
            match conn.recv_json(Duration::from_secs(2)).await? {
                Some(v) => actions.push(v),
                None => break,
            }
        }
        conn.close().await?;
        Ok::<_, anyhow::Error>((join, actions))
    });

    let mut session = WsSession::connect(&cfg, ArenaSettings::default()).await?;
    let mut renderer = RecordingRenderer::default();
    let mut last_view = None;

    for _ in 0..200 {
        session.recv_timeout(Duration::from_millis(5)).await;
        if let Some(view) = session.frame(&mut renderer) {
            last_view = Some(view);
        }
        if !session.is_open() {
            break;
        }
    }

    let (join, actions) = server_handle.await??;

    let join = join.expect("server should see JoinGame");
    assert_eq!(join["type"], "JoinGame");
    assert_eq!(join["username"], "tester");

    assert_eq!(actions.len(), 3, "expected three GameActions, got {actions:?}");
    for action in &actions {
        assert_eq!(action["type"], "GameAction");
        assert_eq!(action["forward"], false);
        assert!(action["aim_direction"].is_number());
    }

    assert_eq!(session.client.snaps.len(), 3);
    assert_eq!(session.client.stats.snapshots_received, 3);

    let view = last_view.expect("at least one frame should have rendered");
    assert_eq!(view.player, Vec2::new(400.0, 300.0));
    assert!(renderer
        .calls
        .iter()
        .any(|c| matches!(c, DrawCall::Enemy { label, .. } if label == "rival")));

    Ok(())
}

/// A garbage frame is dropped and the session keeps going.
#[tokio::test]
async fn malformed_frame_is_survivable() -> anyhow::Result<()> {
    init_tracing();
    let (server, cfg) = bind_ephemeral().await?;

    let server_handle = tokio::spawn(async move {
        let mut conn = server.accept_one().await?;
        conn.recv_json(Duration::from_secs(2)).await?;
        conn.send_text("{definitely not a snapshot").await?;
        conn.send_snapshot(&sample_snapshot(500, 1.0, 2.0)).await?;
        conn.send_snapshot(&sample_snapshot(300, 9.0, 9.0)).await?;
        // Wait for the client to render and answer before closing.
        conn.recv_json(Duration::from_secs(2)).await?;
        conn.close().await?;
        Ok::<_, anyhow::Error>(())
    });

    let mut session = WsSession::connect(&cfg, ArenaSettings::default()).await?;
    let mut renderer = RecordingRenderer::default();
    for _ in 0..200 {
        session.recv_timeout(Duration::from_millis(5)).await;
        session.frame(&mut renderer);
        if !session.is_open() {
            break;
        }
    }
    server_handle.await??;

    assert_eq!(session.client.stats.malformed_dropped, 1);
    assert_eq!(session.client.snaps.len(), 2);
    assert_eq!(session.client.snaps.oldest().unwrap().timestamp, 300);

    // Let the render target run past everything buffered.
    tokio::time::sleep(Duration::from_millis(150)).await;

    // Connection is gone; the newest snapshot is still drawn.
    let view = session.frame(&mut renderer).expect("stale state stays visible");
    assert_eq!(view.timestamp, 500);
    assert_eq!(view.world_player, Vec2::new(1.0, 2.0));
    Ok(())
}

/// Until a snapshot arrives the client only sends its join.
#[tokio::test]
async fn no_actions_before_first_snapshot() -> anyhow::Result<()> {
    init_tracing();
    let (server, cfg) = bind_ephemeral().await?;

    let server_handle = tokio::spawn(async move {
        let mut conn = server.accept_one().await?;
        let mut seen = Vec::new();
        while let Some(v) = conn.recv_json(Duration::from_millis(150)).await? {
            seen.push(v);
        }
        conn.close().await?;
        Ok::<_, anyhow::Error>(seen)
    });

    let mut session = WsSession::connect(&cfg, ArenaSettings::default()).await?;
    let mut renderer = RecordingRenderer::default();
    for _ in 0..200 {
        session.recv_timeout(Duration::from_millis(5)).await;
        assert!(session.frame(&mut renderer).is_none());
        if !session.is_open() {
            break;
        }
    }

    let seen = server_handle.await??;
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0]["type"], "JoinGame");
    assert!(renderer.calls.is_empty());
    Ok(())
}

/// Connecting to a dead port is an error, not a hang.
#[tokio::test]
async fn connect_refused_is_an_error() -> anyhow::Result<()> {
    let (server, cfg) = bind_ephemeral().await?;
    drop(server);
    assert!(WsSession::connect(&cfg, ArenaSettings::default()).await.is_err());
    Ok(())
}
