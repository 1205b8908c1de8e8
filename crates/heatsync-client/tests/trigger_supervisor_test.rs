//! Trigger supervisor against a local WebSocket server.

use std::time::Duration;

use futures_util::SinkExt;
use heatsync_client::TriggerSupervisor;
use heatsync_core::{LinkState, SystemEnv, TriggerConfig, TriggerEvent};
use heatsync_proto::{RacePointer, StartScope, TriggerCommand};
use tokio::{net::TcpListener, sync::broadcast, time::timeout};
use tokio_tungstenite::{accept_async, tungstenite::Message};

async fn next_event(rx: &mut broadcast::Receiver<TriggerEvent>) -> TriggerEvent {
    timeout(Duration::from_secs(5), rx.recv()).await.expect("event within 5s").unwrap()
}

fn config(url: String) -> TriggerConfig {
    TriggerConfig { url, reconnect_delay: Duration::from_millis(50) }
}

#[tokio::test]
async fn forwards_messages_and_reconnects_after_close() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}", listener.local_addr().unwrap());

    let server = tokio::spawn(async move {
        // First session: one start, one garbage frame, one stop, then close.
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        ws.send(Message::text("cmd=start&event=4&heat=2&source=gun")).await.unwrap();
        ws.send(Message::text("not a trigger frame")).await.unwrap();
        ws.send(Message::binary(b"cmd=stop".to_vec())).await.unwrap();
        ws.close(None).await.unwrap();
        drop(ws);

        // Second session proves the reconnect.
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        ws.send(Message::text("cmd=reset")).await.unwrap();
        ws
    });

    let supervisor = TriggerSupervisor::new(config(url), SystemEnv);
    let mut rx = supervisor.subscribe();
    let handle = supervisor.spawn();

    assert_eq!(next_event(&mut rx).await, TriggerEvent::Link(LinkState::Connecting));
    assert_eq!(next_event(&mut rx).await, TriggerEvent::Link(LinkState::Connected));

    let TriggerEvent::Command(start) = next_event(&mut rx).await else {
        panic!("expected a command");
    };
    assert_eq!(start.command, TriggerCommand::Start);
    assert_eq!(start.start_scope(), StartScope::Race(RacePointer::new("4", "2")));
    assert_eq!(start.source.as_deref(), Some("gun"));

    let TriggerEvent::Command(stop) = next_event(&mut rx).await else {
        panic!("expected a command");
    };
    assert_eq!(stop.command, TriggerCommand::Stop);

    assert_eq!(next_event(&mut rx).await, TriggerEvent::Link(LinkState::Disconnected));
    assert_eq!(next_event(&mut rx).await, TriggerEvent::Link(LinkState::Connecting));
    assert_eq!(next_event(&mut rx).await, TriggerEvent::Link(LinkState::Connected));

    let TriggerEvent::Command(reset) = next_event(&mut rx).await else {
        panic!("expected a command");
    };
    assert_eq!(reset.command, TriggerCommand::Reset);

    let _ws = server.await.unwrap();
    handle.shutdown();
}

#[tokio::test]
async fn keeps_retrying_while_device_is_absent() {
    // Bind then drop to get a port nothing listens on.
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    };
    let supervisor = TriggerSupervisor::new(config(format!("ws://127.0.0.1:{port}")), SystemEnv);
    let mut rx = supervisor.subscribe();
    let handle = supervisor.spawn();

    let mut attempts = 0;
    while attempts < 3 {
        match next_event(&mut rx).await {
            TriggerEvent::Link(LinkState::Connecting) => attempts += 1,
            TriggerEvent::Link(LinkState::Disconnected) => {},
            other => panic!("unexpected {other:?}"),
        }
    }

    handle.shutdown();
}
