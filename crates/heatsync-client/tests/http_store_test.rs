//! HTTP store against a canned one-shot server.

use heatsync_client::HttpStore;
use heatsync_core::{Store, StoreError};
use heatsync_proto::{LaneNumber, LaneReadiness, RacePointer, RaceResult, SwimmerId};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
    task::JoinHandle,
};

/// Request as seen by the server: request line plus body.
#[derive(Debug)]
struct Seen {
    line: String,
    body: String,
}

/// Serve exactly one request with `status` and `body`.
async fn serve_once(status: u16, body: &'static str) -> (String, JoinHandle<Seen>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/exec", listener.local_addr().unwrap());

    let task = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        let header_end = loop {
            let n = socket.read(&mut chunk).await.unwrap();
            assert!(n > 0, "client closed before sending headers");
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };

        let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
        let content_length = head
            .lines()
            .find_map(|l| {
                let (name, value) = l.split_once(':')?;
                name.eq_ignore_ascii_case("content-length").then(|| value.trim().parse().ok())?
            })
            .unwrap_or(0usize);
        while buf.len() < header_end + content_length {
            let n = socket.read(&mut chunk).await.unwrap();
            buf.extend_from_slice(&chunk[..n]);
        }

        let reply = format!(
            "HTTP/1.1 {status} X\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(reply.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();

        Seen {
            line: head.lines().next().unwrap_or_default().to_string(),
            body: String::from_utf8_lossy(&buf[header_end..]).to_string(),
        }
    });
    (url, task)
}

fn lane(n: u8) -> LaneNumber {
    LaneNumber::new(n).unwrap()
}

#[tokio::test]
async fn current_pointer_accepts_numeric_identifiers() {
    let (url, server) = serve_once(200, r#"{"ok":true,"event":3,"heat":"1"}"#).await;
    let store = HttpStore::new(url).unwrap();

    let pointer = store.current_pointer().await.unwrap();
    assert_eq!(pointer, Some(RacePointer::new("3", "1")));

    let seen = server.await.unwrap();
    assert!(seen.line.starts_with("GET /exec?action=getCurrentPointer "), "{}", seen.line);
}

#[tokio::test]
async fn incomplete_pointer_is_absent() {
    let (url, server) = serve_once(200, r#"{"ok":true,"event":"3","heat":""}"#).await;
    let store = HttpStore::new(url).unwrap();

    assert_eq!(store.current_pointer().await.unwrap(), None);
    server.await.unwrap();
}

#[tokio::test]
async fn lane_lookup_sends_key_and_maps_entry() {
    let (url, server) = serve_once(
        200,
        r#"{"ok":true,"uniqueId":"S-17","swimmer":"Ada Swim","school":"North"}"#,
    )
    .await;
    let store = HttpStore::new(url).unwrap();

    let assignment = store.lane(&RacePointer::new("2", "4"), lane(5)).await.unwrap().unwrap();
    assert_eq!(assignment.swimmer_id, SwimmerId::new("S-17"));
    assert_eq!(assignment.swimmer_name, "Ada Swim");
    assert_eq!(assignment.school_name, "North");

    let seen = server.await.unwrap();
    assert!(seen.line.contains("action=getLane"), "{}", seen.line);
    assert!(seen.line.contains("event=2&heat=4&lane=5"), "{}", seen.line);
}

#[tokio::test]
async fn lane_without_entry_is_none() {
    let (url, server) = serve_once(200, r#"{"ok":false}"#).await;
    let store = HttpStore::new(url).unwrap();

    assert_eq!(store.lane(&RacePointer::new("2", "4"), lane(8)).await.unwrap(), None);
    server.await.unwrap();
}

#[tokio::test]
async fn status_update_uses_wire_names() {
    let (url, server) = serve_once(200, r#"{"ok":true}"#).await;
    let store = HttpStore::new(url).unwrap();

    store
        .update_lane_status(&RacePointer::new("1", "1"), lane(2), LaneReadiness::NotReady)
        .await
        .unwrap();

    let seen = server.await.unwrap();
    assert!(seen.line.contains("action=updateLaneStatus"), "{}", seen.line);
    assert!(seen.line.contains("status=not-ready"), "{}", seen.line);
}

#[tokio::test]
async fn rejected_write_carries_detail() {
    let (url, server) = serve_once(200, r#"{"ok":false,"error":"sheet locked"}"#).await;
    let store = HttpStore::new(url).unwrap();

    let err = store.set_start(&RacePointer::new("1", "1")).await.unwrap_err();
    assert!(err.is_rejection());
    assert!(err.to_string().contains("sheet locked"), "{err}");
    server.await.unwrap();
}

#[tokio::test]
async fn server_error_is_transport_failure() {
    let (url, server) = serve_once(500, r#"{"ok":true}"#).await;
    let store = HttpStore::new(url).unwrap();

    let err = store.overview().await.unwrap_err();
    assert!(matches!(err, StoreError::Transport(_)), "{err:?}");
    server.await.unwrap();
}

#[tokio::test]
async fn malformed_reply_is_protocol_error() {
    let (url, server) = serve_once(200, "<html>oops</html>").await;
    let store = HttpStore::new(url).unwrap();

    let err = store.lane_statuses(&RacePointer::new("1", "1")).await.unwrap_err();
    assert!(matches!(err, StoreError::Protocol(_)), "{err:?}");
    server.await.unwrap();
}

#[tokio::test]
async fn lane_statuses_map_numeric_keys() {
    let (url, server) =
        serve_once(200, r#"{"ok":true,"statuses":{"1":"ready","3":"not-ready"}}"#).await;
    let store = HttpStore::new(url).unwrap();

    let statuses = store.lane_statuses(&RacePointer::new("1", "2")).await.unwrap();
    assert_eq!(statuses.get(&lane(1)), Some(&LaneReadiness::Ready));
    assert_eq!(statuses.get(&lane(3)), Some(&LaneReadiness::NotReady));
    assert_eq!(statuses.get(&lane(2)), None);
    server.await.unwrap();
}

#[tokio::test]
async fn submit_posts_json_body() {
    let (url, server) = serve_once(200, r#"{"ok":true}"#).await;
    let store = HttpStore::new(url).unwrap();

    let result = RaceResult {
        swimmer_id: SwimmerId::new("S-17"),
        final_time: "00:31.42".to_string(),
        disqualified: true,
    };
    store.submit_result(&result).await.unwrap();

    let seen = server.await.unwrap();
    assert!(seen.line.starts_with("POST /exec "), "{}", seen.line);
    let body: serde_json::Value = serde_json::from_str(&seen.body).unwrap();
    assert_eq!(
        body,
        serde_json::json!({
            "action": "submitResult",
            "uniqueId": "S-17",
            "finalTime": "00:31.42",
            "dq": "Yes",
        })
    );
}
