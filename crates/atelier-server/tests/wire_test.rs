//! End-to-end wire tests: real TCP connections speaking newline-delimited
//! JSON against a running server.

use std::sync::Arc;
use std::time::Duration;

use atelier_core::{MemoryDirectory, MessageId, NewArtwork};
use atelier_proto::{ClientEvent, MarkSeen, ServerEvent};
use atelier_server::{AppState, Server, ServerConfig};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::OwnedWriteHalf;

struct TestClient {
    lines: tokio::io::Lines<BufReader<tokio::net::tcp::OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

impl TestClient {
    async fn connect(addr: std::net::SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.unwrap();
        let (read_half, writer) = stream.into_split();
        Self { lines: BufReader::new(read_half).lines(), writer }
    }

    async fn send(&mut self, event: &ClientEvent) {
        let mut line = serde_json::to_vec(event).unwrap();
        line.push(b'\n');
        self.writer.write_all(&line).await.unwrap();
    }

    async fn send_raw(&mut self, raw: &str) {
        self.writer.write_all(raw.as_bytes()).await.unwrap();
        self.writer.write_all(b"\n").await.unwrap();
    }

    async fn recv(&mut self) -> ServerEvent {
        let line = tokio::time::timeout(Duration::from_secs(5), self.lines.next_line())
            .await
            .expect("timed out waiting for event")
            .unwrap()
            .expect("connection closed unexpectedly");
        serde_json::from_str(&line).unwrap()
    }
}

async fn start_server(directory: Arc<MemoryDirectory>) -> std::net::SocketAddr {
    let config =
        ServerConfig { bind_address: "127.0.0.1:0".to_owned(), max_connections: 16 };
    let state = AppState::new(directory);
    let server = Server::bind(config, state).await.unwrap();
    let addr = server.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = server.run().await;
    });
    addr
}

#[tokio::test]
async fn connect_share_and_acknowledge_over_the_wire() {
    let directory = Arc::new(MemoryDirectory::new());
    directory.insert_artwork(NewArtwork {
        title: "Girl with a Pearl Earring".into(),
        file_path: "art/pearl_earring.jpg".into(),
    });
    let addr = start_server(directory.clone()).await;

    let mut alice = TestClient::connect(addr).await;
    let ServerEvent::Status(status) = alice.recv().await else {
        panic!("expected status on connect");
    };
    assert_eq!(status.message, "Connected to chat server");

    let mut bob = TestClient::connect(addr).await;
    let ServerEvent::Status(_) = bob.recv().await else {
        panic!("expected status on connect");
    };

    // Alice shares; both clients see exactly one new_art event.
    alice.send(&ClientEvent::SendArt).await;
    let ServerEvent::NewArt(seen_by_alice) = alice.recv().await else {
        panic!("expected new_art for the sender");
    };
    let ServerEvent::NewArt(seen_by_bob) = bob.recv().await else {
        panic!("expected new_art for the other member");
    };
    assert_eq!(seen_by_alice, seen_by_bob);
    assert_eq!(seen_by_alice.artwork.title, "Girl with a Pearl Earring");

    // Bob acknowledges; the seen set grows to sender + bob.
    let message_id: MessageId = seen_by_bob.message_id.parse().unwrap();
    bob.send(&ClientEvent::MarkSeen(MarkSeen { message_id: seen_by_bob.message_id.clone() }))
        .await;

    let mut seen = 0;
    for _ in 0..100 {
        seen = directory.message(message_id).unwrap().seen_count();
        if seen == 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(seen, 2, "acknowledgment should land");
}

#[tokio::test]
async fn share_with_no_artworks_reports_error_to_sender_only() {
    let directory = Arc::new(MemoryDirectory::new());
    let addr = start_server(directory.clone()).await;

    let mut alice = TestClient::connect(addr).await;
    alice.recv().await; // status

    let mut bob = TestClient::connect(addr).await;
    bob.recv().await; // status

    alice.send(&ClientEvent::SendArt).await;
    let ServerEvent::Error(err) = alice.recv().await else {
        panic!("expected error event for the sender");
    };
    assert_eq!(err.message, "No artwork found in the database");
    assert_eq!(directory.message_count(), 0);

    // Bob's next event must not be alice's failure: trigger a share and
    // confirm that is the first thing bob sees.
    directory.insert_artwork(NewArtwork {
        title: "The Scream".into(),
        file_path: "art/the_scream.jpg".into(),
    });
    bob.send(&ClientEvent::SendArt).await;
    let ServerEvent::NewArt(payload) = bob.recv().await else {
        panic!("errors must never be broadcast to other members");
    };
    assert_eq!(payload.artwork.title, "The Scream");
}

#[tokio::test]
async fn malformed_input_gets_an_error_and_keeps_the_connection() {
    let directory = Arc::new(MemoryDirectory::new());
    directory.insert_artwork(NewArtwork {
        title: "American Gothic".into(),
        file_path: "art/american_gothic.jpg".into(),
    });
    let addr = start_server(directory).await;

    let mut client = TestClient::connect(addr).await;
    client.recv().await; // status

    client.send_raw("this is not json").await;
    let ServerEvent::Error(err) = client.recv().await else {
        panic!("expected error event for malformed input");
    };
    assert_eq!(err.message, "unrecognized event");

    // The connection still works afterwards.
    client.send(&ClientEvent::SendArt).await;
    let ServerEvent::NewArt(_) = client.recv().await else {
        panic!("connection should survive malformed input");
    };
}

#[tokio::test]
async fn acknowledging_a_bogus_id_reports_not_found() {
    let directory = Arc::new(MemoryDirectory::new());
    let addr = start_server(directory).await;

    let mut client = TestClient::connect(addr).await;
    client.recv().await; // status

    client
        .send(&ClientEvent::MarkSeen(MarkSeen { message_id: "definitely-not-a-uuid".into() }))
        .await;
    let ServerEvent::Error(err) = client.recv().await else {
        panic!("expected error event for unknown message id");
    };
    assert!(err.message.contains("message not found"), "{}", err.message);
}
