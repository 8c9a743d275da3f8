//! Per-connection I/O and event dispatch.
//!
//! One task per connection. The socket splits into a reader loop (one JSON
//! event per line, dispatched sequentially so a connection's own requests
//! are never reordered) and a writer task draining the connection's
//! outbound channel. Handler failures turn into `error` events for this
//! connection only; nothing that happens here can crash the room.

use atelier_proto::{ClientEvent, ErrorPayload, ServerEvent, StatusPayload};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::mpsc;

use crate::error::ServerError;
use crate::registry::{ConnectionId, OutboundRx, OutboundTx};
use crate::state::AppState;

/// Run the I/O loop for a single connection until it disconnects.
pub async fn run_connection(
    conn: ConnectionId,
    stream: TcpStream,
    state: AppState,
) -> Result<(), ServerError> {
    let (read_half, write_half) = stream.into_split();
    let (out_tx, out_rx) = mpsc::unbounded_channel();

    let writer = tokio::spawn(write_outbound(conn, write_half, out_rx));

    // Bind an identity and join the room before accepting any requests.
    // Onboarding failure is fatal for this connection only.
    match state.binder.on_connect(conn, out_tx.clone()).await {
        Ok(identity) => {
            tracing::debug!(%conn, %identity, "connection bound");
            send_to_self(&out_tx, ServerEvent::Status(StatusPayload::now("Connected to chat server")));
        },
        Err(err) => {
            tracing::error!(%conn, error = %err, "onboarding failed");
            send_to_self(&out_tx, ServerEvent::Error(ErrorPayload::now(err.to_string())));
            drop(out_tx);
            let _ = writer.await;
            return Err(err);
        },
    }

    let result = read_inbound(conn, read_half, &out_tx, &state).await;

    // Best-effort cleanup; never propagated to other connections.
    state.binder.on_disconnect(conn);
    drop(out_tx);
    let _ = writer.await;
    result
}

/// Reader loop: parse and dispatch events in receipt order.
async fn read_inbound(
    conn: ConnectionId,
    read_half: tokio::net::tcp::OwnedReadHalf,
    out_tx: &OutboundTx,
    state: &AppState,
) -> Result<(), ServerError> {
    let mut lines = BufReader::new(read_half).lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match serde_json::from_str::<ClientEvent>(line) {
            Ok(event) => dispatch(conn, event, out_tx, state).await,
            Err(err) => {
                tracing::warn!(%conn, error = %err, "unparseable client event");
                send_to_self(out_tx, ServerEvent::Error(ErrorPayload::now("unrecognized event")));
            },
        }
    }

    tracing::debug!(%conn, "connection closed");
    Ok(())
}

/// Route one parsed event to its handler and report failures back to the
/// originating connection only.
async fn dispatch(conn: ConnectionId, event: ClientEvent, out_tx: &OutboundTx, state: &AppState) {
    match event {
        ClientEvent::SendArt => {
            if let Err(err) = state.broadcast.share_random_artwork(conn).await {
                tracing::warn!(%conn, error = %err, "share request failed");
                send_to_self(out_tx, ServerEvent::Error(ErrorPayload::now(err.to_string())));
            }
        },
        ClientEvent::MarkSeen(payload) => {
            if let Err(err) = state.ack.mark_seen(conn, &payload.message_id).await {
                // A missing session is already logged by the tracker and
                // stays silent toward the caller.
                if err.reportable() {
                    tracing::warn!(%conn, error = %err, "acknowledgment failed");
                    send_to_self(out_tx, ServerEvent::Error(ErrorPayload::now(err.to_string())));
                }
            }
        },
    }
}

/// Writer task: one JSON object per line until the channel closes.
async fn write_outbound(conn: ConnectionId, mut write_half: OwnedWriteHalf, mut out_rx: OutboundRx) {
    while let Some(event) = out_rx.recv().await {
        let mut line = match serde_json::to_vec(&event) {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::error!(%conn, error = %err, "failed to encode outbound event");
                continue;
            },
        };
        line.push(b'\n');

        if let Err(err) = write_half.write_all(&line).await {
            tracing::debug!(%conn, error = %err, "outbound write failed, dropping connection");
            break;
        }
    }
}

/// Queue an event for this connection; a closed channel just means the
/// connection is already gone.
fn send_to_self(out_tx: &OutboundTx, event: ServerEvent) {
    let _ = out_tx.send(event);
}
