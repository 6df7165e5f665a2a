//! End-to-end tests: real WebSocket clients against a relay on an ephemeral
//! port.
//!
//! Every client waits for its own `getPlayerNumber` before the test moves on,
//! which guarantees the relay has registered it as a member.

use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{http::StatusCode, Error as WsError, Message},
    MaybeTlsStream, WebSocketStream,
};

use xword_core::{
    decode_server, encode_client, CellInput, ClientMessage, PlayerMove, PlayerState, Position, ServerMessage, Slot,
    TimerSync, WordReveal,
};
use xword_relay::domain::RelayConfig;
use xword_relay::infrastructure::serve;

type Ws = WebSocketStream<MaybeTlsStream<TcpStream>>;

// ── Harness ───────────────────────────────────────────────────────────────────

struct Relay {
    addr: SocketAddr,
    running: Arc<AtomicBool>,
}

impl Drop for Relay {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
    }
}

async fn start_relay() -> Relay {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let running = Arc::new(AtomicBool::new(true));
    let config = RelayConfig {
        bind_addr: addr,
        ..RelayConfig::default()
    };
    tokio::spawn(serve(listener, config, Arc::clone(&running)));
    Relay { addr, running }
}

async fn open(relay: &Relay, session: &str) -> Ws {
    let (ws, _) = connect_async(format!("ws://{}/?session={session}", relay.addr))
        .await
        .unwrap();
    ws
}

/// Connects and waits for the slot assignment.
async fn join(relay: &Relay, session: &str) -> (Ws, Slot) {
    let mut ws = open(relay, session).await;
    match recv(&mut ws).await {
        ServerMessage::GetPlayerNumber(slot) => (ws, slot),
        other => panic!("expected getPlayerNumber, got {other:?}"),
    }
}

async fn recv(ws: &mut Ws) -> ServerMessage {
    loop {
        let frame = timeout(Duration::from_secs(2), ws.next())
            .await
            .expect("timed out waiting for an event")
            .expect("stream ended")
            .expect("WebSocket error");
        if let Message::Text(text) = frame {
            return decode_server(&text).unwrap();
        }
    }
}

async fn send(ws: &mut Ws, msg: &ClientMessage) {
    ws.send(Message::Text(encode_client(msg).unwrap())).await.unwrap();
}

async fn assert_silent(ws: &mut Ws) {
    assert!(
        timeout(Duration::from_millis(250), ws.next()).await.is_err(),
        "expected no event"
    );
}

fn input(row: usize, col: usize, value: &str) -> ClientMessage {
    ClientMessage::Input(CellInput {
        row,
        col,
        value: value.to_string(),
        timer: TimerSync { start: Some(1_700_000_000_000) },
    })
}

fn cursor_move(claimed: Slot, row: usize, col: usize) -> ClientMessage {
    ClientMessage::PlayerMove(PlayerMove {
        player_number: claimed,
        player_state: PlayerState {
            active_square: Position::new(row, col),
            active_clue: 0,
            is_horizontal: true,
            is_active: true,
        },
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_slots_assigned_in_join_order() {
    let relay = start_relay().await;

    let (_a, slot_a) = join(&relay, "game").await;
    let (_b, slot_b) = join(&relay, "game").await;
    let (_c, slot_c) = join(&relay, "game").await;

    assert_eq!([slot_a, slot_b, slot_c], Slot::ALL);
}

#[tokio::test]
async fn test_input_reaches_every_other_member_but_not_sender() {
    // Arrange
    let relay = start_relay().await;
    let (mut a, _) = join(&relay, "game").await;
    let (mut b, _) = join(&relay, "game").await;
    let (mut c, _) = join(&relay, "game").await;

    // Act
    send(&mut a, &input(2, 3, "X")).await;

    // Assert
    for peer in [&mut b, &mut c] {
        match recv(peer).await {
            ServerMessage::Input(cell) => {
                assert_eq!(cell.position(), Position::new(2, 3));
                assert_eq!(cell.value, "X");
                assert_eq!(cell.timer.start, Some(1_700_000_000_000));
            }
            other => panic!("expected input, got {other:?}"),
        }
    }
    assert_silent(&mut a).await;
}

#[tokio::test]
async fn test_player_move_is_stamped_with_sender_slot() {
    // Arrange
    let relay = start_relay().await;
    let (mut a, _) = join(&relay, "game").await;
    let (mut b, slot_b) = join(&relay, "game").await;

    // Act: player2 claims to be player3
    send(&mut b, &cursor_move(Slot::Player3, 0, 1)).await;

    // Assert
    let ServerMessage::PlayerMove(m) = recv(&mut a).await else {
        panic!("expected playerMove");
    };
    assert_eq!(m.player_number, slot_b);
    assert_eq!(m.player_state.active_square, Position::new(0, 1));
}

#[tokio::test]
async fn test_reveal_events_are_relayed() {
    let relay = start_relay().await;
    let (mut a, _) = join(&relay, "game").await;
    let (mut b, _) = join(&relay, "game").await;
    let reveal = WordReveal { row: 0, col: 0, is_horizontal: false };

    send(&mut a, &ClientMessage::RevealWord(reveal)).await;
    send(&mut b, &ClientMessage::RevealGrid(Slot::Player1)).await;

    assert_eq!(recv(&mut b).await, ServerMessage::RevealWord(reveal));
    assert_eq!(recv(&mut a).await, ServerMessage::RevealGrid(Slot::Player2));
}

#[tokio::test]
async fn test_sessions_are_isolated() {
    // Arrange
    let relay = start_relay().await;
    let (mut a1, slot_a1) = join(&relay, "alpha").await;
    let (mut b1, slot_b1) = join(&relay, "beta").await;
    let (mut a2, _) = join(&relay, "alpha").await;

    // Act
    send(&mut b1, &input(0, 0, "B")).await;

    // Assert
    assert_eq!(slot_a1, Slot::Player1);
    assert_eq!(slot_b1, Slot::Player1);
    assert_silent(&mut a1).await;
    assert_silent(&mut a2).await;
}

#[tokio::test]
async fn test_fourth_joiner_gets_session_full_and_is_closed() {
    // Arrange
    let relay = start_relay().await;
    let (mut a, _) = join(&relay, "game").await;
    let (_b, _) = join(&relay, "game").await;
    let (_c, _) = join(&relay, "game").await;

    // Act
    let mut d = open(&relay, "game").await;

    // Assert
    assert_eq!(recv(&mut d).await, ServerMessage::SessionFull);
    let next = timeout(Duration::from_secs(2), d.next()).await.unwrap();
    assert!(matches!(next, None | Some(Ok(Message::Close(_))) | Some(Err(_))));

    // The turned-away connection never became a member.
    let _ = d.send(Message::Text(encode_client(&input(0, 0, "Z")).unwrap())).await;
    assert_silent(&mut a).await;
}

#[tokio::test]
async fn test_player1_departure_renumbers_remaining_members() {
    // Arrange
    let relay = start_relay().await;
    let (mut a, _) = join(&relay, "game").await;
    let (mut b, _) = join(&relay, "game").await;
    let (mut c, _) = join(&relay, "game").await;

    // Act
    a.close(None).await.unwrap();

    // Assert: both survivors are told player1 left
    assert_eq!(recv(&mut b).await, ServerMessage::PlayerDisconnect(Slot::Player1));
    assert_eq!(recv(&mut c).await, ServerMessage::PlayerDisconnect(Slot::Player1));

    // The old player2 is now stamped as player1.
    send(&mut b, &cursor_move(Slot::Player2, 1, 1)).await;
    let ServerMessage::PlayerMove(m) = recv(&mut c).await else {
        panic!("expected playerMove");
    };
    assert_eq!(m.player_number, Slot::Player1);

    // The freed top slot goes to the next joiner.
    let (_d, slot_d) = join(&relay, "game").await;
    assert_eq!(slot_d, Slot::Player3);
}

#[tokio::test]
async fn test_missing_session_is_rejected_with_400() {
    let relay = start_relay().await;

    let result = connect_async(format!("ws://{}/", relay.addr)).await;

    match result {
        Err(WsError::Http(response)) => assert_eq!(response.status(), StatusCode::BAD_REQUEST),
        other => panic!("expected HTTP 400, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn test_percent_encoded_session_is_rejected_with_400() {
    let relay = start_relay().await;

    let result = connect_async(format!("ws://{}/?session=a%20b", relay.addr)).await;

    match result {
        Err(WsError::Http(response)) => assert_eq!(response.status(), StatusCode::BAD_REQUEST),
        other => panic!("expected HTTP 400, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn test_malformed_frame_does_not_close_connection() {
    // Arrange
    let relay = start_relay().await;
    let (mut a, _) = join(&relay, "game").await;
    let (mut b, _) = join(&relay, "game").await;

    // Act
    a.send(Message::Text("{\"event\":\"bogus\"}".to_string())).await.unwrap();
    send(&mut a, &input(1, 0, "K")).await;

    // Assert
    assert!(matches!(recv(&mut b).await, ServerMessage::Input(cell) if cell.value == "K"));
}

#[tokio::test]
async fn test_join_racing_a_departure_sees_greeting_first() {
    for _ in 0..10 {
        // Arrange
        let relay = start_relay().await;
        let (mut a, _) = join(&relay, "game").await;
        let (mut b, _) = join(&relay, "game").await;

        // Act: the third member joins while player1 is leaving
        let (mut c, _) = tokio::join!(open(&relay, "game"), a.close(None));

        // Assert: the greeting always arrives before any notice
        let ServerMessage::GetPlayerNumber(mut slot) = recv(&mut c).await else {
            panic!("first frame was not getPlayerNumber");
        };
        assert_eq!(recv(&mut b).await, ServerMessage::PlayerDisconnect(Slot::Player1));
        if let Ok(Some(Ok(Message::Text(text)))) = timeout(Duration::from_millis(250), c.next()).await {
            assert_eq!(decode_server(&text).unwrap(), ServerMessage::PlayerDisconnect(Slot::Player1));
            slot = slot.after_departure(Slot::Player1).expect("own slot vacated");
        }
        assert_eq!(slot, Slot::Player2);

        // The relay stamps the joiner with the slot it believes it holds.
        send(&mut c, &cursor_move(slot, 2, 2)).await;
        let ServerMessage::PlayerMove(m) = recv(&mut b).await else {
            panic!("expected playerMove");
        };
        assert_eq!(m.player_number, slot);
    }
}
