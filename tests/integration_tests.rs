//! Integration tests for the tile pong server
//!
//! These tests run a real server on an ephemeral port and drive it with
//! WebSocket clients.

use futures_util::{SinkExt, StreamExt};
use server::config::GameConfig;
use server::network::Server;
use shared::{ClientMessage, Direction, ServerMessage, Team};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::{
    connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream,
};

type Ws = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn start_server() -> SocketAddr {
    let server = Server::new("127.0.0.1:0", GameConfig::default())
        .await
        .expect("Failed to bind server");
    let addr = server.local_addr().unwrap();
    tokio::spawn(server.run());
    addr
}

async fn connect(addr: SocketAddr) -> Ws {
    let (ws, _) = connect_async(format!("ws://{}", addr))
        .await
        .expect("Failed to connect");
    ws
}

async fn send(ws: &mut Ws, message: &ClientMessage) {
    ws.send(Message::Text(message.to_json().unwrap()))
        .await
        .expect("Failed to send");
}

/// Reads frames until one satisfies `accept`, failing after five seconds.
async fn recv_until<F>(ws: &mut Ws, mut accept: F) -> ServerMessage
where
    F: FnMut(&ServerMessage) -> bool,
{
    let wait = async {
        loop {
            match ws.next().await {
                Some(Ok(Message::Text(text))) => {
                    let message = ServerMessage::from_json(&text).expect("Unreadable message");
                    if accept(&message) {
                        return message;
                    }
                }
                Some(Ok(_)) => continue,
                other => panic!("Connection ended unexpectedly: {:?}", other),
            }
        }
    };
    timeout(Duration::from_secs(5), wait)
        .await
        .expect("Timed out waiting for message")
}

async fn recv_assignment(ws: &mut Ws, total: u32) -> (u32, Team) {
    match recv_until(ws, |message| {
        matches!(message, ServerMessage::Assigned { total_players, .. } if *total_players == total)
    })
    .await
    {
        ServerMessage::Assigned { number, team, .. } => (number, team),
        _ => unreachable!(),
    }
}

/// CONNECTION LIFECYCLE TESTS
mod lifecycle_tests {
    use super::*;

    #[tokio::test]
    async fn first_player_is_assigned_and_waits() {
        let addr = start_server().await;
        let mut ws = connect(addr).await;

        assert_eq!(recv_assignment(&mut ws, 1).await, (1, Team::Red));

        let state = recv_until(&mut ws, |message| {
            matches!(message, ServerMessage::GameState { .. })
        })
        .await;
        match state {
            ServerMessage::GameState {
                ball_x,
                ball_y,
                total_players,
                team_scores,
                ..
            } => {
                assert_eq!(total_players, 1);
                assert_eq!(ball_x, 8.0);
                assert_eq!(ball_y, 8.0);
                assert_eq!(team_scores.total(), 0);
            }
            _ => unreachable!(),
        }
    }

    #[tokio::test]
    async fn second_player_reshuffles_everyone() {
        let addr = start_server().await;
        let mut first = connect(addr).await;
        recv_assignment(&mut first, 1).await;

        let mut second = connect(addr).await;
        assert_eq!(recv_assignment(&mut second, 2).await, (2, Team::Blue));
        assert_eq!(recv_assignment(&mut first, 2).await, (1, Team::Red));

        let state = recv_until(&mut second, |message| {
            matches!(message, ServerMessage::GameState { total_players: 2, .. })
        })
        .await;
        match state {
            ServerMessage::GameState {
                paddle_positions, ..
            } => {
                let slots: Vec<u32> = paddle_positions.keys().copied().collect();
                assert_eq!(slots, vec![1, 2]);
            }
            _ => unreachable!(),
        }
    }

    #[tokio::test]
    async fn leaving_player_closes_the_gap() {
        let addr = start_server().await;
        let mut first = connect(addr).await;
        recv_assignment(&mut first, 1).await;
        let mut second = connect(addr).await;
        recv_assignment(&mut second, 2).await;
        let mut third = connect(addr).await;
        assert_eq!(recv_assignment(&mut third, 3).await, (3, Team::Red));

        second.close(None).await.expect("Failed to close");

        assert_eq!(recv_assignment(&mut third, 2).await, (2, Team::Red));
        assert_eq!(recv_assignment(&mut first, 2).await, (1, Team::Red));

        let state = recv_until(&mut first, |message| {
            matches!(message, ServerMessage::GameState { total_players: 2, .. })
        })
        .await;
        match state {
            ServerMessage::GameState {
                paddle_positions, ..
            } => assert_eq!(paddle_positions.len(), 2),
            _ => unreachable!(),
        }
    }

    #[tokio::test]
    async fn dropped_transport_is_treated_as_leaving() {
        let addr = start_server().await;
        let mut first = connect(addr).await;
        recv_assignment(&mut first, 1).await;
        let mut second = connect(addr).await;
        recv_assignment(&mut second, 2).await;
        let mut third = connect(addr).await;
        recv_assignment(&mut third, 3).await;

        // No close frame: the socket just goes away.
        drop(second);

        assert_eq!(recv_assignment(&mut third, 2).await, (2, Team::Red));
        assert_eq!(recv_assignment(&mut first, 2).await, (1, Team::Red));

        let state = recv_until(&mut third, |message| {
            matches!(message, ServerMessage::GameState { total_players: 2, .. })
        })
        .await;
        match state {
            ServerMessage::GameState {
                paddle_positions, ..
            } => {
                let slots: Vec<u32> = paddle_positions.keys().copied().collect();
                assert_eq!(slots, vec![1, 2]);
            }
            _ => unreachable!(),
        }
    }
}

/// INPUT HANDLING TESTS
mod input_tests {
    use super::*;

    #[tokio::test]
    async fn paddle_move_shows_up_in_snapshot() {
        let addr = start_server().await;
        let mut first = connect(addr).await;
        recv_assignment(&mut first, 1).await;
        let mut second = connect(addr).await;
        recv_assignment(&mut second, 2).await;

        send(
            &mut first,
            &ClientMessage::PaddleMove {
                direction: Direction::Up,
            },
        )
        .await;

        recv_until(&mut second, |message| match message {
            ServerMessage::GameState {
                paddle_positions, ..
            } => paddle_positions.get(&1) == Some(&6.0),
            _ => false,
        })
        .await;
    }

    #[tokio::test]
    async fn malformed_messages_keep_connection_open() {
        let addr = start_server().await;
        let mut ws = connect(addr).await;
        recv_assignment(&mut ws, 1).await;

        ws.send(Message::Text("not json".to_string())).await.unwrap();
        ws.send(Message::Text(r#"{"type":"teleport"}"#.to_string()))
            .await
            .unwrap();
        ws.send(Message::Binary(vec![1, 2, 3])).await.unwrap();
        send(&mut ws, &ClientMessage::GetStatus).await;

        let status = recv_until(&mut ws, |message| {
            matches!(message, ServerMessage::Status { .. })
        })
        .await;
        assert_eq!(
            status,
            ServerMessage::Status {
                connected: true,
                number: Some(1),
                total_players: 1,
            }
        );
    }
}
