//! Unit tests for the framed session.

use std::{net::SocketAddr, time::Duration};

use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use rstest::rstest;
use tokio::{net::TcpListener, task::JoinHandle};
use tokio_util::{codec::Framed, sync::CancellationToken};
use tracing_test::traced_test;

use super::Session;
use crate::{
    client::{ClientConfig, ClientError, TracingConfig},
    frame::BetFrameCodec,
};

/// How the test peer behaves after accepting one connection.
#[derive(Clone, Copy)]
enum Peer {
    Echo,
    Hangup,
    Silent,
}

async fn spawn_peer(mode: Peer) -> (SocketAddr, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("listener addr");
    let handle = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("accept client");
        let mut framed = Framed::new(stream, BetFrameCodec::default());
        match mode {
            Peer::Echo => {
                while let Some(Ok(frame)) = framed.next().await {
                    if framed.send(frame).await.is_err() {
                        break;
                    }
                }
            }
            Peer::Hangup => {
                let _ = framed.next().await;
            }
            Peer::Silent => {
                let _ = framed.next().await;
                std::future::pending::<()>().await;
            }
        }
    });
    (addr, handle)
}

fn config(addr: SocketAddr) -> ClientConfig { ClientConfig::new("1", addr.to_string()) }

#[tokio::test]
async fn request_round_trips_through_the_codec() {
    let (addr, server) = spawn_peer(Peer::Echo).await;
    let shutdown = CancellationToken::new();
    let mut session = Session::connect(addr, &config(addr), &shutdown)
        .await
        .expect("connect");

    let reply = session
        .request(Bytes::from_static(b"GET_WINNERS:1"), Some(Duration::from_secs(1)))
        .await
        .expect("reply");

    assert_eq!(reply, Bytes::from_static(b"GET_WINNERS:1"));
    assert_eq!(session.peer(), addr);
    session.close().await;
    session.close().await;
    assert!(!session.is_open());
    server.abort();
}

#[tokio::test]
async fn peer_hangup_is_reported_as_disconnect() {
    let (addr, server) = spawn_peer(Peer::Hangup).await;
    let shutdown = CancellationToken::new();
    let mut session = Session::connect(addr, &config(addr), &shutdown)
        .await
        .expect("connect");

    let err = session
        .request(Bytes::from_static(b"x"), Some(Duration::from_secs(1)))
        .await
        .expect_err("peer hung up");

    assert!(matches!(err, ClientError::Disconnected));
    assert!(!session.is_open());
    server.abort();
}

#[tokio::test]
async fn read_timeout_drops_the_socket() {
    let (addr, server) = spawn_peer(Peer::Silent).await;
    let shutdown = CancellationToken::new();
    let mut session = Session::connect(addr, &config(addr), &shutdown)
        .await
        .expect("connect");

    let err = session
        .request(Bytes::from_static(b"x"), Some(Duration::from_millis(50)))
        .await
        .expect_err("no reply");

    assert!(matches!(err, ClientError::Timeout { operation: "receive", .. }));
    assert!(matches!(
        session.send(Bytes::from_static(b"y")).await,
        Err(ClientError::Closed)
    ));
    server.abort();
}

#[tokio::test]
async fn cancellation_interrupts_a_pending_receive() {
    let (addr, server) = spawn_peer(Peer::Silent).await;
    let shutdown = CancellationToken::new();
    let mut session = Session::connect(addr, &config(addr), &shutdown)
        .await
        .expect("connect");
    session
        .send(Bytes::from_static(b"x"))
        .await
        .expect("send");

    let trigger = shutdown.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let err = session.receive(None).await.expect_err("cancelled");
    assert!(err.is_cancelled());
    assert!(!session.is_open());
    server.abort();
}

#[rstest]
#[tokio::test]
async fn connect_reports_refused_connection() {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("listener addr");
    drop(listener);

    let err = Session::connect(addr, &config(addr), &CancellationToken::new())
        .await
        .expect_err("nothing listening");
    assert!(matches!(err, ClientError::Connect { addr: failed, .. } if failed == addr));
}

#[tokio::test]
async fn connect_observes_prior_cancellation() {
    let (addr, server) = spawn_peer(Peer::Echo).await;
    let shutdown = CancellationToken::new();
    shutdown.cancel();

    let err = Session::connect(addr, &config(addr), &shutdown)
        .await
        .expect_err("cancelled");
    assert!(err.is_cancelled());
    server.abort();
}

#[traced_test]
#[tokio::test]
async fn connect_emits_span_with_peer_address() {
    let (addr, server) = spawn_peer(Peer::Echo).await;
    let config = config(addr).tracing_config(TracingConfig::default().with_all_timing(true));
    let mut session = Session::connect(addr, &config, &CancellationToken::new())
        .await
        .expect("connect");
    session.close().await;
    server.abort();

    assert!(logs_contain("session.connect"));
    assert!(logs_contain(&addr.to_string()));
    assert!(logs_contain("session.close"));
}
