//! A scripted aggregation server for end-to-end client tests.
//!
//! The server accepts any number of connections, reads one request frame from
//! each and answers according to a [`ServerScript`]. Every request is recorded
//! so tests can assert on exactly what the client sent.

use std::{
    collections::VecDeque,
    io,
    net::SocketAddr,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use betwire::{
    Bet,
    codec::{decode_bet_batch, encode_winners},
    frame::BetFrameCodec,
    message::{ACK, NOT_READY, Request},
};
use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use tokio::{
    net::{TcpListener, TcpStream},
    task::{JoinHandle, JoinSet},
};
use tokio_util::codec::Framed;

/// How the server answers one request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reply {
    /// Acknowledge the batch.
    Ack,
    /// Send arbitrary text.
    Text(String),
    /// Close the connection without answering.
    Close,
    /// Keep the connection open and never answer.
    Silent,
    /// Report that some agency has not finished submitting.
    NotReady,
    /// Report the draw results.
    Winners(Vec<u64>),
}

/// Replies queued per request kind.
///
/// Batches are acknowledged and polls answered with [`Reply::NotReady`] once
/// their queue runs dry. End-of-submission signals are never answered.
#[derive(Clone, Debug, Default)]
pub struct ServerScript {
    batch_replies: VecDeque<Reply>,
    poll_replies: VecDeque<Reply>,
}

impl ServerScript {
    /// A script that acknowledges every batch and is never ready.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Queue the reply to the next unanswered batch.
    #[must_use]
    pub fn batch_reply(mut self, reply: Reply) -> Self {
        self.batch_replies.push_back(reply);
        self
    }

    /// Queue the reply to the next unanswered results request.
    #[must_use]
    pub fn poll_reply(mut self, reply: Reply) -> Self {
        self.poll_replies.push_back(reply);
        self
    }

    fn reply_to(&mut self, request: &Request) -> Option<Reply> {
        match request {
            Request::Bets(_) => Some(self.batch_replies.pop_front().unwrap_or(Reply::Ack)),
            Request::BatchEnd { .. } => None,
            Request::GetWinners { .. } => {
                Some(self.poll_replies.pop_front().unwrap_or(Reply::NotReady))
            }
        }
    }
}

#[derive(Debug, Default)]
struct Shared {
    script: ServerScript,
    requests: Vec<Request>,
}

/// A running scripted server bound to a loopback port.
///
/// The server stops when dropped.
#[derive(Debug)]
pub struct ScriptedServer {
    addr: SocketAddr,
    shared: Arc<Mutex<Shared>>,
    task: JoinHandle<()>,
}

impl ScriptedServer {
    /// Bind to an ephemeral loopback port and start serving `script`.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn start(script: ServerScript) -> io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shared = Arc::new(Mutex::new(Shared {
            script,
            requests: Vec::new(),
        }));
        let task = tokio::spawn(accept_loop(listener, Arc::clone(&shared)));
        Ok(Self { addr, shared, task })
    }

    /// Address the server listens on.
    #[must_use]
    pub fn addr(&self) -> SocketAddr { self.addr }

    /// Every request received so far, in arrival order.
    #[must_use]
    pub fn requests(&self) -> Vec<Request> { lock(&self.shared).requests.clone() }

    /// Payloads of the batches received so far.
    #[must_use]
    pub fn batches(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .filter_map(|request| match request {
                Request::Bets(payload) => Some(payload),
                _ => None,
            })
            .collect()
    }

    /// Bets decoded from every batch received so far.
    ///
    /// # Panics
    ///
    /// Panics if a received batch does not decode.
    #[must_use]
    pub fn submitted_bets(&self) -> Vec<Bet> {
        self.batches()
            .iter()
            .flat_map(|payload| decode_bet_batch(payload).expect("client sent a valid batch"))
            .collect()
    }

    /// Number of end-of-submission signals received.
    #[must_use]
    pub fn batch_ends(&self) -> usize {
        self.count(|request| matches!(request, Request::BatchEnd { .. }))
    }

    /// Number of results requests received.
    #[must_use]
    pub fn polls(&self) -> usize {
        self.count(|request| matches!(request, Request::GetWinners { .. }))
    }

    fn count(&self, predicate: impl Fn(&Request) -> bool) -> usize {
        lock(&self.shared)
            .requests
            .iter()
            .filter(|request| predicate(request))
            .count()
    }
}

impl Drop for ScriptedServer {
    fn drop(&mut self) { self.task.abort(); }
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn accept_loop(listener: TcpListener, shared: Arc<Mutex<Shared>>) {
    let mut connections = JoinSet::new();
    while let Ok((stream, _)) = listener.accept().await {
        connections.spawn(serve_one(stream, Arc::clone(&shared)));
        while connections.try_join_next().is_some() {}
    }
}

async fn serve_one(stream: TcpStream, shared: Arc<Mutex<Shared>>) {
    // Replies are not held to the client's submission budget.
    let mut framed = Framed::new(stream, BetFrameCodec::protocol_limit());
    let Some(Ok(frame)) = framed.next().await else {
        return;
    };
    let request = Request::parse(&String::from_utf8_lossy(&frame));
    let reply = {
        let mut shared = lock(&shared);
        shared.requests.push(request.clone());
        shared.script.reply_to(&request)
    };

    let text = match reply {
        None | Some(Reply::Silent) => {
            // Hold the connection until the client gives up on it.
            while let Some(Ok(_)) = framed.next().await {}
            return;
        }
        Some(Reply::Close) => return,
        Some(Reply::Ack) => ACK.to_owned(),
        Some(Reply::NotReady) => NOT_READY.to_owned(),
        Some(Reply::Text(text)) => text,
        Some(Reply::Winners(winners)) => encode_winners(&winners),
    };
    let _ = framed.send(Bytes::from(text)).await;
}
