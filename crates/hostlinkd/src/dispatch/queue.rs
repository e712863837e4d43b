//! Single-consumer queue that serialises handler execution.
//!
//! Connection threads submit requests through a [`DispatchSender`] and block
//! until the [`CommandPump`] has run them. The pump is drained either by the
//! server's worker thread or by the host on its own main loop.

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender, SyncSender, TryRecvError};

use hostlink_protocol::{Request, Response};
use thiserror::Error;
use tracing::debug;

use super::{CommandRegistry, DISPATCH_TARGET};

enum Message {
    Run(Job),
    Stop,
}

struct Job {
    request: Request,
    reply: SyncSender<Response>,
}

/// The pump stopped before the request was answered.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("dispatch queue unavailable")]
pub struct QueueClosed;

/// Builds a queue whose pump runs requests against `registry`.
#[must_use]
pub fn dispatch_queue(registry: Arc<CommandRegistry>) -> (DispatchSender, CommandPump) {
    let (sender, receiver) = mpsc::channel();
    (
        DispatchSender { sender },
        CommandPump { receiver, registry },
    )
}

/// Submitting end of the dispatch queue.
#[derive(Clone)]
pub struct DispatchSender {
    sender: Sender<Message>,
}

impl DispatchSender {
    /// Queues `request` and blocks until the pump has answered it.
    ///
    /// # Errors
    ///
    /// Returns [`QueueClosed`] when the pump has stopped.
    pub fn submit(&self, request: Request) -> Result<Response, QueueClosed> {
        let (reply, response) = mpsc::sync_channel(1);
        self.sender
            .send(Message::Run(Job { request, reply }))
            .map_err(|_| QueueClosed)?;
        response.recv().map_err(|_| QueueClosed)
    }

    /// Asks the pump to stop after the requests queued before this call.
    pub fn stop(&self) {
        if self.sender.send(Message::Stop).is_err() {
            debug!(target: DISPATCH_TARGET, "dispatch pump already gone");
        }
    }
}

/// Outcome of one [`CommandPump::run_pending`] pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PumpReport {
    /// Requests executed during the pass.
    pub executed: usize,
    /// Whether the queue has been stopped or every sender is gone.
    pub stopped: bool,
}

/// Receiving end of the dispatch queue.
pub struct CommandPump {
    receiver: Receiver<Message>,
    registry: Arc<CommandRegistry>,
}

impl CommandPump {
    /// Runs every request that is already queued without blocking.
    ///
    /// Hosts call this from their own main loop when the server was started
    /// with [`HostServer::start_host_pumped`](crate::HostServer::start_host_pumped).
    pub fn run_pending(&self) -> PumpReport {
        let mut executed = 0;
        loop {
            match self.receiver.try_recv() {
                Ok(Message::Run(job)) => {
                    self.run(job);
                    executed += 1;
                }
                Ok(Message::Stop) | Err(TryRecvError::Disconnected) => {
                    return PumpReport {
                        executed,
                        stopped: true,
                    };
                }
                Err(TryRecvError::Empty) => {
                    return PumpReport {
                        executed,
                        stopped: false,
                    };
                }
            }
        }
    }

    /// Blocks, running requests until the queue is stopped.
    pub fn run_until_stopped(&self) {
        while let Ok(Message::Run(job)) = self.receiver.recv() {
            self.run(job);
        }
        debug!(target: DISPATCH_TARGET, "dispatch pump stopped");
    }

    fn run(&self, job: Job) {
        let Job { request, reply } = job;
        let response = self.registry.dispatch(&request);
        if reply.send(response).is_err() {
            debug!(
                target: DISPATCH_TARGET,
                command = request.command(),
                "requester left before the response was ready"
            );
        }
    }
}
