//! Test helpers for the transport module.

use std::io::{Read, Write};
use std::net::{Shutdown, TcpStream};
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use super::ConnectionHandler;

pub(crate) struct CountingHandler {
    count: Arc<AtomicUsize>,
}

impl CountingHandler {
    pub(crate) fn new() -> (Arc<AtomicUsize>, Arc<Self>) {
        let count = Arc::new(AtomicUsize::new(0));
        let handler = Arc::new(Self {
            count: Arc::clone(&count),
        });
        (count, handler)
    }
}

impl ConnectionHandler for CountingHandler {
    fn handle(&self, _stream: TcpStream) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}

/// Writes back whatever the peer sent once it half-closes.
pub(crate) struct EchoHandler;

impl ConnectionHandler for EchoHandler {
    fn handle(&self, mut stream: TcpStream) {
        let mut received = Vec::new();
        if stream.read_to_end(&mut received).is_ok() && stream.write_all(&received).is_ok() {
            let _ = stream.shutdown(Shutdown::Write);
        }
    }
}
