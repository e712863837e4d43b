use std::fmt;
use std::io;
use std::net::{SocketAddr, ToSocketAddrs};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// TCP endpoint of the host server.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ServerEndpoint {
    host: String,
    port: u16,
}

impl ServerEndpoint {
    /// Builds an endpoint from a host name or address and a port.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Host name or address.
    #[must_use]
    pub fn host(&self) -> &str {
        self.host.as_str()
    }

    /// TCP port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Resolves the endpoint to the first address the lookup yields.
    pub fn resolve(&self) -> Result<SocketAddr, EndpointResolveError> {
        let mut addrs = (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|source| EndpointResolveError::Lookup {
                endpoint: self.to_string(),
                source,
            })?;
        addrs.next().ok_or_else(|| EndpointResolveError::Empty {
                endpoint: self.to_string(),
            })
    }
}

impl fmt::Display for ServerEndpoint {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "tcp://{}:{}", self.host, self.port)
    }
}

/// Errors raised while resolving a [`ServerEndpoint`].
#[derive(Debug, Error)]
pub enum EndpointResolveError {
    /// Name resolution failed.
    #[error("failed to resolve TCP address {endpoint}: {source}")]
    Lookup {
        endpoint: String,
        #[source]
        source: io::Error,
    },
    /// Name resolution returned no usable address.
    #[error("no TCP addresses resolved for {endpoint}")]
    Empty { endpoint: String },
}

impl EndpointResolveError {
    /// Converts the error into an IO error for socket-level callers.
    #[must_use]
    pub fn into_io(self) -> io::Error {
        match self {
            Self::Lookup { source, .. } => source,
            Self::Empty { .. } => {
                io::Error::new(io::ErrorKind::AddrNotAvailable, "no resolved addresses")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_as_tcp_url() {
        let endpoint = ServerEndpoint::new("localhost", 8765);
        assert_eq!(endpoint.to_string(), "tcp://localhost:8765");
    }

    #[test]
    fn resolves_loopback_address() {
        let endpoint = ServerEndpoint::new("127.0.0.1", 9000);
        let addr = endpoint.resolve().expect("loopback should resolve");
        assert_eq!(addr.port(), 9000);
        assert!(addr.ip().is_loopback());
    }
}
