//! Test suites for the host server.

mod server_behaviour;
mod support;
