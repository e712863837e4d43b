//! Behavioural tests for the host server over a real socket.

use std::cell::RefCell;
use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use hostlink_config::Config;
use hostlink_protocol::{Params, Response};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::{Value, json};

use super::support::{call, send_raw};
use crate::commands::{
    BuiltinCommands, EXECUTE_CODE, GET_SCENE_INFO, HEALTH_CHECK, LIST_CAMERAS, RENDER_CAMERA,
};
use crate::dispatch::CommandRegistry;
use crate::host::{CodeExecutor, ExecutionError, ExecutionScope, StaticHost};
use crate::server::HostServer;

type StepResult = Result<(), String>;

const PUMP_INTERVAL: Duration = Duration::from_millis(5);

/// Executor whose every payload exhausts memory.
struct MemoryHungryExecutor;

impl CodeExecutor for MemoryHungryExecutor {
    fn execute(&self, _code: &str, _scope: &mut ExecutionScope<'_>) -> Result<(), ExecutionError> {
        Err(ExecutionError::OutOfMemory)
    }
}

#[derive(Default)]
struct ServerWorld {
    server: Option<HostServer>,
    started_at: Option<SocketAddr>,
    pump: Option<JoinHandle<usize>>,
    pumped: Option<usize>,
    responses: Vec<Response>,
    truncated_reply: Option<Vec<u8>>,
}

impl ServerWorld {
    fn registry(executor: Option<Arc<dyn CodeExecutor>>) -> CommandRegistry {
        let builtins = BuiltinCommands::new(Arc::new(StaticHost::empty()));
        let builtins = match executor {
            Some(executor) => builtins.with_executor(executor),
            None => builtins,
        };
        builtins.register(CommandRegistry::builder()).build()
    }

    fn config() -> Config {
        Config {
            port: 0,
            ..Config::default()
        }
    }

    fn start(&mut self, executor: Option<Arc<dyn CodeExecutor>>) -> StepResult {
        let server = HostServer::new(&Self::config(), Self::registry(executor));
        let addr = server.start().map_err(|error| error.to_string())?;
        self.started_at = Some(addr);
        self.server = Some(server);
        Ok(())
    }

    fn start_pumped(&mut self) -> StepResult {
        let server = HostServer::new(&Self::config(), Self::registry(None));
        let (addr, pump) = server
            .start_host_pumped()
            .map_err(|error| error.to_string())?;
        let handle = thread::Builder::new()
            .name(String::from("host-main"))
            .spawn(move || {
                let mut executed = 0;
                loop {
                    let report = pump.run_pending();
                    executed += report.executed;
                    if report.stopped {
                        return executed;
                    }
                    thread::sleep(PUMP_INTERVAL);
                }
            })
            .map_err(|error| error.to_string())?;
        self.started_at = Some(addr);
        self.server = Some(server);
        self.pump = Some(handle);
        Ok(())
    }

    fn server(&self) -> Result<&HostServer, String> {
        self.server
            .as_ref()
            .ok_or_else(|| String::from("server was not started"))
    }

    fn addr(&self) -> Result<SocketAddr, String> {
        self.started_at
            .ok_or_else(|| String::from("server address unknown"))
    }

    fn last_response(&self) -> Result<&Response, String> {
        self.responses
            .last()
            .ok_or_else(|| String::from("no response recorded"))
    }

    fn stop(&mut self) -> StepResult {
        if let Some(server) = self.server.as_ref() {
            server.stop().map_err(|error| error.to_string())?;
        }
        if let Some(pump) = self.pump.take() {
            let executed = pump
                .join()
                .map_err(|_| String::from("host pump panicked"))?;
            self.pumped = Some(executed);
        }
        Ok(())
    }
}

impl Drop for ServerWorld {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

#[fixture]
fn world() -> RefCell<ServerWorld> {
    RefCell::new(ServerWorld::default())
}

#[given("a running host server")]
fn given_running_server(world: &RefCell<ServerWorld>) -> StepResult {
    world.borrow_mut().start(None)
}

#[given("a running host server whose executor runs out of memory")]
fn given_memory_hungry_server(world: &RefCell<ServerWorld>) -> StepResult {
    world
        .borrow_mut()
        .start(Some(Arc::new(MemoryHungryExecutor)))
}

#[given("a host server driven by the host pump")]
fn given_pumped_server(world: &RefCell<ServerWorld>) -> StepResult {
    world.borrow_mut().start_pumped()
}

#[when("a client calls \"{command}\"")]
fn when_client_calls(world: &RefCell<ServerWorld>, command: String) -> StepResult {
    let addr = world.borrow().addr()?;
    let response = call(addr, &command, Params::new());
    world.borrow_mut().responses.push(response);
    Ok(())
}

#[when("a client executes \"{code}\"")]
fn when_client_executes(world: &RefCell<ServerWorld>, code: String) -> StepResult {
    let addr = world.borrow().addr()?;
    let mut params = Params::new();
    params.insert(String::from("code"), Value::String(code));
    let response = call(addr, EXECUTE_CODE, params);
    world.borrow_mut().responses.push(response);
    Ok(())
}

#[when("a client calls every built-in command")]
fn when_client_calls_builtins(world: &RefCell<ServerWorld>) -> StepResult {
    let addr = world.borrow().addr()?;
    for command in [
        HEALTH_CHECK,
        GET_SCENE_INFO,
        LIST_CAMERAS,
        EXECUTE_CODE,
        RENDER_CAMERA,
    ] {
        let response = call(addr, command, Params::new());
        world.borrow_mut().responses.push(response);
    }
    Ok(())
}

#[when("a client sends a truncated request and disconnects")]
fn when_client_truncates(world: &RefCell<ServerWorld>) -> StepResult {
    let addr = world.borrow().addr()?;
    let reply = send_raw(addr, br#"{"command": "health_ch"#, true);
    world.borrow_mut().truncated_reply = Some(reply);
    Ok(())
}

#[when("{count} clients call \"{command}\" concurrently")]
fn when_clients_call_concurrently(
    world: &RefCell<ServerWorld>,
    count: usize,
    command: String,
) -> StepResult {
    let addr = world.borrow().addr()?;
    let clients: Vec<_> = (0..count)
        .map(|_| {
            let command = command.clone();
            thread::spawn(move || call(addr, &command, Params::new()))
        })
        .collect();
    for client in clients {
        let response = client
            .join()
            .map_err(|_| String::from("client thread panicked"))?;
        world.borrow_mut().responses.push(response);
    }
    Ok(())
}

#[when("the server is started again")]
fn when_started_again(world: &RefCell<ServerWorld>) -> StepResult {
    let world = world.borrow();
    let addr = world
        .server()?
        .start()
        .map_err(|error| error.to_string())?;
    if Some(addr) == world.started_at {
        Ok(())
    } else {
        Err(format!("restart moved the server to {addr}"))
    }
}

#[when("the server is stopped")]
fn when_stopped(world: &RefCell<ServerWorld>) -> StepResult {
    world.borrow_mut().stop()
}

#[then("the last response succeeds")]
fn then_last_succeeds(world: &RefCell<ServerWorld>) -> StepResult {
    let world = world.borrow();
    let response = world.last_response()?;
    if response.is_success() {
        Ok(())
    } else {
        Err(format!("expected success, got {response:?}"))
    }
}

#[then("the last response fails with \"{message}\"")]
fn then_last_fails(world: &RefCell<ServerWorld>, message: String) -> StepResult {
    let world = world.borrow();
    let response = world.last_response()?;
    assert!(!response.is_success(), "expected failure, got {response:?}");
    assert_eq!(response.error_message(), Some(message.as_str()));
    Ok(())
}

#[then("the last response field \"{field}\" is {value}")]
fn then_last_field(world: &RefCell<ServerWorld>, field: String, value: String) -> StepResult {
    let expected: Value = serde_json::from_str(&value).map_err(|error| error.to_string())?;
    let world = world.borrow();
    let response = world.last_response()?;
    assert_eq!(response.get(&field), Some(&expected), "{response:?}");
    Ok(())
}

#[then("every built-in command produced a response")]
fn then_builtins_responded(world: &RefCell<ServerWorld>) {
    let world = world.borrow();
    assert_eq!(world.responses.len(), 5);
    let encoded: Vec<Value> = world.responses.iter().map(Response::to_value).collect();
    assert!(
        encoded
            .iter()
            .all(|value| value.get("success").is_some_and(Value::is_boolean)),
        "{encoded:?}"
    );
    assert_eq!(
        encoded.first().and_then(|value| value.get("status")),
        Some(&json!("healthy"))
    );
}

#[then("every response succeeds")]
fn then_every_response_succeeds(world: &RefCell<ServerWorld>) {
    let world = world.borrow();
    assert!(!world.responses.is_empty());
    assert!(
        world.responses.iter().all(Response::is_success),
        "{:?}",
        world.responses
    );
}

#[then("the truncated client received nothing")]
fn then_truncated_client_got_nothing(world: &RefCell<ServerWorld>) {
    let world = world.borrow();
    assert_eq!(world.truncated_reply.as_deref(), Some(&[][..]));
}

#[then("the server keeps its address")]
fn then_server_keeps_address(world: &RefCell<ServerWorld>) -> StepResult {
    let world = world.borrow();
    let server = world.server()?;
    assert!(server.is_running());
    assert_eq!(server.local_addr(), world.started_at);
    Ok(())
}

#[then("the server is not running")]
fn then_server_not_running(world: &RefCell<ServerWorld>) -> StepResult {
    let world = world.borrow();
    let server = world.server()?;
    assert!(!server.is_running());
    assert!(server.local_addr().is_none());
    Ok(())
}

#[then("the port can be bound again")]
fn then_port_rebinds(world: &RefCell<ServerWorld>) -> StepResult {
    let addr = world.borrow().addr()?;
    TcpListener::bind(addr)
        .map(drop)
        .map_err(|error| format!("port {addr} still held: {error}"))
}

#[then("the host pump executed {count} request")]
fn then_pump_executed(world: &RefCell<ServerWorld>, count: usize) -> StepResult {
    let mut world = world.borrow_mut();
    world.stop()?;
    assert_eq!(world.pumped, Some(count));
    Ok(())
}

#[scenario(
    path = "tests/features/host_server.feature",
    name = "Listing cameras on an empty scene"
)]
fn listing_cameras_on_empty_scene(world: RefCell<ServerWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/host_server.feature",
    name = "Unknown commands are reported to the client"
)]
fn unknown_commands_are_reported(world: RefCell<ServerWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/host_server.feature",
    name = "Every built-in command answers with a success flag"
)]
fn builtins_answer_with_success_flag(world: RefCell<ServerWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/host_server.feature",
    name = "An executor running out of memory does not take the server down"
)]
fn out_of_memory_keeps_serving(world: RefCell<ServerWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/host_server.feature",
    name = "A truncated request does not affect other clients"
)]
fn truncated_request_is_isolated(world: RefCell<ServerWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/host_server.feature",
    name = "Concurrent clients are all served"
)]
fn concurrent_clients_are_served(world: RefCell<ServerWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/host_server.feature",
    name = "Starting a running server is a no-op"
)]
fn starting_twice_is_a_no_op(world: RefCell<ServerWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/host_server.feature",
    name = "Stopping the server frees the port"
)]
fn stopping_frees_the_port(world: RefCell<ServerWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/host_server.feature",
    name = "Requests run on the host pump"
)]
fn requests_run_on_host_pump(world: RefCell<ServerWorld>) {
    drop(world);
}
