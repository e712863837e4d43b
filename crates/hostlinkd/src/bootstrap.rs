//! Host server bootstrap orchestration.

use std::sync::Arc;

use hostlink_config::{Config, ConfigError};
use thiserror::Error;

use crate::commands::BuiltinCommands;
use crate::dispatch::CommandRegistry;
use crate::health::HealthReporter;
use crate::host::{HostApplication, HostError, StaticHost};
use crate::server::HostServer;
use crate::telemetry::{self, TelemetryError, TelemetryHandle};

/// Trait abstracting configuration loading for testability.
pub trait ConfigLoader: Send + Sync {
    /// Loads and validates the configuration.
    fn load(&self) -> Result<Config, ConfigError>;
}

/// Loader that reads files, environment and process arguments.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, ConfigError> {
        Config::load_validated()
    }
}

/// Loader that returns a fixed configuration.
#[derive(Debug, Clone)]
pub struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    /// Wraps `config`.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self) -> Result<Config, ConfigError> {
        self.config.validate()?;
        Ok(self.config.clone())
    }
}

/// Errors surfaced during bootstrap.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Configuration {
        #[source]
        source: ConfigError,
    },
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        #[source]
        source: TelemetryError,
    },
    /// The scene description could not be loaded.
    #[error("failed to load scene: {source}")]
    Scene {
        #[source]
        source: HostError,
    },
}

/// Result of a successful bootstrap: configuration, telemetry and host.
pub struct Daemon {
    config: Config,
    host: Arc<dyn HostApplication>,
    telemetry: TelemetryHandle,
    reporter: Arc<dyn HealthReporter>,
}

impl Daemon {
    /// Accessor for the resolved configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Accessor for the telemetry handle, primarily useful for testing.
    #[must_use]
    pub fn telemetry(&self) -> TelemetryHandle {
        self.telemetry
    }

    /// Reporter notified of lifecycle events.
    #[must_use]
    pub fn reporter(&self) -> Arc<dyn HealthReporter> {
        Arc::clone(&self.reporter)
    }

    /// Built-in commands over the bootstrapped host.
    #[must_use]
    pub fn registry(&self) -> CommandRegistry {
        BuiltinCommands::new(Arc::clone(&self.host))
            .register(CommandRegistry::builder())
            .build()
    }

    /// Stopped server for the bootstrapped configuration.
    #[must_use]
    pub fn server(&self) -> HostServer {
        HostServer::new(&self.config, self.registry())
    }
}

/// Bootstraps the server using the supplied collaborators.
pub fn bootstrap_with(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn HealthReporter>,
) -> Result<Daemon, BootstrapError> {
    reporter.bootstrap_starting();
    match bootstrap_steps(loader) {
        Ok((config, host, telemetry)) => {
            reporter.bootstrap_succeeded(&config);
            Ok(Daemon {
                config,
                host,
                telemetry,
                reporter,
            })
        }
        Err(error) => {
            reporter.bootstrap_failed(&error);
            Err(error)
        }
    }
}

fn bootstrap_steps(
    loader: &dyn ConfigLoader,
) -> Result<(Config, Arc<dyn HostApplication>, TelemetryHandle), BootstrapError> {
    let config = loader
        .load()
        .map_err(|source| BootstrapError::Configuration { source })?;
    let telemetry =
        telemetry::initialise(&config).map_err(|source| BootstrapError::Telemetry { source })?;
    let host = match config.scene_file() {
        Some(path) => {
            StaticHost::from_file(path).map_err(|source| BootstrapError::Scene { source })?
        }
        None => StaticHost::empty(),
    };
    Ok((config, Arc::new(host), telemetry))
}
