//! Configuration loading helpers for the hostlink CLI.
//!
//! Configuration flags precede the subcommand. The split here hands the
//! leading flags to `ortho_config` and leaves the rest for `clap`.

use std::ffi::{OsStr, OsString};

use hostlink_config::Config;
use ortho_config::OrthoConfig;

use crate::AppError;

pub(crate) trait ConfigLoader {
    /// Loads configuration for the CLI from the leading config flags.
    fn load(&self, args: &[OsString]) -> Result<Config, AppError>;
}

pub(crate) struct OrthoConfigLoader;

#[derive(Debug, Clone, Copy)]
enum FlagAction {
    Include { needs_value: bool },
    Skip,
}

impl ConfigLoader for OrthoConfigLoader {
    fn load(&self, args: &[OsString]) -> Result<Config, AppError> {
        let config =
            Config::load_from_iter(args.iter().cloned()).map_err(AppError::LoadConfiguration)?;
        config.validate()?;
        Ok(config)
    }
}

impl OrthoConfigLoader {
    fn process_config_flag(argument: &OsStr) -> FlagAction {
        let argument_text = argument.to_string_lossy();
        if !argument_text.starts_with("--") {
            return FlagAction::Skip;
        }
        let (flag, has_inline_value) = match argument_text.split_once('=') {
            Some((flag, _)) => (flag, true),
            None => (argument_text.as_ref(), false),
        };
        if super::CONFIG_CLI_FLAGS.contains(&flag) {
            return FlagAction::Include {
                needs_value: !has_inline_value,
            };
        }
        FlagAction::Skip
    }
}

pub(crate) struct ConfigArgumentSplit {
    pub(crate) config_arguments: Vec<OsString>,
    pub(crate) command_start: usize,
}

pub(crate) fn split_config_arguments(args: &[OsString]) -> ConfigArgumentSplit {
    let Some(program) = args.first() else {
        return ConfigArgumentSplit {
            config_arguments: Vec::new(),
            command_start: 0,
        };
    };

    let mut filtered = vec![program.clone()];
    let mut command_start = 1;
    let mut pending_value = false;

    for argument in args.iter().skip(1) {
        if pending_value {
            filtered.push(argument.clone());
            pending_value = false;
            command_start += 1;
            continue;
        }
        match OrthoConfigLoader::process_config_flag(argument.as_os_str()) {
            FlagAction::Include { needs_value } => {
                filtered.push(argument.clone());
                command_start += 1;
                pending_value = needs_value;
            }
            FlagAction::Skip => break,
        }
    }

    ConfigArgumentSplit {
        config_arguments: filtered,
        command_start,
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn os_args(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    #[rstest]
    #[case::inline("--port=9000", Some(false))]
    #[case::separate("--port", Some(true))]
    #[case::config_path("--config-path", Some(true))]
    #[case::subcommand("health", None)]
    #[case::unknown("--count", None)]
    #[case::bare_name("port", None)]
    #[case::inline_host("--host=127.0.0.1", Some(false))]
    fn classifies_flags(#[case] argument: &str, #[case] expected: Option<bool>) {
        let action = OrthoConfigLoader::process_config_flag(OsStr::new(argument));
        match (action, expected) {
            (FlagAction::Include { needs_value }, Some(expected)) => {
                assert_eq!(needs_value, expected);
            }
            (FlagAction::Skip, None) => {}
            (other, _) => panic!("unexpected action {other:?} for {argument}"),
        }
    }

    #[rstest]
    fn splits_leading_config_flags_from_the_subcommand() {
        let args = os_args(&[
            "hostlink",
            "--host",
            "localhost",
            "--port=9000",
            "probe",
            "--count",
            "2",
        ]);
        let split = split_config_arguments(&args);
        assert_eq!(
            split.config_arguments,
            os_args(&["hostlink", "--host", "localhost", "--port=9000"])
        );
        assert_eq!(split.command_start, 4);
    }

    #[rstest]
    fn config_flags_after_the_subcommand_stay_with_it() {
        let args = os_args(&["hostlink", "health", "--port", "1"]);
        let split = split_config_arguments(&args);
        assert_eq!(split.config_arguments, os_args(&["hostlink"]));
        assert_eq!(split.command_start, 1);
    }

    #[rstest]
    fn empty_arguments_split_to_nothing() {
        let split = split_config_arguments(&[]);
        assert!(split.config_arguments.is_empty());
        assert_eq!(split.command_start, 0);
    }
}
