use clap::ArgMatches;
use clap::parser::ValueSource;

use crate::args::parsers::validate_status_code;
use crate::args::{ChainArgs, CliArgs, Command, PositiveUsize, ServeArgs, StressArgs};
use crate::error::{AppError, AppResult, ConfigError};

use super::types::{ChainConfig, ConfigFile, ServeConfig, StressConfig};

/// Fills every option of the chosen subcommand that was not given on the
/// command line or through the environment.
///
/// # Errors
///
/// Returns an error when a config value is out of range.
pub fn apply_config(args: &mut CliArgs, matches: &ArgMatches, config: &ConfigFile) -> AppResult<()> {
    match &mut args.command {
        Command::Chain(chain) => {
            if let (Some(section), Some(sub)) =
                (config.chain.as_ref(), matches.subcommand_matches("chain"))
            {
                apply_chain(chain, sub, section);
            }
        }
        Command::Stress(stress) => {
            if let (Some(section), Some(sub)) =
                (config.stress.as_ref(), matches.subcommand_matches("stress"))
            {
                apply_stress(stress, sub, section)?;
            }
        }
        Command::Serve(serve) => {
            if let (Some(section), Some(sub)) =
                (config.serve.as_ref(), matches.subcommand_matches("serve"))
            {
                apply_serve(serve, sub, section);
            }
        }
    }
    Ok(())
}

fn apply_chain(args: &mut ChainArgs, matches: &ArgMatches, config: &ChainConfig) {
    if !is_explicit(matches, "handlers")
        && let Some(handlers) = config.handlers
    {
        args.handlers = handlers;
    }

    if !is_explicit(matches, "stop_at")
        && let Some(stop_at) = config.stop_at
    {
        args.stop_at = Some(stop_at);
    }
}

fn apply_stress(
    args: &mut StressArgs,
    matches: &ArgMatches,
    config: &StressConfig,
) -> AppResult<()> {
    if !is_explicit(matches, "url")
        && let Some(url) = config.url.clone()
    {
        args.url = Some(url);
    }

    if !is_explicit(matches, "count")
        && let Some(requests) = config.requests
    {
        args.count = requests;
    }

    if !is_explicit(matches, "method")
        && let Some(method) = config.method
    {
        args.method = method;
    }

    if !is_explicit(matches, "data")
        && let Some(data) = config.data.clone()
    {
        args.data = Some(data);
    }

    if !is_explicit(matches, "content_type")
        && let Some(content_type) = config.content_type.clone()
    {
        args.content_type = content_type;
    }

    if !is_explicit(matches, "echo")
        && let Some(echo) = config.echo
    {
        args.echo = echo;
    }

    if !is_explicit(matches, "max_in_flight")
        && let Some(limit) = config.max_in_flight
    {
        let limit = PositiveUsize::try_from(limit).map_err(|source| {
            AppError::config(ConfigError::InvalidField {
                field: "max_in_flight",
                source,
            })
        })?;
        args.max_in_flight = Some(limit);
    }

    if !is_explicit(matches, "timeout")
        && let Some(timeout) = config.timeout.as_ref()
    {
        let timeout = timeout.to_duration().map_err(|source| {
            AppError::config(ConfigError::InvalidField {
                field: "timeout",
                source,
            })
        })?;
        args.timeout = Some(timeout);
    }

    if !is_explicit(matches, "expect_status")
        && let Some(status) = config.expect_status
    {
        let status = validate_status_code(status).map_err(|source| {
            AppError::config(ConfigError::InvalidField {
                field: "expect_status",
                source,
            })
        })?;
        args.expect_status = Some(status);
    }

    if !is_explicit(matches, "failure_policy")
        && let Some(policy) = config.failure_policy
    {
        args.failure_policy = policy;
    }

    if !is_explicit(matches, "quiet")
        && let Some(quiet) = config.quiet
    {
        args.quiet = quiet;
    }

    Ok(())
}

fn apply_serve(args: &mut ServeArgs, matches: &ArgMatches, config: &ServeConfig) {
    if !is_explicit(matches, "listen")
        && let Some(listen) = config.listen.clone()
    {
        args.listen = listen;
    }
}

fn is_explicit(matches: &ArgMatches, name: &str) -> bool {
    matches!(
        matches.value_source(name),
        Some(ValueSource::CommandLine | ValueSource::EnvVariable)
    )
}
