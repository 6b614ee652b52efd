use std::path::Path;

use mavgate_gateway::{Gateway, GatewayConfig};
use tracing::info;

use crate::cmd::{ServeArgs, DEFAULT_CONFIG_FILE};
use crate::exit::{gateway_error, CliError, CliResult, CONFIG_INVALID, SUCCESS, USAGE};

pub fn run(args: ServeArgs) -> CliResult<i32> {
    let config = resolve_config(args)?;

    let gateway =
        Gateway::from_config(&config).map_err(|err| gateway_error("startup failed", err))?;
    let cause = gateway
        .run()
        .map_err(|err| gateway_error("server stopped", err))?;

    info!(cause = cause.as_str(), "server exited");
    Ok(SUCCESS)
}

/// File values first, then command-line overrides.
fn resolve_config(args: ServeArgs) -> CliResult<GatewayConfig> {
    let mut config = match args.config {
        Some(path) => load(&path)?,
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => load(Path::new(DEFAULT_CONFIG_FILE))?,
        None => GatewayConfig::default(),
    };

    if let Some(path) = args.serial_path {
        config.serial.path = Some(path);
    }
    if let Some(serial_config) = args.serial_config {
        config.serial.config = Some(serial_config);
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if args.wait_for_remote {
        config.server.wait_for_remote = true;
    }

    if config.serial.path.is_none() || config.serial.config.is_none() {
        return Err(CliError::new(
            USAGE,
            "serial port path and configuration are required (--serial-path, --serial-config)",
        ));
    }
    if config.server.port == 0 {
        return Err(CliError::new(CONFIG_INVALID, "server port must be between 1 and 65535"));
    }
    config
        .validate()
        .map_err(|err| gateway_error("invalid configuration", err))?;
    Ok(config)
}

fn load(path: &Path) -> CliResult<GatewayConfig> {
    GatewayConfig::load(path).map_err(|err| gateway_error("failed to load config", err))
}
