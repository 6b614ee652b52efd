use clap::{Args, Subcommand};
use std::path::PathBuf;

use mavgate_gateway::DEFAULT_PID_FILE;
use mavgate_transport::DEFAULT_FIFO_PATH;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod monitor;
pub mod send_tune;
pub mod serve;
pub mod stop;
pub mod version;

/// Config file read by `serve` when `--config` is not given, if present.
pub const DEFAULT_CONFIG_FILE: &str = "mavgate.toml";

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the gateway server.
    Serve(ServeArgs),
    /// Ask a running server to play a tune on the flight controller.
    SendTune(SendTuneArgs),
    /// Stop a running server.
    Stop(StopArgs),
    /// Connect as a repeater client and print decoded frames.
    Monitor(MonitorArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Serve(args) => serve::run(args),
        Command::SendTune(args) => send_tune::run(args),
        Command::Stop(args) => stop::run(args),
        Command::Monitor(args) => monitor::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Config file (default: ./mavgate.toml if present).
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
    /// Serial device connected to the flight controller.
    #[arg(long, short = 'd', value_name = "PATH")]
    pub serial_path: Option<PathBuf>,
    /// Serial line settings: baudrate[,parity[,data_bits[,stop_bits]]].
    #[arg(long, short = 'c', value_name = "CONFIG")]
    pub serial_config: Option<String>,
    /// TCP port for repeater clients.
    #[arg(long, short = 'p', value_parser = clap::value_parser!(u16).range(1..))]
    pub port: Option<u16>,
    /// Probe the flight controller before serving clients.
    #[arg(long)]
    pub wait_for_remote: bool,
}

#[derive(Args, Debug)]
pub struct SendTuneArgs {
    /// Index into the tune table.
    pub index: i32,
    /// Command FIFO of the running server.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_FIFO_PATH)]
    pub fifo: PathBuf,
}

#[derive(Args, Debug)]
pub struct StopArgs {
    /// Pid file written by the running server.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_PID_FILE)]
    pub pid_file: PathBuf,
}

#[derive(Args, Debug)]
pub struct MonitorArgs {
    /// Server address, e.g. 127.0.0.1:8278.
    pub addr: String,
    /// Exit after printing N frames.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
