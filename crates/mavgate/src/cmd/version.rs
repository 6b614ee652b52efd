use mavgate_gateway::tunes::TUNE_COUNT;
use mavgate_gateway::DEFAULT_PID_FILE;
use mavgate_transport::{DEFAULT_FIFO_PATH, DEFAULT_PORT};

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("mavgate {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: mavgate");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "target: {}",
        option_env!("MAVGATE_BUILD_TARGET").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!("default_port: {DEFAULT_PORT}");
    println!("command_fifo: {DEFAULT_FIFO_PATH}");
    println!("pid_file: {DEFAULT_PID_FILE}");
    println!("tunes: {TUNE_COUNT}");

    Ok(SUCCESS)
}
