use std::io;

use mavgate_gateway::PidFile;

use crate::cmd::StopArgs;
use crate::exit::{gateway_error, io_error, CliError, CliResult, FAILURE, SUCCESS};

pub fn run(args: StopArgs) -> CliResult<i32> {
    let pid = PidFile::read(&args.pid_file).map_err(|err| match err {
        mavgate_gateway::GatewayError::PidFile { ref source, .. }
            if source.kind() == io::ErrorKind::NotFound =>
        {
            CliError::new(FAILURE, "server is not running")
        }
        other => gateway_error("cannot read pid file", other),
    })?;

    // SAFETY: kill(2) has no memory-safety preconditions; `pid` is positive,
    // so a single process is targeted.
    let rc = unsafe { libc::kill(pid, libc::SIGTERM) };
    if rc != 0 {
        let err = io::Error::last_os_error();
        if err.raw_os_error() == Some(libc::ESRCH) {
            return Err(CliError::new(
                FAILURE,
                format!(
                    "server is not running (stale pid file {})",
                    args.pid_file.display()
                ),
            ));
        }
        return Err(io_error(&format!("failed to signal pid {pid}"), err));
    }

    println!("sent SIGTERM to mavgate (pid {pid})");
    Ok(SUCCESS)
}
