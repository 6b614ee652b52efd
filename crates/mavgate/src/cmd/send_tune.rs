use std::io::Write;

use mavgate_gateway::tunes::{self, TUNE_COUNT};
use mavgate_gateway::CommandRecord;
use mavgate_transport::CommandFifo;
use tracing::debug;

use crate::cmd::SendTuneArgs;
use crate::exit::{io_error, CliError, CliResult, FAILURE, SUCCESS, USAGE};

pub fn run(args: SendTuneArgs) -> CliResult<i32> {
    let Some(name) = tunes::tune_name(args.index) else {
        return Err(CliError::new(
            USAGE,
            format!("tune index {} out of range (0..{TUNE_COUNT})", args.index),
        ));
    };

    let mut sender = CommandFifo::open_sender(&args.fifo).map_err(|err| {
        debug!(%err, "command fifo unavailable");
        CliError::new(FAILURE, "server is not running")
    })?;

    let record = CommandRecord::play_tune(args.index);
    sender
        .write_all(&record.to_bytes())
        .map_err(|err| io_error("failed to send command", err))?;

    println!("sent tune {} ({name})", args.index);
    Ok(SUCCESS)
}
