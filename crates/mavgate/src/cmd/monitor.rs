use std::net::TcpStream;

use mavgate_frame::{FrameError, FrameReader};
use tracing::info;

use crate::cmd::MonitorArgs;
use crate::exit::{frame_error, io_error, CliResult, SUCCESS};
use crate::output::{print_frame, OutputFormat};

/// Print frames relayed by a running server until it disconnects.
///
/// The monitor never writes. If it is the oldest client it still holds the
/// commanding slot, so run it after the ground station connects.
pub fn run(args: MonitorArgs, format: OutputFormat) -> CliResult<i32> {
    let stream = TcpStream::connect(&args.addr)
        .map_err(|err| io_error(&format!("connect to {} failed", args.addr), err))?;
    info!(addr = %args.addr, "connected");

    let mut reader = FrameReader::new(stream);
    let mut printed = 0usize;

    loop {
        if args.count.is_some_and(|count| printed >= count) {
            break;
        }
        let frame = match reader.read_frame() {
            Ok(frame) => frame,
            Err(FrameError::ConnectionClosed) => break,
            Err(err) => return Err(frame_error("receive failed", err)),
        };
        print_frame(&frame, format);
        printed = printed.saturating_add(1);
    }

    let stats = reader.stats();
    info!(
        frames = printed,
        crc_errors = stats.crc_errors,
        oversize = stats.oversize,
        "monitor finished"
    );
    Ok(SUCCESS)
}
