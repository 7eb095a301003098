use std::io::BufRead;

use altlink_frame::decode_message;
use tracing::{debug, error};

use crate::cmd::DecodeArgs;
use crate::exit::{io_error, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_event, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let mut malformed = 0usize;

    if args.messages.is_empty() {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let line = line.map_err(|err| io_error("failed reading stdin", err))?;
            let line = line.trim_end_matches('\r');
            if line.is_empty() {
                continue;
            }
            malformed += decode_one(line, format);
        }
    } else {
        for message in &args.messages {
            malformed += decode_one(message, format);
        }
    }

    if malformed > 0 {
        return Ok(DATA_INVALID);
    }
    Ok(SUCCESS)
}

/// Decode and print one message. Returns 1 if it was a malformed document.
fn decode_one(message: &str, format: OutputFormat) -> usize {
    match decode_message(message) {
        Ok(Some(event)) => {
            print_event(&event, None, format);
            0
        }
        Ok(None) => {
            debug!(%message, "dropped corrupt sample");
            0
        }
        Err(err) => {
            error!(%message, error = %err, "error parsing configuration");
            1
        }
    }
}
