use altlink_frame::{encode_command, Command};

use crate::cmd::EncodeArgs;
use crate::exit::{frame_error, CliResult, SUCCESS};
use crate::output::{print_frame, OutputFormat};

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let config = args.frame.to_frame_config()?;
    let frame = encode_command(&Command::simple(args.text), &config)
        .map_err(|err| frame_error("encode failed", err))?;
    print_frame(&frame, format);
    Ok(SUCCESS)
}
