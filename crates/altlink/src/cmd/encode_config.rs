use altlink_frame::{encode_command, Command, Configuration};

use crate::cmd::EncodeConfigArgs;
use crate::exit::{frame_error, CliResult, SUCCESS};
use crate::output::{print_frame, OutputFormat};

pub fn run(args: EncodeConfigArgs, format: OutputFormat) -> CliResult<i32> {
    let frame_config = args.frame.to_frame_config()?;
    let config = args.config.apply(Configuration::default());
    let frame = encode_command(&Command::ConfigurationSet(config), &frame_config)
        .map_err(|err| frame_error("encode failed", err))?;
    print_frame(&frame, format);
    Ok(SUCCESS)
}
