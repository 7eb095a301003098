use altlink_frame::vocab::{CMD_CALIBRATE, CMD_GET_CONFIG, CMD_SOUND};
use altlink_link::connect_with_config;

use crate::cmd::{oneshot_link_config, SendArgs};
use crate::exit::{link_error, CliError, CliResult, SUCCESS, TRANSPORT_ERROR};

pub fn run(args: SendArgs) -> CliResult<i32> {
    let config = oneshot_link_config(args.frame.to_frame_config()?);
    let mut link = connect_with_config(&args.device, config)
        .map_err(|err| link_error("connect failed", err))?;

    let sent = match args.text.as_str() {
        CMD_CALIBRATE => link.calibrate(),
        CMD_SOUND => link.test_sound(),
        CMD_GET_CONFIG => link.request_configuration(),
        text => link.send_command(text),
    };
    link.disconnect();

    if !sent {
        return Err(CliError::new(
            TRANSPORT_ERROR,
            format!("failed to send {:?}", args.text),
        ));
    }
    Ok(SUCCESS)
}
