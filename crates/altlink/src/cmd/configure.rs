use altlink_frame::Configuration;
use altlink_link::connect_with_config;
use tracing::{info, warn};

use crate::cmd::{oneshot_link_config, parse_duration, wait_for_configuration, ConfigureArgs};
use crate::exit::{
    frame_error, link_error, CliError, CliResult, FAILURE, SUCCESS, TRANSPORT_ERROR,
};
use crate::output::{print_configuration, OutputFormat};

pub fn run(args: ConfigureArgs, format: OutputFormat) -> CliResult<i32> {
    let timeout = parse_duration(&args.timeout)?;
    let requested = args.config.apply(Configuration::default());
    requested
        .validate()
        .map_err(|err| frame_error("invalid configuration", err))?;

    let config = oneshot_link_config(args.frame.to_frame_config()?);
    let mut link = connect_with_config(&args.device, config)
        .map_err(|err| link_error("connect failed", err))?;

    if args.no_verify {
        let sent = link.send_configuration(&requested);
        link.disconnect();
        if !sent {
            return Err(CliError::new(TRANSPORT_ERROR, "failed to send configuration"));
        }
        info!("configuration sent");
        return Ok(SUCCESS);
    }

    if !link.save_configuration(&requested) {
        return Err(CliError::new(TRANSPORT_ERROR, "failed to send configuration"));
    }

    let reported = wait_for_configuration(link, timeout)?;
    print_configuration(&reported, format);

    if reported != requested {
        warn!(?requested, ?reported, "device reported a different configuration");
        return Ok(FAILURE);
    }
    info!("configuration saved and verified");
    Ok(SUCCESS)
}
