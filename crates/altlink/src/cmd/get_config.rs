use altlink_link::connect_with_config;

use crate::cmd::{oneshot_link_config, parse_duration, wait_for_configuration, GetConfigArgs};
use crate::exit::{link_error, CliError, CliResult, SUCCESS, TRANSPORT_ERROR};
use crate::output::{print_configuration, OutputFormat};

pub fn run(args: GetConfigArgs, format: OutputFormat) -> CliResult<i32> {
    let timeout = parse_duration(&args.timeout)?;
    let mut link = connect_with_config(&args.device, oneshot_link_config(Default::default()))
        .map_err(|err| link_error("connect failed", err))?;

    if !link.request_configuration() {
        return Err(CliError::new(
            TRANSPORT_ERROR,
            "failed to request configuration",
        ));
    }

    let config = wait_for_configuration(link, timeout)?;
    print_configuration(&config, format);
    Ok(SUCCESS)
}
