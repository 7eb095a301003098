use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use altlink_link::{connect_with_config, LinkConfig, LinkError};
use tracing::info;

use crate::cmd::MonitorArgs;
use crate::exit::{link_error, CliError, CliResult, FAILURE, INTERNAL, SUCCESS};
use crate::output::{print_event, OutputFormat};

pub fn run(args: MonitorArgs, format: OutputFormat) -> CliResult<i32> {
    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let config = LinkConfig {
        fetch_config_on_connect: !args.no_fetch,
        ..LinkConfig::default()
    };
    let mut link = connect_with_config(&args.device, config)
        .map_err(|err| link_error("connect failed", err))?;
    let session = link.id().to_string();

    let mut printed = 0usize;
    while running.load(Ordering::SeqCst) {
        let event = match link.recv_event() {
            Ok(event) => event,
            Err(LinkError::Frame(_)) => continue,
            Err(LinkError::Disconnected(_)) => {
                return Ok(match args.count {
                    Some(count) if printed < count => FAILURE,
                    _ => SUCCESS,
                });
            }
            Err(err) => return Err(link_error("receive failed", err)),
        };

        print_event(&event, Some(&session), format);
        printed = printed.saturating_add(1);

        if let Some(count) = args.count {
            if printed >= count {
                break;
            }
        }
    }

    let window = link.window();
    info!(
        %session,
        events = printed,
        altitude_samples = window.altitude().count(),
        latest_altitude = ?window.latest_altitude(),
        latest_acceleration = ?window.latest_acceleration(),
        "monitor finished"
    );
    link.disconnect();
    Ok(SUCCESS)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
