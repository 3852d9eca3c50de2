use std::time::Duration;

use nanogear_hub::{build_command, CommandRequest, HubError};

use crate::cmd::{block_on, next_failure, parse_duration, SendArgs};
use crate::exit::{hub_error, validation_error, CliResult, SUCCESS};
use crate::output::{print_receipt, OutputFormat};

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let ready_timeout = parse_duration(&args.ready_timeout)?;
    let request = args.light.to_request()?;
    // Reject bad parameters before touching the services.
    build_command(&request).map_err(|err| validation_error("invalid command", err))?;

    block_on(send(args, request, ready_timeout, format))?
}

async fn send(
    args: SendArgs,
    request: CommandRequest,
    ready_timeout: Duration,
    format: OutputFormat,
) -> CliResult<i32> {
    let mut hub = args.connect.start_hub();
    let state = hub.state().clone();

    let ready = tokio::select! {
        ready = tokio::time::timeout(ready_timeout, state.wait_ready()) => {
            ready.map_err(|_| {
                let context = format!("device not ready (phase {})", state.phase());
                hub_error(&context, HubError::Timeout(ready_timeout))
            })
        }
        (kind, err) = next_failure(&mut hub) => Err(hub_error(&format!("{kind} stopped"), err)),
    };

    let outcome = match ready {
        Ok(linked) => {
            tracing::debug!(device_path = ?linked.device_path, "device ready");
            hub.send(&request)
                .await
                .map_err(|err| hub_error("send failed", err))
        }
        Err(err) => Err(err),
    };

    hub.shutdown().await;
    let receipt = outcome?;
    print_receipt(&receipt, format);
    Ok(SUCCESS)
}
