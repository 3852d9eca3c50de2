use std::time::Duration;

use tokio::time::MissedTickBehavior;

use crate::cmd::{block_on, next_failure, parse_duration, MonitorArgs};
use crate::exit::{hub_error, CliResult, SUCCESS};
use crate::output::{print_status, OutputFormat};

pub fn run(args: MonitorArgs, format: OutputFormat) -> CliResult<i32> {
    let interval = parse_duration(&args.status_interval)?;
    block_on(monitor(args, interval, format))?
}

async fn monitor(args: MonitorArgs, interval: Duration, format: OutputFormat) -> CliResult<i32> {
    let mut hub = args.connect.start_hub();
    let mut changes = hub.state().subscribe();
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut printed = 0usize;
    let outcome = loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                tracing::info!("interrupted");
                break Ok(SUCCESS);
            }
            (kind, err) = next_failure(&mut hub) => {
                break Err(hub_error(&format!("{kind} stopped"), err));
            }
            _ = ticker.tick() => {}
            changed = changes.changed() => {
                if changed.is_err() {
                    break Ok(SUCCESS);
                }
            }
        }

        print_status(&hub.state().snapshot(), format);
        printed = printed.saturating_add(1);
        if args.count.is_some_and(|count| printed >= count) {
            break Ok(SUCCESS);
        }
    };

    hub.shutdown().await;
    outcome
}
