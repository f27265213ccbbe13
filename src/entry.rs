//! Process entry: parse arguments, set up logging and the runtime, dispatch.
use clap::Parser;
use clap::error::ErrorKind;

use crate::app::{self, AppContext};
use crate::args::{Command, HtpArgs};
use crate::error::AppResult;
use crate::shutdown::{setup_signal_shutdown_handler, shutdown_channel};

/// Runs the CLI against the process arguments.
///
/// # Errors
///
/// Returns the first unrecoverable error of the selected command.
pub fn run() -> AppResult<()> {
    let Some(args) = parse_args()? else {
        return Ok(());
    };

    crate::system::logger::init_logging(args.command.verbose(), args.no_color);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run_async(args))
}

fn parse_args() -> AppResult<Option<HtpArgs>> {
    match HtpArgs::try_parse() {
        Ok(args) => Ok(Some(args)),
        Err(err)
            if matches!(
                err.kind(),
                ErrorKind::DisplayHelp
                    | ErrorKind::DisplayVersion
                    | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
            ) =>
        {
            err.print()?;
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}

async fn run_async(args: HtpArgs) -> AppResult<()> {
    let (shutdown_tx, _) = shutdown_channel();
    let ctx = AppContext::new(&args, shutdown_tx.clone());

    match &args.command {
        Command::Get(url) => app::run_get(url, &ctx).await,
        Command::Post(post) => app::run_post(post, &ctx).await,
        Command::Head(url) => app::run_head(url, &ctx).await,
        Command::Time(url) => app::run_time(url, &ctx).await,
        Command::Ping(ping) => {
            let signal_task = setup_signal_shutdown_handler(&shutdown_tx);
            let result = app::run_ping(ping, &ctx).await;
            drop(shutdown_tx.send(()));
            signal_task.await?;
            result
        }
        Command::Stress(stress) => {
            let signal_task = setup_signal_shutdown_handler(&shutdown_tx);
            let result = app::run_stress_command(stress, &ctx).await;
            drop(shutdown_tx.send(()));
            signal_task.await?;
            result
        }
    }
}
