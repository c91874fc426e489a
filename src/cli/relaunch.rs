//! Relaunch handler
//!
//! Runs when the program was started without arguments and a fresh handoff
//! record was waiting. Nobody watches this process, so outcomes are only
//! logged and the exit code is always success.

use tracing::info;

use crate::application::ports::{AppActivator, CommandExecutor, UrlOpener};
use crate::application::{DispatchOutcome, DispatchReport, InteractionDispatcher};
use crate::domain::action::ActionPayload;
use crate::domain::config::AppConfig;
use crate::infrastructure::{ShellExecutor, SystemActivator, SystemUrlOpener};

use super::app::EXIT_SUCCESS;

/// Run one recovered click action through the dispatcher
pub async fn dispatch_recovered<E, O, A>(
    dispatcher: &InteractionDispatcher<E, O, A>,
    action: &ActionPayload,
) -> DispatchOutcome
where
    E: CommandExecutor,
    O: UrlOpener,
    A: AppActivator,
{
    info!(%action, "Handling notification click from relaunch");
    let outcome = dispatcher.dispatch(action).await;

    if let Ok(report) = &outcome.result {
        match report {
            DispatchReport::Opened(url) => info!(%url, "Relaunch opened URL"),
            DispatchReport::Executed(result) => {
                info!(exit_code = result.exit_code, "Relaunch command finished")
            }
            DispatchReport::Activated { target, activated } => {
                info!(target = %target, activated, "Relaunch activation finished")
            }
        }
    }
    outcome
}

/// Handle a relaunch with the system adapters
pub async fn run_relaunch(action: ActionPayload, config: &AppConfig) -> u8 {
    let timeout = config.command_timeout_or_default().as_std();
    let executor = ShellExecutor::with_timeout(timeout);
    let dispatcher = InteractionDispatcher::new(
        executor.clone(),
        SystemUrlOpener::new(executor),
        SystemActivator::new(),
    )
    .with_command_timeout(timeout);

    dispatch_recovered(&dispatcher, &action).await;
    EXIT_SUCCESS
}
