//! Interaction dispatch use case
//!
//! Resolves a click action into exactly one side effect: open a URL, run a
//! command or activate an application.

use std::time::Duration as StdDuration;

use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use crate::domain::action::ActionPayload;

use super::lifecycle::{LifecycleEvent, LifecycleSender};
use super::ports::{
    ActivationError, AppActivator, CommandExecutor, ExecutionResult, ExecutorError, OpenError,
    UrlOpener,
};

/// Errors from dispatching a click action
#[derive(Debug, Clone, Error)]
pub enum DispatchError {
    #[error("Malformed URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error(transparent)]
    Open(#[from] OpenError),

    #[error(transparent)]
    Execute(#[from] ExecutorError),

    #[error(transparent)]
    Activate(#[from] ActivationError),
}

/// What a successful dispatch did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchReport {
    Opened(Url),
    Executed(ExecutionResult),
    Activated { target: String, activated: bool },
}

/// Result of one dispatch, reported to the lifecycle controller
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub action: ActionPayload,
    pub result: Result<DispatchReport, DispatchError>,
}

impl DispatchOutcome {
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }
}

/// Executes click actions through the opener, executor and activator ports.
pub struct InteractionDispatcher<E, O, A>
where
    E: CommandExecutor,
    O: UrlOpener,
    A: AppActivator,
{
    executor: E,
    opener: O,
    activator: A,
    command_timeout: StdDuration,
    completion: Option<LifecycleSender>,
}

impl<E, O, A> InteractionDispatcher<E, O, A>
where
    E: CommandExecutor,
    O: UrlOpener,
    A: AppActivator,
{
    /// Create a dispatcher using the executor's default timeout
    pub fn new(executor: E, opener: O, activator: A) -> Self {
        let command_timeout = executor.default_timeout();
        Self {
            executor,
            opener,
            activator,
            command_timeout,
            completion: None,
        }
    }

    /// Override the wall-clock limit for click commands
    pub fn with_command_timeout(mut self, timeout: StdDuration) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Report every finished dispatch as `ActionCompleted` on this channel
    pub fn with_completion(mut self, sender: LifecycleSender) -> Self {
        self.completion = Some(sender);
        self
    }

    /// Run one action. Failures are logged and returned, never raised.
    pub async fn dispatch(&self, action: &ActionPayload) -> DispatchOutcome {
        debug!(%action, "Dispatching click action");

        let result = match action {
            ActionPayload::OpenUrl(raw) => self.open_url(raw).await,
            ActionPayload::RunCommand(command) => self.run_command(command).await,
            ActionPayload::ActivateApp(target) => self.activate_app(target).await,
        };

        if let Err(e) = &result {
            warn!(kind = action.kind(), error = %e, "Click action failed");
        }

        let outcome = DispatchOutcome {
            action: action.clone(),
            result,
        };

        if let Some(sender) = &self.completion {
            if sender
                .send(LifecycleEvent::ActionCompleted(outcome.clone()))
                .await
                .is_err()
            {
                debug!("Lifecycle controller already gone");
            }
        }

        outcome
    }

    async fn open_url(&self, raw: &str) -> Result<DispatchReport, DispatchError> {
        let url = Url::parse(raw.trim()).map_err(|e| DispatchError::InvalidUrl {
            url: raw.to_string(),
            reason: e.to_string(),
        })?;
        self.opener.open(&url).await?;
        info!(%url, "Opened URL");
        Ok(DispatchReport::Opened(url))
    }

    async fn run_command(&self, command: &str) -> Result<DispatchReport, DispatchError> {
        let result = self.executor.execute(command, self.command_timeout).await?;
        info!(
            command = %result.command,
            exit_code = result.exit_code,
            stdout = %result.stdout.trim_end(),
            "Command finished"
        );
        Ok(DispatchReport::Executed(result))
    }

    async fn activate_app(&self, target: &str) -> Result<DispatchReport, DispatchError> {
        let activated = self.activator.activate(target).await?;
        if activated {
            info!(target, "Activated application");
        } else {
            warn!(target, "Application did not come to the foreground");
        }
        Ok(DispatchReport::Activated {
            target: target.to_string(),
            activated,
        })
    }
}
