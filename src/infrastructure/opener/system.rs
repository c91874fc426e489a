//! System URL opener adapter (xdg-open / open)

use async_trait::async_trait;
use tracing::debug;
use url::Url;

use crate::application::ports::{CommandExecutor, ExecutorError, OpenError, UrlOpener};

#[cfg(target_os = "macos")]
const OPEN_PROGRAM: &str = "open";
#[cfg(not(target_os = "macos"))]
const OPEN_PROGRAM: &str = "xdg-open";

/// Hands URLs to the platform's default handler.
///
/// The handler is spawned detached so a slow browser start does not hold
/// up process exit.
pub struct SystemUrlOpener<E: CommandExecutor> {
    executor: E,
    program: String,
}

impl<E: CommandExecutor> SystemUrlOpener<E> {
    /// Create an opener using the platform default program
    pub fn new(executor: E) -> Self {
        Self {
            executor,
            program: OPEN_PROGRAM.to_string(),
        }
    }

    /// Use a different opener program
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Shell command line for opening a URL
    fn command_line(&self, url: &Url) -> Result<String, OpenError> {
        let quoted = shlex::try_quote(url.as_str())
            .map_err(|e| OpenError::OpenFailed(e.to_string()))?;
        Ok(format!("{} {}", self.program, quoted))
    }
}

#[async_trait]
impl<E: CommandExecutor> UrlOpener for SystemUrlOpener<E> {
    async fn open(&self, url: &Url) -> Result<(), OpenError> {
        let command = self.command_line(url)?;
        debug!(%command, "Opening URL");

        self.executor
            .execute_detached(&command)
            .map(|_| ())
            .map_err(|e| match e {
                ExecutorError::ExecutionFailed(reason) => {
                    OpenError::HandlerNotFound(format!("{}: {}", self.program, reason))
                }
                other => OpenError::OpenFailed(other.to_string()),
            })
    }
}
