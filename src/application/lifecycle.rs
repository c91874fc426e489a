//! Lifecycle controller
//!
//! Keeps a sending invocation alive long enough to catch a click on its
//! notification without hanging non-interactive callers. All inputs
//! (interactions, dispatch completion, signals, quit) arrive as
//! [`LifecycleEvent`]s on one bounded channel.

use std::collections::HashMap;
use std::fmt;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

use tokio::sync::mpsc;
use tokio::time::{sleep, Sleep};
use tracing::{debug, info, warn};

use crate::domain::action::{ActionPayload, ClickPayload};
use crate::domain::duration::Duration;
use crate::domain::lifecycle::{LifecycleSession, LifecycleState};
use crate::domain::notification::InteractionEvent;

use super::dispatch::{DispatchOutcome, InteractionDispatcher};
use super::ports::{AppActivator, CommandExecutor, HandoffStore, InteractionCallback, UrlOpener};

/// Capacity of the lifecycle event channel
const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Termination signals the controller reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationSignal {
    Interrupt,
    Terminate,
}

impl fmt::Display for TerminationSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interrupt => write!(f, "SIGINT"),
            Self::Terminate => write!(f, "SIGTERM"),
        }
    }
}

/// Messages consumed by the controller
#[derive(Debug, Clone)]
pub enum LifecycleEvent {
    Interaction(InteractionEvent),
    ActionCompleted(DispatchOutcome),
    Signal(TerminationSignal),
    Quit,
}

/// Sending half of the controller's event channel
pub type LifecycleSender = mpsc::Sender<LifecycleEvent>;

/// How long to wait for an interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitMode {
    /// Give up after the duration
    Timed(StdDuration),
    /// Wait until an interaction, a signal or a quit
    Persistent,
}

/// Why the wait ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    ActionCompleted,
    Dismissed,
    TimedOut,
    Signal(TerminationSignal),
    Quit,
    ChannelClosed,
}

/// Summary of a finished wait
#[derive(Debug, Clone)]
pub struct LifecycleReport {
    pub reason: ShutdownReason,
    pub final_state: LifecycleState,
    pub outcome: Option<DispatchOutcome>,
}

/// Controller timing
#[derive(Debug, Clone, Copy)]
pub struct LifecycleConfig {
    /// Delay between a completed action and shutdown
    pub grace_period: StdDuration,
    /// Wall-clock limit for click commands
    pub command_timeout: StdDuration,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            grace_period: Duration::default_grace_period().as_std(),
            command_timeout: Duration::default_command_timeout().as_std(),
        }
    }
}

/// Owns the wait loop and the decision to terminate.
pub struct LifecycleController<E, O, A>
where
    E: CommandExecutor,
    O: UrlOpener,
    A: AppActivator,
{
    dispatcher: Arc<InteractionDispatcher<E, O, A>>,
    sender: LifecycleSender,
    receiver: mpsc::Receiver<LifecycleEvent>,
    payloads: Arc<Mutex<HashMap<String, ClickPayload>>>,
    handoff: Option<Arc<dyn HandoffStore>>,
    session: LifecycleSession,
    config: LifecycleConfig,
}

impl<E, O, A> LifecycleController<E, O, A>
where
    E: CommandExecutor + 'static,
    O: UrlOpener + 'static,
    A: AppActivator + 'static,
{
    /// Create a controller with its own event channel and dispatcher
    pub fn new(executor: E, opener: O, activator: A, config: LifecycleConfig) -> Self {
        let (sender, receiver) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let dispatcher = InteractionDispatcher::new(executor, opener, activator)
            .with_command_timeout(config.command_timeout)
            .with_completion(sender.clone());

        Self {
            dispatcher: Arc::new(dispatcher),
            sender,
            receiver,
            payloads: Arc::new(Mutex::new(HashMap::new())),
            handoff: None,
            session: LifecycleSession::new(),
            config,
        }
    }

    /// Mailbox whose record is discarded when a click is accepted here,
    /// so a relaunch cannot replay it.
    pub fn with_handoff(mut self, store: Arc<dyn HandoffStore>) -> Self {
        self.handoff = Some(store);
        self
    }

    /// Sender for signal handlers and explicit quits
    pub fn sender(&self) -> LifecycleSender {
        self.sender.clone()
    }

    /// Callback to register with the notification center.
    ///
    /// Safe to call from non-async threads; events beyond the channel
    /// capacity are dropped.
    pub fn interaction_callback(&self) -> InteractionCallback {
        let sender = self.sender.clone();
        Arc::new(move |event: InteractionEvent| {
            if let Err(e) = sender.try_send(LifecycleEvent::Interaction(event)) {
                debug!(error = %e, "Dropped interaction event");
            }
        })
    }

    /// Associate a posted notification with its click payload
    pub fn register(&self, notification_id: impl Into<String>, payload: ClickPayload) {
        if let Ok(mut payloads) = self.payloads.lock() {
            payloads.insert(notification_id.into(), payload);
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> LifecycleState {
        self.session.state()
    }

    fn is_registered(&self, notification_id: &str) -> bool {
        self.payloads
            .lock()
            .map(|payloads| payloads.contains_key(notification_id))
            .unwrap_or(false)
    }

    fn resolve(&self, event: &InteractionEvent) -> Option<ActionPayload> {
        let payloads = self.payloads.lock().ok()?;
        payloads
            .get(&event.notification_id)?
            .action_for(&event.action_id)
    }

    /// Wait for an interaction, a timeout, a signal or a quit, then shut down.
    pub async fn run(mut self, mode: WaitMode) -> LifecycleReport {
        if let Err(e) = self.session.begin_waiting() {
            warn!(error = %e, "Lifecycle already started");
        }

        let mut timer: Option<Pin<Box<Sleep>>> = match mode {
            WaitMode::Timed(timeout) => Some(Box::pin(sleep(timeout))),
            WaitMode::Persistent => None,
        };
        debug!(?mode, "Waiting for interaction");

        let mut outcome = None;
        let reason = loop {
            tokio::select! {
                event = self.receiver.recv() => {
                    let Some(event) = event else {
                        break ShutdownReason::ChannelClosed;
                    };
                    match event {
                        LifecycleEvent::Interaction(interaction) => {
                            if !self.session.is_waiting() {
                                debug!(id = %interaction.notification_id, "Ignoring interaction while dispatching");
                                continue;
                            }
                            if !self.is_registered(&interaction.notification_id) {
                                debug!(id = %interaction.notification_id, "Ignoring interaction for unknown notification");
                                continue;
                            }
                            if interaction.is_dismissal() {
                                info!(id = %interaction.notification_id, "Notification dismissed");
                                break ShutdownReason::Dismissed;
                            }
                            let Some(action) = self.resolve(&interaction) else {
                                debug!(action_id = %interaction.action_id, "No action bound to interaction");
                                continue;
                            };
                            if let Err(e) = self.session.interaction_received() {
                                warn!(error = %e, "Unexpected interaction");
                                continue;
                            }
                            if let Some(store) = &self.handoff {
                                if store.discard(&interaction.notification_id) {
                                    debug!(id = %interaction.notification_id, "Discarded handoff record handled in process");
                                }
                            }
                            // Cancel the timer; the dispatch owns the remaining lifetime
                            timer = None;
                            let dispatcher = Arc::clone(&self.dispatcher);
                            tokio::spawn(async move {
                                dispatcher.dispatch(&action).await;
                            });
                        }
                        LifecycleEvent::ActionCompleted(completed) => {
                            outcome = Some(completed);
                            sleep(self.config.grace_period).await;
                            break ShutdownReason::ActionCompleted;
                        }
                        LifecycleEvent::Signal(signal) => {
                            info!(%signal, "Received termination signal");
                            if let Err(e) = self.session.signal_received() {
                                warn!(error = %e, "Signal in unexpected state");
                            }
                            break ShutdownReason::Signal(signal);
                        }
                        LifecycleEvent::Quit => break ShutdownReason::Quit,
                    }
                }
                _ = wait_timer(&mut timer) => {
                    if let Err(e) = self.session.timer_elapsed() {
                        warn!(error = %e, "Timer fired in unexpected state");
                    }
                    break ShutdownReason::TimedOut;
                }
            }
        };

        if let Err(e) = self.session.begin_shutdown() {
            debug!(error = %e, "Shutdown from unexpected state");
        }
        if let Err(e) = self.session.terminate() {
            debug!(error = %e, "Terminate from unexpected state");
        }
        debug!(?reason, "Lifecycle finished");

        LifecycleReport {
            reason,
            final_state: self.session.state(),
            outcome,
        }
    }
}

/// Resolve when the timer fires; never resolves without a timer
async fn wait_timer(timer: &mut Option<Pin<Box<Sleep>>>) {
    match timer {
        Some(sleep) => sleep.as_mut().await,
        None => std::future::pending().await,
    }
}
