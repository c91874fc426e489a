//! Send command handler

use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use crate::application::ports::{ImageResolver, NotificationCenter};
use crate::application::{
    notification_identifier, SendError, SendNotificationUseCase, WaitMode,
};
use crate::domain::config::AppConfig;
use crate::domain::error::ValidationError;
use crate::domain::notification::NotificationRequest;
use crate::infrastructure::{FsMailbox, NotifyRustCenter, SoundCatalog, SystemImageResolver};

use super::app::{system_controller, EXIT_ERROR, EXIT_USAGE_ERROR};
use super::args::SendArgs;
use super::presenter::Presenter;
use super::signals::forward_signals;

/// Errors ending a send invocation
#[derive(Debug, Error)]
pub enum SendCommandError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Send(#[from] SendError),
}

impl SendCommandError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => EXIT_USAGE_ERROR,
            Self::Send(_) => EXIT_ERROR,
        }
    }
}

/// Message from the flag, else from piped stdin
fn read_message(flag: Option<&str>) -> Result<String, ValidationError> {
    let message = match flag {
        Some(message) => message.to_string(),
        None if !io::stdin().is_terminal() => {
            let mut piped = String::new();
            if let Err(e) = io::stdin().read_to_string(&mut piped) {
                debug!(error = %e, "Failed to read stdin");
            }
            piped.trim_end_matches(['\n', '\r']).to_string()
        }
        None => String::new(),
    };

    if message.trim().is_empty() {
        return Err(ValidationError::MissingMessage);
    }
    Ok(message)
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Resolve an image reference.
///
/// Local problems are validation errors; failed downloads only skip the image.
async fn resolve_image<R: ImageResolver>(
    resolver: &R,
    reference: Option<&str>,
    presenter: &Presenter,
) -> Result<Option<PathBuf>, ValidationError> {
    let Some(reference) = reference.map(str::trim).filter(|r| !r.is_empty()) else {
        return Ok(None);
    };

    match resolver.resolve(reference).await {
        Ok(path) => Ok(Some(path)),
        Err(e) if e.is_remote() => {
            warn!(reference, error = %e, "Skipping remote image");
            presenter.warn(&format!("Skipping image {}: {}", reference, e));
            Ok(None)
        }
        Err(e) => Err(ValidationError::InvalidImage {
            path: reference.to_string(),
            reason: e.to_string(),
        }),
    }
}

/// Validate the arguments and build the request to post
pub async fn build_request<R: ImageResolver>(
    args: &SendArgs,
    config: &AppConfig,
    sounds: &SoundCatalog,
    images: &R,
    presenter: &Presenter,
) -> Result<NotificationRequest, ValidationError> {
    let message = read_message(args.message.as_deref())?;
    let sound = sounds.validate(args.sound.as_deref())?;

    if let Some(raw) = non_blank(args.open.as_deref()) {
        Url::parse(&raw).map_err(|e| ValidationError::InvalidUrl {
            url: raw.clone(),
            reason: e.to_string(),
        })?;
    }
    let payload = args.payload();
    payload.validate()?;

    let app_icon = resolve_image(images, args.app_icon.as_deref(), presenter).await?;
    let content_image = resolve_image(images, args.content_image.as_deref(), presenter).await?;

    let group = non_blank(args.group.as_deref());
    let title = non_blank(args.title.as_deref())
        .unwrap_or_else(|| config.app_name_or_default().to_string());

    let mut request =
        NotificationRequest::new(notification_identifier(group.as_deref()), title, message);
    request.subtitle = non_blank(args.subtitle.as_deref());
    request.group = group;
    request.sound = sound;
    request.app_icon = app_icon;
    request.content_image = content_image;
    request.payload = payload;
    request.sender = non_blank(args.sender.as_deref());
    request.critical = args.ignore_dnd;

    Ok(request)
}

/// Handle the send command
pub async fn handle_send(
    args: SendArgs,
    config: &AppConfig,
    mailbox: &FsMailbox,
    presenter: &Presenter,
) -> Result<(), SendCommandError> {
    let request = build_request(
        &args,
        config,
        &SoundCatalog::new(),
        &SystemImageResolver::new(),
        presenter,
    )
    .await?;

    let center = NotifyRustCenter::with_app_name(config.app_name_or_default());
    let controller = (!request.payload.is_empty() || args.persist)
        .then(|| system_controller(config).with_handoff(Arc::new(mailbox.clone())));
    if let Some(controller) = &controller {
        center.on_interaction(controller.interaction_callback());
        controller.register(request.identifier.clone(), request.payload.clone());
    }

    let use_case = SendNotificationUseCase::new(center, mailbox);
    let output = use_case.execute(&request).await?;
    debug!(
        id = %output.notification_id,
        handoff = output.handoff_stored,
        "Notification sent"
    );

    let Some(controller) = controller else {
        return Ok(());
    };

    if let Err(e) = forward_signals(controller.sender()) {
        warn!(error = %e, "Failed to install signal handlers");
    }

    let mode = if args.persist {
        presenter.info("Waiting for interaction (Ctrl+C to quit)");
        WaitMode::Persistent
    } else {
        WaitMode::Timed(config.interaction_timeout_or_default().as_std())
    };

    let report = controller.run(mode).await;
    info!(reason = ?report.reason, state = %report.final_state, "Stopped waiting");

    Ok(())
}
