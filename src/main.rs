//! smart-notify CLI entry point

use std::process::ExitCode;

use clap::Parser;
use tracing::debug;

use smart_notify::application::ports::HandoffStore;
use smart_notify::application::LaunchContextClassifier;
use smart_notify::cli::{
    app::{build_mailbox, load_merged_config, EXIT_ERROR, EXIT_USAGE_ERROR},
    args::{Cli, Commands, ListArgs, RemoveArgs},
    config_cmd::handle_config_command,
    list_cmd::{handle_list, handle_remove, ManageError},
    logging::init_logging,
    presenter::Presenter,
    relaunch::run_relaunch,
    send_cmd::handle_send,
};
use smart_notify::domain::config::AppConfig;
use smart_notify::domain::context::LaunchContext;
use smart_notify::infrastructure::{NotifyRustCenter, XdgConfigStore};

/// Group value meaning every notification (also stored for a bare `--list`)
const ALL_GROUPS: &str = "ALL";

fn manage_exit(result: Result<(), ManageError>, presenter: &Presenter) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            presenter.error(&e.to_string());
            match e {
                ManageError::Validation(_) => ExitCode::from(EXIT_USAGE_ERROR),
                ManageError::Center(_) => ExitCode::from(EXIT_ERROR),
            }
        }
    }
}

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    init_logging();

    let config = load_merged_config(AppConfig::empty()).await;
    let mailbox = build_mailbox(&config);

    // A bare invocation may be the desktop relaunching us after a click
    if std::env::args_os().len() <= 1 {
        let classifier = LaunchContextClassifier::new(&mailbox);
        if let LaunchContext::NotificationClick(action) = classifier.classify() {
            return ExitCode::from(run_relaunch(action, &config).await);
        }
    } else {
        let purged = mailbox.purge_expired();
        debug!(purged, "Purged expired handoff records");
    }

    let cli = Cli::parse();
    let presenter = Presenter::new();
    let center = || NotifyRustCenter::with_app_name(config.app_name_or_default());

    let mut send = match cli.command {
        Some(Commands::Config { action }) => {
            let store = XdgConfigStore::new();
            if let Err(e) = handle_config_command(action, &store, &presenter).await {
                presenter.error(&e.to_string());
                return ExitCode::from(EXIT_ERROR);
            }
            return ExitCode::SUCCESS;
        }
        Some(Commands::List(args)) => {
            return manage_exit(handle_list(args, &center(), &presenter).await, &presenter);
        }
        Some(Commands::Remove(args)) => {
            return manage_exit(handle_remove(args, &center(), &presenter).await, &presenter);
        }
        Some(Commands::Send(args)) => args,
        None => cli.send,
    };

    // Compatibility flags
    if let Some(group) = send.list.take() {
        let args = ListArgs {
            group: (group != ALL_GROUPS).then_some(group),
            verbose: false,
        };
        return manage_exit(handle_list(args, &center(), &presenter).await, &presenter);
    }
    if let Some(group) = send.remove.take() {
        let args = RemoveArgs {
            all: group == ALL_GROUPS,
            group: Some(group),
        };
        return manage_exit(handle_remove(args, &center(), &presenter).await, &presenter);
    }

    match handle_send(send, &config, &mailbox, &presenter).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            presenter.error(&e.to_string());
            ExitCode::from(e.exit_code())
        }
    }
}
