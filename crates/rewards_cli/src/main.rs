use clap::Parser;
use rewards_cli::cli::{Cli, Command, collect_overrides};
use rewards_cli::render;
use rewards_core::catalog;
use rewards_core::config::{self, Config};
use rewards_core::error::AppError;
use rewards_core::notify::provider::install_provider;
use rewards_core::notify::{
    ClickOutcome, DispatcherWorker, ExecutableLauncher, LinePushProvider, NotificationDispatcher,
    PushEvent, surface_from_env,
};
use rewards_core::storage::json_store;
use rewards_core::task_api::{self, TaskBoard};
use std::path::PathBuf;
use std::sync::mpsc;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "warn,rewards_core=info,rewards=info";

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn init_tracing(config: &Config) {
    let fallback = config.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER);
    // stdout carries command output; logs go to stderr.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .init();
}

fn resolve_config(cli: &Cli) -> Result<(Config, Option<AppError>), AppError> {
    let loaded = config::load_config_with_fallback();
    let overrides = collect_overrides(&cli.config_override).map_err(AppError::invalid_input)?;
    Ok((
        config::merge_overrides(&loaded.config, &overrides),
        loaded.error,
    ))
}

fn catalog_path(config: &Config) -> Result<PathBuf, AppError> {
    match config.catalog_path.as_deref() {
        Some(path) => Ok(PathBuf::from(path)),
        None => catalog::catalog_path(),
    }
}

fn store_path(config: &Config) -> Result<PathBuf, AppError> {
    match config.store_path.as_deref() {
        Some(path) => Ok(PathBuf::from(path)),
        None => json_store::store_path(),
    }
}

fn open_board(
    config: &Config,
) -> Result<TaskBoard<json_store::JsonStateStore, rewards_core::clock::SystemClock>, AppError> {
    task_api::open_board(&catalog_path(config)?, &store_path(config)?)
}

fn dispatcher(config: &Config) -> Result<NotificationDispatcher, AppError> {
    Ok(NotificationDispatcher::new(
        config.notification.clone(),
        surface_from_env()?,
        Box::new(ExecutableLauncher::new()),
    ))
}

fn click_label(outcome: ClickOutcome) -> &'static str {
    match outcome {
        ClickOutcome::OpenedRoot => "opened",
        ClickOutcome::Closed => "closed",
        ClickOutcome::Ignored => "ignored",
    }
}

fn run_command(cli: Cli, config: &Config) -> Result<(), AppError> {
    match cli.command {
        Command::Board => {
            let buckets = open_board(config)?.buckets()?;
            if cli.json {
                println!("{}", render::board_json(&buckets));
            } else {
                println!("{}", render::board_plain(&buckets));
            }
        }
        Command::Show { id } => {
            let detail = open_board(config)?.detail(&id)?;
            if cli.json {
                println!("{}", render::detail_json(&detail));
            } else {
                println!("{}", render::detail_plain(&detail));
            }
        }
        Command::Complete { id } => {
            let board = open_board(config)?;
            let completion = board.complete(&id)?;
            if cli.json {
                println!("{}", render::completion_json(&completion));
            } else {
                let title = board
                    .catalog()
                    .get(&completion.task_id)
                    .map(|task| task.title.as_str())
                    .unwrap_or(completion.task_id.as_str());
                println!(
                    "Completed task: {} ({}), earned {}",
                    title, completion.task_id, completion.reward_amount
                );
            }
        }
        Command::Push { payload } => {
            let event = PushEvent::parse(payload.as_deref().unwrap_or("{}"));
            let dispatcher = dispatcher(config)?;
            let (sender, receiver) = mpsc::channel();
            let request = dispatcher.deliver(
                &event,
                Box::new(move |click| {
                    let _ = sender.send(click);
                }),
            )?;

            if cli.json {
                let payload = serde_json::to_value(&request)
                    .map_err(|err| AppError::invalid_data(err.to_string()))?;
                println!("{payload}");
            } else {
                println!("Notification sent: {} - {}", request.title, request.body);
            }

            // The surface drops the handler when no interaction can follow.
            if let Ok(click) = receiver.recv() {
                let outcome = dispatcher.handle_click(&click)?;
                if !cli.json {
                    println!("Notification {}", click_label(outcome));
                }
            }
        }
        Command::Listen => {
            let provider = install_provider(Box::new(LinePushProvider::stdin()))?;
            let worker = DispatcherWorker::spawn(dispatcher(config)?)?;
            tracing::info!(provider = provider.name(), "listening for push events");

            let mut delivered = 0usize;
            provider.run(&mut |event| match worker.push(event) {
                Ok(()) => delivered += 1,
                Err(err) => tracing::warn!(error = %err, "push event not queued"),
            })?;
            worker.drain()?;

            if cli.json {
                println!("{}", serde_json::json!({ "delivered": delivered }));
            } else {
                println!("Delivered {delivered} push event(s)");
            }
        }
    }

    Ok(())
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            if !err.use_stderr() {
                let _ = err.print();
                return;
            }
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    let (config, config_error) = match resolve_config(&cli) {
        Ok(resolved) => resolved,
        Err(err) => {
            eprintln!("ERROR: {}", err);
            std::process::exit(1);
        }
    };

    init_tracing(&config);
    if let Some(err) = config_error {
        tracing::warn!(error = %err, "config ignored, using defaults");
    }

    if let Err(err) = run_command(cli, &config) {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
