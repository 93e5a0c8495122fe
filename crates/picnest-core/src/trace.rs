//! Tracing subscriber with a rolling file appender.
use crate::{error::Error, extension::TomlTableExt, state::State};
use std::{fs, io, path::Path, sync::OnceLock, time::Duration};
use tracing::Level;
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{
    filter::{EnvFilter, LevelFilter},
    fmt::{time::OffsetTime, writer::MakeWriterExt},
    layer::SubscriberExt,
};

/// Initializes the global tracing subscriber from the `[tracing]` config.
///
/// This should be called before the async runtime spawns any worker threads,
/// since the local offset can not be determined soundly afterwards.
pub fn init(state: &State) -> Result<(), Error> {
    if TRACING_APPENDER_GUARD.get().is_some() {
        tracing::warn!("the tracing subscriber has already been initialized");
        return Ok(());
    }

    let local_offset_time = OffsetTime::local_rfc_3339()
        .map_err(|err| Error::with_source("could not get local offset", err))?;

    let app_env = state.env();
    let in_dev_mode = app_env.is_dev();
    let mut env_filter = if in_dev_mode {
        "info,picnest=trace,picnest_core=trace,picnest_storage=debug"
    } else {
        "info"
    };

    let mut log_dir = "logs";
    let mut log_rotation = "daily";
    let mut log_rolling_period = Duration::from_secs(3600 * 24 * 30);
    let mut display_target = true;
    let mut display_filename = false;
    let mut display_line_number = false;
    let mut display_span_list = false;
    if let Some(config) = state.get_config("tracing") {
        if let Some(dir) = config.get_str("log-dir") {
            log_dir = dir;
        }
        if let Some(rotation) = config.get_str("log-rotation") {
            log_rotation = rotation;
        }
        if let Some(period) = config.get_duration("log-rolling-period") {
            log_rolling_period = period;
        }
        if let Some(filter) = config.get_str("filter") {
            env_filter = filter;
        }
        display_target = config.get_bool("display-target").unwrap_or(true);
        display_filename = config.get_bool("display-filename").unwrap_or(in_dev_mode);
        display_line_number = config
            .get_bool("display-line-number")
            .unwrap_or(in_dev_mode);
        display_span_list = config.get_bool("display-span-list").unwrap_or(false);
    }

    let log_dir = Path::new(log_dir);
    if !log_dir.exists() {
        fs::create_dir_all(log_dir).map_err(|err| {
            let log_dir = log_dir.display();
            Error::with_source(format!("fail to create the log directory `{log_dir}`"), err)
        })?;
    }

    let rolling_period_minutes = log_rolling_period.as_secs().div_ceil(60);
    let (rotation, max_log_files) = match log_rotation {
        "minutely" => (Rotation::MINUTELY, rolling_period_minutes),
        "hourly" => (Rotation::HOURLY, rolling_period_minutes.div_ceil(60)),
        "daily" => (Rotation::DAILY, rolling_period_minutes.div_ceil(60 * 24)),
        _ => (Rotation::NEVER, 1),
    };

    let app_name = state.name();
    let file_appender = RollingFileAppender::builder()
        .rotation(rotation)
        .filename_prefix(format!("{app_name}.{app_env}"))
        .filename_suffix("log")
        .max_log_files(max_log_files.try_into().unwrap_or(1))
        .build(log_dir)
        .map_err(|err| Error::with_source("fail to initialize the rolling file appender", err))?;
    let (non_blocking_appender, worker_guard) = tracing_appender::non_blocking(file_appender);
    let stdout = if in_dev_mode {
        io::stdout.with_max_level(Level::DEBUG)
    } else {
        io::stdout.with_max_level(Level::WARN)
    };
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(display_target)
        .with_file(display_filename)
        .with_line_number(display_line_number)
        .with_timer(local_offset_time)
        .with_writer(stdout.and(non_blocking_appender));
    let filter_layer = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .parse_lossy(env_filter);
    if in_dev_mode {
        let subscriber = tracing_subscriber::registry()
            .with(filter_layer)
            .with(fmt_layer.pretty());
        tracing::subscriber::set_global_default(subscriber).map_err(|err| {
            Error::with_source("fail to set the default subscriber with a `Pretty` formatter", err)
        })?;
    } else {
        let json_fmt_layer = fmt_layer
            .json()
            .with_current_span(true)
            .with_span_list(display_span_list);
        let subscriber = tracing_subscriber::registry()
            .with(filter_layer)
            .with(json_fmt_layer);
        tracing::subscriber::set_global_default(subscriber).map_err(|err| {
            Error::with_source("fail to set the default subscriber with a `Json` formatter", err)
        })?;
    }
    if TRACING_APPENDER_GUARD.set(worker_guard).is_err() {
        tracing::warn!("the worker guard for the tracing appender has already been set");
    }
    Ok(())
}

/// Tracing appender guard.
static TRACING_APPENDER_GUARD: OnceLock<WorkerGuard> = OnceLock::new();
