use chrono::{Duration, Local};
use clap::Parser;
use crowdmon_service::config::MonitorConfig;
use crowdmon_service::logging::{self, Component};
use crowdmon_service::replay::ReplaySource;
use crowdmon_service::session::MonitorSession;
use crowdmon_service::sinks::AlertDispatcher;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "crowdmon", about = "Crowd panic and stampede risk monitor")]
struct Args {
    /// TOML configuration file (defaults to $CROWDMON_CONFIG, then crowdmon.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// JSON-lines recording of per-frame motion regions
    #[arg(long, value_name = "PATH")]
    replay: PathBuf,
    /// Frame spacing for recorded frames without an offset (at least 1 ms)
    #[arg(long, default_value_t = 33, value_parser = clap::value_parser!(i64).range(1..))]
    frame_interval_ms: i64,
    /// Disable the audible HIGH-risk alert
    #[arg(long)]
    no_sound: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = MonitorConfig::load_from_env(args.config.as_deref())?;
    if args.no_sound {
        config.alerts.sound_enabled = false;
    }

    logging::init_logger(
        config.logging.min_level,
        config.logging.log_file.as_deref(),
        config.logging.console_timestamps,
    );

    let started_at = Local::now();
    let mut session = match MonitorSession::start(&config, started_at) {
        Ok(session) => session,
        Err(e) => {
            logging::error(Component::Config, None, &e.to_string());
            return Err(e.into());
        }
    };

    let mut dispatcher = AlertDispatcher::from_settings(&config.alerts);
    let mut source = ReplaySource::open(&args.replay)?;
    let interval = Duration::milliseconds(args.frame_interval_ms);

    logging::info(Component::System, None, "Crowd Safety Monitoring Started");
    logging::debug(
        Component::Sink,
        None,
        &format!("alert sinks: {}", dispatcher.sink_names().join(", ")),
    );

    let mut last_frame_at = started_at;
    let mut shown_level = None;
    let mut out_of_range = 0u64;
    for (index, frame) in source.by_ref().enumerate() {
        let now = match frame.timestamp(started_at, index as u64, interval) {
            Ok(now) => now,
            Err(e) => {
                out_of_range += 1;
                logging::warn(Component::Replay, Some(index as u64), &e.to_string());
                continue;
            }
        };
        last_frame_at = now;

        let outcome = match session.process_frame(&frame.regions, frame.geometry(), now) {
            Ok(outcome) => outcome,
            Err(e) => {
                logging::error(Component::Metrics, Some(index as u64), &e.to_string());
                return Err(e.into());
            }
        };

        if shown_level != Some(outcome.classification.level) {
            shown_level = Some(outcome.classification.level);
            let (label, (b, g, r)) = outcome.risk_banner();
            logging::info(
                Component::Classifier,
                Some(outcome.frame_index),
                &format!("{} (BGR {},{},{})", label, b, g, r),
            );
        }

        if let Some(alert) = &outcome.alert {
            dispatcher.dispatch(alert, Some(outcome.frame_index));
        }
    }

    if source.skipped() > 0 {
        logging::warn(
            Component::Replay,
            None,
            &format!("{} unreadable recording lines skipped", source.skipped()),
        );
    }
    if out_of_range > 0 {
        logging::warn(
            Component::Replay,
            None,
            &format!("{} frames skipped with out-of-range timestamps", out_of_range),
        );
    }

    let stats = session.stats();
    logging::log_session_summary(
        stats.frames,
        stats.alerts,
        stats.average_fps(last_frame_at),
        stats.rejected_regions,
        dispatcher.failures(),
    );
    println!("Average FPS: {:.2}", stats.average_fps(last_frame_at));

    Ok(())
}
