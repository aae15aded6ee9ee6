use chrono::NaiveDateTime;
use colored::{ColoredString, Colorize};
use fern::Dispatch;
use log::{Level, LevelFilter};

const TIME_FORMAT: &str = "%Y.%m.%d %H:%M:%S";

/// Crates whose records follow the `--verbose` switch. Everything else is
/// kept at `warn`.
const OWN_TARGETS: [&str; 4] = [
    "padbindd",
    "padbind_gamepad",
    "padbind_joystick",
    "padbind_workspace",
];

fn format_line(time: NaiveDateTime, level: Level, message: &str) -> String {
    let time = time.format(TIME_FORMAT);
    match level {
        Level::Info => format!("[{time}] {message}"),
        _ => format!("[{time}] {}: {message}", level.as_str().to_lowercase()),
    }
}

fn paint(level: Level, line: String) -> ColoredString {
    match level {
        Level::Error => line.bright_red(),
        Level::Warn => line.bright_yellow(),
        Level::Info => line.normal(),
        Level::Debug | Level::Trace => line.dimmed(),
    }
}

/// Installs the global logger on stdout.
pub fn setup(verbose: bool, no_color: bool) {
    if no_color {
        colored::control::set_override(false);
    }
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let dispatch = OWN_TARGETS.iter().fold(
        Dispatch::new().level(LevelFilter::Warn),
        |dispatch, target| dispatch.level_for(*target, level),
    );
    dispatch
        .format(|out, message, record| {
            let now = chrono::Local::now().naive_local();
            let line = format_line(now, record.level(), &message.to_string());
            out.finish(format_args!("{}", paint(record.level(), line)))
        })
        .chain(std::io::stdout())
        .apply()
        .expect("Unable to set up logger");
}
