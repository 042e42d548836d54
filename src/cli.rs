use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

/// Log to stderr, with each `-v` raising the level by one step
pub fn init_logging(verbosity: i32) -> Result<(), log::SetLoggerError> {
    TermLogger::init(
        select_log_level_filter(verbosity),
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
}

fn select_log_level_filter(verbosity: i32) -> LevelFilter {
    match verbosity {
        i32::MIN..=0 => LevelFilter::Off,
        1 => LevelFilter::Error,
        2 => LevelFilter::Warn,
        3 => LevelFilter::Info,
        4 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}
