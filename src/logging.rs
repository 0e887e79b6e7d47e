//! log4rs setup.
//!
//! A `log4rs.yml` in the working directory wins; otherwise everything goes
//! to stderr at the level picked from the command line.

use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::error::Error;
use std::path::Path;

pub const LOG_CONFIG_FILE: &str = "log4rs.yml";

/// Level for the given flags.
pub fn level_for(verbose: bool, development: bool) -> LevelFilter {
    if verbose || development {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Console-only configuration at `level`.
pub fn console_config(level: LevelFilter) -> Result<Config, Box<dyn Error>> {
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(
            "{d(%H:%M:%S)} {h({l:5})} {t} - {m}{n}",
        )))
        .build();
    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Root::builder().appender("stderr").build(level))
        .map_err(|e| e.to_string())?;
    Ok(config)
}

/// Install the global logger.
pub fn init_logging(level: LevelFilter) -> Result<(), Box<dyn Error>> {
    if Path::new(LOG_CONFIG_FILE).exists() {
        log4rs::init_file(LOG_CONFIG_FILE, Default::default()).map_err(|e| e.to_string())?;
        log::debug!("logging configured from {LOG_CONFIG_FILE}");
    } else {
        log4rs::init_config(console_config(level)?).map_err(|e| e.to_string())?;
    }
    Ok(())
}
