//! Stderr logging for the command-line tools.

use std::io::Write;

use log::LevelFilter;

/// `--quiet` keeps only errors, `--verbose` adds debug output.
pub fn level_for(verbose: bool, quiet: bool) -> LevelFilter {
    if quiet {
        LevelFilter::Error
    } else if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Installs a `LEVEL: message` logger. Dependencies log at warn at most.
pub fn init(verbose: bool, quiet: bool) {
    let level = level_for(verbose, quiet);
    let _ = env_logger::Builder::new()
        .filter_level(level.min(LevelFilter::Warn))
        .filter_module(env!("CARGO_CRATE_NAME"), level)
        .format(|buf, record| writeln!(buf, "{}: {}", record.level(), record.args()))
        .target(env_logger::Target::Stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::level_for;
    use log::LevelFilter;

    #[test]
    fn quiet_overrides_verbose() {
        assert_eq!(level_for(true, true), LevelFilter::Error);
        assert_eq!(level_for(true, false), LevelFilter::Debug);
        assert_eq!(level_for(false, false), LevelFilter::Info);
    }
}
