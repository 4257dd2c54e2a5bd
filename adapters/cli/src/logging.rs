use env_logger::{Builder, Env};
use log::LevelFilter;

/// Installs the global logger.
///
/// `verbose` selects `debug` over `info` as the default filter; `RUST_LOG`
/// still wins when set.
pub(crate) fn init(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let env = Env::default().default_filter_or(level.to_string());
    // A logger may already be installed when tests run in one process.
    let _ = Builder::from_env(env).try_init();
}
