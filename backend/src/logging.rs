//! Set up logging.

use slog::Drain;

/// Create the root logger.
///
/// `verbose` is the number of times `-v` was passed: 0 logs `Info` and
/// above, 1 adds `Debug`, and 2 or more adds `Trace`.
///
/// # Errors
///
/// This doesn’t currently fail, but it returns a `Result` so that callers
/// don’t have to change if setting up a drain ever can.
pub fn init(verbose: u8) -> anyhow::Result<slog::Logger> {
    let level = match verbose {
        0 => slog::Level::Info,
        1 => slog::Level::Debug,
        _ => slog::Level::Trace,
    };

    let decorator = slog_term::TermDecorator::new().stderr().build();
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();
    let drain = drain.filter_level(level).fuse();

    Ok(slog::Logger::root(
        drain,
        slog::o!("version" => env!("GIT_VERSION")),
    ))
}
