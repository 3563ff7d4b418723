use tracing::Level;
use tracing_subscriber::fmt;

/// Installs the global subscriber. Quiet by default; `--verbose` shows
/// chunk progress and retry warnings.
pub fn init(verbose: bool) {
    if !verbose {
        return;
    }
    let _ = fmt()
        .with_target(false)
        .with_level(true)
        .with_max_level(Level::DEBUG)
        .try_init();
}
