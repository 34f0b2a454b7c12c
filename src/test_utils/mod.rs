//! Test utilities for MDXE
//!
//! Helpers shared by unit tests and the integration suite: a scripted
//! [`MockTransport`] that stands in for the network, document fixtures, and a
//! [`TestProject`] that bundles a temporary project directory with an isolated
//! cache.
//!
//! # Example
//!
//! ```rust,no_run
//! use mdxe::fetcher::HttpResponse;
//! use mdxe::test_utils::{MockTransport, TestProject};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let project = TestProject::new()?;
//! project.transport.respond("https://esm.sh/react", HttpResponse::ok("export default 1"));
//! let fetcher = project.fetcher();
//! assert_eq!(fetcher.fetch("https://esm.sh/react", None).await?, "export default 1");
//! # Ok(())
//! # }
//! ```

pub mod fixtures;
pub mod project;
pub mod transport;

pub use fixtures::DocumentFixture;
pub use project::TestProject;
pub use transport::MockTransport;

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. With `None`, logging is enabled only
/// when `RUST_LOG` is set.
///
/// ```bash
/// RUST_LOG=mdxe=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}
