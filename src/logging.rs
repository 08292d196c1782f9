/*!
 * Logging and tracing initialization
 */

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::GripperConfig;
use crate::error::{GripperError, Result};

/// Filter used when `RUST_LOG` is not set: our crates at the configured
/// level, everything else (tonic, hyper, h2, reqwest) at warn.
fn default_directives(config: &GripperConfig) -> String {
    let level = config.log_level.to_tracing_level();
    format!(
        "warn,galaxy_gripper={0},galaxy_connect={0},galaxy_interface={0}",
        level
    )
}

/// Initialize structured logging based on configuration
pub fn init_logging(config: &GripperConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directives(config)))
        .map_err(|e| GripperError::Config(format!("Failed to create log filter: {}", e)))?;

    let registry = tracing_subscriber::registry().with(env_filter);

    let result = if config.log_json {
        registry
            .with(fmt::layer().json().with_target(true).with_current_span(false))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(true).compact())
            .try_init()
    };

    result.map_err(|e| GripperError::Config(format!("Failed to install logger: {}", e)))
}
