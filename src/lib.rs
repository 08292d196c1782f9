/*!
 * Galaxy Gripper - Galaxy as a GRIPSource
 *
 * Exposes records of a Galaxy server as three queryable collections over
 * the GRIPSource gRPC protocol:
 * - `histories`: Galaxy histories
 * - `datasets`: Galaxy datasets, listed with offset pagination
 * - `hda`: history/dataset associations synthesized from the two
 *
 * Nothing is cached or persisted; every call resolves against Galaxy.
 */

pub mod catalog;
pub mod config;
pub mod error;
pub mod key;
pub mod logging;
pub mod pagination;
pub mod resolver;
pub mod server;

// Re-export commonly used types
pub use catalog::Catalog;
pub use config::{Cli, GripperConfig, LogLevel};
pub use error::{GripperError, Result};
pub use resolver::{CollectionStrategy, Row, RowResolver};
pub use server::GripperService;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
