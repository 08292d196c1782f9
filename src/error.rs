/*!
 * Error types for galaxy-gripper
 */

use galaxy_interface::GalaxyError;
use thiserror::Error;
use tonic::Status;

pub type Result<T> = std::result::Result<T, GripperError>;

#[derive(Error, Debug)]
pub enum GripperError {
    /// Galaxy could not be reached or refused the call
    #[error("Upstream unavailable: {0}")]
    Upstream(#[from] GalaxyError),

    /// Collection name not in the catalog
    #[error("Unknown collection: {0}")]
    CollectionNotFound(String),

    /// Primary-key lookup found nothing upstream
    #[error("No {collection} row with id {id}")]
    RowNotFound { collection: &'static str, id: String },

    /// Composite id that does not split into exactly two parts
    #[error("Malformed composite key {0:?}: expected <history_id>:<dataset_id>")]
    MalformedKey(String),

    /// Galaxy document lacks a string attribute the resolver relies on
    #[error("Galaxy document is missing string field `{0}`")]
    MissingField(&'static str),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl GripperError {
    /// Whether the failure originates in the upstream system rather than the request.
    pub fn is_upstream(&self) -> bool {
        matches!(self, GripperError::Upstream(_))
    }
}

impl From<GripperError> for Status {
    fn from(err: GripperError) -> Self {
        let message = err.to_string();
        match err {
            GripperError::Upstream(GalaxyError::NotFound(_)) => Status::not_found(message),
            GripperError::Upstream(_) => Status::unavailable(message),
            GripperError::CollectionNotFound(_) | GripperError::RowNotFound { .. } => {
                Status::not_found(message)
            }
            GripperError::MalformedKey(_) => Status::invalid_argument(message),
            GripperError::MissingField(_) => Status::internal(message),
            GripperError::Config(_) => Status::failed_precondition(message),
        }
    }
}
