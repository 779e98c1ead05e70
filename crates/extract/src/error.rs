use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("Unknown extraction type '{0}'. Use 'default' or 'nuextract'.")]
    UnknownMode(String),
}
