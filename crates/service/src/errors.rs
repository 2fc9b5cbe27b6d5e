use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("database error: {0}")]
    Db(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }
}

impl From<models::errors::ModelError> for ServiceError {
    fn from(e: models::errors::ModelError) -> Self {
        match e {
            models::errors::ModelError::InvalidId(raw) => Self::InvalidIdentifier(raw),
        }
    }
}

impl From<mongodb::error::Error> for ServiceError {
    fn from(e: mongodb::error::Error) -> Self { Self::Db(e.to_string()) }
}

impl From<mongodb::bson::de::Error> for ServiceError {
    fn from(e: mongodb::bson::de::Error) -> Self { Self::Internal(format!("decode document: {}", e)) }
}

impl From<mongodb::bson::ser::Error> for ServiceError {
    fn from(e: mongodb::bson::ser::Error) -> Self { Self::Internal(format!("encode document: {}", e)) }
}
