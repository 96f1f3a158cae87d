use crate::api::RequestError;
use crate::controller::GateError;
use crate::upload::UploadError;
use thiserror::Error;

pub type AppResult<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Request(#[from] RequestError),
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error(transparent)]
    Gate(#[from] GateError),
}
