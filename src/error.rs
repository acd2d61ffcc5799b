use thiserror::Error;

use crate::chain::ChainError;
use crate::driver::DriverError;

#[derive(Error, Debug)]
pub enum Error {
    // chain error
    #[error("Chain error: {0}")]
    Chain(#[from] ChainError),
    // driver error
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type InternalResult<T> = Result<T, Error>;

// エラー作成用のヘルパー関数
impl Error {
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Error::Internal(message.into())
    }
}
