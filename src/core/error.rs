use thiserror::Error;

use crate::kernel::KernelError;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Binder Error: {0}")]
    Binder(String),
    #[error("Syntax Error: {0}")]
    Syntax(String),
    #[error("Parser Error: {0}")]
    Parser(String),
    #[error("Catalog Error: {0}")]
    Catalog(String),
    #[error("Executor Error: {0}")]
    Executor(String),
    #[error("Not Implemented: {0}")]
    NotImplemented(String),
    #[error("Out Of Range: {0}")]
    OutOfRange(String),
    #[error("Permission Denied: {0}")]
    Permission(String),
    #[error("Kernel Error {code}: {message}")]
    Kernel { code: i32, message: String },
}

impl From<KernelError> for EngineError {
    fn from(err: KernelError) -> Self {
        Self::Kernel {
            code: err.code,
            message: err.message,
        }
    }
}
