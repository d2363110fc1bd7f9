pub mod category_service;
pub mod record_service;
pub mod summary_service;

pub use category_service::CategoryService;
pub use record_service::RecordService;
pub use summary_service::{MonthReport, SummaryService};

use crate::errors::LedgerError;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Storage(#[from] LedgerError),
    #[error("{0}")]
    Invalid(String),
}
