use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkbookError {
    #[error("scope has no items to put in a workbook")]
    EmptyScope,

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
