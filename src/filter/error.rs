use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum FilterError {
    #[error("Sorting by '{0}' is not allowed")]
    InvalidSort(String),

    #[error("Invalid value for filter[{column}]: {value}")]
    InvalidFilterValue { column: String, value: String },

    #[error("Including '{0}' is not allowed")]
    InvalidInclude(String),

    #[error("Invalid page: {0}")]
    InvalidPage(String),
}
