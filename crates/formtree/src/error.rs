use formtree_xpath::XPathError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FormTreeError {
    #[error("invalid project schema: {0}")]
    InvalidSchema(String),
    #[error("unresolved schema reference: {0}")]
    UnresolvedRef(String),
    #[error("model not found in project schema: {0}")]
    ModelNotFound(String),
    #[error("schema node at {0} declares no element schema")]
    NotAContainer(String),
    #[error("no live array at {0}")]
    NotAnArray(String),
    #[error("nothing to edit at {0}")]
    NotFound(String),
    #[error(transparent)]
    XPath(#[from] XPathError),
}

pub type Result<T> = std::result::Result<T, FormTreeError>;
