use async_trait::async_trait;
use std::fmt;

use crate::file_format::value::SourceValue;

pub type Result<T> = std::result::Result<T, SourceError>;

// JSON problems are sticky data problems.
impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> SourceError {
        SourceError::StickyProblem(ErrorDetails {
            layer: ErrorLayer::DataLayer,
            message: err.to_string(),
        })
    }
}

impl From<std::io::Error> for SourceError {
    fn from(err: std::io::Error) -> SourceError {
        SourceError::StickyProblem(ErrorDetails {
            layer: ErrorLayer::DataLayer,
            message: err.to_string(),
        })
    }
}

/// Where an error seems to originate.
#[derive(Clone, Debug, PartialEq)]
pub enum ErrorLayer {
    /// Something we were asked to do can't be expressed, like a search
    /// filter that doesn't parse.
    BadInput,
    /// Connecting to or talking with the directory server failed.
    TransportLayer,
    /// The server answered, but with an error result.
    ProtocolLayer,
    /// Reading or writing the extracted document failed.
    DataLayer,
}

/// Details about what went wrong, for whoever ends up reading the error.
#[derive(Clone, Debug, PartialEq)]
pub struct ErrorDetails {
    pub layer: ErrorLayer,
    /// Stringified version of the lower level error.
    pub message: String,
}

/// Errors are either recoverable per naming root or fatal for the run.
#[derive(Clone, Debug, PartialEq)]
pub enum SourceError {
    /// The search filter was rejected.  Extraction of the current naming
    /// root is abandoned and the run moves on to the next one.
    MalformedFilter(ErrorDetails),
    /// Any other transport or protocol failure.  Aborts the run.
    ProtocolFailure(ErrorDetails),
    /// The persisted document could not be read or written.
    StickyProblem(ErrorDetails),
}

impl SourceError {
    pub fn details(&self) -> &ErrorDetails {
        match self {
            SourceError::MalformedFilter(details)
            | SourceError::ProtocolFailure(details)
            | SourceError::StickyProblem(details) => details,
        }
    }
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            SourceError::MalformedFilter(_) => "malformed filter",
            SourceError::ProtocolFailure(_) => "protocol failure",
            SourceError::StickyProblem(_) => "document problem",
        };
        let details = self.details();
        write!(f, "{} ({:?}): {}", kind, details.layer, details.message)
    }
}

impl std::error::Error for SourceError {}

/// One page worth of a paged subtree search.
#[derive(Clone, Debug, PartialEq)]
pub struct PageRequest {
    pub base: String,
    pub filter: String,
    pub attributes: Vec<String>,
    pub page_size: i32,
    /// Continuation cookie from the previous page; `None` on the first.
    pub cookie: Option<Vec<u8>>,
}

/// A directory object as the source reports it.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceRecord {
    pub dn: String,
    pub attributes: Vec<(String, SourceValue)>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PageEntry {
    Object(SourceRecord),
    /// Search result references and intermediate responses carry no object.
    Referral,
    Intermediate,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchPage {
    pub entries: Vec<PageEntry>,
    /// Cookie from the response's paging control.  `None` means the response
    /// carried no paging control at all; an empty cookie means the server
    /// has no further pages.
    pub cookie: Option<Vec<u8>>,
}

impl SearchPage {
    /// Is there another page to ask for?
    pub fn next_cookie(&self) -> Option<&[u8]> {
        match &self.cookie {
            Some(cookie) if !cookie.is_empty() => Some(cookie),
            _ => None,
        }
    }
}

/// A directory we can extract from.  Transport and authentication are the
/// implementation's business; extraction only sees pages of records.
#[async_trait]
pub trait DirectorySource {
    /// The naming roots the directory serves, in the order it lists them.
    async fn naming_contexts(&mut self) -> Result<Vec<String>>;

    async fn search_page(&mut self, request: &PageRequest) -> Result<SearchPage>;
}
