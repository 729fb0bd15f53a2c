//! Observable result of a content query.

use crate::client::ContentError;

/// Where a query currently stands.
///
/// Exactly one variant is active. Every issued query starts at
/// [`Loading`](QueryState::Loading) and settles at most once. The accessors
/// give the flat `{data, loading, error}` view page code renders from.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryState<T> {
    Loading,
    Success(T),
    Failure(ContentError),
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        QueryState::Loading
    }
}

impl<T> QueryState<T> {
    pub fn loading(&self) -> bool {
        matches!(self, QueryState::Loading)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            QueryState::Success(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ContentError> {
        match self {
            QueryState::Failure(error) => Some(error),
            _ => None,
        }
    }

    /// `true` once the query has either succeeded or failed.
    pub fn is_settled(&self) -> bool {
        !self.loading()
    }

    /// `None` while loading, otherwise the settled outcome.
    pub fn into_result(self) -> Option<Result<T, ContentError>> {
        match self {
            QueryState::Loading => None,
            QueryState::Success(data) => Some(Ok(data)),
            QueryState::Failure(error) => Some(Err(error)),
        }
    }
}

impl<T> From<Result<T, ContentError>> for QueryState<T> {
    fn from(outcome: Result<T, ContentError>) -> Self {
        match outcome {
            Ok(data) => QueryState::Success(data),
            Err(error) => QueryState::Failure(error),
        }
    }
}
