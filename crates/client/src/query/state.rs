//! Observable state of a query.

use std::sync::Arc;

use crate::error::ResourceError;

/// What a consumer of a cached resource sees.
#[derive(Debug)]
pub struct QueryState<V> {
    pub data: Option<Arc<V>>,
    pub is_loading: bool,
    pub is_error: bool,
    pub error: Option<ResourceError>,
    /// The data is past its stale time and a refresh may be running.
    pub is_stale: bool,
}

impl<V> QueryState<V> {
    /// Disabled or never-run query: no data, not loading, not failed.
    pub fn idle() -> Self {
        Self { data: None, is_loading: false, is_error: false, error: None, is_stale: false }
    }

    pub fn loading() -> Self {
        Self { is_loading: true, ..Self::idle() }
    }

    pub fn success(data: Arc<V>, is_stale: bool) -> Self {
        Self { data: Some(data), is_stale, ..Self::idle() }
    }

    pub fn failure(error: ResourceError) -> Self {
        Self { is_error: true, error: Some(error), ..Self::idle() }
    }

    pub fn is_idle(&self) -> bool {
        self.data.is_none() && !self.is_loading && !self.is_error
    }
}

impl<V> Clone for QueryState<V> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            is_loading: self.is_loading,
            is_error: self.is_error,
            error: self.error.clone(),
            is_stale: self.is_stale,
        }
    }
}
