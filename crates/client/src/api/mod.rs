//! REST fetch functions, one module per backend resource.
//!
//! Every function performs a single request through [`ApiClient`] and turns
//! any failure into a [`ResourceError`] with a fixed message naming the
//! operation that failed.

pub mod cash_flow;
pub mod dashboard;
pub mod dre;
pub mod generic;
pub mod payment_method;
pub mod permission;
pub mod sector;
pub mod supplier;
pub mod viacep;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ResourceError;
use crate::http::ApiClient;

/// Query parameters shared by the list endpoints.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ListFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,

    /// Free-text filter on name/document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl ListFilter {
    pub fn for_company(company_id: impl Into<String>) -> Self {
        Self { company_id: Some(company_id.into()), ..Default::default() }
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }
}

/// One page of a list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub current_page: u32,
    #[serde(default)]
    pub last_page: u32,
    #[serde(default)]
    pub per_page: u32,
    #[serde(default)]
    pub total: u64,
}

impl<T> Paginated<T> {
    pub fn has_more(&self) -> bool {
        self.current_page < self.last_page
    }
}

/// Reporting window used by dashboard, cash flow and DRE.
#[derive(Debug, Serialize)]
pub(crate) struct PeriodQuery<'a> {
    pub start_date: &'a str,
    pub end_date: &'a str,
    pub company_id: &'a str,
}

pub(crate) async fn list<T: DeserializeOwned>(
    api: &ApiClient, path: &str, filter: &ListFilter, message: &'static str,
) -> Result<Paginated<T>, ResourceError> {
    api.get(path, filter).await.map_err(|e| ResourceError::from_api(message, e))
}

pub(crate) async fn create<T, B>(api: &ApiClient, path: &str, body: &B, message: &'static str) -> Result<T, ResourceError>
where
    T: DeserializeOwned,
    B: Serialize + ?Sized,
{
    api.post(path, body).await.map_err(|e| ResourceError::from_api(message, e))
}

pub(crate) async fn update<T, B>(
    api: &ApiClient, path: &str, id: i64, body: &B, message: &'static str,
) -> Result<T, ResourceError>
where
    T: DeserializeOwned,
    B: Serialize + ?Sized,
{
    api.put(&format!("{path}/{id}"), body)
        .await
        .map_err(|e| ResourceError::from_api(message, e))
}

pub(crate) async fn remove(api: &ApiClient, path: &str, id: i64, message: &'static str) -> Result<(), ResourceError> {
    api.delete(&format!("{path}/{id}"))
        .await
        .map_err(|e| ResourceError::from_api(message, e))
}
