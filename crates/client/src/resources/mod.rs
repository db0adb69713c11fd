//! Cached accessors for shared reference data.
//!
//! Each resource is described once by a [`ResourceSpec`] constant; the
//! accessors on [`ReferenceData`] only supply the fetch function.

use std::sync::Arc;
use std::time::Duration;

use crate::api::generic::{self, AddressData, AddressDataQuery, Bank, TemporaryFileUrl};
use crate::error::ResourceError;
use crate::http::ApiClient;
use crate::query::{QueryCache, QueryPolicy, QueryState, RefetchEvent, ResourceSpec, policy};

/// Signed URLs expire server-side, so refresh well before that.
pub const TEMPORARY_FILE_URL: ResourceSpec<TemporaryFileParams> = ResourceSpec {
    name: "temporary-file-url",
    policy: QueryPolicy::new(Duration::from_secs(15 * 60))
        .evict_after(Duration::from_secs(20 * 60))
        .retry(1),
    key_params: temporary_file_key,
    enabled: has_path,
};

pub const BANKS: ResourceSpec<()> = ResourceSpec {
    name: "banks",
    policy: QueryPolicy::new(Duration::from_secs(24 * 60 * 60)),
    key_params: policy::no_params,
    enabled: policy::always,
};

pub const ADDRESS_DATA: ResourceSpec<AddressDataQuery> = ResourceSpec {
    name: "address-data",
    policy: QueryPolicy::new(Duration::from_secs(24 * 60 * 60)).no_automatic_refetch(),
    key_params: address_data_key,
    enabled: policy::always,
};

/// Parameters of the temporary file URL query.
///
/// The query stays disabled until `path` is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemporaryFileParams {
    pub disk: String,
    pub path: Option<String>,
}

fn temporary_file_key(params: &TemporaryFileParams) -> Vec<(&'static str, String)> {
    let mut key = vec![("disk", params.disk.clone())];
    if let Some(path) = &params.path {
        key.push(("path", path.clone()));
    }
    key
}

fn has_path(params: &TemporaryFileParams) -> bool {
    params.path.as_deref().is_some_and(|path| !path.is_empty())
}

fn address_data_key(query: &AddressDataQuery) -> Vec<(&'static str, String)> {
    let mut key = vec![("type", query.kind.as_str().to_string())];
    if let Some(uf) = &query.uf {
        key.push(("uf", uf.clone()));
    }
    key
}

/// Reference data caches sharing one [`ApiClient`].
#[derive(Debug, Clone)]
pub struct ReferenceData {
    api: ApiClient,
    banks: QueryCache<Vec<Bank>>,
    address_data: QueryCache<AddressData>,
    temporary_urls: QueryCache<TemporaryFileUrl>,
}

impl ReferenceData {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            banks: QueryCache::new(),
            address_data: QueryCache::new(),
            temporary_urls: QueryCache::new(),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Banks list, from cache when fresh.
    pub async fn banks(&self) -> Result<Arc<Vec<Bank>>, ResourceError> {
        let api = self.api.clone();
        self.banks
            .fetch(BANKS.key(&()), BANKS.policy, move || {
                let api = api.clone();
                async move { generic::get_banks(&api).await }
            })
            .await
    }

    pub async fn use_banks(&self) -> QueryState<Vec<Bank>> {
        let api = self.api.clone();
        self.banks
            .use_resource(&BANKS, (), move |_: &()| {
                let api = api.clone();
                async move { generic::get_banks(&api).await }
            })
            .await
    }

    pub async fn use_address_data(&self, query: AddressDataQuery) -> QueryState<AddressData> {
        let api = self.api.clone();
        self.address_data
            .use_resource(&ADDRESS_DATA, query, move |query: &AddressDataQuery| {
                let api = api.clone();
                let query = query.clone();
                async move { generic::get_address_data(&api, &query).await }
            })
            .await
    }

    /// Signed URL for `path` on `disk`; idle while `path` is `None`.
    pub async fn use_temporary_file_url(
        &self, disk: impl Into<String>, path: Option<String>,
    ) -> QueryState<TemporaryFileUrl> {
        let api = self.api.clone();
        let params = TemporaryFileParams { disk: disk.into(), path };
        self.temporary_urls
            .use_resource(&TEMPORARY_FILE_URL, params, move |params: &TemporaryFileParams| {
                let api = api.clone();
                let disk = params.disk.clone();
                let path = params.path.clone().unwrap_or_default();
                async move { generic::get_temporary_file_url(&api, &disk, &path).await }
            })
            .await
    }

    /// Forward a focus/reconnect event to every cache.
    ///
    /// Returns the number of refreshes started.
    pub async fn notify(&self, event: RefetchEvent) -> usize {
        self.banks.notify(event).await + self.address_data.notify(event).await + self.temporary_urls.notify(event).await
    }

    /// Drop entries past their eviction instant in every cache.
    pub async fn purge_evicted(&self) -> usize {
        self.banks.purge_evicted().await
            + self.address_data.purge_evicted().await
            + self.temporary_urls.purge_evicted().await
    }

    pub async fn clear(&self) {
        self.banks.clear().await;
        self.address_data.clear().await;
        self.temporary_urls.clear().await;
    }
}
