//! Shared reference data: banks, address/location lists and signed file URLs.

use serde::{Deserialize, Serialize};

use crate::error::{ErrorKind, ResourceError};
use crate::http::{ApiClient, NO_QUERY};

pub const PATH: &str = "/api/generic";

const BANKS_ERROR: &str = "Ocorreu um erro ao buscar os bancos.";
const ADDRESS_DATA_ERROR: &str = "Ocorreu um erro ao buscar os dados de endereço.";
const TEMPORARY_FILE_URL_ERROR: &str = "Ocorreu um erro ao buscar a URL temporária do arquivo.";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Bank {
    /// COMPE code, e.g. `"001"`.
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub ispb: Option<String>,
}

/// Which list `/address-data` should return.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AddressDataKind {
    #[default]
    States,
    Cities,
}

impl AddressDataKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AddressDataKind::States => "states",
            AddressDataKind::Cities => "cities",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq, Hash)]
pub struct AddressDataQuery {
    #[serde(rename = "type")]
    pub kind: AddressDataKind,
    /// Two-letter state code; only meaningful for cities.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uf: Option<String>,
}

impl AddressDataQuery {
    pub fn states() -> Self {
        Self { kind: AddressDataKind::States, uf: None }
    }

    pub fn cities_of(uf: impl Into<String>) -> Self {
        Self { kind: AddressDataKind::Cities, uf: Some(uf.into()) }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct State {
    pub id: i64,
    pub uf: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct City {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub uf: Option<String>,
    #[serde(default)]
    pub ibge: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddressData {
    #[serde(default)]
    pub states: Vec<State>,
    #[serde(default)]
    pub cities: Vec<City>,
}

/// Signed, short-lived download URL.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TemporaryFileUrl {
    pub url: String,
    #[serde(default)]
    pub expires_at: Option<String>,
}

pub async fn get_banks(api: &ApiClient) -> Result<Vec<Bank>, ResourceError> {
    api.get(&format!("{PATH}/banks"), NO_QUERY)
        .await
        .map_err(|e| ResourceError::from_api(BANKS_ERROR, e))
}

pub async fn get_address_data(api: &ApiClient, query: &AddressDataQuery) -> Result<AddressData, ResourceError> {
    api.get(&format!("{PATH}/address-data"), query)
        .await
        .map_err(|e| ResourceError::from_api(ADDRESS_DATA_ERROR, e))
}

/// GET `/api/generic/temporary-file-url/{disk}?path=..`.
///
/// `disk` must be a single path segment other than `.` or `..`.
pub async fn get_temporary_file_url(api: &ApiClient, disk: &str, path: &str) -> Result<TemporaryFileUrl, ResourceError> {
    if matches!(disk, "" | "." | "..") || disk.contains(['/', '\\', '?', '#', '%']) {
        tracing::error!(disk, "{TEMPORARY_FILE_URL_ERROR}");
        return Err(ResourceError::new(ErrorKind::InvalidInput, TEMPORARY_FILE_URL_ERROR));
    }

    api.get(&format!("{PATH}/temporary-file-url/{disk}"), &[("path", path)])
        .await
        .map_err(|e| ResourceError::from_api(TEMPORARY_FILE_URL_ERROR, e))
}
