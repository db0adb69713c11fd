//! HR sectors.

use serde::{Deserialize, Serialize};

use super::{ListFilter, Paginated};
use crate::error::ResourceError;
use crate::http::ApiClient;

pub const PATH: &str = "/api/sector";

const LIST_ERROR: &str = "Ocorreu um erro ao buscar os setores.";
const CREATE_ERROR: &str = "Ocorreu um erro ao salvar o setor.";
const UPDATE_ERROR: &str = "Ocorreu um erro ao atualizar o setor.";
const DELETE_ERROR: &str = "Ocorreu um erro ao excluir o setor.";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Sector {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub company_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct SectorInput {
    pub company_id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

pub async fn list_sectors(api: &ApiClient, filter: &ListFilter) -> Result<Paginated<Sector>, ResourceError> {
    super::list(api, PATH, filter, LIST_ERROR).await
}

pub async fn create_sector(api: &ApiClient, input: &SectorInput) -> Result<Sector, ResourceError> {
    super::create(api, PATH, input, CREATE_ERROR).await
}

pub async fn update_sector(api: &ApiClient, id: i64, input: &SectorInput) -> Result<Sector, ResourceError> {
    super::update(api, PATH, id, input, UPDATE_ERROR).await
}

pub async fn delete_sector(api: &ApiClient, id: i64) -> Result<(), ResourceError> {
    super::remove(api, PATH, id, DELETE_ERROR).await
}
