//! Suppliers.

use serde::{Deserialize, Serialize};

use super::{ListFilter, Paginated};
use crate::error::ResourceError;
use crate::http::ApiClient;

pub const PATH: &str = "/api/supplier";

const LIST_ERROR: &str = "Ocorreu um erro ao buscar os fornecedores.";
const CREATE_ERROR: &str = "Ocorreu um erro ao salvar o fornecedor.";
const UPDATE_ERROR: &str = "Ocorreu um erro ao atualizar o fornecedor.";
const DELETE_ERROR: &str = "Ocorreu um erro ao excluir o fornecedor.";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Supplier {
    pub id: i64,
    pub name: String,
    /// CPF or CNPJ.
    #[serde(default)]
    pub document: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub company_id: Option<i64>,
}

/// Body for create and update.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct SupplierInput {
    pub company_id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

pub async fn list_suppliers(api: &ApiClient, filter: &ListFilter) -> Result<Paginated<Supplier>, ResourceError> {
    super::list(api, PATH, filter, LIST_ERROR).await
}

pub async fn create_supplier(api: &ApiClient, input: &SupplierInput) -> Result<Supplier, ResourceError> {
    super::create(api, PATH, input, CREATE_ERROR).await
}

pub async fn update_supplier(api: &ApiClient, id: i64, input: &SupplierInput) -> Result<Supplier, ResourceError> {
    super::update(api, PATH, id, input, UPDATE_ERROR).await
}

pub async fn delete_supplier(api: &ApiClient, id: i64) -> Result<(), ResourceError> {
    super::remove(api, PATH, id, DELETE_ERROR).await
}
