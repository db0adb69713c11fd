//! Payment methods.

use serde::{Deserialize, Serialize};

use super::{ListFilter, Paginated};
use crate::error::ResourceError;
use crate::http::ApiClient;

pub const PATH: &str = "/api/payment-method";

const LIST_ERROR: &str = "Ocorreu um erro ao buscar as formas de pagamento.";
const CREATE_ERROR: &str = "Ocorreu um erro ao salvar a forma de pagamento.";
const UPDATE_ERROR: &str = "Ocorreu um erro ao atualizar a forma de pagamento.";
const DELETE_ERROR: &str = "Ocorreu um erro ao excluir a forma de pagamento.";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentMethod {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub company_id: Option<i64>,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct PaymentMethodInput {
    pub company_id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

pub async fn list_payment_methods(
    api: &ApiClient, filter: &ListFilter,
) -> Result<Paginated<PaymentMethod>, ResourceError> {
    super::list(api, PATH, filter, LIST_ERROR).await
}

pub async fn create_payment_method(api: &ApiClient, input: &PaymentMethodInput) -> Result<PaymentMethod, ResourceError> {
    super::create(api, PATH, input, CREATE_ERROR).await
}

pub async fn update_payment_method(
    api: &ApiClient, id: i64, input: &PaymentMethodInput,
) -> Result<PaymentMethod, ResourceError> {
    super::update(api, PATH, id, input, UPDATE_ERROR).await
}

pub async fn delete_payment_method(api: &ApiClient, id: i64) -> Result<(), ResourceError> {
    super::remove(api, PATH, id, DELETE_ERROR).await
}
