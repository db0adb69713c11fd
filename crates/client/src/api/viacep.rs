//! Postal-code (CEP) lookup against ViaCEP.
//!
//! ViaCEP answers HTTP 200 for unknown codes with `{"erro": true}` (older
//! deployments send the string `"true"`), so not-found is detected from the
//! body rather than the status.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ApiError, ErrorKind, ResourceError};
use crate::http::ApiClient;

const NOT_FOUND: &str = "CEP não encontrado.";
const INVALID: &str = "CEP inválido.";
const FETCH_ERROR: &str = "Ocorreu um erro ao buscar o endereço pelo CEP.";

static CEP_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]{5}-?[0-9]{3}$").unwrap());

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CepAddress {
    pub cep: String,
    pub logradouro: String,
    pub complemento: String,
    pub bairro: String,
    pub localidade: String,
    pub uf: String,
    pub ibge: String,
    pub gia: String,
    pub ddd: String,
    pub siafi: String,
    pub estado: String,
    pub regiao: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CepResponse {
    NotFound { erro: Value },
    Found(CepAddress),
}

/// Strip the optional hyphen; `None` unless the input is exactly 8 digits.
pub fn normalize_cep(cep: &str) -> Option<String> {
    let cep = cep.trim();
    CEP_PATTERN
        .is_match(cep)
        .then(|| cep.chars().filter(char::is_ascii_digit).collect())
}

fn is_not_found_flag(flag: &Value) -> bool {
    match flag {
        Value::Bool(b) => *b,
        Value::String(s) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

/// GET `{cep_base_url}/{cep}/json/`.
pub async fn get_address_by_cep(api: &ApiClient, cep: &str) -> Result<CepAddress, ResourceError> {
    let Some(cep) = normalize_cep(cep) else {
        return Err(ResourceError::new(ErrorKind::InvalidInput, INVALID));
    };

    let url = api
        .cep_endpoint(&format!("{cep}/json/"))
        .map_err(|e| ResourceError::from_api(FETCH_ERROR, e))?;

    match api.get_url::<CepResponse>(url).await {
        Ok(CepResponse::Found(address)) => Ok(address),
        Ok(CepResponse::NotFound { erro }) if is_not_found_flag(&erro) => {
            Err(ResourceError::from_api(NOT_FOUND, ApiError::NotFound(cep)))
        }
        Ok(CepResponse::NotFound { .. }) => Err(ResourceError::from_api(
            FETCH_ERROR,
            ApiError::Decode(format!("unexpected erro flag for {cep}")),
        )),
        Err(e) => Err(ResourceError::from_api(FETCH_ERROR, e)),
    }
}
