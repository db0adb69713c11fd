//! Permissions available for role assignment.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ResourceError;
use crate::http::{ApiClient, NO_QUERY};

pub const PATH: &str = "/api/permission";

const LIST_ERROR: &str = "Ocorreu um erro ao buscar as permissões.";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Permission {
    pub id: i64,
    /// Machine name, e.g. `supplier.create`.
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Screen or module the permission belongs to.
    #[serde(default)]
    pub group: Option<String>,
}

pub async fn list_permissions(api: &ApiClient) -> Result<Vec<Permission>, ResourceError> {
    api.get(PATH, NO_QUERY)
        .await
        .map_err(|e| ResourceError::from_api(LIST_ERROR, e))
}

/// Group permissions by their `group`, ungrouped ones under `""`.
pub fn by_group(permissions: &[Permission]) -> BTreeMap<&str, Vec<&Permission>> {
    let mut groups: BTreeMap<&str, Vec<&Permission>> = BTreeMap::new();
    for permission in permissions {
        groups
            .entry(permission.group.as_deref().unwrap_or(""))
            .or_default()
            .push(permission);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_by_group() {
        let permissions: Vec<Permission> = serde_json::from_str(
            r#"[
                {"id": 1, "name": "supplier.view", "group": "Fornecedores"},
                {"id": 2, "name": "supplier.create", "group": "Fornecedores"},
                {"id": 3, "name": "dashboard.view"}
            ]"#,
        )
        .unwrap();

        let groups = by_group(&permissions);
        assert_eq!(groups["Fornecedores"].len(), 2);
        assert_eq!(groups[""][0].name, "dashboard.view");
    }
}
