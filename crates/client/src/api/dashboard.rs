//! Dashboard indicators.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::PeriodQuery;
use crate::error::ResourceError;
use crate::http::ApiClient;

pub const PATH: &str = "/api/dashboard";

const FETCH_ERROR: &str = "Ocorreu um erro ao buscar os dados do dashboard.";

/// Dashboard totals for a period.
///
/// Every modelled field is optional and anything else is kept in `extra`,
/// so whatever body the backend sends round-trips unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DashboardData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_income: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_expense: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly: Option<Vec<MonthlyTotal>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MonthlyTotal {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub income: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expense: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// GET `/api/dashboard?start_date=..&end_date=..&company_id=..`.
pub async fn get_dashboard_data(
    api: &ApiClient, start_date: &str, end_date: &str, company_id: &str,
) -> Result<DashboardData, ResourceError> {
    let query = PeriodQuery { start_date, end_date, company_id };
    api.get(PATH, &query)
        .await
        .map_err(|e| ResourceError::from_api(FETCH_ERROR, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_fields_kept() {
        let body = serde_json::json!({
            "total_income": 10.0,
            "total_expense": 4.0,
            "balance": 6.0,
            "monthly": [],
            "overdue_count": 2
        });
        let data: DashboardData = serde_json::from_value(body.clone()).unwrap();
        assert_eq!(data.extra.get("overdue_count"), Some(&Value::from(2)));
        assert_eq!(serde_json::to_value(&data).unwrap(), body);
    }

    #[test]
    fn test_arbitrary_body_round_trips() {
        let body = serde_json::json!({"receitas": 10.0, "despesas": 4.0, "periodo": {"inicio": "2024-01-01"}});
        let data: DashboardData = serde_json::from_value(body.clone()).unwrap();
        assert_eq!(data.total_income, None);
        assert_eq!(data.monthly, None);
        assert_eq!(serde_json::to_value(&data).unwrap(), body);

        let body = serde_json::json!({"monthly": [{"mes": "2024-01", "income": 3.5}]});
        let data: DashboardData = serde_json::from_value(body.clone()).unwrap();
        assert_eq!(data.monthly.as_ref().map(|m| m[0].income), Some(Some(3.5)));
        assert_eq!(serde_json::to_value(&data).unwrap(), body);
    }

    #[test]
    fn test_empty_body() {
        let data: DashboardData = serde_json::from_str("{}").unwrap();
        assert_eq!(data, DashboardData::default());
        assert_eq!(serde_json::to_value(&data).unwrap(), serde_json::json!({}));
    }
}
