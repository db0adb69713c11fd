//! Cash-flow statement.

use serde::{Deserialize, Serialize};

use super::PeriodQuery;
use crate::error::ResourceError;
use crate::http::ApiClient;

pub const PATH: &str = "/api/cash-flow";

const FETCH_ERROR: &str = "Ocorreu um erro ao buscar os dados do fluxo de caixa.";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CashFlowData {
    #[serde(default)]
    pub opening_balance: f64,
    #[serde(default)]
    pub closing_balance: f64,
    #[serde(default)]
    pub entries: Vec<CashFlowEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CashFlowEntry {
    pub date: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub amount: f64,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Income,
    Expense,
}

impl CashFlowData {
    /// Sum of incomes minus sum of expenses.
    pub fn net(&self) -> f64 {
        self.entries
            .iter()
            .map(|e| match e.kind {
                EntryKind::Income => e.amount,
                EntryKind::Expense => -e.amount,
            })
            .sum()
    }
}

/// GET `/api/cash-flow?start_date=..&end_date=..&company_id=..`.
pub async fn get_cash_flow(
    api: &ApiClient, start_date: &str, end_date: &str, company_id: &str,
) -> Result<CashFlowData, ResourceError> {
    let query = PeriodQuery { start_date, end_date, company_id };
    api.get(PATH, &query)
        .await
        .map_err(|e| ResourceError::from_api(FETCH_ERROR, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_net() {
        let data: CashFlowData = serde_json::from_str(
            r#"{
                "opening_balance": 100.0,
                "closing_balance": 130.0,
                "entries": [
                    {"date": "2024-01-02", "description": "Venda", "type": "income", "amount": 50.0},
                    {"date": "2024-01-03", "description": "Aluguel", "type": "expense", "amount": 20.0, "category": "fixo"}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(data.net(), 30.0);
        assert_eq!(data.entries[1].category.as_deref(), Some("fixo"));
    }
}
