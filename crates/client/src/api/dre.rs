//! DRE (income statement) report.

use serde::{Deserialize, Serialize};

use super::PeriodQuery;
use crate::error::ResourceError;
use crate::http::ApiClient;

pub const PATH: &str = "/api/dre";

const FETCH_ERROR: &str = "Ocorreu um erro ao buscar os dados do DRE.";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DreReport {
    #[serde(default)]
    pub lines: Vec<DreLine>,
}

/// One statement line, e.g. "Receita bruta".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DreLine {
    pub code: String,
    pub description: String,
    pub total: f64,
    #[serde(default)]
    pub children: Vec<DreLine>,
}

impl DreReport {
    /// Find a line by code at any depth.
    pub fn line(&self, code: &str) -> Option<&DreLine> {
        fn find<'a>(lines: &'a [DreLine], code: &str) -> Option<&'a DreLine> {
            lines
                .iter()
                .find_map(|line| if line.code == code { Some(line) } else { find(&line.children, code) })
        }
        find(&self.lines, code)
    }
}

/// GET `/api/dre?start_date=..&end_date=..&company_id=..`.
pub async fn get_dre(
    api: &ApiClient, start_date: &str, end_date: &str, company_id: &str,
) -> Result<DreReport, ResourceError> {
    let query = PeriodQuery { start_date, end_date, company_id };
    api.get(PATH, &query)
        .await
        .map_err(|e| ResourceError::from_api(FETCH_ERROR, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_line_lookup() {
        let report: DreReport = serde_json::from_str(
            r#"{"lines": [
                {"code": "1", "description": "Receita bruta", "total": 1000.0, "children": [
                    {"code": "1.1", "description": "Vendas", "total": 800.0}
                ]},
                {"code": "2", "description": "Deduções", "total": -100.0}
            ]}"#,
        )
        .unwrap();
        assert_eq!(report.line("1.1").map(|l| l.total), Some(800.0));
        assert_eq!(report.line("2").map(|l| l.description.as_str()), Some("Deduções"));
        assert!(report.line("9").is_none());
    }
}
