//! Sheets v4 REST API types.

use serde::{Deserialize, Serialize};

/// How values in a write request are interpreted.
///
/// `RAW` stores the text as-is; a transcript starting with `=` must never
/// become a formula.
pub const VALUE_INPUT_RAW: &str = "RAW";

/// Row-major value orientation.
pub const MAJOR_DIMENSION_ROWS: &str = "ROWS";

/// A block of cell values for a range.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major_dimension: Option<String>,
    /// Omitted by the API when the range is empty
    #[serde(default)]
    pub values: Vec<Vec<serde_json::Value>>,
}

impl ValueRange {
    /// Single-cell value range.
    pub fn cell(range: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            range: Some(range.into()),
            major_dimension: Some(MAJOR_DIMENSION_ROWS.to_string()),
            values: vec![vec![serde_json::Value::String(value.into())]],
        }
    }

    /// Values rendered as strings. Ragged rows are kept ragged.
    pub fn into_rows(self) -> Vec<Vec<String>> {
        self.values
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect()
    }
}

fn cell_to_string(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Body of `spreadsheets.values.batchUpdate`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchUpdateValuesRequest {
    pub value_input_option: String,
    pub data: Vec<ValueRange>,
}

impl BatchUpdateValuesRequest {
    pub fn raw(data: Vec<ValueRange>) -> Self {
        Self {
            value_input_option: VALUE_INPUT_RAW.to_string(),
            data,
        }
    }
}

/// Response of `spreadsheets.values.batchUpdate`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchUpdateValuesResponse {
    #[serde(default)]
    pub spreadsheet_id: Option<String>,
    #[serde(default)]
    pub total_updated_rows: Option<u32>,
    #[serde(default)]
    pub total_updated_cells: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_range_missing_values() {
        let vr: ValueRange = serde_json::from_value(json!({
            "range": "'Ingest_Queue'!A1:Z1000",
            "majorDimension": "ROWS"
        }))
        .unwrap();
        assert!(vr.into_rows().is_empty());
    }

    #[test]
    fn test_value_range_mixed_cells() {
        let vr: ValueRange = serde_json::from_value(json!({
            "values": [["Video ID", "Status"], ["abc", 12, true, null]]
        }))
        .unwrap();
        assert_eq!(
            vr.into_rows(),
            vec![
                vec!["Video ID".to_string(), "Status".to_string()],
                vec![
                    "abc".to_string(),
                    "12".to_string(),
                    "true".to_string(),
                    String::new()
                ],
            ]
        );
    }

    #[test]
    fn test_batch_update_body_shape() {
        let body = BatchUpdateValuesRequest::raw(vec![ValueRange::cell("'Q'!B2", "Pending")]);
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "valueInputOption": "RAW",
                "data": [{
                    "range": "'Q'!B2",
                    "majorDimension": "ROWS",
                    "values": [["Pending"]]
                }]
            })
        );
    }
}
