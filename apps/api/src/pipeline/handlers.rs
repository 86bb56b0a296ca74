//! Axum route handlers for the formalization API.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormalizeRequest {
    #[serde(default)]
    pub informal_report: Option<String>,
    #[serde(default)]
    pub case_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormalizeResponse {
    pub case_id: String,
    pub formal_report: String,
    /// Progress labels in the order the pipeline reported them.
    pub steps: Vec<String>,
}

/// A fresh case number such as `VB-1A2B3C4D`.
pub fn new_case_id() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("VB-{}", id[..8].to_uppercase())
}

/// POST /api/formalize
///
/// Runs the five-step pipeline. A missing `caseId` is assigned here, before the
/// first model call, so the final step can write it into the template.
pub async fn handle_formalize(
    State(state): State<AppState>,
    payload: Result<Json<FormalizeRequest>, JsonRejection>,
) -> Result<Json<FormalizeResponse>, AppError> {
    let Json(request) = payload?;

    let informal_report = request
        .informal_report
        .filter(|r| !r.trim().is_empty())
        .ok_or_else(|| AppError::Validation("informalReport cannot be empty".to_string()))?;

    let case_id = request
        .case_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .unwrap_or_else(new_case_id);

    let mut steps = Vec::new();
    let formal_report = state
        .pipeline
        .run(&informal_report, &case_id, &mut |label: &str| {
            steps.push(label.to_string())
        })
        .await?;

    Ok(Json(FormalizeResponse {
        case_id,
        formal_report,
        steps,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_case_id_shape() {
        let id = new_case_id();
        assert_eq!(id.len(), 11);
        assert!(id.starts_with("VB-"));
        assert!(id[3..]
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
        assert_ne!(new_case_id(), new_case_id());
    }

    #[test]
    fn test_request_fields_are_optional() {
        let request: FormalizeRequest =
            serde_json::from_str(r#"{"informalReport": "Text"}"#).unwrap();
        assert_eq!(request.informal_report.as_deref(), Some("Text"));
        assert!(request.case_id.is_none());
    }
}
