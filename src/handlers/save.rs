use crate::{
    error::AppError,
    pricing::{self, SavePayload},
    rates::RateCache,
    store::{NewSubmission, SubmissionStore},
    tables::CostTables,
};
use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub tables: Arc<CostTables>,
    pub rates: Arc<RateCache>,
    pub store: Arc<SubmissionStore>,
}

#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub ok: bool,
    pub id: i64,
    pub per_unit_usd: f64,
    pub quantity: u32,
    pub total_usd: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub converted_total: Option<f64>,
}

/// Handle POST /api/save
///
/// Validates the payload, prices it, converts the total when a non-USD
/// currency was requested, persists the submission, and returns the priced
/// result.
pub async fn handle_save(
    State(state): State<AppState>,
    Json(payload): Json<SavePayload>,
) -> Result<Json<SaveResponse>, AppError> {
    let request = pricing::validate_payload(&payload)?;

    tracing::info!(
        process = %request.process,
        supplier = %request.supplier,
        quantity = request.quantity,
        currency = request.target_currency.as_deref().unwrap_or("USD"),
        "Handling costing submission"
    );

    let result = pricing::price(&state.tables, &request)?;

    // USD is the identity case and is stored without conversion columns.
    let conversion = match request.target_currency.as_deref() {
        Some(code) if code != "USD" => {
            let converted = state.rates.convert(result.total_usd, "USD", code).await?;
            Some((code.to_string(), converted))
        }
        _ => None,
    };

    let record = NewSubmission {
        process: request.process.clone(),
        supplier: request.supplier.clone(),
        material_thickness: tenths_to_mm(request.material_tenths_mm),
        foam_thickness: tenths_to_mm(request.foam_tenths_mm),
        bladder_type: request.bladder_type.clone(),
        panel_config: request.panel_config.map(i64::from),
        quantity: i64::from(request.quantity),
        base_per_unit_usd: result.base_per_unit_usd,
        total_usd: result.total_usd,
        currency: conversion.as_ref().map(|(code, _)| code.clone()),
        converted_total: conversion.as_ref().map(|(_, amount)| *amount),
    };

    let id = state.store.append(&record).await?;

    tracing::debug!(id, total_usd = result.total_usd, "Submission saved");

    Ok(Json(SaveResponse {
        ok: true,
        id,
        per_unit_usd: result.base_per_unit_usd,
        quantity: result.quantity,
        total_usd: result.total_usd,
        currency: conversion.as_ref().map(|(code, _)| code.clone()),
        converted_total: conversion.map(|(_, amount)| amount),
    }))
}

fn tenths_to_mm(tenths: u32) -> f64 {
    f64::from(tenths) / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RatesConfig;
    use crate::pricing::NumberOrText;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    async fn create_test_state(name: &str, rates_base_url: &str, api_key: Option<&str>) -> AppState {
        let db_path = std::env::temp_dir().join(format!(
            "ball_costing_handler_test_{}_{}.db",
            std::process::id(),
            name
        ));
        let _ = std::fs::remove_file(&db_path);

        let store = SubmissionStore::connect(&format!("sqlite:{}", db_path.display()))
            .await
            .unwrap();

        let rates_config = RatesConfig {
            api_key: api_key.map(str::to_string),
            base_url: rates_base_url.to_string(),
            staleness_seconds: 3600,
            timeout_seconds: 5,
        };

        AppState {
            tables: Arc::new(CostTables::standard()),
            rates: Arc::new(RateCache::new(reqwest::Client::new(), &rates_config)),
            store: Arc::new(store),
        }
    }

    fn worked_example_payload() -> SavePayload {
        SavePayload {
            process: Some("COT-B".to_string()),
            supplier: Some("Teijin".to_string()),
            material_thickness: Some(NumberOrText::Text("1.0".to_string())),
            foam_thickness: Some(NumberOrText::Text("3.0".to_string())),
            bladder_type: Some("Patch".to_string()),
            panel_config: Some(NumberOrText::Number(32.0)),
            quantity: Some(NumberOrText::Number(5.0)),
            currency: None,
        }
    }

    #[tokio::test]
    async fn test_save_worked_example() {
        let state = create_test_state("worked", "http://127.0.0.1:9", None).await;

        let Json(response) = handle_save(State(state), Json(worked_example_payload()))
            .await
            .unwrap();

        assert!(response.ok);
        assert_eq!(response.id, 1);
        assert_eq!(response.per_unit_usd, 9.70);
        assert_eq!(response.quantity, 5);
        assert_eq!(response.total_usd, 48.50);
        assert_eq!(response.currency, None);
        assert_eq!(response.converted_total, None);
    }

    #[tokio::test]
    async fn test_save_usd_currency_skips_conversion() {
        let state = create_test_state("usd", "http://127.0.0.1:9", None).await;

        let mut payload = worked_example_payload();
        payload.currency = Some("usd".to_string());

        // No credential and an unreachable rate source: USD must still work.
        let Json(response) = handle_save(State(state), Json(payload)).await.unwrap();
        assert_eq!(response.total_usd, 48.50);
        assert_eq!(response.currency, None);
    }

    #[tokio::test]
    async fn test_save_validation_error_is_bad_request() {
        let state = create_test_state("validation", "http://127.0.0.1:9", None).await;

        let mut payload = worked_example_payload();
        payload.quantity = Some(NumberOrText::Number(0.0));

        let err = handle_save(State(state), Json(payload)).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_save_without_credential_reports_missing_credential() {
        let state = create_test_state("credential", "http://127.0.0.1:9", None).await;

        let mut payload = worked_example_payload();
        payload.currency = Some("GBP".to_string());

        let err = handle_save(State(state), Json(payload)).await.unwrap_err();
        assert!(matches!(err, AppError::MissingCredential));
    }
}
