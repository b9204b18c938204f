//! Pricing engine
//!
//! Validates the inbound save payload into an immutable [`PricingRequest`],
//! then composes the per-unit base cost from the option tables plus fixed
//! labor and overhead. `price` is pure: no I/O, identical inputs always
//! produce identical output.

use crate::error::AppError;
use crate::tables::CostTables;
use serde::{Deserialize, Serialize};

/// Labor cost added per unit, not per order.
pub const LABOR_COST_PER_UNIT: f64 = 1.0;
/// Overhead cost added per unit, not per order.
pub const OVERHEAD_COST_PER_UNIT: f64 = 1.0;

/// Round to 2 decimal places, half away from zero.
///
/// This is the rounding mode for every monetary value in the engine. The
/// per-unit base is rounded BEFORE multiplying by quantity and the product is
/// rounded again; collapsing the two stages into one changes totals for some
/// quantities.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// A wire field that may arrive as a JSON number or a string.
///
/// The frontend submits form values as strings; API clients tend to send
/// numbers. Both are accepted.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NumberOrText {
    Number(f64),
    Text(String),
}

impl NumberOrText {
    fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }

    fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(n) if n.fract() == 0.0 => Some(*n as i64),
            Self::Number(_) => None,
            Self::Text(s) => s.trim().parse().ok(),
        }
    }

    fn raw(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
        }
    }
}

/// Inbound body of the save operation.
#[derive(Debug, Clone, Deserialize)]
pub struct SavePayload {
    pub process: Option<String>,
    pub supplier: Option<String>,
    pub material_thickness: Option<NumberOrText>,
    pub foam_thickness: Option<NumberOrText>,
    pub bladder_type: Option<String>,
    pub panel_config: Option<NumberOrText>,
    pub quantity: Option<NumberOrText>,
    pub currency: Option<String>,
}

/// A validated pricing request. Immutable once constructed; only
/// [`validate_payload`] builds one.
#[derive(Debug, Clone, PartialEq)]
pub struct PricingRequest {
    pub process: String,
    pub supplier: String,
    pub material_tenths_mm: u32,
    pub foam_tenths_mm: u32,
    pub bladder_type: String,
    pub panel_config: Option<u32>,
    pub quantity: u32,
    /// Uppercased ISO code; None means USD.
    pub target_currency: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricingResult {
    pub base_per_unit_usd: f64,
    pub quantity: u32,
    pub total_usd: f64,
}

/// Validate the wire payload into a [`PricingRequest`].
pub fn validate_payload(payload: &SavePayload) -> Result<PricingRequest, AppError> {
    let process = trimmed(&payload.process);
    let supplier = trimmed(&payload.supplier);
    let bladder_type = trimmed(&payload.bladder_type);

    let mut missing: Vec<&str> = Vec::new();
    if process.is_empty() {
        missing.push("process");
    }
    if supplier.is_empty() {
        missing.push("supplier");
    }
    if payload.material_thickness.is_none() {
        missing.push("material_thickness");
    }
    if payload.foam_thickness.is_none() {
        missing.push("foam_thickness");
    }
    if bladder_type.is_empty() {
        missing.push("bladder_type");
    }

    if !missing.is_empty() {
        return Err(AppError::Validation(format!(
            "Missing fields: {}",
            missing.join(", ")
        )));
    }

    let material_tenths_mm = payload
        .material_thickness
        .as_ref()
        .ok_or_else(|| AppError::Validation("Missing fields: material_thickness".to_string()))
        .and_then(|raw| parse_tenths("material_thickness", raw))?;
    let foam_tenths_mm = payload
        .foam_thickness
        .as_ref()
        .ok_or_else(|| AppError::Validation("Missing fields: foam_thickness".to_string()))
        .and_then(|raw| parse_tenths("foam_thickness", raw))?;

    let panel_config = match &payload.panel_config {
        Some(raw) => {
            let n = raw.as_i64().ok_or_else(|| {
                AppError::Validation("Panel configuration must be an integer".to_string())
            })?;
            let panels = u32::try_from(n).map_err(|_| AppError::InvalidSelection {
                field: "panel_config".to_string(),
                value: raw.raw(),
            })?;
            Some(panels)
        }
        None => None,
    };

    let quantity = match &payload.quantity {
        Some(raw) => {
            let n = raw
                .as_i64()
                .filter(|n| *n >= 1)
                .ok_or_else(|| {
                    AppError::Validation("Quantity must be an integer >= 1".to_string())
                })?;
            u32::try_from(n)
                .map_err(|_| AppError::Validation("Quantity is too large".to_string()))?
        }
        None => 1,
    };

    let target_currency = payload
        .currency
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_uppercase);

    Ok(PricingRequest {
        process,
        supplier,
        material_tenths_mm,
        foam_tenths_mm,
        bladder_type,
        panel_config,
        quantity,
        target_currency,
    })
}

fn trimmed(value: &Option<String>) -> String {
    value.as_deref().map(str::trim).unwrap_or("").to_string()
}

/// Parse a thickness value onto the 0.1 mm grid.
fn parse_tenths(field: &str, raw: &NumberOrText) -> Result<u32, AppError> {
    let value = raw.as_f64().ok_or_else(|| {
        AppError::Validation(format!("{} must be a number", field))
    })?;

    let scaled = value * 10.0;
    let tenths = scaled.round();
    if value < 0.0 || (scaled - tenths).abs() > 1e-6 {
        // Off-grid thicknesses can never match a table entry.
        return Err(AppError::InvalidSelection {
            field: field.to_string(),
            value: raw.raw(),
        });
    }

    Ok(tenths as u32)
}

/// Compute the per-unit base cost and the quantity total.
///
/// Any table lookup failure aborts with an invalid-selection error naming the
/// offending field. Labor and overhead are per-unit constants.
pub fn price(tables: &CostTables, request: &PricingRequest) -> Result<PricingResult, AppError> {
    let mut base = tables.process_cost(&request.process)?
        + tables.supplier_cost(&request.supplier)?
        + tables.material_cost(request.material_tenths_mm)?
        + tables.foam_cost(request.foam_tenths_mm)?
        + tables.bladder_cost(&request.bladder_type)?
        + LABOR_COST_PER_UNIT
        + OVERHEAD_COST_PER_UNIT;

    if let Some(panels) = request.panel_config {
        base += tables.panel_cost(panels)?;
    }

    // Two-stage rounding: per-unit first, then the quantity product.
    let base_per_unit_usd = round2(base);
    let total_usd = round2(base_per_unit_usd * f64::from(request.quantity));

    Ok(PricingResult {
        base_per_unit_usd,
        quantity: request.quantity,
        total_usd,
    })
}
