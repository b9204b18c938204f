//! Option cost tables
//!
//! Each selectable option maps to a USD cost contribution. A value with no
//! entry is an invalid selection and must be rejected at lookup time; nothing
//! in the engine coerces an unknown value to a default cost.
//!
//! Thickness tables are keyed by integer tenths of a millimetre (1.0 mm = 10)
//! so lookups never depend on f64 equality.

use crate::error::AppError;
use std::collections::HashMap;

/// Cost tables for every selectable option, in USD per unit.
#[derive(Debug, Clone)]
pub struct CostTables {
    pub process: HashMap<String, f64>,
    pub supplier: HashMap<String, f64>,
    /// Keyed by tenths of a millimetre
    pub material_thickness: HashMap<u32, f64>,
    /// Keyed by tenths of a millimetre
    pub foam_thickness: HashMap<u32, f64>,
    pub bladder: HashMap<String, f64>,
    pub panel: HashMap<u32, f64>,
}

impl CostTables {
    /// The production tables.
    pub fn standard() -> Self {
        let process = [
            ("COT-B", 0.0),
            ("COT-B LFB", 0.0),
            ("Hybrid G-2", 0.0),
            ("Hybrid G-1", 0.0),
            ("Hybrid G-1 Light", 0.0),
            ("Machine", 0.0),
            ("Hand", 0.0),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        let supplier = [("Teijin", 2.5), ("SanFang", 2.0), ("Anli", 1.3)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();

        let material_thickness = [(7, 1.0), (10, 1.3), (12, 1.8)].into_iter().collect();

        let foam_thickness = [(20, 0.2), (25, 0.3), (30, 0.4), (35, 0.5), (40, 0.6)]
            .into_iter()
            .collect();

        let bladder = [
            ("Wound_SR", 2.0),
            ("Wound_B30", 2.5),
            ("Wound_B50", 2.7),
            ("Wound_B80", 2.9),
            ("Patch", 3.5),
            ("Self_Patch", 3.0),
            ("Foam Filled", 1.8),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        let panel = [32u32, 30, 28, 24, 22, 20, 18, 14, 12, 10, 8, 6, 4]
            .into_iter()
            .map(|k| (k, 0.0))
            .collect();

        Self {
            process,
            supplier,
            material_thickness,
            foam_thickness,
            bladder,
            panel,
        }
    }

    pub fn process_cost(&self, value: &str) -> Result<f64, AppError> {
        lookup_str(&self.process, "process", value)
    }

    pub fn supplier_cost(&self, value: &str) -> Result<f64, AppError> {
        lookup_str(&self.supplier, "supplier", value)
    }

    pub fn material_cost(&self, tenths_mm: u32) -> Result<f64, AppError> {
        lookup_tenths(&self.material_thickness, "material_thickness", tenths_mm)
    }

    pub fn foam_cost(&self, tenths_mm: u32) -> Result<f64, AppError> {
        lookup_tenths(&self.foam_thickness, "foam_thickness", tenths_mm)
    }

    pub fn bladder_cost(&self, value: &str) -> Result<f64, AppError> {
        lookup_str(&self.bladder, "bladder_type", value)
    }

    pub fn panel_cost(&self, panels: u32) -> Result<f64, AppError> {
        self.panel
            .get(&panels)
            .copied()
            .ok_or_else(|| AppError::InvalidSelection {
                field: "panel_config".to_string(),
                value: panels.to_string(),
            })
    }
}

fn lookup_str(table: &HashMap<String, f64>, field: &str, value: &str) -> Result<f64, AppError> {
    table
        .get(value)
        .copied()
        .ok_or_else(|| AppError::InvalidSelection {
            field: field.to_string(),
            value: value.to_string(),
        })
}

fn lookup_tenths(table: &HashMap<u32, f64>, field: &str, tenths_mm: u32) -> Result<f64, AppError> {
    table
        .get(&tenths_mm)
        .copied()
        .ok_or_else(|| AppError::InvalidSelection {
            field: field.to_string(),
            value: format_tenths(tenths_mm),
        })
}

/// Render tenths-of-mm as the decimal the caller submitted, e.g. 10 -> "1.0".
pub fn format_tenths(tenths_mm: u32) -> String {
    format!("{}.{}", tenths_mm / 10, tenths_mm % 10)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[test]
    fn test_standard_table_lookups() {
        let tables = CostTables::standard();
        assert_eq!(tables.process_cost("COT-B").unwrap(), 0.0);
        assert_eq!(tables.supplier_cost("Teijin").unwrap(), 2.5);
        assert_eq!(tables.material_cost(10).unwrap(), 1.3);
        assert_eq!(tables.foam_cost(30).unwrap(), 0.4);
        assert_eq!(tables.bladder_cost("Patch").unwrap(), 3.5);
        assert_eq!(tables.panel_cost(32).unwrap(), 0.0);
    }

    #[test]
    fn test_unknown_value_names_the_field() {
        let tables = CostTables::standard();

        let err = tables.supplier_cost("Acme").unwrap_err();
        match err {
            AppError::InvalidSelection { field, value } => {
                assert_eq!(field, "supplier");
                assert_eq!(value, "Acme");
            }
            other => panic!("expected InvalidSelection, got {:?}", other),
        }

        let err = tables.material_cost(9).unwrap_err();
        match err {
            AppError::InvalidSelection { field, value } => {
                assert_eq!(field, "material_thickness");
                assert_eq!(value, "0.9");
            }
            other => panic!("expected InvalidSelection, got {:?}", other),
        }
    }

    #[test]
    fn test_format_tenths() {
        assert_eq!(format_tenths(7), "0.7");
        assert_eq!(format_tenths(10), "1.0");
        assert_eq!(format_tenths(35), "3.5");
    }
}
