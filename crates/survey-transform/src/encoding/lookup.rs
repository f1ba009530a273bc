//! Fixed code tables for composite survey codes.
//!
//! Each table is a total function over its declared domain plus the missing
//! codes: `0`, `-1` and a missing cell map to missing, every listed code maps
//! to its value, and anything else is a coercion error.

use serde::{Deserialize, Serialize};
use survey_ingest::polars_utils::{format_numeric, integral};

use crate::error::{Result, TransformError};

/// Codes that mean "unknown" in every composite attribute.
const MISSING_CODES: [i64; 2] = [0, -1];

// Youth-cohort code (1-15) to the decade of youth.
const DECADE_ENTRIES: &[(i64, f64)] = &[
    (1, 40.0),
    (2, 40.0),
    (3, 50.0),
    (4, 50.0),
    (5, 60.0),
    (6, 60.0),
    (7, 60.0),
    (8, 70.0),
    (9, 70.0),
    (10, 80.0),
    (11, 80.0),
    (12, 80.0),
    (13, 80.0),
    (14, 90.0),
    (15, 90.0),
];

// Youth-cohort code to movement: 0 mainstream, 1 avantgarde.
const MOVEMENT_ENTRIES: &[(i64, f64)] = &[
    (1, 0.0),
    (2, 1.0),
    (3, 0.0),
    (4, 1.0),
    (5, 0.0),
    (6, 1.0),
    (7, 1.0),
    (8, 0.0),
    (9, 1.0),
    (10, 0.0),
    (11, 1.0),
    (12, 0.0),
    (13, 1.0),
    (14, 0.0),
    (15, 1.0),
];

// Two-digit international typology: tens digit is wealth.
const WEALTH_ENTRIES: &[(i64, f64)] = &[
    (11, 1.0),
    (12, 1.0),
    (13, 1.0),
    (14, 1.0),
    (15, 1.0),
    (21, 2.0),
    (22, 2.0),
    (23, 2.0),
    (24, 2.0),
    (25, 2.0),
    (31, 3.0),
    (32, 3.0),
    (33, 3.0),
    (34, 3.0),
    (35, 3.0),
    (41, 4.0),
    (42, 4.0),
    (43, 4.0),
    (44, 4.0),
    (45, 4.0),
    (51, 5.0),
    (52, 5.0),
    (53, 5.0),
    (54, 5.0),
    (55, 5.0),
];

// Ones digit is life stage.
const LIFE_STAGE_ENTRIES: &[(i64, f64)] = &[
    (11, 1.0),
    (12, 2.0),
    (13, 3.0),
    (14, 4.0),
    (15, 5.0),
    (21, 1.0),
    (22, 2.0),
    (23, 3.0),
    (24, 4.0),
    (25, 5.0),
    (31, 1.0),
    (32, 2.0),
    (33, 3.0),
    (34, 4.0),
    (35, 5.0),
    (41, 1.0),
    (42, 2.0),
    (43, 3.0),
    (44, 4.0),
    (45, 5.0),
    (51, 1.0),
    (52, 2.0),
    (53, 3.0),
    (54, 4.0),
    (55, 5.0),
];

/// A derived attribute and the table that computes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CodeTable {
    Decade,
    Movement,
    Wealth,
    LifeStage,
}

impl CodeTable {
    /// Name of the derived column.
    pub fn output_name(self) -> &'static str {
        match self {
            Self::Decade => "DECADE",
            Self::Movement => "MOVEMENT",
            Self::Wealth => "WEALTH",
            Self::LifeStage => "LIFE_STAGE",
        }
    }

    fn entries(self) -> &'static [(i64, f64)] {
        match self {
            Self::Decade => DECADE_ENTRIES,
            Self::Movement => MOVEMENT_ENTRIES,
            Self::Wealth => WEALTH_ENTRIES,
            Self::LifeStage => LIFE_STAGE_ENTRIES,
        }
    }

    /// Codes the table maps to a value.
    pub fn domain(self) -> impl Iterator<Item = i64> {
        self.entries().iter().map(|(code, _)| *code)
    }

    /// Maps one code of `attribute` through the table.
    pub fn lookup(self, attribute: &str, code: Option<f64>) -> Result<Option<f64>> {
        let Some(raw) = code else {
            return Ok(None);
        };
        let Some(code) = integral(raw) else {
            return Err(TransformError::coercion(
                attribute,
                format_numeric(raw),
                "composite code is not an integer",
            ));
        };
        if MISSING_CODES.contains(&code) {
            return Ok(None);
        }
        self.entries()
            .iter()
            .find(|(key, _)| *key == code)
            .map(|(_, value)| Some(*value))
            .ok_or_else(|| {
                TransformError::coercion(
                    attribute,
                    code.to_string(),
                    format!("outside the domain of {}", self.output_name()),
                )
            })
    }

    /// Maps a whole column.
    pub fn map_values(self, attribute: &str, codes: &[Option<f64>]) -> Result<Vec<Option<f64>>> {
        codes
            .iter()
            .map(|code| self.lookup(attribute, *code))
            .collect()
    }

    /// Tables that decompose `attribute`, in output order.
    pub fn for_attribute(attribute: &str) -> Option<[CodeTable; 2]> {
        match attribute {
            "PRAEGENDE_JUGENDJAHRE" => Some([Self::Decade, Self::Movement]),
            "CAMEO_INTL_2015" => Some([Self::Wealth, Self::LifeStage]),
            _ => None,
        }
    }
}
