//! Schema mapping for the poverty sheet
//!
//! The sheet's header row is partly malformed: the deprivation columns sit
//! under a merged title cell, so the export names them only by ordinal
//! (`Unnamed: 10`, ...). The mapping is resolved once per file. A canonical
//! field is found by header alias first, and falls back to its known position
//! only when the header cell at that position carries no real name.

use std::fmt;

use csv::StringRecord;
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};
use crate::utils::text::normalize_cell;

/// Canonical fields of a poverty record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PovertyField {
    Region,
    CountryCode,
    Country,
    ReportingYear,
    SurveyName,
    SurveyYear,
    Monetary,
    EducationalAttainment,
    EducationalEnrollment,
    Electricity,
    Sanitation,
    DrinkingWater,
    Headcount,
}

impl fmt::Display for PovertyField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Region => "region",
            Self::CountryCode => "country_code",
            Self::Country => "country",
            Self::ReportingYear => "reporting_year",
            Self::SurveyName => "survey_name",
            Self::SurveyYear => "survey_year",
            Self::Monetary => "monetary",
            Self::EducationalAttainment => "educational_attainment",
            Self::EducationalEnrollment => "educational_enrollment",
            Self::Electricity => "electricity",
            Self::Sanitation => "sanitation",
            Self::DrinkingWater => "drinking_water",
            Self::Headcount => "headcount",
        };
        f.write_str(name)
    }
}

/// How one canonical field is located in the sheet
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub field: PovertyField,
    /// Accepted header texts, compared after [`normalize_header`]
    pub aliases: &'static [&'static str],
    /// Column index in the published sheet layout
    pub position: usize,
    /// Whether the file is unusable without this field
    pub required: bool,
}

/// The published layout of the multidimensional poverty sheet
pub const POVERTY_FIELDS: [FieldSpec; 13] = [
    FieldSpec {
        field: PovertyField::Region,
        aliases: &["region"],
        position: 0,
        required: false,
    },
    FieldSpec {
        field: PovertyField::CountryCode,
        aliases: &["country code", "code", "iso3"],
        position: 1,
        required: false,
    },
    FieldSpec {
        field: PovertyField::Country,
        aliases: &["economy", "country", "country name"],
        position: 2,
        required: true,
    },
    FieldSpec {
        field: PovertyField::ReportingYear,
        aliases: &["reporting year"],
        position: 3,
        required: true,
    },
    FieldSpec {
        field: PovertyField::SurveyName,
        aliases: &["survey name", "survey acronym"],
        position: 4,
        required: false,
    },
    FieldSpec {
        field: PovertyField::SurveyYear,
        aliases: &["survey year"],
        position: 5,
        required: false,
    },
    FieldSpec {
        field: PovertyField::Monetary,
        aliases: &["monetary", "deprivation rate (share of population)"],
        position: 9,
        required: false,
    },
    FieldSpec {
        field: PovertyField::EducationalAttainment,
        aliases: &["educational attainment"],
        position: 10,
        required: false,
    },
    FieldSpec {
        field: PovertyField::EducationalEnrollment,
        aliases: &["educational enrollment"],
        position: 11,
        required: false,
    },
    FieldSpec {
        field: PovertyField::Electricity,
        aliases: &["electricity"],
        position: 12,
        required: false,
    },
    FieldSpec {
        field: PovertyField::Sanitation,
        aliases: &["sanitation"],
        position: 13,
        required: false,
    },
    FieldSpec {
        field: PovertyField::DrinkingWater,
        aliases: &["drinking water"],
        position: 14,
        required: false,
    },
    FieldSpec {
        field: PovertyField::Headcount,
        aliases: &[
            "multidimensional poverty headcount ratio",
            "multidimensional poverty headcount",
            "mpm headcount",
        ],
        position: 15,
        required: false,
    },
];

/// How a field's column was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolvedBy {
    Header,
    Position,
}

/// Where one canonical field lives in this file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnResolution {
    pub field: PovertyField,
    pub column: usize,
    pub resolved_by: ResolvedBy,
}

/// The resolved mapping for one file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PovertyColumnMap {
    resolutions: Vec<ColumnResolution>,
    unresolved: Vec<PovertyField>,
}

/// Lower-case a header cell and strip unit suffixes such as `(%)`
#[must_use]
pub fn normalize_header(raw: &str) -> String {
    let cell = normalize_cell(raw).to_lowercase();
    let cell = cell.trim_end_matches("(%)").trim_end_matches('%');
    cell.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whether a header cell carries no real name (blank or an ordinal placeholder)
#[must_use]
pub fn is_ordinal_header(raw: &str) -> bool {
    let cell = normalize_header(raw);
    cell.is_empty()
        || cell.starts_with("unnamed")
        || cell.chars().all(|c| c.is_ascii_digit())
}

impl PovertyColumnMap {
    /// Resolve every canonical field against a header row
    pub fn resolve(header: &StringRecord) -> Result<Self> {
        let headers: Vec<String> = header.iter().map(normalize_header).collect();
        let mut claimed = vec![false; headers.len()];
        let mut map = Self::default();

        // Named matches first, so a positional fallback never takes a column
        // another field claims by name.
        let mut by_header: Vec<Option<usize>> = Vec::with_capacity(POVERTY_FIELDS.len());
        for spec in &POVERTY_FIELDS {
            let found = headers.iter().enumerate().position(|(idx, header)| {
                !claimed[idx] && spec.aliases.iter().any(|alias| header == alias)
            });
            if let Some(idx) = found {
                claimed[idx] = true;
            }
            by_header.push(found);
        }

        for (spec, found) in POVERTY_FIELDS.iter().zip(by_header) {
            if let Some(column) = found {
                map.resolutions.push(ColumnResolution {
                    field: spec.field,
                    column,
                    resolved_by: ResolvedBy::Header,
                });
                continue;
            }

            let positional = spec.position < header.len()
                && !claimed[spec.position]
                && is_ordinal_header(&header[spec.position]);
            if positional {
                claimed[spec.position] = true;
                map.resolutions.push(ColumnResolution {
                    field: spec.field,
                    column: spec.position,
                    resolved_by: ResolvedBy::Position,
                });
            } else if spec.required {
                return Err(AnalysisError::schema(format!(
                    "poverty sheet has no column for required field '{}'",
                    spec.field
                ))
                .into());
            } else {
                map.unresolved.push(spec.field);
            }
        }

        Ok(map)
    }

    /// Column index of a field, if it was resolved
    #[must_use]
    pub fn column(&self, field: PovertyField) -> Option<usize> {
        self.resolutions
            .iter()
            .find(|resolution| resolution.field == field)
            .map(|resolution| resolution.column)
    }

    /// All resolved fields
    #[must_use]
    pub fn resolutions(&self) -> &[ColumnResolution] {
        &self.resolutions
    }

    /// Optional fields the sheet does not provide
    #[must_use]
    pub fn unresolved(&self) -> &[PovertyField] {
        &self.unresolved
    }

    /// Text of a field in one data row; absent columns read as empty
    #[must_use]
    pub fn cell<'r>(&self, row: &'r StringRecord, field: PovertyField) -> &'r str {
        self.column(field)
            .and_then(|idx| row.get(idx))
            .unwrap_or("")
    }
}
