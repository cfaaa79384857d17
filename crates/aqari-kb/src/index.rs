use aqari_core::{error::AqariError, text};
use serde::Deserialize;
use tracing::{debug, info};

/// Structural role of a knowledge-base row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StructuralType {
    /// A single building/listing profile.
    #[default]
    Profile,
    /// A row presenting reference-number choices for an ambiguous name.
    AmbiguityMenu,
    /// A menu of buildings within an area.
    AreaMenu,
    /// An ROI/rent report row for one building and bedroom type.
    Report,
    /// A generic navigation menu.
    Menu,
}

impl StructuralType {
    /// Parse the sheet's `structural_type` cell. Unknown or absent values
    /// fall back to `Profile`, matching how untyped rows behave.
    fn parse(cell: Option<&str>) -> Self {
        match cell.map(|s| text::normalize(s)).as_deref() {
            Some("ambiguity_menu") => Self::AmbiguityMenu,
            Some("area_menu") => Self::AreaMenu,
            Some("report") => Self::Report,
            Some("menu") => Self::Menu,
            _ => Self::Profile,
        }
    }
}

/// One row of the CSV export, as written by the sheet. Extra columns are
/// ignored; every declared column is optional because the sheet is ragged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRow {
    /// Comma-separated keyword cell.
    #[serde(default)]
    pub key_word: Option<String>,
    /// Free-text reply column.
    #[serde(default)]
    pub report: Option<String>,
    #[serde(default)]
    pub structural_type: Option<String>,
    #[serde(default)]
    pub building_id: Option<String>,
    #[serde(default)]
    pub building_name: Option<String>,
    #[serde(default)]
    pub bedroom_type: Option<String>,
    #[serde(default, rename = "Gross_roi")]
    pub gross_roi: Option<String>,
    #[serde(default, rename = "Median_rent")]
    pub median_rent: Option<String>,
}

/// One indexed entry: normalized keywords plus the reply payload and
/// structural metadata. Immutable after [`KnowledgeBase::build`].
#[derive(Debug, Clone)]
pub struct KeywordEntry {
    pub keywords: Vec<String>,
    pub reply_text: String,
    pub structural_type: StructuralType,
    pub building_id: Option<String>,
    pub building_name: Option<String>,
    pub bedroom_type: Option<String>,
    pub roi_percent: Option<f64>,
    pub median_rent: Option<String>,
}

/// The read-only keyword table, in original sheet order.
#[derive(Debug, Default)]
pub struct KnowledgeBase {
    entries: Vec<KeywordEntry>,
}

impl KnowledgeBase {
    /// Load and index the CSV export at `path`.
    pub fn load(path: &str) -> Result<Self, AqariError> {
        let mut reader = csv::Reader::from_path(path)
            .map_err(|e| AqariError::Kb(format!("failed to open {path}: {e}")))?;

        let mut rows = Vec::new();
        for (i, record) in reader.deserialize::<RawRow>().enumerate() {
            match record {
                Ok(row) => rows.push(row),
                // Data-quality failure policy: skip, never crash.
                Err(e) => debug!("skipping unreadable row {}: {e}", i + 2),
            }
        }

        let kb = Self::build(rows);
        info!("knowledge base loaded from {path}: {} entries", kb.len());
        Ok(kb)
    }

    /// Build the index from raw rows. Rows without a usable keyword cell
    /// are silently excluded.
    pub fn build(rows: Vec<RawRow>) -> Self {
        let mut entries = Vec::with_capacity(rows.len());

        for row in rows {
            let keywords = match row.key_word.as_deref() {
                Some(cell) => split_keywords(cell),
                None => Vec::new(),
            };
            if keywords.is_empty() {
                debug!("skipping row with empty keyword cell");
                continue;
            }

            entries.push(KeywordEntry {
                keywords,
                reply_text: row.report.unwrap_or_default(),
                structural_type: StructuralType::parse(row.structural_type.as_deref()),
                building_id: clean_cell(row.building_id),
                building_name: clean_cell(row.building_name),
                bedroom_type: row
                    .bedroom_type
                    .as_deref()
                    .and_then(|b| text::extract_bedroom(b).or_else(|| clean_cell(Some(b.to_string())))),
                roi_percent: row.gross_roi.as_deref().and_then(parse_roi),
                median_rent: clean_cell(row.median_rent),
            });
        }

        Self { entries }
    }

    pub fn entries(&self) -> &[KeywordEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First entry whose keyword set contains the exact reference numeral.
    pub fn entry_for_reference(&self, reference: &str) -> Option<&KeywordEntry> {
        self.entries
            .iter()
            .find(|e| e.keywords.iter().any(|k| k == reference))
    }

    /// First entry carrying an ROI figure for this building and bedroom type.
    pub fn roi_row(&self, building_id: &str, bedroom: &str) -> Option<&KeywordEntry> {
        self.entries.iter().find(|e| {
            e.roi_percent.is_some()
                && e.building_id.as_deref() == Some(building_id)
                && e.bedroom_type.as_deref() == Some(bedroom)
        })
    }
}

/// Split a comma-separated keyword cell into normalized, deduplicated tokens.
fn split_keywords(cell: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for token in cell.split(',') {
        let norm = text::normalize(token);
        if !norm.is_empty() && !out.contains(&norm) {
            out.push(norm);
        }
    }
    out
}

/// Trim a cell, mapping blank to `None`.
fn clean_cell(cell: Option<String>) -> Option<String> {
    cell.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Parse "7.5%" / "7.5" / " 7.5 % " into a percentage. Non-numeric → `None`.
fn parse_roi(cell: &str) -> Option<f64> {
    cell.trim()
        .trim_end_matches('%')
        .trim()
        .parse::<f64>()
        .ok()
}
