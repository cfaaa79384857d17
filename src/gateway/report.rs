//! ROI report composition — the terminal action of the comparison dialogue.
//!
//! Figures come straight from the knowledge base; nothing is computed from
//! raw financials. A missing row is reported in-band as unavailable data,
//! never as an error.

use super::Gateway;
use aqari_kb::KeywordEntry;

impl Gateway {
    /// Build the report for one or two buildings and a bedroom type.
    /// More than two resolved buildings compares the first two.
    pub(crate) fn compose_report(&self, building_ids: &[String], bedroom: &str) -> String {
        match building_ids {
            [] => self.prompts.not_found.clone(),
            [one] => self.single_report(one, bedroom),
            [a, b, ..] => self.comparison_report(a, b, bedroom),
        }
    }

    fn single_report(&self, building_id: &str, bedroom: &str) -> String {
        match self.kb.roi_row(building_id, bedroom) {
            Some(row) => {
                let mut lines = vec![
                    format!("{} — {}", display_name(row, building_id), bedroom_label(bedroom)),
                    format!("Gross ROI: {}", roi_figure(row)),
                ];
                if let Some(rent) = &row.median_rent {
                    lines.push(format!("Median rent: {rent}"));
                }
                lines.join("\n")
            }
            None => self.unavailable(building_id, bedroom),
        }
    }

    fn comparison_report(&self, a: &str, b: &str, bedroom: &str) -> String {
        let row_a = self.kb.roi_row(a, bedroom);
        let row_b = self.kb.roi_row(b, bedroom);

        match (row_a, row_b) {
            (Some(ra), Some(rb)) => {
                let name_a = display_name(ra, a);
                let name_b = display_name(rb, b);
                // roi_row guarantees the figure is present.
                let roi_a = ra.roi_percent.unwrap_or_default();
                let roi_b = rb.roi_percent.unwrap_or_default();

                let verdict = if roi_a > roi_b {
                    format!("{name_a} comes out ahead on gross ROI.")
                } else if roi_b > roi_a {
                    format!("{name_b} comes out ahead on gross ROI.")
                } else {
                    "Both come out equal on gross ROI.".to_string()
                };

                [
                    format!("{} comparison:", bedroom_label(bedroom)),
                    figure_line(ra, a),
                    figure_line(rb, b),
                    verdict,
                ]
                .join("\n")
            }
            (Some(ra), None) => format!(
                "{}\n{}",
                figure_line(ra, a),
                self.unavailable(b, bedroom)
            ),
            (None, Some(rb)) => format!(
                "{}\n{}",
                self.unavailable(a, bedroom),
                figure_line(rb, b)
            ),
            (None, None) => format!(
                "{}\n{}",
                self.unavailable(a, bedroom),
                self.unavailable(b, bedroom)
            ),
        }
    }

    fn unavailable(&self, building_id: &str, bedroom: &str) -> String {
        let name = self
            .kb
            .entries()
            .iter()
            .find(|e| e.building_id.as_deref() == Some(building_id))
            .and_then(|e| e.building_name.clone())
            .unwrap_or_else(|| building_id.to_string());
        self.prompts
            .data_unavailable
            .replace("{building}", &name)
            .replace("{bedroom}", bedroom)
    }
}

fn display_name<'a>(row: &'a KeywordEntry, building_id: &'a str) -> &'a str {
    row.building_name.as_deref().unwrap_or(building_id)
}

fn bedroom_label(bedroom: &str) -> String {
    if bedroom == "studio" {
        "Studio".to_string()
    } else {
        format!("{bedroom} bedroom")
    }
}

fn figure_line(row: &KeywordEntry, building_id: &str) -> String {
    let mut line = format!(
        "{}: gross ROI {}",
        display_name(row, building_id),
        roi_figure(row)
    );
    if let Some(rent) = &row.median_rent {
        line.push_str(&format!(", median rent {rent}"));
    }
    line
}

fn roi_figure(row: &KeywordEntry) -> String {
    match row.roi_percent {
        Some(roi) => format!("{roi}%"),
        None => "n/a".to_string(),
    }
}
