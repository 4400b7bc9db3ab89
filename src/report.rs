//! Quote and retrospective documents as ordered label/value pairs.
//!
//! Values are pre-formatted strings (two decimals for money and
//! percentages); a renderer only has to lay them out.

use std::fmt::Write as _;

use chrono::NaiveDate;
use serde::Serialize;

use crate::premium::PremiumEstimate;
use crate::retrospective::{ImpactBasis, RetrospectiveResult};
use crate::types::BusinessParameters;

pub const TITLE: &str = "Weather-Shield";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub title: String,
    pub fields: Vec<(String, String)>,
    pub footnote: Option<String>,
    pub generated_on: Option<NaiveDate>,
}

impl Document {
    fn new(title: &str) -> Self {
        Document { title: title.to_string(), fields: Vec::new(), footnote: None, generated_on: None }
    }

    fn field(mut self, label: &str, value: String) -> Self {
        self.fields.push((label.to_string(), value));
        self
    }

    pub fn dated(mut self, date: NaiveDate) -> Self {
        self.generated_on = Some(date);
        self
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.fields.iter().find(|(l, _)| l == label).map(|(_, v)| v.as_str())
    }

    pub fn render_text(&self) -> String {
        let width = self.fields.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.title);
        let _ = writeln!(out, "{}", "=".repeat(self.title.chars().count().max(width + 20)));
        for (label, value) in &self.fields {
            let _ = writeln!(out, "{label:<width$} : {value}");
        }
        if let Some(note) = &self.footnote {
            let _ = writeln!(out, "\n{note}");
        }
        if let Some(date) = self.generated_on {
            let _ = writeln!(out, "\nGenerated on {}", date.format("%d/%m/%Y"));
        }
        out
    }
}

pub fn money(amount: f64, currency: &str) -> String {
    format!("{amount:.2} {currency}")
}

pub fn premium_value(estimate: &PremiumEstimate, currency: &str) -> String {
    if estimate.is_no_data() {
        "n/a (no rainfall data)".to_string()
    } else {
        money(estimate.premium, currency)
    }
}

pub fn impact_value(result: &RetrospectiveResult) -> String {
    match result.impact_basis {
        ImpactBasis::Measured => format!("{:.2}%", result.impact_percent),
        ImpactBasis::ZeroBaseline => {
            format!("{:.2}% (undefined: zero uninsured total)", result.impact_percent)
        }
    }
}

/// Premium quote for a business profile.
pub fn quote_document(
    params: &BusinessParameters,
    estimate: &PremiumEstimate,
    currency: &str,
) -> Document {
    Document::new(TITLE)
        .field("Maximum daily revenue", money(params.max_daily_revenue(), currency))
        .field("Fixed daily cost", money(params.fixed_daily_cost(), currency))
        .field("Pivot rainfall", format!("{:.2} mm", params.pivot_rainfall_mm()))
        .field("Estimated annual premium", premium_value(estimate, currency))
}

/// How the cover would have performed over the historical window.
pub fn retrospective_document(
    estimate: &PremiumEstimate,
    result: &RetrospectiveResult,
    currency: &str,
) -> Document {
    let mut doc = Document::new(TITLE)
        .field("Estimated annual premium", premium_value(estimate, currency))
        .field("Total without insurance", money(result.total_uninsured, currency))
        .field("Total with insurance", money(result.total_insured, currency))
        .field("Insurance impact", impact_value(result))
        .field("Conclusion", result.verdict().label().to_string());
    doc.footnote = Some("(Values above are based on historical rainfall analysis.)".to_string());
    doc
}
