//! Terminal formatting for pipeline outputs.
//!
//! Formatting stays here so the estimation code never builds strings for
//! display, and output changes are localized.

use crate::app::pipeline::{BatchEntry, EstimateOutput};
use crate::domain::{FinalResult, FusionWeights, MlStatus};

/// Full human-readable report for one request.
pub fn format_estimate(out: &EstimateOutput) -> String {
    let r = &out.result;
    let mut s = String::new();

    s.push_str("=== bfe - Body Fat Ensemble ===\n");
    if let Some(id) = &out.id {
        s.push_str(&format!("Request: {id}\n"));
    }
    s.push_str(&format!(
        "BMI: {:.1} | body type: {} | w/s={:.3} h/s={:.3} t/s={:.3}\n",
        out.bmi,
        out.body_type.as_str(),
        out.ratios.waist_to_shoulder,
        out.ratios.hip_to_shoulder,
        out.ratios.torso_to_shoulder,
    ));

    s.push_str(&format!(
        "\nBody fat: {:.1}% ({} mode)\n",
        r.final_prediction,
        r.mode.as_str()
    ));
    s.push_str(&format!(
        "Confidence: {:.2} ({})\n",
        r.confidence, r.confidence_level
    ));

    s.push_str("\nMethods:\n");
    s.push_str(&format_methods(r));

    s.push_str(&format!(
        "\nSAFE weights:         {}\n",
        fmt_weights(&r.safe_weights)
    ));
    if let Some(w) = &r.experimental_weights {
        s.push_str(&format!("EXPERIMENTAL weights: {}\n", fmt_weights(w)));
    }

    let notes: Vec<&String> = out.alerts.iter().chain(r.adjustments.iter()).collect();
    if !notes.is_empty() {
        s.push_str("\nAdjustments:\n");
        for note in notes {
            s.push_str(&format!("- {note}\n"));
        }
    }

    let a = &out.analysis;
    s.push_str("\nAnalysis:\n");
    s.push_str(&format!(
        "- category: {} ({})\n",
        a.category_label, a.category_description
    ));
    s.push_str(&format!(
        "- shape: {} ({})\n",
        a.body_shape.label(),
        a.shape_description
    ));
    s.push_str(&format!(
        "- fat mass: {:.1} kg | lean mass: {:.1} kg\n",
        a.fat_mass_kg, a.lean_mass_kg
    ));
    s.push_str(&format!("- health: {}\n", a.health_status.label()));
    for rec in &a.recommendations {
        s.push_str(&format!("  * {rec}\n"));
    }

    s
}

fn format_methods(r: &FinalResult) -> String {
    let mut s = String::new();
    s.push_str(&format!(
        "  {:<14} {:>6.1}%  conf={:.2}\n",
        "rules", r.rules_prediction, r.confidences.rules
    ));
    s.push_str(&format!(
        "  {:<14} {:>6.1}%  conf={:.2}\n",
        "texture", r.texture_prediction, r.confidences.texture
    ));
    match (r.ml_prediction, r.ml_analysis.divergence) {
        (Some(ml), Some(div)) => s.push_str(&format!(
            "  {:<14} {:>6.1}%  divergence={:.1} [{}]\n",
            "ml",
            ml,
            div,
            status_label(r)
        )),
        _ => s.push_str(&format!("  {:<14} {:>7}\n", "ml", "n/a")),
    }
    s.push_str(&format!(
        "  {:<14} {:>6.1}%",
        "safe", r.safe_prediction
    ));
    if r.validation.was_adjusted {
        s.push_str(&format!(" (validated from {:.1}%)", r.validation.original));
    }
    s.push('\n');
    if let Some(exp) = r.experimental_prediction {
        s.push_str(&format!("  {:<14} {:>6.1}%\n", "experimental", exp));
    }
    s
}

fn status_label(r: &FinalResult) -> &'static str {
    match r.ml_analysis.status {
        MlStatus::Quarantine => "quarantine",
        MlStatus::Active => "active",
    }
}

/// One summary line per batch entry.
pub fn format_batch_line(entry: &BatchEntry) -> String {
    match (&entry.output, &entry.error) {
        (Some(out), _) => format!(
            "{:<16} {:>6.1}%  {:<12} conf={:.2} ({})",
            truncate(&entry.id, 16),
            out.result.final_prediction,
            out.result.mode.as_str(),
            out.result.confidence,
            out.result.confidence_level,
        ),
        (None, Some(err)) => format!("{:<16} ERROR  {err}", truncate(&entry.id, 16)),
        (None, None) => format!("{:<16} ERROR", truncate(&entry.id, 16)),
    }
}

fn fmt_weights(w: &FusionWeights) -> String {
    format!(
        "ml={:.3} rules={:.3} texture={:.3}",
        w.ml, w.rules, w.texture
    )
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}
