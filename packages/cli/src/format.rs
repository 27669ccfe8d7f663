//! Plain-text rendering of selection results.

use std::fmt::Write as _;

use faf_flows_dataset_models::{DatasetDefinition, MeasureColumn};
use faf_flows_explorer::SelectionView;

/// Formats `value` with `decimals` places and comma thousands separators
/// (`1234567.891` → `"1,234,567.9"`).
#[must_use]
pub fn group_thousands(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = formatted
        .split_once('.')
        .map_or((formatted.as_str(), None), |(i, f)| (i, Some(f)));

    let mut grouped = String::with_capacity(formatted.len() + int_part.len() / 3 + 1);
    if value.is_sign_negative() && formatted.chars().any(|c| c.is_ascii_digit() && c != '0') {
        grouped.push('-');
    }
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }
    grouped
}

fn measure_line(measure: &MeasureColumn, total: f64) -> String {
    let amount = group_thousands(total, 1);
    measure.unit.as_deref().map_or_else(
        || format!("- {}: {amount}", measure.label),
        |unit| format!("- {}: {amount} {unit}", measure.label),
    )
}

/// Renders the summary block shown beside the map.
#[must_use]
pub fn summary_text(view: &SelectionView, dataset: &DatasetDefinition) -> String {
    let mut out = String::new();
    let origin = view
        .origin
        .as_ref()
        .map_or("(no origin)", |o| o.label.as_str());

    let _ = writeln!(out, "{} / {}", dataset.name, view.category.name);
    let _ = writeln!(out, "Displaying trips from {origin} to {}", view.destination);
    let _ = writeln!(out);
    let _ = writeln!(out, "Trip Summary Statistics");
    let _ = writeln!(
        out,
        "- Number of trips: {}",
        group_thousands(u64_to_f64(view.summary.count), 0)
    );
    let _ = writeln!(
        out,
        "{}",
        measure_line(&dataset.flows.magnitude, view.summary.total_magnitude)
    );
    for measure in &dataset.flows.measures {
        let _ = writeln!(
            out,
            "{}",
            measure_line(measure, view.summary.measure_total(&measure.column))
        );
    }
    if view.unresolved > 0 {
        let _ = writeln!(
            out,
            "- Not drawn (no zone centroid): {}",
            view.unresolved
        );
    }

    if !view.top_destinations.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Top {} Destination Zones by {}",
            view.top_destinations.len(),
            dataset.flows.magnitude.label
        );
        let width = view
            .top_destinations
            .iter()
            .map(|d| d.label.len())
            .max()
            .unwrap_or(0);
        for dest in &view.top_destinations {
            let _ = writeln!(
                out,
                "  {:<width$}  {:>14}",
                dest.label,
                group_thousands(dest.total, 1)
            );
        }
    }
    out
}

#[allow(clippy::cast_precision_loss)]
const fn u64_to_f64(n: u64) -> f64 {
    n as f64
}
