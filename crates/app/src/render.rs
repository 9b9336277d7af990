//! Plain-text rendering of an [`AnalyticsSummary`].

use std::fmt::Write;

use receipt_engine::{AnalyticsSummary, Decimal, Money, NamedAmount, RoundingStrategy};

/// Renders the dashboard: status cards, then one section per breakdown.
pub fn summary_text(summary: &AnalyticsSummary) -> String {
    let mut out = String::new();
    let c = &summary.counters;

    let _ = writeln!(out, "Receipts     {}", c.total);
    let _ = writeln!(out, "Completed    {}", c.completed);
    let _ = writeln!(out, "Processing   {}", c.processing);
    let _ = writeln!(out, "With alerts  {}", c.with_alerts);
    let _ = writeln!(out, "Total spent  {}", dollars(summary.total_spent));

    section(&mut out, "Spending by category");
    if summary.by_category.is_empty() {
        out.push_str("  no completed receipts\n");
    }
    let category_total: Decimal = summary.by_category.iter().map(|c| c.value.value()).sum();
    let width = name_width(&summary.by_category);
    for category in &summary.by_category {
        let _ = writeln!(
            out,
            "  {:<width$}  {:>12}  {}",
            category.name,
            dollars(category.value),
            share(category.value, category_total),
        );
    }

    section(&mut out, "Top merchants");
    if summary.by_merchant.is_empty() {
        out.push_str("  no completed receipts\n");
    }
    let width = name_width(&summary.by_merchant);
    for (rank, merchant) in summary.by_merchant.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {}. {:<width$}  {:>12}",
            rank + 1,
            merchant.name,
            dollars(merchant.value),
        );
    }

    section(&mut out, "Spending over time");
    if summary.over_time.is_empty() {
        out.push_str("  no completed receipts\n");
    }
    for point in &summary.over_time {
        let _ = writeln!(out, "  {}  {:>12}", point.date, dollars(point.amount));
    }

    out
}

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n{title}");
}

fn dollars(amount: Money) -> String {
    let text = amount.to_string();
    match text.strip_prefix('-') {
        Some(abs) => format!("-${abs}"),
        None => format!("${text}"),
    }
}

/// Whole-percent share of `value` in `total`, blank when the total is zero.
fn share(value: Money, total: Decimal) -> String {
    if total.is_zero() {
        return String::new();
    }
    let percent = (value.value() * Decimal::ONE_HUNDRED / total)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    format!("{percent}%")
}

fn name_width(entries: &[NamedAmount]) -> usize {
    entries
        .iter()
        .map(|e| e.name.chars().count())
        .max()
        .unwrap_or(0)
}
