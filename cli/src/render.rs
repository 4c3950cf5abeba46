//! Plain-text rendering for terminal output.

use std::fmt::Write;

use chrono::FixedOffset;
use ledger::{DayGroup, Expense, MonthSummary};

/// Whole amounts print without decimals, others with two.
#[must_use]
pub fn format_amount(amount: f64) -> String {
    if amount.fract().abs() < f64::EPSILON {
        format!("₹{amount:.0}")
    } else {
        format!("₹{amount:.2}")
    }
}

#[must_use]
pub fn expense_line(expense: &Expense, offset: FixedOffset) -> String {
    let local = expense.created_at.with_timezone(&offset);
    let mut line = format!(
        "{}  {:<18} {:<24} {:>10}  {}",
        local.format("%H:%M"),
        expense.category().name(),
        expense.title,
        format_amount(expense.amount),
        expense.id,
    );
    if let Some(description) = &expense.description {
        let _ = write!(line, "\n       {description}");
    }
    line
}

#[must_use]
pub fn expense_list(expenses: &[Expense], offset: FixedOffset) -> String {
    if expenses.is_empty() {
        return "no expenses".to_owned();
    }
    let mut out = String::new();
    for e in expenses {
        let _ = writeln!(out, "{}", expense_line(e, offset));
    }
    let _ = write!(out, "total {}", format_amount(ledger::summary::total(expenses)));
    out
}

#[must_use]
pub fn history(groups: &[DayGroup], offset: FixedOffset) -> String {
    if groups.is_empty() {
        return "no expenses".to_owned();
    }
    let mut out = String::new();
    for group in groups {
        let _ = writeln!(out, "{}  {}", group.day.format("%a %d %b %Y"), format_amount(group.total));
        for e in &group.expenses {
            let _ = writeln!(out, "  {}", expense_line(e, offset));
        }
    }
    out.trim_end().to_owned()
}

#[must_use]
pub fn month_summary(summary: &MonthSummary, offset: FixedOffset) -> String {
    let start = summary.period.start.with_timezone(&offset);
    let mut out = format!(
        "{}\ntotal {}  ({} expenses)\naverage per day {}",
        start.format("%B %Y"),
        format_amount(summary.total),
        summary.count,
        format_amount(summary.avg_per_day),
    );
    for row in &summary.by_category {
        let _ = write!(out, "\n  {:<18} {:>10}", row.name, format_amount(row.total));
    }
    out
}

#[cfg(test)]
#[path = "render_test.rs"]
mod tests;
