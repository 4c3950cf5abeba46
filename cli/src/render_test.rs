use super::*;
use chrono::{TimeZone, Utc};
use ledger::period::offset_from_minutes;
use ledger::summary::{group_by_day, month_summary as summarize};
use ledger::Period;
use uuid::Uuid;

fn expense(category: &str, title: &str, amount: f64, d: u32, h: u32) -> Expense {
    Expense {
        id: Uuid::nil(),
        category_id: category.to_owned(),
        title: title.to_owned(),
        description: None,
        amount,
        created_at: Utc.with_ymd_and_hms(2026, 3, d, h, 5, 0).unwrap(),
    }
}

#[test]
fn format_amount_drops_zero_fraction() {
    assert_eq!(format_amount(120.0), "₹120");
    assert_eq!(format_amount(120.5), "₹120.50");
}

#[test]
fn expense_line_uses_local_time_and_category_name() {
    let line = expense_line(&expense("harmful", "cigarettes", 30.0, 1, 10), offset_from_minutes(330));
    assert!(line.starts_with("15:35"));
    assert!(line.contains("Smoking / Drinking"));
    assert!(line.contains("₹30"));
}

#[test]
fn expense_line_falls_back_to_default_category() {
    let line = expense_line(&expense("retired", "thing", 1.0, 1, 10), offset_from_minutes(0));
    assert!(line.contains("Food"));
}

#[test]
fn expense_line_includes_description_on_next_line() {
    let mut e = expense("food", "lunch", 90.0, 1, 12);
    e.description = Some("with team".to_owned());
    let line = expense_line(&e, offset_from_minutes(0));
    assert_eq!(line.lines().nth(1).map(str::trim), Some("with team"));
}

#[test]
fn expense_list_reports_empty_and_total() {
    assert_eq!(expense_list(&[], offset_from_minutes(0)), "no expenses");
    let list = vec![expense("food", "a", 10.0, 1, 8), expense("food", "b", 5.5, 1, 9)];
    assert!(expense_list(&list, offset_from_minutes(0)).ends_with("total ₹15.50"));
}

#[test]
fn history_prints_day_headers() {
    let list = vec![expense("food", "a", 10.0, 1, 8), expense("food", "b", 5.0, 2, 9)];
    let text = history(&group_by_day(&list, offset_from_minutes(0)), offset_from_minutes(0));
    let first = text.lines().next().unwrap();
    assert_eq!(first, "Mon 02 Mar 2026  ₹5");
}

#[test]
fn month_summary_lists_categories() {
    let period = Period::month(2026, 2, offset_from_minutes(0)).unwrap();
    let list = vec![expense("food", "a", 100.0, 1, 8), expense("travel", "b", 60.0, 2, 9)];
    let now = Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap();
    let text = month_summary(&summarize(&list, period, now), offset_from_minutes(0));

    assert!(text.starts_with("March 2026"));
    assert!(text.contains("total ₹160  (2 expenses)"));
    assert!(text.contains("average per day ₹80"));
    assert!(text.contains("Travel"));
}
