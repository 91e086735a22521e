// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use budgetdash::models::{Category, EntryType, Transaction};
use budgetdash::view_models::{
    BudgetStatus, budget_status, group_by_category, monthly_totals, sum_by_type,
};
use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;

fn category(id: &str, kind: EntryType) -> Category {
    Category {
        id: id.into(),
        name: id.to_uppercase(),
        kind,
        color: "#fff".into(),
        icon: "tag".into(),
    }
}

fn tx(id: &str, category_id: &str, amount: i64, kind: EntryType, month: u32) -> Transaction {
    Transaction {
        id: id.into(),
        amount: Decimal::from(amount),
        description: String::new(),
        notes: None,
        category_id: category_id.into(),
        date: Utc.with_ymd_and_hms(2025, month, 10, 0, 0, 0).unwrap(),
        kind,
        currency: "USD".into(),
    }
}

#[test]
fn group_by_category_shares_of_expense_total() {
    let txs = vec![
        tx("1", "c1", 100, EntryType::Expense, 1),
        tx("2", "c1", 50, EntryType::Expense, 1),
        tx("3", "c2", 50, EntryType::Expense, 1),
    ];
    let cats = vec![
        category("c1", EntryType::Expense),
        category("c2", EntryType::Expense),
    ];
    let totals = group_by_category(&txs, &cats);
    assert_eq!(totals.len(), 2);
    assert_eq!(totals[0].category_id, "c1");
    assert_eq!(totals[0].total, Decimal::from(150));
    assert_eq!(totals[0].count, 2);
    assert_eq!(totals[0].percentage_of_total, Decimal::from(75));
    assert_eq!(totals[1].total, Decimal::from(50));
    assert_eq!(totals[1].percentage_of_total, Decimal::from(25));
}

#[test]
fn half_point_shares_round_up() {
    let txs = vec![
        tx("1", "c1", 1, EntryType::Expense, 1),
        tx("2", "c2", 7, EntryType::Expense, 1),
    ];
    let cats = vec![
        category("c1", EntryType::Expense),
        category("c2", EntryType::Expense),
    ];
    let totals = group_by_category(&txs, &cats);
    assert_eq!(totals[0].percentage_of_total, Decimal::from(13));
    assert_eq!(totals[1].percentage_of_total, Decimal::from(88));
}

#[test]
fn empty_categories_report_zero_percent() {
    let cats = vec![
        category("c1", EntryType::Expense),
        category("salary", EntryType::Income),
    ];
    let totals = group_by_category(&[], &cats);
    assert!(totals
        .iter()
        .all(|t| t.total.is_zero() && t.percentage_of_total.is_zero()));
}

#[test]
fn mismatched_type_does_not_count_toward_category() {
    let txs = vec![
        tx("1", "c1", 100, EntryType::Expense, 1),
        tx("2", "c1", 999, EntryType::Income, 1),
        tx("3", "salary", 300, EntryType::Income, 1),
    ];
    let cats = vec![
        category("c1", EntryType::Expense),
        category("salary", EntryType::Income),
    ];
    let totals = group_by_category(&txs, &cats);
    assert_eq!(totals[0].total, Decimal::from(100));
    assert_eq!(totals[0].percentage_of_total, Decimal::ONE_HUNDRED);
    assert_eq!(totals[1].total, Decimal::from(300));
    assert_eq!(totals[1].percentage_of_total, Decimal::ONE_HUNDRED);
}

#[test]
fn budget_boundaries_belong_to_the_lower_class() {
    let budget = Decimal::from(1000);
    assert_eq!(budget_status(Decimal::from(800), budget), BudgetStatus::Under);
    assert_eq!(budget_status(Decimal::from(801), budget), BudgetStatus::Near);
    assert_eq!(budget_status(Decimal::from(1000), budget), BudgetStatus::Near);
    assert_eq!(budget_status(Decimal::from(1001), budget), BudgetStatus::Over);
    assert_eq!(budget_status(Decimal::ZERO, Decimal::ZERO), BudgetStatus::Under);
    assert_eq!(budget_status(Decimal::ONE, Decimal::ZERO), BudgetStatus::Over);
}

#[test]
fn sums_and_monthly_totals() {
    let txs = vec![
        tx("1", "c1", 40, EntryType::Expense, 3),
        tx("2", "salary", 1000, EntryType::Income, 1),
        tx("3", "c1", 60, EntryType::Expense, 1),
    ];
    assert_eq!(sum_by_type(&txs, EntryType::Expense), Decimal::from(100));
    assert_eq!(sum_by_type(&txs, EntryType::Income), Decimal::from(1000));

    let months = monthly_totals(&txs);
    assert_eq!(months.len(), 2);
    assert_eq!(months[0].month, "2025-01");
    assert_eq!(months[0].net(), Decimal::from(940));
    assert_eq!(months[1].month, "2025-03");
    assert_eq!(months[1].income, Decimal::ZERO);
    assert_eq!(months[1].expense, Decimal::from(40));
}
