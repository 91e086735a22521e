// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Pure aggregates over store snapshots, recomputed on every read.

use crate::models::{Category, EntryType, Goal, Transaction};
use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

const MS_PER_DAY: f64 = 86_400_000.0;

pub fn sum_by_type(transactions: &[Transaction], kind: EntryType) -> Decimal {
    transactions
        .iter()
        .filter(|t| t.kind == kind)
        .map(|t| t.amount)
        .sum()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category_id: String,
    pub name: String,
    pub kind: EntryType,
    pub color: String,
    pub total: Decimal,
    pub count: usize,
    /// Whole-number share of the combined total of same-type categories; 0 when that is 0.
    pub percentage_of_total: Decimal,
}

/// Per-category totals in category order. A transaction counts toward a
/// category only when their types agree; each share is measured against the
/// combined total of all categories of the same type.
pub fn group_by_category(
    transactions: &[Transaction],
    categories: &[Category],
) -> Vec<CategoryTotal> {
    let mut per_category: HashMap<(&str, EntryType), (Decimal, usize)> = HashMap::new();
    for t in transactions {
        let entry = per_category
            .entry((t.category_id.as_str(), t.kind))
            .or_insert((Decimal::ZERO, 0));
        entry.0 += t.amount;
        entry.1 += 1;
    }
    let totals: Vec<(Decimal, usize)> = categories
        .iter()
        .map(|c| {
            per_category
                .get(&(c.id.as_str(), c.kind))
                .copied()
                .unwrap_or((Decimal::ZERO, 0))
        })
        .collect();
    let type_total = |kind: EntryType| -> Decimal {
        categories
            .iter()
            .zip(&totals)
            .filter(|(c, _)| c.kind == kind)
            .map(|(_, (total, _))| *total)
            .sum()
    };
    let income = type_total(EntryType::Income);
    let expense = type_total(EntryType::Expense);

    categories
        .iter()
        .zip(totals)
        .map(|(c, (total, count))| {
            let denominator = match c.kind {
                EntryType::Income => income,
                EntryType::Expense => expense,
            };
            let percentage_of_total = if denominator.is_zero() {
                Decimal::ZERO
            } else {
                (total / denominator * Decimal::ONE_HUNDRED)
                    .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            };
            CategoryTotal {
                category_id: c.id.clone(),
                name: c.name.clone(),
                kind: c.kind,
                color: c.color.clone(),
                total,
                count,
                percentage_of_total,
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetStatus {
    Under,
    Near,
    Over,
}

impl BudgetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetStatus::Under => "under",
            BudgetStatus::Near => "near",
            BudgetStatus::Over => "over",
        }
    }
}

/// `under` up to and including 80% of budget, `near` up to and including 100%,
/// `over` beyond. A zero budget is `over` as soon as anything is spent.
pub fn budget_status(amount_spent: Decimal, budget: Decimal) -> BudgetStatus {
    if budget <= Decimal::ZERO {
        return if amount_spent > Decimal::ZERO {
            BudgetStatus::Over
        } else {
            BudgetStatus::Under
        };
    }
    let pct = amount_spent * Decimal::ONE_HUNDRED / budget;
    if pct <= Decimal::from(80) {
        BudgetStatus::Under
    } else if pct <= Decimal::ONE_HUNDRED {
        BudgetStatus::Near
    } else {
        BudgetStatus::Over
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalProgress {
    /// `current / target * 100`, unclamped.
    pub percentage: Decimal,
    /// Whole days until the deadline, rounded up; negative once overdue.
    pub days_remaining: Option<i64>,
}

impl GoalProgress {
    /// Percentage clamped to `[0, 100]` for display.
    pub fn display_percentage(&self) -> Decimal {
        self.percentage.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
    }

    pub fn is_overdue(&self) -> bool {
        self.days_remaining.is_some_and(|d| d < 0)
    }
}

pub fn goal_progress(goal: &Goal, now: DateTime<Utc>) -> GoalProgress {
    let percentage = if goal.target_amount.is_zero() {
        Decimal::ZERO
    } else {
        goal.current_amount / goal.target_amount * Decimal::ONE_HUNDRED
    };
    let days_remaining = goal.end_date.map(|deadline| {
        let ms = (deadline - now).num_milliseconds() as f64;
        (ms / MS_PER_DAY).ceil() as i64
    });
    GoalProgress {
        percentage,
        days_remaining,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTotals {
    pub month: String,
    pub income: Decimal,
    pub expense: Decimal,
}

impl MonthlyTotals {
    pub fn net(&self) -> Decimal {
        self.income - self.expense
    }
}

/// Income and expense per `YYYY-MM`, oldest month first.
pub fn monthly_totals(transactions: &[Transaction]) -> Vec<MonthlyTotals> {
    let mut map: BTreeMap<String, (Decimal, Decimal)> = BTreeMap::new();
    for t in transactions {
        let entry = map
            .entry(t.date.format("%Y-%m").to_string())
            .or_insert((Decimal::ZERO, Decimal::ZERO));
        match t.kind {
            EntryType::Income => entry.0 += t.amount,
            EntryType::Expense => entry.1 += t.amount,
        }
    }
    map.into_iter()
        .map(|(month, (income, expense))| MonthlyTotals {
            month,
            income,
            expense,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GoalPriority, GoalStatus};
    use chrono::{Duration, TimeZone};

    fn goal(current: i64, target: i64, end: Option<DateTime<Utc>>) -> Goal {
        Goal {
            id: "g1".into(),
            title: "Trip".into(),
            description: None,
            target_amount: Decimal::from(target),
            current_amount: Decimal::from(current),
            end_date: end,
            priority: GoalPriority::Medium,
            status: GoalStatus::Active,
            currency: "USD".into(),
        }
    }

    #[test]
    fn progress_is_unclamped_but_display_is_clamped() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let p = goal_progress(&goal(150, 100, None), now);
        assert_eq!(p.percentage, Decimal::from(150));
        assert_eq!(p.display_percentage(), Decimal::ONE_HUNDRED);
        assert_eq!(p.days_remaining, None);
    }

    #[test]
    fn days_remaining_rounds_up_and_goes_negative() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let soon = goal_progress(&goal(0, 100, Some(now + Duration::hours(30))), now);
        assert_eq!(soon.days_remaining, Some(2));
        let late = goal_progress(&goal(0, 100, Some(now - Duration::hours(36))), now);
        assert_eq!(late.days_remaining, Some(-1));
        assert!(late.is_overdue());
    }

    #[test]
    fn zero_target_reports_zero_progress() {
        let now = Utc::now();
        assert_eq!(goal_progress(&goal(10, 0, None), now).percentage, Decimal::ZERO);
    }
}
