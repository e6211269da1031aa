// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Aggregation over an in-memory transaction snapshot. Everything here is
//! recomputed from scratch on each call and never persisted.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::{Budget, Transaction, TransactionType};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DailyTotals {
    pub income: Decimal,
    pub expenses: Decimal,
}

impl DailyTotals {
    pub fn get(&self, kind: TransactionType) -> Decimal {
        match kind {
            TransactionType::Income => self.income,
            TransactionType::Expense => self.expenses,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub income_by_category: BTreeMap<String, Decimal>,
    pub expenses_by_category: BTreeMap<String, Decimal>,
    pub daily_data: BTreeMap<NaiveDate, DailyTotals>,
}

impl Statistics {
    pub fn balance(&self) -> Decimal {
        self.total_income - self.total_expenses
    }

    pub fn by_category(&self, kind: TransactionType) -> &BTreeMap<String, Decimal> {
        match kind {
            TransactionType::Income => &self.income_by_category,
            TransactionType::Expense => &self.expenses_by_category,
        }
    }
}

/// Single pass over `transactions`, counting only records dated within the
/// closed range `[start, end]`. Category names are used verbatim as keys.
pub fn compute_statistics(
    transactions: &[Transaction],
    start: NaiveDate,
    end: NaiveDate,
) -> Statistics {
    let mut stats = Statistics::default();
    for t in transactions {
        if t.date < start || t.date > end {
            continue;
        }
        let day = stats.daily_data.entry(t.date).or_default();
        match t.r#type {
            TransactionType::Income => {
                stats.total_income += t.amount;
                *stats
                    .income_by_category
                    .entry(t.category.clone())
                    .or_insert(Decimal::ZERO) += t.amount;
                day.income += t.amount;
            }
            TransactionType::Expense => {
                stats.total_expenses += t.amount;
                *stats
                    .expenses_by_category
                    .entry(t.category.clone())
                    .or_insert(Decimal::ZERO) += t.amount;
                day.expenses += t.amount;
            }
        }
    }
    stats
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryShare {
    pub category: String,
    pub amount: Decimal,
    pub percentage: Decimal,
}

/// Categories sorted by amount, largest first, each with its share of the
/// map's total. Shares are zero when the total is zero.
pub fn category_shares(by_category: &BTreeMap<String, Decimal>) -> Vec<CategoryShare> {
    let total: Decimal = by_category.values().copied().sum();
    let mut items: Vec<CategoryShare> = by_category
        .iter()
        .map(|(name, amount)| CategoryShare {
            category: name.clone(),
            amount: *amount,
            percentage: if total > Decimal::ZERO {
                *amount / total * Decimal::ONE_HUNDRED
            } else {
                Decimal::ZERO
            },
        })
        .collect();
    items.sort_by(|a, b| b.amount.cmp(&a.amount).then_with(|| a.category.cmp(&b.category)));
    items
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDetail {
    pub category: String,
    #[serde(rename = "type")]
    pub r#type: TransactionType,
    pub count: usize,
    pub total: Decimal,
    pub average: Decimal,
    pub trend: BTreeMap<NaiveDate, Decimal>,
}

/// Count, total, average and per-day trend for one category of one type.
pub fn category_detail(
    transactions: &[Transaction],
    category: &str,
    kind: TransactionType,
) -> CategoryDetail {
    let mut detail = CategoryDetail {
        category: category.to_string(),
        r#type: kind,
        count: 0,
        total: Decimal::ZERO,
        average: Decimal::ZERO,
        trend: BTreeMap::new(),
    };
    for t in transactions
        .iter()
        .filter(|t| t.r#type == kind && t.category == category)
    {
        detail.count += 1;
        detail.total += t.amount;
        *detail.trend.entry(t.date).or_insert(Decimal::ZERO) += t.amount;
    }
    if detail.count > 0 {
        detail.average = detail.total / Decimal::from(detail.count);
    }
    detail
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetProgress {
    pub month: String,
    pub budget: Decimal,
    pub savings_goal: Decimal,
    pub spent: Decimal,
    pub remaining: Decimal,
    pub percentage: Decimal,
    pub over_budget: bool,
}

impl BudgetProgress {
    /// `None` when no positive budget is set for the month.
    pub fn compute(budget: &Budget, spent: Decimal) -> Option<Self> {
        if budget.amount <= Decimal::ZERO {
            return None;
        }
        let percentage = spent / budget.amount * Decimal::ONE_HUNDRED;
        Some(BudgetProgress {
            month: budget.month.clone(),
            budget: budget.amount,
            savings_goal: budget.savings_goal,
            spent,
            remaining: budget.amount - spent,
            percentage,
            over_budget: percentage > Decimal::ONE_HUNDRED,
        })
    }

    /// Fill ratio for a progress bar, capped at 100.
    pub fn capped_percentage(&self) -> Decimal {
        self.percentage.min(Decimal::ONE_HUNDRED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn tx(id: i64, date: &str, kind: TransactionType, amount: &str, cat: &str) -> Transaction {
        Transaction {
            id,
            date: day(date),
            r#type: kind,
            amount: d(amount),
            category: cat.to_string(),
            note: None,
            created_at: Utc::now(),
        }
    }

    fn sample() -> Vec<Transaction> {
        use TransactionType::*;
        vec![
            tx(1, "2024-03-01", Income, "35000", "Salary"),
            tx(2, "2024-03-01", Expense, "85", "Dining"),
            tx(3, "2024-03-01", Expense, "55", "Drinks"),
            tx(4, "2024-03-02", Expense, "280", "Transport"),
            tx(5, "2024-03-02", Expense, "0.10", "Dining"),
            tx(6, "2024-03-02", Expense, "0.20", "Dining"),
            tx(7, "2024-03-31", Income, "500", "Bonus"),
            tx(8, "2024-04-01", Expense, "1200", "Utilities"),
            tx(9, "2024-02-29", Expense, "999", "Rent"),
        ]
    }

    #[test]
    fn totals_respect_closed_range() {
        let s = compute_statistics(&sample(), day("2024-03-01"), day("2024-03-31"));
        assert_eq!(s.total_income, d("35500"));
        assert_eq!(s.total_expenses, d("420.30"));
        assert_eq!(s.balance(), d("35079.70"));
        assert!(!s.daily_data.contains_key(&day("2024-04-01")));
        assert!(!s.daily_data.contains_key(&day("2024-02-29")));
    }

    #[test]
    fn category_maps_sum_to_totals() {
        let s = compute_statistics(&sample(), day("2024-01-01"), day("2024-12-31"));
        let inc: Decimal = s.income_by_category.values().copied().sum();
        let exp: Decimal = s.expenses_by_category.values().copied().sum();
        assert_eq!(inc, s.total_income);
        assert_eq!(exp, s.total_expenses);
        assert_eq!(s.expenses_by_category["Dining"], d("85.30"));
    }

    #[test]
    fn daily_buckets_hold_exactly_that_days_amounts() {
        let s = compute_statistics(&sample(), day("2024-03-01"), day("2024-03-31"));
        let first = s.daily_data[&day("2024-03-01")];
        assert_eq!(first.income, d("35000"));
        assert_eq!(first.expenses, d("140"));
        let second = s.daily_data[&day("2024-03-02")];
        assert_eq!(second.income + second.expenses, d("280.30"));
    }

    #[test]
    fn empty_input_gives_zeroes() {
        let s = compute_statistics(&[], day("2024-01-01"), day("2024-01-31"));
        assert_eq!(s, Statistics::default());
        assert!(category_shares(&s.expenses_by_category).is_empty());
    }

    #[test]
    fn category_names_are_not_normalized() {
        use TransactionType::*;
        let txs = vec![
            tx(1, "2024-01-01", Expense, "1", "food"),
            tx(2, "2024-01-01", Expense, "2", "Food"),
        ];
        let s = compute_statistics(&txs, day("2024-01-01"), day("2024-01-01"));
        assert_eq!(s.expenses_by_category.len(), 2);
    }

    #[test]
    fn shares_are_sorted_and_sum_to_hundred() {
        let s = compute_statistics(&sample(), day("2024-03-01"), day("2024-03-31"));
        let shares = category_shares(&s.expenses_by_category);
        assert_eq!(shares[0].category, "Transport");
        assert_eq!(shares.last().unwrap().category, "Drinks");
        let total: Decimal = shares.iter().map(|c| c.percentage).sum();
        assert_eq!(total.round_dp(6), d("100"));
    }

    #[test]
    fn detail_counts_and_averages() {
        let detail = category_detail(&sample(), "Dining", TransactionType::Expense);
        assert_eq!(detail.count, 3);
        assert_eq!(detail.total, d("85.30"));
        assert_eq!(detail.average.round_dp(2), d("28.43"));
        assert_eq!(detail.trend.len(), 2);

        let none = category_detail(&sample(), "Dining", TransactionType::Income);
        assert_eq!(none.count, 0);
        assert!(none.average.is_zero());
    }

    #[test]
    fn budget_progress_flags_overspend() {
        let budget = Budget {
            month: "2024-03".into(),
            amount: d("400"),
            savings_goal: d("50"),
        };
        let p = BudgetProgress::compute(&budget, d("420.30")).unwrap();
        assert!(p.over_budget);
        assert_eq!(p.remaining, d("-20.30"));
        assert_eq!(p.capped_percentage(), d("100"));

        let p = BudgetProgress::compute(&budget, d("100")).unwrap();
        assert!(!p.over_budget);
        assert_eq!(p.percentage, d("25"));

        assert!(BudgetProgress::compute(&Budget::empty("2024-03"), d("1")).is_none());
    }
}
