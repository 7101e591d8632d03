//! Pure functions that aggregate transactions for the dashboard.

use std::collections::BTreeMap;

use time::Date;

use crate::{
    category::icon_for,
    transaction::{Transaction, TransactionKind},
};

/// The headline totals shown at the top of the dashboard.
#[derive(Debug, Default, PartialEq)]
pub(super) struct TransactionSummary {
    /// The sum of all income amounts.
    pub total_income: f64,
    /// The sum of all expense amounts, as a positive number.
    pub total_spent: f64,
    /// Income minus spending.
    pub balance: f64,
}

pub(super) fn summarize(transactions: &[Transaction]) -> TransactionSummary {
    let mut summary = TransactionSummary::default();

    for transaction in transactions {
        match transaction.kind {
            TransactionKind::Income => summary.total_income += transaction.amount,
            TransactionKind::Expense => summary.total_spent += transaction.amount,
        }
    }

    summary.balance = summary.total_income - summary.total_spent;

    summary
}

/// Sum expense amounts per category, largest total first.
pub(super) fn expense_totals_by_category(transactions: &[Transaction]) -> Vec<(String, f64)> {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();

    for transaction in transactions {
        if transaction.kind == TransactionKind::Expense {
            *totals.entry(transaction.category.as_str()).or_default() += transaction.amount;
        }
    }

    let mut totals: Vec<(String, f64)> = totals
        .into_iter()
        .map(|(category, total)| (category.to_string(), total))
        .collect();
    totals.sort_by(|a, b| b.1.total_cmp(&a.1));

    totals
}

/// The cumulative balance at the end of each day that has a transaction,
/// in ascending date order.
pub(super) fn balance_series(transactions: &[Transaction]) -> Vec<(Date, f64)> {
    let mut daily_totals: BTreeMap<Date, f64> = BTreeMap::new();

    for transaction in transactions {
        let signed_amount = match transaction.kind {
            TransactionKind::Income => transaction.amount,
            TransactionKind::Expense => -transaction.amount,
        };

        *daily_totals.entry(transaction.date).or_default() += signed_amount;
    }

    let mut balance = 0.0;

    daily_totals
        .into_iter()
        .map(|(date, total)| {
            balance += total;
            (date, balance)
        })
        .collect()
}

/// How heavily a budget is used, for color coding the utilization table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Band {
    /// Less than 70% of the limit spent.
    Low,
    /// 70% to 89% of the limit spent.
    Medium,
    /// 90% or more of the limit spent.
    High,
}

/// One row of the budget utilization table.
#[derive(Debug, PartialEq)]
pub(super) struct BudgetStatus {
    pub category: String,
    pub icon: &'static str,
    pub spent: f64,
    pub limit: f64,
    /// Percent of the limit spent, rounded to one decimal place and capped
    /// at 100 so the progress bar never overflows.
    pub percent: f64,
    pub band: Band,
}

pub(super) fn budget_status(category: String, spent: f64, limit: f64) -> BudgetStatus {
    let percent = if limit <= 0.0 {
        0.0
    } else {
        let raw = spent / limit * 100.0;
        ((raw * 10.0).round() / 10.0).min(100.0)
    };

    let band = if percent >= 90.0 {
        Band::High
    } else if percent >= 70.0 {
        Band::Medium
    } else {
        Band::Low
    };

    BudgetStatus {
        icon: icon_for(&category),
        category,
        spent,
        limit,
        percent,
        band,
    }
}
