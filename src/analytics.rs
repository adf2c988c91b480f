//! Expense aggregation for the analytics endpoint.
//!
//! Provides a single-pass rollup over a set of expense records: the overall
//! total, per-category sums, and time-bucketed sums by day, week, and month.
//! All arithmetic uses [Decimal] so that amounts never pass through binary
//! floats.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, Days, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::Expense;

/// The total amount spent within one time bucket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// The first day of the bucket: the day itself, the Monday of the week,
    /// or the first of the month.
    pub date: NaiveDate,
    /// The sum of the amounts of the expenses that fall in the bucket.
    pub total: Decimal,
}

/// The aggregated view of a set of expense records.
///
/// Produced by [summarize_expenses] and serialized as the body of the
/// analytics endpoint's response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseSummary {
    /// The sum of the amounts of all input records; zero for no records.
    #[serde(rename = "total_expense")]
    pub total: Decimal,
    /// The sum of amounts per category. Categories with no records are
    /// omitted; keys iterate in sorted order.
    pub category_breakdown: BTreeMap<String, Decimal>,
    /// Per-day totals, ascending by day.
    pub daily_trends: Vec<TrendPoint>,
    /// Per-week totals, ascending by the Monday that starts each week.
    pub weekly_trends: Vec<TrendPoint>,
    /// Per-month totals, ascending by the first of each month.
    pub monthly_trends: Vec<TrendPoint>,
}

/// The Monday of the ISO week containing `date`.
///
/// The week convention is fixed here: weeks start on Monday.
fn week_start(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.weekday().num_days_from_monday()))
}

/// The first day of the calendar month containing `date`.
fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap()
}

/// Aggregate `expenses` into a total, a category breakdown, and daily,
/// weekly, and monthly trends.
///
/// The caller is responsible for owner and date-range filtering; every record
/// passed in is counted. An empty slice yields a zero total and empty
/// collections rather than an error. Only buckets containing at least one
/// record appear in the trends; gaps are not zero-filled.
pub fn summarize_expenses(expenses: &[Expense]) -> ExpenseSummary {
    let mut total = Decimal::ZERO;
    let mut category_breakdown: BTreeMap<String, Decimal> = BTreeMap::new();
    let mut daily_totals: HashMap<NaiveDate, Decimal> = HashMap::new();
    let mut weekly_totals: HashMap<NaiveDate, Decimal> = HashMap::new();
    let mut monthly_totals: HashMap<NaiveDate, Decimal> = HashMap::new();

    for expense in expenses {
        let amount = expense.amount();
        let date = expense.date();

        total += amount;
        *category_breakdown
            .entry(expense.category().as_str().to_owned())
            .or_insert(Decimal::ZERO) += amount;
        *daily_totals.entry(date).or_insert(Decimal::ZERO) += amount;
        *weekly_totals.entry(week_start(date)).or_insert(Decimal::ZERO) += amount;
        *monthly_totals.entry(month_start(date)).or_insert(Decimal::ZERO) += amount;
    }

    ExpenseSummary {
        total,
        category_breakdown,
        daily_trends: into_sorted_trends(daily_totals),
        weekly_trends: into_sorted_trends(weekly_totals),
        monthly_trends: into_sorted_trends(monthly_totals),
    }
}

/// Convert bucketed totals into a list of trend points, ascending by bucket
/// start date.
fn into_sorted_trends(totals: HashMap<NaiveDate, Decimal>) -> Vec<TrendPoint> {
    let mut trends: Vec<TrendPoint> = totals
        .into_iter()
        .map(|(date, total)| TrendPoint { date, total })
        .collect();

    trends.sort_by_key(|point| point.date);
    trends
}
