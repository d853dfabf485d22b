//! Chart data sets derived from ledger rows.
//!
//! Each chart is computed independently and dropped when its subset is empty,
//! so an all-credit ledger yields only the credit/debit comparison.

use chrono::{Datelike, NaiveDate};
use finbot_core::LedgerRow;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    SpendingByPayer,
    PaymentMethods,
    PurchasesByCategory,
    MonthlySpend,
    DailySpend,
    CreditVsDebit,
    CumulativeSpend,
}

impl ChartKind {
    /// Presentation order.
    pub const ALL: [ChartKind; 7] = [
        ChartKind::SpendingByPayer,
        ChartKind::PaymentMethods,
        ChartKind::PurchasesByCategory,
        ChartKind::MonthlySpend,
        ChartKind::DailySpend,
        ChartKind::CreditVsDebit,
        ChartKind::CumulativeSpend,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            ChartKind::SpendingByPayer => "spending_by_payer",
            ChartKind::PaymentMethods => "payment_methods",
            ChartKind::PurchasesByCategory => "purchases_by_category",
            ChartKind::MonthlySpend => "monthly_spend",
            ChartKind::DailySpend => "daily_spend",
            ChartKind::CreditVsDebit => "credit_vs_debit",
            ChartKind::CumulativeSpend => "cumulative_spend",
        }
    }

    /// Photo caption sent with the chart.
    pub fn caption(&self) -> &'static str {
        match self {
            ChartKind::SpendingByPayer => "👥 Gastos por Pessoa",
            ChartKind::PaymentMethods => "💳 Meios de Pagamento",
            ChartKind::PurchasesByCategory => "🏷️ Compras por Categoria",
            ChartKind::MonthlySpend => "📅 Total Gasto por Mês",
            ChartKind::DailySpend => "📈 Gastos por Dia",
            ChartKind::CreditVsDebit => "⚖️ Créditos vs Débitos",
            ChartKind::CumulativeSpend => "📊 Débitos Acumulados",
        }
    }

    /// Title drawn inside the image (no emoji, the bundled font lacks them).
    pub fn title(&self) -> &'static str {
        match self {
            ChartKind::SpendingByPayer => "Gastos por Pessoa (Débitos)",
            ChartKind::PaymentMethods => "Meio de Pagamento Mais Usado",
            ChartKind::PurchasesByCategory => "Número de Compras por Categoria",
            ChartKind::MonthlySpend => "Total Gasto por Mês",
            ChartKind::DailySpend => "Gastos por Dia",
            ChartKind::CreditVsDebit => "Comparação: Créditos vs Débitos",
            ChartKind::CumulativeSpend => "Débitos Acumulados por Data",
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.png", self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ChartData {
    /// Horizontal bars, ascending by value.
    Bars {
        items: Vec<(String, f64)>,
        axis: &'static str,
        money: bool,
    },
    /// Slices, descending by value.
    Pie { items: Vec<(String, f64)> },
    /// Vertical bars in chronological order.
    Columns { items: Vec<(String, f64)> },
    Line {
        points: Vec<(NaiveDate, f64)>,
        axis: &'static str,
        filled: bool,
    },
    Comparison { credits: f64, debits: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub kind: ChartKind,
    pub data: ChartData,
}

/// All non-empty charts, in [`ChartKind::ALL`] order.
pub fn build_charts(rows: &[LedgerRow]) -> Vec<Chart> {
    let debits: Vec<&LedgerRow> = rows.iter().filter(|r| r.is_debit()).collect();

    ChartKind::ALL
        .iter()
        .filter_map(|&kind| {
            let data = match kind {
                ChartKind::SpendingByPayer => spending_by_payer(&debits),
                ChartKind::PaymentMethods => payment_methods(&debits),
                ChartKind::PurchasesByCategory => purchases_by_category(&debits),
                ChartKind::MonthlySpend => monthly_spend(&debits),
                ChartKind::DailySpend => daily_spend(&debits),
                ChartKind::CreditVsDebit => credit_vs_debit(rows),
                ChartKind::CumulativeSpend => cumulative_spend(&debits),
            }?;
            Some(Chart { kind, data })
        })
        .collect()
}

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

/// Sorts ascending by value; equal values keep key order.
fn ascending<K: ToString>(map: BTreeMap<K, f64>) -> Vec<(String, f64)> {
    let mut items: Vec<(String, f64)> =
        map.into_iter().map(|(k, v)| (k.to_string(), v)).collect();
    items.sort_by(|a, b| a.1.total_cmp(&b.1));
    items
}

fn count_by<'a>(
    debits: &[&'a LedgerRow],
    key: impl Fn(&'a LedgerRow) -> &'a str,
) -> BTreeMap<&'a str, f64> {
    let mut counts = BTreeMap::new();
    for row in debits {
        *counts.entry(key(*row)).or_insert(0.0) += 1.0;
    }
    counts
}

fn daily_totals(debits: &[&LedgerRow]) -> BTreeMap<NaiveDate, Decimal> {
    let mut days: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for row in debits {
        *days.entry(row.date()).or_default() += row.debit();
    }
    days
}

fn spending_by_payer(debits: &[&LedgerRow]) -> Option<ChartData> {
    if debits.is_empty() {
        return None;
    }
    let mut by_payer: BTreeMap<&str, Decimal> = BTreeMap::new();
    for row in debits {
        *by_payer.entry(row.payer.as_str()).or_default() += row.debit();
    }
    let totals = by_payer.into_iter().map(|(k, v)| (k, to_f64(v))).collect();
    Some(ChartData::Bars {
        items: ascending(totals),
        axis: "Valor (R$)",
        money: true,
    })
}

fn payment_methods(debits: &[&LedgerRow]) -> Option<ChartData> {
    if debits.is_empty() {
        return None;
    }
    let mut items: Vec<(String, f64)> = count_by(debits, |r| r.payment_method.as_str())
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
    items.sort_by(|a, b| b.1.total_cmp(&a.1));
    Some(ChartData::Pie { items })
}

fn purchases_by_category(debits: &[&LedgerRow]) -> Option<ChartData> {
    if debits.is_empty() {
        return None;
    }
    Some(ChartData::Bars {
        items: ascending(count_by(debits, |r| r.category.as_str())),
        axis: "Número de Compras",
        money: false,
    })
}

fn monthly_spend(debits: &[&LedgerRow]) -> Option<ChartData> {
    if debits.is_empty() {
        return None;
    }
    let mut months: BTreeMap<(i32, u32), Decimal> = BTreeMap::new();
    for row in debits {
        let d = row.date();
        *months.entry((d.year(), d.month())).or_default() += row.debit();
    }
    let items = months
        .into_iter()
        .map(|((y, m), v)| (format!("{y:04}-{m:02}"), to_f64(v)))
        .collect();
    Some(ChartData::Columns { items })
}

fn daily_spend(debits: &[&LedgerRow]) -> Option<ChartData> {
    if debits.is_empty() {
        return None;
    }
    let points = daily_totals(debits)
        .into_iter()
        .map(|(d, v)| (d, to_f64(v)))
        .collect();
    Some(ChartData::Line {
        points,
        axis: "Valor (R$)",
        filled: false,
    })
}

fn credit_vs_debit(rows: &[LedgerRow]) -> Option<ChartData> {
    let credits: Decimal = rows.iter().map(LedgerRow::credit_value).sum();
    let debits: Decimal = rows.iter().map(LedgerRow::debit).sum();
    if credits.is_zero() && debits.is_zero() {
        return None;
    }
    Some(ChartData::Comparison {
        credits: to_f64(credits),
        debits: to_f64(debits),
    })
}

fn cumulative_spend(debits: &[&LedgerRow]) -> Option<ChartData> {
    if debits.is_empty() {
        return None;
    }
    let mut running = Decimal::ZERO;
    let points = daily_totals(debits)
        .into_iter()
        .map(|(d, v)| {
            running += v;
            (d, to_f64(running))
        })
        .collect();
    Some(ChartData::Line {
        points,
        axis: "Valor Acumulado (R$)",
        filled: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%d/%m/%Y %H:%M:%S").unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn debit(ts: &str, amount: &str, method: &str, category: &str, payer: &str) -> LedgerRow {
        LedgerRow {
            timestamp: at(ts),
            amount: Some(amount.parse().unwrap()),
            payment_method: method.into(),
            category: category.into(),
            description: "x".into(),
            payer: payer.into(),
            credit: None,
        }
    }

    fn sample() -> Vec<LedgerRow> {
        vec![
            debit("30/01/2026 10:00:00", "40", "pix", "mercado", "maria"),
            debit("01/02/2026 10:00:00", "100", "cartao", "mercado", "maria"),
            debit("01/02/2026 18:00:00", "25", "pix", "lazer", "joao"),
            debit("03/02/2026 12:00:00", "10", "pix", "mercado", "joao"),
            LedgerRow::from_credit(at("02/02/2026 09:00:00"), "500".parse().unwrap()),
        ]
    }

    fn find(charts: &[Chart], kind: ChartKind) -> &ChartData {
        &charts.iter().find(|c| c.kind == kind).unwrap().data
    }

    #[test]
    fn test_all_charts_in_order() {
        let charts = build_charts(&sample());
        let kinds: Vec<ChartKind> = charts.iter().map(|c| c.kind).collect();
        assert_eq!(kinds, ChartKind::ALL.to_vec());
    }

    #[test]
    fn test_spending_by_payer_ascending() {
        let charts = build_charts(&sample());
        let ChartData::Bars { items, money, .. } = find(&charts, ChartKind::SpendingByPayer) else {
            panic!("expected bars");
        };
        assert!(*money);
        assert_eq!(
            items,
            &vec![("joao".to_string(), 35.0), ("maria".to_string(), 140.0)]
        );
    }

    #[test]
    fn test_payment_methods_descending() {
        let charts = build_charts(&sample());
        let ChartData::Pie { items } = find(&charts, ChartKind::PaymentMethods) else {
            panic!("expected pie");
        };
        assert_eq!(
            items,
            &vec![("pix".to_string(), 3.0), ("cartao".to_string(), 1.0)]
        );
    }

    #[test]
    fn test_category_counts() {
        let charts = build_charts(&sample());
        let ChartData::Bars { items, money, .. } = find(&charts, ChartKind::PurchasesByCategory)
        else {
            panic!("expected bars");
        };
        assert!(!*money);
        assert_eq!(
            items,
            &vec![("lazer".to_string(), 1.0), ("mercado".to_string(), 3.0)]
        );
    }

    #[test]
    fn test_monthly_buckets() {
        let charts = build_charts(&sample());
        let ChartData::Columns { items } = find(&charts, ChartKind::MonthlySpend) else {
            panic!("expected columns");
        };
        assert_eq!(
            items,
            &vec![("2026-01".to_string(), 40.0), ("2026-02".to_string(), 135.0)]
        );
    }

    #[test]
    fn test_daily_and_cumulative() {
        let charts = build_charts(&sample());
        let ChartData::Line { points, filled, .. } = find(&charts, ChartKind::DailySpend) else {
            panic!("expected line");
        };
        assert!(!*filled);
        assert_eq!(
            points,
            &vec![
                (date(2026, 1, 30), 40.0),
                (date(2026, 2, 1), 125.0),
                (date(2026, 2, 3), 10.0),
            ]
        );

        let ChartData::Line { points, filled, .. } = find(&charts, ChartKind::CumulativeSpend)
        else {
            panic!("expected line");
        };
        assert!(*filled);
        let running: Vec<f64> = points.iter().map(|(_, v)| *v).collect();
        assert_eq!(running, vec![40.0, 165.0, 175.0]);
    }

    #[test]
    fn test_comparison_uses_all_rows() {
        let charts = build_charts(&sample());
        assert_eq!(
            find(&charts, ChartKind::CreditVsDebit),
            &ChartData::Comparison {
                credits: 500.0,
                debits: 175.0
            }
        );
    }

    #[test]
    fn test_credit_only_ledger() {
        let rows = vec![LedgerRow::from_credit(at("01/02/2026 09:00:00"), "80".parse().unwrap())];
        let charts = build_charts(&rows);
        assert_eq!(charts.len(), 1);
        assert_eq!(charts[0].kind, ChartKind::CreditVsDebit);
    }

    #[test]
    fn test_empty_ledger_has_no_charts() {
        assert!(build_charts(&[]).is_empty());
    }

    #[test]
    fn test_keys_and_captions() {
        assert_eq!(ChartKind::SpendingByPayer.key(), "spending_by_payer");
        assert_eq!(ChartKind::CreditVsDebit.caption(), "⚖️ Créditos vs Débitos");
        assert_eq!(ChartKind::MonthlySpend.file_name(), "monthly_spend.png");
    }
}
