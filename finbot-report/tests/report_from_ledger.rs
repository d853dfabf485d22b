use chrono::NaiveDateTime;
use finbot_core::{Expense, LedgerRow};
use finbot_report::{ChartKind, Report};
use rust_decimal::Decimal;

const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";

fn at(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%d/%m/%Y %H:%M:%S").unwrap()
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn family_ledger() -> Vec<LedgerRow> {
    vec![
        LedgerRow::from_expense(
            at("01/03/2026 10:30:00"),
            &Expense::new(dec("100"), "Cartão", "Mercado", "compras da semana", "Maria"),
        ),
        LedgerRow::from_expense(
            at("02/03/2026 19:00:00"),
            &Expense::new(dec("50"), "Pix", "Lazer", "cinema", "João"),
        ),
        LedgerRow::from_credit(at("05/03/2026 08:00:00"), dec("200")),
    ]
}

#[test]
fn test_summary_for_family_ledger() {
    let report = Report::from_rows(&family_ledger());
    let s = &report.summary;

    assert_eq!(s.total_credits, dec("200"));
    assert_eq!(s.total_debits, dec("150"));
    assert_eq!(s.balance, dec("50"));
    assert_eq!((s.transaction_count, s.credit_count, s.debit_count), (3, 1, 2));
    assert_eq!(s.top_spender, Some(("maria".to_string(), dec("100"))));

    let text = s.to_markdown();
    assert!(text.contains("R$ 200.00 (1 transações)"));
    assert!(text.contains("R$ 150.00 (2 transações)"));
    assert!(text.contains("*Saldo atual*: R$ 50.00"));
    assert!(text.contains("01/03/2026 a 05/03/2026"));
}

#[test]
fn test_full_chart_set_renders_to_png() {
    let report = Report::from_rows(&family_ledger());
    assert_eq!(report.charts.len(), ChartKind::ALL.len());

    let rendered = report.render().unwrap();
    assert_eq!(rendered.len(), 7);
    for chart in &rendered {
        assert!(chart.png.starts_with(PNG_MAGIC), "{} is not a PNG", chart.kind.key());
    }
    let keys: Vec<&str> = rendered.iter().map(|c| c.kind.key()).collect();
    assert_eq!(
        keys,
        vec![
            "spending_by_payer",
            "payment_methods",
            "purchases_by_category",
            "monthly_spend",
            "daily_spend",
            "credit_vs_debit",
            "cumulative_spend",
        ]
    );
}

#[test]
fn test_credit_only_ledger_skips_spending_charts() {
    let rows = vec![
        LedgerRow::from_credit(at("01/03/2026 08:00:00"), dec("1500")),
        LedgerRow::from_credit(at("15/03/2026 08:00:00"), dec("300")),
    ];
    let report = Report::from_rows(&rows);

    assert!(report.charts.iter().all(|c| c.kind != ChartKind::SpendingByPayer));
    assert_eq!(report.charts.len(), 1);

    let rendered = report.render().unwrap();
    assert_eq!(rendered[0].kind, ChartKind::CreditVsDebit);
    assert!(rendered[0].png.starts_with(PNG_MAGIC));
}

#[test]
fn test_overdrawn_balance_renders() {
    let rows = vec![
        LedgerRow::from_credit(at("01/03/2026 08:00:00"), dec("10")),
        LedgerRow::from_expense(
            at("01/03/2026 09:00:00"),
            &Expense::new(dec("250.75"), "Débito", "Casa", "conta de luz", "Ana"),
        ),
    ];
    let report = Report::from_rows(&rows);
    assert_eq!(report.summary.balance, dec("-240.75"));
    assert!(report.render().is_ok());
}

#[test]
fn test_empty_ledger() {
    let report = Report::from_rows(&[]);
    assert!(report.is_empty());
    assert!(report.charts.is_empty());
    assert!(report.render().unwrap().is_empty());
}

#[test]
fn test_chart_json_shape() {
    let report = Report::from_rows(&family_ledger());
    let value = serde_json::to_value(&report.charts[0]).unwrap();
    assert_eq!(value["kind"], "spending_by_payer");
    assert_eq!(value["data"]["shape"], "bars");
    assert_eq!(value["data"]["items"][0][0], "joão");
}
