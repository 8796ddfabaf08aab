use imf_dots::stats::{GroupKey, grouped_summary};
use imf_dots::table::{TradeRow, WideTable};
use imf_dots::{TradeTable, Variable};

fn row(period: &str, cp: &str, x: f64, m: f64) -> TradeRow {
    TradeRow {
        period: period.into(),
        country: "GR".into(),
        counterpart: cp.into(),
        exports: x,
        imports: m,
        trade_balance: x - m,
        twoway_trade: x + m,
    }
}

fn rows() -> Vec<TradeRow> {
    vec![
        row("2000", "AU", 1.0, 0.0),
        row("2001", "AU", 2.0, 0.0),
        row("2002", "AU", 3.0, 0.0),
        row("2003", "AU", 4.0, 0.0),
        row("2001", "US", 10.0, 5.0),
        row("2002", "US", 30.0, 5.0),
        row("2003", "US", 20.0, 5.0),
    ]
}

fn find<'a>(got: &'a [imf_dots::Summary], cp: &str, variable: Variable) -> &'a imf_dots::Summary {
    let key = GroupKey {
        counterpart: cp.into(),
        variable,
    };
    got.iter().find(|s| s.key == key).expect("group present")
}

#[test]
fn long_table_median_even_and_odd() {
    let got = grouped_summary(&TradeTable::Long(rows()));
    assert_eq!(got.len(), 8);

    let au = find(&got, "AU", Variable::Exports);
    assert_eq!(au.count, 4);
    assert_eq!(au.median, Some(2.5));
    assert_eq!(au.mean, Some(2.5));

    let us = find(&got, "US", Variable::Exports);
    assert_eq!(us.count, 3);
    assert_eq!(us.min, Some(10.0));
    assert_eq!(us.max, Some(30.0));
    assert_eq!(us.median, Some(20.0));

    let us_tb = find(&got, "US", Variable::TradeBalance);
    assert_eq!(us_tb.median, Some(15.0));
}

#[test]
fn wide_table_skips_gaps() {
    let table = TradeTable::Wide(WideTable::pivot("GR", &rows()).unwrap());
    let long = grouped_summary(&TradeTable::Long(rows()));
    let wide = grouped_summary(&table);
    assert_eq!(long, wide);
    assert_eq!(find(&wide, "US", Variable::Imports).count, 3);
}

#[test]
fn empty_table_has_no_groups() {
    assert!(grouped_summary(&TradeTable::Long(Vec::new())).is_empty());
}
