use serde_json::Value;
use tabled::{builder::Builder, Table};

const CASH_FLOW_COLUMNS: &[&str] = &[
    "period",
    "revenue",
    "capex",
    "opex",
    "ebit",
    "tax",
    "nopat",
    "fcf",
    "terminal_value",
];

const TRANCHE_COLUMNS: &[&str] = &["period", "balance", "interest", "principal", "payment"];

const LEVERED_COLUMNS: &[&str] = &["period", "fcf", "total_payment", "dscr", "levered_fcf"];

const SUMMARY_FIELDS: &[&str] = &[
    "unlevered_npv",
    "unlevered_irr",
    "equity_irr",
    "total_equity_outlay",
];

/// Render the model output as a set of per-period tables plus the
/// valuation summary.
pub fn print_tables(value: &Value) {
    let Some(result) = value.get("result") else {
        print_flat_object(value);
        return;
    };

    if let Some(Value::Array(rows)) = result.get("cash_flows") {
        println!("Unlevered cash flows");
        print_rows(rows, CASH_FLOW_COLUMNS);
    }

    if let Some(Value::Array(tranches)) = result.pointer("/debt/tranches") {
        for tranche in tranches {
            let name = tranche
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or("tranche");
            if let Some(Value::Array(rows)) = tranche.get("rows") {
                println!("\nDebt schedule — {}", name);
                print_rows(rows, TRANCHE_COLUMNS);
            }
        }
    }

    if let Some(Value::Array(rows)) = result.get("levered") {
        println!("\nDebt service coverage and levered cash flows");
        print_rows(rows, LEVERED_COLUMNS);
    }

    let mut builder = Builder::default();
    builder.push_record(["Metric", "Value"]);
    if let Value::Object(map) = result {
        for field in SUMMARY_FIELDS {
            if let Some(val) = map.get(*field) {
                builder.push_record([*field, &format_value(val)]);
            }
        }
    }
    println!("\nValuation summary");
    println!("{}", Table::from(builder));

    if let Some(Value::Array(warnings)) = value.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = value.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

/// Print an array of objects as one table with a fixed column order.
fn print_rows(rows: &[Value], columns: &[&str]) {
    let mut builder = Builder::default();
    builder.push_record(columns.iter().copied());
    for row in rows {
        if let Value::Object(map) = row {
            let record: Vec<String> = columns
                .iter()
                .map(|c| {
                    map.get(*c)
                        .map(format_value)
                        .unwrap_or_else(|| "—".to_string())
                })
                .collect();
            builder.push_record(record);
        }
    }
    println!("{}", Table::from(builder));
}

fn print_flat_object(value: &Value) {
    if let Value::Object(map) = value {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (key, val) in map {
            builder.push_record([key.as_str(), &format_value(val)]);
        }
        println!("{}", Table::from(builder));
    } else {
        println!("{}", value);
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        // DSCR sentinel and absent terminal values render as a dash
        Value::Null => "—".to_string(),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}
