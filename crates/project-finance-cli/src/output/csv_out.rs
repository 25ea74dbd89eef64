use serde_json::Value;
use std::io;

/// Write the merged per-period table as CSV to stdout: one row per period
/// joining the unlevered statement with debt service and levered figures.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let cash_flows = value
        .pointer("/result/cash_flows")
        .and_then(Value::as_array);
    let levered = value.pointer("/result/levered").and_then(Value::as_array);

    match (cash_flows, levered) {
        (Some(cash_flows), Some(levered)) => {
            let _ = wtr.write_record([
                "period",
                "revenue",
                "capex",
                "opex",
                "nopat",
                "fcf",
                "terminal_value",
                "total_payment",
                "dscr",
                "levered_fcf",
            ]);
            for (cf, lev) in cash_flows.iter().zip(levered) {
                let _ = wtr.write_record([
                    field(cf, "period"),
                    field(cf, "revenue"),
                    field(cf, "capex"),
                    field(cf, "opex"),
                    field(cf, "nopat"),
                    field(cf, "fcf"),
                    field(cf, "terminal_value"),
                    field(lev, "total_payment"),
                    field(lev, "dscr"),
                    field(lev, "levered_fcf"),
                ]);
            }
        }
        _ => {
            // Not a model envelope: fall back to field,value pairs
            if let Value::Object(map) = value {
                let _ = wtr.write_record(["field", "value"]);
                for (key, val) in map {
                    let _ = wtr.write_record([key.as_str(), &format_csv_value(val)]);
                }
            }
        }
    }

    let _ = wtr.flush();
}

fn field(row: &Value, key: &str) -> String {
    row.get(key).map(format_csv_value).unwrap_or_default()
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}
