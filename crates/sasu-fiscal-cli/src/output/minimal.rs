use serde_json::Value;

/// Key answers, by result shape, as (label, JSON pointer) pairs.
const KEY_ANSWERS: [&[(&str, &str)]; 2] = [
    &[
        ("salary", "/optimal/salary"),
        ("dividend", "/optimal/dividend"),
        ("personal_net", "/optimal/personal_net"),
    ],
    &[
        ("personal_net", "/synthesis/personal_net_total"),
        ("levies", "/synthesis/aggregate_levies"),
        ("levy_ratio", "/synthesis/overall_levy_ratio"),
    ],
];

/// Print just the key answer values from the output.
///
/// The first answer group whose fields exist in the result wins; otherwise
/// the first field of the result object is printed.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    for group in KEY_ANSWERS {
        let found: Vec<String> = group
            .iter()
            .filter_map(|(label, pointer)| {
                result_obj
                    .pointer(pointer)
                    .filter(|v| !v.is_null())
                    .map(|v| format!("{}: {}", label, format_minimal(v)))
            })
            .collect();
        if !found.is_empty() {
            println!("{}", found.join("  "));
            return;
        }
    }

    if let Value::Object(map) = result_obj {
        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    println!("{}", format_minimal(result_obj));
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
