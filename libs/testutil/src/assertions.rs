use serde_json::Value;

/// JSON-pointer-like paths of every `null` found in the value.
pub fn null_paths(value: &Value) -> Vec<String> {
    let mut found = Vec::new();
    let mut stack = vec![(String::new(), value)];
    while let Some((path, current)) = stack.pop() {
        match current {
            Value::Null => found.push(if path.is_empty() { "/".into() } else { path }),
            Value::Array(items) => {
                for (index, item) in items.iter().enumerate() {
                    stack.push((format!("{path}/{index}"), item));
                }
            }
            Value::Object(map) => {
                for (key, item) in map {
                    stack.push((format!("{path}/{key}"), item));
                }
            }
            _ => {}
        }
    }
    found.sort();
    found
}

/// Asserts that rendered wire JSON never carries a `null`.
pub fn assert_no_nulls(value: &Value) {
    let nulls = null_paths(value);
    assert!(
        nulls.is_empty(),
        "expected no null values, found at {nulls:?} in payload: {value}"
    );
}

/// Wire names of the outputs in a rendered skill response, in order.
pub fn output_names(response: &Value) -> Vec<String> {
    response
        .pointer("/template/outputs")
        .and_then(Value::as_array)
        .map(|outputs| {
            outputs
                .iter()
                .filter_map(Value::as_object)
                .flat_map(|output| output.keys().cloned())
                .collect()
        })
        .unwrap_or_default()
}

/// Asserts that a rendered skill response contains an output with the given wire name.
pub fn assert_has_output(response: &Value, name: &str) {
    let names = output_names(response);
    assert!(
        names.iter().any(|candidate| candidate == name),
        "expected output `{name}`, found {names:?} in payload: {response}"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn finds_nested_nulls() {
        let value = json!({"a": [1, null], "b": {"c": null}, "d": "x"});
        assert_eq!(null_paths(&value), ["/a/1", "/b/c"]);
        assert!(null_paths(&json!({"a": [1]})).is_empty());
    }

    #[test]
    fn lists_output_names() {
        let response = json!({
            "version": "2.0",
            "template": {"outputs": [{"simpleText": {"text": "hi"}}, {"carousel": {}}]}
        });
        assert_eq!(output_names(&response), ["simpleText", "carousel"]);
        assert_has_output(&response, "carousel");
        assert!(output_names(&json!({"version": "2.0"})).is_empty());
    }
}
