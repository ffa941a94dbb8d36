//! Query string serialization.
//!
//! Wire format:
//! - constraints: `filters[<name>][]=<value>`, always bracketed, once per
//!   element when the value is an array
//! - scalar variables: `<name>=<value>`
//! - array variables: `<name>[]=<value>` once per element
//! - object variables: `<name>[<key>]=<value>` once per entry
//!
//! Filter names, object keys and every value are percent-encoded as URL
//! components. The first segment is prefixed with `?`, the rest with `&`.

use serde_json::Value;

use super::{Constraints, Variables};

/// Name of the query parameter that carries filter constraints.
pub const FILTERS: &str = "filters";

/// Serializes constraints then variables, both in insertion order.
#[must_use]
pub fn to_query_string(constraints: &Constraints, variables: &Variables) -> String {
    let mut writer = QueryStringWriter::default();

    for constraint in constraints.iter() {
        let key = format!("{FILTERS}[{}][]", encode(&constraint.filter));
        match &constraint.value {
            Value::Array(elements) => {
                for element in elements {
                    writer.push(&key, element);
                }
            }
            value => writer.push(&key, value),
        }
    }

    for variable in variables.iter() {
        match &variable.value {
            Value::Array(elements) => {
                let key = format!("{}[]", variable.name);
                for element in elements {
                    writer.push(&key, element);
                }
            }
            Value::Object(entries) => {
                for (entry_key, entry_value) in entries {
                    writer.push(
                        &format!("{}[{}]", variable.name, encode(entry_key)),
                        entry_value,
                    );
                }
            }
            scalar => writer.push(&variable.name, scalar),
        }
    }

    writer.finish()
}

/// Percent-encodes a URL component.
#[must_use]
pub fn encode(component: &str) -> String {
    urlencoding::encode(component).into_owned()
}

/// Renders a JSON value the way it appears on the wire before encoding.
#[must_use]
pub fn render(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Default)]
struct QueryStringWriter {
    out: String,
}

impl QueryStringWriter {
    fn push(&mut self, key: &str, value: &Value) {
        self.out.push(if self.out.is_empty() { '?' } else { '&' });
        self.out.push_str(key);
        self.out.push('=');
        self.out.push_str(&encode(&render(value)));
    }

    fn finish(self) -> String {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_empty_is_empty_string() {
        assert_eq!(to_query_string(&Constraints::new(), &Variables::new()), "");
    }

    #[test]
    fn test_constraints_are_bracketed() {
        let mut constraints = Constraints::new();
        constraints.upsert("user id", 5);
        constraints.upsert("name", "a&b");

        assert_eq!(
            to_query_string(&constraints, &Variables::new()),
            "?filters[user%20id][]=5&filters[name][]=a%26b"
        );
    }

    #[test]
    fn test_array_constraint_repeats_filter() {
        let mut constraints = Constraints::new();
        constraints.upsert("ids", json!([1, 2]));
        constraints.upsert("tags", json!([]));
        constraints.upsert("status", "open");

        assert_eq!(
            to_query_string(&constraints, &Variables::new()),
            "?filters[ids][]=1&filters[ids][]=2&filters[status][]=open"
        );
    }

    #[test]
    fn test_variable_shapes() {
        let mut variables = Variables::new();
        variables.set("ids", json!([1, 2]));
        variables.set("order", json!({"created at": "desc"}));
        variables.set("flag", true);
        variables.set("empty", Value::Null);

        assert_eq!(
            to_query_string(&Constraints::new(), &variables),
            "?ids[]=1&ids[]=2&order[created%20at]=desc&flag=true&empty="
        );
    }

    #[test]
    fn test_slash_is_encoded() {
        let mut variables = Variables::new();
        variables.set("mock", "a/b");
        assert_eq!(to_query_string(&Constraints::new(), &variables), "?mock=a%2Fb");
    }

    #[test]
    fn test_render_scalars() {
        assert_eq!(render(&json!("text")), "text");
        assert_eq!(render(&json!(1.5)), "1.5");
        assert_eq!(render(&Value::Null), "");
    }
}
