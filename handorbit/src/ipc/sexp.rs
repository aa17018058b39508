//! Plist access and response formatting for s-expression messages.

use lexpr::Value;

pub fn ok_response(id: i64) -> String {
    format!("(:type :response :id {} :status :ok)", id)
}

pub fn error_response(id: i64, reason: &str) -> String {
    format!(
        "(:type :response :id {} :status :error :reason \"{}\")",
        id,
        escape_string(reason)
    )
}

/// Escape a string for s-expression output.
pub fn escape_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Find the value following `:key` in a plist.
/// Handles both `Value::Keyword("key")` (elisp parser) and
/// `Value::Symbol(":key")` (default parser) forms.
pub fn get_value<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    let prefixed = format!(":{}", key);
    let mut current = value;
    while let Value::Cons(pair) = current {
        let is_key = match pair.car() {
            Value::Keyword(k) => k.as_ref() == key,
            Value::Symbol(s) => s.as_ref() == prefixed,
            _ => false,
        };
        if is_key {
            return match pair.cdr() {
                Value::Cons(next) => Some(next.car()),
                _ => None,
            };
        }
        current = pair.cdr();
    }
    None
}

/// Extract a plist value rendered as a string; keywords lose their colon.
pub fn get_keyword(value: &Value, key: &str) -> Option<String> {
    let val = get_value(value, key)?;
    Some(match val {
        Value::Keyword(v) => v.to_string(),
        Value::Symbol(v) => {
            let s = v.to_string();
            s.strip_prefix(':').unwrap_or(&s).to_string()
        }
        Value::String(v) => v.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => if *b { "t" } else { "nil" }.to_string(),
        Value::Null | Value::Nil => "nil".to_string(),
        _ => val.to_string(),
    })
}

pub fn get_int(value: &Value, key: &str) -> Option<i64> {
    get_keyword(value, key).and_then(|s| s.parse().ok())
}

pub fn get_float(value: &Value, key: &str) -> Option<f64> {
    get_keyword(value, key).and_then(|s| s.parse().ok())
}

/// True for `()`, `nil` and the elisp nil value.
pub fn is_nil(value: &Value) -> bool {
    match value {
        Value::Null | Value::Nil => true,
        Value::Symbol(s) => s.as_ref() == "nil",
        _ => false,
    }
}

/// Top-level elements of a proper list; `None` for anything else.
pub fn list_items(value: &Value) -> Option<Vec<&Value>> {
    if is_nil(value) {
        return Some(Vec::new());
    }
    let mut items = Vec::new();
    let mut current = value;
    loop {
        match current {
            Value::Cons(pair) => {
                items.push(pair.car());
                current = pair.cdr();
            }
            Value::Null | Value::Nil => return Some(items),
            _ => return None,
        }
    }
}

/// Flatten a possibly nested list into its leaf values.
pub fn flatten_list(value: &Value) -> Vec<&Value> {
    let mut result = Vec::new();
    fn walk<'a>(v: &'a Value, out: &mut Vec<&'a Value>) {
        match v {
            Value::Cons(pair) => {
                walk(pair.car(), out);
                walk(pair.cdr(), out);
            }
            Value::Null => {}
            other => out.push(other),
        }
    }
    walk(value, &mut result);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_format() {
        let r = error_response(7, "bad input");
        assert!(r.contains(":id 7"));
        assert!(r.contains(":status :error"));
        assert!(r.contains(":reason \"bad input\""));
    }

    #[test]
    fn test_error_response_escapes_quotes() {
        let r = error_response(1, "say \"hello\"");
        assert!(r.contains("say \\\"hello\\\""));
    }

    #[test]
    fn test_escape_string_backslash() {
        assert_eq!(escape_string("a\\b"), "a\\\\b");
    }

    #[test]
    fn test_get_keyword_from_plist() {
        let v = lexpr::from_str("(:type :frame :t 16.5)").unwrap();
        assert_eq!(get_keyword(&v, "type"), Some("frame".to_string()));
        assert_eq!(get_float(&v, "t"), Some(16.5));
        assert_eq!(get_keyword(&v, "hands"), None);
    }

    #[test]
    fn test_get_keyword_trailing_key() {
        let v = lexpr::from_str("(:type :frame :t)").unwrap();
        assert_eq!(get_keyword(&v, "t"), None);
    }

    #[test]
    fn test_get_int_and_float() {
        let v = lexpr::from_str("(:id -3 :gain 2.5 :name foo)").unwrap();
        assert_eq!(get_int(&v, "id"), Some(-3));
        assert_eq!(get_float(&v, "gain"), Some(2.5));
        assert_eq!(get_int(&v, "name"), None);
    }

    #[test]
    fn test_get_value_returns_list() {
        let v = lexpr::from_str("(:hands ((1 2) (3 4)))").unwrap();
        let hands = get_value(&v, "hands").unwrap();
        assert_eq!(list_items(hands).map(|h| h.len()), Some(2));
    }

    #[test]
    fn test_list_items_empty_and_improper() {
        assert_eq!(list_items(&lexpr::from_str("()").unwrap()).map(|h| h.len()), Some(0));
        assert_eq!(list_items(&lexpr::from_str("nil").unwrap()).map(|h| h.len()), Some(0));
        assert!(list_items(&lexpr::from_str("(1 . 2)").unwrap()).is_none());
        assert!(list_items(&lexpr::from_str("42").unwrap()).is_none());
    }

    #[test]
    fn test_flatten_nested() {
        let v = lexpr::from_str("((1 2 3) (4 5 6))").unwrap();
        assert_eq!(flatten_list(&v).len(), 6);
    }

    #[test]
    fn test_ok_response_parseable_fields() {
        let r = ok_response(99);
        let v = lexpr::from_str(&r).unwrap();
        assert_eq!(get_keyword(&v, "type"), Some("response".to_string()));
        assert_eq!(get_int(&v, "id"), Some(99));
        assert_eq!(get_keyword(&v, "status"), Some("ok".to_string()));
    }
}
