/// Schema-less probing of scraped page data
///
/// Program pages embed their data as a large, loosely shaped JSON tree whose
/// exact layout shifts between page revisions. These helpers walk the tree
/// and probe candidate keys, returning `Option`/empty collections instead of
/// assuming any schema.
use serde_json::Value;

/// Descends through nested objects along a key path
pub fn pluck<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut current = root;
    for key in path {
        current = current.get(key)?;
    }
    Some(current)
}

/// Free text of a node: a plain string, or the first of the given keys on an
/// object whose value is a non-empty string
pub fn text_of(node: &Value, keys: &[&str]) -> Option<String> {
    match node {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Object(map) => keys.iter().find_map(|key| {
            map.get(*key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        }),
        _ => None,
    }
}

/// First sufficiently long string found under any of the candidate keys
pub fn first_string(node: &Value, keys: &[&str], min_len: usize) -> Option<String> {
    let map = node.as_object()?;
    keys.iter().find_map(|key| {
        map.get(*key)
            .and_then(Value::as_str)
            .filter(|s| s.chars().count() > min_len)
            .map(str::to_string)
    })
}

/// Collects text items from the first present candidate key holding an array
///
/// Array elements may be plain strings or objects carrying `text`, `name`, or
/// `title`; entries outside the length bounds are dropped. Returns at most
/// `cap` items.
pub fn string_items(
    node: &Value,
    keys: &[&str],
    min_len: usize,
    max_len: usize,
    cap: usize,
) -> Vec<String> {
    let Some(map) = node.as_object() else {
        return Vec::new();
    };

    for key in keys {
        let Some(items) = map.get(*key).and_then(Value::as_array) else {
            continue;
        };

        let collected: Vec<String> = items
            .iter()
            .filter_map(|item| text_of(item, &["text", "name", "title"]))
            .filter(|s| {
                let len = s.chars().count();
                len > min_len && len < max_len
            })
            .take(cap)
            .collect();

        if !collected.is_empty() {
            return collected;
        }
    }

    Vec::new()
}
