use crate::core::dataset::{DatasetError, Sample};
use serde_json::Value;

/// `item.sub.key` addressing: `item` names a sample item, everything after
/// the first dot is looked up inside that item's metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldPath {
    pub item: String,
    pub subkey: Option<String>,
}

impl FieldPath {
    pub fn parse(path: &str) -> Self {
        match path.split_once('.') {
            Some((item, sub)) => Self {
                item: item.to_string(),
                subkey: Some(sub.to_string()),
            },
            None => Self {
                item: path.to_string(),
                subkey: None,
            },
        }
    }

    pub fn is_nested(&self) -> bool {
        self.subkey.is_some()
    }

    pub fn resolve(&self, sample: &Sample) -> Result<Value, DatasetError> {
        let item = sample
            .get(&self.item)
            .ok_or_else(|| DatasetError::MissingField(self.to_string()))?;
        if !item.is_metadata() {
            return Err(DatasetError::NotMetadata {
                key: self.item.clone(),
            });
        }
        let value = item.metadata()?;
        match &self.subkey {
            None => Ok(value),
            Some(sub) => lookup(&value, sub)
                .cloned()
                .ok_or_else(|| DatasetError::MissingField(self.to_string())),
        }
    }
}

impl std::fmt::Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.subkey {
            Some(sub) => write!(f, "{}.{}", self.item, sub),
            None => f.write_str(&self.item),
        }
    }
}

/// Literal key first, then a walk over dot-separated segments.
pub fn lookup<'a>(value: &'a Value, subkey: &str) -> Option<&'a Value> {
    if let Some(v) = value.get(subkey) {
        return Some(v);
    }
    subkey.split('.').try_fold(value, |cur, seg| match cur {
        Value::Array(items) => seg.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => cur.get(seg),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_splits_on_first_dot() {
        let p = FieldPath::parse("metadata.label");
        assert_eq!(p.item, "metadata");
        assert_eq!(p.subkey.as_deref(), Some("label"));
        assert!(p.is_nested());

        let p = FieldPath::parse("metadata.a.b");
        assert_eq!(p.subkey.as_deref(), Some("a.b"));
        assert_eq!(p.to_string(), "metadata.a.b");

        let p = FieldPath::parse("label");
        assert!(!p.is_nested());
        assert_eq!(p.to_string(), "label");
    }

    #[test]
    fn lookup_prefers_literal_keys() {
        let v = json!({"a.b": 1, "a": {"b": 2}});
        assert_eq!(lookup(&v, "a.b"), Some(&json!(1)));
        let v = json!({"a": {"b": 2, "c": [10, 20]}});
        assert_eq!(lookup(&v, "a.b"), Some(&json!(2)));
        assert_eq!(lookup(&v, "a.c.1"), Some(&json!(20)));
        assert_eq!(lookup(&v, "a.z"), None);
    }
}
