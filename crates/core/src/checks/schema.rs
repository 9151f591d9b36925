use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;

use jsonschema::{Draft, Validator};
use once_cell::sync::Lazy;
use serde::de::{Deserialize, Deserializer, Error, MapAccess, SeqAccess, Visitor};
use serde_json::Value;

use crate::{report::Report, types::Code};

const SCP_SCHEMA_JSON: &str = include_str!("../../data/scp_schema.json");

static SCP_SCHEMA: Lazy<Validator> = Lazy::new(|| {
    let schema: Value = serde_json::from_str(SCP_SCHEMA_JSON).expect("valid schema json");
    jsonschema::options()
        .with_draft(Draft::Draft7)
        .build(&schema)
        .expect("valid SCP schema")
});

/// Schema violations of `document`, sorted by instance path and rendered as
/// `"<last path segment>: <message>"` (just the message at the root).
pub fn schema_errors(document: &Value) -> Vec<String> {
    let mut errors: Vec<(String, String)> = SCP_SCHEMA
        .iter_errors(document)
        .map(|err| (err.instance_path().to_string(), err.to_string()))
        .collect();
    errors.sort_by(|a, b| cmp_instance_paths(&a.0, &b.0));

    errors
        .into_iter()
        .map(|(path, message)| match path.rsplit('/').next() {
            Some(last) if !path.is_empty() => format!("{last}: {message}"),
            _ => message,
        })
        .collect()
}

/// Orders JSON pointers segment by segment, comparing array indices
/// numerically so `/Statement/2` sorts before `/Statement/10`.
fn cmp_instance_paths(a: &str, b: &str) -> Ordering {
    let mut left = a.split('/');
    let mut right = b.split('/');
    loop {
        let ord = match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => match (x.parse::<usize>(), y.parse::<usize>()) {
                (Ok(i), Ok(j)) => i.cmp(&j),
                (Ok(_), Err(_)) => Ordering::Less,
                (Err(_), Ok(_)) => Ordering::Greater,
                (Err(_), Err(_)) => x.cmp(y),
            },
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
}

/// The first key that appears twice within one object of `raw`, in
/// document order. `serde_json::Value` keeps only the last occurrence, so
/// this has to look at the text.
pub fn duplicate_key(raw: &str) -> Option<String> {
    match serde_json::from_str::<FirstDuplicate>(raw) {
        Ok(FirstDuplicate(key)) => key,
        Err(err) => {
            log::debug!("duplicate key scan skipped: {err}");
            None
        }
    }
}

struct FirstDuplicate(Option<String>);

impl<'de> Deserialize<'de> for FirstDuplicate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(DuplicateVisitor)
    }
}

struct DuplicateVisitor;

impl<'de> Visitor<'de> for DuplicateVisitor {
    type Value = FirstDuplicate;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("any JSON value")
    }

    fn visit_bool<E: Error>(self, _: bool) -> Result<Self::Value, E> {
        Ok(FirstDuplicate(None))
    }

    fn visit_i64<E: Error>(self, _: i64) -> Result<Self::Value, E> {
        Ok(FirstDuplicate(None))
    }

    fn visit_u64<E: Error>(self, _: u64) -> Result<Self::Value, E> {
        Ok(FirstDuplicate(None))
    }

    fn visit_f64<E: Error>(self, _: f64) -> Result<Self::Value, E> {
        Ok(FirstDuplicate(None))
    }

    fn visit_str<E: Error>(self, _: &str) -> Result<Self::Value, E> {
        Ok(FirstDuplicate(None))
    }

    fn visit_unit<E: Error>(self) -> Result<Self::Value, E> {
        Ok(FirstDuplicate(None))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut found = None;
        while let Some(FirstDuplicate(inner)) = seq.next_element()? {
            if found.is_none() {
                found = inner;
            }
        }
        Ok(FirstDuplicate(found))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut seen = HashSet::new();
        let mut found = None;
        while let Some(key) = map.next_key::<String>()? {
            let FirstDuplicate(inner) = map.next_value()?;
            if found.is_some() {
                continue;
            }
            if seen.contains(&key) {
                found = Some(key);
            } else {
                seen.insert(key);
                found = inner;
            }
        }
        Ok(FirstDuplicate(found))
    }
}

pub fn check(report: &mut Report) {
    let errors = schema_errors(report.policy().document());
    if errors.is_empty() {
        log::debug!("{}: schema validation passed", report.policy().file());
    }
    for error in errors {
        report.add_error(Code::E000, &[("errors", error)]);
    }

    if let Some(key) = duplicate_key(report.policy().raw()) {
        report.add_error(Code::E001, &[("key", key)]);
    }
}
