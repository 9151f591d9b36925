use anyhow::Context;
use serde::Serialize;
use serde_json::{ser::PrettyFormatter, Value};

/// AWS rejects SCPs larger than this many bytes.
pub const DEFAULT_SIZE_MAX: usize = 5120;

pub const PERCENT_PRECISION: u32 = 1;

/// One entry of a policy's `Statement` list.
///
/// Singular `Action`/`NotAction`/`Resource` values are stored as
/// one-element lists. Nothing here is validated; malformed statements end
/// up with empty fields and are reported by the schema check.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Statement {
    sid: Option<String>,
    effect: Option<String>,
    actions: Vec<String>,
    not_actions: Vec<String>,
    resources: Vec<String>,
    conditions: Value,
}

impl Statement {
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };

        Self {
            sid: obj.get("Sid").and_then(Value::as_str).map(str::to_string),
            effect: obj.get("Effect").and_then(Value::as_str).map(str::to_string),
            actions: string_list(obj.get("Action")),
            not_actions: string_list(obj.get("NotAction")),
            resources: string_list(obj.get("Resource")),
            conditions: obj.get("Condition").cloned().unwrap_or(Value::Null),
        }
    }

    pub fn sid(&self) -> Option<&str> {
        self.sid.as_deref()
    }

    pub fn effect(&self) -> Option<&str> {
        self.effect.as_deref()
    }

    pub fn actions(&self) -> &[String] {
        &self.actions
    }

    pub fn not_actions(&self) -> &[String] {
        &self.not_actions
    }

    pub fn resources(&self) -> &[String] {
        &self.resources
    }

    pub fn conditions(&self) -> &Value {
        &self.conditions
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(s)) => vec![s.clone()],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => vec![],
    }
}

/// A parsed SCP document with its derived size metrics.
#[derive(Debug, Clone)]
pub struct Policy {
    raw: String,
    document: Value,
    file: String,
    minimized: bool,
    statements: Vec<Statement>,
    actions: Vec<String>,
    not_actions: Vec<String>,
    size: usize,
    size_max: usize,
    percent: f64,
}

impl Policy {
    pub fn new(
        document: Value,
        filename: &str,
        minimize: bool,
        size_max: usize,
    ) -> anyhow::Result<Self> {
        let raw = document.to_string();
        Self::build(raw, document, filename, minimize, size_max)
    }

    /// Parses `raw` and keeps the text around for checks that need the
    /// original bytes (duplicate keys do not survive into a `Value`).
    pub fn from_json(
        raw: &str,
        filename: &str,
        minimize: bool,
        size_max: usize,
    ) -> anyhow::Result<Self> {
        let document: Value =
            serde_json::from_str(raw).with_context(|| format!("parse json {filename}"))?;
        Self::build(raw.to_string(), document, filename, minimize, size_max)
    }

    fn build(
        raw: String,
        document: Value,
        filename: &str,
        minimize: bool,
        size_max: usize,
    ) -> anyhow::Result<Self> {
        if size_max == 0 {
            anyhow::bail!("size maximum must be greater than zero");
        }

        let statements: Vec<Statement> = match document.get("Statement") {
            Some(Value::Array(items)) => items.iter().map(Statement::from_value).collect(),
            Some(single) if single.is_object() => vec![Statement::from_value(single)],
            _ => vec![],
        };

        let actions: Vec<String> = statements
            .iter()
            .flat_map(|s| s.actions.iter().cloned())
            .collect();
        let not_actions: Vec<String> = statements
            .iter()
            .flat_map(|s| s.not_actions.iter().cloned())
            .collect();

        let size = serialized_size(&document, minimize)?;
        let percent = percent(size, size_max, PERCENT_PRECISION);
        log::debug!(
            "{filename}: {} statements, {size}/{size_max} bytes (minimized={minimize})",
            statements.len()
        );

        Ok(Self {
            raw,
            document,
            file: filename.to_string(),
            minimized: minimize,
            statements,
            actions,
            not_actions,
            size,
            size_max,
            percent,
        })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn document(&self) -> &Value {
        &self.document
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn minimized(&self) -> bool {
        self.minimized
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn actions(&self) -> &[String] {
        &self.actions
    }

    pub fn not_actions(&self) -> &[String] {
        &self.not_actions
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn size_max(&self) -> usize {
        self.size_max
    }

    pub fn percent(&self) -> f64 {
        self.percent
    }

    pub fn minimized_json(&self) -> String {
        self.document.to_string()
    }
}

/// Byte length of the document as AWS counts it: pretty-printed with four
/// spaces of indentation, or compact when minimized.
pub fn serialized_size(document: &Value, minimize: bool) -> anyhow::Result<usize> {
    if minimize {
        let compact = serde_json::to_string(document).context("serialize minimized policy")?;
        return Ok(compact.len());
    }

    let mut buf = Vec::new();
    let mut ser =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    document.serialize(&mut ser).context("serialize policy")?;
    Ok(buf.len())
}

/// `100 * size / size_max`, rounded half-to-even at `precision` decimals.
pub fn percent(size: usize, size_max: usize, precision: u32) -> f64 {
    let scale = 10f64.powi(precision as i32);
    let raw = size as f64 * 100.0 / size_max as f64;
    (raw * scale).round_ties_even() / scale
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn statement_coerces_single_values() {
        let s = Statement::from_value(&json!({
            "Sid": "DenyAll",
            "Effect": "Deny",
            "Action": "ec2:*",
            "Resource": "*",
            "Condition": {"StringEquals": {"aws:RequestedRegion": "eu-west-1"}}
        }));
        assert_eq!(s.sid(), Some("DenyAll"));
        assert_eq!(s.effect(), Some("Deny"));
        assert_eq!(s.actions(), ["ec2:*"]);
        assert!(s.not_actions().is_empty());
        assert_eq!(s.resources(), ["*"]);
        assert!(s.conditions().is_object());
    }

    #[test]
    fn statement_tolerates_non_objects() {
        let s = Statement::from_value(&json!("Deny"));
        assert_eq!(s, Statement::default());
        assert!(s.conditions().is_null());
    }

    #[test]
    fn policy_concatenates_actions_in_statement_order() {
        let doc = json!({
            "Statement": [
                {"Effect": "Deny", "Action": ["s3:PutObject", "s3:GetObject"]},
                {"Effect": "Deny", "NotAction": "iam:*"},
                {"Effect": "Deny", "Action": "ec2:*"}
            ]
        });
        let policy = Policy::new(doc, "p.json", false, DEFAULT_SIZE_MAX).unwrap();
        assert_eq!(policy.statements().len(), 3);
        assert_eq!(policy.actions(), ["s3:PutObject", "s3:GetObject", "ec2:*"]);
        assert_eq!(policy.not_actions(), ["iam:*"]);
    }

    #[test]
    fn policy_accepts_single_statement_object() {
        let doc = json!({"Statement": {"Effect": "Deny", "Action": "ec2:*"}});
        let policy = Policy::new(doc, "p.json", false, DEFAULT_SIZE_MAX).unwrap();
        assert_eq!(policy.actions(), ["ec2:*"]);
    }

    #[test]
    fn policy_defaults_missing_statement() {
        let policy = Policy::new(json!({"Version": "2012-10-17"}), "p.json", true, DEFAULT_SIZE_MAX)
            .unwrap();
        assert!(policy.statements().is_empty());
        assert!(policy.actions().is_empty());
    }

    #[test]
    fn sizes_follow_indentation_convention() {
        let doc = json!({"Statement": [{"Action": "*", "Effect": "Deny"}]});
        let compact = r#"{"Statement":[{"Action":"*","Effect":"Deny"}]}"#;
        let pretty = "{\n    \"Statement\": [\n        {\n            \"Action\": \"*\",\n            \"Effect\": \"Deny\"\n        }\n    ]\n}";
        assert_eq!(serialized_size(&doc, true).unwrap(), compact.len());
        assert_eq!(serialized_size(&doc, false).unwrap(), pretty.len());
    }

    #[test]
    fn size_counts_utf8_bytes() {
        let doc = json!({"Sid": "é"});
        assert_eq!(serialized_size(&doc, true).unwrap(), r#"{"Sid":"é"}"#.len());
        assert_eq!(serialized_size(&doc, true).unwrap(), 12);
    }

    #[test]
    fn percent_rounds_to_precision() {
        assert_eq!(percent(5120, 5120, 1), 100.0);
        assert_eq!(percent(4608, 5120, 1), 90.0);
        assert_eq!(percent(1000, 5120, 1), 19.5);
        assert_eq!(percent(1, 3, 2), 33.33);
    }

    #[test]
    fn percent_ties_round_to_even() {
        assert_eq!(percent(64, 5120, 1), 1.2);
        assert_eq!(percent(192, 5120, 1), 3.8);
        assert_eq!(percent(4672, 5120, 1), 91.2);
        assert_eq!(percent(4800, 5120, 1), 93.8);
    }

    #[test]
    fn zero_size_max_is_rejected() {
        assert!(Policy::new(json!({}), "p.json", false, 0).is_err());
    }

    #[test]
    fn from_json_keeps_raw_text_and_reports_parse_errors() {
        let raw = "{\"Statement\": []}";
        let policy = Policy::from_json(raw, "p.json", false, DEFAULT_SIZE_MAX).unwrap();
        assert_eq!(policy.raw(), raw);

        let err = Policy::from_json("{not json", "bad.json", false, DEFAULT_SIZE_MAX).unwrap_err();
        assert!(format!("{:#}", err).contains("parse json bad.json"));
    }
}
