use std::fmt;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
    Recommendation,
}

/// Stable diagnostic identifiers. The first digit groups codes by checker:
/// `0xx` schema, `1xx` limits, `2xx` actions, `3xx` recommendations.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Code {
    E000,
    E001,
    E101,
    E102,
    W101,
    W102,
    W201,
    I201,
    O301,
    O302,
    O303,
    O304,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageTemplate {
    pub rule: &'static str,
    pub msg: &'static str,
}

impl Code {
    pub fn template(self) -> MessageTemplate {
        let (rule, msg) = match self {
            Code::E000 => ("Validation Error", "{errors}"),
            Code::E001 => ("Validation Error", "Duplicate key \"{key}\""),
            Code::E101 => ("Size Error", "SCP hit maximum size ({size}/{size_max} bytes)."),
            Code::E102 => (
                "Size Error",
                "SCP hit maximum size ({size}/{size_max} bytes). \
                 Please try it again with argument -m (--minimize).",
            ),
            Code::W101 => (
                "Size Warning",
                "Your SCP has already reached {percent}% of the maximum size.",
            ),
            Code::W102 => (
                "Size Warning",
                "Your SCP has already reached {percent}% of the maximum size. \
                 Please try it again with argument -m (--minimize).",
            ),
            Code::W201 => (
                "Unknown Action",
                "Action {action} is unknown. Do you mean {action_aws}?",
            ),
            Code::I201 => (
                "Duplicate Action",
                "There are {duplicates} duplicated Action/NotAction items. \
                 Ignore this message if you are using different resources/conditions.",
            ),
            Code::O301 => ("Action unsorted", "Actions are unsorted."),
            Code::O302 => ("NotAction unsorted", "NotActions are unsorted."),
            Code::O303 => (
                "Add Wildcard",
                "Action {action_1} and {action_2} can be abstracted by a wildcard {wildcard}.",
            ),
            Code::O304 => (
                "Unnecessary Action",
                "{action_1} is already a wildcard for {action_2}.",
            ),
        };
        MessageTemplate { rule, msg }
    }

    pub fn severity(self) -> Severity {
        match self {
            Code::E000 | Code::E001 | Code::E101 | Code::E102 => Severity::Error,
            Code::W101 | Code::W102 | Code::W201 => Severity::Warning,
            Code::I201 => Severity::Info,
            Code::O301 | Code::O302 | Code::O303 | Code::O304 => Severity::Recommendation,
        }
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Diagnostic {
    pub code: Code,
    pub rule: String,
    pub msg: String,
}

impl Diagnostic {
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.code, self.rule, self.msg)
    }
}

static RE_PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([a-z_0-9]+)\}").expect("valid regex"));

/// Renders the template for `code`, substituting every `{name}` found in
/// `details`. Placeholders without a matching detail are left untouched.
pub fn render_diagnostic(code: Code, details: &[(&str, String)]) -> Diagnostic {
    let template = code.template();
    let msg = RE_PLACEHOLDER.replace_all(template.msg, |cap: &Captures| {
        let name = &cap[1];
        details
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.clone())
            .unwrap_or_else(|| cap[0].to_string())
    });

    Diagnostic {
        code,
        rule: template.rule.to_string(),
        msg: msg.into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_substitutes_placeholders() {
        let d = render_diagnostic(
            Code::O303,
            &[
                ("action_1", "s3:Get".to_string()),
                ("action_2", "s3:GetObject".to_string()),
                ("wildcard", "s3:Get*".to_string()),
            ],
        );
        assert_eq!(
            d.msg,
            "Action s3:Get and s3:GetObject can be abstracted by a wildcard s3:Get*."
        );
        assert_eq!(d.rule, "Add Wildcard");
        assert_eq!(d.severity(), Severity::Recommendation);
    }

    #[test]
    fn render_leaves_unknown_placeholders() {
        let d = render_diagnostic(Code::E001, &[]);
        assert_eq!(d.msg, "Duplicate key \"{key}\"");
    }

    #[test]
    fn render_does_not_touch_template_table() {
        let first = render_diagnostic(Code::W201, &[("action", "a".into()), ("action_aws", "b".into())]);
        let second = render_diagnostic(Code::W201, &[("action", "c".into()), ("action_aws", "d".into())]);
        assert_ne!(first.msg, second.msg);
        assert_eq!(
            Code::W201.template().msg,
            "Action {action} is unknown. Do you mean {action_aws}?"
        );
    }

    #[test]
    fn diagnostic_serializes_as_code_rule_msg() {
        let d = render_diagnostic(Code::O301, &[]);
        let v = serde_json::to_value(&d).unwrap();
        assert_eq!(
            v,
            serde_json::json!({"code": "O301", "rule": "Action unsorted", "msg": "Actions are unsorted."})
        );
    }
}
