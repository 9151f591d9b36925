use crate::{policy::Policy, report::Report, types::Code};

/// Share of the size maximum above which a policy is reported as close to
/// the limit.
pub const WARN_PERCENT: f64 = 90.0;

pub fn evaluate(policy: &Policy) -> Option<Code> {
    let over = policy.size() > policy.size_max();
    let near = policy.percent() > WARN_PERCENT;

    match (over, near, policy.minimized()) {
        (true, _, true) => Some(Code::E101),
        (true, _, false) => Some(Code::E102),
        (false, true, true) => Some(Code::W101),
        (false, true, false) => Some(Code::W102),
        (false, false, _) => None,
    }
}

pub fn check(report: &mut Report) {
    let policy = report.policy();
    let Some(code) = evaluate(policy) else {
        return;
    };

    let details = [
        ("size", policy.size().to_string()),
        ("size_max", policy.size_max().to_string()),
        ("percent", format!("{:.1}", policy.percent())),
    ];
    match code {
        Code::E101 | Code::E102 => report.add_error(code, &details),
        _ => report.add_warning(code, &details),
    }
}
