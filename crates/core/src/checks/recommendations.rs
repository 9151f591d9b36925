use crate::{policy::Statement, report::Report, types::Code};

/// Recommendations for one statement, in emission order.
pub fn recommend(statement: &Statement) -> Vec<(Code, Vec<(&'static str, String)>)> {
    let mut out = Vec::new();

    if !statement.actions().is_empty() && !is_sorted(statement.actions()) {
        out.push((Code::O301, vec![]));
    }
    if !statement.not_actions().is_empty() && !is_sorted(statement.not_actions()) {
        out.push((Code::O302, vec![]));
    }

    let actions = if statement.actions().is_empty() {
        statement.not_actions()
    } else {
        statement.actions()
    };

    // Quadratic, but a statement is bounded by the policy size limit.
    if actions.len() > 1 {
        for first in actions {
            let (stem, is_wildcard) = match first.split_once('*') {
                Some((prefix, _)) => (prefix, true),
                None => (first.as_str(), false),
            };

            for second in actions {
                if first == second || !second.contains(stem) {
                    continue;
                }
                let pair = || {
                    vec![
                        ("action_1", first.clone()),
                        ("action_2", second.clone()),
                    ]
                };

                let mut collapse = pair();
                collapse.push(("wildcard", format!("{stem}*")));
                out.push((Code::O303, collapse));

                if is_wildcard {
                    out.push((Code::O304, pair()));
                }
            }
        }
    }

    out
}

fn is_sorted(items: &[String]) -> bool {
    items.windows(2).all(|w| w[0] <= w[1])
}

pub fn check(report: &mut Report) {
    let found: Vec<_> = report
        .policy()
        .statements()
        .iter()
        .flat_map(recommend)
        .collect();

    for (code, details) in found {
        report.add_recommendation(code, &details);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{Policy, DEFAULT_SIZE_MAX};
    use serde_json::{json, Value};

    fn codes(statement: Value) -> Vec<Code> {
        recommend(&Statement::from_value(&statement))
            .into_iter()
            .map(|(code, _)| code)
            .collect()
    }

    #[test]
    fn unsorted_actions_yield_one_recommendation() {
        assert_eq!(
            codes(json!({"Action": ["s3:PutObject", "s3:GetObject"]})),
            vec![Code::O301]
        );
        assert_eq!(
            codes(json!({"Action": ["s3:PutObject", "ec2:RunInstances", "iam:PassRole", "a:B"]})),
            vec![Code::O301]
        );
    }

    #[test]
    fn unsorted_not_actions_are_reported_separately() {
        assert_eq!(
            codes(json!({
                "Action": ["sts:AssumeRole", "iam:PassRole"],
                "NotAction": ["s3:PutObject", "s3:GetObject"]
            })),
            vec![Code::O301, Code::O302]
        );
    }

    #[test]
    fn service_wildcard_covers_explicit_action() {
        let found = recommend(&Statement::from_value(
            &json!({"Action": ["ec2:*", "ec2:StartInstances"]}),
        ));
        let codes: Vec<Code> = found.iter().map(|(code, _)| *code).collect();
        assert_eq!(codes, vec![Code::O303, Code::O304]);
        let (_, details) = &found[1];
        assert_eq!(
            details,
            &vec![
                ("action_1", "ec2:*".to_string()),
                ("action_2", "ec2:StartInstances".to_string())
            ]
        );
        assert!(found[0].1.contains(&("wildcard", "ec2:*".to_string())));
    }

    #[test]
    fn prefix_wildcard_fires_both_rules_for_same_pair() {
        assert_eq!(
            codes(json!({"Action": ["config:DeleteDelivery*", "config:DeleteDeliveryChannel"]})),
            vec![Code::O303, Code::O304]
        );
        assert_eq!(
            codes(json!({"Action": ["config:DeleteDelivery", "config:DeleteDelivery*"]})),
            vec![Code::O303, Code::O303, Code::O304]
        );
    }

    #[test]
    fn not_actions_used_when_actions_empty() {
        assert_eq!(
            codes(json!({"NotAction": ["s3:Get", "s3:GetObject"]})),
            vec![Code::O303]
        );
    }

    #[test]
    fn actions_preferred_over_not_actions() {
        assert!(codes(json!({
            "Action": ["ec2:RunInstances"],
            "NotAction": ["s3:Get", "s3:GetObject"]
        }))
        .is_empty());
    }

    #[test]
    fn single_action_is_not_compared() {
        assert!(codes(json!({"Action": "ec2:*"})).is_empty());
    }

    #[test]
    fn check_is_per_statement() {
        let policy = Policy::new(
            json!({"Statement": [
                {"Effect": "Deny", "Action": ["s3:PutObject", "s3:GetObject"]},
                {"Effect": "Deny", "Action": ["s3:GetObject", "s3:PutObject"]},
                {"Effect": "Deny", "Action": ["s3:PutObject", "s3:GetObject"]}
            ]}),
            "p.json",
            true,
            DEFAULT_SIZE_MAX,
        )
        .unwrap();
        let mut report = Report::new(policy);
        check(&mut report);
        let codes: Vec<Code> = report.recommendations().iter().map(|d| d.code).collect();
        assert_eq!(codes, vec![Code::O301, Code::O301]);
        assert_eq!(report.recommendations()[0].msg, "Actions are unsorted.");
    }
}
