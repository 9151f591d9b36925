use std::collections::HashSet;

use crate::{catalog::ActionCatalog, policy::Policy, report::Report, types::Code};

/// Outcome of matching a policy's `Action` tokens against the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    /// Tokens found verbatim in the catalog.
    pub explicit: Vec<String>,
    /// Catalog entries covered by a wildcard token, once per covering token.
    pub wildcard: Vec<String>,
    /// `(token, catalog entry)` pairs that look like a misspelling.
    pub near_misses: Vec<(String, String)>,
    /// `len(actions) - len(set(actions))`.
    pub duplicates: usize,
}

/// Matches action tokens against an [`ActionCatalog`].
///
/// Matching uses plain substring containment, not service/operation
/// prefixes, so `s3:Get` is reported as a near miss of every `s3:Get...`
/// entry. `NotAction` tokens are not classified.
pub struct ActionClassifier<'a> {
    catalog: &'a ActionCatalog,
}

impl<'a> ActionClassifier<'a> {
    pub fn new(catalog: &'a ActionCatalog) -> Self {
        Self { catalog }
    }

    pub fn classify(&self, policy: &Policy) -> Classification {
        let mut out = Classification::default();

        for action in policy.actions() {
            let explicit = self.catalog.contains(action);
            if explicit {
                log::debug!("{action} is a known AWS action");
                out.explicit.push(action.clone());
            }

            let wildcard_prefix = action.split_once('*').map(|(prefix, _)| prefix);

            for known in self.catalog.iter() {
                if let Some(prefix) = wildcard_prefix {
                    if known.contains(prefix) {
                        out.wildcard.push(known.to_string());
                    }
                }

                if !explicit
                    && action != known
                    && (known.contains(action.as_str()) || action.contains(known))
                {
                    out.near_misses.push((action.clone(), known.to_string()));
                }
            }
        }

        let unique: HashSet<&str> = policy.actions().iter().map(String::as_str).collect();
        out.duplicates = policy.actions().len() - unique.len();

        out
    }

    pub fn check(&self, report: &mut Report) {
        let classification = self.classify(report.policy());

        report.actions_explicit.extend(classification.explicit);
        report.actions_wildcard.extend(classification.wildcard);

        for (action, known) in classification.near_misses {
            report.add_warning(
                Code::W201,
                &[("action", action.clone()), ("action_aws", known)],
            );
            report.actions_warning.push(action);
        }

        if classification.duplicates > 0 {
            report.add_info(
                Code::I201,
                &[("duplicates", classification.duplicates.to_string())],
            );
        }
    }
}
