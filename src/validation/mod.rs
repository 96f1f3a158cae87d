//! Field validation rules keyed by draft field name.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::model::RecordDraft;

/// Draft field names understood by the rule engine.
pub const FIELD_CONTENT: &str = "content";
pub const FIELD_DESCRIPTION: &str = "description";
pub const FIELD_RELATED: &str = "related";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    Required,
    MaxLength(usize),
}

/// Whether `save()` refuses to submit an invalid draft. `Advisory` keeps the
/// historical behavior: validity is computed and reported but the server
/// stays the source of truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationPolicy {
    #[default]
    Advisory,
    Blocking,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }
}

/// Rules per field name. Unknown field names are skipped with a debug log
/// rather than rejected, so a rule set can outlive schema changes.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: BTreeMap<String, Vec<FieldRule>>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule(mut self, field: &str, rule: FieldRule) -> Self {
        self.rules.entry(field.to_string()).or_default().push(rule);
        self
    }

    pub fn validate(&self, draft: &RecordDraft) -> ValidationReport {
        let mut violations = Vec::new();
        for (field, rules) in &self.rules {
            let Some(value) = field_value(draft, field) else {
                tracing::debug!(field, "no such draft field; skipping rules");
                continue;
            };
            for rule in rules {
                if let Some(message) = check(*rule, &value) {
                    violations.push(Violation {
                        field: field.clone(),
                        message,
                    });
                }
            }
        }
        ValidationReport { violations }
    }
}

/// Field presence/content as seen by the rules. Absent optional references
/// map to an empty value so `Required` treats them as missing.
fn field_value(draft: &RecordDraft, field: &str) -> Option<String> {
    match field {
        FIELD_CONTENT => Some(draft.content.clone()),
        FIELD_DESCRIPTION => Some(draft.description.clone()),
        FIELD_RELATED => Some(
            draft
                .related
                .map(|id| id.to_string())
                .unwrap_or_default(),
        ),
        _ => None,
    }
}

fn check(rule: FieldRule, value: &str) -> Option<String> {
    match rule {
        FieldRule::Required if value.trim().is_empty() => Some("value is required".to_string()),
        FieldRule::MaxLength(max) if value.chars().count() > max => {
            Some(format!("value exceeds maximum length of {max}"))
        }
        _ => None,
    }
}
