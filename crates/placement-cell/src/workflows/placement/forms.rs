use std::collections::{BTreeMap, BTreeSet};

use super::domain::{AnswerValue, FieldKind, FieldSpec, JobForm};

/// Validation errors for form definitions and submitted answer sets.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormViolation {
    #[error("a form needs at least one field")]
    EmptyFieldList,
    #[error("field {position} has a blank label")]
    BlankLabel { position: usize },
    #[error("label '{label}' appears more than once")]
    DuplicateLabel { label: String },
    #[error("choice field '{label}' offers no options")]
    MissingOptions { label: String },
    #[error("answer '{label}' does not match any form field")]
    UnknownField { label: String },
    #[error("required field '{label}' was not answered")]
    MissingAnswer { label: String },
    #[error("answer '{label}' should be a {expected:?} value")]
    AnswerKindMismatch { label: String, expected: FieldKind },
    #[error("'{value}' is not an offered option for '{label}'")]
    ChoiceNotOffered { label: String, value: String },
}

/// Check an admin-supplied field list before a form is stored. Labels are
/// the answer keys, so they must be present and unique within the form.
pub fn validate_fields(fields: &[FieldSpec]) -> Result<(), FormViolation> {
    if fields.is_empty() {
        return Err(FormViolation::EmptyFieldList);
    }

    let mut seen = BTreeSet::new();
    for (position, field) in fields.iter().enumerate() {
        let label = field.label.trim();
        if label.is_empty() {
            return Err(FormViolation::BlankLabel { position });
        }
        if !seen.insert(label.to_string()) {
            return Err(FormViolation::DuplicateLabel {
                label: label.to_string(),
            });
        }
        if field.kind == FieldKind::Choice && field.options.is_empty() {
            return Err(FormViolation::MissingOptions {
                label: label.to_string(),
            });
        }
    }

    Ok(())
}

/// Check a submitted answer set against the job's form. Every answer must
/// name a defined field with a matching kind, every required field must be
/// answered, and choice answers must come from the offered options.
pub fn validate_answers(
    form: &JobForm,
    answers: &BTreeMap<String, AnswerValue>,
) -> Result<(), FormViolation> {
    for (label, answer) in answers {
        let field = form
            .fields
            .iter()
            .find(|field| field.label == *label)
            .ok_or_else(|| FormViolation::UnknownField {
                label: label.clone(),
            })?;

        if answer.kind() != field.kind {
            return Err(FormViolation::AnswerKindMismatch {
                label: label.clone(),
                expected: field.kind,
            });
        }

        if let AnswerValue::Choice(value) = answer {
            if !field.options.iter().any(|option| option == value) {
                return Err(FormViolation::ChoiceNotOffered {
                    label: label.clone(),
                    value: value.clone(),
                });
            }
        }
    }

    for field in &form.fields {
        if field.required && !answers.contains_key(&field.label) {
            return Err(FormViolation::MissingAnswer {
                label: field.label.clone(),
            });
        }
    }

    Ok(())
}

/// A job with no form on file accepts only an empty answer set.
pub fn validate_formless_answers(
    answers: &BTreeMap<String, AnswerValue>,
) -> Result<(), FormViolation> {
    match answers.keys().next() {
        Some(label) => Err(FormViolation::UnknownField {
            label: label.clone(),
        }),
        None => Ok(()),
    }
}
