//! The tax-information form the assistant helps with.
//!
//! The form is static: four fields, one of which only appears once the
//! frontier-worker question is answered "Yes". Highlighting is driven by the
//! model through the `highlight_form_fields` tool; edits come from the user.

use std::collections::BTreeSet;
use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Shown under the submit button; submission is intentionally inert.
pub const DEMO_NOTICE: &str =
    "Please note this form will not submit, and is only intended for demo purposes.";

/// Form fields, in display order. Serialized with the names the model uses.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub enum FormField {
    #[serde(rename = "frontierWorker")]
    FrontierWorker,
    #[serde(rename = "subsidiary")]
    Subsidiary,
    #[serde(rename = "vNumber")]
    VNumber,
    #[serde(rename = "bsn")]
    Bsn,
}

impl FormField {
    pub const ALL: [Self; 4] = [Self::FrontierWorker, Self::Subsidiary, Self::VNumber, Self::Bsn];

    #[must_use]
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::FrontierWorker => "frontierWorker",
            Self::Subsidiary => "subsidiary",
            Self::VNumber => "vNumber",
            Self::Bsn => "bsn",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::FrontierWorker => {
                "Have you worked as a frontier worker in the Netherlands in the past period?"
            }
            Self::Subsidiary => "Is your company* a subsidiary of a parent company?",
            Self::VNumber => "V-number",
            Self::Bsn => "Citizen service number (BSN)",
        }
    }

    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::Subsidiary => Some("*If the company is a sole trader, choose 'No'"),
            _ => None,
        }
    }

    #[must_use]
    pub const fn kind(self) -> FieldKind {
        match self {
            Self::FrontierWorker | Self::Subsidiary => FieldKind::Choice,
            Self::VNumber | Self::Bsn => FieldKind::Text,
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Choice,
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Answer {
    Yes,
    No,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Choice(Option<Answer>),
    Text(String),
}

/// Fields currently emphasized in the UI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighlightSet(BTreeSet<FormField>);

impl HighlightSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains(&self, field: FormField) -> bool {
        self.0.contains(&field)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = FormField> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<FormField> for HighlightSet {
    fn from_iter<I: IntoIterator<Item = FormField>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A field as the UI should draw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldView {
    pub field: FormField,
    pub label: &'static str,
    pub hint: Option<&'static str>,
    pub value: FieldValue,
    pub highlighted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Nothing was sent anywhere.
    DemoOnly { notice: &'static str },
}

/// Local edit state of the form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaxForm {
    frontier_worker: Option<Answer>,
    subsidiary: Option<Answer>,
    v_number: String,
    bsn: String,
}

impl TaxForm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    /// Returns an error if `field` is a Yes/No question.
    pub fn set_text(&mut self, field: FormField, value: impl Into<String>) -> Result<()> {
        match field {
            FormField::VNumber => self.v_number = value.into(),
            FormField::Bsn => self.bsn = value.into(),
            FormField::FrontierWorker | FormField::Subsidiary => {
                return Err(Error::InvalidFormEdit(format!("{field} takes a Yes/No answer")));
            }
        }
        Ok(())
    }

    /// # Errors
    /// Returns an error if `field` is a text input.
    pub fn choose(&mut self, field: FormField, answer: Answer) -> Result<()> {
        match field {
            FormField::FrontierWorker => self.frontier_worker = Some(answer),
            FormField::Subsidiary => self.subsidiary = Some(answer),
            FormField::VNumber | FormField::Bsn => {
                return Err(Error::InvalidFormEdit(format!("{field} takes free text")));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn value(&self, field: FormField) -> FieldValue {
        match field {
            FormField::FrontierWorker => FieldValue::Choice(self.frontier_worker),
            FormField::Subsidiary => FieldValue::Choice(self.subsidiary),
            FormField::VNumber => FieldValue::Text(self.v_number.clone()),
            FormField::Bsn => FieldValue::Text(self.bsn.clone()),
        }
    }

    /// The subsidiary question only applies to frontier workers. A hidden
    /// answer is kept so toggling back restores it.
    #[must_use]
    pub fn is_visible(&self, field: FormField) -> bool {
        match field {
            FormField::Subsidiary => self.frontier_worker == Some(Answer::Yes),
            _ => true,
        }
    }

    pub fn fields<'a>(&'a self, highlights: &'a HighlightSet) -> impl Iterator<Item = FieldView> + 'a {
        FormField::ALL
            .into_iter()
            .filter(move |field| self.is_visible(*field))
            .map(move |field| FieldView {
                field,
                label: field.label(),
                hint: field.hint(),
                value: self.value(field),
                highlighted: highlights.contains(field),
            })
    }

    /// Submission is a demo no-op; callers must surface the notice.
    #[must_use]
    pub fn submit(&self) -> Submission {
        tracing::info!(form = ?self, "Form submitted (demo only, nothing sent)");
        Submission::DemoOnly { notice: DEMO_NOTICE }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subsidiary_follows_frontier_worker_answer() {
        let mut form = TaxForm::new();
        assert!(!form.is_visible(FormField::Subsidiary));

        form.choose(FormField::FrontierWorker, Answer::Yes).unwrap();
        form.choose(FormField::Subsidiary, Answer::No).unwrap();
        assert!(form.is_visible(FormField::Subsidiary));

        form.choose(FormField::FrontierWorker, Answer::No).unwrap();
        assert!(!form.is_visible(FormField::Subsidiary));
        assert_eq!(form.value(FormField::Subsidiary), FieldValue::Choice(Some(Answer::No)));
    }

    #[test]
    fn edits_are_checked_against_field_kind() {
        let mut form = TaxForm::new();
        assert!(matches!(
            form.set_text(FormField::FrontierWorker, "Yes"),
            Err(Error::InvalidFormEdit(_))
        ));
        assert!(matches!(
            form.choose(FormField::Bsn, Answer::Yes),
            Err(Error::InvalidFormEdit(_))
        ));

        form.set_text(FormField::Bsn, "123456782").unwrap();
        assert_eq!(form.value(FormField::Bsn), FieldValue::Text("123456782".to_string()));
    }

    #[test]
    fn views_carry_highlight_flags() {
        let form = TaxForm::new();
        let highlights: HighlightSet = [FormField::Bsn].into_iter().collect();

        let views: Vec<_> = form.fields(&highlights).collect();
        let names: Vec<_> = views.iter().map(|v| v.field).collect();
        assert_eq!(names, vec![FormField::FrontierWorker, FormField::VNumber, FormField::Bsn]);
        assert!(views.iter().find(|v| v.field == FormField::Bsn).unwrap().highlighted);
        assert!(!views.iter().find(|v| v.field == FormField::VNumber).unwrap().highlighted);
    }

    #[test]
    fn submit_reports_demo_notice() {
        let form = TaxForm::new();
        assert_eq!(form.submit(), Submission::DemoOnly { notice: DEMO_NOTICE });
    }

    #[test]
    fn field_names_match_wire_names() {
        for field in FormField::ALL {
            let json = serde_json::to_value(field).unwrap();
            assert_eq!(json, serde_json::Value::String(field.wire_name().to_string()));
        }
    }
}
