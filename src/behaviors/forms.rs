use std::rc::Rc;

use log::{debug, warn};
use serde_json::{Map, Value};
use wasm_bindgen::JsCast;
use web_sys::js_sys::{self, Array};
use web_sys::{Document, Event, FormData, HtmlFormElement};

use crate::config::SiteConfig;
use crate::dom::{self, EventListener};
use crate::error::Result;

pub const MISSING_FIELDS_MESSAGE: &str = "Please fill in all required fields.";
pub const SUCCESS_MESSAGE: &str = "Thank you for your submission!";

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    /// Anything `FormData` yields that is not a string, e.g. a file.
    Blob,
}

/// Fields of one submitted form, in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormSubmission {
    pub fields: Vec<(String, FieldValue)>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("field `{name}` is empty")]
    MissingField { name: String },
}

impl FormSubmission {
    pub fn from_pairs<K: Into<String>, V: Into<String>>(pairs: impl IntoIterator<Item = (K, V)>) -> Self {
        Self {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), FieldValue::Text(v.into())))
                .collect(),
        }
    }

    /// One entry per field name, holding the last value submitted under it.
    /// Names keep the position of their first appearance.
    pub fn latest_values(&self) -> Vec<(&str, &FieldValue)> {
        let mut latest: Vec<(&str, &FieldValue)> = Vec::with_capacity(self.fields.len());
        for (name, value) in &self.fields {
            match latest.iter_mut().find(|(seen, _)| *seen == name.as_str()) {
                Some(slot) => slot.1 = value,
                None => latest.push((name.as_str(), value)),
            }
        }
        latest
    }

    pub fn validate(&self) -> std::result::Result<(), FormError> {
        for (name, value) in self.latest_values() {
            if let FieldValue::Text(text) = value {
                if text.trim().is_empty() {
                    return Err(FormError::MissingField { name: name.to_string() });
                }
            }
        }
        Ok(())
    }

    /// Repeated names keep the last value.
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        for (name, value) in self.latest_values() {
            let value = match value {
                FieldValue::Text(text) => Value::String(text.clone()),
                FieldValue::Blob => Value::Null,
            };
            map.insert(name.to_string(), value);
        }
        Value::Object(map)
    }

    pub fn from_form(form: &HtmlFormElement) -> Result<Self> {
        let data = FormData::new_with_form(form)?;
        let mut fields = Vec::new();
        if let Some(entries) = js_sys::try_iter(&data)? {
            for entry in entries {
                let entry: Array = entry?.unchecked_into();
                let Some(name) = entry.get(0).as_string() else {
                    continue;
                };
                let value = match entry.get(1).as_string() {
                    Some(text) => FieldValue::Text(text),
                    None => FieldValue::Blob,
                };
                fields.push((name, value));
            }
        }
        Ok(Self { fields })
    }
}

/// Where form results are reported. The console implementation is a
/// placeholder until the page grows real inline feedback.
pub trait FormFeedback {
    fn success(&self, submission: &FormSubmission, message: &str);
    fn error(&self, error: &FormError, message: &str);
}

pub struct ConsoleFeedback;

impl FormFeedback for ConsoleFeedback {
    fn success(&self, submission: &FormSubmission, message: &str) {
        gloo_console::log!("Form submitted:", submission.to_json().to_string());
        gloo_console::log!("Form success:", message);
    }

    fn error(&self, error: &FormError, message: &str) {
        debug!("form rejected: {}", error);
        gloo_console::error!("Form error:", message);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Accepted,
    Rejected(FormError),
}

pub fn handle_submission(submission: &FormSubmission, feedback: &dyn FormFeedback) -> SubmitOutcome {
    match submission.validate() {
        Ok(()) => {
            feedback.success(submission, SUCCESS_MESSAGE);
            SubmitOutcome::Accepted
        }
        Err(err) => {
            feedback.error(&err, MISSING_FIELDS_MESSAGE);
            SubmitOutcome::Rejected(err)
        }
    }
}

pub struct FormIntercept {
    _listeners: Vec<EventListener>,
}

pub fn setup(
    document: &Document,
    config: &SiteConfig,
    feedback: Rc<dyn FormFeedback>,
) -> Result<Option<FormIntercept>> {
    let forms: Vec<HtmlFormElement> = dom::query_all(document, &config.form_selector)?
        .into_iter()
        .filter_map(|el| el.dyn_into::<HtmlFormElement>().ok())
        .collect();
    if forms.is_empty() {
        debug!("no forms, skipping submit intercept");
        return Ok(None);
    }

    let mut listeners = Vec::with_capacity(forms.len());
    for form in forms {
        let feedback = feedback.clone();
        let target = form.clone();
        listeners.push(EventListener::new(&target, "submit", move |event: Event| {
            event.prevent_default();
            match FormSubmission::from_form(&form) {
                Ok(submission) => {
                    handle_submission(&submission, feedback.as_ref());
                }
                Err(err) => warn!("reading form data failed: {}", err),
            }
        })?);
    }

    Ok(Some(FormIntercept {
        _listeners: listeners,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingFeedback {
        successes: RefCell<Vec<Value>>,
        errors: RefCell<Vec<FormError>>,
    }

    impl FormFeedback for RecordingFeedback {
        fn success(&self, submission: &FormSubmission, message: &str) {
            assert_eq!(message, SUCCESS_MESSAGE);
            self.successes.borrow_mut().push(submission.to_json());
        }

        fn error(&self, error: &FormError, message: &str) {
            assert_eq!(message, MISSING_FIELDS_MESSAGE);
            self.errors.borrow_mut().push(error.clone());
        }
    }

    #[test]
    fn blank_name_takes_error_path() {
        let feedback = RecordingFeedback::default();
        let submission = FormSubmission::from_pairs([("name", ""), ("email", "a@b.com")]);
        let outcome = handle_submission(&submission, &feedback);
        assert_eq!(
            outcome,
            SubmitOutcome::Rejected(FormError::MissingField { name: "name".into() })
        );
        assert!(feedback.successes.borrow().is_empty());
        assert_eq!(feedback.errors.borrow().len(), 1);
    }

    #[test]
    fn filled_form_succeeds_once() {
        let feedback = RecordingFeedback::default();
        let submission = FormSubmission::from_pairs([("name", "Jo"), ("email", "a@b.com")]);
        assert_eq!(handle_submission(&submission, &feedback), SubmitOutcome::Accepted);
        let successes = feedback.successes.borrow();
        assert_eq!(successes.len(), 1);
        assert_eq!(successes[0], serde_json::json!({"name": "Jo", "email": "a@b.com"}));
        assert!(feedback.errors.borrow().is_empty());
    }

    #[test]
    fn whitespace_only_counts_as_blank() {
        let submission = FormSubmission::from_pairs([("message", " \t\n ")]);
        assert!(submission.validate().is_err());
    }

    #[test]
    fn file_fields_do_not_block_submission() {
        let mut submission = FormSubmission::from_pairs([("name", "Jo")]);
        submission.fields.push(("attachment".into(), FieldValue::Blob));
        assert_eq!(submission.validate(), Ok(()));
        assert_eq!(submission.to_json()["attachment"], Value::Null);
    }

    #[test]
    fn empty_form_is_valid() {
        assert_eq!(FormSubmission::default().validate(), Ok(()));
    }

    #[test]
    fn repeated_names_keep_last_value() {
        let submission = FormSubmission::from_pairs([("topic", "a"), ("topic", "b")]);
        assert_eq!(submission.to_json(), serde_json::json!({"topic": "b"}));
    }

    #[test]
    fn validation_checks_the_value_that_gets_logged() {
        let feedback = RecordingFeedback::default();
        let submission = FormSubmission::from_pairs([("subscribe", ""), ("subscribe", "yes")]);
        assert_eq!(submission.validate(), Ok(()));
        assert_eq!(handle_submission(&submission, &feedback), SubmitOutcome::Accepted);
        assert_eq!(
            feedback.successes.borrow()[0],
            serde_json::json!({"subscribe": "yes"})
        );

        let overwritten = FormSubmission::from_pairs([("subscribe", "yes"), ("subscribe", " ")]);
        assert_eq!(
            overwritten.validate(),
            Err(FormError::MissingField { name: "subscribe".into() })
        );
    }

    proptest! {
        #[test]
        fn any_blank_field_never_succeeds(
            filled in proptest::collection::vec("[a-z]{1,8}", 0..5),
            blank in "[ \t]{0,3}",
            position in 0usize..6,
        ) {
            let mut pairs: Vec<(String, String)> = filled
                .into_iter()
                .enumerate()
                .map(|(i, v)| (format!("field{}", i), v))
                .collect();
            let at = position.min(pairs.len());
            pairs.insert(at, ("blank".to_string(), blank));

            let feedback = RecordingFeedback::default();
            let outcome = handle_submission(&FormSubmission::from_pairs(pairs), &feedback);
            prop_assert!(matches!(outcome, SubmitOutcome::Rejected(_)));
            prop_assert!(feedback.successes.borrow().is_empty());
        }

        #[test]
        fn all_filled_fields_succeed_exactly_once(
            values in proptest::collection::vec("[a-zA-Z0-9@.]{1,12}", 1..6)
        ) {
            let pairs = values
                .into_iter()
                .enumerate()
                .map(|(i, v)| (format!("field{}", i), format!(" {} ", v)));
            let feedback = RecordingFeedback::default();
            let outcome = handle_submission(&FormSubmission::from_pairs(pairs), &feedback);
            prop_assert_eq!(outcome, SubmitOutcome::Accepted);
            prop_assert_eq!(feedback.successes.borrow().len(), 1);
            prop_assert!(feedback.errors.borrow().is_empty());
        }
    }
}
