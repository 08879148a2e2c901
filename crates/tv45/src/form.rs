//! Prayer request form: non-blocking submit with manual retry.

use crate::dom::{Document, Selector};
use crate::fetch::{FormMethod, FormSubmission};

/// Id of the prayer request form.
pub const FORM_ID: &str = "prayerForm";
/// Id of the confirmation shown after a successful submit.
pub const STATUS_ID: &str = "form-status";
/// Id of the submit button.
pub const BUTTON_ID: &str = "submitBtn";

/// Button label while a submission is in flight.
pub const SENDING_LABEL: &str = r#"<i class="fas fa-spinner fa-spin"></i> ENVIANDO..."#;
/// Button label after a failed submission.
pub const RETRY_LABEL: &str = r#"<i class="fas fa-paper-plane"></i> REINTENTAR ENVÍO"#;

/// Where the form is in its submit cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormState {
    /// Not yet submitted.
    #[default]
    Idle,
    /// Waiting for the endpoint.
    Sending,
    /// Accepted; the form is hidden and the confirmation shown.
    Sent,
    /// Rejected or unreachable; the button is enabled for another try.
    Failed,
}

/// Build the submission from the form element's `action` and `method`.
///
/// Returns `None` if the page has no prayer form.
#[must_use]
pub fn submission(doc: &Document, fields: Vec<(String, String)>) -> Option<FormSubmission> {
    let form = Selector::Id(FORM_ID);
    if !doc.contains(form) {
        return None;
    }
    Some(FormSubmission {
        action: doc.attribute(form, "action").unwrap_or_default(),
        method: FormMethod::from_attribute(doc.attribute(form, "method").as_deref()),
        fields,
    })
}

/// Disable the button and show the spinner.
pub fn mark_sending(doc: &mut Document) {
    let button = Selector::Id(BUTTON_ID);
    doc.set_attribute(button, "disabled", "");
    doc.set_inner_html(button, SENDING_LABEL);
}

/// Hide the form and show the confirmation.
pub fn mark_sent(doc: &mut Document) {
    doc.set_style(Selector::Id(FORM_ID), "display", "none");
    doc.set_style(Selector::Id(STATUS_ID), "display", "block");
}

/// Re-enable the button for a manual retry.
pub fn mark_failed(doc: &mut Document) {
    let button = Selector::Id(BUTTON_ID);
    doc.remove_attribute(button, "disabled");
    doc.set_inner_html(button, RETRY_LABEL);
}
