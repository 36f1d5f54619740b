use serde::{Deserialize, Serialize};

use crate::clock::{iso_timestamp, Clock};
use crate::error::{FormError, SubmitError};
use crate::store::{KeyValueStore, Record, RecordStore, Table};

pub const MESSAGE_SUBMITTED: &str = "Message submitted successfully ✅";

/// A contact-form submission. Unrelated to bookings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Contact {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub created_at: String,
}

impl Record for Contact {
    const TABLE: Table = Table::Contacts;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl ContactForm {
    /// Name, email and message are required after trimming
    pub fn validate(&self, clock: &dyn Clock) -> Result<Contact, FormError> {
        let name = self.name.trim();
        let email = self.email.trim();
        let message = self.message.trim();
        if name.is_empty() || email.is_empty() || message.is_empty() {
            return Err(FormError::MissingContactFields);
        }
        Ok(Contact {
            name: name.to_string(),
            email: email.to_string(),
            subject: self.subject.trim().to_string(),
            message: message.to_string(),
            created_at: iso_timestamp(clock.timestamp()),
        })
    }
}

pub fn submit_contact<S: KeyValueStore>(
    store: &mut RecordStore<S>,
    form: &mut ContactForm,
    clock: &dyn Clock,
) -> Result<Contact, SubmitError> {
    let contact = form.validate(clock)?;
    store.append(contact.clone())?;
    tracing::info!(email = %contact.email, "contact message saved");
    *form = ContactForm::default();
    Ok(contact)
}
