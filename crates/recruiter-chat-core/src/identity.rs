//! Visitor identity capture.
//!
//! The identity form gates the conversation: nothing can be sent until all
//! three fields are filled in and the contact looks like an email address.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One of the three identity form fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityField {
    /// Visitor's name.
    VisitorName,
    /// Company or organisation the visitor represents.
    Affiliation,
    /// Contact address (email).
    Contact,
}

impl IdentityField {
    /// Fields in form order.
    pub const ALL: [Self; 3] = [Self::VisitorName, Self::Affiliation, Self::Contact];

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::VisitorName => "Name",
            Self::Affiliation => "Company",
            Self::Contact => "Email",
        }
    }
}

impl std::fmt::Display for IdentityField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Identity capture error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// A field is empty or whitespace only.
    #[error("{0} is required")]
    MissingField(IdentityField),
    /// The contact is not email-shaped.
    #[error("Email must look like name@example.com")]
    InvalidContact,
    /// The form was already submitted successfully.
    #[error("Identity already captured")]
    AlreadyCaptured,
}

/// Raw identity form contents, edited field by field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityFields {
    /// Visitor's name as typed.
    pub visitor_name: String,
    /// Company as typed.
    pub affiliation: String,
    /// Email as typed.
    pub contact: String,
}

impl IdentityFields {
    /// Create form contents from the three values.
    #[must_use]
    pub fn new(
        visitor_name: impl Into<String>,
        affiliation: impl Into<String>,
        contact: impl Into<String>,
    ) -> Self {
        Self {
            visitor_name: visitor_name.into(),
            affiliation: affiliation.into(),
            contact: contact.into(),
        }
    }

    /// Get a field value.
    #[must_use]
    pub fn get(&self, field: IdentityField) -> &str {
        match field {
            IdentityField::VisitorName => &self.visitor_name,
            IdentityField::Affiliation => &self.affiliation,
            IdentityField::Contact => &self.contact,
        }
    }

    /// Replace a field value.
    pub fn set(&mut self, field: IdentityField, value: impl Into<String>) {
        let slot = match field {
            IdentityField::VisitorName => &mut self.visitor_name,
            IdentityField::Affiliation => &mut self.affiliation,
            IdentityField::Contact => &mut self.contact,
        };
        *slot = value.into();
    }
}

/// Validated, immutable visitor identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIdentity {
    visitor_name: String,
    affiliation: String,
    contact: String,
}

impl SessionIdentity {
    /// Validate form contents into an identity.
    ///
    /// Values are kept exactly as entered; only the checks trim.
    ///
    /// # Errors
    /// Returns the first empty field in form order, or
    /// [`IdentityError::InvalidContact`] if the contact is not email-shaped.
    pub fn new(fields: IdentityFields) -> Result<Self, IdentityError> {
        if let Some(field) = IdentityField::ALL
            .into_iter()
            .find(|f| fields.get(*f).trim().is_empty())
        {
            return Err(IdentityError::MissingField(field));
        }
        if !is_email_shaped(fields.contact.trim()) {
            return Err(IdentityError::InvalidContact);
        }

        Ok(Self {
            visitor_name: fields.visitor_name,
            affiliation: fields.affiliation,
            contact: fields.contact,
        })
    }

    #[must_use]
    pub fn visitor_name(&self) -> &str {
        &self.visitor_name
    }

    #[must_use]
    pub fn affiliation(&self) -> &str {
        &self.affiliation
    }

    #[must_use]
    pub fn contact(&self) -> &str {
        &self.contact
    }
}

fn is_email_shaped(s: &str) -> bool {
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !s.contains(char::is_whitespace)
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

/// Identity form state machine.
///
/// Collects field edits until a successful [`submit`](Self::submit), after
/// which the form is closed for the rest of the session.
#[derive(Debug, Default)]
pub struct IdentityCapture {
    fields: IdentityFields,
    captured: Option<SessionIdentity>,
}

impl IdentityCapture {
    /// Create an empty, open form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current form contents.
    #[must_use]
    pub const fn fields(&self) -> &IdentityFields {
        &self.fields
    }

    /// Whether the form is still waiting for a valid submission.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.captured.is_none()
    }

    /// The captured identity, once complete.
    #[must_use]
    pub const fn identity(&self) -> Option<&SessionIdentity> {
        self.captured.as_ref()
    }

    /// Update one field. Ignored once the form is closed.
    pub fn set_field(&mut self, field: IdentityField, value: impl Into<String>) {
        if self.is_open() {
            self.fields.set(field, value);
        }
    }

    /// Validate the current contents without closing the form.
    ///
    /// # Errors
    /// Returns a validation error, or [`IdentityError::AlreadyCaptured`] if
    /// capture already completed.
    pub fn validate(&self) -> Result<SessionIdentity, IdentityError> {
        if !self.is_open() {
            return Err(IdentityError::AlreadyCaptured);
        }
        SessionIdentity::new(self.fields.clone())
    }

    /// Validate the current contents and close the form on success.
    ///
    /// # Errors
    /// Returns a validation error and keeps the form open, or
    /// [`IdentityError::AlreadyCaptured`] if capture already completed.
    pub fn submit(&mut self) -> Result<&SessionIdentity, IdentityError> {
        let identity = self.validate()?;
        tracing::info!(affiliation = identity.affiliation(), "identity captured");
        Ok(self.captured.insert(identity))
    }
}
