//! Person: the vertex document of the family tree.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{DocumentMeta, Entity, Error, Result};

// ─── Person ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
  #[serde(rename = "_key", default, skip_serializing_if = "Option::is_none")]
  pub key:        Option<String>,
  #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
  pub id:         Option<String>,
  #[serde(rename = "_rev", default, skip_serializing_if = "Option::is_none")]
  pub rev:        Option<String>,
  #[serde(default)]
  pub first_name: String,
  #[serde(default)]
  pub last_name:  String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub birth_date: Option<DateTime<Utc>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub death_date: Option<DateTime<Utc>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub gender:     Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub email:      Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub phone:      Option<String>,
  /// Set on first persistence; never overwritten afterwards.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub created_at: Option<DateTime<Utc>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub updated_at: Option<DateTime<Utc>>,
}

impl Person {
  /// A transient person with only the required fields set.
  pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
    Self {
      first_name: first_name.into(),
      last_name: last_name.into(),
      ..Self::default()
    }
  }
}

impl Entity for Person {
  fn set_metadata(&mut self, meta: DocumentMeta) {
    self.key = Some(meta.key);
    self.id = Some(meta.id);
    self.rev = Some(meta.rev);
  }

  fn set_timestamps(&mut self, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) {
    self.created_at = Some(created_at);
    self.updated_at = Some(updated_at);
  }

  fn created_at(&self) -> Option<DateTime<Utc>> { self.created_at }

  fn updated_at(&self) -> Option<DateTime<Utc>> { self.updated_at }
}

// ─── Requests ────────────────────────────────────────────────────────────────

/// Input to [`PersonService::create_person`](crate::service::PersonService::create_person).
///
/// Missing fields deserialise as blank so that [`validate`](Self::validate)
/// reports them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonCreateRequest {
  pub first_name: String,
  pub last_name:  String,
  pub birth_date: Option<DateTime<Utc>>,
  pub death_date: Option<DateTime<Utc>>,
  pub gender:     Option<String>,
  pub email:      Option<String>,
  pub phone:      Option<String>,
}

impl PersonCreateRequest {
  pub fn validate(&self) -> Result<()> {
    if self.first_name.trim().is_empty() {
      return Err(Error::validation("firstName is required"));
    }
    if self.last_name.trim().is_empty() {
      return Err(Error::validation("lastName is required"));
    }
    if let Some(email) = non_blank(self.email.as_deref())
      && !is_valid_email(email)
    {
      return Err(Error::validation("invalid email format"));
    }
    Ok(())
  }

  /// Build the transient [`Person`] this request describes, trimming every
  /// string field. Call [`validate`](Self::validate) first.
  pub fn into_person(self) -> Person {
    Person {
      first_name: self.first_name.trim().to_owned(),
      last_name: self.last_name.trim().to_owned(),
      birth_date: self.birth_date,
      death_date: self.death_date,
      gender: trimmed(self.gender),
      email: trimmed(self.email),
      phone: trimmed(self.phone),
      ..Person::default()
    }
  }
}

/// Partial update; absent or blank fields leave the stored value untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonUpdateRequest {
  pub first_name: Option<String>,
  pub last_name:  Option<String>,
  pub birth_date: Option<DateTime<Utc>>,
  pub death_date: Option<DateTime<Utc>>,
  pub gender:     Option<String>,
  pub email:      Option<String>,
  pub phone:      Option<String>,
}

impl PersonUpdateRequest {
  pub fn validate(&self) -> Result<()> {
    if let Some(email) = non_blank(self.email.as_deref())
      && !is_valid_email(email)
    {
      return Err(Error::validation("invalid email format"));
    }
    Ok(())
  }

  /// Copy every non-blank field onto `person`. Identity and timestamps are
  /// not part of the whitelist.
  pub fn apply_to(&self, person: &mut Person) {
    if let Some(v) = non_blank(self.first_name.as_deref()) {
      person.first_name = v.to_owned();
    }
    if let Some(v) = non_blank(self.last_name.as_deref()) {
      person.last_name = v.to_owned();
    }
    if let Some(v) = self.birth_date {
      person.birth_date = Some(v);
    }
    if let Some(v) = self.death_date {
      person.death_date = Some(v);
    }
    if let Some(v) = non_blank(self.gender.as_deref()) {
      person.gender = Some(v.to_owned());
    }
    if let Some(v) = non_blank(self.email.as_deref()) {
      person.email = Some(v.to_owned());
    }
    if let Some(v) = non_blank(self.phone.as_deref()) {
      person.phone = Some(v.to_owned());
    }
  }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// The trimmed value, or `None` if it is absent or only whitespace.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
  value.map(str::trim).filter(|v| !v.is_empty())
}

pub(crate) fn trimmed(value: Option<String>) -> Option<String> {
  non_blank(value.as_deref()).map(str::to_owned)
}

/// Basic shape check: one `@`, something on both sides, a dot in the domain.
pub fn is_valid_email(email: &str) -> bool {
  let mut parts = email.trim().split('@');
  let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next())
  else {
    return false;
  };
  !local.is_empty() && !domain.is_empty() && domain.contains('.')
}
