//! Relationship: the edge document connecting two persons.
//!
//! The relationship type is stored as a plain string so that documents
//! written before (or around) validation still load; [`RelationType`] is the
//! closed set enforced when a relationship is created.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

use crate::{
  DocumentMeta, Entity, Error, Result,
  person::{non_blank, trimmed},
};

// ─── RelationType ────────────────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
  EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RelationType {
  Parent,
  Child,
  Spouse,
  Sibling,
}

impl RelationType {
  /// Parse a caller-supplied type name, rejecting anything outside the set.
  pub fn parse(value: &str) -> Result<Self> {
    value.parse().map_err(|_| {
      let valid: Vec<String> = Self::iter().map(|t| t.to_string()).collect();
      Error::validation(format!(
        "invalid relationship type: {value}. Valid types are: {}",
        valid.join(", ")
      ))
    })
  }
}

// ─── Relationship ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
  #[serde(rename = "_key", default, skip_serializing_if = "Option::is_none")]
  pub key:           Option<String>,
  #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
  pub id:            Option<String>,
  #[serde(rename = "_rev", default, skip_serializing_if = "Option::is_none")]
  pub rev:           Option<String>,
  /// Document id of the source person, e.g. `persons/123`.
  #[serde(rename = "_from", default)]
  pub from:          String,
  /// Document id of the target person.
  #[serde(rename = "_to", default)]
  pub to:            String,
  #[serde(default)]
  pub relation_type: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub start_date:    Option<DateTime<Utc>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub end_date:      Option<DateTime<Utc>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub notes:         Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub created_at:    Option<DateTime<Utc>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub updated_at:    Option<DateTime<Utc>>,
}

impl Relationship {
  pub fn new(
    from: impl Into<String>,
    to: impl Into<String>,
    relation_type: RelationType,
  ) -> Self {
    Self {
      from: from.into(),
      to: to.into(),
      relation_type: relation_type.to_string(),
      ..Self::default()
    }
  }
}

impl Entity for Relationship {
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

/// Missing fields deserialise as blank so that [`validate`](Self::validate)
/// reports them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RelationshipCreateRequest {
  pub from:          String,
  pub to:            String,
  pub relation_type: String,
  pub start_date:    Option<DateTime<Utc>>,
  pub end_date:      Option<DateTime<Utc>>,
  pub notes:         Option<String>,
}

impl RelationshipCreateRequest {
  pub fn validate(&self) -> Result<()> {
    let from = self.from.trim();
    let to = self.to.trim();
    if from.is_empty() {
      return Err(Error::validation("from is required"));
    }
    if to.is_empty() {
      return Err(Error::validation("to is required"));
    }
    if self.relation_type.trim().is_empty() {
      return Err(Error::validation("relationType is required"));
    }
    if from == to {
      return Err(Error::validation("from and to must be different persons"));
    }
    RelationType::parse(self.relation_type.trim())?;
    Ok(())
  }

  /// Build the transient [`Relationship`]. Call [`validate`](Self::validate)
  /// first.
  pub fn into_relationship(self) -> Relationship {
    Relationship {
      from: self.from.trim().to_owned(),
      to: self.to.trim().to_owned(),
      relation_type: self.relation_type.trim().to_owned(),
      start_date: self.start_date,
      end_date: self.end_date,
      notes: trimmed(self.notes),
      ..Relationship::default()
    }
  }
}

/// Partial update; absent or blank fields leave the stored value untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipUpdateRequest {
  pub from:          Option<String>,
  pub to:            Option<String>,
  pub relation_type: Option<String>,
  pub start_date:    Option<DateTime<Utc>>,
  pub end_date:      Option<DateTime<Utc>>,
  pub notes:         Option<String>,
}

impl RelationshipUpdateRequest {
  /// Checks that need no stored state: a supplied type must be known and
  /// supplied endpoints must differ.
  pub fn validate(&self) -> Result<()> {
    if let Some(kind) = non_blank(self.relation_type.as_deref()) {
      RelationType::parse(kind)?;
    }
    if let (Some(from), Some(to)) =
      (non_blank(self.from.as_deref()), non_blank(self.to.as_deref()))
      && from == to
    {
      return Err(Error::validation("from and to must be different persons"));
    }
    Ok(())
  }

  /// Copy every non-blank field onto `relationship`, then re-check that the
  /// endpoints still differ.
  pub fn apply_to(&self, relationship: &mut Relationship) -> Result<()> {
    let mut next = relationship.clone();
    if let Some(v) = non_blank(self.from.as_deref()) {
      next.from = v.to_owned();
    }
    if let Some(v) = non_blank(self.to.as_deref()) {
      next.to = v.to_owned();
    }
    if let Some(v) = non_blank(self.relation_type.as_deref()) {
      next.relation_type = v.to_owned();
    }
    if let Some(v) = self.start_date {
      next.start_date = Some(v);
    }
    if let Some(v) = self.end_date {
      next.end_date = Some(v);
    }
    if let Some(v) = non_blank(self.notes.as_deref()) {
      next.notes = Some(v.to_owned());
    }
    if next.from == next.to {
      return Err(Error::validation("from and to must be different persons"));
    }
    *relationship = next;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn request(from: &str, to: &str, kind: &str) -> RelationshipCreateRequest {
    RelationshipCreateRequest {
      from: from.into(),
      to: to.into(),
      relation_type: kind.into(),
      ..Default::default()
    }
  }

  #[test]
  fn relation_type_names_are_lowercase() {
    assert_eq!(RelationType::Sibling.to_string(), "sibling");
    assert_eq!(RelationType::parse("spouse").unwrap(), RelationType::Spouse);
    assert_eq!(
      serde_json::to_value(RelationType::Parent).unwrap(),
      serde_json::json!("parent")
    );
  }

  #[test]
  fn unknown_relation_type_lists_valid_ones() {
    let err = RelationType::parse("mentor").unwrap_err();
    let msg = err.to_string();
    assert!(err.is_validation());
    assert!(msg.contains("mentor"));
    assert!(msg.contains("parent, child, spouse, sibling"), "{msg}");
  }

  #[test]
  fn create_request_rules() {
    assert!(request("persons/1", "persons/2", "parent").validate().is_ok());
    assert!(request("", "persons/2", "parent").validate().is_err());
    assert!(request("persons/1", " ", "parent").validate().is_err());
    assert!(request("persons/1", "persons/2", "").validate().is_err());
    assert!(request("persons/1", "persons/1", "parent").validate().is_err());
    assert!(request("persons/1", " persons/1 ", "parent").validate().is_err());
    assert!(request("persons/1", "persons/2", "mentor").validate().is_err());
  }

  #[test]
  fn edge_endpoints_serialise_as_system_attributes() {
    let rel = Relationship::new("persons/1", "persons/2", RelationType::Child);
    let json = serde_json::to_value(&rel).unwrap();
    assert_eq!(json["_from"], "persons/1");
    assert_eq!(json["_to"], "persons/2");
    assert_eq!(json["relationType"], "child");
    assert!(json.get("_key").is_none());
  }

  #[test]
  fn legacy_type_strings_still_deserialise() {
    let rel: Relationship = serde_json::from_value(serde_json::json!({
      "_key": "9", "_id": "relationships/9", "_rev": "r1",
      "_from": "persons/1", "_to": "persons/2",
      "relationType": "godparent"
    }))
    .unwrap();
    assert_eq!(rel.relation_type, "godparent");
    assert_eq!(rel.key.as_deref(), Some("9"));
  }

  #[test]
  fn update_rejects_collapsing_endpoints() {
    let mut rel = Relationship::new("persons/1", "persons/2", RelationType::Spouse);
    let update = RelationshipUpdateRequest {
      to: Some("persons/1".into()),
      ..Default::default()
    };
    assert!(update.validate().is_ok());
    assert!(update.apply_to(&mut rel).is_err());
    assert_eq!(rel.to, "persons/2");
  }

  #[test]
  fn update_applies_whitelisted_fields() {
    let mut rel = Relationship::new("persons/1", "persons/2", RelationType::Spouse);
    RelationshipUpdateRequest {
      relation_type: Some("sibling".into()),
      notes: Some(" twins ".into()),
      from: Some("".into()),
      ..Default::default()
    }
    .apply_to(&mut rel)
    .unwrap();
    assert_eq!(rel.relation_type, "sibling");
    assert_eq!(rel.notes.as_deref(), Some("twins"));
    assert_eq!(rel.from, "persons/1");
  }
}
