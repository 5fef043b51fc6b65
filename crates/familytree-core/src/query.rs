//! A small, backend-neutral query model for collection scans.
//!
//! Attribute and parameter names are `&'static str`: query source is only
//! ever assembled from program constants, and every caller-supplied value
//! travels as a named bind variable. Backends render a [`DocumentQuery`] into
//! their own language (AQL, SQL) without looking at the bound values.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::store::StoreError;

// ─── Filter ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
  /// `doc.<attribute> == @<param>`
  Eq {
    attribute: &'static str,
    param:     &'static str,
  },
  /// Like [`Filter::Eq`], but passes every document when the bound value is
  /// the empty string.
  EqUnlessEmpty {
    attribute: &'static str,
    param:     &'static str,
  },
  /// Matches when any branch matches; an empty list matches nothing.
  Any(Vec<Filter>),
  /// Matches when every branch matches; an empty list matches everything.
  All(Vec<Filter>),
}

impl Filter {
  pub fn eq(attribute: &'static str, param: &'static str) -> Self {
    Self::Eq { attribute, param }
  }

  pub fn eq_unless_empty(attribute: &'static str, param: &'static str) -> Self {
    Self::EqUnlessEmpty { attribute, param }
  }

  pub fn or(self, other: Filter) -> Self {
    match self {
      Self::Any(mut branches) => {
        branches.push(other);
        Self::Any(branches)
      }
      first => Self::Any(vec![first, other]),
    }
  }

  pub fn and(self, other: Filter) -> Self {
    match self {
      Self::All(mut branches) => {
        branches.push(other);
        Self::All(branches)
      }
      first => Self::All(vec![first, other]),
    }
  }

  /// Every parameter name referenced anywhere in the tree, in order.
  pub fn params(&self) -> Vec<&'static str> {
    let mut out = Vec::new();
    self.visit(&mut |f| match f {
      Self::Eq { param, .. } | Self::EqUnlessEmpty { param, .. } => out.push(*param),
      Self::Any(_) | Self::All(_) => {}
    });
    out
  }

  /// Every attribute name referenced anywhere in the tree, in order.
  pub fn attributes(&self) -> Vec<&'static str> {
    let mut out = Vec::new();
    self.visit(&mut |f| match f {
      Self::Eq { attribute, .. } | Self::EqUnlessEmpty { attribute, .. } => {
        out.push(*attribute)
      }
      Self::Any(_) | Self::All(_) => {}
    });
    out
  }

  fn visit(&self, f: &mut impl FnMut(&Filter)) {
    f(self);
    if let Self::Any(branches) | Self::All(branches) = self {
      for branch in branches {
        branch.visit(f);
      }
    }
  }
}

// ─── DocumentQuery ───────────────────────────────────────────────────────────

/// "Every document in `collection` matching `filter`".
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentQuery {
  collection: &'static str,
  filter:     Option<Filter>,
  bind_vars:  BTreeMap<String, Value>,
}

impl DocumentQuery {
  /// A full scan of `collection`.
  pub fn scan(collection: &'static str) -> Self {
    Self { collection, filter: None, bind_vars: BTreeMap::new() }
  }

  /// Add a filter; successive calls are combined with [`Filter::and`].
  pub fn filter(mut self, filter: Filter) -> Self {
    self.filter = Some(match self.filter.take() {
      Some(existing) => existing.and(filter),
      None => filter,
    });
    self
  }

  pub fn bind(mut self, param: &'static str, value: impl Into<Value>) -> Self {
    self.bind_vars.insert(param.to_owned(), value.into());
    self
  }

  pub fn collection(&self) -> &'static str { self.collection }

  pub fn filter_ref(&self) -> Option<&Filter> { self.filter.as_ref() }

  pub fn bind_vars(&self) -> &BTreeMap<String, Value> { &self.bind_vars }

  /// Reject queries a backend must not render: non-identifier names, or a
  /// referenced parameter without a binding.
  pub fn validate(&self) -> Result<(), StoreError> {
    if !is_identifier(self.collection) {
      return Err(StoreError::InvalidQuery(format!(
        "invalid collection name {:?}",
        self.collection
      )));
    }
    let Some(filter) = &self.filter else {
      return Ok(());
    };
    for attribute in filter.attributes() {
      if !is_identifier(attribute) {
        return Err(StoreError::InvalidQuery(format!(
          "invalid attribute name {attribute:?}"
        )));
      }
    }
    for param in filter.params() {
      if !is_identifier(param) {
        return Err(StoreError::InvalidQuery(format!(
          "invalid parameter name {param:?}"
        )));
      }
      if !self.bind_vars.contains_key(param) {
        return Err(StoreError::InvalidQuery(format!(
          "parameter @{param} is not bound"
        )));
      }
    }
    Ok(())
  }
}

/// ASCII letter or `_`, followed by ASCII alphanumerics or `_`.
pub fn is_identifier(name: &str) -> bool {
  let mut chars = name.chars();
  matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
    && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
  use super::*;

  fn by_name() -> DocumentQuery {
    DocumentQuery::scan("persons")
      .filter(Filter::eq_unless_empty("firstName", "firstName"))
      .filter(Filter::eq_unless_empty("lastName", "lastName"))
  }

  #[test]
  fn successive_filters_are_conjoined() {
    let q = by_name();
    assert_eq!(
      q.filter_ref(),
      Some(&Filter::All(vec![
        Filter::eq_unless_empty("firstName", "firstName"),
        Filter::eq_unless_empty("lastName", "lastName"),
      ]))
    );
  }

  #[test]
  fn unbound_parameter_is_rejected() {
    let err = by_name().bind("firstName", "Ada").validate().unwrap_err();
    assert!(matches!(err, StoreError::InvalidQuery(ref m) if m.contains("lastName")));
    assert!(by_name().bind("firstName", "").bind("lastName", "").validate().is_ok());
  }

  #[test]
  fn odd_names_are_rejected() {
    let q = DocumentQuery::scan("persons")
      .filter(Filter::eq("name) || true", "p"))
      .bind("p", 1);
    assert!(q.validate().is_err());
    assert!(DocumentQuery::scan("per sons").validate().is_err());
    assert!(DocumentQuery::scan("persons").validate().is_ok());
  }

  #[test]
  fn identifiers() {
    assert!(is_identifier("_from"));
    assert!(is_identifier("relationType"));
    assert!(!is_identifier(""));
    assert!(!is_identifier("1abc"));
    assert!(!is_identifier("a.b"));
  }

  #[test]
  fn or_flattens() {
    let f = Filter::eq("_from", "p").or(Filter::eq("_to", "p")).or(Filter::eq("x", "p"));
    let Filter::Any(branches) = f else { panic!("expected Any") };
    assert_eq!(branches.len(), 3);
  }
}
