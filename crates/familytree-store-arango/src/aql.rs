//! Rendering of a [`DocumentQuery`] into AQL.
//!
//! Produces `FOR doc IN @@collection FILTER ... RETURN doc`. The collection
//! and every filter value travel in `bindVars`; only validated attribute and
//! parameter names end up in the query text.

use std::collections::BTreeSet;

use familytree_core::{
  query::{DocumentQuery, Filter},
  store::StoreError,
};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct Aql {
  pub query:     String,
  pub bind_vars: Map<String, Value>,
}

pub fn render(query: &DocumentQuery) -> Result<Aql, StoreError> {
  query.validate()?;

  let mut text = String::from("FOR doc IN @@collection");
  let mut bind_vars = Map::new();
  bind_vars.insert(
    "@collection".to_owned(),
    Value::String(query.collection().to_owned()),
  );

  if let Some(filter) = query.filter_ref() {
    text.push_str(" FILTER ");
    push_filter(&mut text, filter);

    // ArangoDB rejects declared-but-unused bind parameters.
    let referenced: BTreeSet<&str> = filter.params().into_iter().collect();
    for name in referenced {
      let value = query.bind_vars().get(name).cloned().unwrap_or(Value::Null);
      bind_vars.insert(name.to_owned(), value);
    }
  }

  text.push_str(" RETURN doc");
  Ok(Aql { query: text, bind_vars })
}

fn push_filter(text: &mut String, filter: &Filter) {
  match filter {
    Filter::Eq { attribute, param } => {
      text.push_str(&format!("doc.{attribute} == @{param}"));
    }
    Filter::EqUnlessEmpty { attribute, param } => {
      text.push_str(&format!("(@{param} == \"\" || doc.{attribute} == @{param})"));
    }
    Filter::Any(branches) => push_group(text, branches, " || ", "false"),
    Filter::All(branches) => push_group(text, branches, " && ", "true"),
  }
}

fn push_group(text: &mut String, branches: &[Filter], op: &str, empty: &str) {
  if branches.is_empty() {
    text.push_str(empty);
    return;
  }
  text.push('(');
  for (i, branch) in branches.iter().enumerate() {
    if i > 0 {
      text.push_str(op);
    }
    push_filter(text, branch);
  }
  text.push(')');
}
