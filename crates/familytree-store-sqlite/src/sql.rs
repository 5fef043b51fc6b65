//! Rendering of a [`DocumentQuery`] into SQLite SQL.
//!
//! Attribute names come from the query model (validated identifiers) and are
//! the only thing spliced into the statement text. Values are bound as named
//! parameters `:p_<name>`; the collection is bound as `:collection`.

use std::collections::BTreeSet;

use familytree_core::{
  query::{DocumentQuery, Filter},
  store::StoreError,
};
use rusqlite::types::Value as SqlValue;
use serde_json::Value;

/// A statement ready for `prepare` plus its named parameters.
#[derive(Debug)]
pub struct Rendered {
  pub sql:    String,
  pub params: Vec<(String, SqlValue)>,
}

pub fn render(query: &DocumentQuery) -> Result<Rendered, StoreError> {
  query.validate()?;

  let mut sql = String::from(
    "SELECT doc_key, rev, body FROM documents WHERE collection = :collection",
  );
  let mut params = vec![(
    ":collection".to_owned(),
    SqlValue::Text(query.collection().to_owned()),
  )];

  if let Some(filter) = query.filter_ref() {
    sql.push_str(" AND ");
    push_filter(&mut sql, filter);

    // Bind only what the statement references; SQLite rejects unknown names.
    let referenced: BTreeSet<&str> = filter.params().into_iter().collect();
    for name in referenced {
      let value = query.bind_vars().get(name).unwrap_or(&Value::Null);
      params.push((format!(":p_{name}"), to_sql(value)));
    }
  }

  sql.push_str(" ORDER BY rowid");
  Ok(Rendered { sql, params })
}

fn push_filter(sql: &mut String, filter: &Filter) {
  match filter {
    Filter::Eq { attribute, param } => {
      sql.push_str(&format!("{} = :p_{param}", attribute_expr(attribute)));
    }
    Filter::EqUnlessEmpty { attribute, param } => {
      sql.push_str(&format!(
        "(:p_{param} = '' OR {} = :p_{param})",
        attribute_expr(attribute)
      ));
    }
    Filter::Any(branches) => push_group(sql, branches, " OR ", "0"),
    Filter::All(branches) => push_group(sql, branches, " AND ", "1"),
  }
}

fn push_group(sql: &mut String, branches: &[Filter], op: &str, empty: &str) {
  if branches.is_empty() {
    sql.push_str(empty);
    return;
  }
  sql.push('(');
  for (i, branch) in branches.iter().enumerate() {
    if i > 0 {
      sql.push_str(op);
    }
    push_filter(sql, branch);
  }
  sql.push(')');
}

/// Identity attributes live in columns; everything else in the JSON body.
fn attribute_expr(attribute: &str) -> String {
  match attribute {
    "_key" => "doc_key".to_owned(),
    "_rev" => "rev".to_owned(),
    "_id" => "(collection || '/' || doc_key)".to_owned(),
    other => format!("json_extract(body, '$.{other}')"),
  }
}

/// Convert a bind value into what `json_extract` yields for the same JSON.
fn to_sql(value: &Value) -> SqlValue {
  match value {
    Value::Null => SqlValue::Null,
    Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
    Value::Number(n) => match n.as_i64() {
      Some(i) => SqlValue::Integer(i),
      None => SqlValue::Real(n.as_f64().unwrap_or(f64::NAN)),
    },
    Value::String(s) => SqlValue::Text(s.clone()),
    other => SqlValue::Text(other.to_string()),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn scan_has_no_filter() {
    let r = render(&DocumentQuery::scan("persons")).unwrap();
    assert_eq!(
      r.sql,
      "SELECT doc_key, rev, body FROM documents WHERE collection = :collection ORDER BY rowid"
    );
    assert_eq!(r.params.len(), 1);
  }

  #[test]
  fn name_filter_binds_values_out_of_band() {
    let q = DocumentQuery::scan("persons")
      .filter(Filter::eq_unless_empty("firstName", "firstName"))
      .filter(Filter::eq_unless_empty("lastName", "lastName"))
      .bind("firstName", "Ada' OR 1=1 --")
      .bind("lastName", "");
    let r = render(&q).unwrap();

    assert!(r.sql.contains(
      "(:p_firstName = '' OR json_extract(body, '$.firstName') = :p_firstName)"
    ));
    assert!(!r.sql.contains("OR 1=1"));
    assert!(r.params.iter().any(|(n, v)| {
      n == ":p_firstName" && *v == SqlValue::Text("Ada' OR 1=1 --".into())
    }));
  }

  #[test]
  fn system_attributes_map_to_columns() {
    let q = DocumentQuery::scan("relationships")
      .filter(Filter::eq("_key", "k").or(Filter::eq("_from", "k")))
      .bind("k", "1");
    let r = render(&q).unwrap();
    assert!(r.sql.contains("(doc_key = :p_k OR json_extract(body, '$._from') = :p_k)"));
  }

  #[test]
  fn unreferenced_bindings_are_not_passed() {
    let q = DocumentQuery::scan("persons")
      .filter(Filter::eq("firstName", "a"))
      .bind("a", "Ada")
      .bind("unused", "x");
    let r = render(&q).unwrap();
    assert_eq!(r.params.len(), 2);
    assert!(r.params.iter().all(|(n, _)| n != ":p_unused"));
  }

  #[test]
  fn json_scalars_convert_like_json_extract() {
    assert_eq!(to_sql(&Value::Bool(true)), SqlValue::Integer(1));
    assert_eq!(to_sql(&serde_json::json!(3)), SqlValue::Integer(3));
    assert_eq!(to_sql(&serde_json::json!(1.5)), SqlValue::Real(1.5));
    assert_eq!(to_sql(&Value::Null), SqlValue::Null);
  }
}
