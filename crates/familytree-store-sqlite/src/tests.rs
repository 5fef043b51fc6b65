//! Integration tests for `SqliteStore` and the repositories and services
//! running on top of it, against an in-memory database.

use std::sync::Arc;

use chrono::{TimeDelta, Utc};
use familytree_core::{
  Entity, Error, OpContext,
  person::{Person, PersonCreateRequest, PersonUpdateRequest},
  query::{DocumentQuery, Filter},
  relationship::{RelationType, Relationship, RelationshipCreateRequest, RelationshipUpdateRequest},
  repository::{PersonRepository, RelationshipRepository, Repository},
  service::{PersonService, RelationshipService},
  store::{CollectionKind, DocumentStore, PERSONS, RELATIONSHIPS, StoreError},
};
use serde_json::json;

use crate::SqliteStore;

async fn store() -> Arc<SqliteStore> {
  Arc::new(
    SqliteStore::open_in_memory()
      .await
      .expect("in-memory store"),
  )
}

fn ctx() -> OpContext { OpContext::new() }

fn person_request(first: &str, last: &str) -> PersonCreateRequest {
  PersonCreateRequest {
    first_name: first.into(),
    last_name: last.into(),
    ..Default::default()
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn required_collections_exist_after_open() {
  let s = store().await;
  s.ping().await.unwrap();
  assert!(s.query(&DocumentQuery::scan(PERSONS)).await.unwrap().is_empty());
  assert!(s.query(&DocumentQuery::scan(RELATIONSHIPS)).await.unwrap().is_empty());
}

#[tokio::test]
async fn ensure_collection_is_idempotent() {
  let s = store().await;
  s.ensure_collection("notes", CollectionKind::Document).await.unwrap();
  s.ensure_collection("notes", CollectionKind::Document).await.unwrap();
  s.ensure_collection(PERSONS, CollectionKind::Document).await.unwrap();
}

#[tokio::test]
async fn ensure_collection_kind_mismatch_is_conflict() {
  let s = store().await;
  let err = s
    .ensure_collection(PERSONS, CollectionKind::Edge)
    .await
    .unwrap_err();
  assert!(matches!(err, StoreError::Conflict(_)));
}

#[tokio::test]
async fn store_assigns_identity_and_strips_client_supplied_one() {
  let s = store().await;
  let meta = s
    .create_document(PERSONS, json!({"_key": "mine", "_rev": "x", "firstName": "Ada"}))
    .await
    .unwrap();
  assert_ne!(meta.key, "mine");
  assert_eq!(meta.id, format!("persons/{}", meta.key));

  let doc = s.read_document(PERSONS, &meta.key).await.unwrap();
  assert_eq!(doc.meta, meta);
  assert_eq!(doc.body["_key"], json!(meta.key));
  assert_eq!(doc.body["_rev"], json!(meta.rev));
  assert_eq!(doc.body["firstName"], json!("Ada"));
}

#[tokio::test]
async fn edge_collection_rejects_documents_without_endpoints() {
  let s = store().await;
  let err = s
    .create_document(RELATIONSHIPS, json!({"relationType": "sibling"}))
    .await
    .unwrap_err();
  assert!(matches!(err, StoreError::Rejected(_)));
}

#[tokio::test]
async fn unknown_collection_is_reported() {
  let s = store().await;
  let err = s.create_document("ghosts", json!({})).await.unwrap_err();
  assert!(matches!(err, StoreError::UnknownCollection(ref c) if c == "ghosts"));
}

#[tokio::test]
async fn replace_and_remove_missing_document_are_not_found() {
  let s = store().await;
  let err = s.replace_document(PERSONS, "nope", json!({})).await.unwrap_err();
  assert!(matches!(err, StoreError::NotFound));
  let err = s.remove_document(PERSONS, "nope").await.unwrap_err();
  assert!(matches!(err, StoreError::NotFound));
}

#[tokio::test]
async fn query_values_are_never_interpreted_as_sql() {
  let s = store().await;
  s.create_document(PERSONS, json!({"firstName": "Ada"})).await.unwrap();

  let q = DocumentQuery::scan(PERSONS)
    .filter(Filter::eq("firstName", "name"))
    .bind("name", "x' OR '1'='1");
  assert!(s.query(&q).await.unwrap().is_empty());
}

// ─── Repository ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_then_get_round_trips() {
  let repo = PersonRepository::new(store().await);
  let mut person = Person::new("Ada", "Lovelace");
  person.email = Some("ada@example.com".into());

  repo.create(&ctx(), &mut person).await.unwrap();
  assert!(person.key.is_some() && person.id.is_some() && person.rev.is_some());
  assert_eq!(person.created_at, person.updated_at);

  let fetched = repo.get_by_id(&ctx(), person.key.as_deref().unwrap()).await.unwrap();
  assert_eq!(fetched, person);

  let by_full_id = repo.get_by_id(&ctx(), person.id.as_deref().unwrap()).await.unwrap();
  assert_eq!(by_full_id, person);
}

#[tokio::test]
async fn update_preserves_created_at_and_changes_revision() {
  let repo = PersonRepository::new(store().await);
  let mut person = Person::new("Ada", "Lovelace");
  repo.create(&ctx(), &mut person).await.unwrap();

  let created_at = person.created_at;
  let first_updated = person.updated_at;
  let first_rev = person.rev.clone();
  let id = person.id.clone().unwrap();

  person.last_name = "King".into();
  repo.update(&ctx(), &id, &mut person).await.unwrap();

  assert_eq!(person.created_at, created_at);
  assert!(person.updated_at > first_updated);
  assert_ne!(person.rev, first_rev);

  let fetched = repo.get_by_id(&ctx(), &id).await.unwrap();
  assert_eq!(fetched.last_name, "King");
  assert_eq!(fetched.rev, person.rev);
}

#[tokio::test]
async fn update_with_future_timestamp_still_advances() {
  let repo = PersonRepository::new(store().await);
  let mut person = Person::new("Ada", "Lovelace");
  repo.create(&ctx(), &mut person).await.unwrap();

  let ahead = Utc::now() + TimeDelta::hours(1);
  person.set_timestamps(ahead, ahead);
  let id = person.key.clone().unwrap();
  repo.update(&ctx(), &id, &mut person).await.unwrap();

  assert_eq!(person.created_at, Some(ahead));
  assert!(person.updated_at > Some(ahead));
}

#[tokio::test]
async fn delete_then_get_is_not_found() {
  let repo = PersonRepository::new(store().await);
  let mut person = Person::new("Ada", "Lovelace");
  repo.create(&ctx(), &mut person).await.unwrap();
  let id = person.id.clone().unwrap();

  repo.delete(&ctx(), &id).await.unwrap();
  let err = repo.get_by_id(&ctx(), &id).await.unwrap_err();
  assert!(err.is_not_found(), "{err}");

  let err = repo.delete(&ctx(), &id).await.unwrap_err();
  assert!(err.is_not_found(), "{err}");
}

#[tokio::test]
async fn update_missing_document_is_not_found() {
  let repo = PersonRepository::new(store().await);
  let mut person = Person::new("Ada", "Lovelace");
  let before = person.clone();

  let err = repo.update(&ctx(), "missing", &mut person).await.unwrap_err();
  assert!(err.is_not_found(), "{err}");
  assert_eq!(person, before);
}

#[tokio::test]
async fn id_from_another_collection_is_not_found() {
  let repo = PersonRepository::new(store().await);
  let err = repo.get_by_id(&ctx(), "relationships/123").await.unwrap_err();
  assert!(err.is_not_found(), "{err}");
}

#[tokio::test]
async fn list_on_empty_collection_is_empty() {
  let repo = PersonRepository::new(store().await);
  let all = repo.list(&ctx()).await.unwrap();
  assert!(all.is_empty());
}

#[tokio::test]
async fn partial_documents_still_load_in_lookups() {
  let s = store().await;
  let persons = PersonRepository::new(Arc::clone(&s));
  let relationships = RelationshipRepository::new(Arc::clone(&s));

  persons.create(&ctx(), &mut Person::new("Ada", "Lovelace")).await.unwrap();
  s.create_document(PERSONS, json!({"firstName": "Legacy"})).await.unwrap();
  s.create_document(RELATIONSHIPS, json!({"_from": "persons/1", "_to": "persons/2"}))
    .await
    .unwrap();

  let all = persons.list(&ctx()).await.unwrap();
  assert_eq!(all.len(), 2);
  let legacy = persons.find_by_name(&ctx(), "Legacy", "").await.unwrap();
  assert_eq!(legacy.len(), 1);
  assert_eq!(legacy[0].last_name, "");
  assert!(legacy[0].key.is_some());

  let edges = relationships.find_by_person(&ctx(), "persons/1").await.unwrap();
  assert_eq!(edges.len(), 1);
  assert_eq!(edges[0].relation_type, "");
  assert_eq!(relationships.list(&ctx()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn find_by_name_treats_empty_as_wildcard() {
  let repo = PersonRepository::new(store().await);
  for (first, last) in [("Ada", "Lovelace"), ("Ada", "Byron"), ("Charles", "Babbage")] {
    repo.create(&ctx(), &mut Person::new(first, last)).await.unwrap();
  }

  assert_eq!(repo.find_by_name(&ctx(), "", "").await.unwrap().len(), 3);

  let adas = repo.find_by_name(&ctx(), "Ada", "").await.unwrap();
  assert_eq!(adas.len(), 2);
  assert!(adas.iter().all(|p| p.first_name == "Ada"));

  let byron = repo.find_by_name(&ctx(), "Ada", "Byron").await.unwrap();
  assert_eq!(byron.len(), 1);
  assert_eq!(byron[0].last_name, "Byron");

  assert!(repo.find_by_name(&ctx(), "", "Nobody").await.unwrap().is_empty());
}

#[tokio::test]
async fn find_by_person_matches_either_endpoint_only() {
  let s = store().await;
  let persons = PersonRepository::new(Arc::clone(&s));
  let relationships = RelationshipRepository::new(s);

  let mut ids = Vec::new();
  for first in ["A", "B", "C"] {
    let mut p = Person::new(first, "X");
    persons.create(&ctx(), &mut p).await.unwrap();
    ids.push(p.id.unwrap());
  }

  let mut ab = Relationship::new(&ids[0], &ids[1], RelationType::Parent);
  let mut bc = Relationship::new(&ids[1], &ids[2], RelationType::Parent);
  relationships.create(&ctx(), &mut ab).await.unwrap();
  relationships.create(&ctx(), &mut bc).await.unwrap();

  let for_a = relationships.find_by_person(&ctx(), &ids[0]).await.unwrap();
  assert_eq!(for_a, vec![ab.clone()]);

  let for_b = relationships.find_by_person(&ctx(), &ids[1]).await.unwrap();
  assert_eq!(for_b.len(), 2);

  let for_c = relationships.find_by_person(&ctx(), &ids[2]).await.unwrap();
  assert_eq!(for_c, vec![bc]);
}

#[tokio::test]
async fn cancelled_context_never_reaches_store() {
  let repo = PersonRepository::new(store().await);
  let ctx = OpContext::new();
  ctx.cancel();

  let mut person = Person::new("Ada", "Lovelace");
  let err = repo.create(&ctx, &mut person).await.unwrap_err();
  assert!(matches!(err, Error::Cancelled));
  assert!(person.key.is_none());
  assert!(person.created_at.is_none());

  assert!(repo.list(&OpContext::new()).await.unwrap().is_empty());
}

// ─── Services ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn sibling_scenario() {
  let s = store().await;
  let people = PersonService::from_store(Arc::clone(&s));
  let relationships = RelationshipService::from_store(s);

  let ada = people.create_person(&ctx(), person_request("Ada", "Lovelace")).await.unwrap();
  let charles = people
    .create_person(&ctx(), person_request("Charles", "Babbage"))
    .await
    .unwrap();
  let a_id = ada.id.clone().unwrap();
  let b_id = charles.id.clone().unwrap();

  let rel = relationships
    .create_relationship(&ctx(), RelationshipCreateRequest {
      from: a_id.clone(),
      to: b_id.clone(),
      relation_type: "sibling".into(),
      ..Default::default()
    })
    .await
    .unwrap();

  assert_eq!(relationships.relationships_for_person(&ctx(), &a_id).await.unwrap(), vec![rel.clone()]);
  assert_eq!(relationships.relationships_for_person(&ctx(), &b_id).await.unwrap(), vec![rel.clone()]);
  assert_eq!(relationships.relationships_by_type(&ctx(), "sibling").await.unwrap(), vec![rel]);
  assert!(relationships.relationships_by_type(&ctx(), "spouse").await.unwrap().is_empty());
}

#[tokio::test]
async fn invalid_relationships_fail_validation_before_store() {
  let s = store().await;
  let relationships = RelationshipService::from_store(Arc::clone(&s));

  let same = RelationshipCreateRequest {
    from: "persons/1".into(),
    to: " persons/1 ".into(),
    relation_type: "sibling".into(),
    ..Default::default()
  };
  let err = relationships.create_relationship(&ctx(), same).await.unwrap_err();
  assert!(err.is_validation(), "{err}");

  let mentor = RelationshipCreateRequest {
    from: "persons/1".into(),
    to: "persons/2".into(),
    relation_type: "mentor".into(),
    ..Default::default()
  };
  let err = relationships.create_relationship(&ctx(), mentor).await.unwrap_err();
  assert!(err.is_validation(), "{err}");

  assert!(relationships.list_relationships(&ctx()).await.unwrap().is_empty());
}

#[tokio::test]
async fn person_update_only_touches_supplied_fields() {
  let people = PersonService::from_store(store().await);
  let mut req = person_request("Ada", "Lovelace");
  req.phone = Some("555".into());
  let ada = people.create_person(&ctx(), req).await.unwrap();
  let id = ada.key.clone().unwrap();

  let updated = people
    .update_person(&ctx(), &id, PersonUpdateRequest {
      last_name: Some("King".into()),
      first_name: Some("   ".into()),
      ..Default::default()
    })
    .await
    .unwrap();

  assert_eq!(updated.first_name, "Ada");
  assert_eq!(updated.last_name, "King");
  assert_eq!(updated.phone.as_deref(), Some("555"));
  assert_eq!(updated.created_at, ada.created_at);
  assert_ne!(updated.rev, ada.rev);
}

#[tokio::test]
async fn person_service_rejects_blank_id_and_bad_email() {
  let people = PersonService::from_store(store().await);

  let err = people.get_person(&ctx(), "  ").await.unwrap_err();
  assert!(err.is_validation(), "{err}");

  let mut req = person_request("Ada", "Lovelace");
  req.email = Some("not-an-email".into());
  let err = people.create_person(&ctx(), req).await.unwrap_err();
  assert!(err.is_validation(), "{err}");
}

#[tokio::test]
async fn search_trims_names() {
  let people = PersonService::from_store(store().await);
  people.create_person(&ctx(), person_request("Ada", "Lovelace")).await.unwrap();
  people.create_person(&ctx(), person_request("Charles", "Babbage")).await.unwrap();

  let found = people.search_persons_by_name(&ctx(), "  Ada ", " ").await.unwrap();
  assert_eq!(found.len(), 1);
  assert_eq!(found[0].last_name, "Lovelace");
}

#[tokio::test]
async fn relationship_update_cannot_join_person_to_itself() {
  let relationships = RelationshipService::from_store(store().await);
  let rel = relationships
    .create_relationship(&ctx(), RelationshipCreateRequest {
      from: "persons/a".into(),
      to: "persons/b".into(),
      relation_type: "spouse".into(),
      ..Default::default()
    })
    .await
    .unwrap();
  let id = rel.key.clone().unwrap();

  let err = relationships
    .update_relationship(&ctx(), &id, RelationshipUpdateRequest {
      to: Some("persons/a".into()),
      ..Default::default()
    })
    .await
    .unwrap_err();
  assert!(err.is_validation(), "{err}");

  let updated = relationships
    .update_relationship(&ctx(), &id, RelationshipUpdateRequest {
      notes: Some("married 1835".into()),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(updated.notes.as_deref(), Some("married 1835"));
  assert_eq!(updated.relation_type, "spouse");
}

#[tokio::test]
async fn deleting_a_person_leaves_relationships() {
  let s = store().await;
  let people = PersonService::from_store(Arc::clone(&s));
  let relationships = RelationshipService::from_store(s);

  let ada = people.create_person(&ctx(), person_request("Ada", "Lovelace")).await.unwrap();
  let charles = people
    .create_person(&ctx(), person_request("Charles", "Babbage"))
    .await
    .unwrap();
  relationships
    .create_relationship(&ctx(), RelationshipCreateRequest {
      from: ada.id.clone().unwrap(),
      to: charles.id.clone().unwrap(),
      relation_type: "sibling".into(),
      ..Default::default()
    })
    .await
    .unwrap();

  people.delete_person(&ctx(), ada.id.as_deref().unwrap()).await.unwrap();
  assert_eq!(relationships.list_relationships(&ctx()).await.unwrap().len(), 1);
}
