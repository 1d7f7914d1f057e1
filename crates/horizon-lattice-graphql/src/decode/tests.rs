use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use super::*;
use crate::{GraphQLObject, Id, graphql_scalar};

#[derive(Debug, Default, GraphQLObject)]
struct User {
    login: String,
    #[serde(rename = "avatar_url")]
    avatar: String,
    #[graphql("followers")]
    #[serde(rename = "follower_count")]
    follower_count: i32,
}

#[derive(Debug, Default, GraphQLObject)]
struct UserQuery {
    #[graphql("user(login: $login)")]
    user: Option<User>,
}

#[derive(Debug, Default, GraphQLObject)]
struct Shadowed {
    a: String,
    #[serde(rename = "a")]
    b: String,
}

#[derive(Debug, Default, GraphQLObject)]
struct Issue {
    number: i32,
    title: String,
}

#[derive(Debug, Default, GraphQLObject)]
struct Repository {
    issues: Vec<Issue>,
}

#[derive(Debug, Default, GraphQLObject)]
struct RepositoryQuery {
    #[graphql("owner: repositoryOwner(login: $owner)")]
    owner: Option<Owner>,
    repository: Repository,
}

#[derive(Debug, Default, GraphQLObject)]
struct Owner {
    id: Id,
}

#[derive(Debug, Default, GraphQLObject)]
struct DroidFields {
    primary_function: String,
}

#[derive(Debug, Default, GraphQLObject)]
struct HumanFields {
    height: f64,
}

#[derive(Debug, Default, GraphQLObject)]
struct Character {
    name: String,
    #[graphql("... on Droid")]
    droid: DroidFields,
    #[graphql("... on Human")]
    human: HumanFields,
}

#[derive(Debug, Default, GraphQLObject)]
struct Triple {
    a: String,
    b: i32,
    c: String,
}

#[derive(Debug, Default, GraphQLObject)]
struct Extras {
    metadata: Value,
    labels: Map<String, Value>,
    parent: Option<Box<Issue>>,
    #[graphql(skip)]
    local_only: String,
}

#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum Episode {
    #[default]
    NewHope,
    Empire,
    Jedi,
}

graphql_scalar!(Episode, "Episode");

#[derive(Debug, Default, GraphQLObject)]
struct Hero {
    appears_in: Vec<Episode>,
}

fn decode<T: GraphQLType>(target: &mut T, value: Value, strict: bool) -> Result<(), DecodeError> {
    decode_data(&value, target, strict)
}

#[test]
fn test_primary_and_secondary_names() {
    let mut user = User::default();
    decode(
        &mut user,
        json!({"login": "octocat", "avatar_url": "https://a/1.png", "followers": 7}),
        false,
    )
    .unwrap();

    assert_eq!(user.login, "octocat");
    assert_eq!(user.avatar, "https://a/1.png");
    assert_eq!(user.follower_count, 7);
}

#[test]
fn test_strict_ignores_secondary_names() {
    let input = json!({"avatar_url": "https://a/1.png", "follower_count": 3});

    let mut lenient = User::default();
    decode(&mut lenient, input.clone(), false).unwrap();
    assert_eq!(lenient.avatar, "https://a/1.png");
    assert_eq!(lenient.follower_count, 3);

    let mut strict = User::default();
    decode(&mut strict, input, true).unwrap();
    assert_eq!(strict.avatar, "");
    assert_eq!(strict.follower_count, 0);
}

#[test]
fn test_primary_name_shadows_secondary() {
    let mut shadowed = Shadowed::default();
    decode(&mut shadowed, json!({"a": "first"}), false).unwrap();

    assert_eq!(shadowed.a, "first");
    assert_eq!(shadowed.b, "");
}

#[test]
fn test_field_written_at_most_once() {
    let mut user = User::default();
    decode(
        &mut user,
        json!({"follower_count": 2, "followers": 1}),
        false,
    )
    .unwrap();
    assert_eq!(user.follower_count, 1);

    let mut user = User::default();
    decode(
        &mut user,
        json!({"followers": 1, "follower_count": 2}),
        false,
    )
    .unwrap();
    assert_eq!(user.follower_count, 1);

    // A secondary name still fills the field when the primary is absent.
    let mut user = User::default();
    decode(&mut user, json!({"follower_count": 2}), false).unwrap();
    assert_eq!(user.follower_count, 2);

    let mut user = User::default();
    decode(&mut user, json!({"followers": 1, "follower_count": 2}), true).unwrap();
    assert_eq!(user.follower_count, 1);
}

#[test]
fn test_nullable_slots() {
    let mut query = UserQuery::default();
    decode(&mut query, json!({"user": {"login": "octocat"}}), false).unwrap();
    assert_eq!(query.user.as_ref().map(|u| u.login.as_str()), Some("octocat"));

    decode(&mut query, json!({"user": null}), false).unwrap();
    assert!(query.user.is_none());
}

#[test]
fn test_unknown_and_missing_members() {
    let mut user = User {
        avatar: "keep".into(),
        ..User::default()
    };
    decode(&mut user, json!({"login": "octocat", "company": "GitHub"}), false).unwrap();

    assert_eq!(user.login, "octocat");
    assert_eq!(user.avatar, "keep");
}

#[test]
fn test_null_into_non_nullable_keeps_value() {
    let mut user = User {
        login: "before".into(),
        ..User::default()
    };
    decode(&mut user, json!({"login": null}), false).unwrap();
    assert_eq!(user.login, "before");
}

#[test]
fn test_list_is_rebuilt_to_input_length() {
    let mut repo = Repository {
        issues: vec![Issue::default(), Issue::default(), Issue::default()],
    };
    decode(
        &mut repo,
        json!({"issues": [{"number": 42, "title": "Crash on start"}]}),
        false,
    )
    .unwrap();

    assert_eq!(repo.issues.len(), 1);
    assert_eq!(repo.issues[0].number, 42);
    assert_eq!(repo.issues[0].title, "Crash on start");

    decode(&mut repo, json!({"issues": []}), false).unwrap();
    assert!(repo.issues.is_empty());
}

#[test]
fn test_mismatch_reports_path() {
    let mut query = RepositoryQuery::default();
    let err = decode(
        &mut query,
        json!({"repository": {"issues": [{"number": 1}, {"number": "two"}]}}),
        false,
    )
    .unwrap_err();

    assert_eq!(
        err.path(),
        &[
            PathSegment::Field("repository".into()),
            PathSegment::Field("issues".into()),
            PathSegment::Index(1),
            PathSegment::Field("number".into()),
        ]
    );
    assert_eq!(err.message(), "expected Int, found string");
    assert_eq!(
        err.to_string(),
        "failed to decode data at repository.issues[1].number: expected Int, found string"
    );
}

#[test]
fn test_root_mismatch() {
    let mut query = RepositoryQuery::default();
    let err = decode(&mut query, json!([1, 2]), false).unwrap_err();

    assert!(err.path().is_empty());
    assert_eq!(err.to_string(), "failed to decode data: expected object, found array");
}

#[test]
fn test_failure_keeps_earlier_fields() {
    let mut triple = Triple::default();
    let err = decode(&mut triple, json!({"a": "set", "b": "oops", "c": "late"}), false);

    assert!(err.is_err());
    assert_eq!(triple.a, "set");
    assert_eq!(triple.c, "");
}

#[test]
fn test_alias_is_response_key() {
    let mut query = RepositoryQuery::default();
    decode(&mut query, json!({"owner": {"id": "MDQ6VXNlcjE="}}), false).unwrap();

    assert_eq!(
        query.owner.map(|o| o.id),
        Some(Id::from("MDQ6VXNlcjE="))
    );
}

#[test]
fn test_inline_fragments_read_parent_object() {
    let mut character = Character::default();
    decode(
        &mut character,
        json!({"name": "R2-D2", "primaryFunction": "Astromech"}),
        false,
    )
    .unwrap();

    assert_eq!(character.name, "R2-D2");
    assert_eq!(character.droid.primary_function, "Astromech");
    assert_eq!(character.human.height, 0.0);
}

#[test]
fn test_id_accepts_integers() {
    let mut owner = Owner::default();
    decode(&mut owner, json!({"id": 1001}), false).unwrap();
    assert_eq!(owner.id.as_str(), "1001");

    let err = decode(&mut owner, json!({"id": 1.5}), false).unwrap_err();
    assert_eq!(err.message(), "expected ID, found number");
}

#[test]
fn test_integer_overflow() {
    let mut issue = Issue::default();
    let err = decode(&mut issue, json!({"number": 3_000_000_000u64}), false).unwrap_err();
    assert_eq!(err.message(), "number 3000000000 does not fit in i32");
}

#[test]
fn test_opaque_values_pass_through() {
    let mut extras = Extras {
        local_only: "untouched".into(),
        ..Extras::default()
    };
    decode(
        &mut extras,
        json!({
            "metadata": {"nested": [1, {"deep": true}]},
            "labels": {"bug": "red"},
            "parent": {"number": 7},
            "localOnly": "ignored"
        }),
        false,
    )
    .unwrap();

    assert_eq!(extras.metadata, json!({"nested": [1, {"deep": true}]}));
    assert_eq!(extras.labels.get("bug"), Some(&json!("red")));
    assert_eq!(extras.parent.map(|p| p.number), Some(7));
    assert_eq!(extras.local_only, "untouched");
}

#[test]
fn test_custom_scalar_enum() {
    let mut hero = Hero::default();
    decode(&mut hero, json!({"appearsIn": ["EMPIRE", "JEDI"]}), false).unwrap();
    assert_eq!(hero.appears_in, vec![Episode::Empire, Episode::Jedi]);

    let err = decode(&mut hero, json!({"appearsIn": ["PHANTOM"]}), false).unwrap_err();
    assert_eq!(
        err.path(),
        &[PathSegment::Field("appearsIn".into()), PathSegment::Index(0)]
    );
}

#[test]
fn test_descriptor_is_cached() {
    let first = UserQuery::descriptor() as *const ObjectDescriptor;
    let second = UserQuery::descriptor() as *const ObjectDescriptor;
    assert_eq!(first, second);

    let field = &UserQuery::descriptor().fields()[0];
    assert_eq!(field.primary_name(), Some("user"));
    assert!(field.shape().object().is_some());
}
