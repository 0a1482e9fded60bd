//! Behavioural tests for the user directory over the in-memory gateway.
//!
//! Each scenario composes step functions directly; the world holds the
//! service, a runtime and the last outcome so steps stay synchronous.

use std::cell::RefCell;
use std::sync::Arc;

use rstest::{fixture, rstest};
use rstest_bdd_macros::{given, then, when};
use serde_json::{Value, json};
use tokio::runtime::Runtime;
use user_directory::domain::ports::UserDirectory;
use user_directory::domain::{
    DUPLICATE_EMAIL_MESSAGE, Error, ErrorCode, RawUser, User, UserDirectoryService,
};
use user_directory::outbound::memory::InMemoryUserGateway;

struct DirectoryWorld {
    runtime: Runtime,
    service: UserDirectoryService<InMemoryUserGateway>,
    last: RefCell<Option<Result<User, Error>>>,
}

impl DirectoryWorld {
    fn search(&self, query: &str) -> Vec<User> {
        self.runtime
            .block_on(self.service.search(query))
            .expect("search succeeds")
    }

    fn record(&self, outcome: Result<User, Error>) {
        self.last.replace(Some(outcome));
    }

    fn last_user(&self) -> User {
        match self.last.borrow().as_ref() {
            Some(Ok(user)) => user.clone(),
            Some(Err(err)) => panic!("expected a user, got {err:?}"),
            None => panic!("no operation ran"),
        }
    }

    fn last_error(&self) -> Error {
        match self.last.borrow().as_ref() {
            Some(Err(err)) => err.clone(),
            Some(Ok(user)) => panic!("expected an error, got {user:?}"),
            None => panic!("no operation ran"),
        }
    }
}

#[fixture]
fn world() -> DirectoryWorld {
    DirectoryWorld {
        runtime: Runtime::new().expect("runtime"),
        service: UserDirectoryService::new(Arc::new(InMemoryUserGateway::new())),
        last: RefCell::new(None),
    }
}

fn ann_lee() -> RawUser {
    RawUser::new()
        .with("name", json!("Ann Lee"))
        .with("phoneNumber", json!("555-0100"))
        .with("email", json!("ann@example.com"))
}

fn person(name: &str, email: Option<&str>) -> RawUser {
    let raw = RawUser::new()
        .with("name", json!(name))
        .with("phoneNumber", json!("555-0000"));
    match email {
        Some(email) => raw.with("email", json!(email)),
        None => raw,
    }
}

// -----------------------------------------------------------------------------
// Steps
// -----------------------------------------------------------------------------

#[given("an empty directory")]
fn an_empty_directory(world: &DirectoryWorld) {
    assert!(world.search("").is_empty());
}

#[given("a stored user")]
fn a_stored_user(world: &DirectoryWorld, data: RawUser) -> User {
    world
        .runtime
        .block_on(world.service.add(data))
        .expect("seed user is valid")
}

#[when("a user is added")]
fn a_user_is_added(world: &DirectoryWorld, data: RawUser) {
    let outcome = world.runtime.block_on(world.service.add(data));
    world.record(outcome);
}

#[when("the user is updated")]
fn the_user_is_updated(world: &DirectoryWorld, id: String, data: RawUser) {
    let outcome = world.runtime.block_on(world.service.update(&id, data));
    world.record(outcome);
}

#[when("the user is deleted")]
fn the_user_is_deleted(world: &DirectoryWorld, id: String) {
    world
        .runtime
        .block_on(world.service.delete(&id))
        .expect("delete succeeds");
}

#[then("the returned user has a generated id and no location")]
fn the_returned_user_has_a_generated_id_and_no_location(world: &DirectoryWorld) -> User {
    let user = world.last_user();
    assert!(!user.id().as_ref().is_empty());
    assert!(user.location().is_none());
    user
}

#[then("the operation fails with {code}")]
fn the_operation_fails_with(world: &DirectoryWorld, code: String) -> Error {
    let err = world.last_error();
    let expected: ErrorCode =
        serde_json::from_value(json!(code)).expect("error code in snake_case");
    assert_eq!(err.code(), expected);
    err
}

// -----------------------------------------------------------------------------
// Scenarios
// -----------------------------------------------------------------------------

#[rstest]
fn adding_ann_lee_to_an_empty_directory(world: DirectoryWorld) {
    an_empty_directory(&world);
    a_user_is_added(&world, ann_lee());
    let ann = the_returned_user_has_a_generated_id_and_no_location(&world);

    assert_eq!(ann.name().as_ref(), "Ann Lee");
    assert_eq!(ann.phone_number().as_ref(), "555-0100");
    assert_eq!(ann.email().map(AsRef::as_ref), Some("ann@example.com"));
    assert_eq!(world.search("ann"), vec![ann]);
}

#[rstest]
fn every_stored_user_is_found_by_its_name(world: DirectoryWorld) {
    let stored: Vec<User> = ["Ann Lee", "bob", "Ånnika", "Zed"]
        .into_iter()
        .map(|name| a_stored_user(&world, person(name, None)))
        .collect();

    for user in &stored {
        let name = user.name().as_ref();
        assert!(world.search(name).contains(user), "search({name:?})");
        assert!(
            world.search(&name.to_uppercase()).contains(user),
            "search({:?})",
            name.to_uppercase()
        );
    }
    assert_eq!(world.search(""), stored);
}

#[rstest]
#[case("%", false)]
#[case("_", false)]
#[case("A_", true)]
#[case("a_N%", true)]
fn wildcards_in_the_query_are_literal(
    world: DirectoryWorld,
    #[case] query: &str,
    #[case] matches_literal_name: bool,
) {
    a_stored_user(&world, person("Ann", None));
    let literal = a_stored_user(&world, person("A_n%", None));

    let expected = if matches_literal_name {
        vec![literal]
    } else {
        Vec::new()
    };
    assert_eq!(world.search(query), expected);
}

#[rstest]
fn repeated_identical_updates_are_idempotent(world: DirectoryWorld) {
    let ann = a_stored_user(&world, ann_lee());
    let id = ann.id().to_string();
    let change = ann_lee().with("location", json!("Leeds"));

    the_user_is_updated(&world, id.clone(), change.clone());
    let first = world.last_user();
    the_user_is_updated(&world, id, change);
    let second = world.last_user();

    assert_eq!(first, second);
    assert_eq!(first.id(), ann.id());
    assert_eq!(first.location().map(AsRef::as_ref), Some("Leeds"));
}

#[rstest]
fn updating_a_deleted_user_is_not_found(world: DirectoryWorld) {
    let ann = a_stored_user(&world, ann_lee());
    let id = ann.id().to_string();

    the_user_is_deleted(&world, id.clone());
    the_user_is_updated(&world, id, ann_lee());
    let err = the_operation_fails_with(&world, "not_found".to_owned());

    assert_eq!(
        err.details().and_then(|details| details.get("code")),
        Some(&json!("user_not_found"))
    );
    assert!(world.search("").is_empty());
}

#[rstest]
fn a_second_user_with_the_same_email_is_rejected(world: DirectoryWorld) {
    a_stored_user(&world, person("Ann", Some("a@x.com")));

    a_user_is_added(&world, person("Bob", Some("a@x.com")));
    let err = the_operation_fails_with(&world, "conflict".to_owned());

    assert_eq!(err.message(), DUPLICATE_EMAIL_MESSAGE);
    let holders: Vec<User> = world
        .search("")
        .into_iter()
        .filter(|user| user.email().map(AsRef::as_ref) == Some("a@x.com"))
        .collect();
    assert_eq!(holders.len(), 1);
}

#[rstest]
fn a_taken_email_wins_over_missing_fields(world: DirectoryWorld) {
    a_stored_user(&world, person("Ann", Some("a@x.com")));

    a_user_is_added(&world, RawUser::new().with("email", json!("a@x.com")));
    let err = the_operation_fails_with(&world, "conflict".to_owned());

    assert_eq!(err.message(), DUPLICATE_EMAIL_MESSAGE);
    assert_eq!(
        err.details().and_then(|details| details.get("code")),
        Some(&json!("duplicate_email"))
    );
    assert_eq!(world.search("").len(), 1);
}

#[rstest]
#[case(Value::Null)]
#[case(json!(""))]
#[case(json!("   "))]
fn omitted_or_blank_location_reads_back_absent(world: DirectoryWorld, #[case] location: Value) {
    let added = a_stored_user(&world, ann_lee().with("location", location));

    let found = world.search("Ann");
    assert_eq!(found, vec![added.clone()]);
    let body = serde_json::to_value(&found[0]).expect("user serialises");
    assert!(body.get("location").is_none(), "location leaked: {body}");
}

#[rstest]
fn invalid_input_reports_every_failing_field(world: DirectoryWorld) {
    a_user_is_added(
        &world,
        RawUser::new()
            .with("name", json!(""))
            .with("email", json!("not-an-email")),
    );
    let err = the_operation_fails_with(&world, "invalid_request".to_owned());

    let issues = err
        .details()
        .and_then(|details| details.get("issues"))
        .and_then(Value::as_array)
        .expect("issues listed");
    let fields: Vec<&str> = issues
        .iter()
        .filter_map(|issue| issue.get("field").and_then(Value::as_str))
        .collect();
    assert_eq!(fields, ["name", "phoneNumber", "email"]);
    assert!(world.search("").is_empty());
}
