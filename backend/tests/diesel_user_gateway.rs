//! Integration tests for `DieselUserGateway` against embedded PostgreSQL.
//!
//! The suite drives the gateway through `UserDirectoryService`, so it checks
//! the port contract and the service's use of it in one pass. It is opt-in:
//! set `RUN_PG_EMBEDDED=1` to run it.
//!
//! Steps are synchronous and share one Tokio runtime held in the test
//! context, keeping database operations deterministic.

use std::sync::Arc;

use pg_embedded_setup_unpriv::TemporaryDatabase;
use rstest::{fixture, rstest};
use rstest_bdd_macros::{given, then, when};
use serde_json::json;
use tokio::runtime::Runtime;
use user_directory::domain::ports::{UserDirectory, UserGateway, UserGatewayError};
use user_directory::domain::{EmailAddress, ErrorCode, RawUser, User, UserDirectoryService};
use user_directory::outbound::persistence::{DbPool, DieselUserGateway, PoolConfig};

mod support;

use support::embedded_postgres::{drop_users_table, shared_cluster};
use support::{embedded_postgres_enabled, handle_cluster_setup_failure, provision_template_database};

struct TestContext {
    runtime: Runtime,
    gateway: Arc<DieselUserGateway>,
    service: UserDirectoryService<DieselUserGateway>,
    database_url: String,
    _database: TemporaryDatabase,
}

fn setup_test_context() -> Result<TestContext, String> {
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let cluster = shared_cluster()?;
    let temp_db = provision_template_database(cluster)?;
    let database_url = temp_db.url().to_string();

    let config = PoolConfig::new(&database_url)
        .with_max_size(2)
        .with_min_idle(Some(1));
    let pool = runtime
        .block_on(async { DbPool::new(config).await })
        .map_err(|err| err.to_string())?;

    let gateway = Arc::new(DieselUserGateway::new(pool));
    let service = UserDirectoryService::new(gateway.clone());

    Ok(TestContext {
        runtime,
        gateway,
        service,
        database_url,
        _database: temp_db,
    })
}

#[fixture]
fn diesel_world() -> Option<TestContext> {
    if !embedded_postgres_enabled() {
        eprintln!("SKIP-TEST-CLUSTER: set RUN_PG_EMBEDDED=1 to run Diesel gateway tests");
        return None;
    }
    match setup_test_context() {
        Ok(ctx) => Some(ctx),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

fn raw(name: &str, phone: &str, email: Option<&str>) -> RawUser {
    let user = RawUser::new()
        .with("name", json!(name))
        .with("phoneNumber", json!(phone));
    match email {
        Some(email) => user.with("email", json!(email)),
        None => user,
    }
}

// -----------------------------------------------------------------------------
// BDD Step Definitions
// -----------------------------------------------------------------------------

#[given("a directory backed by PostgreSQL")]
fn a_directory_backed_by_postgres(_world: &TestContext) {}

#[when("the directory adds a user")]
fn the_directory_adds(world: &TestContext, data: RawUser) -> User {
    world
        .runtime
        .block_on(world.service.add(data))
        .expect("add succeeds")
}

#[then("searching for {query} returns the expected users")]
fn searching_returns(world: &TestContext, query: String, expected: Vec<User>) {
    let found = world
        .runtime
        .block_on(world.service.search(&query))
        .expect("search succeeds");
    assert_eq!(found, expected, "search({query:?})");
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------

#[rstest]
fn add_then_search_returns_the_stored_user(diesel_world: Option<TestContext>) {
    let Some(world) = diesel_world else {
        return;
    };

    a_directory_backed_by_postgres(&world);
    let ann = the_directory_adds(
        &world,
        raw("Ann Lee", "555-0100", Some("ann@example.com")),
    );
    assert!(ann.location().is_none());
    searching_returns(&world, "ann".to_owned(), vec![ann.clone()]);
    searching_returns(&world, "ANN L".to_owned(), vec![ann.clone()]);
    searching_returns(&world, "Lee".to_owned(), vec![]);
}

#[rstest]
fn search_preserves_insertion_order_and_matches_literally(diesel_world: Option<TestContext>) {
    let Some(world) = diesel_world else {
        return;
    };

    let first = the_directory_adds(&world, raw("Anna", "1", None));
    let second = the_directory_adds(&world, raw("ann_b", "2", None));
    let third = the_directory_adds(&world, raw("Annabel", "3", None));

    searching_returns(&world, "".to_owned(), vec![first.clone(), second.clone(), third.clone()]);
    searching_returns(&world, "ann".to_owned(), vec![first.clone(), second.clone(), third.clone()]);
    searching_returns(&world, "ann_".to_owned(), vec![second.clone()]);
    searching_returns(&world, "%".to_owned(), vec![]);
}

#[rstest]
fn duplicate_email_is_rejected_once_stored(diesel_world: Option<TestContext>) {
    let Some(world) = diesel_world else {
        return;
    };

    the_directory_adds(&world, raw("Ann", "1", Some("a@x.com")));
    let err = world
        .runtime
        .block_on(world.service.add(raw("Bob", "2", Some("a@x.com"))))
        .expect_err("duplicate email rejected");
    assert_eq!(err.code(), ErrorCode::Conflict);

    let email = EmailAddress::new("a@x.com").expect("valid email");
    let stored = world
        .runtime
        .block_on(world.gateway.find_by_email(&email))
        .expect("lookup succeeds");
    assert!(stored.is_some());
    searching_returns(&world, "Bob".to_owned(), vec![]);
}

#[rstest]
fn storage_unique_violation_surfaces_as_constraint(diesel_world: Option<TestContext>) {
    let Some(world) = diesel_world else {
        return;
    };

    let fields = user_directory::domain::parse_for_create(&raw("Ann", "1", Some("a@x.com")))
        .expect("valid fields");
    world
        .runtime
        .block_on(world.gateway.insert(&fields))
        .expect("first insert");
    let err = world
        .runtime
        .block_on(world.gateway.insert(&fields))
        .expect_err("second insert violates unique email");

    match err {
        UserGatewayError::Constraint { constraint, .. } => {
            assert_eq!(constraint, user_directory::domain::ports::EMAIL_UNIQUE_CONSTRAINT);
        }
        other => panic!("expected constraint error, got {other:?}"),
    }
}

#[rstest]
fn update_replaces_fields_and_clears_omitted_optionals(diesel_world: Option<TestContext>) {
    let Some(world) = diesel_world else {
        return;
    };

    let ann = the_directory_adds(
        &world,
        raw("Ann Lee", "555-0100", Some("ann@example.com")).with("location", json!("Leeds")),
    );
    let id = ann.id().to_string();

    let updated = world
        .runtime
        .block_on(world.service.update(&id, raw("Ann Lee", "555-0199", None)))
        .expect("update succeeds");

    assert_eq!(updated.id(), ann.id());
    assert_eq!(updated.phone_number().as_ref(), "555-0199");
    assert!(updated.email().is_none());
    assert!(updated.location().is_none());

    let again = world
        .runtime
        .block_on(world.service.update(&id, raw("Ann Lee", "555-0199", None)))
        .expect("idempotent update succeeds");
    assert_eq!(again, updated);
}

#[rstest]
fn update_may_keep_its_own_email(diesel_world: Option<TestContext>) {
    let Some(world) = diesel_world else {
        return;
    };

    let ann = the_directory_adds(&world, raw("Ann", "1", Some("a@x.com")));
    let updated = world
        .runtime
        .block_on(
            world
                .service
                .update(&ann.id().to_string(), raw("Ann", "2", Some("a@x.com"))),
        )
        .expect("keeping own email is allowed");
    assert_eq!(updated.email().map(AsRef::as_ref), Some("a@x.com"));
}

#[rstest]
fn delete_then_update_is_not_found(diesel_world: Option<TestContext>) {
    let Some(world) = diesel_world else {
        return;
    };

    let ann = the_directory_adds(&world, raw("Ann", "1", None));
    let id = ann.id().to_string();

    world
        .runtime
        .block_on(world.service.delete(&id))
        .expect("delete succeeds");
    let err = world
        .runtime
        .block_on(world.service.update(&id, raw("Ann", "1", None)))
        .expect_err("deleted user cannot be updated");
    assert_eq!(err.code(), ErrorCode::NotFound);

    let err = world
        .runtime
        .block_on(world.service.delete(&id))
        .expect_err("second delete fails");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
fn missing_schema_is_reported_as_a_query_failure(diesel_world: Option<TestContext>) {
    let Some(world) = diesel_world else {
        return;
    };

    drop_users_table(&world.database_url).expect("drop succeeds");
    let err = world
        .runtime
        .block_on(world.gateway.find_by_name_prefix(""))
        .expect_err("query fails without a table");
    assert!(matches!(err, UserGatewayError::Query { .. }), "got {err:?}");

    let err = world
        .runtime
        .block_on(world.service.search(""))
        .expect_err("service reports failure");
    assert_eq!(err.code(), ErrorCode::InternalError);
}
