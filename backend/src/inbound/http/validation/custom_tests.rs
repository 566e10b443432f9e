//! Tests for the store-backed validators.

use super::*;
use crate::domain::ports::{
    ListingStoreError, MockListingRepository, MockUserRepository, UserStoreError,
};
use crate::domain::{ErrorCode, Listing, ListingDraft, Role, UserAccount, UserId};
use crate::inbound::http::validation::Location;
use rstest::{fixture, rstest};
use serde_json::json;

fn account(id: UserId, email: &str) -> UserAccount {
    UserAccount {
        id,
        name: "Ada".into(),
        last_name: String::new(),
        email: email.into(),
        location: "London".into(),
        role: Role::User,
        test_user: false,
        avatar: None,
    }
}

fn listing_owned_by(owner: UserId) -> Listing {
    Listing::from_draft(
        ListingId::generate(),
        owner,
        ListingDraft {
            title: "Bike".into(),
            description: "Blue".into(),
            price: "120".into(),
            ..ListingDraft::default()
        },
    )
}

#[fixture]
fn caller() -> Identity {
    Identity::new(UserId::generate(), Role::User)
}

#[rstest]
#[tokio::test]
async fn unique_email_rejects_taken_address() {
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_email()
        .withf(|email| email == "ada@example.com")
        .return_once(|email| Ok(Some(account(UserId::generate(), email))));
    let validator = UniqueEmail::new(Arc::new(users));
    let outcome = validator
        .validate(Some(&json!("ada@example.com")), &RequestSnapshot::default())
        .await
        .expect("store reachable");
    assert_eq!(outcome, Outcome::Invalid(EMAIL_TAKEN.to_owned()));
}

#[rstest]
#[tokio::test]
async fn unique_email_propagates_store_failures() {
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_email()
        .return_once(|_| Err(UserStoreError::unavailable("connection refused")));
    let validator = UniqueEmail::new(Arc::new(users));
    let err = validator
        .validate(Some(&json!("ada@example.com")), &RequestSnapshot::default())
        .await
        .expect_err("store failure aborts");
    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
}

#[rstest]
#[case::own_address(true, Outcome::Ok)]
#[case::someone_else(false, Outcome::Invalid(EMAIL_TAKEN.to_owned()))]
#[tokio::test]
async fn unique_email_for_caller_ignores_own_account(
    caller: Identity,
    #[case] owned_by_caller: bool,
    #[case] expected: Outcome,
) {
    let owner = if owned_by_caller {
        *caller.user_id()
    } else {
        UserId::generate()
    };
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_email()
        .return_once(move |email| Ok(Some(account(owner, email))));
    let validator = UniqueEmailForCaller::new(Arc::new(users));
    let request = RequestSnapshot::default().with_identity(caller);
    let outcome = validator
        .validate(Some(&json!("ada@example.com")), &request)
        .await
        .expect("store reachable");
    assert_eq!(outcome, expected);
}

#[rstest]
#[case::matching(true, Outcome::Ok)]
#[case::mismatch(false, Outcome::Invalid(INVALID_CREDENTIALS.to_owned()))]
#[tokio::test]
async fn credentials_compare_submitted_password(
    #[case] matches: bool,
    #[case] expected: Outcome,
) {
    let id = UserId::generate();
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_email()
        .withf(|email| email == "ada@example.com")
        .return_once(move |email| Ok(Some(account(id, email))));
    users
        .expect_verify_password()
        .withf(move |candidate_id, candidate| *candidate_id == id && candidate == "hunter22")
        .return_once(move |_, _| Ok(matches));
    let validator = Credentials::new(Arc::new(users));
    let request = RequestSnapshot::new(json!({
        "email": "ada@example.com",
        "password": "hunter22",
    }));
    let outcome = validator
        .validate(request.value(Location::Body, "password"), &request)
        .await
        .expect("store reachable");
    assert_eq!(outcome, expected);
}

#[rstest]
#[tokio::test]
async fn credentials_reject_unknown_email() {
    let mut users = MockUserRepository::new();
    users.expect_find_by_email().return_once(|_| Ok(None));
    users.expect_verify_password().times(0);
    let validator = Credentials::new(Arc::new(users));
    let request = RequestSnapshot::new(json!({ "email": "nobody@example.com" }));
    let outcome = validator
        .validate(Some(&json!("whatever1")), &request)
        .await
        .expect("store reachable");
    assert_eq!(outcome, Outcome::Invalid(INVALID_CREDENTIALS.to_owned()));
}

#[rstest]
#[tokio::test]
async fn current_password_compares_old_password(caller: Identity) {
    let id = *caller.user_id();
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(account(id, "ada@example.com"))));
    users
        .expect_verify_password()
        .withf(|_, candidate| candidate == "old-secret")
        .return_once(|_, _| Ok(true));
    let validator = CurrentPassword::new(Arc::new(users));
    let request = RequestSnapshot::new(json!({
        "oldPassword": "old-secret",
        "newPassword": "new-secret",
    }))
    .with_identity(caller);
    let outcome = validator
        .validate(request.value(Location::Body, "newPassword"), &request)
        .await
        .expect("store reachable");
    assert_eq!(outcome, Outcome::Ok);
}

#[rstest]
#[tokio::test]
async fn current_password_reports_unknown_caller(caller: Identity) {
    let mut users = MockUserRepository::new();
    users.expect_find_by_id().return_once(|_| Ok(None));
    let validator = CurrentPassword::new(Arc::new(users));
    let request = RequestSnapshot::default().with_identity(caller);
    let outcome = validator
        .validate(None, &request)
        .await
        .expect("store reachable");
    assert_eq!(
        outcome,
        Outcome::Invalid(format!("No user with id: {}", caller.user_id()))
    );
}

#[rstest]
#[tokio::test]
async fn current_password_requires_identity() {
    let validator = CurrentPassword::new(Arc::new(MockUserRepository::new()));
    let err = validator
        .validate(None, &RequestSnapshot::default())
        .await
        .expect_err("no caller");
    assert_eq!(err.code(), ErrorCode::Unauthorized);
}

#[rstest]
#[tokio::test]
async fn listing_access_rejects_malformed_ids(caller: Identity) {
    let mut listings = MockListingRepository::new();
    listings.expect_find_by_id().times(0);
    let validator = ListingAccess::new(Arc::new(listings));
    let request = RequestSnapshot::default().with_identity(caller);
    let outcome = validator
        .validate(Some(&json!("abc")), &request)
        .await
        .expect("no store call");
    assert_eq!(outcome, Outcome::Invalid(INVALID_ID.to_owned()));
}

#[rstest]
#[tokio::test]
async fn listing_access_reports_missing_listing(caller: Identity) {
    let id = ListingId::generate();
    let mut listings = MockListingRepository::new();
    listings.expect_find_by_id().return_once(|_| Ok(None));
    let validator = ListingAccess::new(Arc::new(listings));
    let request = RequestSnapshot::default().with_identity(caller);
    let outcome = validator
        .validate(Some(&json!(id.to_string())), &request)
        .await
        .expect("store reachable");
    assert_eq!(outcome, Outcome::NotFound(format!("no listing with id {id}")));
}

#[rstest]
#[case::owner(Role::User, true, Outcome::Ok)]
#[case::admin(Role::Admin, false, Outcome::Ok)]
#[case::stranger(Role::User, false, Outcome::Forbidden(FORBIDDEN_MESSAGE.to_owned()))]
#[tokio::test]
async fn listing_access_checks_ownership(
    #[case] role: Role,
    #[case] owns: bool,
    #[case] expected: Outcome,
) {
    let caller = Identity::new(UserId::generate(), role);
    let owner = if owns {
        *caller.user_id()
    } else {
        UserId::generate()
    };
    let listing = listing_owned_by(owner);
    let id = listing.id;
    let mut listings = MockListingRepository::new();
    listings
        .expect_find_by_id()
        .withf(move |candidate| *candidate == id)
        .return_once(move |_| Ok(Some(listing)));
    let validator = ListingAccess::new(Arc::new(listings));
    let request = RequestSnapshot::default().with_identity(caller);
    let outcome = validator
        .validate(Some(&json!(id.to_string())), &request)
        .await
        .expect("store reachable");
    assert_eq!(outcome, expected);
}

#[rstest]
#[tokio::test]
async fn listing_access_propagates_store_failures(caller: Identity) {
    let mut listings = MockListingRepository::new();
    listings
        .expect_find_by_id()
        .return_once(|_| Err(ListingStoreError::unavailable("timeout")));
    let validator = ListingAccess::new(Arc::new(listings));
    let request = RequestSnapshot::default().with_identity(caller);
    let err = validator
        .validate(Some(&json!(ListingId::generate().to_string())), &request)
        .await
        .expect_err("store failure aborts");
    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
}
