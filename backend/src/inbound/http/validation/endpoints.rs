//! Rule sets for each validated endpoint.
//!
//! The [`RuleBook`] is built once from the store ports and shared through the
//! HTTP state. Handlers pick their set at the type level with an
//! [`Endpoint`] marker on [`Validated`](super::Validated).

use std::sync::Arc;

use super::custom::{
    Credentials, CurrentPassword, ListingAccess, UniqueEmail, UniqueEmailForCaller,
};
use super::rules::{Rule, RuleSet};
use crate::domain::ports::{ListingRepository, UserRepository};

const PASSWORD_TOO_SHORT: &str = "password must be at least 8 characters long";

fn required_email(rule: Rule) -> Rule {
    rule.not_empty()
        .with_message("email is required")
        .is_email()
        .with_message("invalid email format")
}

/// Immutable rule sets, one per endpoint.
#[derive(Debug, Clone)]
pub struct RuleBook {
    register: RuleSet,
    login: RuleSet,
    update_user: RuleSet,
    change_password: RuleSet,
    create_listing: RuleSet,
    update_listing: RuleSet,
    listing_id: RuleSet,
}

impl RuleBook {
    /// Build every rule set against the given stores.
    pub fn new(users: Arc<dyn UserRepository>, listings: Arc<dyn ListingRepository>) -> Self {
        let register = RuleSet::new(vec![
            Rule::body("name").not_empty().with_message("name is required"),
            required_email(Rule::body("email")).custom(UniqueEmail::new(users.clone())),
            Rule::body("password")
                .not_empty()
                .with_message("password is required")
                .min_length(8)
                .with_message(PASSWORD_TOO_SHORT),
            Rule::body("location")
                .not_empty()
                .with_message("location is required"),
        ]);

        let login = RuleSet::new(vec![
            Rule::body("password")
                .not_empty()
                .with_message("password is required")
                .min_length(8)
                .with_message(PASSWORD_TOO_SHORT)
                .custom(Credentials::new(users.clone())),
            required_email(Rule::body("email")),
        ]);

        let update_user = RuleSet::new(vec![
            Rule::body("name").not_empty().with_message("name is required"),
            required_email(Rule::body("email")).custom(UniqueEmailForCaller::new(users.clone())),
            Rule::body("location")
                .not_empty()
                .with_message("location is required"),
        ]);

        let change_password = RuleSet::new(vec![
            Rule::body("oldPassword").min_length(6),
            Rule::body("newPassword")
                .min_length(8)
                .with_message(PASSWORD_TOO_SHORT)
                .custom(CurrentPassword::new(users)),
        ]);

        let create_listing = RuleSet::new(vec![
            Rule::body("title").not_empty().with_message("title is required"),
            Rule::body("description")
                .not_empty()
                .with_message("description is required"),
            Rule::body("avatar").not_empty().with_message("image is required"),
            Rule::body("price").not_empty().with_message("price is required"),
        ]);

        let listing_id = RuleSet::new(vec![
            Rule::param("id").custom(ListingAccess::new(listings)),
        ]);

        let update_listing = listing_id.clone().then(&RuleSet::new(vec![
            Rule::body("title").not_empty().with_message("name is required"),
            Rule::body("images").array(),
            Rule::body("location")
                .not_empty()
                .with_message("location is required"),
            Rule::body("description")
                .not_empty()
                .with_message("description is required"),
            Rule::body("price").not_empty().with_message("price is required"),
        ]));

        Self {
            register,
            login,
            update_user,
            change_password,
            create_listing,
            update_listing,
            listing_id,
        }
    }

    pub fn register(&self) -> &RuleSet {
        &self.register
    }

    pub fn login(&self) -> &RuleSet {
        &self.login
    }

    pub fn update_user(&self) -> &RuleSet {
        &self.update_user
    }

    pub fn change_password(&self) -> &RuleSet {
        &self.change_password
    }

    pub fn create_listing(&self) -> &RuleSet {
        &self.create_listing
    }

    /// Listing-id rule followed by the update rules.
    pub fn update_listing(&self) -> &RuleSet {
        &self.update_listing
    }

    pub fn listing_id(&self) -> &RuleSet {
        &self.listing_id
    }
}

/// Type-level selector of a [`RuleSet`] in the [`RuleBook`].
pub trait Endpoint: 'static {
    /// Label used in logs.
    const NAME: &'static str;

    /// The rules guarding this endpoint.
    fn rules(book: &RuleBook) -> &RuleSet;
}

macro_rules! endpoints {
    ($($(#[$meta:meta])* $marker:ident => $set:ident;)+) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy)]
            pub enum $marker {}

            impl Endpoint for $marker {
                const NAME: &'static str = stringify!($set);

                fn rules(book: &RuleBook) -> &RuleSet {
                    book.$set()
                }
            }
        )+
    };
}

endpoints! {
    /// `POST /auth/register`.
    Register => register;
    /// `POST /auth/login`.
    Login => login;
    /// `PATCH /users/update-user`.
    UpdateUser => update_user;
    /// `PATCH /users/change-password`.
    ChangePassword => change_password;
    /// `POST /listings`.
    CreateListing => create_listing;
    /// `PATCH /listings/{id}`.
    UpdateListing => update_listing;
    /// `GET` and `DELETE /listings/{id}`.
    ListingById => listing_id;
}
