//! Rule evaluation.
//!
//! Every rule of a set runs; rules are awaited together but violations come
//! back in declared order, and within a rule in check order. A failing check
//! does not stop the rest of its chain.

use std::borrow::Cow;

use futures_util::future::join_all;
use serde_json::{Map, Value};

use super::classify::classify;
use super::custom::Outcome;
use super::rules::{Check, DEFAULT_MESSAGE, Location, Rule, RuleSet, coerce};
use crate::domain::{Error, Identity};

/// Category of a failed check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    Invalid,
    NotFound,
    Forbidden,
}

/// One failed check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: &'static str,
    pub message: String,
    pub kind: ViolationKind,
}

impl Violation {
    fn new(field: &'static str, message: impl Into<String>, kind: ViolationKind) -> Self {
        Self {
            field,
            message: message.into(),
            kind,
        }
    }
}

/// What the rules see of a request: body, path parameters and caller.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSnapshot {
    body: Value,
    params: Map<String, Value>,
    identity: Option<Identity>,
}

impl Default for RequestSnapshot {
    fn default() -> Self {
        Self::new(Value::Object(Map::new()))
    }
}

impl RequestSnapshot {
    /// Snapshot with `body` and no parameters or caller.
    #[must_use]
    pub fn new(body: Value) -> Self {
        Self {
            body,
            params: Map::new(),
            identity: None,
        }
    }

    /// Add a path parameter.
    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), Value::String(value.into()));
        self
    }

    /// Attach the verified caller.
    #[must_use]
    pub fn with_identity(mut self, identity: Identity) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Raw value of a field.
    pub fn value(&self, location: Location, field: &str) -> Option<&Value> {
        match location {
            Location::Body => self.body.get(field),
            Location::Param => self.params.get(field),
        }
    }

    /// Body member as text; missing members read as empty.
    pub fn body_text(&self, field: &str) -> Cow<'_, str> {
        coerce(self.body.get(field))
    }

    /// Path parameter as text.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).and_then(Value::as_str)
    }

    /// JSON body.
    pub fn body(&self) -> &Value {
        &self.body
    }

    /// Verified caller, when the route is authenticated.
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }
}

impl Rule {
    /// Run every check of the chain.
    pub async fn evaluate(&self, request: &RequestSnapshot) -> Result<Vec<Violation>, Error> {
        let value = request.value(self.location(), self.field());
        let mut violations = Vec::new();
        for check in self.checks() {
            match check {
                Check::Constraint {
                    constraint,
                    message,
                } => {
                    if !constraint.holds(value) {
                        violations.push(Violation::new(
                            self.field(),
                            message.as_deref().unwrap_or(DEFAULT_MESSAGE),
                            ViolationKind::Invalid,
                        ));
                    }
                }
                Check::Custom(validator) => {
                    let violation = match validator.validate(value, request).await? {
                        Outcome::Ok => None,
                        Outcome::Invalid(message) => Some((message, ViolationKind::Invalid)),
                        Outcome::NotFound(message) => Some((message, ViolationKind::NotFound)),
                        Outcome::Forbidden(message) => Some((message, ViolationKind::Forbidden)),
                    };
                    if let Some((message, kind)) = violation {
                        violations.push(Violation::new(self.field(), message, kind));
                    }
                }
            }
        }
        Ok(violations)
    }
}

impl RuleSet {
    /// Evaluate every rule and collect violations in rule order.
    ///
    /// An `Err` from a custom validator aborts evaluation.
    pub async fn evaluate(&self, request: &RequestSnapshot) -> Result<Vec<Violation>, Error> {
        let results = join_all(self.rules().iter().map(|rule| rule.evaluate(request))).await;
        let mut violations = Vec::new();
        for result in results {
            violations.extend(result?);
        }
        Ok(violations)
    }

    /// Evaluate and raise the classified error, if any.
    pub async fn check(&self, request: &RequestSnapshot) -> Result<(), Error> {
        let violations = self.evaluate(request).await?;
        match classify(violations) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorCode, Role, UserId};
    use crate::inbound::http::validation::custom::FieldValidator;
    use async_trait::async_trait;
    use rstest::rstest;
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Sleeps before answering so later rules finish first.
    struct Slow {
        delay: Duration,
        outcome: Outcome,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl FieldValidator for Slow {
        fn name(&self) -> &'static str {
            "slow"
        }

        async fn validate(
            &self,
            _value: Option<&Value>,
            _request: &RequestSnapshot,
        ) -> Result<Outcome, Error> {
            tokio::time::sleep(self.delay).await;
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.outcome.clone())
        }
    }

    struct Broken;

    #[async_trait]
    impl FieldValidator for Broken {
        fn name(&self) -> &'static str {
            "broken"
        }

        async fn validate(
            &self,
            _value: Option<&Value>,
            _request: &RequestSnapshot,
        ) -> Result<Outcome, Error> {
            Err(Error::service_unavailable("user store unavailable"))
        }
    }

    fn messages(violations: &[Violation]) -> Vec<&str> {
        violations.iter().map(|v| v.message.as_str()).collect()
    }

    #[rstest]
    #[tokio::test]
    async fn reports_in_rule_order_despite_completion_order() {
        let calls = Arc::new(AtomicUsize::new(0));
        let rules = RuleSet::new(vec![
            Rule::body("email").custom(Slow {
                delay: Duration::from_millis(30),
                outcome: Outcome::Invalid("email already exists".into()),
                calls: calls.clone(),
            }),
            Rule::body("name").not_empty().with_message("name is required"),
        ]);
        let violations = rules
            .evaluate(&RequestSnapshot::default())
            .await
            .expect("evaluates");
        assert_eq!(
            messages(&violations),
            vec!["email already exists", "name is required"]
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn runs_every_check_of_a_chain() {
        let rules = RuleSet::new(vec![
            Rule::body("password")
                .not_empty()
                .with_message("password is required")
                .min_length(8)
                .with_message("password must be at least 8 characters long"),
        ]);
        let violations = rules
            .evaluate(&RequestSnapshot::default())
            .await
            .expect("evaluates");
        assert_eq!(
            messages(&violations),
            vec![
                "password is required",
                "password must be at least 8 characters long"
            ]
        );
    }

    #[rstest]
    #[tokio::test]
    async fn unlabelled_checks_use_default_message() {
        let rules = RuleSet::new(vec![Rule::body("images").array()]);
        let request = RequestSnapshot::new(json!({ "images": "a.png" }));
        let violations = rules.evaluate(&request).await.expect("evaluates");
        assert_eq!(messages(&violations), vec![DEFAULT_MESSAGE]);
        assert_eq!(violations[0].field, "images");
    }

    #[rstest]
    #[tokio::test]
    async fn reads_path_parameters() {
        let rules = RuleSet::new(vec![Rule::param("id").min_length(24)]);
        let ok = RequestSnapshot::default().with_param("id", "0".repeat(24));
        assert!(rules.evaluate(&ok).await.expect("evaluates").is_empty());
        let short = RequestSnapshot::default().with_param("id", "abc");
        assert_eq!(rules.evaluate(&short).await.expect("evaluates").len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn validator_errors_abort_evaluation() {
        let rules = RuleSet::new(vec![
            Rule::body("name").not_empty(),
            Rule::body("email").custom(Broken),
        ]);
        let err = rules
            .evaluate(&RequestSnapshot::default())
            .await
            .expect_err("aborts");
        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    }

    #[rstest]
    #[tokio::test]
    async fn check_passes_clean_requests() {
        let rules = RuleSet::new(vec![Rule::body("name").not_empty()]);
        let request = RequestSnapshot::new(json!({ "name": "Ada" }))
            .with_identity(Identity::new(UserId::generate(), Role::User));
        assert!(rules.check(&request).await.is_ok());
    }

    #[rstest]
    #[tokio::test]
    async fn check_raises_one_classified_error() {
        let rules = RuleSet::new(vec![
            Rule::body("title").not_empty().with_message("title is required"),
            Rule::body("price").not_empty().with_message("price is required"),
        ]);
        let err = rules
            .check(&RequestSnapshot::default())
            .await
            .expect_err("invalid");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(err.messages(), vec!["title is required", "price is required"]);
    }
}
