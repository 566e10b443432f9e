//! `Validated<E>` extractor running an endpoint's rules before the handler.

use std::marker::PhantomData;

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpMessage, HttpRequest, web};
use futures_util::future::LocalBoxFuture;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

use super::endpoints::Endpoint;
use super::runner::RequestSnapshot;
use crate::domain::{ApiResult, Error, Identity};
use crate::inbound::http::state::HttpState;

/// A request that passed the rules of endpoint `E`.
///
/// The body is read once; an empty body validates as `{}`.
#[derive(Debug)]
pub struct Validated<E> {
    snapshot: RequestSnapshot,
    _endpoint: PhantomData<E>,
}

impl<E> Validated<E> {
    /// Deserialize the validated body.
    pub fn body<T: DeserializeOwned>(&self) -> ApiResult<T> {
        T::deserialize(self.snapshot.body())
            .map_err(|err| Error::invalid_request(format!("invalid request body: {err}")))
    }

    /// Path parameter by name.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.snapshot.param(name)
    }

    /// Caller attached by the authenticator, if the route has one.
    pub fn identity(&self) -> Option<&Identity> {
        self.snapshot.identity()
    }

    /// Everything the rules saw.
    pub fn snapshot(&self) -> &RequestSnapshot {
        &self.snapshot
    }
}

fn parse_body(bytes: &[u8]) -> ApiResult<Value> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_slice(bytes)
        .map_err(|err| Error::invalid_request(format!("invalid JSON body: {err}")))
}

impl<E: Endpoint> FromRequest for Validated<E> {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        let identity = req.extensions().get::<Identity>().copied();
        let params: Vec<(String, String)> = req
            .match_info()
            .iter()
            .map(|(name, value)| (name.to_owned(), value.to_owned()))
            .collect();
        let bytes = web::Bytes::from_request(req, payload);

        Box::pin(async move {
            let state = state.ok_or_else(|| Error::internal("HTTP state is not configured"))?;
            let bytes = bytes
                .await
                .map_err(|err| Error::invalid_request(format!("unreadable request body: {err}")))?;
            let mut snapshot = RequestSnapshot::new(parse_body(&bytes)?);
            for (name, value) in params {
                snapshot = snapshot.with_param(name, value);
            }
            if let Some(identity) = identity {
                snapshot = snapshot.with_identity(identity);
            }
            if let Err(error) = E::rules(&state.rules).check(&snapshot).await {
                debug!(endpoint = E::NAME, code = ?error.code(), "validation failed");
                return Err(error);
            }
            Ok(Self {
                snapshot,
                _endpoint: PhantomData,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorCode, Role, UserId};
    use crate::inbound::http::session::Authenticate;
    use crate::inbound::http::test_utils::{error_body, memory_state, token_cookie};
    use crate::inbound::http::validation::{Register, UpdateListing};
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test};
    use rstest::rstest;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Name {
        name: String,
    }

    async fn register(input: Validated<Register>) -> ApiResult<HttpResponse> {
        let Name { name } = input.body()?;
        Ok(HttpResponse::Ok().body(name))
    }

    async fn update(input: Validated<UpdateListing>) -> HttpResponse {
        HttpResponse::Ok().body(input.param("id").unwrap_or_default().to_owned())
    }

    #[rstest]
    #[case::empty_body("")]
    #[case::empty_object("{}")]
    #[actix_web::test]
    async fn empty_bodies_fail_the_rules(#[case] body: &'static str) {
        let (state, _, _) = memory_state();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .route("/register", web::post().to(register)),
        )
        .await;
        let req = test::TestRequest::post()
            .uri("/register")
            .set_payload(body)
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let err = error_body(res).await;
        assert_eq!(err.messages().first().copied(), Some("name is required"));
    }

    #[actix_web::test]
    async fn malformed_json_is_rejected() {
        let (state, _, _) = memory_state();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .route("/register", web::post().to(register)),
        )
        .await;
        let req = test::TestRequest::post()
            .uri("/register")
            .set_payload("{\"name\":")
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert!(error_body(res).await.message().starts_with("invalid JSON body"));
    }

    #[actix_web::test]
    async fn valid_requests_reach_the_handler() {
        let (state, _, _) = memory_state();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .route("/register", web::post().to(register)),
        )
        .await;
        let req = test::TestRequest::post()
            .uri("/register")
            .set_json(serde_json::json!({
                "name": "Ada",
                "email": "ada@example.com",
                "password": "secret123",
                "location": "London",
            }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(test::read_body(res).await, "Ada");
    }

    #[actix_web::test]
    async fn missing_listing_is_not_found() {
        let (state, _, _) = memory_state();
        let codec = state.tokens.clone();
        let caller = Identity::new(UserId::generate(), Role::User);
        let app = test::init_service(
            App::new().app_data(web::Data::new(state)).service(
                web::scope("/listings")
                    .wrap(Authenticate::new(codec.clone()))
                    .route("/{id}", web::patch().to(update)),
            ),
        )
        .await;
        let id = UserId::generate().to_string();
        let req = test::TestRequest::patch()
            .uri(&format!("/listings/{id}"))
            .cookie(token_cookie(&codec, &caller))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let err = error_body(res).await;
        assert_eq!(err.code(), ErrorCode::NotFound);
        assert_eq!(
            err.messages().first().copied(),
            Some(format!("no listing with id {id}").as_str())
        );
    }
}
