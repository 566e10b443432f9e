//! Authentication handlers.
//!
//! ```text
//! POST /api/v1/auth/register {"name":"Ada","email":"ada@example.com","password":"secret123","location":"London"}
//! POST /api/v1/auth/login {"email":"ada@example.com","password":"secret123"}
//! GET /api/v1/auth/logout
//! ```

use actix_web::cookie::{Cookie, time::Duration as CookieDuration};
use actix_web::{HttpResponse, get, post, web};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::domain::{ApiResult, Error, Identity, NewUser, Role, UserAccount};
use crate::inbound::http::session::TOKEN_COOKIE;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::custom::INVALID_CREDENTIALS;
use crate::inbound::http::validation::{Login, Register, Validated};

/// Registration body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    #[serde(default)]
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub location: String,
}

/// Login body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
}

fn session_cookie(state: &HttpState, token: String) -> Cookie<'static> {
    let max_age = i64::try_from(state.tokens.lifetime().as_secs()).unwrap_or(i64::MAX);
    Cookie::build(TOKEN_COOKIE, token)
        .path("/")
        .http_only(true)
        .secure(state.cookie_secure)
        .max_age(CookieDuration::seconds(max_age))
        .finish()
}

/// Issue a session token for `account`.
pub(crate) fn issue_session(state: &HttpState, account: &UserAccount) -> ApiResult<Cookie<'static>> {
    let identity = Identity::new(account.id, account.role).as_test_user(account.test_user);
    let token = state.tokens.issue(&identity).map_err(|err| {
        error!(error = %err, "failed to issue session token");
        Error::internal("failed to issue session token")
    })?;
    Ok(session_cookie(state, token))
}

/// Create an account. The first account other than the demo account becomes
/// an admin.
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    input: Validated<Register>,
) -> ApiResult<HttpResponse> {
    let RegisterRequest {
        name,
        last_name,
        email,
        password,
        location,
    } = input.body()?;
    let user = NewUser::new(name, email, password, Role::User)
        .with_last_name(last_name)
        .with_location(location);
    let account = state.users.register(user).await?;
    info!(user_id = %account.id, role = %account.role, "account registered");
    Ok(HttpResponse::Created().json(json!({ "msg": "user created" })))
}

/// Verify credentials and set the session cookie.
#[post("/login")]
pub async fn login(state: web::Data<HttpState>, input: Validated<Login>) -> ApiResult<HttpResponse> {
    let LoginRequest { email } = input.body()?;
    let account = state
        .users
        .find_by_email(&email)
        .await?
        .ok_or_else(|| Error::unauthorized(INVALID_CREDENTIALS))?;
    let cookie = issue_session(&state, &account)?;
    info!(user_id = %account.id, "user logged in");
    Ok(HttpResponse::Ok()
        .cookie(cookie)
        .json(json!({ "msg": "user logged in" })))
}

/// Expire the session cookie.
#[get("/logout")]
pub async fn logout() -> HttpResponse {
    let cookie = Cookie::build(TOKEN_COOKIE, "logout")
        .path("/")
        .http_only(true)
        .max_age(CookieDuration::ZERO)
        .finish();
    HttpResponse::Ok()
        .cookie(cookie)
        .json(json!({ "msg": "user logged out!" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::UserRepository as _;
    use crate::inbound::http::test_utils::{error_body, memory_state};
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use rstest::rstest;
    use serde_json::Value;

    macro_rules! app {
        ($state:expr) => {
            test::init_service(
                App::new().app_data(web::Data::new($state)).service(
                    web::scope("/auth")
                        .service(register)
                        .service(login)
                        .service(logout),
                ),
            )
            .await
        };
    }

    fn registration(email: &str) -> Value {
        json!({
            "name": "Ada",
            "email": email,
            "password": "secret123",
            "location": "London",
        })
    }

    #[actix_web::test]
    async fn first_account_is_admin() {
        let (state, users, _) = memory_state();
        let app = app!(state);
        for email in ["first@example.com", "second@example.com"] {
            let req = test::TestRequest::post()
                .uri("/auth/register")
                .set_json(registration(email))
                .to_request();
            let res = test::call_service(&app, req).await;
            assert_eq!(res.status(), StatusCode::CREATED);
        }
        let first = users
            .find_by_email("first@example.com")
            .await
            .expect("store")
            .expect("first");
        let second = users
            .find_by_email("second@example.com")
            .await
            .expect("store")
            .expect("second");
        assert_eq!(first.role, Role::Admin);
        assert_eq!(second.role, Role::User);
    }

    #[actix_web::test]
    async fn seeded_demo_account_does_not_block_first_admin() {
        let (state, users, _) = memory_state();
        users
            .create(
                NewUser::new("Demo", "demo@example.com", "demo-pass", Role::User).as_test_user(),
            )
            .await
            .expect("seed demo");
        let app = app!(state);
        let req = test::TestRequest::post()
            .uri("/auth/register")
            .set_json(registration("first@example.com"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
        let first = users
            .find_by_email("first@example.com")
            .await
            .expect("store")
            .expect("first");
        assert_eq!(first.role, Role::Admin);
    }

    #[actix_web::test]
    async fn login_sets_http_only_token_cookie() {
        let (state, users, _) = memory_state();
        let codec = state.tokens.clone();
        let account = users
            .create(NewUser::new("Ada", "ada@example.com", "secret123", Role::User))
            .await
            .expect("seed");
        let app = app!(state);
        let req = test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({ "email": "ada@example.com", "password": "secret123" }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        let cookie = res
            .response()
            .cookies()
            .find(|cookie| cookie.name() == TOKEN_COOKIE)
            .expect("token cookie");
        assert_eq!(cookie.http_only(), Some(true));
        let identity = codec.verify(cookie.value()).expect("valid token");
        assert_eq!(identity.user_id(), &account.id);
    }

    #[rstest]
    #[case::wrong_password("ada@example.com", "secret124")]
    #[case::unknown_email("bob@example.com", "secret123")]
    #[actix_web::test]
    async fn login_rejects_bad_credentials(#[case] email: &str, #[case] password: &str) {
        let (state, users, _) = memory_state();
        users
            .create(NewUser::new("Ada", "ada@example.com", "secret123", Role::User))
            .await
            .expect("seed");
        let app = app!(state);
        let req = test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({ "email": email, "password": password }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_body(res).await.messages(), vec![INVALID_CREDENTIALS]);
    }

    #[actix_web::test]
    async fn logout_expires_cookie() {
        let (state, _, _) = memory_state();
        let app = app!(state);
        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/auth/logout").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let cookie = res
            .response()
            .cookies()
            .find(|cookie| cookie.name() == TOKEN_COOKIE)
            .expect("token cookie");
        assert_eq!(cookie.max_age(), Some(CookieDuration::ZERO));
    }
}
