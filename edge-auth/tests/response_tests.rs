use edge_auth::cookies::{CookieName, CookieSet, MaxAge};
use edge_auth::request::Request;
use edge_auth::response::{
    Challenge, ChallengeBody, CorsHeaders, Outcome, Preflight, Redirect, Rendered,
    X_AUTH_REDIRECT,
};
use http::StatusCode;
use http::header::{CONTENT_TYPE, LOCATION, SET_COOKIE};
use url::Url;

fn login_url() -> Url {
    Url::parse("https://auth.example.com/login?state=abc&client_id=c").expect("valid url")
}

#[test]
fn test_json_challenge_body() {
    let body = ChallengeBody::for_login(&login_url(), false);
    assert_eq!(body.content_type(), "application/json");
    let parsed: serde_json::Value = serde_json::from_str(&body.render()).expect("valid json");
    assert_eq!(
        parsed,
        serde_json::json!({
            "error": "unauthorized",
            "login": "https://auth.example.com/login?state=abc&client_id=c"
        })
    );
}

#[test]
fn test_html_challenge_body() {
    let body = ChallengeBody::for_login(&login_url(), true);
    assert_eq!(body.content_type(), "text/html");
    assert_eq!(
        body.render(),
        "<html><body><script>window.location.assign(\"https://auth.example.com/login?state=abc&client_id=c\")</script></body></html>"
    );
}

#[test]
fn test_redirect_renders_location_and_cookies() {
    let mut cookies = CookieSet::new();
    cookies.set(CookieName::AccessToken, "act", MaxAge::session(3600));
    cookies.delete(CookieName::PkceState);
    let response = Redirect::found("/dashboard?tab=1", cookies)
        .to_response()
        .expect("should render");

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers()[LOCATION], "/dashboard?tab=1");
    assert_eq!(response.headers().get_all(SET_COOKIE).iter().count(), 2);
    assert!(response.body().is_empty());
}

#[test]
fn test_redirect_to_root_clears_pkce() {
    let redirect = Redirect::to_root_clearing_pkce();
    assert_eq!(redirect.location, "/");
    assert_eq!(redirect.cookies.len(), 3);
    assert!(redirect.cookies.iter().all(|c| c.is_deletion()));
}

#[test]
fn test_challenge_response_headers() {
    let mut cookies = CookieSet::new();
    cookies.set(CookieName::PkceState, "s", MaxAge::PKCE);
    let challenge = Challenge {
        login_url: login_url(),
        cookies,
        cors: CorsHeaders::for_host("app.example.com"),
        body: ChallengeBody::for_login(&login_url(), false),
    };
    let response = challenge.to_response().expect("should render");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers()[X_AUTH_REDIRECT], login_url().as_str());
    assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
    assert_eq!(response.headers().get_all(SET_COOKIE).iter().count(), 1);
}

#[test]
fn test_preflight_has_empty_body() {
    let response = Preflight {
        cors: CorsHeaders::for_host("app.example.com"),
    }
    .to_response()
    .expect("should render");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(response.body().is_empty());
    assert_eq!(
        CorsHeaders::for_host("app.example.com").allow_origin(),
        "https://app.example.com"
    );
}

#[test]
fn test_pass_through_renders_as_forward() {
    let request = Request::builder()
        .uri("/open")
        .build()
        .expect("request should build");
    let outcome = Outcome::PassThrough(request);
    assert!(outcome.cookies().is_none());
    match outcome.render().expect("should render") {
        Rendered::Forward(forwarded) => assert_eq!(forwarded.path(), "/open"),
        Rendered::Respond(response) => panic!("unexpected response {response:?}"),
    }
}

#[test]
fn test_unrenderable_location_is_an_error() {
    let redirect = Redirect::found("/bad\nheader", CookieSet::new());
    assert!(redirect.to_response().is_err());
}
