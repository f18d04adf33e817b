//! Mock SSO login form shared by the integration tests.

use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const LOGIN_PATH: &str = "/login";
pub const TOKEN: &str = "tok123";
pub const SESSION: &str = "sess-42";

pub fn sso_url(server: &MockServer) -> String {
    format!("{}{LOGIN_PATH}", server.uri())
}

/// GET serves the login form with the anti-forgery cookie.
pub async fn mount_login_form(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(LOGIN_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .append_header("Set-Cookie", format!("sso_token={TOKEN}; Path=/; HttpOnly"))
                .set_body_string("<form></form>"),
        )
        .expect(1)
        .mount(server)
        .await;
}

/// POST with the right token answers 303 and sets the session cookie.
pub async fn mount_login_success(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .and(body_string_contains(format!("_csrf={TOKEN}")))
        .respond_with(
            ResponseTemplate::new(303)
                .append_header("Location", "/home")
                .append_header("Set-Cookie", format!("sso_session={SESSION}; Path=/; HttpOnly"))
                .append_header("Set-Cookie", "sso_token=; Max-Age=0"),
        )
        .expect(1)
        .mount(server)
        .await;
}

/// POST re-renders the form without a session cookie (wrong credentials).
pub async fn mount_login_rejected(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<form>bad login</form>"))
        .expect(1)
        .mount(server)
        .await;
}
