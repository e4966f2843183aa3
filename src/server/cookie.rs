use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use uuid::Uuid;

use crate::session::SharedSession;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "pdfchat_session";

/// Resolves the caller's session, issuing a new session cookie when the
/// request carries none or one that is not a UUID.
///
/// The returned jar must be part of the response so a fresh cookie reaches
/// the browser.
pub async fn resolve_session(state: &AppState, jar: CookieJar) -> (CookieJar, SharedSession) {
    if let Some(id) = session_id(&jar) {
        let session = state.sessions.get_or_create(&id).await;
        return (jar, session);
    }

    let id = Uuid::new_v4().to_string();
    let session = state.sessions.get_or_create(&id).await;
    let cookie = Cookie::build((SESSION_COOKIE, id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);
    (jar.add(cookie), session)
}

/// The caller's session id, if the request carries one this server could have issued.
fn session_id(jar: &CookieJar) -> Option<String> {
    let value = jar.get(SESSION_COOKIE)?.value();
    Uuid::parse_str(value).ok().map(|id| id.to_string())
}
