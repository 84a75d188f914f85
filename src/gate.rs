//!
//! Admin request gate
//! ------------------
//! Middleware over the whole router that decides, per request, whether the
//! caller may reach admin-only operations. Unprotected routes pass through
//! with no token work at all, keeping the public storefront available even
//! when the auth service is down. Protected routes resolve the session
//! cookie against the auth service and then apply the admin policy; every
//! outcome is terminal per request and the gate holds no cross-request
//! state.
//!
//! Denial semantics differ by route kind: browser-navigable admin pages
//! redirect to the login page carrying the original path in `next`, API
//! routes get a structured 401. A valid-but-not-admin principal is 403 (no
//! redirect: the caller is authenticated, just not authorized), and an
//! unreachable or unconfigured auth service is a 500-class failure distinct
//! from bad credentials.

use axum::extract::{Request, State};
use axum::http::{HeaderMap, Method};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};

use crate::error::AppError;
use crate::identity::{admin_allowlist, is_admin};
use crate::server::AppState;

pub const ADMIN_COOKIE: &str = "fs_admin_token";
pub const LOGIN_PAGE: &str = "/admin/login";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RouteClass {
    /// No admin requirement; forwarded untouched.
    Public,
    /// Protected browser-navigable page: denial redirects to the login page.
    Browser,
    /// Protected API route: denial is a structured error response.
    Api,
}

fn classify(method: &Method, path: &str) -> RouteClass {
    if path == "/ekle" || path.starts_with("/ekle/") {
        return RouteClass::Browser;
    }
    if path.starts_with("/api/uploads") {
        return RouteClass::Api;
    }
    if path.starts_with("/api/menu-items") && method != Method::GET {
        return RouteClass::Api;
    }
    RouteClass::Public
}

pub fn parse_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let cookie = headers.get("cookie")?;
    let s = cookie.to_str().ok()?;
    for part in s.split(';') {
        let p = part.trim();
        if let Some(eq) = p.find('=') {
            let (k, v) = p.split_at(eq);
            if k == name { return Some(v[1..].to_string()); }
        }
    }
    None
}

fn deny_unauthenticated(class: RouteClass, path: &str) -> Response {
    match class {
        RouteClass::Browser => {
            let target = format!("{LOGIN_PAGE}?next={}", urlencoding::encode(path));
            Redirect::temporary(&target).into_response()
        }
        _ => AppError::authentication("Unauthorized.").into_response(),
    }
}

pub async fn admin_gate(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let class = classify(request.method(), request.uri().path());
    if class == RouteClass::Public {
        return next.run(request).await;
    }
    let path = request.uri().path().to_string();

    let Some(token) = parse_cookie(request.headers(), ADMIN_COOKIE) else {
        return deny_unauthenticated(class, &path);
    };

    let principal = match state.auth.resolve(&token).await {
        Ok(principal) => principal,
        // An unresolvable or expired token is treated like a missing one.
        Err(AppError::Authentication(_)) => return deny_unauthenticated(class, &path),
        Err(err) => return err.into_response(),
    };

    if !is_admin(&principal, &admin_allowlist()) {
        tracing::debug!(target: "gate", "forbidden: {} is not an admin", principal.user_id);
        return AppError::authorization("Forbidden.").into_response();
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn classification_matrix() {
        assert_eq!(classify(&Method::GET, "/"), RouteClass::Public);
        assert_eq!(classify(&Method::GET, "/menu/pizza"), RouteClass::Public);
        assert_eq!(classify(&Method::GET, "/api/menu-items"), RouteClass::Public);
        assert_eq!(classify(&Method::POST, "/api/menu-items"), RouteClass::Api);
        assert_eq!(classify(&Method::PUT, "/api/menu-items"), RouteClass::Api);
        assert_eq!(classify(&Method::DELETE, "/api/menu-items"), RouteClass::Api);
        assert_eq!(classify(&Method::POST, "/api/uploads"), RouteClass::Api);
        assert_eq!(classify(&Method::GET, "/api/images"), RouteClass::Public);
        assert_eq!(classify(&Method::GET, "/ekle"), RouteClass::Browser);
        assert_eq!(classify(&Method::GET, "/ekle/duzenle"), RouteClass::Browser);
        // Prefix match must not swallow sibling paths.
        assert_eq!(classify(&Method::GET, "/eklektik"), RouteClass::Public);
    }

    #[test]
    fn cookie_parsing() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "cookie",
            HeaderValue::from_static("a=1; fs_admin_token=tok-123; b=2"),
        );
        assert_eq!(parse_cookie(&headers, ADMIN_COOKIE).as_deref(), Some("tok-123"));
        assert_eq!(parse_cookie(&headers, "missing"), None);
        assert_eq!(parse_cookie(&HeaderMap::new(), ADMIN_COOKIE), None);
    }
}
