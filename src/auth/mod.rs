//! Cookie based authentication: the token format, cookie handling, the
//! route-guard middleware, and redirect URL helpers.

pub(crate) mod cookie;
mod middleware;
mod redirect;
mod token;

pub(crate) use cookie::{DEFAULT_COOKIE_DURATION, invalidate_auth_cookie, set_auth_cookie};
pub use middleware::{auth_guard, auth_guard_hx};
pub(crate) use redirect::normalize_redirect_url;

#[cfg(test)]
pub(crate) use cookie::COOKIE_TOKEN;

#[cfg(test)]
pub(crate) use middleware::AuthState;
