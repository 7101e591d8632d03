//! Spendlog is a web app for tracking personal income and spending.
//!
//! Users register an account, record income/expense transactions, set
//! per-category monthly budget limits, and view an aggregated dashboard
//! with charts. This library provides a REST API that directly serves
//! HTML pages.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod alert;
mod app_state;
mod auth;
mod budget;
mod category;
mod dashboard;
mod db;
mod endpoints;
mod html;
mod internal_server_error;
mod log_in;
mod log_out;
mod logging;
mod navigation;
mod not_found;
mod pagination;
mod password;
mod register;
mod routing;
mod transaction;
mod user;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use logging::logging_middleware;
pub use password::PasswordHash;
pub use routing::build_router;
pub use user::{User, UserID};

use crate::{
    alert::alert_error, internal_server_error::render_internal_server_error,
    not_found::get_404_not_found_response,
};

/// An async task that waits for either the ctrl+c or terminate signal,
/// whichever comes first, and then signals the server to shut down
/// gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The email/password combination did not match a registered user.
    ///
    /// The same variant is used for an unknown email and a wrong password
    /// so that the log-in flow cannot be used to probe which emails are
    /// registered.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The auth token cookie is missing from the cookie jar in the request.
    #[error("no auth cookie in the cookie jar")]
    CookieMissing,

    /// The email address used for registration already belongs to a user.
    #[error("the email address is already registered")]
    DuplicateEmail,

    /// The username used for registration already belongs to a user.
    #[error("the username is already taken")]
    DuplicateUsername,

    /// The password did not meet the minimum length requirement.
    ///
    /// The value is the minimum number of characters.
    #[error("passwords must have at least {0} characters")]
    PasswordTooShort(usize),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// A transaction kind string was neither "income" nor "expense".
    #[error("\"{0}\" is not a valid transaction kind")]
    InvalidKind(String),

    /// An empty string was used for a transaction or budget category.
    #[error("category cannot be empty")]
    EmptyCategory,

    /// A transaction amount was negative.
    ///
    /// Amounts are stored as positive magnitudes; the sign is derived from
    /// the transaction kind during aggregation, never stored.
    #[error("{0} is a negative amount, which is not allowed")]
    NegativeAmount(f64),

    /// A budget limit was zero or negative.
    #[error("{0} is not a valid budget limit, it must be greater than zero")]
    InvalidLimit(f64),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The resource exists but belongs to another user.
    #[error("the requested resource belongs to another user")]
    Forbidden,

    /// The mutex guarding the database connection was poisoned.
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An error occurred while serializing a struct as JSON.
    #[error("could not serialize as JSON: {0}")]
    JsonSerializationError(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.contains("user.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.contains("user.username") =>
            {
                Error::DuplicateUsername
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::Forbidden => (
                StatusCode::FORBIDDEN,
                crate::html::error_view(
                    "Forbidden",
                    "403",
                    "Not allowed.",
                    "This resource belongs to another user.",
                ),
            )
                .into_response(),
            // Any errors that are not handled above are not intended to be
            // shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                render_internal_server_error()
            }
        }
    }
}

impl Error {
    /// Render the error as an htmx alert fragment with the matching status
    /// code, for POST endpoints that swap error messages into the page.
    pub(crate) fn into_alert_response(self) -> Response {
        match self {
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                alert_error(
                    "Not found",
                    "The transaction could not be found. \
                    Try refreshing the page to see if it has already been deleted.",
                ),
            )
                .into_response(),
            Error::Forbidden => (
                StatusCode::FORBIDDEN,
                alert_error("Not allowed", "This transaction belongs to another user."),
            )
                .into_response(),
            error @ (Error::InvalidKind(_)
            | Error::EmptyCategory
            | Error::NegativeAmount(_)
            | Error::InvalidLimit(_)) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                alert_error("Invalid input", &error.to_string()),
            )
                .into_response(),
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    alert_error(
                        "Something went wrong",
                        "An unexpected error occurred, check the server logs for more details.",
                    ),
                )
                    .into_response()
            }
        }
    }
}
