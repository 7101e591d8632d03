//! The registration page and endpoint for creating a new account.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::PrivateCookieJar;
use axum_htmx::HxRedirect;
use email_address::EmailAddress;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error, PasswordHash,
    auth::cookie::get_token_from_cookies,
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, base, link, log_in_register, password_input, text_input},
    internal_server_error::render_internal_server_error,
    password::MIN_PASSWORD_LENGTH,
    user::create_user,
};

/// The minimum number of characters for a username.
const MIN_USERNAME_LENGTH: usize = 3;
/// The maximum number of characters for a username.
const MAX_USERNAME_LENGTH: usize = 100;

/// The per-field error messages shown inline in the registration form.
#[derive(Debug, Default)]
struct RegisterFormErrors<'a> {
    username: Option<&'a str>,
    email: Option<&'a str>,
    password: Option<&'a str>,
    confirm_password: Option<&'a str>,
}

fn registration_form(username: &str, email: &str, errors: RegisterFormErrors) -> Markup {
    html! {
        form
            hx-post=(endpoints::REGISTER)
            hx-indicator="#indicator"
            hx-swap="outerHTML"
            class="space-y-4 md:space-y-6"
        {
            (text_input("username", "Username", "text", username, errors.username))
            (text_input("email", "Email", "email", email, errors.email))
            (password_input("password", "Password", MIN_PASSWORD_LENGTH as u8, errors.password))
            (password_input(
                "confirm_password",
                "Confirm Password",
                MIN_PASSWORD_LENGTH as u8,
                errors.confirm_password,
            ))

            button
                type="submit" id="submit-button" tabindex="0"
                class=(BUTTON_PRIMARY_STYLE)
            {
                "Create Account"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Already have an account? "
                (link(endpoints::LOG_IN, "Log in here"))
            }
        }
    }
}

/// Display the registration page.
///
/// Users that already have a valid session are sent to the dashboard
/// instead of the form.
pub async fn get_register_page(jar: PrivateCookieJar) -> Response {
    if get_token_from_cookies(&jar).is_ok() {
        return Redirect::to(endpoints::DASHBOARD_VIEW).into_response();
    }

    let registration_form = registration_form("", "", RegisterFormErrors::default());
    let content = log_in_register("Create an Account", &registration_form);
    base("Register", &[], &content).into_response()
}

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The database connection for creating users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for registering a new account.
#[derive(Serialize, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Validate the form fields, returning the first error per field.
fn validate_register_form(form: &RegisterForm) -> Result<(), RegisterFormErrors<'static>> {
    let mut errors = RegisterFormErrors::default();
    let mut is_valid = true;

    let username_length = form.username.chars().count();
    if !(MIN_USERNAME_LENGTH..=MAX_USERNAME_LENGTH).contains(&username_length) {
        errors.username = Some("Username must be between 3 and 100 characters.");
        is_valid = false;
    }

    if !EmailAddress::is_valid(&form.email) {
        errors.email = Some("Enter a valid email address.");
        is_valid = false;
    }

    if form.password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.password = Some("Password must have at least 6 characters.");
        is_valid = false;
    }

    if form.password != form.confirm_password {
        errors.confirm_password = Some("Passwords do not match.");
        is_valid = false;
    }

    if is_valid { Ok(()) } else { Err(errors) }
}

/// Create a new user account and redirect to the log-in page.
///
/// On validation failure, re-renders the registration form fragment with
/// inline error messages so htmx can swap it in place.
pub async fn post_register(
    State(state): State<RegistrationState>,
    Form(form): Form<RegisterForm>,
) -> Response {
    if let Err(errors) = validate_register_form(&form) {
        return registration_form(&form.username, &form.email, errors).into_response();
    }

    let password_hash = match PasswordHash::from_raw_password(&form.password, PasswordHash::DEFAULT_COST)
    {
        Ok(hash) => hash,
        Err(error) => {
            tracing::error!("an error occurred while hashing a password: {error}");
            return render_internal_server_error();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match create_user(&form.username, &form.email, password_hash, &connection) {
        Ok(_) => (
            HxRedirect(format!("{}?registered=true", endpoints::LOG_IN)),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(Error::DuplicateEmail) => registration_form(
            &form.username,
            &form.email,
            RegisterFormErrors {
                email: Some("This email address is already registered."),
                ..RegisterFormErrors::default()
            },
        )
        .into_response(),
        Err(Error::DuplicateUsername) => registration_form(
            &form.username,
            &form.email,
            RegisterFormErrors {
                username: Some("This username is already taken."),
                ..RegisterFormErrors::default()
            },
        )
        .into_response(),
        Err(error) => {
            tracing::error!("An unhandled error occurred while inserting a new user: {error}");
            render_internal_server_error()
        }
    }
}


#[cfg(test)]
mod post_register_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Form, Router, extract::State, http::StatusCode, routing::post};
    use axum_htmx::HX_REDIRECT;
    use axum_test::TestServer;
    use rusqlite::Connection;
    use scraper::Html;

    use crate::{db::initialize, endpoints};

    use super::{RegisterForm, RegistrationState, post_register};

    fn get_test_server() -> TestServer {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        initialize(&connection).expect("Could not initialize database");

        let state = RegistrationState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let app = Router::new()
            .route(endpoints::REGISTER, post(post_register))
            .with_state(state);

        TestServer::new(app)
    }

    fn valid_form() -> RegisterForm {
        RegisterForm {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "hunter2!".to_string(),
            confirm_password: "hunter2!".to_string(),
        }
    }

    #[track_caller]
    fn assert_has_error_message(fragment: &Html, want_text: &str) {
        let p_selector = scraper::Selector::parse("p.text-red-500").unwrap();
        let paragraphs = fragment.select(&p_selector).collect::<Vec<_>>();
        assert!(!paragraphs.is_empty(), "want at least 1 error p, got none");
        let text = paragraphs
            .iter()
            .map(|p| p.text().collect::<String>().to_lowercase())
            .collect::<Vec<_>>()
            .join(" ");
        assert!(
            text.contains(want_text),
            "'{text}' does not contain the text '{want_text}'"
        );
    }

    #[tokio::test]
    async fn register_succeeds_and_redirects_to_log_in() {
        let server = get_test_server();

        let response = server.post(endpoints::REGISTER).form(&valid_form()).await;

        response.assert_status_see_other();
        let location = response.header(HX_REDIRECT);
        assert_eq!(
            location,
            format!("{}?registered=true", endpoints::LOG_IN),
            "got redirect to {location:?}"
        );
    }

    #[tokio::test]
    async fn register_fails_with_short_username() {
        let server = get_test_server();

        let response = server
            .post(endpoints::REGISTER)
            .form(&RegisterForm {
                username: "ab".to_string(),
                ..valid_form()
            })
            .await;

        response.assert_status_ok();
        let fragment = Html::parse_fragment(&response.text());
        assert_has_error_message(&fragment, "username must be between");
    }

    #[tokio::test]
    async fn register_fails_with_invalid_email() {
        let server = get_test_server();

        let response = server
            .post(endpoints::REGISTER)
            .form(&RegisterForm {
                email: "not-an-email".to_string(),
                ..valid_form()
            })
            .await;

        response.assert_status_ok();
        let fragment = Html::parse_fragment(&response.text());
        assert_has_error_message(&fragment, "valid email");
    }

    #[tokio::test]
    async fn register_fails_with_short_password() {
        let server = get_test_server();

        let response = server
            .post(endpoints::REGISTER)
            .form(&RegisterForm {
                password: "abc".to_string(),
                confirm_password: "abc".to_string(),
                ..valid_form()
            })
            .await;

        response.assert_status_ok();
        let fragment = Html::parse_fragment(&response.text());
        assert_has_error_message(&fragment, "at least 6 characters");
    }

    #[tokio::test]
    async fn register_fails_when_passwords_do_not_match() {
        let server = get_test_server();

        let response = server
            .post(endpoints::REGISTER)
            .form(&RegisterForm {
                confirm_password: "different1".to_string(),
                ..valid_form()
            })
            .await;

        response.assert_status_ok();
        let fragment = Html::parse_fragment(&response.text());
        assert_has_error_message(&fragment, "passwords do not match");
    }

    #[tokio::test]
    async fn register_reports_internal_error_when_lock_is_poisoned() {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        initialize(&connection).expect("Could not initialize database");
        let state = RegistrationState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let db_connection = state.db_connection.clone();
        std::thread::spawn(move || {
            let _guard = db_connection.lock().unwrap();
            panic!("poison the database lock");
        })
        .join()
        .unwrap_err();

        let response = post_register(State(state), Form(valid_form())).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn register_fails_with_duplicate_email() {
        let server = get_test_server();
        server
            .post(endpoints::REGISTER)
            .form(&valid_form())
            .await
            .assert_status_see_other();

        let response = server
            .post(endpoints::REGISTER)
            .form(&RegisterForm {
                username: "bob".to_string(),
                ..valid_form()
            })
            .await;

        response.assert_status_ok();
        let fragment = Html::parse_fragment(&response.text());
        assert_has_error_message(&fragment, "already registered");
    }

    #[tokio::test]
    async fn register_fails_with_duplicate_username() {
        let server = get_test_server();
        server
            .post(endpoints::REGISTER)
            .form(&valid_form())
            .await
            .assert_status_see_other();

        let response = server
            .post(endpoints::REGISTER)
            .form(&RegisterForm {
                email: "alice2@example.com".to_string(),
                ..valid_form()
            })
            .await;

        response.assert_status_ok();
        let fragment = Html::parse_fragment(&response.text());
        assert_has_error_message(&fragment, "already taken");
    }
}
