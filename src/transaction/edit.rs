//! The page and endpoint for editing an existing transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    endpoints::{self, format_endpoint},
    html::{BUTTON_PRIMARY_STYLE, PAGE_CONTAINER_STYLE, base},
    navigation::NavBar,
    transaction::{
        core::{Transaction, TransactionId, get_transaction_for_user, update_transaction},
        form::{TransactionForm, TransactionFormDefaults, transaction_form_fields},
    },
    user::UserID,
};

fn edit_transaction_view(transaction: &Transaction) -> Markup {
    let edit_route = format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, transaction.id);
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();

    let description = if transaction.description.is_empty() {
        None
    } else {
        Some(transaction.description.as_str())
    };

    let fields = transaction_form_fields(&TransactionFormDefaults {
        kind: transaction.kind,
        category: Some(&transaction.category),
        amount: Some(transaction.amount),
        date: transaction.date,
        description,
        max_date: OffsetDateTime::now_utc().date(),
    });

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            form
                hx-post=(edit_route)
                hx-target-error="#alert-container"
                class="w-full max-w-md space-y-4 md:space-y-6"
            {
                h2 class="text-xl font-bold" { "Edit Transaction" }

                (fields)

                button type="submit" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
                {
                    "Save Changes"
                }
            }
        }
    };

    base("Edit Transaction", &[], &content)
}

/// The state needed to fetch and update a transaction.
#[derive(Debug, Clone)]
pub struct EditTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders the edit page prefilled with the transaction's current values.
///
/// Responds with the 404 page if the transaction does not exist or belongs
/// to another user, so that transaction IDs cannot be probed through this
/// page.
pub async fn get_edit_transaction_page(
    State(state): State<EditTransactionState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Response, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let transaction = get_transaction_for_user(transaction_id, user_id, &connection)?;

    Ok(edit_transaction_view(&transaction).into_response())
}

/// A route handler for updating a transaction, redirects to the dashboard
/// on success.
pub async fn edit_transaction_endpoint(
    State(state): State<EditTransactionState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let today = OffsetDateTime::now_utc().date();

    let data = match form.into_data(today) {
        Ok(data) => data,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    if let Err(error) = update_transaction(transaction_id, user_id, data, &connection) {
        tracing::error!("could not update transaction {transaction_id}: {error}");

        return error.into_alert_response();
    }

    (
        HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use axum_extra::extract::Form;
    use axum_htmx::HX_REDIRECT;
    use rusqlite::Connection;
    use scraper::Selector;
    use time::macros::date;

    use crate::{
        Error,
        db::initialize,
        test_utils::{assert_valid_html, parse_html_document},
        transaction::{
            core::{
                TransactionData, TransactionKind, create_transaction, get_transaction_by_id,
            },
            form::TransactionForm,
        },
        user::UserID,
    };

    use super::{EditTransactionState, edit_transaction_endpoint, get_edit_transaction_page};

    fn get_test_state() -> EditTransactionState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn.execute(
            "INSERT INTO user (username, email, password) VALUES ('alice', 'a@example.com', 'x'), \
            ('bob', 'b@example.com', 'x')",
            (),
        )
        .unwrap();

        EditTransactionState {
            db_connection: Arc::new(Mutex::new(conn)),
        }
    }

    fn create_test_transaction(state: &EditTransactionState, user_id: UserID) -> i64 {
        let connection = state.db_connection.lock().unwrap();
        create_transaction(
            TransactionData {
                kind: TransactionKind::Expense,
                category: "food".to_string(),
                amount: 12.5,
                date: date!(2025 - 06 - 01),
                description: "lunch".to_string(),
            },
            user_id,
            &connection,
        )
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn page_prefills_form_with_transaction_values() {
        let state = get_test_state();
        let id = create_test_transaction(&state, UserID::new(1));

        let response = get_edit_transaction_page(
            State(state),
            Extension(UserID::new(1)),
            Path(id),
        )
        .await
        .unwrap();

        let document = parse_html_document(response).await;
        assert_valid_html(&document);

        let category_selector = Selector::parse("input[name=category]").unwrap();
        let category = document.select(&category_selector).next().unwrap();
        assert_eq!(category.value().attr("value"), Some("food"));

        let amount_selector = Selector::parse("input[name=amount]").unwrap();
        let amount = document.select(&amount_selector).next().unwrap();
        assert_eq!(amount.value().attr("value"), Some("12.50"));

        let form_selector = Selector::parse("form").unwrap();
        let form = document.select(&form_selector).next().unwrap();
        assert_eq!(
            form.value().attr("hx-post"),
            Some(format!("/transactions/{id}/edit").as_str())
        );
    }

    #[tokio::test]
    async fn page_returns_not_found_for_other_users_transaction() {
        let state = get_test_state();
        let id = create_test_transaction(&state, UserID::new(1));

        let result =
            get_edit_transaction_page(State(state), Extension(UserID::new(2)), Path(id)).await;

        assert_eq!(result.err(), Some(Error::NotFound));
    }

    #[tokio::test]
    async fn endpoint_updates_transaction_and_redirects_to_dashboard() {
        let state = get_test_state();
        let id = create_test_transaction(&state, UserID::new(1));

        let form = TransactionForm {
            kind: "income".to_string(),
            category: "income".to_string(),
            amount: 250.0,
            date: Some(date!(2025 - 07 - 01)),
            description: Some("salary".to_string()),
        };

        let response = edit_transaction_endpoint(
            State(state.clone()),
            Extension(UserID::new(1)),
            Path(id),
            Form(form),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(HX_REDIRECT).unwrap(), "/");

        let connection = state.db_connection.lock().unwrap();
        let updated = get_transaction_by_id(id, &connection).unwrap();
        assert_eq!(updated.kind, TransactionKind::Income);
        assert_eq!(updated.amount, 250.0);
    }

    #[tokio::test]
    async fn endpoint_rejects_other_users_transaction() {
        let state = get_test_state();
        let id = create_test_transaction(&state, UserID::new(1));

        let form = TransactionForm {
            kind: "expense".to_string(),
            category: "food".to_string(),
            amount: 1.0,
            date: None,
            description: None,
        };

        let response = edit_transaction_endpoint(
            State(state.clone()),
            Extension(UserID::new(2)),
            Path(id),
            Form(form),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let connection = state.db_connection.lock().unwrap();
        let unchanged = get_transaction_by_id(id, &connection).unwrap();
        assert_eq!(unchanged.amount, 12.5);
    }
}
