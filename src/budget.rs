//! Per-category monthly budget limits.
//!
//! Each user can override the default limit for a spending category. The
//! overrides are stored one row per (user, category) pair, and setting a
//! budget upserts the row so repeated submissions never create duplicates.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::{Connection, OptionalExtension, params};
use serde::Deserialize;

use crate::{
    AppState, Error,
    category::{SUGGESTED_CATEGORIES, default_limit_for, icon_for},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE,
        TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, format_currency,
    },
    navigation::NavBar,
    user::UserID,
};

/// A user's monthly spending limit for one category.
#[derive(Debug, Clone, PartialEq)]
pub struct Budget {
    /// The ID of the budget row.
    pub id: i64,
    /// The user the limit applies to.
    pub user_id: UserID,
    /// The spending category, stored lowercase.
    pub category: String,
    /// The monthly limit in dollars. Always greater than zero.
    pub monthly_limit: f64,
}

/// Create the budget table.
///
/// The UNIQUE constraint on (user_id, category) is what makes
/// [set_budget]'s upsert atomic.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS budget (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL REFERENCES user(id),
                category TEXT NOT NULL,
                monthly_limit REAL NOT NULL,
                UNIQUE(user_id, category)
                )",
        (),
    )?;

    Ok(())
}

/// Set `user_id`'s monthly limit for `category`, inserting or overwriting
/// the existing limit in a single statement.
///
/// The category is trimmed and lowercased before storing so that lookups
/// are case-insensitive.
///
/// # Errors
///
/// Returns:
/// - [Error::EmptyCategory] if the category is empty or whitespace.
/// - [Error::InvalidLimit] if the limit is zero or negative.
pub fn set_budget(
    user_id: UserID,
    category: &str,
    monthly_limit: f64,
    connection: &Connection,
) -> Result<Budget, Error> {
    let category = category.trim().to_lowercase();

    if category.is_empty() {
        return Err(Error::EmptyCategory);
    }

    if monthly_limit <= 0.0 {
        return Err(Error::InvalidLimit(monthly_limit));
    }

    connection.execute(
        "INSERT INTO budget (user_id, category, monthly_limit) VALUES (?1, ?2, ?3) \
        ON CONFLICT(user_id, category) DO UPDATE SET monthly_limit = excluded.monthly_limit",
        params![user_id.as_i64(), category, monthly_limit],
    )?;

    let (id, monthly_limit) = connection.query_row(
        "SELECT id, monthly_limit FROM budget WHERE user_id = ?1 AND category = ?2",
        params![user_id.as_i64(), category],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;

    Ok(Budget {
        id,
        user_id,
        category,
        monthly_limit,
    })
}

/// Get all of `user_id`'s budget overrides, sorted by category.
///
/// # Errors
///
/// Returns an [Error::SqlError] if an SQL related error occurred.
pub fn get_budgets_for_user(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Budget>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, category, monthly_limit FROM budget \
            WHERE user_id = ?1 ORDER BY category",
        )?
        .query_map(params![user_id.as_i64()], |row| {
            Ok(Budget {
                id: row.get(0)?,
                user_id: UserID::new(row.get(1)?),
                category: row.get(2)?,
                monthly_limit: row.get(3)?,
            })
        })?
        .map(|budget| budget.map_err(|error| error.into()))
        .collect()
}

/// Get the monthly limit that applies to `category` for `user_id`.
///
/// Falls back to the built-in default for the category when the user has
/// not set their own limit.
///
/// # Errors
///
/// Returns an [Error::SqlError] if an SQL related error occurred.
pub fn budget_limit_for(
    user_id: UserID,
    category: &str,
    connection: &Connection,
) -> Result<f64, Error> {
    let category = category.trim().to_lowercase();

    let override_limit = connection
        .query_row(
            "SELECT monthly_limit FROM budget WHERE user_id = ?1 AND category = ?2",
            params![user_id.as_i64(), category],
            |row| row.get(0),
        )
        .optional()?;

    Ok(override_limit.unwrap_or_else(|| default_limit_for(&category)))
}

fn edit_budget_view(user_id: UserID, connection: &Connection) -> Result<Markup, Error> {
    let nav_bar = NavBar::new(endpoints::EDIT_BUDGET_VIEW).into_html();

    // Suggested categories first with any overrides applied, then the
    // user's custom categories.
    let overrides = get_budgets_for_user(user_id, connection)?;
    let mut rows: Vec<(String, f64)> = SUGGESTED_CATEGORIES
        .iter()
        .map(|category| {
            let limit = overrides
                .iter()
                .find(|budget| budget.category == *category)
                .map(|budget| budget.monthly_limit)
                .unwrap_or_else(|| default_limit_for(category));

            (category.to_string(), limit)
        })
        .collect();

    for budget in &overrides {
        if !SUGGESTED_CATEGORIES.contains(&budget.category.as_str()) {
            rows.push((budget.category.clone(), budget.monthly_limit));
        }
    }

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            h2 class="text-xl font-bold py-4" { "Monthly Budgets" }

            table class="w-full max-w-md text-sm text-left"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th class=(TABLE_CELL_STYLE) { "Category" }
                        th class=(TABLE_CELL_STYLE) { "Monthly limit" }
                    }
                }

                tbody
                {
                    @for (category, limit) in &rows
                    {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td class=(TABLE_CELL_STYLE) { (icon_for(category)) " " (category) }
                            td class=(TABLE_CELL_STYLE) { (format_currency(*limit)) }
                        }
                    }
                }
            }

            form
                hx-post=(endpoints::EDIT_BUDGET_VIEW)
                hx-target-error="#alert-container"
                class="w-full max-w-md space-y-4 md:space-y-6 py-6"
            {
                h3 class="text-lg font-bold" { "Set a limit" }

                div
                {
                    label for="category" class=(FORM_LABEL_STYLE) { "Category" }

                    input
                        name="category"
                        id="category"
                        type="text"
                        list="category-suggestions"
                        placeholder="e.g. food"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);

                    datalist id="category-suggestions"
                    {
                        @for category in SUGGESTED_CATEGORIES {
                            option value=(category) {}
                        }
                    }
                }

                div
                {
                    label for="monthly_limit" class=(FORM_LABEL_STYLE) { "Monthly limit" }

                    input
                        name="monthly_limit"
                        id="monthly_limit"
                        type="number"
                        step="0.01"
                        min="0.01"
                        placeholder="0.00"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                button type="submit" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
                {
                    "Save Budget"
                }
            }
        }
    };

    Ok(base("Budgets", &[], &content))
}

/// The state needed to display and set budgets.
#[derive(Debug, Clone)]
pub struct BudgetState {
    /// The database connection for managing budgets.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for BudgetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders the page that lists budget limits and the form to change one.
pub async fn get_edit_budget_page(
    State(state): State<BudgetState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    Ok(edit_budget_view(user_id, &connection)?.into_response())
}

/// The form data for setting a budget limit.
#[derive(Debug, Deserialize)]
pub struct BudgetForm {
    /// The spending category to set the limit for.
    pub category: String,
    /// The new monthly limit in dollars.
    pub monthly_limit: f64,
}

/// A route handler for setting a budget limit, redirects to the dashboard
/// on success.
pub async fn set_budget_endpoint(
    State(state): State<BudgetState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<BudgetForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    if let Err(error) = set_budget(user_id, &form.category, form.monthly_limit, &connection) {
        tracing::error!("could not set budget: {error}");

        return error.into_alert_response();
    }

    (
        HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}
