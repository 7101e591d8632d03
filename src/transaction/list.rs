//! The page that lists a user's transactions in a paged table.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    category::icon_for,
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_DELETE_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, format_currency, link,
    },
    navigation::NavBar,
    pagination::{
        PaginationConfig, PaginationIndicator, create_pagination_indicators, page_count,
    },
    transaction::core::{
        Transaction, TransactionKind, count_transactions_for_user, get_transactions_page_for_user,
    },
    user::UserID,
};

fn transaction_row(transaction: &Transaction) -> Markup {
    let edit_route = format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, transaction.id);
    let delete_route = format_endpoint(endpoints::DELETE_TRANSACTION, transaction.id);

    let (amount_text, amount_style) = match transaction.kind {
        TransactionKind::Income => (
            format!("+{}", format_currency(transaction.amount)),
            "text-green-600 dark:text-green-400",
        ),
        TransactionKind::Expense => (
            format_currency(-transaction.amount),
            "text-red-600 dark:text-red-400",
        ),
    };

    html! {
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE) { (transaction.date) }
            td class=(TABLE_CELL_STYLE)
            {
                (icon_for(&transaction.category)) " " (transaction.category)
            }
            td class=(TABLE_CELL_STYLE) { (transaction.description) }
            td class=(format!("{TABLE_CELL_STYLE} {amount_style}")) { (amount_text) }
            td class=(TABLE_CELL_STYLE)
            {
                a href=(edit_route) class=(LINK_STYLE) { "Edit" }
            }
            td class=(TABLE_CELL_STYLE)
            {
                button
                    hx-post=(delete_route)
                    hx-target="closest tr"
                    hx-swap="outerHTML"
                    hx-target-error="#alert-container"
                    hx-confirm="Delete this transaction?"
                    class=(BUTTON_DELETE_STYLE)
                {
                    "Delete"
                }
            }
        }
    }
}

fn pagination_widget(indicators: &[PaginationIndicator]) -> Markup {
    let page_route = |page: u64| format!("{}?page={}", endpoints::TRANSACTIONS_VIEW, page);

    html! {
        nav aria-label="pagination" class="flex gap-2 py-4"
        {
            @for indicator in indicators
            {
                @match indicator
                {
                    PaginationIndicator::BackButton(page) => {
                        a href=(page_route(*page)) class=(LINK_STYLE) { "Previous" }
                    }
                    PaginationIndicator::NextButton(page) => {
                        a href=(page_route(*page)) class=(LINK_STYLE) { "Next" }
                    }
                    PaginationIndicator::CurrPage(page) => {
                        span aria-current="page" class="font-bold" { (page) }
                    }
                    PaginationIndicator::Page(page) => {
                        a href=(page_route(*page)) class=(LINK_STYLE) { (page) }
                    }
                }
            }
        }
    }
}

fn transactions_view(transactions: &[Transaction], indicators: &[PaginationIndicator]) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            h2 class="text-xl font-bold py-4" { "Transactions" }

            @if transactions.is_empty() {
                p
                {
                    "No transactions yet. "
                    (link(endpoints::ADD_TRANSACTION_VIEW, "Add your first transaction"))
                    "."
                }
            } @else {
                table class="w-full max-w-3xl text-sm text-left"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th class=(TABLE_CELL_STYLE) { "Date" }
                            th class=(TABLE_CELL_STYLE) { "Category" }
                            th class=(TABLE_CELL_STYLE) { "Description" }
                            th class=(TABLE_CELL_STYLE) { "Amount" }
                            th class=(TABLE_CELL_STYLE) colspan="2" { "Actions" }
                        }
                    }

                    tbody
                    {
                        @for transaction in transactions {
                            (transaction_row(transaction))
                        }
                    }
                }

                (pagination_widget(indicators))
            }
        }
    };

    base("Transactions", &[], &content)
}

/// The state needed to display the transactions page.
#[derive(Debug, Clone)]
pub struct TransactionsViewState {
    /// The database connection for querying transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The config that controls how to display pages of data.
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for TransactionsViewState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// The query parameters accepted by the transactions page.
#[derive(Debug, Deserialize)]
pub struct TransactionsQuery {
    /// The one-based page number to display.
    pub page: Option<u64>,
    /// How many transactions to show per page.
    pub page_size: Option<u64>,
}

/// Renders the paged table of the user's transactions, newest first.
pub async fn get_transactions_page(
    State(state): State<TransactionsViewState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<TransactionsQuery>,
) -> Result<Response, Error> {
    let page = query.page.unwrap_or(state.pagination_config.default_page);
    let page_size = query
        .page_size
        .unwrap_or(state.pagination_config.default_page_size)
        .max(1);

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let transaction_count = count_transactions_for_user(user_id, &connection)?;
    let page_count = page_count(transaction_count, page_size);
    let page = page.clamp(1, page_count);

    let transactions = get_transactions_page_for_user(user_id, page, page_size, &connection)?;
    let indicators =
        create_pagination_indicators(page, page_count, state.pagination_config.max_pages);

    Ok(transactions_view(&transactions, &indicators).into_response())
}
