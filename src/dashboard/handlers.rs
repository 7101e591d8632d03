//! The route handler and view rendering for the dashboard page.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    budget::budget_limit_for,
    category::icon_for,
    dashboard::{
        aggregation::{
            Band, BudgetStatus, TransactionSummary, balance_series, budget_status,
            expense_totals_by_category, summarize,
        },
        charts::{
            DashboardChart, balance_line_chart, charts_script, charts_view, expenses_pie_chart,
        },
    },
    endpoints,
    html::{
        HeadElement, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base, format_currency, link,
    },
    navigation::NavBar,
    transaction::{Transaction, TransactionKind, get_transactions_for_user},
    user::{UserID, get_user_by_id},
};

/// How many of the newest transactions to show on the dashboard.
const RECENT_TRANSACTION_COUNT: usize = 5;

const ECHARTS_SCRIPT_URL: &str = "https://cdn.jsdelivr.net/npm/echarts@6.0.0/dist/echarts.min.js";

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for querying the user's data.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Display a page with an overview of the user's finances.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let user = get_user_by_id(user_id, &connection)?;
    let transactions = get_transactions_for_user(user_id, &connection)?;

    if transactions.is_empty() {
        return Ok(dashboard_no_data_view(&user.username).into_response());
    }

    let summary = summarize(&transactions);
    let expense_totals = expense_totals_by_category(&transactions);

    let budget_statuses = expense_totals
        .iter()
        .map(|(category, spent)| {
            let limit = budget_limit_for(user_id, category, &connection)?;

            Ok(budget_status(category.clone(), *spent, limit))
        })
        .collect::<Result<Vec<_>, Error>>()?;

    let charts = [
        DashboardChart {
            id: "expenses-chart",
            options: expenses_pie_chart(&expense_totals).to_string(),
        },
        DashboardChart {
            id: "balance-chart",
            options: balance_line_chart(&balance_series(&transactions)).to_string(),
        },
    ];

    Ok(
        dashboard_view(&user.username, &summary, &charts, &budget_statuses, &transactions)
            .into_response(),
    )
}

fn summary_card(label: &str, value: f64, value_style: &str) -> Markup {
    html! {
        div class="bg-white dark:bg-gray-800 rounded-lg shadow p-6"
        {
            p class="text-sm text-gray-500 dark:text-gray-400" { (label) }
            p class=(format!("text-2xl font-bold {value_style}")) { (format_currency(value)) }
        }
    }
}

fn budget_table(budget_statuses: &[BudgetStatus]) -> Markup {
    html! {
        section class="w-full mb-4"
        {
            h3 class="text-lg font-bold py-2" { "Budgets" }

            table class="w-full text-sm text-left"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th class=(TABLE_CELL_STYLE) { "Category" }
                        th class=(TABLE_CELL_STYLE) { "Spent" }
                        th class=(TABLE_CELL_STYLE) { "Limit" }
                        th class=(TABLE_CELL_STYLE) { "Used" }
                    }
                }

                tbody
                {
                    @for status in budget_statuses
                    {
                        @let bar_style = match status.band {
                            Band::Low => "bg-green-500",
                            Band::Medium => "bg-yellow-500",
                            Band::High => "bg-red-500",
                        };

                        tr class=(TABLE_ROW_STYLE)
                        {
                            td class=(TABLE_CELL_STYLE) { (status.icon) " " (status.category) }
                            td class=(TABLE_CELL_STYLE) { (format_currency(status.spent)) }
                            td class=(TABLE_CELL_STYLE) { (format_currency(status.limit)) }
                            td class=(TABLE_CELL_STYLE)
                            {
                                div class="w-full bg-gray-200 dark:bg-gray-700 rounded-full h-2.5"
                                {
                                    div
                                        class=(format!("{bar_style} h-2.5 rounded-full"))
                                        style=(format!("width: {}%", status.percent))
                                    {}
                                }

                                span class="text-xs" { (status.percent) "%" }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn recent_transactions_table(transactions: &[Transaction]) -> Markup {
    let recent = transactions.iter().take(RECENT_TRANSACTION_COUNT);

    html! {
        section class="w-full mb-4"
        {
            h3 class="text-lg font-bold py-2"
            {
                "Recent Transactions"
                " "
                (link(endpoints::TRANSACTIONS_VIEW, "(view all)"))
            }

            table class="w-full text-sm text-left"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th class=(TABLE_CELL_STYLE) { "Date" }
                        th class=(TABLE_CELL_STYLE) { "Category" }
                        th class=(TABLE_CELL_STYLE) { "Description" }
                        th class=(TABLE_CELL_STYLE) { "Amount" }
                    }
                }

                tbody
                {
                    @for transaction in recent
                    {
                        @let (amount_text, amount_style) = match transaction.kind {
                            TransactionKind::Income => (
                                format!("+{}", format_currency(transaction.amount)),
                                "text-green-600 dark:text-green-400",
                            ),
                            TransactionKind::Expense => (
                                format_currency(-transaction.amount),
                                "text-red-600 dark:text-red-400",
                            ),
                        };

                        tr class=(TABLE_ROW_STYLE)
                        {
                            td class=(TABLE_CELL_STYLE) { (transaction.date) }
                            td class=(TABLE_CELL_STYLE)
                            {
                                (icon_for(&transaction.category)) " " (transaction.category)
                            }
                            td class=(TABLE_CELL_STYLE) { (transaction.description) }
                            td class=(format!("{TABLE_CELL_STYLE} {amount_style}")) { (amount_text) }
                        }
                    }
                }
            }
        }
    }
}

fn dashboard_view(
    username: &str,
    summary: &TransactionSummary,
    charts: &[DashboardChart],
    budget_statuses: &[BudgetStatus],
    transactions: &[Transaction],
) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            h2 class="text-xl font-bold py-4" { "Hello, " (username) "!" }

            section class="w-full grid grid-cols-1 md:grid-cols-3 gap-4 mb-4"
            {
                (summary_card("Income", summary.total_income, "text-green-600 dark:text-green-400"))
                (summary_card("Spent", summary.total_spent, "text-red-600 dark:text-red-400"))
                (summary_card("Balance", summary.balance, ""))
            }

            (charts_view(charts))

            (budget_table(budget_statuses))

            (recent_transactions_table(transactions))
        }
    };

    let scripts = [
        HeadElement::ScriptLink(ECHARTS_SCRIPT_URL.to_owned()),
        charts_script(charts),
    ];

    base("Dashboard", &scripts, &content)
}

fn dashboard_no_data_view(username: &str) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();
    let add_transaction_link = link(endpoints::ADD_TRANSACTION_VIEW, "add a transaction");

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            h2 class="text-xl font-bold py-4" { "Hello, " (username) "!" }

            p
            {
                "Nothing here yet. Charts will show up once you "
                (add_transaction_link) "."
            }
        }
    };

    base("Dashboard", &[], &content)
}
