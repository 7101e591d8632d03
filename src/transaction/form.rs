//! The form fields shared by the add and edit transaction pages, and the
//! validation that turns a form submission into [TransactionData].

use maud::{Markup, html};
use serde::Deserialize;
use time::Date;

use crate::{
    Error,
    category::SUGGESTED_CATEGORIES,
    html::{FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE},
    transaction::core::{TransactionData, TransactionKind},
};

/// The values to prefill the transaction form with.
pub struct TransactionFormDefaults<'a> {
    pub kind: TransactionKind,
    pub category: Option<&'a str>,
    pub amount: Option<f64>,
    pub date: Date,
    pub description: Option<&'a str>,
    /// The latest date the form accepts, normally today.
    pub max_date: Date,
}

pub fn transaction_form_fields(defaults: &TransactionFormDefaults<'_>) -> Markup {
    let is_expense = matches!(defaults.kind, TransactionKind::Expense);
    let amount_str = defaults.amount.map(|amount| format!("{:.2}", amount.abs()));

    html! {
        fieldset class="space-y-2"
        {
            legend class=(FORM_LABEL_STYLE) { "Type" }

            div class="flex gap-6"
            {
                div class="flex items-center gap-3"
                {
                    input
                        name="kind"
                        id="kind-expense"
                        type="radio"
                        value="expense"
                        checked[is_expense]
                        required
                        tabindex="0";

                    label for="kind-expense" class=(FORM_LABEL_STYLE) { "Expense" }
                }

                div class="flex items-center gap-3"
                {
                    input
                        name="kind"
                        id="kind-income"
                        type="radio"
                        value="income"
                        checked[!is_expense]
                        required
                        tabindex="0";

                    label for="kind-income" class=(FORM_LABEL_STYLE) { "Income" }
                }
            }
        }

        div
        {
            label
                for="category"
                class=(FORM_LABEL_STYLE)
            {
                "Category"
            }

            input
                name="category"
                id="category"
                type="text"
                list="category-suggestions"
                placeholder="e.g. food"
                required
                value=[defaults.category]
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
            label
                for="amount"
                class=(FORM_LABEL_STYLE)
            {
                "Amount"
            }

            input
                name="amount"
                id="amount"
                type="number"
                step="0.01"
                min="0"
                placeholder="0.00"
                required
                value=[amount_str.as_deref()]
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label
                for="date"
                class=(FORM_LABEL_STYLE)
            {
                "Date"
            }

            input
                name="date"
                id="date"
                type="date"
                max=(defaults.max_date)
                value=(defaults.date)
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label
                for="description"
                class=(FORM_LABEL_STYLE)
            {
                "Description"
            }

            input
                name="description"
                id="description"
                type="text"
                placeholder="Description"
                value=[defaults.description]
                class=(FORM_TEXT_INPUT_STYLE);
        }
    }
}

/// The form data submitted from the add and edit transaction pages.
#[derive(Debug, Deserialize)]
pub struct TransactionForm {
    pub kind: String,
    pub category: String,
    pub amount: f64,
    /// An omitted or empty date defaults to today.
    #[serde(default)]
    pub date: Option<Date>,
    #[serde(default)]
    pub description: Option<String>,
}

impl TransactionForm {
    /// Validate the form and convert it into [TransactionData].
    ///
    /// The category is stored as submitted, apart from trimming whitespace.
    /// Icon and budget lookups normalize the case themselves.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - [Error::InvalidKind] if the kind is not "income" or "expense".
    /// - [Error::EmptyCategory] if the category is empty or whitespace.
    /// - [Error::NegativeAmount] if the amount is negative.
    pub fn into_data(self, today: Date) -> Result<TransactionData, Error> {
        let kind = self.kind.parse::<TransactionKind>()?;

        let category = self.category.trim().to_string();

        if category.is_empty() {
            return Err(Error::EmptyCategory);
        }

        if self.amount < 0.0 {
            return Err(Error::NegativeAmount(self.amount));
        }

        Ok(TransactionData {
            kind,
            category,
            amount: self.amount,
            date: self.date.unwrap_or(today),
            description: self.description.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod form_validation_tests {
    use time::macros::date;

    use crate::{Error, transaction::core::TransactionKind};

    use super::TransactionForm;

    const TODAY: time::Date = date!(2025 - 06 - 15);

    fn valid_form() -> TransactionForm {
        TransactionForm {
            kind: "expense".to_string(),
            category: "Food".to_string(),
            amount: 12.5,
            date: Some(date!(2025 - 06 - 01)),
            description: Some("lunch".to_string()),
        }
    }

    #[test]
    fn accepts_valid_form_and_keeps_category_as_submitted() {
        let data = valid_form().into_data(TODAY).unwrap();

        assert_eq!(data.kind, TransactionKind::Expense);
        assert_eq!(data.category, "Food");
        assert_eq!(data.amount, 12.5);
        assert_eq!(data.date, date!(2025 - 06 - 01));
        assert_eq!(data.description, "lunch");
    }

    #[test]
    fn missing_date_defaults_to_today() {
        let form = TransactionForm {
            date: None,
            ..valid_form()
        };

        let data = form.into_data(TODAY).unwrap();

        assert_eq!(data.date, TODAY);
    }

    #[test]
    fn missing_description_defaults_to_empty() {
        let form = TransactionForm {
            description: None,
            ..valid_form()
        };

        let data = form.into_data(TODAY).unwrap();

        assert_eq!(data.description, "");
    }

    #[test]
    fn rejects_unknown_kind() {
        let form = TransactionForm {
            kind: "transfer".to_string(),
            ..valid_form()
        };

        assert_eq!(
            form.into_data(TODAY),
            Err(Error::InvalidKind("transfer".to_string()))
        );
    }

    #[test]
    fn rejects_whitespace_category() {
        let form = TransactionForm {
            category: "   ".to_string(),
            ..valid_form()
        };

        assert_eq!(form.into_data(TODAY), Err(Error::EmptyCategory));
    }

    #[test]
    fn rejects_negative_amount() {
        let form = TransactionForm {
            amount: -5.0,
            ..valid_form()
        };

        assert_eq!(form.into_data(TODAY), Err(Error::NegativeAmount(-5.0)));
    }
}
