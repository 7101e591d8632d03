//! Alert fragments for displaying error messages to users.
//!
//! Alerts are swapped into the `#alert-container` div in the base layout
//! via htmx out-of-band swaps.

use maud::{Markup, html};

/// Render an error alert fragment with a `message` headline and `details`
/// text below it.
pub fn alert_error(message: &str, details: &str) -> Markup {
    alert(message, details, "text-red-800 bg-red-50 dark:text-red-400")
}

fn alert(message: &str, details: &str, color_style: &str) -> Markup {
    html! {
        div
            id="alert-container"
            hx-swap-oob="true"
            class=(format!("w-full max-w-md px-4 {color_style}"))
            style="position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;"
            role="alert"
        {
            div class="p-4 mb-4 text-sm rounded-lg dark:bg-gray-800"
            {
                p class="font-medium" { (message) }

                @if !details.is_empty() {
                    p { (details) }
                }
            }
        }
    }
}

#[cfg(test)]
mod alert_tests {
    use super::alert_error;

    #[test]
    fn error_alert_targets_alert_container() {
        let markup = alert_error("Not found", "The thing is gone.").into_string();

        assert!(markup.contains("alert-container"));
        assert!(markup.contains("hx-swap-oob"));
        assert!(markup.contains("Not found"));
        assert!(markup.contains("The thing is gone."));
    }
}
