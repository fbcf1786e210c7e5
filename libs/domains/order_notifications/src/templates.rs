//! Canned email for each order status.
//!
//! Bodies use `{{name}}` placeholders filled in a single pass: substituted
//! values are copied as-is and never scanned for further placeholders, so a
//! customer named `{{order_id}}` stays literally that.

use crate::models::OrderStatus;
use core_config::{ConfigError, FromEnv, env_or_default};
use email::EmailMessage;

/// Rendered in place of the delivery time when the caller did not send one
pub const DELIVERY_TIME_PLACEHOLDER: &str = "null";

pub const DEFAULT_COMPANY_NAME: &str = "[Company Name]";

const ORDER_CONFIRMED_SUBJECT: &str = "Your Order has been Confirmed! 🍽️";
const ORDER_CONFIRMED_BODY: &str = "\
Hi {{customer_name}},

Great news! Your order #{{order_id}} has been successfully confirmed. Our team is preparing everything to ensure you get the best meal experience.

You’ll receive updates as soon as your food is being prepared. We’ll let you know when it’s on its way!

Thank you for choosing {{company_name}}.

Bon appétit!
The {{company_name}} Team
";

const COOKING_SUBJECT: &str = "Your Meal is Being Prepared 🍳";
const COOKING_BODY: &str = "\
Hi {{customer_name}},

Your order #{{order_id}} is now being freshly prepared by our chefs. We’re making sure everything is cooked to perfection just for you.

We’ll notify you when the meal is on its way!

If you have any questions, feel free to reach out.

Kind regards,
The {{company_name}} Team
";

const ON_THE_WAY_SUBJECT: &str = "Your Order is on the Way! 🚴‍♂️";
const ON_THE_WAY_BODY: &str = "\
Hi {{customer_name}},

Your order #{{order_id}} is almost there! Our delivery partner is on their way to your location with your delicious meal.

Estimated delivery time: {{delivery_time}}

Thank you for your patience. Enjoy your meal soon!

Cheers,
The {{company_name}} Team
";

const DELIVERED_SUBJECT: &str = "Enjoy Your Meal! 🍴";
const DELIVERED_BODY: &str = "\
Hi {{customer_name}},

Your order #{{order_id}} has just been delivered to your door! We hope everything arrived just as expected and that you’re ready to dig in.

If you have any feedback or issues with the order, please don’t hesitate to contact us.

Thank you for choosing {{company_name}}. We look forward to serving you again soon!

Bon appétit,
The {{company_name}} Team
";

/// Sender-side wording shared by every template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateBranding {
    pub company_name: String,
}

impl Default for TemplateBranding {
    fn default() -> Self {
        Self {
            company_name: DEFAULT_COMPANY_NAME.to_string(),
        }
    }
}

impl FromEnv for TemplateBranding {
    /// Reads `COMPANY_NAME`, keeping the `[Company Name]` wording when unset
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            company_name: env_or_default("COMPANY_NAME", DEFAULT_COMPANY_NAME),
        })
    }
}

/// Subject and body chosen for a status, not yet addressed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderTemplate {
    pub subject: &'static str,
    pub body: String,
}

impl OrderTemplate {
    pub fn into_message(self, to: impl Into<String>) -> EmailMessage {
        EmailMessage::new(to, self.subject, self.body)
    }
}

/// Pick and render the email for `status`.
///
/// `delivery_time` is only used by [`OrderStatus::AboutToBeDelivered`] and
/// falls back to [`DELIVERY_TIME_PLACEHOLDER`].
pub fn select_template(
    status: OrderStatus,
    customer_name: &str,
    order_id: &str,
    delivery_time: Option<&str>,
    branding: &TemplateBranding,
) -> OrderTemplate {
    let (subject, template) = match status {
        OrderStatus::OrderConfirmed => (ORDER_CONFIRMED_SUBJECT, ORDER_CONFIRMED_BODY),
        OrderStatus::CookingInProgress => (COOKING_SUBJECT, COOKING_BODY),
        OrderStatus::AboutToBeDelivered => (ON_THE_WAY_SUBJECT, ON_THE_WAY_BODY),
        OrderStatus::Delivered => (DELIVERED_SUBJECT, DELIVERED_BODY),
    };

    let vars = [
        ("customer_name", customer_name),
        ("order_id", order_id),
        (
            "delivery_time",
            delivery_time.unwrap_or(DELIVERY_TIME_PLACEHOLDER),
        ),
        ("company_name", branding.company_name.as_str()),
    ];

    OrderTemplate {
        subject,
        body: render(template, &vars),
    }
}

/// Replace `{{key}}` with its value. Unknown keys are left untouched.
fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len() + 64);
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];

        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };

        let key = after[..end].trim();
        match vars.iter().find(|(k, _)| *k == key) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[start..start + 2 + end + 2]),
        }
        rest = &after[end + 2..];
    }

    out.push_str(rest);
    out
}
