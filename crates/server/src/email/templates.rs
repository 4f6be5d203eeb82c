//! Askama email templates.

use askama::Template;

use crate::models::{LineItem, Order, Shipping};

/// HTML template for the order summary.
#[derive(Template)]
#[template(path = "email/order.html")]
struct OrderEmailHtml<'a> {
    details: &'a [(&'static str, String)],
    items: &'a [String],
    total: &'a str,
}

/// Plain text template for the order summary.
#[derive(Template)]
#[template(path = "email/order.txt")]
struct OrderEmailText<'a> {
    details: &'a [(&'static str, String)],
    items: &'a [String],
    total: &'a str,
}

/// HTML template for a support request.
#[derive(Template)]
#[template(path = "email/support.html")]
struct SupportEmailHtml<'a> {
    email: &'a str,
    fullname: &'a str,
    message: &'a str,
}

/// Plain text template for a support request.
#[derive(Template)]
#[template(path = "email/support.txt")]
struct SupportEmailText<'a> {
    email: &'a str,
    fullname: &'a str,
    message: &'a str,
}

/// Render the `(text, html)` bodies of an order summary.
///
/// The contact rows depend on where the order ships.
pub(super) fn order_bodies(order: &Order) -> Result<(String, String), askama::Error> {
    let details = order_details(order);
    let items: Vec<String> = order.items.iter().map(describe_item).collect();
    let total = format!("{} {}", order.price.normalize(), order.currency);

    let text = OrderEmailText {
        details: &details,
        items: &items,
        total: &total,
    }
    .render()?;
    let html = OrderEmailHtml {
        details: &details,
        items: &items,
        total: &total,
    }
    .render()?;
    Ok((text, html))
}

/// Render the `(text, html)` bodies of a support request.
pub(super) fn support_bodies(
    email: &str,
    fullname: &str,
    message: &str,
) -> Result<(String, String), askama::Error> {
    let text = SupportEmailText {
        email,
        fullname,
        message,
    }
    .render()?;
    let html = SupportEmailHtml {
        email,
        fullname,
        message,
    }
    .render()?;
    Ok((text, html))
}

fn order_details(order: &Order) -> Vec<(&'static str, String)> {
    let mut details = vec![
        ("Order", order.order_id.to_string()),
        ("Email", order.email.to_string()),
        ("Full name", order.full_name.clone()),
        ("Phone", order.phone.clone()),
        ("City", order.city.clone()),
    ];

    match &order.shipping {
        Shipping::Domestic { nova_poshta } => {
            details.push(("Nova Poshta", nova_poshta.clone()));
        }
        Shipping::Worldwide {
            country_city_region,
            postal_code,
            address,
        } => {
            details.push(("Country, city, region", country_city_region.clone()));
            details.push(("Postal code", postal_code.clone()));
            details.push(("Address", address.clone()));
        }
    }

    let promo = order.promo.as_ref().map_or_else(
        || "No promo used".to_owned(),
        |p| format!("{}, {}%", p.name, p.discount.normalize()),
    );
    details.push(("Promo code", promo));
    details
}

/// `Title (ID) [Size: M] extra, params`
fn describe_item(item: &LineItem) -> String {
    let mut line = format!("{} ({})", item.title, item.id);
    if let Some(size) = &item.size {
        line.push_str(&format!(" [Size: {size}]"));
    }
    if !item.additional_params.is_empty() {
        line.push(' ');
        line.push_str(&item.additional_params.join(", "));
    }
    line
}
