//! Seed data for the in-memory repositories and `atelier-cli seed`.
//!
//! User passwords are plaintext here; repositories hash them on insert.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use atelier_core::{
    CertificateCode, Currency, Email, MulticurrencyPrice, OrderId, PromoCode, ShopItemId,
};

use crate::models::{
    AppliedPromo, Certificate, Color, LineItem, Order, PromoItem, Shipping, ShopItem, Translatable,
    User,
};

/// 2024-01-15T10:30:00Z
const SEEDED_AT: i64 = 1_705_314_600;

fn seeded_at() -> DateTime<Utc> {
    DateTime::from_timestamp(SEEDED_AT, 0).unwrap_or_default()
}

fn text(en: &str, ua: &str) -> Translatable {
    Translatable {
        en: en.to_owned(),
        ua: ua.to_owned(),
    }
}

fn price(uah: i64, eur: i64) -> MulticurrencyPrice {
    MulticurrencyPrice::new(Decimal::from(uah), Decimal::from(eur))
}

fn stock(sizes: &[(&str, i64)]) -> BTreeMap<String, i64> {
    sizes
        .iter()
        .map(|(size, count)| ((*size).to_owned(), *count))
        .collect()
}

fn email(raw: &str) -> Option<Email> {
    Email::parse(raw)
        .inspect_err(|e| tracing::warn!(email = raw, error = %e, "skipping fixture with bad email"))
        .ok()
}

fn line(id: &str, size: &str, title: &str) -> LineItem {
    LineItem {
        id: ShopItemId::new(id),
        size: Some(size.to_owned()),
        title: title.to_owned(),
        additional_params: Vec::new(),
    }
}

/// Catalog: three items, each positioned.
#[must_use]
pub fn shop_items() -> Vec<ShopItem> {
    vec![
        ShopItem {
            id: ShopItemId::new("PROD-001"),
            photos: vec![
                "https://res.cloudinary.com/demo/image/upload/shopItems/images/PROD-001/PROD-001_1.jpg"
                    .to_owned(),
            ],
            price: price(5000, 150),
            discount_price: price(4000, 120),
            is_discount_active: true,
            title: text("Classic Wool Coat", "Класичне вовняне пальто"),
            description: text(
                "Warm wool coat for the cold season",
                "Тепле вовняне пальто для холодного сезону",
            ),
            detailed_description: text(
                "Made from 80% wool. Dry clean only.",
                "Виготовлено з 80% вовни. Лише хімчистка.",
            ),
            color: Color {
                name: text("Black", "Чорний"),
                hex: Some("#000000".to_owned()),
            },
            size_guides: None,
            amount: stock(&[("XS", 2), ("S", 5), ("M", 8), ("L", 3)]),
            collection_name: "Winter Collection 2024".to_owned(),
            categories: vec!["outerwear".to_owned(), "coats".to_owned()],
            is_coming_soon: false,
            is_sold_out: false,
            is_hidden: false,
            position: Some(1),
        },
        ShopItem {
            id: ShopItemId::new("PROD-002"),
            photos: Vec::new(),
            price: price(800, 25),
            discount_price: price(800, 25),
            is_discount_active: false,
            title: text("Cotton T-Shirt", "Бавовняна футболка"),
            description: text("Everyday cotton t-shirt", "Повсякденна бавовняна футболка"),
            detailed_description: text("100% organic cotton.", "100% органічна бавовна."),
            color: Color {
                name: text("White", "Білий"),
                hex: Some("#FFFFFF".to_owned()),
            },
            size_guides: None,
            amount: stock(&[("S", 10), ("M", 15), ("L", 12), ("XL", 8)]),
            collection_name: "Summer Essentials".to_owned(),
            categories: vec!["basics".to_owned(), "t-shirts".to_owned()],
            is_coming_soon: false,
            is_sold_out: false,
            is_hidden: false,
            position: Some(2),
        },
        ShopItem {
            id: ShopItemId::new("PROD-003"),
            photos: Vec::new(),
            price: price(12000, 350),
            discount_price: price(12000, 350),
            is_discount_active: false,
            title: text("Leather Jacket", "Шкіряна куртка"),
            description: text(
                "Genuine leather jacket with modern design",
                "Справжня шкіряна куртка з сучасним дизайном",
            ),
            detailed_description: text(
                "Premium quality leather, handcrafted with attention to detail.",
                "Преміальна якість шкіри, виготовлено вручну з увагою до деталей.",
            ),
            color: Color {
                name: text("Brown", "Коричневий"),
                hex: None,
            },
            size_guides: None,
            amount: stock(&[("M", 3), ("L", 2)]),
            collection_name: "Autumn Collection 2024".to_owned(),
            categories: vec!["outerwear".to_owned(), "jackets".to_owned()],
            is_coming_soon: false,
            is_sold_out: false,
            is_hidden: false,
            position: Some(3),
        },
    ]
}

/// Orders: two domestic (one approved), one worldwide.
#[must_use]
pub fn orders() -> Vec<Order> {
    let mut orders = Vec::with_capacity(3);

    if let Some(email) = email("customer@example.com") {
        orders.push(Order {
            order_id: OrderId::new("ORD-001"),
            approved: false,
            items: vec![line("PROD-001", "M", "Classic Wool Coat")],
            price: Decimal::from(5000),
            currency: Currency::Uah,
            email,
            full_name: "John Doe".to_owned(),
            phone: "+380501234567".to_owned(),
            city: "Kyiv".to_owned(),
            agreement: true,
            shipping: Shipping::Domestic {
                nova_poshta: "12345".to_owned(),
            },
            promo: None,
            created_at: seeded_at(),
            delivery: Decimal::from(100),
            utm_source: None,
            utm_campaign: None,
        });
    }

    if let Some(email) = email("another@example.com") {
        orders.push(Order {
            order_id: OrderId::new("ORD-002"),
            approved: true,
            items: vec![line("PROD-002", "L", "Cotton T-Shirt")],
            price: Decimal::from(800),
            currency: Currency::Uah,
            email,
            full_name: "Jane Smith".to_owned(),
            phone: "+380509876543".to_owned(),
            city: "Lviv".to_owned(),
            agreement: true,
            shipping: Shipping::Domestic {
                nova_poshta: "67890".to_owned(),
            },
            promo: Some(AppliedPromo {
                name: "SUMMER10".to_owned(),
                discount: Decimal::from(10),
            }),
            created_at: seeded_at(),
            delivery: Decimal::from(100),
            utm_source: None,
            utm_campaign: None,
        });
    }

    if let Some(email) = email("international@example.com") {
        orders.push(Order {
            order_id: OrderId::new("ORD-003"),
            approved: false,
            items: vec![line("PROD-003", "M", "Leather Jacket")],
            price: Decimal::from(12000),
            currency: Currency::Eur,
            email,
            full_name: "Bob Johnson".to_owned(),
            phone: "+1234567890".to_owned(),
            city: "New York".to_owned(),
            agreement: true,
            shipping: Shipping::Worldwide {
                country_city_region: "United States".to_owned(),
                postal_code: "10001".to_owned(),
                address: "123 Main Street".to_owned(),
            },
            promo: None,
            created_at: seeded_at(),
            delivery: Decimal::from(500),
            utm_source: None,
            utm_campaign: None,
        });
    }

    orders
}

#[must_use]
pub fn promos() -> Vec<PromoItem> {
    [("SUMMER10", 10), ("WINTER20", 20), ("NEWUSER15", 15)]
        .into_iter()
        .map(|(name, discount)| PromoItem {
            name: PromoCode::new(name),
            discount: Decimal::from(discount),
        })
        .collect()
}

#[must_use]
pub fn certificates() -> Vec<Certificate> {
    [("CERT-001", "John Doe", 500), ("CERT-002", "Jane Smith", 1000)]
        .into_iter()
        .map(|(code, owner, amount)| Certificate {
            code: CertificateCode::new(code),
            owner: owner.to_owned(),
            amount: Decimal::from(amount),
            created_at: seeded_at(),
        })
        .collect()
}

/// One administrator account with a plaintext password.
#[must_use]
pub fn users() -> Vec<User> {
    email("admin@example.com")
        .map(|email| User {
            full_name: "Admin User".to_owned(),
            email,
            phone_number: "+1234567890".to_owned(),
            password: "password123".to_owned(),
        })
        .into_iter()
        .collect()
}
