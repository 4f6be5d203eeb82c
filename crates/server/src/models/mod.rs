//! Domain models stored by the repositories and exchanged over HTTP.
//!
//! Field names are camelCase both on the wire and inside stored documents.

pub mod certificate;
pub mod order;
pub mod payment;
pub mod promo;
pub mod shop_item;
pub mod user;

pub use certificate::{Certificate, CreateCertificateRequest};
pub use order::{
    AppliedPromo, CreateOrderRequest, LineItem, MissingShippingField, Order, OrderContact, OrderType,
    Shipping,
};
pub use payment::{LiqPayCallback, PaymentDecodeError, WayForPayCallback, decode_liqpay_data};
pub use promo::PromoItem;
pub use shop_item::{Color, ShopItem, ShopItemPatch, SizeGuide, SizeGuideValue, Translatable};
pub use user::{NewUser, PublicUser, User};
