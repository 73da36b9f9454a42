//! Domain and wire models
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`product`] | Catalog product |
//! | [`checkout`] | `/create-payment` and `/webhook` payloads |
//! | [`binding`] | Charge binding (txid → product) and its state machine |
//! | [`order`] | Buyer-facing order aggregate |
//! | [`inventory`] | Credential records and `/admin/estoque` payloads |
//! | [`alert`] | Operator alert for paid-but-unfulfilled charges |

pub mod alert;
pub mod binding;
pub mod checkout;
pub mod inventory;
pub mod order;
pub mod product;

pub use alert::{AlertReason, FulfillmentAlert};
pub use binding::{BindingStatus, BindingView, ChargeBinding};
pub use checkout::{CartLine, CheckoutRequest, PaymentCreated, PixNotification, WebhookPayload};
pub use inventory::{CredentialRecord, RestockRequest, RestockResponse, StockLevel};
pub use order::{DeliveryStatus, Order, OrderItem, PaymentStatus};
pub use product::Product;
