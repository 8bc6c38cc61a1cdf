//! PayFast integration: checkout signing and payment notifications
pub mod checkout;
pub mod notify;
pub mod signature;

pub use checkout::{build_checkout, CheckoutForm, CheckoutRequest};
pub use notify::{apply_notification, verify_notification, VerifiedNotification};
pub use signature::{generate_signature, signature_string, verify_signature, FieldOrder, PaymentFields};
