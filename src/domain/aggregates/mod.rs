//! Aggregates module
pub mod order;
pub mod cart;

pub use order::{OrderError, OrderStatus, StatusChange};
pub use cart::{CartError, CartLineInput, CouponCart, CouponCartLine};
