//! Coupon cart shaping

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use crate::domain::value_objects::{Cents, MoneyError};

/// Cart line as posted by the storefront (major-unit price)
#[derive(Clone, Debug, Deserialize)]
pub struct CartLineInput {
    #[serde(alias = "id")]
    pub product_id: String,
    pub quantity: i64,
    pub price: Decimal,
}

/// Cart line in the shape the coupon procedure expects
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CouponCartLine {
    pub product_id: String,
    pub quantity: u32,
    pub unit_price_cents: Cents,
}

impl CouponCartLine {
    pub fn line_total(&self) -> Result<Cents, MoneyError> { self.unit_price_cents.checked_mul(self.quantity) }
}

#[derive(Clone, Debug)]
pub struct CouponCart {
    lines: Vec<CouponCartLine>,
    subtotal: Cents,
}

impl CouponCart {
    pub fn from_lines(input: &[CartLineInput]) -> Result<Self, CartError> {
        if input.is_empty() { return Err(CartError::Empty); }
        let mut lines = Vec::with_capacity(input.len());
        for (index, line) in input.iter().enumerate() {
            let product_id = line.product_id.trim();
            if product_id.is_empty() { return Err(CartError::MissingProduct(index)); }
            let quantity = u32::try_from(line.quantity).ok().filter(|q| *q > 0).ok_or(CartError::InvalidQuantity(index))?;
            if line.price.is_sign_negative() { return Err(CartError::NegativePrice(index)); }
            let unit_price_cents = Cents::from_major(line.price).map_err(|_| CartError::Overflow)?;
            lines.push(CouponCartLine { product_id: product_id.to_string(), quantity, unit_price_cents });
        }
        let mut cart = Self { lines, subtotal: Cents::ZERO };
        cart.recalculate()?;
        Ok(cart)
    }

    pub fn lines(&self) -> &[CouponCartLine] { &self.lines }
    pub fn subtotal(&self) -> Cents { self.subtotal }

    fn recalculate(&mut self) -> Result<(), CartError> {
        let mut subtotal = Cents::ZERO;
        for line in &self.lines {
            subtotal = line.line_total().and_then(|t| subtotal.checked_add(t)).map_err(|_| CartError::Overflow)?;
        }
        self.subtotal = subtotal;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum CartError { Empty, MissingProduct(usize), InvalidQuantity(usize), NegativePrice(usize), Overflow }
impl std::error::Error for CartError {}
impl std::fmt::Display for CartError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "Cart is empty"),
            Self::MissingProduct(i) => write!(f, "Cart item {} has no product id", i + 1),
            Self::InvalidQuantity(i) => write!(f, "Cart item {} has an invalid quantity", i + 1),
            Self::NegativePrice(i) => write!(f, "Cart item {} has a negative price", i + 1),
            Self::Overflow => write!(f, "Cart total out of range"),
        }
    }
}
