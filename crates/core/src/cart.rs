//! Cart state machine.
//!
//! A [`Cart`] is an ordered list of [`CartLineItem`]s keyed by product id.
//! Every mutation goes through [`Cart::apply`] with a [`CartAction`], so the
//! invariants live in one place:
//!
//! - no two lines share a product id
//! - every line has a quantity of at least 1; a change that would leave a
//!   line at zero or below removes it instead
//! - existing lines keep their position, new lines are appended

use serde::{Deserialize, Serialize};

use crate::product::Product;
use crate::types::{Price, ProductId};

/// Product data captured when an item is first added to the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartProduct {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    pub image: String,
}

impl From<&Product> for CartProduct {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            title: product.title.clone(),
            price: product.price,
            image: product.image.clone(),
        }
    }
}

/// One line of the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    pub image: String,
    pub quantity: u32,
}

impl CartLineItem {
    /// Unit price times quantity, unrounded.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// A cart mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartAction {
    /// Add one unit of a product.
    Add(CartProduct),
    /// Drop the line for a product.
    Remove { id: ProductId },
    /// Change a line's quantity by `delta` units.
    UpdateQuantity { id: ProductId, delta: i64 },
    /// Empty the cart.
    Clear,
}

/// What a [`CartAction`] did to the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartChange {
    /// A new line was appended with quantity 1.
    Inserted,
    /// An existing line was incremented to the given quantity.
    Incremented(u32),
    /// A line's quantity was changed to the given value.
    Updated(u32),
    /// A line was removed.
    Removed,
    /// All lines were removed.
    Cleared,
    /// The action referred to a product that is not in the cart.
    Unchanged,
}

/// The visitor's cart.
///
/// Serializes as a plain array of lines. Deserialization rebuilds the cart
/// through [`Cart::apply`] rules, so stored data with duplicate ids or
/// non-positive quantities cannot break the invariants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<CartLineItem>", into = "Vec<CartLineItem>")]
pub struct Cart {
    items: Vec<CartLineItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Apply a mutation.
    pub fn apply(&mut self, action: CartAction) -> CartChange {
        match action {
            CartAction::Add(product) => self.add_one(product),
            CartAction::Remove { id } => {
                let before = self.items.len();
                self.items.retain(|item| item.id != id);
                if self.items.len() == before {
                    CartChange::Unchanged
                } else {
                    CartChange::Removed
                }
            }
            CartAction::UpdateQuantity { id, delta } => self.change_quantity(id, delta),
            CartAction::Clear => {
                self.items.clear();
                CartChange::Cleared
            }
        }
    }

    /// Add one unit of `product`.
    pub fn add(&mut self, product: impl Into<CartProduct>) -> CartChange {
        self.apply(CartAction::Add(product.into()))
    }

    /// Remove the line for `id`, if any.
    pub fn remove(&mut self, id: ProductId) -> CartChange {
        self.apply(CartAction::Remove { id })
    }

    /// Change the quantity of `id` by `delta`.
    pub fn update_quantity(&mut self, id: ProductId, delta: i64) -> CartChange {
        self.apply(CartAction::UpdateQuantity { id, delta })
    }

    /// Remove every line.
    pub fn clear(&mut self) -> CartChange {
        self.apply(CartAction::Clear)
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Look up the line for a product.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&CartLineItem> {
        self.items.iter().find(|item| item.id == id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of all quantities.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Sum of price × quantity, rounded to cents.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.items
            .iter()
            .map(CartLineItem::line_total)
            .sum::<Price>()
            .round_to_cents()
    }

    fn add_one(&mut self, product: CartProduct) -> CartChange {
        if let Some(item) = self.items.iter_mut().find(|item| item.id == product.id) {
            item.quantity = item.quantity.saturating_add(1);
            return CartChange::Incremented(item.quantity);
        }

        self.items.push(CartLineItem {
            id: product.id,
            title: product.title,
            price: product.price,
            image: product.image,
            quantity: 1,
        });
        CartChange::Inserted
    }

    fn change_quantity(&mut self, id: ProductId, delta: i64) -> CartChange {
        let Some(index) = self.items.iter().position(|item| item.id == id) else {
            return CartChange::Unchanged;
        };

        let current = self.items.get(index).map_or(0, |item| i64::from(item.quantity));
        let next = current.saturating_add(delta);

        if next <= 0 {
            self.items.remove(index);
            return CartChange::Removed;
        }

        let quantity = u32::try_from(next).unwrap_or(u32::MAX);
        if let Some(item) = self.items.get_mut(index) {
            item.quantity = quantity;
        }
        CartChange::Updated(quantity)
    }
}

impl From<Vec<CartLineItem>> for Cart {
    fn from(lines: Vec<CartLineItem>) -> Self {
        let mut cart = Self::new();
        for line in lines {
            if line.quantity == 0 {
                continue;
            }
            if let Some(existing) = cart.items.iter_mut().find(|item| item.id == line.id) {
                existing.quantity = existing.quantity.saturating_add(line.quantity);
            } else {
                cart.items.push(line);
            }
        }
        cart
    }
}

impl From<Cart> for Vec<CartLineItem> {
    fn from(cart: Cart) -> Self {
        cart.items
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn product(id: i64, title: &str, cents: u64) -> CartProduct {
        CartProduct {
            id: ProductId::new(id),
            title: title.to_string(),
            price: Price::from_cents(cents),
            image: format!("{id}.png"),
        }
    }

    fn ids(cart: &Cart) -> Vec<i64> {
        cart.items().iter().map(|item| item.id.as_i64()).collect()
    }

    #[test]
    fn test_add_twice_increments_and_keeps_first_snapshot() {
        let mut cart = Cart::new();
        assert_eq!(cart.add(product(1, "Red Shoe", 1000)), CartChange::Inserted);
        assert_eq!(
            cart.add(product(1, "Renamed", 9999)),
            CartChange::Incremented(2)
        );

        assert_eq!(cart.items().len(), 1);
        let line = cart.get(ProductId::new(1)).unwrap();
        assert_eq!(line.quantity, 2);
        assert_eq!(line.title, "Red Shoe");
        assert_eq!(line.price, Price::from_cents(1000));
        assert_eq!(line.image, "1.png");
    }

    #[test]
    fn test_new_items_append_in_order() {
        let mut cart = Cart::new();
        cart.add(product(3, "C", 100));
        cart.add(product(1, "A", 100));
        cart.add(product(3, "C", 100));
        cart.add(product(2, "B", 100));
        assert_eq!(ids(&cart), [3, 1, 2]);
    }

    #[test]
    fn test_remove_is_noop_for_unknown_id() {
        let mut cart = Cart::new();
        cart.add(product(1, "A", 100));
        assert_eq!(cart.remove(ProductId::new(9)), CartChange::Unchanged);
        assert_eq!(cart.remove(ProductId::new(1)), CartChange::Removed);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_quantity_to_zero_removes() {
        let mut cart = Cart::new();
        cart.add(product(1, "Red Shoe", 1000));
        cart.add(product(1, "Red Shoe", 1000));
        assert_eq!(cart.update_quantity(ProductId::new(1), -2), CartChange::Removed);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_quantity_below_zero_removes() {
        let mut cart = Cart::new();
        cart.add(product(1, "A", 100));
        assert_eq!(
            cart.update_quantity(ProductId::new(1), -5),
            CartChange::Removed
        );
        assert!(cart.get(ProductId::new(1)).is_none());
    }

    #[test]
    fn test_update_quantity_positive_and_missing() {
        let mut cart = Cart::new();
        cart.add(product(1, "A", 100));
        assert_eq!(
            cart.update_quantity(ProductId::new(1), 4),
            CartChange::Updated(5)
        );
        assert_eq!(
            cart.update_quantity(ProductId::new(2), 1),
            CartChange::Unchanged
        );
        assert_eq!(cart.total_quantity(), 5);
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        cart.add(product(1, "A", 100));
        cart.add(product(2, "B", 100));
        assert_eq!(cart.clear(), CartChange::Cleared);
        assert!(cart.is_empty());
        assert_eq!(cart.clear(), CartChange::Cleared);
    }

    #[test]
    fn test_totals() {
        let mut cart = Cart::new();
        cart.add(product(1, "A", 1099));
        cart.add(product(1, "A", 1099));
        cart.add(product(2, "B", 501));
        assert_eq!(cart.total_quantity(), 3);
        assert_eq!(cart.subtotal(), Price::from_cents(2699));
        assert_eq!(cart.subtotal().to_string(), "$26.99");
    }

    #[test]
    fn test_subtotal_rounds_fractional_cents() {
        let mut cart = Cart::new();
        cart.add(CartProduct {
            id: ProductId::new(1),
            title: "Bulk".to_string(),
            price: Price::new(Decimal::new(3335, 3)),
            image: String::new(),
        });
        cart.update_quantity(ProductId::new(1), 2);
        // 3.335 * 3 = 10.005
        assert_eq!(cart.subtotal(), Price::from_cents(1001));
    }

    #[test]
    fn test_random_action_sequences_keep_invariants() {
        // Deterministic pseudo-random walk over all operations.
        let mut cart = Cart::new();
        let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
        for _ in 0..2_000 {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            let id = ProductId::new(i64::try_from(seed % 5).unwrap());
            let action = match seed % 7 {
                0 | 1 | 2 => CartAction::Add(product(id.as_i64(), "P", 100)),
                3 => CartAction::Remove { id },
                4 => CartAction::UpdateQuantity { id, delta: -1 },
                5 => CartAction::UpdateQuantity { id, delta: 2 },
                _ => CartAction::UpdateQuantity { id, delta: -3 },
            };
            cart.apply(action);

            let mut seen = ids(&cart);
            seen.sort_unstable();
            seen.dedup();
            assert_eq!(seen.len(), cart.items().len(), "duplicate id in cart");
            assert!(cart.items().iter().all(|item| item.quantity > 0));
        }
    }

    #[test]
    fn test_deserialize_repairs_invalid_lines() {
        let json = r#"[
            {"id": 1, "title": "A", "price": "1.00", "image": "", "quantity": 1},
            {"id": 2, "title": "B", "price": "2.00", "image": "", "quantity": 0},
            {"id": 1, "title": "A again", "price": "9.00", "image": "", "quantity": 2}
        ]"#;

        let cart: Cart = serde_json::from_str(json).unwrap();
        assert_eq!(ids(&cart), [1]);
        let line = cart.get(ProductId::new(1)).unwrap();
        assert_eq!(line.quantity, 3);
        assert_eq!(line.title, "A");
    }

    #[test]
    fn test_serde_round_trip_keeps_order() {
        let mut cart = Cart::new();
        cart.add(product(2, "B", 250));
        cart.add(product(1, "A", 100));
        let json = serde_json::to_string(&cart).unwrap();
        let restored: Cart = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, cart);
    }
}
