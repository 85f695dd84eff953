//! Cart line items.

use serde::{Deserialize, Serialize};

use crate::types::{Customization, MenuItemId, Money};

/// One line in the cart.
///
/// Identity is the pair `(id, customization)`: the same dish with different
/// choices is a different line, the same dish with the same choices merges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Menu item this line is for.
    pub id: MenuItemId,
    /// Display name.
    pub name: String,
    /// Unit price.
    pub price: Money,
    /// Image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// What the diner picked on top of the base dish.
    #[serde(default)]
    pub customization: Customization,
    /// Number of units, at least 1 once in a cart.
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

const fn default_quantity() -> u32 {
    1
}

impl CartItem {
    /// Create a single, uncustomized unit of a menu item.
    #[must_use]
    pub fn new(id: MenuItemId, name: impl Into<String>, price: Money) -> Self {
        Self {
            id,
            name: name.into(),
            price,
            image: None,
            customization: Customization::None,
            quantity: 1,
        }
    }

    /// Set the quantity.
    #[must_use]
    pub const fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    /// Set the customization.
    #[must_use]
    pub fn with_customization(mut self, customization: Customization) -> Self {
        self.customization = customization;
        self
    }

    /// Set the image URL.
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Whether this line is the one identified by `(id, customization)`.
    #[must_use]
    pub fn matches(&self, id: &MenuItemId, customization: &Customization) -> bool {
        self.id == *id && self.customization == *customization
    }

    /// `price * quantity`.
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.price * self.quantity
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_identity_uses_structural_customization() {
        let item = CartItem::new(MenuItemId::new("pizza"), "Pizza", Money::from_cents(1200))
            .with_customization(Customization::structured([("size", json!("large"))]));

        assert!(item.matches(
            &MenuItemId::new("pizza"),
            &Customization::Raw(r#"{"size":"large"}"#.to_string())
        ));
        assert!(!item.matches(&MenuItemId::new("pizza"), &Customization::None));
        assert!(!item.matches(
            &MenuItemId::new("pasta"),
            &Customization::structured([("size", json!("large"))])
        ));
    }

    #[test]
    fn test_line_total() {
        let item = CartItem::new(MenuItemId::new("naan"), "Naan", Money::from_cents(350))
            .with_quantity(4);
        assert_eq!(item.line_total(), Money::from_cents(1400));
    }
}
