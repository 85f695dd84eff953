//! Cart commands.
//!
//! # Usage
//!
//! ```bash
//! qb-cli cart show
//! qb-cli cart add -i m-42 -n "Margherita" -p 12.50 -r r-7 --restaurant-name "Slice House"
//! qb-cli cart update m-42 3
//! qb-cli cart remove m-42 -c '{"size":"large"}'
//! qb-cli cart clear
//! qb-cli pricing
//! ```

use quickbite_client::CartSession;
use quickbite_core::{CartItem, MenuItemId, Money, RestaurantId};

use super::{CliError, log_cart, log_notices, parse_customization};

/// A line to add, as given on the command line.
#[derive(Debug)]
pub struct NewLine {
    pub item: String,
    pub name: String,
    pub price: String,
    pub quantity: u32,
    pub customization: Option<String>,
    pub image: Option<String>,
}

impl NewLine {
    fn into_cart_item(self) -> Result<CartItem, CliError> {
        if self.quantity == 0 {
            return Err(CliError::InvalidArgument(
                "quantity",
                "must be at least 1".to_string(),
            ));
        }

        let price: Money = self
            .price
            .parse()
            .map_err(|e: rust_decimal::Error| CliError::InvalidArgument("price", e.to_string()))?;
        if price.amount().is_sign_negative() {
            return Err(CliError::InvalidArgument(
                "price",
                "must not be negative".to_string(),
            ));
        }

        let mut item = CartItem::new(MenuItemId::new(self.item), self.name, price)
            .with_quantity(self.quantity)
            .with_customization(parse_customization(self.customization.as_deref()));
        if let Some(image) = self.image {
            item = item.with_image(image);
        }
        Ok(item)
    }
}

/// Log the cart as loaded from the backend.
pub async fn show(session: &CartSession) {
    log_cart(&session.snapshot().await);
}

/// Add a line to the cart.
pub async fn add(
    session: &CartSession,
    line: NewLine,
    restaurant_id: &str,
    restaurant_name: &str,
) -> Result<(), CliError> {
    let item = line.into_cart_item()?;
    tracing::info!("Adding {} x {}...", item.quantity, item.name);

    let result = session
        .add_item(item, RestaurantId::new(restaurant_id), restaurant_name)
        .await;
    finish(session, result).await
}

/// Set the quantity of a line.
pub async fn update(
    session: &CartSession,
    item_id: &str,
    quantity: i64,
    customization: Option<&str>,
) -> Result<(), CliError> {
    let result = session
        .update_quantity(
            &MenuItemId::new(item_id),
            &parse_customization(customization),
            quantity,
        )
        .await;
    finish(session, result).await
}

/// Remove a line.
pub async fn remove(
    session: &CartSession,
    item_id: &str,
    customization: Option<&str>,
) -> Result<(), CliError> {
    let result = session
        .remove_item(&MenuItemId::new(item_id), &parse_customization(customization))
        .await;
    finish(session, result).await
}

/// Empty the cart.
pub async fn clear(session: &CartSession) -> Result<(), CliError> {
    let result = session.clear().await;
    finish(session, result).await
}

/// Fetch and log server-computed totals.
pub async fn pricing(session: &CartSession) -> Result<(), CliError> {
    let result = session.refresh_pricing().await;
    finish(session, result).await
}

/// Log notices, then the cart or the error.
pub(super) async fn finish<E>(
    session: &CartSession,
    result: Result<quickbite_core::CartState, E>,
) -> Result<(), CliError>
where
    CliError: From<E>,
{
    log_notices(session).await;
    log_cart(&result?);
    Ok(())
}
