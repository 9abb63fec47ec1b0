//! Keeps the session cart and the server cart in step.
//!
//! Every mutation is applied to the session copy first, then sent to the API.
//! If the API call fails the session copy is put back exactly as it was, so a
//! rejected change never lingers locally.

use std::future::Future;

use tower_sessions::Session;
use tracing::{instrument, warn};

use hoopshop_core::{CartState, Product, ProductId, UserId};

use crate::api::{ApiClient, ApiError};
use crate::error::{AppError, add_breadcrumb};
use crate::models::session_keys;

/// Cart operations for one request.
pub struct CartService<'a> {
    api: &'a ApiClient,
    session: &'a Session,
}

impl<'a> CartService<'a> {
    #[must_use]
    pub const fn new(api: &'a ApiClient, session: &'a Session) -> Self {
        Self { api, session }
    }

    /// The session cart, or `None` if this session never held one.
    async fn stored(&self) -> Result<Option<CartState>, AppError> {
        Ok(self.session.get(session_keys::CART).await?)
    }

    /// The session cart (empty when absent).
    ///
    /// # Errors
    ///
    /// Returns `AppError::Session` if the session store fails.
    pub async fn load(&self) -> Result<CartState, AppError> {
        Ok(self.stored().await?.unwrap_or_default())
    }

    async fn save(&self, cart: &CartState) -> Result<(), AppError> {
        self.session.insert(session_keys::CART, cart).await?;
        Ok(())
    }

    /// Replace the session cart with the server's list.
    ///
    /// # Errors
    ///
    /// Returns an error if the API call or the session write fails.
    #[instrument(skip(self))]
    pub async fn reconcile(&self, user_id: UserId) -> Result<CartState, AppError> {
        let lines = self.api.view_cart(user_id).await?;
        let cart = CartState::from_server(lines);
        self.save(&cart).await?;
        tracing::debug!(lines = cart.len(), "Cart reconciled from server");
        Ok(cart)
    }

    /// The session cart, reconciled from the server when any of `product_ids`
    /// is missing locally.
    ///
    /// Reconciles at most once, however many products miss. Failures are
    /// logged and leave the local cart as it was.
    #[instrument(skip(self, product_ids))]
    pub async fn covering(&self, user_id: UserId, product_ids: &[ProductId]) -> CartState {
        let local = self.load().await.unwrap_or_else(|e| {
            warn!(error = %e, "Cart session read failed");
            CartState::new()
        });
        if product_ids.iter().all(|id| local.contains(*id)) {
            return local;
        }
        self.reconcile(user_id).await.unwrap_or_else(|e| {
            warn!(error = %e, "Cart reconcile failed during in-cart check");
            local
        })
    }

    /// Whether `product_id` is in the cart: local first, then the server.
    ///
    /// Errors count as "not in cart".
    #[instrument(skip(self))]
    pub async fn is_in_cart(&self, user_id: UserId, product_id: ProductId) -> bool {
        if self
            .load()
            .await
            .is_ok_and(|cart| cart.contains(product_id))
        {
            return true;
        }
        match self.reconcile(user_id).await {
            Ok(cart) => cart.contains(product_id),
            Err(e) => {
                warn!(error = %e, "Cart reconcile failed during in-cart check");
                false
            }
        }
    }

    /// Add `quantity` of `product` (additive).
    ///
    /// # Errors
    ///
    /// Returns the API error after restoring the previous cart.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn add(
        &self,
        user_id: UserId,
        product: Product,
        quantity: u32,
    ) -> Result<CartState, AppError> {
        let product_id = product.id;
        let mut cart = self.load().await?;
        let result = apply_optimistic(
            &mut cart,
            |c| c.add_item(product, quantity),
            self.api.add_to_cart(user_id, product_id, quantity),
        )
        .await;
        self.finish(cart, result, "Added to cart", product_id).await
    }

    /// Set the quantity of a line. Callers reject `quantity < 1`.
    ///
    /// # Errors
    ///
    /// Returns the API error after restoring the previous cart.
    #[instrument(skip(self))]
    pub async fn update(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<CartState, AppError> {
        let mut cart = self.load().await?;
        let result = apply_optimistic(
            &mut cart,
            |c| c.update_quantity(product_id, quantity),
            self.api.update_cart_quantity(user_id, product_id, quantity),
        )
        .await;
        self.finish(cart, result, "Updated cart quantity", product_id)
            .await
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// Returns the API error after restoring the previous cart.
    #[instrument(skip(self))]
    pub async fn remove(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<CartState, AppError> {
        let mut cart = self.load().await?;
        let result = apply_optimistic(
            &mut cart,
            |c| c.remove_item(product_id),
            self.api.remove_from_cart(user_id, product_id),
        )
        .await;
        self.finish(cart, result, "Removed from cart", product_id)
            .await
    }

    /// Persist the (possibly rolled back) cart and surface the API outcome.
    async fn finish(
        &self,
        cart: CartState,
        result: Result<(), ApiError>,
        action: &str,
        product_id: ProductId,
    ) -> Result<CartState, AppError> {
        self.save(&cart).await?;
        match result {
            Ok(()) => {
                add_breadcrumb("cart", action, Some(&[("product_id", &product_id.to_string())]));
                Ok(cart)
            }
            Err(e) => {
                warn!(error = %e, %product_id, "Cart change rejected, rolled back");
                Err(e.into())
            }
        }
    }
}

/// Apply `mutate` to `cart`, await `call`, and undo the mutation if it fails.
pub async fn apply_optimistic<F, Fut, E>(cart: &mut CartState, mutate: F, call: Fut) -> Result<(), E>
where
    F: FnOnce(&mut CartState),
    Fut: Future<Output = Result<(), E>>,
{
    let snapshot = cart.clone();
    mutate(cart);
    let result = call.await;
    if result.is_err() {
        *cart = snapshot;
    }
    result
}
