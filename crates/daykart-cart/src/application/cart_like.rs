//! Cart and wishlist container for one tab.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use daykart_catalog::Product;
use daykart_core::storage::{self, KeyValueStore, keys};

use crate::domain::cart::{self, CartEntry, CartLine, CartSummary};

#[derive(Debug, Default)]
struct CartState {
    cart: Vec<CartEntry>,
    liked: Vec<u64>,
}

/// Liked products and cart entries, persisted under `liked` and `cart`.
pub struct CartLike {
    store: Arc<dyn KeyValueStore>,
    state: Mutex<CartState>,
}

impl CartLike {
    /// Loads the wishlist and cart from `store`. Missing or unreadable values
    /// start empty.
    #[must_use]
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let liked: Vec<u64> = storage::load_or_else(store.as_ref(), keys::LIKED, Vec::new);
        let cart: Vec<CartEntry> = storage::load_or_else(store.as_ref(), keys::CART, Vec::new);
        let state = CartState {
            cart: sanitize_cart(cart),
            liked: dedup(liked),
        };
        tracing::debug!(
            cart = state.cart.len(),
            liked = state.liked.len(),
            "cart and wishlist loaded"
        );
        Self {
            store,
            state: Mutex::new(state),
        }
    }

    fn state(&self) -> MutexGuard<'_, CartState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn save_cart(&self, cart: &[CartEntry]) {
        storage::persist_or_log(self.store.as_ref(), keys::CART, cart);
    }

    fn save_liked(&self, liked: &[u64]) {
        storage::persist_or_log(self.store.as_ref(), keys::LIKED, liked);
    }

    /// Adds `id` to the wishlist. Liking twice has no effect.
    pub fn like(&self, id: u64) {
        let mut state = self.state();
        if !state.liked.contains(&id) {
            state.liked.push(id);
            self.save_liked(&state.liked);
        }
    }

    /// Removes `id` from the wishlist.
    pub fn unlike(&self, id: u64) {
        let mut state = self.state();
        let before = state.liked.len();
        state.liked.retain(|liked| *liked != id);
        if state.liked.len() != before {
            self.save_liked(&state.liked);
        }
    }

    /// Returns `true` if `id` is on the wishlist.
    #[must_use]
    pub fn is_liked(&self, id: u64) -> bool {
        self.state().liked.contains(&id)
    }

    /// Liked product ids, in the order they were liked.
    #[must_use]
    pub fn liked(&self) -> Vec<u64> {
        self.state().liked.clone()
    }

    /// Adds `quantity` of `id` to the cart, incrementing an existing entry.
    /// A quantity of 0 counts as 1.
    pub fn add_to_cart(&self, id: u64, quantity: u32) {
        let quantity = quantity.max(1);
        let mut state = self.state();
        match state.cart.iter_mut().find(|entry| entry.id == id) {
            Some(entry) => entry.quantity = entry.quantity.saturating_add(quantity),
            None => state.cart.push(CartEntry { id, quantity }),
        }
        self.save_cart(&state.cart);
    }

    /// Removes `id` from the cart.
    pub fn remove_from_cart(&self, id: u64) {
        let mut state = self.state();
        let before = state.cart.len();
        state.cart.retain(|entry| entry.id != id);
        if state.cart.len() != before {
            self.save_cart(&state.cart);
        }
    }

    /// Sets the quantity of an existing entry, clamped to at least 1. Does
    /// nothing if `id` is not in the cart.
    pub fn update_cart_quantity(&self, id: u64, quantity: u32) {
        let mut state = self.state();
        let Some(entry) = state.cart.iter_mut().find(|entry| entry.id == id) else {
            return;
        };
        entry.quantity = quantity.max(1);
        self.save_cart(&state.cart);
    }

    /// Quantity of `id` in the cart, 0 if absent.
    #[must_use]
    pub fn cart_quantity(&self, id: u64) -> u32 {
        self.state()
            .cart
            .iter()
            .find(|entry| entry.id == id)
            .map_or(0, |entry| entry.quantity)
    }

    /// Empties the cart. The wishlist is kept.
    pub fn clear_cart(&self) {
        let mut state = self.state();
        state.cart.clear();
        self.save_cart(&state.cart);
    }

    /// Cart entries, in the order they were first added.
    #[must_use]
    pub fn cart(&self) -> Vec<CartEntry> {
        self.state().cart.clone()
    }

    /// Cart entries joined with `products`; entries for deleted products are
    /// skipped.
    #[must_use]
    pub fn cart_lines(&self, products: &[Product]) -> Vec<CartLine> {
        cart::resolve_lines(&self.state().cart, products)
    }

    /// Totals for the cart resolved against `products`.
    #[must_use]
    pub fn summary(&self, products: &[Product]) -> CartSummary {
        CartSummary::from_lines(&self.cart_lines(products))
    }

    /// Liked products still present in `products`, in wishlist order.
    #[must_use]
    pub fn liked_products(&self, products: &[Product]) -> Vec<Product> {
        self.state()
            .liked
            .iter()
            .filter_map(|id| products.iter().find(|product| product.id == *id))
            .cloned()
            .collect()
    }
}

impl fmt::Debug for CartLike {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();
        f.debug_struct("CartLike")
            .field("cart", &state.cart)
            .field("liked", &state.liked)
            .finish_non_exhaustive()
    }
}

fn dedup(ids: Vec<u64>) -> Vec<u64> {
    let mut unique = Vec::with_capacity(ids.len());
    for id in ids {
        if !unique.contains(&id) {
            unique.push(id);
        }
    }
    unique
}

/// Merges duplicate ids and raises zero quantities to 1.
fn sanitize_cart(entries: Vec<CartEntry>) -> Vec<CartEntry> {
    let mut cart: Vec<CartEntry> = Vec::with_capacity(entries.len());
    for entry in entries {
        let quantity = entry.quantity.max(1);
        match cart.iter_mut().find(|existing| existing.id == entry.id) {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(quantity),
            None => cart.push(CartEntry {
                id: entry.id,
                quantity,
            }),
        }
    }
    cart
}

#[cfg(test)]
mod tests {
    use daykart_catalog::seed;
    use daykart_test_support::{FailingStore, RecordingStore};

    use super::*;

    fn cart_with(store: &Arc<RecordingStore>) -> CartLike {
        CartLike::load(store.clone())
    }

    #[test]
    fn test_add_to_cart_twice_increments_single_entry() {
        // Arrange
        let store = Arc::new(RecordingStore::new());
        let cart = cart_with(&store);

        // Act
        cart.add_to_cart(5, 2);
        cart.add_to_cart(5, 3);

        // Assert
        assert_eq!(cart.cart(), vec![CartEntry { id: 5, quantity: 5 }]);
        assert_eq!(cart.cart_quantity(5), 5);
        assert_eq!(store.json(keys::CART), serde_json::json!([{ "id": 5, "quantity": 5 }]));
    }

    #[test]
    fn test_add_to_cart_with_zero_quantity_adds_one() {
        let cart = cart_with(&Arc::new(RecordingStore::new()));

        cart.add_to_cart(3, 0);

        assert_eq!(cart.cart_quantity(3), 1);
    }

    #[test]
    fn test_update_cart_quantity_clamps_to_one() {
        let cart = cart_with(&Arc::new(RecordingStore::new()));
        cart.add_to_cart(2, 4);

        cart.update_cart_quantity(2, 0);

        assert_eq!(cart.cart_quantity(2), 1);
    }

    #[test]
    fn test_update_cart_quantity_for_absent_id_is_no_op() {
        let store = Arc::new(RecordingStore::new());
        let cart = cart_with(&store);

        cart.update_cart_quantity(9, 3);

        assert!(cart.cart().is_empty());
        assert_eq!(store.writes_to(keys::CART), 0);
    }

    #[test]
    fn test_cart_quantity_is_zero_for_absent_id() {
        let cart = cart_with(&Arc::new(RecordingStore::new()));

        assert_eq!(cart.cart_quantity(42), 0);
    }

    #[test]
    fn test_remove_from_cart_and_clear_cart() {
        // Arrange
        let cart = cart_with(&Arc::new(RecordingStore::new()));
        cart.add_to_cart(1, 1);
        cart.add_to_cart(2, 1);
        cart.like(2);

        // Act
        cart.remove_from_cart(1);
        let after_remove = cart.cart();
        cart.clear_cart();

        // Assert
        assert_eq!(after_remove, vec![CartEntry { id: 2, quantity: 1 }]);
        assert!(cart.cart().is_empty());
        assert!(cart.is_liked(2));
    }

    #[test]
    fn test_like_is_idempotent_and_unlike_removes() {
        // Arrange
        let store = Arc::new(RecordingStore::new());
        let cart = cart_with(&store);

        // Act
        cart.like(4);
        cart.like(4);
        cart.like(1);
        cart.unlike(4);

        // Assert
        assert_eq!(cart.liked(), vec![1]);
        assert!(!cart.is_liked(4));
        assert_eq!(store.json(keys::LIKED), serde_json::json!([1]));
        assert_eq!(store.writes_to(keys::LIKED), 3);
    }

    #[test]
    fn test_load_restores_persisted_state() {
        // Arrange
        let store = Arc::new(RecordingStore::with_entries([
            (keys::CART, r#"[{"id":1,"quantity":2},{"id":1,"quantity":1},{"id":3,"quantity":0}]"#),
            (keys::LIKED, "[3,3,5]"),
        ]));

        // Act
        let cart = cart_with(&store);

        // Assert
        assert_eq!(
            cart.cart(),
            vec![
                CartEntry { id: 1, quantity: 3 },
                CartEntry { id: 3, quantity: 1 },
            ]
        );
        assert_eq!(cart.liked(), vec![3, 5]);
    }

    #[test]
    fn test_load_with_corrupt_values_starts_empty() {
        let store = Arc::new(RecordingStore::with_entries([
            (keys::CART, "{oops"),
            (keys::LIKED, "\"not a list\""),
        ]));

        let cart = cart_with(&store);

        assert!(cart.cart().is_empty());
        assert!(cart.liked().is_empty());
    }

    #[test]
    fn test_storage_failure_keeps_in_memory_state() {
        let cart = CartLike::load(Arc::new(FailingStore));

        cart.add_to_cart(1, 2);
        cart.like(1);

        assert_eq!(cart.cart_quantity(1), 2);
        assert!(cart.is_liked(1));
    }

    #[test]
    fn test_deleted_products_are_dropped_from_lines_and_wishlist() {
        // Arrange
        let cart = cart_with(&Arc::new(RecordingStore::new()));
        cart.add_to_cart(1, 1);
        cart.add_to_cart(3, 2);
        cart.like(3);
        cart.like(5);
        let mut products = seed::products();
        products.retain(|product| product.id != 3);

        // Act
        let lines = cart.cart_lines(&products);
        let liked = cart.liked_products(&products);
        let summary = cart.summary(&products);

        // Assert
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].product.id, 1);
        assert_eq!(liked.iter().map(|p| p.id).collect::<Vec<_>>(), vec![5]);
        assert_eq!(summary.item_count, 1);
        assert_eq!(cart.cart_quantity(3), 2);
    }
}
