//! Cart and wishlist store.
//!
//! Holds both collections in memory and mirrors each one to
//! [`ClientStorage`] after every change. Wishlist toggles update local
//! state first; when a session token is stored, the same toggle is pushed
//! to the account backend in a detached task whose failure is only logged.
//! Local state is never rolled back, and the next [`CartStore::mount`]
//! replaces local likes with the server's copy.

use std::sync::Arc;

use serde_json::Value;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::domain::aggregates::{Cart, CartItem, LikeItem, Product, Wishlist};
use crate::domain::events::{Collection, DomainEvent};
use crate::domain::value_objects::{Price, Quantity};
use crate::storage::{self, ClientStorage, FileStorage, CART_KEY, LIKES_KEY, TOKEN_KEY};
use crate::sync::{HttpWishlistClient, NoRemote, WishlistRemote};
use crate::Result;

pub struct CartStore<R: WishlistRemote = NoRemote> {
    storage: Arc<dyn ClientStorage>,
    remote: Arc<R>,
    cart: Cart,
    wishlist: Wishlist,
    pending_sync: Vec<JoinHandle<()>>,
}

impl<R: WishlistRemote> CartStore<R> {
    /// Hydrates both collections from storage. Corrupted entries start empty.
    pub fn open(storage: Arc<dyn ClientStorage>, remote: R) -> Self {
        let cart = Cart::restore(storage::load_collection(storage.as_ref(), CART_KEY));
        let wishlist = Wishlist::restore(storage::load_collection(storage.as_ref(), LIKES_KEY));
        debug!(cart_rows = cart.item_count(), likes = wishlist.len(), "store hydrated");
        Self { storage, remote: Arc::new(remote), cart, wishlist, pending_sync: Vec::new() }
    }

    /// [`open`](Self::open), then pull the server wishlist if a token is stored.
    pub async fn mount(storage: Arc<dyn ClientStorage>, remote: R) -> Self {
        let mut store = Self::open(storage, remote);
        store.fetch_wishlist().await;
        store
    }

    pub fn cart_items(&self) -> &[CartItem] { self.cart.items() }
    pub fn likes(&self) -> &[LikeItem] { self.wishlist.items() }

    /// The stored session token, if any. Empty tokens count as absent.
    pub fn token(&self) -> Option<String> {
        match self.storage.get_item(TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.trim().is_empty()),
            Err(e) => {
                warn!(error = %e, "failed to read session token");
                None
            }
        }
    }

    /// Stores the token and replaces local likes with the account's wishlist.
    pub async fn sign_in(&mut self, token: &str) -> Result<()> {
        self.storage.set_item(TOKEN_KEY, token)?;
        info!("session token stored");
        self.fetch_wishlist().await;
        Ok(())
    }

    /// Forgets the token. Local likes stay.
    pub fn sign_out(&mut self) -> Result<()> {
        self.storage.remove_item(TOKEN_KEY)
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Adds `quantity` of a product, merging with an existing row of the same
    /// product and size. Returns the row id.
    pub fn add_to_cart(&mut self, product: &Product, quantity: u32, size: Option<&str>) -> String {
        let item_id = self.cart.add_item(product, Quantity::new(quantity), size.map(str::to_string));
        self.commit();
        item_id
    }

    /// Normalizes a loosely shaped product before adding it.
    pub fn add_json_to_cart(&mut self, product: &Value, quantity: u32, size: Option<&str>) -> Result<String> {
        let product = Product::from_json(product)?;
        Ok(self.add_to_cart(&product, quantity, size))
    }

    /// No-op when the row does not exist.
    pub fn remove_from_cart(&mut self, item_id: &str) -> bool {
        let removed = self.cart.remove_item(item_id);
        self.commit();
        removed
    }

    /// Zero or negative quantities remove the row.
    pub fn update_cart_quantity(&mut self, item_id: &str, quantity: i64) -> bool {
        let changed = self.cart.update_quantity(item_id, quantity);
        self.commit();
        changed
    }

    pub fn clear_cart(&mut self) {
        self.cart.clear();
        self.commit();
    }

    pub fn cart_total(&self) -> Price { self.cart.total() }

    pub fn cart_count(&self) -> u64 { self.cart.quantity_count() }

    // =========================================================================
    // Wishlist
    // =========================================================================

    /// Flips the product's liked state locally and, with a session token,
    /// pushes the toggle in the background. Returns the new local state.
    /// Products with a blank id are ignored and never pushed.
    pub fn toggle_like(&mut self, product: &Product) -> bool {
        let Some(item) = LikeItem::from(product).normalized() else {
            debug!("ignoring like toggle for product without id");
            return false;
        };
        let liked = self.wishlist.toggle(item.clone());
        self.commit();
        if let Some(token) = self.token() {
            self.push_toggle(token, item);
        }
        liked
    }

    pub fn toggle_like_json(&mut self, product: &Value) -> Result<bool> {
        let product = Product::from_json(product)?;
        Ok(self.toggle_like(&product))
    }

    pub fn is_liked(&self, product_id: &str) -> bool { self.wishlist.contains(product_id) }

    /// Replaces local likes with the account's wishlist. Does nothing without
    /// a token; failures are logged and leave local likes untouched.
    pub async fn fetch_wishlist(&mut self) {
        let Some(token) = self.token() else { return; };
        match self.remote.fetch_wishlist(&token).await {
            Ok(items) => {
                debug!(count = items.len(), "wishlist fetched");
                self.wishlist.replace(items);
                self.commit();
            }
            Err(e) => warn!(error = %e, "failed to fetch wishlist"),
        }
    }

    /// Waits for every toggle push still in flight.
    pub async fn flush_sync(&mut self) {
        for task in std::mem::take(&mut self.pending_sync) {
            if let Err(e) = task.await {
                warn!(error = %e, "wishlist sync task failed");
            }
        }
    }

    fn push_toggle(&mut self, token: String, item: LikeItem) {
        let Ok(handle) = Handle::try_current() else {
            warn!(product_id = %item.product_id, "no async runtime, wishlist toggle not synced");
            return;
        };
        self.pending_sync.retain(|task| !task.is_finished());
        let remote = Arc::clone(&self.remote);
        self.pending_sync.push(handle.spawn(async move {
            if let Err(e) = remote.toggle(&token, &item).await {
                warn!(product_id = %item.product_id, error = %e, "failed to sync wishlist toggle");
            }
        }));
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Re-persists each collection that raised events since the last commit.
    fn commit(&mut self) {
        let events: Vec<DomainEvent> = self.cart.take_events().into_iter().chain(self.wishlist.take_events()).collect();
        let touched = |c: Collection| events.iter().any(|e| e.collection() == c);
        if touched(Collection::Cart) {
            self.persist(CART_KEY, storage::save_collection(self.storage.as_ref(), CART_KEY, self.cart.items()));
        }
        if touched(Collection::Likes) {
            self.persist(LIKES_KEY, storage::save_collection(self.storage.as_ref(), LIKES_KEY, self.wishlist.items()));
        }
    }

    fn persist(&self, key: &str, result: Result<()>) {
        if let Err(e) = result {
            warn!(key, error = %e, "failed to persist collection");
        }
    }
}

impl CartStore<HttpWishlistClient> {
    /// File-backed store syncing with the configured API, mounted.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let storage = Arc::new(FileStorage::open(&config.storage_dir)?);
        let remote = HttpWishlistClient::new(&config.api_url)?;
        Ok(Self::mount(storage, remote).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use crate::StoreError;
    use rust_decimal::Decimal;
    use serde_json::json;
    use std::sync::Mutex;

    /// Remote that records toggles and serves a fixed wishlist.
    #[derive(Default)]
    struct RecordingRemote {
        wishlist: Vec<LikeItem>,
        fail: bool,
        toggles: Mutex<Vec<(String, String)>>,
    }

    impl WishlistRemote for Arc<RecordingRemote> {
        async fn fetch_wishlist(&self, _token: &str) -> Result<Vec<LikeItem>> {
            if self.fail { return Err(StoreError::RemoteUnavailable); }
            Ok(self.wishlist.clone())
        }

        async fn toggle(&self, token: &str, item: &LikeItem) -> Result<()> {
            self.toggles.lock().unwrap().push((token.to_string(), item.product_id.clone()));
            if self.fail { return Err(StoreError::RemoteUnavailable); }
            Ok(())
        }
    }

    fn product(id: &str, price: i64) -> Product { Product::new(id, "Travertine", Price::new(Decimal::new(price, 0))) }

    fn offline_store(storage: &Arc<MemoryStorage>) -> CartStore {
        CartStore::open(storage.clone(), NoRemote)
    }

    #[test]
    fn test_spec_example() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = offline_store(&storage);
        store.add_json_to_cart(&json!({ "id": "A", "name": "X", "price": 100 }), 2, None).unwrap();
        store.add_json_to_cart(&json!({ "id": "A", "name": "X", "price": 100 }), 3, None).unwrap();
        assert_eq!(store.cart_items().len(), 1);
        assert_eq!(store.cart_items()[0].quantity.value(), 5);
        assert_eq!(store.cart_total().amount(), Decimal::new(500, 0));
        assert_eq!(store.cart_count(), 5);
    }

    #[test]
    fn test_update_to_zero_equals_remove() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = offline_store(&storage);
        let a = store.add_to_cart(&product("A", 10), 1, None);
        let b = store.add_to_cart(&product("B", 20), 2, Some("2cm"));
        assert!(!store.remove_from_cart("nope"));
        assert_eq!(store.cart_items().len(), 2);
        assert!(store.update_cart_quantity(&a, 0));
        assert!(store.update_cart_quantity(&b, -1));
        assert!(store.cart_items().is_empty());
        assert_eq!(store.cart_total(), Price::zero());
    }

    #[test]
    fn test_every_mutation_persists_owning_collection_only() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = offline_store(&storage);
        let id = store.add_to_cart(&product("A", 10), 1, None);
        assert!(storage.get_item(CART_KEY).unwrap().is_some());
        assert!(storage.get_item(LIKES_KEY).unwrap().is_none());

        store.toggle_like(&product("L", 5));
        store.clear_cart();
        assert_eq!(storage.get_item(CART_KEY).unwrap().as_deref(), Some("[]"));
        let likes: Vec<LikeItem> = storage::load_collection(&*storage, LIKES_KEY);
        assert_eq!(likes.len(), 1);
        assert!(!store.remove_from_cart(&id));
    }

    #[test]
    fn test_like_toggles_leave_stored_cart_untouched() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = offline_store(&storage);
        store.add_to_cart(&product("A", 10), 2, Some("60x60"));
        let cart_before = storage.get_item(CART_KEY).unwrap();
        assert!(cart_before.is_some());

        store.toggle_like(&product("L", 5));
        store.toggle_like(&product("M", 6));
        store.toggle_like(&product("L", 5));
        assert_eq!(storage.get_item(CART_KEY).unwrap(), cart_before);
        let likes: Vec<LikeItem> = storage::load_collection(&*storage, LIKES_KEY);
        assert_eq!(likes.len(), 1);
    }

    #[test]
    fn test_cart_total_saturates_on_huge_prices() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = offline_store(&storage);
        store.add_json_to_cart(&json!({ "id": "A", "price": "79228162514264337593543950335" }), 2, None).unwrap();
        assert_eq!(store.cart_total().amount(), Decimal::MAX);
        store.add_json_to_cart(&json!({ "id": "B", "price": 1e20 }), u32::MAX, None).unwrap();
        assert_eq!(store.cart_total().amount(), Decimal::MAX);
        assert_eq!(store.cart_count(), 2 + u64::from(u32::MAX));
    }

    #[test]
    fn test_hydrates_from_storage() {
        let storage = Arc::new(MemoryStorage::new());
        {
            let mut store = offline_store(&storage);
            store.add_to_cart(&product("A", 30), 4, Some("60x60"));
            store.toggle_like(&product("B", 12));
        }
        let store = offline_store(&storage);
        assert_eq!(store.cart_count(), 4);
        assert_eq!(store.cart_items()[0].size.as_deref(), Some("60x60"));
        assert!(store.is_liked("B"));
    }

    #[test]
    fn test_corrupted_storage_starts_empty() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set_item(CART_KEY, "not json").unwrap();
        storage.set_item(LIKES_KEY, "[{\"broken\":").unwrap();
        let store = offline_store(&storage);
        assert!(store.cart_items().is_empty());
        assert!(store.likes().is_empty());
    }

    #[test]
    fn test_toggle_pair_without_backend() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = offline_store(&storage);
        assert!(store.toggle_like(&product("P", 1)));
        assert!(!store.toggle_like(&product("P", 1)));
        assert!(!store.is_liked("P"));
        assert!(!store.is_liked(""));
        assert!(store.likes().is_empty());
    }

    #[test]
    fn test_toggle_with_token_but_no_runtime_keeps_local_state() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set_item(TOKEN_KEY, "t").unwrap();
        let mut store = offline_store(&storage);
        assert!(store.toggle_like(&product("P", 1)));
        assert!(store.is_liked("P"));
    }

    #[test]
    fn test_invalid_product_json() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = offline_store(&storage);
        assert!(matches!(store.add_json_to_cart(&json!({ "name": "?" }), 1, None), Err(StoreError::InvalidProduct(_))));
        assert!(store.cart_items().is_empty());
    }

    #[tokio::test]
    async fn test_toggle_pushes_only_with_token() {
        let storage = Arc::new(MemoryStorage::new());
        let remote = Arc::new(RecordingRemote::default());
        let mut store = CartStore::open(storage.clone(), remote.clone());
        store.toggle_like(&product("P1", 1));
        store.flush_sync().await;
        assert!(remote.toggles.lock().unwrap().is_empty());

        storage.set_item(TOKEN_KEY, "secret").unwrap();
        store.toggle_like(&product("P2", 1));
        store.flush_sync().await;
        assert_eq!(*remote.toggles.lock().unwrap(), vec![("secret".to_string(), "P2".to_string())]);
    }

    #[tokio::test]
    async fn test_blank_id_toggle_is_not_pushed() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set_item(TOKEN_KEY, "secret").unwrap();
        let remote = Arc::new(RecordingRemote::default());
        let mut store = CartStore::open(storage.clone(), remote.clone());
        assert!(!store.toggle_like(&product("", 1)));
        assert!(!store.toggle_like(&product("   ", 1)));
        store.flush_sync().await;
        assert!(store.likes().is_empty());
        assert!(!store.is_liked("   "));
        assert!(remote.toggles.lock().unwrap().is_empty());
        assert!(storage.get_item(LIKES_KEY).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_padded_id_is_pushed_trimmed() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set_item(TOKEN_KEY, "secret").unwrap();
        let remote = Arc::new(RecordingRemote::default());
        let mut store = CartStore::open(storage.clone(), remote.clone());
        assert!(store.toggle_like(&product(" P7 ", 1)));
        store.flush_sync().await;
        assert!(store.is_liked("P7"));
        assert_eq!(*remote.toggles.lock().unwrap(), vec![("secret".to_string(), "P7".to_string())]);
    }

    #[tokio::test]
    async fn test_failed_push_does_not_roll_back() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set_item(TOKEN_KEY, "secret").unwrap();
        let remote = Arc::new(RecordingRemote { fail: true, ..RecordingRemote::default() });
        let mut store = CartStore::open(storage.clone(), remote.clone());
        assert!(store.toggle_like(&product("P", 1)));
        store.flush_sync().await;
        assert!(store.is_liked("P"));
        assert_eq!(remote.toggles.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_mount_with_token_overwrites_likes() {
        let storage = Arc::new(MemoryStorage::new());
        {
            let mut store = offline_store(&storage);
            store.toggle_like(&product("local", 1));
        }
        storage.set_item(TOKEN_KEY, "secret").unwrap();
        let remote = Arc::new(RecordingRemote { wishlist: vec![LikeItem::from(&product("remote", 2))], ..RecordingRemote::default() });
        let store = CartStore::mount(storage.clone(), remote).await;
        assert!(store.is_liked("remote"));
        assert!(!store.is_liked("local"));
        let persisted: Vec<LikeItem> = storage::load_collection(&*storage, LIKES_KEY);
        assert_eq!(persisted.len(), 1);
    }

    #[tokio::test]
    async fn test_mount_without_token_or_with_failing_remote_keeps_likes() {
        let storage = Arc::new(MemoryStorage::new());
        {
            let mut store = offline_store(&storage);
            store.toggle_like(&product("local", 1));
        }
        let remote = Arc::new(RecordingRemote { wishlist: vec![LikeItem::from(&product("remote", 2))], ..RecordingRemote::default() });
        let store = CartStore::mount(storage.clone(), remote).await;
        assert!(store.is_liked("local"));

        storage.set_item(TOKEN_KEY, "secret").unwrap();
        let failing = Arc::new(RecordingRemote { fail: true, ..RecordingRemote::default() });
        let store = CartStore::mount(storage.clone(), failing).await;
        assert!(store.is_liked("local"));
    }

    #[tokio::test]
    async fn test_sign_in_and_out() {
        let storage = Arc::new(MemoryStorage::new());
        let remote = Arc::new(RecordingRemote { wishlist: vec![LikeItem::from(&product("R", 2))], ..RecordingRemote::default() });
        let mut store = CartStore::open(storage.clone(), remote);
        assert_eq!(store.token(), None);
        store.sign_in("abc").await.unwrap();
        assert_eq!(store.token().as_deref(), Some("abc"));
        assert!(store.is_liked("R"));
        store.sign_out().unwrap();
        assert_eq!(store.token(), None);
        assert!(store.is_liked("R"));
    }
}
