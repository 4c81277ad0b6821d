//! Order assembly and lifecycle.
//!
//! Order creation builds an immutable price snapshot from the caller's cart:
//! the owning user is resolved first, then every referenced product in one
//! batched catalog query, then each cart line is matched against a resolved
//! product and copied into a line item. The assembled order is persisted in
//! a single terminal write, so a failure at any earlier step leaves the
//! store untouched.
//!
//! Status transitions are permissive: an admin may set any status to any
//! other status. No adjacency rules exist and repeating a transition with
//! the same target is idempotent.

mod error;

pub use error::OrderError;

use rust_decimal::Decimal;
use serde::Deserialize;

use bazaar_core::{OrderId, OrderStatus, ProductId, Role, UserId};

use crate::db::RepositoryError;
use crate::models::{LineItem, NewOrder, Order, OrderWithCustomer, Product, User};

/// One cart entry as supplied by the caller.
///
/// `total_price` is the client-computed line total shown to the shopper
/// before checkout; it is stored verbatim (see [`snapshot_lines`]).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub id: ProductId,
    pub quantity: i32,
    pub total_price: Decimal,
}

/// Persistence contract for orders.
///
/// Atomic at single-order granularity; concurrent status updates on the same
/// order resolve last-write-wins.
#[allow(async_fn_in_trait)]
pub trait OrderStore {
    async fn create(&self, order: NewOrder) -> Result<Order, RepositoryError>;
    async fn get_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError>;
    /// All orders, newest first, each enriched with the owning user's
    /// public fields.
    async fn list_all(&self) -> Result<Vec<OrderWithCustomer>, RepositoryError>;
    async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Option<Order>, RepositoryError>;
    async fn delete(&self, id: OrderId) -> Result<Option<Order>, RepositoryError>;
}

/// Read-only product access used by order assembly.
#[allow(async_fn_in_trait)]
pub trait CatalogLookup {
    /// Resolve a set of product ids in one batched query. Unknown ids are
    /// simply absent from the result.
    async fn find_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError>;
}

/// Read-only user access used by order assembly.
#[allow(async_fn_in_trait)]
pub trait IdentityLookup {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError>;
}

/// Order assembly and lifecycle over pluggable store contracts.
pub struct OrderService<S, C, I> {
    store: S,
    catalog: C,
    identity: I,
}

impl<S, C, I> OrderService<S, C, I>
where
    S: OrderStore,
    C: CatalogLookup,
    I: IdentityLookup,
{
    pub const fn new(store: S, catalog: C, identity: I) -> Self {
        Self {
            store,
            catalog,
            identity,
        }
    }

    /// Assemble and persist a new order from a cart.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::MissingField` for an empty cart,
    /// `OrderError::UserNotFound` / `OrderError::ProductNotFound` when a
    /// referenced entity is absent (no partial order is created), and
    /// `OrderError::Repository` for persistence failures.
    pub async fn create_order(
        &self,
        user_id: UserId,
        cart: &[CartLine],
    ) -> Result<Order, OrderError> {
        if cart.is_empty() {
            return Err(OrderError::MissingField);
        }

        // Resolve the owner before touching the catalog.
        self.identity
            .find_by_id(user_id)
            .await?
            .ok_or(OrderError::UserNotFound)?;

        // One batched catalog query over the distinct product ids.
        let mut distinct_ids: Vec<ProductId> = Vec::with_capacity(cart.len());
        for line in cart {
            if !distinct_ids.contains(&line.id) {
                distinct_ids.push(line.id);
            }
        }
        let products = self.catalog.find_by_ids(&distinct_ids).await?;

        let line_items = snapshot_lines(cart, &products)?;
        let total_price = line_items
            .iter()
            .fold(Decimal::ZERO, |sum, item| sum + item.total_price);

        let order = self
            .store
            .create(NewOrder {
                user_id,
                status: OrderStatus::Initiated,
                line_items,
                total_price,
            })
            .await?;

        Ok(order)
    }

    /// Set an order's status.
    ///
    /// Only admins may transition orders; any of the five statuses is a
    /// valid target regardless of the current one.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Forbidden` for non-admin callers and
    /// `OrderError::OrderNotFound` when the id does not resolve.
    pub async fn transition_status(
        &self,
        caller_role: Role,
        id: OrderId,
        new_status: OrderStatus,
    ) -> Result<Order, OrderError> {
        if caller_role != Role::Admin {
            return Err(OrderError::Forbidden);
        }

        self.store
            .update_status(id, new_status)
            .await?
            .ok_or(OrderError::OrderNotFound)
    }

    /// Fetch a single order by id.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::OrderNotFound` when the id does not resolve.
    pub async fn get_order(&self, id: OrderId) -> Result<Order, OrderError> {
        self.store
            .get_by_id(id)
            .await?
            .ok_or(OrderError::OrderNotFound)
    }

    /// List all orders, newest first, with embedded customer summaries.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the store fails.
    pub async fn list_orders(&self) -> Result<Vec<OrderWithCustomer>, OrderError> {
        Ok(self.store.list_all().await?)
    }

    /// Delete an order, returning its final state.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::OrderNotFound` when the id does not resolve.
    pub async fn delete_order(&self, id: OrderId) -> Result<Order, OrderError> {
        self.store.delete(id).await?.ok_or(OrderError::OrderNotFound)
    }
}

/// The client-trusted pricing boundary.
///
/// Each cart line is matched against a resolved product and copied into a
/// snapshot; the caller-supplied `total_price` is stored verbatim, since the
/// price already shown to the shopper pre-checkout must match what is
/// billed. Swapping this step for server-side recomputation would not touch
/// the rest of assembly.
fn snapshot_lines(cart: &[CartLine], products: &[Product]) -> Result<Vec<LineItem>, OrderError> {
    cart.iter()
        .map(|line| {
            let product = products
                .iter()
                .find(|p| p.id == line.id)
                .ok_or(OrderError::ProductNotFound)?;

            Ok(LineItem {
                product_id: product.id,
                name: product.name.clone(),
                description: product.description.clone(),
                price: product.price,
                quantity: line.quantity,
                total_price: line.total_price,
            })
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};

    use chrono::Utc;
    use rust_decimal::Decimal;

    use bazaar_core::Email;

    use super::*;
    use crate::models::CustomerSummary;

    fn dec(n: i64) -> Decimal {
        Decimal::new(n, 0)
    }

    fn product(id: i32, name: &str, price: i64) -> Product {
        let now = Utc::now();
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            description: format!("{name} description"),
            price: dec(price),
            created_at: now,
            updated_at: now,
        }
    }

    fn user(id: i32) -> User {
        let now = Utc::now();
        User {
            id: UserId::new(id),
            first_name: "Test".to_string(),
            last_name: "Customer".to_string(),
            email: Email::parse("customer@example.com").unwrap(),
            role: Role::Customer,
            phone_number: "555-0100".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    /// In-memory order store double.
    #[derive(Default)]
    struct MemoryStore {
        orders: Mutex<Vec<Order>>,
        next_id: AtomicI32,
    }

    impl OrderStore for MemoryStore {
        async fn create(&self, order: NewOrder) -> Result<Order, RepositoryError> {
            let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
            let now = Utc::now();
            let stored = Order {
                id: OrderId::new(id),
                status: order.status,
                user_id: order.user_id,
                line_items: order.line_items,
                total_price: order.total_price,
                created_at: now,
                updated_at: now,
            };
            self.orders.lock().unwrap().push(stored.clone());
            Ok(stored)
        }

        async fn get_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
            Ok(self
                .orders
                .lock()
                .unwrap()
                .iter()
                .find(|o| o.id == id)
                .cloned())
        }

        async fn list_all(&self) -> Result<Vec<OrderWithCustomer>, RepositoryError> {
            // Insertion order doubles for creation time here; newest first.
            let customer = user(1);
            Ok(self
                .orders
                .lock()
                .unwrap()
                .iter()
                .rev()
                .map(|o| OrderWithCustomer {
                    id: o.id,
                    status: o.status,
                    customer: CustomerSummary {
                        id: customer.id,
                        first_name: customer.first_name.clone(),
                        last_name: customer.last_name.clone(),
                        email: customer.email.clone(),
                    },
                    line_items: o.line_items.clone(),
                    total_price: o.total_price,
                    created_at: o.created_at,
                    updated_at: o.updated_at,
                })
                .collect())
        }

        async fn update_status(
            &self,
            id: OrderId,
            status: OrderStatus,
        ) -> Result<Option<Order>, RepositoryError> {
            let mut orders = self.orders.lock().unwrap();
            match orders.iter_mut().find(|o| o.id == id) {
                Some(order) => {
                    order.status = status;
                    order.updated_at = Utc::now();
                    Ok(Some(order.clone()))
                }
                None => Ok(None),
            }
        }

        async fn delete(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
            let mut orders = self.orders.lock().unwrap();
            match orders.iter().position(|o| o.id == id) {
                Some(index) => Ok(Some(orders.remove(index))),
                None => Ok(None),
            }
        }
    }

    /// In-memory catalog double that counts queries.
    #[derive(Default)]
    struct MemoryCatalog {
        products: Vec<Product>,
        queries: AtomicUsize,
    }

    impl CatalogLookup for MemoryCatalog {
        async fn find_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
            self.queries.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .products
                .iter()
                .filter(|p| ids.contains(&p.id))
                .cloned()
                .collect())
        }
    }

    /// In-memory identity double.
    #[derive(Default)]
    struct MemoryIdentity {
        users: Vec<User>,
    }

    impl IdentityLookup for MemoryIdentity {
        async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
            Ok(self.users.iter().find(|u| u.id == id).cloned())
        }
    }

    fn service_with_catalog(
        products: Vec<Product>,
    ) -> OrderService<MemoryStore, MemoryCatalog, MemoryIdentity> {
        OrderService::new(
            MemoryStore::default(),
            MemoryCatalog {
                products,
                queries: AtomicUsize::new(0),
            },
            MemoryIdentity {
                users: vec![user(1)],
            },
        )
    }

    fn line(id: i32, quantity: i32, total: i64) -> CartLine {
        CartLine {
            id: ProductId::new(id),
            quantity,
            total_price: dec(total),
        }
    }

    #[tokio::test]
    async fn test_create_order_sums_client_totals() {
        let service = service_with_catalog(vec![product(1, "P1", 20), product(2, "P2", 20)]);

        let order = service
            .create_order(UserId::new(1), &[line(1, 3, 60), line(2, 5, 100)])
            .await
            .unwrap();

        assert_eq!(order.total_price, dec(160));
        assert_eq!(order.status, OrderStatus::Initiated);
        assert_eq!(order.line_items.len(), 2);
        // The snapshot copies catalog fields and trusts the client totals.
        assert_eq!(order.line_items[0].name, "P1");
        assert_eq!(order.line_items[0].price, dec(20));
        assert_eq!(order.line_items[0].quantity, 3);
        assert_eq!(order.line_items[0].total_price, dec(60));
        assert_eq!(order.line_items[1].total_price, dec(100));
    }

    #[tokio::test]
    async fn test_create_order_unknown_product_persists_nothing() {
        let service = service_with_catalog(vec![product(1, "P1", 20)]);

        let result = service
            .create_order(UserId::new(1), &[line(1, 1, 20), line(9, 1, 10)])
            .await;

        assert!(matches!(result, Err(OrderError::ProductNotFound)));
        assert!(service.store.orders.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_order_unknown_user_skips_catalog() {
        let service = OrderService::new(
            MemoryStore::default(),
            MemoryCatalog {
                products: vec![product(1, "P1", 20)],
                queries: AtomicUsize::new(0),
            },
            MemoryIdentity::default(),
        );

        let result = service
            .create_order(UserId::new(42), &[line(1, 1, 20)])
            .await;

        assert!(matches!(result, Err(OrderError::UserNotFound)));
        assert_eq!(service.catalog.queries.load(Ordering::SeqCst), 0);
        assert!(service.store.orders.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_order_empty_cart_is_missing_field() {
        let service = service_with_catalog(vec![]);

        let result = service.create_order(UserId::new(1), &[]).await;

        assert!(matches!(result, Err(OrderError::MissingField)));
    }

    #[tokio::test]
    async fn test_create_order_repeated_product_id_keeps_both_lines() {
        let service = service_with_catalog(vec![product(1, "P1", 20)]);

        let order = service
            .create_order(UserId::new(1), &[line(1, 1, 20), line(1, 2, 40)])
            .await
            .unwrap();

        assert_eq!(order.line_items.len(), 2);
        assert_eq!(order.total_price, dec(60));
    }

    #[tokio::test]
    async fn test_transition_requires_admin() {
        let service = service_with_catalog(vec![product(1, "P1", 20)]);
        let order = service
            .create_order(UserId::new(1), &[line(1, 1, 20)])
            .await
            .unwrap();

        let result = service
            .transition_status(Role::Customer, order.id, OrderStatus::Sent)
            .await;

        assert!(matches!(result, Err(OrderError::Forbidden)));
        let unchanged = service.get_order(order.id).await.unwrap();
        assert_eq!(unchanged.status, OrderStatus::Initiated);
    }

    #[tokio::test]
    async fn test_transition_accepts_all_statuses_and_is_idempotent() {
        let service = service_with_catalog(vec![product(1, "P1", 20)]);
        let order = service
            .create_order(UserId::new(1), &[line(1, 1, 20)])
            .await
            .unwrap();

        for status in OrderStatus::ALL {
            let updated = service
                .transition_status(Role::Admin, order.id, status)
                .await
                .unwrap();
            assert_eq!(updated.status, status);

            // Repeating with the same target yields the same result.
            let repeated = service
                .transition_status(Role::Admin, order.id, status)
                .await
                .unwrap();
            assert_eq!(repeated.status, status);
        }
    }

    #[tokio::test]
    async fn test_transition_has_no_ordering_rules() {
        let service = service_with_catalog(vec![product(1, "P1", 20)]);
        let order = service
            .create_order(UserId::new(1), &[line(1, 1, 20)])
            .await
            .unwrap();

        // Leaving a terminal status is allowed by design.
        let declined = service
            .transition_status(Role::Admin, order.id, OrderStatus::Declined)
            .await
            .unwrap();
        assert_eq!(declined.status, OrderStatus::Declined);

        let sent = service
            .transition_status(Role::Admin, order.id, OrderStatus::Sent)
            .await
            .unwrap();
        assert_eq!(sent.status, OrderStatus::Sent);
    }

    #[tokio::test]
    async fn test_transition_unknown_order() {
        let service = service_with_catalog(vec![]);

        let result = service
            .transition_status(Role::Admin, OrderId::new(99), OrderStatus::Sent)
            .await;

        assert!(matches!(result, Err(OrderError::OrderNotFound)));
    }

    #[tokio::test]
    async fn test_list_orders_newest_first() {
        let service = service_with_catalog(vec![product(1, "P1", 20)]);

        let a = service
            .create_order(UserId::new(1), &[line(1, 1, 20)])
            .await
            .unwrap();
        let b = service
            .create_order(UserId::new(1), &[line(1, 1, 20)])
            .await
            .unwrap();
        let c = service
            .create_order(UserId::new(1), &[line(1, 1, 20)])
            .await
            .unwrap();

        let listed = service.list_orders().await.unwrap();
        let ids: Vec<OrderId> = listed.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![c.id, b.id, a.id]);
        assert_eq!(listed[0].customer.first_name, "Test");
    }

    #[tokio::test]
    async fn test_delete_order() {
        let service = service_with_catalog(vec![product(1, "P1", 20)]);
        let order = service
            .create_order(UserId::new(1), &[line(1, 1, 20)])
            .await
            .unwrap();

        let deleted = service.delete_order(order.id).await.unwrap();
        assert_eq!(deleted.id, order.id);

        let result = service.get_order(order.id).await;
        assert!(matches!(result, Err(OrderError::OrderNotFound)));
    }
}
