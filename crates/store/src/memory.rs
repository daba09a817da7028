use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use common::Money;
use tokio::sync::RwLock;

use crate::repository::{
    AddressRepository, AssignmentRepository, CourierRepository, CustomerRepository,
    OrderItemRepository, OrderRepository, PreferenceRepository, ProductRepository,
};
use crate::{
    Address, AddressChanges, Assignment, Courier, CourierChanges, CourierFilter, Customer,
    CustomerChanges, NewAddress, NewAssignment, NewCourier, NewCustomer, NewOrder, NewProduct,
    Order, OrderChanges, OrderItem, OrderItemChanges, OrderStatus, OrderUpdate, Page, Preference,
    Product, ProductChanges, ProductFilter, Result, StoreError, constraint,
};

#[derive(Debug, Default)]
struct Sequences {
    customers: i64,
    addresses: i64,
    products: i64,
    orders: i64,
    couriers: i64,
    assignments: i64,
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

fn paginate<'a, T: Clone + 'a>(rows: impl Iterator<Item = &'a T>, page: Page) -> Vec<T> {
    rows.skip(page.offset).take(page.limit).cloned().collect()
}

#[derive(Debug, Default)]
struct Tables {
    customers: BTreeMap<i64, Customer>,
    addresses: BTreeMap<i64, Address>,
    products: BTreeMap<i64, Product>,
    orders: BTreeMap<i64, Order>,
    order_items: BTreeMap<(i64, i64), OrderItem>,
    couriers: BTreeMap<i64, Courier>,
    assignments: BTreeMap<i64, Assignment>,
    preferences: BTreeMap<(i64, String), Preference>,
    seq: Sequences,
}

impl Tables {
    fn ensure_phone_free(&self, phone: &str, except: Option<i64>) -> Result<()> {
        if self
            .customers
            .values()
            .any(|c| c.phone == phone && Some(c.id) != except)
        {
            return Err(StoreError::unique(constraint::CUSTOMER_PHONE));
        }
        Ok(())
    }

    fn ensure_product_name_free(&self, name: &str, except: Option<i64>) -> Result<()> {
        let lowered = name.to_lowercase();
        if self
            .products
            .values()
            .any(|p| p.name.to_lowercase() == lowered && Some(p.id) != except)
        {
            return Err(StoreError::unique(constraint::PRODUCT_NAME));
        }
        Ok(())
    }

    fn ensure_customer(&self, id: i64, fk: &str) -> Result<()> {
        if self.customers.contains_key(&id) {
            Ok(())
        } else {
            Err(StoreError::foreign_key(fk))
        }
    }

    fn ensure_address(&self, id: i64) -> Result<()> {
        if self.addresses.contains_key(&id) {
            Ok(())
        } else {
            Err(StoreError::foreign_key(constraint::ORDER_ADDRESS))
        }
    }

    fn ensure_order(&self, id: i64, fk: &str) -> Result<()> {
        if self.orders.contains_key(&id) {
            Ok(())
        } else {
            Err(StoreError::foreign_key(fk))
        }
    }

    fn ensure_courier(&self, id: i64) -> Result<()> {
        if self.couriers.contains_key(&id) {
            Ok(())
        } else {
            Err(StoreError::foreign_key(constraint::ASSIGNMENT_COURIER))
        }
    }

    /// Clears the primary flag on every address of `customer_id` except `keep`.
    fn clear_primary(&mut self, customer_id: i64, keep: i64) {
        for address in self.addresses.values_mut() {
            if address.customer_id == customer_id && address.id != keep && address.is_primary {
                tracing::debug!(address_id = address.id, customer_id, "clearing primary flag");
                address.is_primary = false;
            }
        }
    }

    /// Writes an address row, enforcing the customer foreign key and primary
    /// exclusivity in one step.
    fn put_address(&mut self, address: Address) -> Result<Address> {
        self.ensure_customer(address.customer_id, constraint::ADDRESS_CUSTOMER)?;
        if address.is_primary {
            self.clear_primary(address.customer_id, address.id);
        }
        self.addresses.insert(address.id, address.clone());
        Ok(address)
    }

    fn put_order(&mut self, order: Order) -> Result<Order> {
        self.ensure_customer(order.customer_id, constraint::ORDER_CUSTOMER)?;
        self.ensure_address(order.address_id)?;
        self.orders.insert(order.id, order.clone());
        Ok(order)
    }
}

/// In-memory store for tests and database-less runs.
///
/// Mirrors the constraints of the SQL schema so services observe the same
/// unique and foreign-key violations either way.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears all tables and resets id sequences.
    pub async fn clear(&self) {
        *self.tables.write().await = Tables::default();
    }
}

#[async_trait]
impl CustomerRepository for InMemoryStore {
    async fn create_customer(&self, customer: NewCustomer) -> Result<Customer> {
        let mut tables = self.tables.write().await;
        tables.ensure_phone_free(&customer.phone, None)?;

        let record = Customer {
            id: next_id(&mut tables.seq.customers),
            name: customer.name,
            phone: customer.phone,
            email: customer.email,
            created_at: Utc::now(),
        };
        tables.customers.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get_customer(&self, id: i64) -> Result<Option<Customer>> {
        Ok(self.tables.read().await.customers.get(&id).cloned())
    }

    async fn list_customers(&self, page: Page) -> Result<Vec<Customer>> {
        Ok(paginate(self.tables.read().await.customers.values(), page))
    }

    async fn update_customer(&self, id: i64, customer: NewCustomer) -> Result<Option<Customer>> {
        let changes = CustomerChanges {
            name: Some(customer.name),
            phone: Some(customer.phone),
            email: Some(customer.email),
        };
        self.update_customer_partial(id, changes).await
    }

    async fn update_customer_partial(
        &self,
        id: i64,
        changes: CustomerChanges,
    ) -> Result<Option<Customer>> {
        let mut tables = self.tables.write().await;
        let Some(mut record) = tables.customers.get(&id).cloned() else {
            return Ok(None);
        };
        changes.apply_to(&mut record);
        tables.ensure_phone_free(&record.phone, Some(id))?;
        tables.customers.insert(id, record.clone());
        Ok(Some(record))
    }

    async fn delete_customer(&self, id: i64) -> Result<Option<Customer>> {
        let mut tables = self.tables.write().await;
        if !tables.customers.contains_key(&id) {
            return Ok(None);
        }
        if tables.orders.values().any(|o| o.customer_id == id) {
            return Err(StoreError::foreign_key(constraint::ORDER_CUSTOMER));
        }
        let owned_addresses: Vec<i64> = tables
            .addresses
            .values()
            .filter(|a| a.customer_id == id)
            .map(|a| a.id)
            .collect();
        if tables
            .orders
            .values()
            .any(|o| owned_addresses.contains(&o.address_id))
        {
            return Err(StoreError::foreign_key(constraint::ORDER_ADDRESS));
        }

        tables.addresses.retain(|_, a| a.customer_id != id);
        tables.preferences.retain(|(customer_id, _), _| *customer_id != id);
        Ok(tables.customers.remove(&id))
    }
}

#[async_trait]
impl AddressRepository for InMemoryStore {
    async fn create_address(&self, address: NewAddress) -> Result<Address> {
        let mut tables = self.tables.write().await;
        tables.ensure_customer(address.customer_id, constraint::ADDRESS_CUSTOMER)?;

        let record = Address {
            id: next_id(&mut tables.seq.addresses),
            customer_id: address.customer_id,
            label: address.label,
            address_text: address.address_text,
            reference: address.reference,
            latitude: address.latitude,
            longitude: address.longitude,
            is_primary: address.is_primary,
            created_at: Utc::now(),
        };
        tables.put_address(record)
    }

    async fn get_address(&self, id: i64) -> Result<Option<Address>> {
        Ok(self.tables.read().await.addresses.get(&id).cloned())
    }

    async fn list_addresses(&self, page: Page) -> Result<Vec<Address>> {
        Ok(paginate(self.tables.read().await.addresses.values(), page))
    }

    async fn list_addresses_by_customer(&self, customer_id: i64) -> Result<Vec<Address>> {
        Ok(self
            .tables
            .read()
            .await
            .addresses
            .values()
            .filter(|a| a.customer_id == customer_id)
            .cloned()
            .collect())
    }

    async fn get_primary_address(&self, customer_id: i64) -> Result<Option<Address>> {
        Ok(self
            .tables
            .read()
            .await
            .addresses
            .values()
            .find(|a| a.customer_id == customer_id && a.is_primary)
            .cloned())
    }

    async fn update_address(&self, id: i64, address: NewAddress) -> Result<Option<Address>> {
        let changes = AddressChanges {
            customer_id: Some(address.customer_id),
            label: Some(address.label),
            address_text: Some(address.address_text),
            reference: Some(address.reference),
            latitude: Some(address.latitude),
            longitude: Some(address.longitude),
            is_primary: Some(address.is_primary),
        };
        self.update_address_partial(id, changes).await
    }

    async fn update_address_partial(
        &self,
        id: i64,
        changes: AddressChanges,
    ) -> Result<Option<Address>> {
        let mut tables = self.tables.write().await;
        let Some(mut record) = tables.addresses.get(&id).cloned() else {
            return Ok(None);
        };
        changes.apply_to(&mut record);
        tables.put_address(record).map(Some)
    }

    async fn delete_address(&self, id: i64) -> Result<Option<Address>> {
        let mut tables = self.tables.write().await;
        if tables.orders.values().any(|o| o.address_id == id) {
            return Err(StoreError::foreign_key(constraint::ORDER_ADDRESS));
        }
        Ok(tables.addresses.remove(&id))
    }
}

#[async_trait]
impl ProductRepository for InMemoryStore {
    async fn create_product(&self, product: NewProduct) -> Result<Product> {
        let mut tables = self.tables.write().await;
        tables.ensure_product_name_free(&product.name, None)?;

        let record = Product {
            id: next_id(&mut tables.seq.products),
            name: product.name,
            description: product.description,
            price: product.price,
            is_active: product.is_active,
            created_at: Utc::now(),
        };
        tables.products.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get_product(&self, id: i64) -> Result<Option<Product>> {
        Ok(self.tables.read().await.products.get(&id).cloned())
    }

    async fn list_products(&self, page: Page) -> Result<Vec<Product>> {
        Ok(paginate(self.tables.read().await.products.values(), page))
    }

    async fn find_product_by_name(&self, name: &str) -> Result<Option<Product>> {
        let lowered = name.to_lowercase();
        Ok(self
            .tables
            .read()
            .await
            .products
            .values()
            .find(|p| p.name.to_lowercase() == lowered)
            .cloned())
    }

    async fn filter_products(&self, filter: &ProductFilter) -> Result<Vec<Product>> {
        let name = filter.name.as_ref().map(|n| n.to_lowercase());
        let tables = self.tables.read().await;
        Ok(tables
            .products
            .values()
            .filter(|p| {
                if let Some(ref needle) = name
                    && !p.name.to_lowercase().contains(needle.as_str())
                {
                    return false;
                }
                if let Some(min) = filter.min_price
                    && p.price < min
                {
                    return false;
                }
                if let Some(max) = filter.max_price
                    && p.price > max
                {
                    return false;
                }
                if let Some(active) = filter.is_active
                    && p.is_active != active
                {
                    return false;
                }
                true
            })
            .cloned()
            .collect())
    }

    async fn update_product(&self, id: i64, product: NewProduct) -> Result<Option<Product>> {
        let changes = ProductChanges {
            name: Some(product.name),
            description: Some(product.description),
            price: Some(product.price),
            is_active: Some(product.is_active),
        };
        self.update_product_partial(id, changes).await
    }

    async fn update_product_partial(
        &self,
        id: i64,
        changes: ProductChanges,
    ) -> Result<Option<Product>> {
        let mut tables = self.tables.write().await;
        let Some(mut record) = tables.products.get(&id).cloned() else {
            return Ok(None);
        };
        changes.apply_to(&mut record);
        tables.ensure_product_name_free(&record.name, Some(id))?;
        tables.products.insert(id, record.clone());
        Ok(Some(record))
    }

    async fn deactivate_product(&self, id: i64) -> Result<Option<Product>> {
        let mut tables = self.tables.write().await;
        Ok(tables.products.get_mut(&id).map(|p| {
            p.is_active = false;
            p.clone()
        }))
    }

    async fn delete_product(&self, id: i64) -> Result<Option<Product>> {
        let mut tables = self.tables.write().await;
        if tables.order_items.values().any(|i| i.product_id == id) {
            return Err(StoreError::foreign_key(constraint::ORDER_ITEM_PRODUCT));
        }
        Ok(tables.products.remove(&id))
    }
}

#[async_trait]
impl OrderRepository for InMemoryStore {
    async fn create_order(&self, order: NewOrder) -> Result<Order> {
        let mut tables = self.tables.write().await;
        tables.ensure_customer(order.customer_id, constraint::ORDER_CUSTOMER)?;
        tables.ensure_address(order.address_id)?;

        let record = Order {
            id: next_id(&mut tables.seq.orders),
            customer_id: order.customer_id,
            address_id: order.address_id,
            total: Money::zero(),
            payment_method: order.payment_method,
            status: order.status,
            created_at: Utc::now(),
        };
        tables.put_order(record)
    }

    async fn get_order(&self, id: i64) -> Result<Option<Order>> {
        Ok(self.tables.read().await.orders.get(&id).cloned())
    }

    async fn list_orders(&self, page: Page) -> Result<Vec<Order>> {
        Ok(paginate(self.tables.read().await.orders.values(), page))
    }

    async fn list_orders_by_customer(&self, customer_id: i64) -> Result<Vec<Order>> {
        Ok(self
            .tables
            .read()
            .await
            .orders
            .values()
            .filter(|o| o.customer_id == customer_id)
            .cloned()
            .collect())
    }

    async fn update_order(&self, id: i64, order: OrderUpdate) -> Result<Option<Order>> {
        let mut tables = self.tables.write().await;
        let Some(mut record) = tables.orders.get(&id).cloned() else {
            return Ok(None);
        };
        record.customer_id = order.customer_id;
        record.address_id = order.address_id;
        record.total = order.total;
        record.payment_method = order.payment_method;
        record.status = order.status;
        tables.put_order(record).map(Some)
    }

    async fn update_order_partial(&self, id: i64, changes: OrderChanges) -> Result<Option<Order>> {
        let mut tables = self.tables.write().await;
        let Some(mut record) = tables.orders.get(&id).cloned() else {
            return Ok(None);
        };
        changes.apply_to(&mut record);
        tables.put_order(record).map(Some)
    }

    async fn update_order_status(&self, id: i64, status: OrderStatus) -> Result<Option<Order>> {
        let mut tables = self.tables.write().await;
        Ok(tables.orders.get_mut(&id).map(|o| {
            o.status = status;
            o.clone()
        }))
    }

    async fn update_order_total(&self, id: i64, total: Money) -> Result<Option<Order>> {
        let mut tables = self.tables.write().await;
        Ok(tables.orders.get_mut(&id).map(|o| {
            o.total = total;
            o.clone()
        }))
    }

    async fn delete_order(&self, id: i64) -> Result<Option<Order>> {
        let mut tables = self.tables.write().await;
        let removed = tables.orders.remove(&id);
        if removed.is_some() {
            tables.order_items.retain(|(order_id, _), _| *order_id != id);
            tables.assignments.retain(|_, a| a.order_id != id);
        }
        Ok(removed)
    }
}

#[async_trait]
impl OrderItemRepository for InMemoryStore {
    async fn create_order_item(&self, item: OrderItem) -> Result<OrderItem> {
        let mut tables = self.tables.write().await;
        tables.ensure_order(item.order_id, constraint::ORDER_ITEM_ORDER)?;
        if !tables.products.contains_key(&item.product_id) {
            return Err(StoreError::foreign_key(constraint::ORDER_ITEM_PRODUCT));
        }
        let key = (item.order_id, item.product_id);
        if tables.order_items.contains_key(&key) {
            return Err(StoreError::unique(constraint::ORDER_ITEM_KEY));
        }
        tables.order_items.insert(key, item.clone());
        Ok(item)
    }

    async fn get_order_item(&self, order_id: i64, product_id: i64) -> Result<Option<OrderItem>> {
        Ok(self
            .tables
            .read()
            .await
            .order_items
            .get(&(order_id, product_id))
            .cloned())
    }

    async fn list_order_items(&self, order_id: i64) -> Result<Vec<OrderItem>> {
        Ok(self
            .tables
            .read()
            .await
            .order_items
            .range((order_id, i64::MIN)..=(order_id, i64::MAX))
            .map(|(_, item)| item.clone())
            .collect())
    }

    async fn update_order_item(
        &self,
        order_id: i64,
        product_id: i64,
        changes: OrderItemChanges,
    ) -> Result<Option<OrderItem>> {
        let mut tables = self.tables.write().await;
        Ok(tables
            .order_items
            .get_mut(&(order_id, product_id))
            .map(|item| {
                changes.apply_to(item);
                item.clone()
            }))
    }

    async fn delete_order_item(
        &self,
        order_id: i64,
        product_id: i64,
    ) -> Result<Option<OrderItem>> {
        Ok(self
            .tables
            .write()
            .await
            .order_items
            .remove(&(order_id, product_id)))
    }

    async fn delete_order_items(&self, order_id: i64) -> Result<Vec<OrderItem>> {
        let mut tables = self.tables.write().await;
        let keys: Vec<(i64, i64)> = tables
            .order_items
            .range((order_id, i64::MIN)..=(order_id, i64::MAX))
            .map(|(key, _)| *key)
            .collect();
        Ok(keys
            .into_iter()
            .filter_map(|key| tables.order_items.remove(&key))
            .collect())
    }
}

#[async_trait]
impl CourierRepository for InMemoryStore {
    async fn create_courier(&self, courier: NewCourier) -> Result<Courier> {
        let mut tables = self.tables.write().await;
        let record = Courier {
            id: next_id(&mut tables.seq.couriers),
            name: courier.name,
            phone: courier.phone,
            vehicle: courier.vehicle,
            license_plate: courier.license_plate,
            available: courier.available,
            created_at: Utc::now(),
        };
        tables.couriers.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get_courier(&self, id: i64) -> Result<Option<Courier>> {
        Ok(self.tables.read().await.couriers.get(&id).cloned())
    }

    async fn list_couriers(&self, page: Page) -> Result<Vec<Courier>> {
        Ok(paginate(self.tables.read().await.couriers.values(), page))
    }

    async fn filter_couriers(&self, filter: &CourierFilter) -> Result<Vec<Courier>> {
        let vehicle = filter.vehicle.as_ref().map(|v| v.to_lowercase());
        let tables = self.tables.read().await;
        Ok(tables
            .couriers
            .values()
            .filter(|c| {
                if let Some(available) = filter.available
                    && c.available != available
                {
                    return false;
                }
                if let Some(ref vehicle) = vehicle
                    && c.vehicle.to_lowercase() != *vehicle
                {
                    return false;
                }
                true
            })
            .cloned()
            .collect())
    }

    async fn update_courier(&self, id: i64, courier: NewCourier) -> Result<Option<Courier>> {
        let changes = CourierChanges {
            name: Some(courier.name),
            phone: Some(courier.phone),
            vehicle: Some(courier.vehicle),
            license_plate: Some(courier.license_plate),
            available: Some(courier.available),
        };
        self.update_courier_partial(id, changes).await
    }

    async fn update_courier_partial(
        &self,
        id: i64,
        changes: CourierChanges,
    ) -> Result<Option<Courier>> {
        let mut tables = self.tables.write().await;
        Ok(tables.couriers.get_mut(&id).map(|c| {
            changes.apply_to(c);
            c.clone()
        }))
    }

    async fn delete_courier(&self, id: i64) -> Result<Option<Courier>> {
        let mut tables = self.tables.write().await;
        if tables.assignments.values().any(|a| a.courier_id == id) {
            return Err(StoreError::foreign_key(constraint::ASSIGNMENT_COURIER));
        }
        Ok(tables.couriers.remove(&id))
    }
}

#[async_trait]
impl AssignmentRepository for InMemoryStore {
    async fn create_assignment(&self, assignment: NewAssignment) -> Result<Assignment> {
        let mut tables = self.tables.write().await;
        tables.ensure_order(assignment.order_id, constraint::ASSIGNMENT_ORDER_FK)?;
        tables.ensure_courier(assignment.courier_id)?;
        if tables
            .assignments
            .values()
            .any(|a| a.order_id == assignment.order_id)
        {
            return Err(StoreError::unique(constraint::ASSIGNMENT_ORDER));
        }

        let record = Assignment {
            id: next_id(&mut tables.seq.assignments),
            order_id: assignment.order_id,
            courier_id: assignment.courier_id,
            assigned_at: Utc::now(),
        };
        tables.assignments.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get_assignment(&self, id: i64) -> Result<Option<Assignment>> {
        Ok(self.tables.read().await.assignments.get(&id).cloned())
    }

    async fn list_assignments(&self, page: Page) -> Result<Vec<Assignment>> {
        Ok(paginate(self.tables.read().await.assignments.values(), page))
    }

    async fn get_assignment_by_order(&self, order_id: i64) -> Result<Option<Assignment>> {
        Ok(self
            .tables
            .read()
            .await
            .assignments
            .values()
            .find(|a| a.order_id == order_id)
            .cloned())
    }

    async fn list_assignments_by_courier(&self, courier_id: i64) -> Result<Vec<Assignment>> {
        Ok(self
            .tables
            .read()
            .await
            .assignments
            .values()
            .filter(|a| a.courier_id == courier_id)
            .cloned()
            .collect())
    }

    async fn update_assignment_courier(
        &self,
        id: i64,
        courier_id: i64,
    ) -> Result<Option<Assignment>> {
        let mut tables = self.tables.write().await;
        if !tables.assignments.contains_key(&id) {
            return Ok(None);
        }
        tables.ensure_courier(courier_id)?;
        Ok(tables.assignments.get_mut(&id).map(|a| {
            a.courier_id = courier_id;
            a.assigned_at = Utc::now();
            a.clone()
        }))
    }

    async fn delete_assignment(&self, id: i64) -> Result<Option<Assignment>> {
        Ok(self.tables.write().await.assignments.remove(&id))
    }
}

#[async_trait]
impl PreferenceRepository for InMemoryStore {
    async fn create_preference(
        &self,
        customer_id: i64,
        key: &str,
        value: &str,
    ) -> Result<Preference> {
        let mut tables = self.tables.write().await;
        tables.ensure_customer(customer_id, constraint::PREFERENCE_CUSTOMER)?;
        let map_key = (customer_id, key.to_string());
        if tables.preferences.contains_key(&map_key) {
            return Err(StoreError::unique(constraint::PREFERENCE_KEY));
        }

        let record = Preference {
            customer_id,
            preference_key: key.to_string(),
            preference_value: value.to_string(),
            updated_at: Utc::now(),
        };
        tables.preferences.insert(map_key, record.clone());
        Ok(record)
    }

    async fn get_preference(&self, customer_id: i64, key: &str) -> Result<Option<Preference>> {
        Ok(self
            .tables
            .read()
            .await
            .preferences
            .get(&(customer_id, key.to_string()))
            .cloned())
    }

    async fn list_preferences(&self, customer_id: i64) -> Result<Vec<Preference>> {
        Ok(self
            .tables
            .read()
            .await
            .preferences
            .values()
            .filter(|p| p.customer_id == customer_id)
            .cloned()
            .collect())
    }

    async fn update_preference(
        &self,
        customer_id: i64,
        key: &str,
        value: &str,
    ) -> Result<Option<Preference>> {
        let mut tables = self.tables.write().await;
        Ok(tables
            .preferences
            .get_mut(&(customer_id, key.to_string()))
            .map(|p| {
                p.preference_value = value.to_string();
                p.updated_at = Utc::now();
                p.clone()
            }))
    }

    async fn delete_preference(&self, customer_id: i64, key: &str) -> Result<Option<Preference>> {
        Ok(self
            .tables
            .write()
            .await
            .preferences
            .remove(&(customer_id, key.to_string())))
    }

    async fn delete_preferences(&self, customer_id: i64) -> Result<Vec<Preference>> {
        let mut tables = self.tables.write().await;
        let keys: Vec<(i64, String)> = tables
            .preferences
            .keys()
            .filter(|(id, _)| *id == customer_id)
            .cloned()
            .collect();
        Ok(keys
            .into_iter()
            .filter_map(|key| tables.preferences.remove(&key))
            .collect())
    }
}
