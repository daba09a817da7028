use async_trait::async_trait;
use common::Money;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};

use crate::repository::{
    AddressRepository, AssignmentRepository, CourierRepository, CustomerRepository,
    OrderItemRepository, OrderRepository, PreferenceRepository, ProductRepository,
};
use crate::{
    Address, AddressChanges, Assignment, Courier, CourierChanges, CourierFilter, Customer,
    CustomerChanges, NewAddress, NewAssignment, NewCourier, NewCustomer, NewOrder, NewProduct,
    Order, OrderChanges, OrderItem, OrderItemChanges, OrderStatus, OrderUpdate, Page, Preference,
    Product, ProductChanges, ProductFilter, Result, StoreError, model::ParseEnumError,
};

const CUSTOMER_COLUMNS: &str = "id, name, phone, email, created_at";
const ADDRESS_COLUMNS: &str =
    "id, customer_id, label, address_text, reference, latitude, longitude, is_primary, created_at";
const PRODUCT_COLUMNS: &str =
    "id, name, description, (price * 100)::BIGINT AS price_cents, is_active, created_at";
const ORDER_COLUMNS: &str = "id, customer_id, address_id, (total * 100)::BIGINT AS total_cents, \
     payment_method, status, created_at";
const ORDER_ITEM_COLUMNS: &str =
    "order_id, product_id, quantity, (price * 100)::BIGINT AS price_cents";
const COURIER_COLUMNS: &str = "id, name, phone, vehicle, license_plate, available, created_at";
const ASSIGNMENT_COLUMNS: &str = "id, order_id, courier_id, assigned_at";
const PREFERENCE_COLUMNS: &str = "customer_id, preference_key, preference_value, updated_at";

/// PostgreSQL-backed store implementation.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new PostgreSQL store over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a pool against `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    fn parse_column<T>(row: &PgRow, column: &str) -> Result<T>
    where
        T: std::str::FromStr<Err = ParseEnumError>,
    {
        let raw: String = row.try_get(column)?;
        raw.parse()
            .map_err(|e: ParseEnumError| StoreError::Database(sqlx::Error::Decode(Box::new(e))))
    }

    fn row_to_customer(row: &PgRow) -> Result<Customer> {
        Ok(Customer {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            phone: row.try_get("phone")?,
            email: row.try_get("email")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn row_to_address(row: &PgRow) -> Result<Address> {
        Ok(Address {
            id: row.try_get("id")?,
            customer_id: row.try_get("customer_id")?,
            label: row.try_get("label")?,
            address_text: row.try_get("address_text")?,
            reference: row.try_get("reference")?,
            latitude: row.try_get("latitude")?,
            longitude: row.try_get("longitude")?,
            is_primary: row.try_get("is_primary")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn row_to_product(row: &PgRow) -> Result<Product> {
        Ok(Product {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            price: Money::from_cents(row.try_get("price_cents")?),
            is_active: row.try_get("is_active")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn row_to_order(row: &PgRow) -> Result<Order> {
        Ok(Order {
            id: row.try_get("id")?,
            customer_id: row.try_get("customer_id")?,
            address_id: row.try_get("address_id")?,
            total: Money::from_cents(row.try_get("total_cents")?),
            payment_method: Self::parse_column(row, "payment_method")?,
            status: Self::parse_column(row, "status")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn row_to_order_item(row: &PgRow) -> Result<OrderItem> {
        Ok(OrderItem {
            order_id: row.try_get("order_id")?,
            product_id: row.try_get("product_id")?,
            quantity: row.try_get("quantity")?,
            price: Money::from_cents(row.try_get("price_cents")?),
        })
    }

    fn row_to_courier(row: &PgRow) -> Result<Courier> {
        Ok(Courier {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            phone: row.try_get("phone")?,
            vehicle: row.try_get("vehicle")?,
            license_plate: row.try_get("license_plate")?,
            available: row.try_get("available")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn row_to_assignment(row: &PgRow) -> Result<Assignment> {
        Ok(Assignment {
            id: row.try_get("id")?,
            order_id: row.try_get("order_id")?,
            courier_id: row.try_get("courier_id")?,
            assigned_at: row.try_get("assigned_at")?,
        })
    }

    fn row_to_preference(row: &PgRow) -> Result<Preference> {
        Ok(Preference {
            customer_id: row.try_get("customer_id")?,
            preference_key: row.try_get("preference_key")?,
            preference_value: row.try_get("preference_value")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn collect<T>(rows: Vec<PgRow>, map: fn(&PgRow) -> Result<T>) -> Result<Vec<T>> {
        rows.iter().map(map).collect()
    }

    fn page_bounds(page: Page) -> (i64, i64) {
        (
            i64::try_from(page.limit).unwrap_or(i64::MAX),
            i64::try_from(page.offset).unwrap_or(i64::MAX),
        )
    }
}

#[async_trait]
impl CustomerRepository for PostgresStore {
    async fn create_customer(&self, customer: NewCustomer) -> Result<Customer> {
        let sql = format!(
            "INSERT INTO customers (name, phone, email) VALUES ($1, $2, $3) \
             RETURNING {CUSTOMER_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(&customer.name)
            .bind(&customer.phone)
            .bind(&customer.email)
            .fetch_one(&self.pool)
            .await?;
        Self::row_to_customer(&row)
    }

    async fn get_customer(&self, id: i64) -> Result<Option<Customer>> {
        let sql = format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::row_to_customer).transpose()
    }

    async fn list_customers(&self, page: Page) -> Result<Vec<Customer>> {
        let (limit, offset) = Self::page_bounds(page);
        let sql =
            format!("SELECT {CUSTOMER_COLUMNS} FROM customers ORDER BY id LIMIT $1 OFFSET $2");
        let rows = sqlx::query(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Self::collect(rows, Self::row_to_customer)
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
        let sql = format!(
            r#"
            UPDATE customers SET
                name = COALESCE($2::VARCHAR, name),
                phone = COALESCE($3::VARCHAR, phone),
                email = CASE WHEN $4 THEN $5::VARCHAR ELSE email END
            WHERE id = $1
            RETURNING {CUSTOMER_COLUMNS}
            "#
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(changes.name)
            .bind(changes.phone)
            .bind(changes.email.is_some())
            .bind(changes.email.flatten())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::row_to_customer).transpose()
    }

    async fn delete_customer(&self, id: i64) -> Result<Option<Customer>> {
        let sql = format!("DELETE FROM customers WHERE id = $1 RETURNING {CUSTOMER_COLUMNS}");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::row_to_customer).transpose()
    }
}

#[async_trait]
impl AddressRepository for PostgresStore {
    async fn create_address(&self, address: NewAddress) -> Result<Address> {
        let mut tx = self.pool.begin().await?;

        if address.is_primary {
            sqlx::query(
                "UPDATE addresses SET is_primary = FALSE WHERE customer_id = $1 AND is_primary",
            )
            .bind(address.customer_id)
            .execute(&mut *tx)
            .await?;
        }

        let sql = format!(
            r#"
            INSERT INTO addresses
                (customer_id, label, address_text, reference, latitude, longitude, is_primary)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {ADDRESS_COLUMNS}
            "#
        );
        let row = sqlx::query(&sql)
            .bind(address.customer_id)
            .bind(&address.label)
            .bind(&address.address_text)
            .bind(&address.reference)
            .bind(address.latitude)
            .bind(address.longitude)
            .bind(address.is_primary)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Self::row_to_address(&row)
    }

    async fn get_address(&self, id: i64) -> Result<Option<Address>> {
        let sql = format!("SELECT {ADDRESS_COLUMNS} FROM addresses WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::row_to_address).transpose()
    }

    async fn list_addresses(&self, page: Page) -> Result<Vec<Address>> {
        let (limit, offset) = Self::page_bounds(page);
        let sql =
            format!("SELECT {ADDRESS_COLUMNS} FROM addresses ORDER BY id LIMIT $1 OFFSET $2");
        let rows = sqlx::query(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Self::collect(rows, Self::row_to_address)
    }

    async fn list_addresses_by_customer(&self, customer_id: i64) -> Result<Vec<Address>> {
        let sql =
            format!("SELECT {ADDRESS_COLUMNS} FROM addresses WHERE customer_id = $1 ORDER BY id");
        let rows = sqlx::query(&sql)
            .bind(customer_id)
            .fetch_all(&self.pool)
            .await?;
        Self::collect(rows, Self::row_to_address)
    }

    async fn get_primary_address(&self, customer_id: i64) -> Result<Option<Address>> {
        let sql = format!(
            "SELECT {ADDRESS_COLUMNS} FROM addresses WHERE customer_id = $1 AND is_primary"
        );
        let row = sqlx::query(&sql)
            .bind(customer_id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::row_to_address).transpose()
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
        let mut tx = self.pool.begin().await?;

        let current =
            sqlx::query("SELECT customer_id, is_primary FROM addresses WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(current) = current else {
            return Ok(None);
        };

        let customer_id = match changes.customer_id {
            Some(customer_id) => customer_id,
            None => current.try_get("customer_id")?,
        };
        let is_primary = match changes.is_primary {
            Some(is_primary) => is_primary,
            None => current.try_get("is_primary")?,
        };

        if is_primary {
            sqlx::query(
                "UPDATE addresses SET is_primary = FALSE \
                 WHERE customer_id = $1 AND id <> $2 AND is_primary",
            )
            .bind(customer_id)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        }

        let sql = format!(
            r#"
            UPDATE addresses SET
                customer_id = COALESCE($2::BIGINT, customer_id),
                label = COALESCE($3::VARCHAR, label),
                address_text = COALESCE($4::VARCHAR, address_text),
                reference = CASE WHEN $5 THEN $6::VARCHAR ELSE reference END,
                latitude = CASE WHEN $7 THEN $8::FLOAT8 ELSE latitude END,
                longitude = CASE WHEN $9 THEN $10::FLOAT8 ELSE longitude END,
                is_primary = COALESCE($11::BOOLEAN, is_primary)
            WHERE id = $1
            RETURNING {ADDRESS_COLUMNS}
            "#
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(changes.customer_id)
            .bind(changes.label)
            .bind(changes.address_text)
            .bind(changes.reference.is_some())
            .bind(changes.reference.flatten())
            .bind(changes.latitude.is_some())
            .bind(changes.latitude.flatten())
            .bind(changes.longitude.is_some())
            .bind(changes.longitude.flatten())
            .bind(changes.is_primary)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Self::row_to_address(&row).map(Some)
    }

    async fn delete_address(&self, id: i64) -> Result<Option<Address>> {
        let sql = format!("DELETE FROM addresses WHERE id = $1 RETURNING {ADDRESS_COLUMNS}");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::row_to_address).transpose()
    }
}

#[async_trait]
impl ProductRepository for PostgresStore {
    async fn create_product(&self, product: NewProduct) -> Result<Product> {
        let sql = format!(
            r#"
            INSERT INTO products (name, description, price, is_active)
            VALUES ($1, $2, $3::BIGINT::NUMERIC / 100, $4)
            RETURNING {PRODUCT_COLUMNS}
            "#
        );
        let row = sqlx::query(&sql)
            .bind(&product.name)
            .bind(&product.description)
            .bind(product.price.cents())
            .bind(product.is_active)
            .fetch_one(&self.pool)
            .await?;
        Self::row_to_product(&row)
    }

    async fn get_product(&self, id: i64) -> Result<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::row_to_product).transpose()
    }

    async fn list_products(&self, page: Page) -> Result<Vec<Product>> {
        let (limit, offset) = Self::page_bounds(page);
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id LIMIT $1 OFFSET $2");
        let rows = sqlx::query(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Self::collect(rows, Self::row_to_product)
    }

    async fn find_product_by_name(&self, name: &str) -> Result<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE LOWER(name) = LOWER($1)");
        let row = sqlx::query(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::row_to_product).transpose()
    }

    async fn filter_products(&self, filter: &ProductFilter) -> Result<Vec<Product>> {
        let mut sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE 1=1");
        let mut param_count = 0;

        if filter.name.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND name ILIKE '%' || ${param_count} || '%'"));
        }
        if filter.min_price.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND price >= ${param_count}::BIGINT::NUMERIC / 100"));
        }
        if filter.max_price.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND price <= ${param_count}::BIGINT::NUMERIC / 100"));
        }
        if filter.is_active.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND is_active = ${param_count}"));
        }
        sql.push_str(" ORDER BY id");

        let mut query = sqlx::query(&sql);
        if let Some(ref name) = filter.name {
            query = query.bind(name);
        }
        if let Some(min) = filter.min_price {
            query = query.bind(min.cents());
        }
        if let Some(max) = filter.max_price {
            query = query.bind(max.cents());
        }
        if let Some(is_active) = filter.is_active {
            query = query.bind(is_active);
        }

        let rows = query.fetch_all(&self.pool).await?;
        Self::collect(rows, Self::row_to_product)
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
        let sql = format!(
            r#"
            UPDATE products SET
                name = COALESCE($2::VARCHAR, name),
                description = CASE WHEN $3 THEN $4::TEXT ELSE description END,
                price = COALESCE($5::BIGINT::NUMERIC / 100, price),
                is_active = COALESCE($6::BOOLEAN, is_active)
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "#
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(changes.name)
            .bind(changes.description.is_some())
            .bind(changes.description.flatten())
            .bind(changes.price.map(|p| p.cents()))
            .bind(changes.is_active)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::row_to_product).transpose()
    }

    async fn deactivate_product(&self, id: i64) -> Result<Option<Product>> {
        let sql = format!(
            "UPDATE products SET is_active = FALSE WHERE id = $1 RETURNING {PRODUCT_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::row_to_product).transpose()
    }

    async fn delete_product(&self, id: i64) -> Result<Option<Product>> {
        let sql = format!("DELETE FROM products WHERE id = $1 RETURNING {PRODUCT_COLUMNS}");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::row_to_product).transpose()
    }
}

#[async_trait]
impl OrderRepository for PostgresStore {
    async fn create_order(&self, order: NewOrder) -> Result<Order> {
        let sql = format!(
            r#"
            INSERT INTO orders (customer_id, address_id, total, payment_method, status)
            VALUES ($1, $2, 0, $3, $4)
            RETURNING {ORDER_COLUMNS}
            "#
        );
        let row = sqlx::query(&sql)
            .bind(order.customer_id)
            .bind(order.address_id)
            .bind(order.payment_method.as_str())
            .bind(order.status.as_str())
            .fetch_one(&self.pool)
            .await?;
        Self::row_to_order(&row)
    }

    async fn get_order(&self, id: i64) -> Result<Option<Order>> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::row_to_order).transpose()
    }

    async fn list_orders(&self, page: Page) -> Result<Vec<Order>> {
        let (limit, offset) = Self::page_bounds(page);
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders ORDER BY id LIMIT $1 OFFSET $2");
        let rows = sqlx::query(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Self::collect(rows, Self::row_to_order)
    }

    async fn list_orders_by_customer(&self, customer_id: i64) -> Result<Vec<Order>> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE customer_id = $1 ORDER BY id");
        let rows = sqlx::query(&sql)
            .bind(customer_id)
            .fetch_all(&self.pool)
            .await?;
        Self::collect(rows, Self::row_to_order)
    }

    async fn update_order(&self, id: i64, order: OrderUpdate) -> Result<Option<Order>> {
        let sql = format!(
            r#"
            UPDATE orders SET
                customer_id = $2,
                address_id = $3,
                total = $4::BIGINT::NUMERIC / 100,
                payment_method = $5,
                status = $6
            WHERE id = $1
            RETURNING {ORDER_COLUMNS}
            "#
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(order.customer_id)
            .bind(order.address_id)
            .bind(order.total.cents())
            .bind(order.payment_method.as_str())
            .bind(order.status.as_str())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::row_to_order).transpose()
    }

    async fn update_order_partial(&self, id: i64, changes: OrderChanges) -> Result<Option<Order>> {
        let sql = format!(
            r#"
            UPDATE orders SET
                customer_id = COALESCE($2::BIGINT, customer_id),
                address_id = COALESCE($3::BIGINT, address_id),
                payment_method = COALESCE($4::VARCHAR, payment_method),
                status = COALESCE($5::VARCHAR, status)
            WHERE id = $1
            RETURNING {ORDER_COLUMNS}
            "#
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(changes.customer_id)
            .bind(changes.address_id)
            .bind(changes.payment_method.map(|m| m.as_str()))
            .bind(changes.status.map(|s| s.as_str()))
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::row_to_order).transpose()
    }

    async fn update_order_status(&self, id: i64, status: OrderStatus) -> Result<Option<Order>> {
        let sql = format!("UPDATE orders SET status = $2 WHERE id = $1 RETURNING {ORDER_COLUMNS}");
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::row_to_order).transpose()
    }

    async fn update_order_total(&self, id: i64, total: Money) -> Result<Option<Order>> {
        let sql = format!(
            "UPDATE orders SET total = $2::BIGINT::NUMERIC / 100 WHERE id = $1 \
             RETURNING {ORDER_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(total.cents())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::row_to_order).transpose()
    }

    async fn delete_order(&self, id: i64) -> Result<Option<Order>> {
        let sql = format!("DELETE FROM orders WHERE id = $1 RETURNING {ORDER_COLUMNS}");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::row_to_order).transpose()
    }
}

#[async_trait]
impl OrderItemRepository for PostgresStore {
    async fn create_order_item(&self, item: OrderItem) -> Result<OrderItem> {
        let sql = format!(
            r#"
            INSERT INTO order_items (order_id, product_id, quantity, price)
            VALUES ($1, $2, $3, $4::BIGINT::NUMERIC / 100)
            RETURNING {ORDER_ITEM_COLUMNS}
            "#
        );
        let row = sqlx::query(&sql)
            .bind(item.order_id)
            .bind(item.product_id)
            .bind(item.quantity)
            .bind(item.price.cents())
            .fetch_one(&self.pool)
            .await?;
        Self::row_to_order_item(&row)
    }

    async fn get_order_item(&self, order_id: i64, product_id: i64) -> Result<Option<OrderItem>> {
        let sql = format!(
            "SELECT {ORDER_ITEM_COLUMNS} FROM order_items WHERE order_id = $1 AND product_id = $2"
        );
        let row = sqlx::query(&sql)
            .bind(order_id)
            .bind(product_id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::row_to_order_item).transpose()
    }

    async fn list_order_items(&self, order_id: i64) -> Result<Vec<OrderItem>> {
        let sql = format!(
            "SELECT {ORDER_ITEM_COLUMNS} FROM order_items WHERE order_id = $1 ORDER BY product_id"
        );
        let rows = sqlx::query(&sql)
            .bind(order_id)
            .fetch_all(&self.pool)
            .await?;
        Self::collect(rows, Self::row_to_order_item)
    }

    async fn order_item_exists(&self, order_id: i64, product_id: i64) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM order_items WHERE order_id = $1 AND product_id = $2)",
        )
        .bind(order_id)
        .bind(product_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn update_order_item(
        &self,
        order_id: i64,
        product_id: i64,
        changes: OrderItemChanges,
    ) -> Result<Option<OrderItem>> {
        let sql = format!(
            r#"
            UPDATE order_items SET
                quantity = COALESCE($3::INTEGER, quantity),
                price = COALESCE($4::BIGINT::NUMERIC / 100, price)
            WHERE order_id = $1 AND product_id = $2
            RETURNING {ORDER_ITEM_COLUMNS}
            "#
        );
        let row = sqlx::query(&sql)
            .bind(order_id)
            .bind(product_id)
            .bind(changes.quantity)
            .bind(changes.price.map(|p| p.cents()))
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::row_to_order_item).transpose()
    }

    async fn delete_order_item(
        &self,
        order_id: i64,
        product_id: i64,
    ) -> Result<Option<OrderItem>> {
        let sql = format!(
            "DELETE FROM order_items WHERE order_id = $1 AND product_id = $2 \
             RETURNING {ORDER_ITEM_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(order_id)
            .bind(product_id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::row_to_order_item).transpose()
    }

    async fn delete_order_items(&self, order_id: i64) -> Result<Vec<OrderItem>> {
        let sql =
            format!("DELETE FROM order_items WHERE order_id = $1 RETURNING {ORDER_ITEM_COLUMNS}");
        let rows = sqlx::query(&sql)
            .bind(order_id)
            .fetch_all(&self.pool)
            .await?;
        Self::collect(rows, Self::row_to_order_item)
    }
}

#[async_trait]
impl CourierRepository for PostgresStore {
    async fn create_courier(&self, courier: NewCourier) -> Result<Courier> {
        let sql = format!(
            r#"
            INSERT INTO couriers (name, phone, vehicle, license_plate, available)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {COURIER_COLUMNS}
            "#
        );
        let row = sqlx::query(&sql)
            .bind(&courier.name)
            .bind(&courier.phone)
            .bind(&courier.vehicle)
            .bind(&courier.license_plate)
            .bind(courier.available)
            .fetch_one(&self.pool)
            .await?;
        Self::row_to_courier(&row)
    }

    async fn get_courier(&self, id: i64) -> Result<Option<Courier>> {
        let sql = format!("SELECT {COURIER_COLUMNS} FROM couriers WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::row_to_courier).transpose()
    }

    async fn list_couriers(&self, page: Page) -> Result<Vec<Courier>> {
        let (limit, offset) = Self::page_bounds(page);
        let sql = format!("SELECT {COURIER_COLUMNS} FROM couriers ORDER BY id LIMIT $1 OFFSET $2");
        let rows = sqlx::query(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Self::collect(rows, Self::row_to_courier)
    }

    async fn filter_couriers(&self, filter: &CourierFilter) -> Result<Vec<Courier>> {
        let mut sql = format!("SELECT {COURIER_COLUMNS} FROM couriers WHERE 1=1");
        let mut param_count = 0;

        if filter.available.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND available = ${param_count}"));
        }
        if filter.vehicle.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND LOWER(vehicle) = LOWER(${param_count})"));
        }
        sql.push_str(" ORDER BY id");

        let mut query = sqlx::query(&sql);
        if let Some(available) = filter.available {
            query = query.bind(available);
        }
        if let Some(ref vehicle) = filter.vehicle {
            query = query.bind(vehicle);
        }

        let rows = query.fetch_all(&self.pool).await?;
        Self::collect(rows, Self::row_to_courier)
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
        let sql = format!(
            r#"
            UPDATE couriers SET
                name = COALESCE($2::VARCHAR, name),
                phone = COALESCE($3::VARCHAR, phone),
                vehicle = COALESCE($4::VARCHAR, vehicle),
                license_plate = COALESCE($5::VARCHAR, license_plate),
                available = COALESCE($6::BOOLEAN, available)
            WHERE id = $1
            RETURNING {COURIER_COLUMNS}
            "#
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(changes.name)
            .bind(changes.phone)
            .bind(changes.vehicle)
            .bind(changes.license_plate)
            .bind(changes.available)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::row_to_courier).transpose()
    }

    async fn delete_courier(&self, id: i64) -> Result<Option<Courier>> {
        let sql = format!("DELETE FROM couriers WHERE id = $1 RETURNING {COURIER_COLUMNS}");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::row_to_courier).transpose()
    }
}

#[async_trait]
impl AssignmentRepository for PostgresStore {
    async fn create_assignment(&self, assignment: NewAssignment) -> Result<Assignment> {
        let sql = format!(
            "INSERT INTO assignments (order_id, courier_id) VALUES ($1, $2) \
             RETURNING {ASSIGNMENT_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(assignment.order_id)
            .bind(assignment.courier_id)
            .fetch_one(&self.pool)
            .await?;
        Self::row_to_assignment(&row)
    }

    async fn get_assignment(&self, id: i64) -> Result<Option<Assignment>> {
        let sql = format!("SELECT {ASSIGNMENT_COLUMNS} FROM assignments WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::row_to_assignment).transpose()
    }

    async fn list_assignments(&self, page: Page) -> Result<Vec<Assignment>> {
        let (limit, offset) = Self::page_bounds(page);
        let sql =
            format!("SELECT {ASSIGNMENT_COLUMNS} FROM assignments ORDER BY id LIMIT $1 OFFSET $2");
        let rows = sqlx::query(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Self::collect(rows, Self::row_to_assignment)
    }

    async fn get_assignment_by_order(&self, order_id: i64) -> Result<Option<Assignment>> {
        let sql = format!("SELECT {ASSIGNMENT_COLUMNS} FROM assignments WHERE order_id = $1");
        let row = sqlx::query(&sql)
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::row_to_assignment).transpose()
    }

    async fn list_assignments_by_courier(&self, courier_id: i64) -> Result<Vec<Assignment>> {
        let sql = format!(
            "SELECT {ASSIGNMENT_COLUMNS} FROM assignments WHERE courier_id = $1 ORDER BY id"
        );
        let rows = sqlx::query(&sql)
            .bind(courier_id)
            .fetch_all(&self.pool)
            .await?;
        Self::collect(rows, Self::row_to_assignment)
    }

    async fn update_assignment_courier(
        &self,
        id: i64,
        courier_id: i64,
    ) -> Result<Option<Assignment>> {
        let sql = format!(
            "UPDATE assignments SET courier_id = $2, assigned_at = NOW() WHERE id = $1 \
             RETURNING {ASSIGNMENT_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(courier_id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::row_to_assignment).transpose()
    }

    async fn delete_assignment(&self, id: i64) -> Result<Option<Assignment>> {
        let sql = format!("DELETE FROM assignments WHERE id = $1 RETURNING {ASSIGNMENT_COLUMNS}");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::row_to_assignment).transpose()
    }
}

#[async_trait]
impl PreferenceRepository for PostgresStore {
    async fn create_preference(
        &self,
        customer_id: i64,
        key: &str,
        value: &str,
    ) -> Result<Preference> {
        let sql = format!(
            "INSERT INTO customer_preferences (customer_id, preference_key, preference_value) \
             VALUES ($1, $2, $3) RETURNING {PREFERENCE_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(customer_id)
            .bind(key)
            .bind(value)
            .fetch_one(&self.pool)
            .await?;
        Self::row_to_preference(&row)
    }

    async fn get_preference(&self, customer_id: i64, key: &str) -> Result<Option<Preference>> {
        let sql = format!(
            "SELECT {PREFERENCE_COLUMNS} FROM customer_preferences \
             WHERE customer_id = $1 AND preference_key = $2"
        );
        let row = sqlx::query(&sql)
            .bind(customer_id)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::row_to_preference).transpose()
    }

    async fn list_preferences(&self, customer_id: i64) -> Result<Vec<Preference>> {
        let sql = format!(
            "SELECT {PREFERENCE_COLUMNS} FROM customer_preferences \
             WHERE customer_id = $1 ORDER BY preference_key"
        );
        let rows = sqlx::query(&sql)
            .bind(customer_id)
            .fetch_all(&self.pool)
            .await?;
        Self::collect(rows, Self::row_to_preference)
    }

    async fn update_preference(
        &self,
        customer_id: i64,
        key: &str,
        value: &str,
    ) -> Result<Option<Preference>> {
        let sql = format!(
            "UPDATE customer_preferences SET preference_value = $3, updated_at = NOW() \
             WHERE customer_id = $1 AND preference_key = $2 RETURNING {PREFERENCE_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(customer_id)
            .bind(key)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::row_to_preference).transpose()
    }

    async fn delete_preference(&self, customer_id: i64, key: &str) -> Result<Option<Preference>> {
        let sql = format!(
            "DELETE FROM customer_preferences WHERE customer_id = $1 AND preference_key = $2 \
             RETURNING {PREFERENCE_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(customer_id)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::row_to_preference).transpose()
    }

    async fn delete_preferences(&self, customer_id: i64) -> Result<Vec<Preference>> {
        let sql = format!(
            "DELETE FROM customer_preferences WHERE customer_id = $1 \
             RETURNING {PREFERENCE_COLUMNS}"
        );
        let rows = sqlx::query(&sql)
            .bind(customer_id)
            .fetch_all(&self.pool)
            .await?;
        Self::collect(rows, Self::row_to_preference)
    }
}
