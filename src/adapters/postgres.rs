//! Postgres implementations of the repository ports.
//!
//! Row structs are internal to the adapter; the rest of the crate only sees
//! domain types. Status columns are stored as text and parsed on the way out,
//! so a row with an unknown status surfaces as a database error instead of
//! silently mapping to a default.

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Category, FulfillmentStatus, PaymentStatus, Product, Transaction};
use crate::ports::{
    CatalogRepository, FulfillmentRecord, RepositoryError, RepositoryResult,
    TransactionRepository,
};

#[derive(Clone)]
pub struct PostgresTransactionRepository {
    pool: PgPool,
}

impl PostgresTransactionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionRepository for PostgresTransactionRepository {
    async fn insert(&self, tx: &Transaction) -> RepositoryResult<()> {
        sqlx::query(
            r#"
            INSERT INTO transactions (
                id, ref_id, sku_code, customer_no, server_id, phone_number,
                payment_method, amount_sell, amount_cost, fee, status,
                payment_status, sn, message, provider_ref_id, snap_token,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            "#,
        )
        .bind(tx.id)
        .bind(&tx.ref_id)
        .bind(&tx.sku_code)
        .bind(&tx.customer_no)
        .bind(&tx.server_id)
        .bind(&tx.phone_number)
        .bind(&tx.payment_method)
        .bind(tx.amount_sell)
        .bind(tx.amount_cost)
        .bind(tx.fee)
        .bind(tx.status.as_str())
        .bind(tx.payment_status.as_str())
        .bind(&tx.sn)
        .bind(&tx.message)
        .bind(&tx.provider_ref_id)
        .bind(&tx.snap_token)
        .bind(tx.created_at)
        .bind(tx.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|err| match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepositoryError::Conflict(format!("ref_id {} already exists", tx.ref_id))
            }
            _ => RepositoryError::from(err),
        })?;

        Ok(())
    }

    async fn find_by_ref_id(&self, ref_id: &str) -> RepositoryResult<Option<Transaction>> {
        let row = sqlx::query_as::<_, TransactionRow>(
            "SELECT * FROM transactions WHERE ref_id = $1",
        )
        .bind(ref_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        row.map(TransactionRow::into_domain).transpose()
    }

    async fn update_payment(
        &self,
        ref_id: &str,
        payment_status: PaymentStatus,
        payment_method: Option<&str>,
    ) -> RepositoryResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE transactions
            SET payment_status = $2,
                payment_method = COALESCE($3, payment_method),
                updated_at = NOW()
            WHERE ref_id = $1
            "#,
        )
        .bind(ref_id)
        .bind(payment_status.as_str())
        .bind(payment_method)
        .execute(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(ref_id.to_string()));
        }

        Ok(())
    }

    async fn claim_for_fulfillment(&self, ref_id: &str) -> RepositoryResult<bool> {
        // Compare-and-swap on the status column. Concurrent deliveries of the
        // same notification race on this statement; exactly one sees a row
        // affected.
        let result = sqlx::query(
            r#"
            UPDATE transactions
            SET status = 'processing', updated_at = NOW()
            WHERE ref_id = $1 AND status = 'pending'
            "#,
        )
        .bind(ref_id)
        .execute(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        Ok(result.rows_affected() == 1)
    }

    async fn record_fulfillment(
        &self,
        ref_id: &str,
        record: &FulfillmentRecord,
    ) -> RepositoryResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE transactions
            SET status = $2,
                sn = COALESCE($3, sn),
                message = $4,
                amount_cost = COALESCE($5, amount_cost),
                provider_ref_id = COALESCE($6, provider_ref_id),
                updated_at = NOW()
            WHERE ref_id = $1
            "#,
        )
        .bind(ref_id)
        .bind(record.status.as_str())
        .bind(&record.sn)
        .bind(&record.message)
        .bind(record.amount_cost)
        .bind(&record.provider_ref_id)
        .execute(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(ref_id.to_string()));
        }

        Ok(())
    }
}

#[derive(Clone)]
pub struct PostgresCatalogRepository {
    pool: PgPool,
}

impl PostgresCatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogRepository for PostgresCatalogRepository {
    async fn find_product(&self, sku_code: &str) -> RepositoryResult<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(
            "SELECT * FROM products WHERE sku_code = $1",
        )
        .bind(sku_code)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        Ok(row.map(ProductRow::into_domain))
    }

    async fn find_product_with_category(
        &self,
        sku_code: &str,
    ) -> RepositoryResult<Option<(Product, Category)>> {
        let row = sqlx::query_as::<_, ProductWithCategoryRow>(
            r#"
            SELECT p.id, p.category_id, p.sku_code, p.product_name,
                   p.price_cost, p.price_sell, p.status,
                   c.id AS c_id, c.name AS c_name, c.slug AS c_slug,
                   c.markup_type AS c_markup_type,
                   c.markup_percent AS c_markup_percent,
                   c.markup_flat AS c_markup_flat,
                   c.is_active AS c_is_active,
                   c.created_at AS c_created_at
            FROM products p
            JOIN categories c ON c.id = p.category_id
            WHERE p.sku_code = $1
            "#,
        )
        .bind(sku_code)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        Ok(row.map(ProductWithCategoryRow::into_domain))
    }

    async fn list_categories(&self) -> RepositoryResult<Vec<Category>> {
        let rows = sqlx::query_as::<_, CategoryRow>("SELECT * FROM categories ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(RepositoryError::from)?;

        Ok(rows.into_iter().map(CategoryRow::into_domain).collect())
    }

    async fn upsert_product(
        &self,
        category_id: Uuid,
        sku_code: &str,
        product_name: &str,
        price_cost: i64,
        price_sell: i64,
        active: bool,
    ) -> RepositoryResult<()> {
        sqlx::query(
            r#"
            INSERT INTO products (id, category_id, sku_code, product_name, price_cost, price_sell, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (sku_code) DO UPDATE
            SET category_id = EXCLUDED.category_id,
                product_name = EXCLUDED.product_name,
                price_cost = EXCLUDED.price_cost,
                price_sell = EXCLUDED.price_sell,
                status = EXCLUDED.status,
                updated_at = NOW()
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(category_id)
        .bind(sku_code)
        .bind(product_name)
        .bind(price_cost)
        .bind(price_sell)
        .bind(if active { "active" } else { "inactive" })
        .execute(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        Ok(())
    }
}

// --- Row types -------------------------------------------------------------

#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    id: Uuid,
    ref_id: String,
    sku_code: String,
    customer_no: String,
    server_id: Option<String>,
    phone_number: Option<String>,
    payment_method: String,
    amount_sell: i64,
    amount_cost: Option<i64>,
    fee: i64,
    status: String,
    payment_status: String,
    sn: Option<String>,
    message: Option<String>,
    provider_ref_id: Option<String>,
    snap_token: String,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl TransactionRow {
    fn into_domain(self) -> RepositoryResult<Transaction> {
        let status = FulfillmentStatus::parse(&self.status).ok_or_else(|| {
            RepositoryError::Database(format!("invalid status '{}'", self.status))
        })?;
        let payment_status = PaymentStatus::parse(&self.payment_status).ok_or_else(|| {
            RepositoryError::Database(format!("invalid payment_status '{}'", self.payment_status))
        })?;

        Ok(Transaction {
            id: self.id,
            ref_id: self.ref_id,
            sku_code: self.sku_code,
            customer_no: self.customer_no,
            server_id: self.server_id,
            phone_number: self.phone_number,
            payment_method: self.payment_method,
            amount_sell: self.amount_sell,
            amount_cost: self.amount_cost,
            fee: self.fee,
            status,
            payment_status,
            sn: self.sn,
            message: self.message,
            provider_ref_id: self.provider_ref_id,
            snap_token: self.snap_token,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    category_id: Uuid,
    sku_code: String,
    product_name: String,
    price_cost: i64,
    price_sell: i64,
    status: String,
}

impl ProductRow {
    fn into_domain(self) -> Product {
        Product {
            id: self.id,
            category_id: self.category_id,
            sku_code: self.sku_code,
            product_name: self.product_name,
            price_cost: self.price_cost,
            price_sell: self.price_sell,
            active: self.status == "active",
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: Uuid,
    name: String,
    slug: String,
    markup_type: String,
    markup_percent: BigDecimal,
    markup_flat: BigDecimal,
    is_active: bool,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl CategoryRow {
    fn into_domain(self) -> Category {
        Category {
            id: self.id,
            name: self.name,
            slug: self.slug,
            markup_type: self.markup_type,
            markup_percent: self.markup_percent,
            markup_flat: self.markup_flat,
            is_active: self.is_active,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProductWithCategoryRow {
    id: Uuid,
    category_id: Uuid,
    sku_code: String,
    product_name: String,
    price_cost: i64,
    price_sell: i64,
    status: String,
    c_id: Uuid,
    c_name: String,
    c_slug: String,
    c_markup_type: String,
    c_markup_percent: BigDecimal,
    c_markup_flat: BigDecimal,
    c_is_active: bool,
    c_created_at: chrono::DateTime<chrono::Utc>,
}

impl ProductWithCategoryRow {
    fn into_domain(self) -> (Product, Category) {
        (
            Product {
                id: self.id,
                category_id: self.category_id,
                sku_code: self.sku_code,
                product_name: self.product_name,
                price_cost: self.price_cost,
                price_sell: self.price_sell,
                active: self.status == "active",
            },
            Category {
                id: self.c_id,
                name: self.c_name,
                slug: self.c_slug,
                markup_type: self.c_markup_type,
                markup_percent: self.c_markup_percent,
                markup_flat: self.c_markup_flat,
                is_active: self.c_is_active,
                created_at: self.c_created_at,
            },
        )
    }
}
