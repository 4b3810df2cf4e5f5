//! # Catalog Service
//!
//! Product, category, and supplier management.
//!
//! All mutations validate through `mercado-core` first, stamp timestamps
//! here (there are no database-side hooks), and leave an audit entry.

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::pool::Database;
use crate::services::error::ServiceResult;
use mercado_core::{
    validation, AuditAction, AuditLogEntry, Category, CoreError, Product, Session, Supplier,
};

/// Input for creating a product.
///
/// Stock starts at zero; initial inventory arrives via a goods receipt
/// or an explicit stock adjustment, never through catalog creation.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub barcode: String,
    pub name: String,
    pub category_id: String,
    pub cost_cents: i64,
    pub price_cents: i64,
    pub min_stock_qty: i64,
    pub unit: String,
}

/// Service for catalog management.
#[derive(Debug, Clone)]
pub struct CatalogService {
    db: Database,
}

impl CatalogService {
    pub fn new(db: Database) -> Self {
        CatalogService { db }
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Creates a product after validating it.
    pub async fn create_product(
        &self,
        session: &Session,
        input: NewProduct,
    ) -> ServiceResult<Product> {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            barcode: input.barcode,
            name: input.name,
            category_id: input.category_id,
            cost_cents: input.cost_cents,
            price_cents: input.price_cents,
            stock_qty: 0,
            min_stock_qty: input.min_stock_qty,
            unit: input.unit,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        validation::validate_product(&product)?;
        self.db.products().insert(&product).await?;

        info!(product_id = %product.id, barcode = %product.barcode, "Product created");
        self.audit(
            session,
            AuditAction::Create,
            "Product",
            Some(&product.id),
            format!("created product '{}'", product.name),
        )
        .await;

        Ok(product)
    }

    /// Updates a product's editable fields.
    ///
    /// Stock is not editable here; see [`adjust_stock`](Self::adjust_stock).
    pub async fn update_product(
        &self,
        session: &Session,
        mut product: Product,
    ) -> ServiceResult<Product> {
        validation::validate_product(&product)?;
        product.updated_at = Utc::now();
        self.db.products().update(&product).await?;

        self.audit(
            session,
            AuditAction::Update,
            "Product",
            Some(&product.id),
            format!("updated product '{}'", product.name),
        )
        .await;

        Ok(product)
    }

    /// Deactivates a product (soft delete).
    pub async fn deactivate_product(&self, session: &Session, id: &str) -> ServiceResult<()> {
        self.db.products().set_active(id, false).await?;

        self.audit(
            session,
            AuditAction::Delete,
            "Product",
            Some(id),
            "deactivated product".to_string(),
        )
        .await;

        Ok(())
    }

    /// Looks up a sellable product by barcode.
    ///
    /// Distinguishes the two failure modes: `ProductNotFound` for an
    /// unknown barcode, `ProductInactive` for a soft-deleted one.
    pub async fn find_by_barcode(&self, barcode: &str) -> ServiceResult<Product> {
        let product = self
            .db
            .products()
            .get_by_barcode(barcode)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(barcode.to_string()))?;
        if !product.is_active {
            return Err(CoreError::ProductInactive(barcode.to_string()).into());
        }
        Ok(product)
    }

    /// Manually adjusts stock by a signed delta (inventory correction).
    pub async fn adjust_stock(
        &self,
        session: &Session,
        id: &str,
        delta: i64,
    ) -> ServiceResult<()> {
        self.db.products().adjust_stock(id, delta).await?;

        self.audit(
            session,
            AuditAction::StockUpdated,
            "Product",
            Some(id),
            format!("stock adjusted by {delta}"),
        )
        .await;

        Ok(())
    }

    // =========================================================================
    // Categories
    // =========================================================================

    pub async fn create_category(
        &self,
        session: &Session,
        name: String,
        description: Option<String>,
    ) -> ServiceResult<Category> {
        validation::validate_name(&name)?;

        let now = Utc::now();
        let category = Category {
            id: Uuid::new_v4().to_string(),
            name,
            description,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.db.categories().insert(&category).await?;

        self.audit(
            session,
            AuditAction::Create,
            "Category",
            Some(&category.id),
            format!("created category '{}'", category.name),
        )
        .await;

        Ok(category)
    }

    pub async fn update_category(
        &self,
        session: &Session,
        mut category: Category,
    ) -> ServiceResult<Category> {
        validation::validate_name(&category.name)?;
        category.updated_at = Utc::now();
        self.db.categories().update(&category).await?;

        self.audit(
            session,
            AuditAction::Update,
            "Category",
            Some(&category.id),
            format!("updated category '{}'", category.name),
        )
        .await;

        Ok(category)
    }

    /// Deactivates a category (soft delete). Products keep their
    /// category reference; they simply stop showing an active category.
    pub async fn deactivate_category(&self, session: &Session, id: &str) -> ServiceResult<()> {
        self.db.categories().set_active(id, false).await?;

        self.audit(
            session,
            AuditAction::Delete,
            "Category",
            Some(id),
            "deactivated category".to_string(),
        )
        .await;

        Ok(())
    }

    // =========================================================================
    // Suppliers
    // =========================================================================

    pub async fn create_supplier(
        &self,
        session: &Session,
        name: String,
        tax_id: String,
        email: Option<String>,
        phone: Option<String>,
    ) -> ServiceResult<Supplier> {
        validation::validate_name(&name)?;

        let now = Utc::now();
        let supplier = Supplier {
            id: Uuid::new_v4().to_string(),
            name,
            tax_id,
            email,
            phone,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.db.suppliers().insert(&supplier).await?;

        self.audit(
            session,
            AuditAction::Create,
            "Supplier",
            Some(&supplier.id),
            format!("created supplier '{}'", supplier.name),
        )
        .await;

        Ok(supplier)
    }

    pub async fn update_supplier(
        &self,
        session: &Session,
        mut supplier: Supplier,
    ) -> ServiceResult<Supplier> {
        validation::validate_name(&supplier.name)?;
        supplier.updated_at = Utc::now();
        self.db.suppliers().update(&supplier).await?;

        self.audit(
            session,
            AuditAction::Update,
            "Supplier",
            Some(&supplier.id),
            format!("updated supplier '{}'", supplier.name),
        )
        .await;

        Ok(supplier)
    }

    /// Deactivates a supplier (soft delete). Receiving refuses to open a
    /// receipt against an inactive supplier; past purchases keep the id.
    pub async fn deactivate_supplier(&self, session: &Session, id: &str) -> ServiceResult<()> {
        self.db.suppliers().set_active(id, false).await?;

        self.audit(
            session,
            AuditAction::Delete,
            "Supplier",
            Some(id),
            "deactivated supplier".to_string(),
        )
        .await;

        Ok(())
    }

    // =========================================================================
    // Audit
    // =========================================================================

    /// Best-effort audit append. A failed write is logged and swallowed;
    /// the primary operation has already succeeded.
    async fn audit(
        &self,
        session: &Session,
        action: AuditAction,
        entity: &str,
        entity_id: Option<&str>,
        description: String,
    ) {
        let entry = AuditLogEntry {
            id: Uuid::new_v4().to_string(),
            actor: Some(session.user_name.clone()),
            action,
            entity: entity.to_string(),
            entity_id: entity_id.map(str::to_string),
            description,
            created_at: Utc::now(),
        };

        if let Err(err) = self.db.audit().append(&entry).await {
            warn!(error = %err, entity = %entry.entity, "Audit write failed");
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::services::error::ServiceError;
    use crate::test_support::{seed_category, test_session};
    use mercado_core::{CoreError, ValidationError};

    fn new_product(barcode: &str) -> NewProduct {
        NewProduct {
            barcode: barcode.to_string(),
            name: "Feijao Preto 1kg".to_string(),
            category_id: "cat-1".to_string(),
            cost_cents: 400,
            price_cents: 799,
            min_stock_qty: 10,
            unit: "UN".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_product_starts_with_zero_stock_and_audits() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        seed_category(&db, "cat-1").await;
        let service = CatalogService::new(db.clone());
        let session = test_session();

        let product = service
            .create_product(&session, new_product("123"))
            .await
            .unwrap();
        assert_eq!(product.stock_qty, 0);

        let audit = db.audit().list_recent(10).await.unwrap();
        assert_eq!(audit.len(), 1);
        assert_eq!(audit[0].actor_name(), "Maria");
        assert_eq!(audit[0].action, AuditAction::Create);
        assert_eq!(audit[0].entity_id.as_deref(), Some(product.id.as_str()));
    }

    #[tokio::test]
    async fn test_price_below_cost_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        seed_category(&db, "cat-1").await;
        let service = CatalogService::new(db);
        let session = test_session();

        let mut input = new_product("123");
        input.price_cents = 300; // below cost of 400

        let err = service.create_product(&session, input).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Core(CoreError::Validation(ValidationError::PriceBelowCost { .. }))
        ));
    }

    #[tokio::test]
    async fn test_find_by_barcode_distinguishes_missing_and_inactive() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        seed_category(&db, "cat-1").await;
        let service = CatalogService::new(db.clone());
        let session = test_session();

        let err = service.find_by_barcode("123").await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Core(CoreError::ProductNotFound(_))
        ));

        let product = service
            .create_product(&session, new_product("123"))
            .await
            .unwrap();
        service.deactivate_product(&session, &product.id).await.unwrap();

        let err = service.find_by_barcode("123").await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Core(CoreError::ProductInactive(_))
        ));
    }

    #[tokio::test]
    async fn test_category_and_supplier_lifecycle_audits() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let service = CatalogService::new(db.clone());
        let session = test_session();

        let mut category = service
            .create_category(&session, "Padaria".to_string(), None)
            .await
            .unwrap();
        category.name = "Padaria e Confeitaria".to_string();
        category.description = Some("Paes, bolos e doces".to_string());
        let category = service.update_category(&session, category).await.unwrap();

        let stored = db.categories().get_by_id(&category.id).await.unwrap().unwrap();
        assert_eq!(stored.name, "Padaria e Confeitaria");

        service.deactivate_category(&session, &category.id).await.unwrap();
        assert!(db.categories().list_active().await.unwrap().is_empty());

        let mut supplier = service
            .create_supplier(
                &session,
                "Distribuidora Sul".to_string(),
                "12.345.678/0001-00".to_string(),
                None,
                None,
            )
            .await
            .unwrap();
        supplier.phone = Some("51 3333-0000".to_string());
        let supplier = service.update_supplier(&session, supplier).await.unwrap();

        let stored = db.suppliers().get_by_id(&supplier.id).await.unwrap().unwrap();
        assert_eq!(stored.phone.as_deref(), Some("51 3333-0000"));

        service.deactivate_supplier(&session, &supplier.id).await.unwrap();
        assert!(db.suppliers().list_active().await.unwrap().is_empty());

        // Two creates, two updates, two deactivations.
        let audit = db.audit().list_recent(20).await.unwrap();
        assert_eq!(
            audit.iter().filter(|e| e.action == AuditAction::Update).count(),
            2
        );
        assert_eq!(
            audit.iter().filter(|e| e.action == AuditAction::Delete).count(),
            2
        );
    }

    #[tokio::test]
    async fn test_adjust_stock_audits() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        seed_category(&db, "cat-1").await;
        let service = CatalogService::new(db.clone());
        let session = test_session();

        let product = service
            .create_product(&session, new_product("123"))
            .await
            .unwrap();
        service.adjust_stock(&session, &product.id, 50).await.unwrap();

        let after = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(after.stock_qty, 50);

        let audit = db.audit().list_recent(10).await.unwrap();
        assert!(audit
            .iter()
            .any(|e| e.action == AuditAction::StockUpdated));
    }
}
