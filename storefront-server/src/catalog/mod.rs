//! 商品目录 (只读)
//!
//! 从 JSON 文件加载 `[{ "id", "name", "price" }]`。结账时单价一律取自目录，
//! 浏览器提交的 `preco` 不参与计价。

use rust_decimal::Decimal;
use shared::models::Product;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid catalog JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Duplicate product id in catalog: {0}")]
    Duplicate(String),

    #[error("Product {0} must have a positive price")]
    InvalidPrice(String),
}

/// Read-only product catalog
#[derive(Debug, Clone, Default)]
pub struct ProductCatalog {
    products: HashMap<String, Product>,
}

impl ProductCatalog {
    /// Load the catalog from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let products: Vec<Product> = serde_json::from_str(&raw)?;
        let catalog = Self::from_products(products)?;
        tracing::info!(path = %path.display(), products = catalog.len(), "Product catalog loaded");
        Ok(catalog)
    }

    pub fn from_products(products: Vec<Product>) -> Result<Self, CatalogError> {
        let mut map = HashMap::with_capacity(products.len());
        for product in products {
            if product.price <= Decimal::ZERO {
                return Err(CatalogError::InvalidPrice(product.id));
            }
            if map.contains_key(&product.id) {
                return Err(CatalogError::Duplicate(product.id));
            }
            map.insert(product.id.clone(), product);
        }
        Ok(Self { products: map })
    }

    pub fn get(&self, product_id: &str) -> Option<&Product> {
        self.products.get(product_id)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
