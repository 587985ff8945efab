use std::collections::HashMap;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// One purchasable course. `product_type` is the slug used as the progress
/// key throughout the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub product_type: String,
    pub title: String,
    pub module_count: u32,
    pub price: i64,
    pub currency: String,
    #[serde(default = "default_available")]
    pub available: bool,
    /// Per-product override of the global wait window.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait_hours: Option<i64>,
}

fn default_available() -> bool {
    true
}

/// Product catalog, loaded once at startup from a JSON file.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Product>,
    by_type: HashMap<String, usize>,
}

impl Catalog {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path).with_context(|| format!("read {path}"))?;
        let products: Vec<Product> =
            serde_json::from_str(&raw).with_context(|| format!("parse {path}"))?;
        Ok(Self::from_products(products))
    }

    pub fn from_products(products: Vec<Product>) -> Self {
        let by_type = products
            .iter()
            .enumerate()
            .map(|(i, p)| (p.product_type.clone(), i))
            .collect();
        Self { products, by_type }
    }

    pub fn get(&self, product_type: &str) -> Option<&Product> {
        self.by_type.get(product_type).map(|&i| &self.products[i])
    }

    pub fn all(&self) -> &[Product] {
        &self.products
    }

    #[cfg(test)]
    pub fn fixture() -> Self {
        Self::from_products(vec![
            Product {
                product_type: "RemoteReadyBootcamp".into(),
                title: "Remote Ready Bootcamp".into(),
                module_count: 14,
                price: 4900,
                currency: "usd".into(),
                available: true,
                wait_hours: None,
            },
            Product {
                product_type: "AiDigitalCourse".into(),
                title: "AI Digital Course".into(),
                module_count: 12,
                price: 9900,
                currency: "usd".into(),
                available: true,
                wait_hours: Some(12),
            },
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_catalog_json() {
        let raw = r#"[
            {"productType": "RemoteReadyBootcamp", "title": "Remote Ready Bootcamp",
             "moduleCount": 14, "price": 4900, "currency": "usd", "available": true},
            {"productType": "AiDigitalCourse", "title": "AI Digital Course",
             "moduleCount": 12, "price": 9900, "currency": "usd", "waitHours": 12}
        ]"#;
        let products: Vec<Product> = serde_json::from_str(raw).unwrap();
        let catalog = Catalog::from_products(products);

        let bootcamp = catalog.get("RemoteReadyBootcamp").unwrap();
        assert_eq!(bootcamp.module_count, 14);
        assert!(bootcamp.available);
        assert_eq!(bootcamp.wait_hours, None);

        let course = catalog.get("AiDigitalCourse").unwrap();
        assert_eq!(course.wait_hours, Some(12));

        assert!(catalog.get("NoSuchProduct").is_none());
    }

    #[test]
    fn serializes_camel_case() {
        let p = Catalog::fixture().get("RemoteReadyBootcamp").cloned().unwrap();
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["productType"], "RemoteReadyBootcamp");
        assert_eq!(json["moduleCount"], 14);
        assert!(json.get("waitHours").is_none());
    }
}
