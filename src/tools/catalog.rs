use std::pin::Pin;

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use super::Tool;

/// Fixed catalog endpoint for the demo store
pub const CATALOG_ENDPOINT: &str = "https://template6-six.vercel.app/api/products/";

const DEFAULT_TITLE: &str = "No title";
const DEFAULT_DESCRIPTION: &str = "No description";
const DEFAULT_IMAGE: &str = "No image";

/// A product record normalized from the loosely structured catalog API.
///
/// `discounted_price` is always derived from `price` and
/// `discount_percentage`; it is never supplied by the upstream API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedProduct {
    pub title: String,
    pub price: f64,
    pub discounted_price: f64,
    pub discount_percentage: f64,
    pub description: String,
    pub is_new: bool,
    pub image_url: String,
    pub tags: Vec<String>,
}

/// Failure modes of one catalog fetch. All of them collapse into a single
/// `{"error": ...}` tool output so the model sees a textual failure rather
/// than the process crashing.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to reach catalog endpoint: {0}")]
    Transport(String),

    #[error("catalog endpoint returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("failed to parse catalog response: {0}")]
    Parse(String),
}

/// Fetch the product catalog and normalize every record, preserving order.
///
/// A missing or malformed optional field on a record never aborts the
/// catalog; the field falls back to its documented default instead.
pub async fn fetch_and_normalize_catalog(
    client: &Client,
    url: &str,
) -> Result<Vec<NormalizedProduct>, CatalogError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|err| CatalogError::Transport(err.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(CatalogError::Status(status));
    }

    let body: Value = response
        .json()
        .await
        .map_err(|err| CatalogError::Parse(err.to_string()))?;

    let items = body
        .as_array()
        .ok_or_else(|| CatalogError::Parse("response body is not a JSON array".to_string()))?;

    debug!(target: "shopagent::catalog", count = items.len(), "normalizing catalog records");

    Ok(items.iter().map(normalize_item).collect())
}

/// Best-effort extraction of one catalog record; every field has a named
/// default and a bad value degrades to that default rather than erroring.
fn normalize_item(item: &Value) -> NormalizedProduct {
    let price = number_or_zero(item.get("price"));
    // The upstream API really does misspell this field; it is the contract.
    let discount = number_or_zero(item.get("dicountPercentage"));

    NormalizedProduct {
        title: text_or_default(item.get("title"), DEFAULT_TITLE),
        price,
        discounted_price: round2(price * (1.0 - discount / 100.0)),
        discount_percentage: discount,
        description: text_or_default(item.get("description"), DEFAULT_DESCRIPTION),
        is_new: item.get("isNew").and_then(Value::as_bool).unwrap_or(false),
        image_url: text_or_default(item.get("Url"), DEFAULT_IMAGE),
        tags: item
            .get("tags")
            .and_then(Value::as_array)
            .map(|tags| {
                tags.iter()
                    .filter_map(|tag| tag.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default(),
    }
}

fn text_or_default(value: Option<&Value>, default: &str) -> String {
    value
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| default.to_string())
}

fn number_or_zero(value: Option<&Value>) -> f64 {
    value.and_then(Value::as_f64).unwrap_or(0.0)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Tool that fetches the product catalog and returns normalized records
#[derive(Debug, Clone)]
pub struct CatalogTool {
    client: Client,
    endpoint: String,
}

impl Default for CatalogTool {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogTool {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            endpoint: CATALOG_ENDPOINT.to_string(),
        }
    }

    /// Point the tool at a different endpoint, mainly for tests
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

impl Tool for CatalogTool {
    fn name(&self) -> &'static str {
        "get_product_data"
    }

    fn description(&self) -> &'static str {
        "Fetches product data from the API and returns each product's title, price, discounted price, discount percentage, description, image, is_new status, and tags"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {}
        })
    }

    fn execute(
        &self,
        _parameters: serde_json::Value,
    ) -> Pin<
        Box<
            dyn std::future::Future<Output = Result<serde_json::Value, crate::AgentError>>
                + Send
                + '_,
        >,
    > {
        let client = self.client.clone();
        let endpoint = self.endpoint.clone();

        Box::pin(async move {
            // Failures are returned as data so the agent loop can hand the
            // message to the model instead of aborting the run.
            match fetch_and_normalize_catalog(&client, &endpoint).await {
                Ok(products) => serde_json::to_value(products).map_err(|err| {
                    crate::AgentError::ToolExecution(format!(
                        "Failed to serialize products: {}",
                        err
                    ))
                }),
                Err(err) => Ok(serde_json::json!({ "error": err.to_string() })),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_discount_formula() {
        let product = normalize_item(&json!({
            "title": "Vase",
            "price": 100,
            "dicountPercentage": 20
        }));

        assert_eq!(product.title, "Vase");
        assert_eq!(product.price, 100.0);
        assert_eq!(product.discounted_price, 80.0);
        assert_eq!(product.discount_percentage, 20.0);
        assert_eq!(product.description, "No description");
        assert!(!product.is_new);
        assert_eq!(product.image_url, "No image");
        assert!(product.tags.is_empty());
    }

    #[test]
    fn test_defaults_for_missing_fields() {
        let product = normalize_item(&json!({ "price": 50 }));

        assert_eq!(product.title, "No title");
        assert_eq!(product.price, 50.0);
        assert_eq!(product.discounted_price, 50.0);
        assert_eq!(product.discount_percentage, 0.0);
        assert_eq!(product.description, "No description");
        assert!(!product.is_new);
        assert_eq!(product.image_url, "No image");
        assert!(product.tags.is_empty());
    }

    #[test]
    fn test_all_fields_present() {
        let product = normalize_item(&json!({
            "title": "Rustic Chair",
            "price": 199.99,
            "dicountPercentage": 15,
            "description": "A chair",
            "isNew": true,
            "Url": "https://example.com/chair.png",
            "tags": ["rustic", "furniture"]
        }));

        assert_eq!(product.title, "Rustic Chair");
        assert_eq!(product.discounted_price, 169.99);
        assert!(product.is_new);
        assert_eq!(product.image_url, "https://example.com/chair.png");
        assert_eq!(product.tags, vec!["rustic", "furniture"]);
    }

    #[test]
    fn test_malformed_numeric_fields_default_to_zero() {
        let product = normalize_item(&json!({
            "title": "Lamp",
            "price": "not a number",
            "dicountPercentage": {"nested": true}
        }));

        assert_eq!(product.price, 0.0);
        assert_eq!(product.discount_percentage, 0.0);
        assert_eq!(product.discounted_price, 0.0);
    }

    #[test]
    fn test_rounding_to_two_decimals() {
        // 29.99 at 33% off is 20.0933; rounds to 20.09
        let product = normalize_item(&json!({
            "price": 29.99,
            "dicountPercentage": 33
        }));
        assert_eq!(product.discounted_price, 20.09);
    }

    #[test]
    fn test_non_string_tags_are_skipped() {
        let product = normalize_item(&json!({
            "tags": ["cozy", 7, null, "vintage"]
        }));
        assert_eq!(product.tags, vec!["cozy", "vintage"]);
    }

    #[test]
    fn test_tool_schema_is_zero_argument() {
        let tool = CatalogTool::new();
        assert_eq!(tool.name(), "get_product_data");
        let schema = tool.parameters_schema();
        assert_eq!(schema["type"], "object");
        assert!(schema["properties"].as_object().unwrap().is_empty());
    }
}
