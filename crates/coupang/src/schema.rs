//! Wire schema of the product search response and its normalisation.
//!
//! The upstream schema is loose: numbers sometimes arrive as floats or as
//! formatted strings, and most fields may be missing. Everything is read as
//! optional JSON and folded into [`pipeline::Product`] with empty/zero
//! defaults.

use serde::Deserialize;
use serde_json::Value;

use pipeline::Product;

/// `{ rCode, rMessage, data: { landingUrl, productData: [...] } }`
#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(rename = "rCode", default)]
    pub r_code: Option<String>,
    #[serde(rename = "rMessage", default)]
    pub r_message: Option<String>,
    #[serde(default)]
    pub data: Option<SearchData>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchData {
    #[serde(rename = "productData", default)]
    pub product_data: Option<Vec<RawProduct>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct RawProduct {
    pub product_name: Option<String>,
    pub product_price: Option<Value>,
    pub product_image: Option<String>,
    pub product_url: Option<String>,
    pub product_description: Option<String>,
    pub category_name: Option<String>,
    pub product_rating: Option<Value>,
    pub review_count: Option<Value>,
}

impl RawProduct {
    pub fn into_product(self) -> Product {
        Product {
            name: self.product_name.unwrap_or_default(),
            price: self.product_price.as_ref().and_then(as_u64).unwrap_or(0),
            image: self.product_image.unwrap_or_default(),
            url: self.product_url.unwrap_or_default(),
            description: self.product_description.unwrap_or_default(),
            category: self.category_name.unwrap_or_default(),
            rating: self.product_rating.as_ref().and_then(as_f64).unwrap_or(0.0),
            review_count: self.review_count.as_ref().and_then(as_u64).unwrap_or(0),
        }
    }
}

fn as_f64(v: &Value) -> Option<f64> {
    let parsed = match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', "").parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|f| f.is_finite() && *f >= 0.0)
}

fn as_u64(v: &Value) -> Option<u64> {
    if let Some(u) = v.as_u64() {
        return Some(u);
    }
    as_f64(v).map(|f| f.round() as u64)
}
