//! Query parameters and paged results for catalog listings.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;
use validator::{Validate, ValidationError};

use crate::domain::aggregates::Product;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 12;

/// Sort keys accepted by listings. Anything unrecognised keeps catalog order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", from = "String")]
pub enum SortBy {
    PriceLow,
    PriceHigh,
    Rating,
    Newest,
    Popular,
    #[default]
    Catalog,
}

impl From<&str> for SortBy {
    fn from(raw: &str) -> Self {
        match raw {
            "price-low" => Self::PriceLow,
            "price-high" => Self::PriceHigh,
            "rating" => Self::Rating,
            "newest" => Self::Newest,
            "popular" => Self::Popular,
            _ => Self::Catalog,
        }
    }
}

impl From<String> for SortBy {
    fn from(raw: String) -> Self { Self::from(raw.as_str()) }
}

impl FromStr for SortBy {
    type Err = std::convert::Infallible;
    fn from_str(s: &str) -> Result<Self, Self::Err> { Ok(Self::from(s)) }
}

impl SortBy {
    /// Stable sort, so ties keep catalog order.
    pub fn apply(self, products: &mut [&Product]) {
        match self {
            Self::PriceLow => products.sort_by(|a, b| a.discounted_price.cmp(&b.discounted_price)),
            Self::PriceHigh => products.sort_by(|a, b| b.discounted_price.cmp(&a.discounted_price)),
            Self::Rating => products.sort_by(|a, b| b.rating.value().total_cmp(&a.rating.value())),
            Self::Newest => products.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            Self::Popular => products.sort_by(|a, b| b.reviews.cmp(&a.reviews)),
            Self::Catalog => {}
        }
    }
}

/// Treats a missing or empty query-string value as unset.
fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Listing and search constraints. Every field is optional; unset means no
/// constraint.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_price_bounds"))]
pub struct ProductQuery {
    /// Free-text search term, only read by search.
    #[serde(default, alias = "q", deserialize_with = "empty_as_none")]
    pub query: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub subcategory: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub min_price: Option<Decimal>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub max_price: Option<Decimal>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub in_stock: Option<bool>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub featured: Option<bool>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub sort_by: Option<SortBy>,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(range(min = 1))]
    pub page: Option<u32>,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<u32>,
}

fn validate_price_bounds(query: &ProductQuery) -> Result<(), ValidationError> {
    let negative = [query.min_price, query.max_price].into_iter().flatten().any(|p| p.is_sign_negative() && !p.is_zero());
    if negative {
        return Err(ValidationError::new("negative_price"));
    }
    if let (Some(min), Some(max)) = (query.min_price, query.max_price) {
        if min > max {
            return Err(ValidationError::new("min_price_above_max_price"));
        }
    }
    Ok(())
}

impl ProductQuery {
    pub fn page(&self) -> u32 { self.page.unwrap_or(DEFAULT_PAGE) }
    pub fn limit(&self) -> u32 { self.limit.unwrap_or(DEFAULT_LIMIT) }
    pub fn sort_by(&self) -> SortBy { self.sort_by.unwrap_or_default() }

    /// Filter predicate: category, subcategory, stock, price bounds, featured.
    pub fn matches(&self, p: &Product) -> bool {
        let price = p.discounted_price.amount();
        self.category.as_deref().map_or(true, |c| p.category == c)
            && self.subcategory.as_deref().map_or(true, |s| p.subcategory == s)
            && self.in_stock.map_or(true, |s| p.in_stock == s)
            && self.min_price.map_or(true, |min| price >= min)
            && self.max_price.map_or(true, |max| price <= max)
            && self.featured.map_or(true, |f| p.is_featured == f)
    }
}

/// One page of a filtered, sorted listing.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    pub products: Vec<Product>,
    /// Matches before pagination.
    pub total: usize,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

impl ProductPage {
    pub(crate) fn paginate(matches: Vec<&Product>, page: u32, limit: u32) -> Self {
        let total = matches.len();
        let start = (page.saturating_sub(1) as usize).saturating_mul(limit as usize);
        let products = matches.into_iter().skip(start).take(limit as usize).cloned().collect();
        let total_pages = u32::try_from(total.div_ceil(limit.max(1) as usize)).unwrap_or(u32::MAX);
        Self { products, total, page, limit, total_pages }
    }

    /// Every match on a single page.
    pub(crate) fn unpaginated(matches: Vec<&Product>) -> Self {
        let total = matches.len();
        let products = matches.into_iter().cloned().collect();
        let limit = u32::try_from(total).unwrap_or(u32::MAX);
        Self { products, total, page: 1, limit, total_pages: u32::from(total > 0) }
    }
}
