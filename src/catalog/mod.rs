//! Catalog query engine.
//!
//! `CatalogService` owns the product list loaded at startup and answers every
//! storefront listing, search and suggestion request from it. Reads borrow;
//! stock changes need `&mut self`, so callers sharing the service put it
//! behind a lock.
//!
//! Listing pipeline: filter, then sort, then paginate. `total` on a page is
//! always the filtered count before pagination.

mod category;
mod query;

use std::collections::{HashMap, HashSet};
use std::path::Path;

use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

use crate::domain::aggregates::Product;
use crate::{CatalogError, Result};

pub use category::{CategorySummary, CATEGORIES};
pub use query::{ProductPage, ProductQuery, SortBy, DEFAULT_LIMIT, DEFAULT_PAGE};

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse catalog: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Duplicate product id {0}")]
    DuplicateId(u64),
}

#[derive(Clone, Debug, Default)]
pub struct CatalogService {
    products: Vec<Product>,
    paginate_search: bool,
}

impl CatalogService {
    /// Builds the catalog, rejecting duplicate ids and repairing stale stock
    /// flags.
    pub fn new(mut products: Vec<Product>) -> std::result::Result<Self, LoadError> {
        let mut ids = HashSet::with_capacity(products.len());
        for product in &mut products {
            if !ids.insert(product.id) {
                return Err(LoadError::DuplicateId(product.id));
            }
            if product.normalize() {
                warn!(product_id = product.id, "Repaired inconsistent catalog entry");
            }
            if !category::is_known(&product.category) {
                debug!(product_id = product.id, category = %product.category, "Product outside the fixed category set");
            }
        }
        Ok(Self { products, paginate_search: false })
    }

    pub fn from_json_str(json: &str) -> std::result::Result<Self, LoadError> {
        Self::new(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> std::result::Result<Self, LoadError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Paginate non-empty searches like listings. Off by default: search
    /// returns every match on one page.
    pub fn with_paginated_search(mut self, enabled: bool) -> Self {
        self.paginate_search = enabled;
        self
    }

    pub fn products(&self) -> &[Product] { &self.products }
    pub fn len(&self) -> usize { self.products.len() }
    pub fn is_empty(&self) -> bool { self.products.is_empty() }

    fn select<'a>(&'a self, filters: &ProductQuery, extra: impl Fn(&Product) -> bool) -> Vec<&'a Product> {
        let mut matches: Vec<&Product> = self.products.iter().filter(|p| filters.matches(p) && extra(*p)).collect();
        filters.sort_by().apply(&mut matches);
        matches
    }

    pub fn get_all_products(&self, filters: &ProductQuery) -> Result<ProductPage> {
        filters.validate()?;
        let matches = self.select(filters, |_| true);
        debug!(total = matches.len(), page = filters.page(), "Listed products");
        Ok(ProductPage::paginate(matches, filters.page(), filters.limit()))
    }

    pub fn get_product_by_id(&self, id: u64) -> Result<&Product> {
        self.products.iter().find(|p| p.id == id).ok_or(CatalogError::NotFound(id))
    }

    /// Empty queries fall through to `get_all_products`.
    pub fn search_products(&self, query: &str, filters: &ProductQuery) -> Result<ProductPage> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.get_all_products(filters);
        }
        filters.validate()?;
        let matches = self.select(filters, |p| p.matches_text(&needle));
        debug!(query = %needle, total = matches.len(), "Searched products");
        if self.paginate_search {
            Ok(ProductPage::paginate(matches, filters.page(), filters.limit()))
        } else {
            Ok(ProductPage::unpaginated(matches))
        }
    }

    pub fn get_featured_products(&self, limit: usize) -> Vec<Product> {
        self.products.iter().filter(|p| p.is_featured).take(limit).cloned().collect()
    }

    /// All five known categories with live counts, zero counts included.
    pub fn get_categories(&self) -> Vec<CategorySummary> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for p in &self.products {
            *counts.entry(p.category.as_str()).or_default() += 1;
        }
        CATEGORIES
            .iter()
            .map(|&(id, name)| CategorySummary { id, name, count: counts.get(id).copied().unwrap_or(0) })
            .collect()
    }

    /// Autocomplete values from titles, categories, brands, materials and
    /// tags, first occurrence wins.
    pub fn get_search_suggestions(&self, query: &str, limit: usize) -> Vec<String> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return vec![];
        }
        let mut seen = HashSet::new();
        self.products
            .iter()
            .flat_map(|p| [&p.title, &p.category, &p.brand, &p.material].into_iter().chain(p.tags.iter()))
            .filter(|value| value.to_lowercase().contains(&needle))
            .filter(|&value| seen.insert(value.as_str()))
            .take(limit)
            .cloned()
            .collect()
    }

    /// Same-category products other than `product_id`. Unknown ids give an
    /// empty list.
    pub fn get_related_products(&self, product_id: u64, limit: usize) -> Vec<Product> {
        let Ok(target) = self.get_product_by_id(product_id) else {
            return vec![];
        };
        self.products
            .iter()
            .filter(|p| p.category == target.category && p.id != product_id)
            .take(limit)
            .cloned()
            .collect()
    }

    pub fn products_by_category(&self, category: &str, filters: &ProductQuery) -> Result<ProductPage> {
        let filters = ProductQuery { category: Some(category.to_string()), ..filters.clone() };
        self.get_all_products(&filters)
    }

    /// Takes `quantity` units off a product, flooring at zero. Returns `None`
    /// for an unknown id rather than failing.
    #[instrument(skip(self))]
    pub fn update_product_stock(&mut self, product_id: u64, quantity: u32) -> Option<Product> {
        let product = self.products.iter_mut().find(|p| p.id == product_id)?;
        product.decrement_stock(quantity);
        info!(stock = product.stock_quantity.value(), in_stock = product.in_stock, "Stock decremented");
        Some(product.clone())
    }

    /// Puts `quantity` units back, e.g. when a cart line is dropped.
    #[instrument(skip(self))]
    pub fn restock_product(&mut self, product_id: u64, quantity: u32) -> Option<Product> {
        let product = self.products.iter_mut().find(|p| p.id == product_id)?;
        product.restock(quantity);
        info!(stock = product.stock_quantity.value(), "Stock returned");
        Some(product.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::product::fixtures::product;
    use crate::domain::value_objects::{Price, Rating, StockLevel};
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;
    use rust_decimal::Decimal;

    fn furniture() -> CatalogService {
        let mut table = product(1, "Oak Table", "dining", 10000);
        table.brand = "Nordhaus".into();
        table.material = "Oak".into();
        table.tags = vec!["wood".into(), "family".into()];
        table.rating = Rating::new(4.5).unwrap();
        table.reviews = 30;
        table.is_featured = true;

        let mut chair = product(2, "Oak Chair", "dining", 5000);
        chair.brand = "Nordhaus".into();
        chair.material = "Oak".into();
        chair.tags = vec!["wood".into()];
        chair.rating = Rating::new(4.8).unwrap();
        chair.reviews = 12;

        let mut desk = product(3, "Standing Desk", "office", 45000);
        desk.subcategory = "desks".into();
        desk.material = "Steel".into();
        desk.description = "Height adjustable oak-top desk".into();
        desk.stock_quantity = StockLevel::new(0);
        desk.in_stock = false;
        desk.is_featured = true;

        let mut bench = product(4, "Garden Bench", "outdoor", 5000);
        bench.tags = vec!["Teak".into()];
        bench.reviews = 80;

        CatalogService::new(vec![table, chair, desk, bench]).unwrap()
    }

    fn ids(products: &[Product]) -> Vec<u64> { products.iter().map(|p| p.id).collect() }

    #[test]
    fn test_price_low_orders_cheapest_first() {
        let catalog = CatalogService::new(vec![product(1, "Oak Table", "dining", 10000), product(2, "Oak Chair", "dining", 5000)]).unwrap();
        let page = catalog.get_all_products(&ProductQuery { sort_by: Some(SortBy::PriceLow), ..Default::default() }).unwrap();
        assert_eq!(ids(&page.products), vec![2, 1]);
    }

    #[test]
    fn test_sort_keys() {
        let catalog = furniture();
        let sorted = |sort_by| ids(&catalog.get_all_products(&ProductQuery { sort_by: Some(sort_by), ..Default::default() }).unwrap().products);
        assert_eq!(sorted(SortBy::PriceHigh), vec![3, 1, 2, 4]);
        // equal prices keep catalog order
        assert_eq!(sorted(SortBy::PriceLow), vec![2, 4, 1, 3]);
        assert_eq!(sorted(SortBy::Rating), vec![2, 1, 3, 4]);
        assert_eq!(sorted(SortBy::Newest), vec![4, 3, 2, 1]);
        assert_eq!(sorted(SortBy::Popular), vec![4, 1, 2, 3]);
        assert_eq!(sorted(SortBy::Catalog), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_filters_combine() {
        let catalog = furniture();
        let q = ProductQuery { category: Some("dining".into()), max_price: Some(Decimal::new(60, 0)), ..Default::default() };
        assert_eq!(ids(&catalog.get_all_products(&q).unwrap().products), vec![2]);

        let q = ProductQuery { in_stock: Some(false), ..Default::default() };
        assert_eq!(ids(&catalog.get_all_products(&q).unwrap().products), vec![3]);

        let q = ProductQuery { featured: Some(true), min_price: Some(Decimal::new(200, 0)), ..Default::default() };
        assert_eq!(ids(&catalog.get_all_products(&q).unwrap().products), vec![3]);

        let q = ProductQuery { subcategory: Some("chairs".into()), ..Default::default() };
        let page = catalog.get_all_products(&q).unwrap();
        assert!(page.products.is_empty());
        assert_eq!((page.total, page.total_pages), (0, 0));
    }

    #[test]
    fn test_pagination_reports_unpaginated_total() {
        let catalog = furniture();
        let page = catalog.get_all_products(&ProductQuery { page: Some(2), limit: Some(3), ..Default::default() }).unwrap();
        assert_eq!(ids(&page.products), vec![4]);
        assert_eq!((page.total, page.page, page.limit, page.total_pages), (4, 2, 3, 2));
    }

    #[test]
    fn test_invalid_query_is_validation_failure() {
        let err = furniture().get_all_products(&ProductQuery { limit: Some(0), ..Default::default() }).unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));
    }

    #[test]
    fn test_get_product_by_id() {
        let catalog = furniture();
        assert_eq!(catalog.get_product_by_id(3).unwrap().title, "Standing Desk");
        assert_eq!(catalog.get_product_by_id(99), Err(CatalogError::NotFound(99)));
    }

    #[test]
    fn test_search_matches_fields_and_tags() {
        let catalog = furniture();
        let search = |q: &str| ids(&catalog.search_products(q, &ProductQuery::default()).unwrap().products);
        assert_eq!(search("OAK"), vec![1, 2, 3]);
        assert_eq!(search("teak"), vec![4]);
        assert_eq!(search("nordhaus"), vec![1, 2]);
        assert_eq!(search("desks"), vec![3]);
        assert!(search("walnut").is_empty());
    }

    #[test]
    fn test_search_applies_filters_and_sort_but_not_pagination() {
        let catalog = furniture();
        let q = ProductQuery { in_stock: Some(true), sort_by: Some(SortBy::PriceLow), limit: Some(1), ..Default::default() };
        let page = catalog.search_products("oak", &q).unwrap();
        assert_eq!(ids(&page.products), vec![2, 1]);
        assert_eq!((page.total, page.page, page.limit, page.total_pages), (2, 1, 2, 1));

        let paginated = catalog.clone().with_paginated_search(true).search_products("oak", &q).unwrap();
        assert_eq!(ids(&paginated.products), vec![2]);
        assert_eq!((paginated.total, paginated.total_pages), (2, 2));
    }

    #[test]
    fn test_featured_keeps_order_and_limit() {
        let catalog = furniture();
        assert_eq!(ids(&catalog.get_featured_products(10)), vec![1, 3]);
        assert_eq!(ids(&catalog.get_featured_products(1)), vec![1]);
    }

    #[test]
    fn test_categories_on_empty_catalog() {
        let cats = CatalogService::default().get_categories();
        assert_eq!(cats.len(), 5);
        assert!(cats.iter().all(|c| c.count == 0));
    }

    #[test]
    fn test_categories_count_live_and_skip_unknown() {
        let mut products = furniture().products().to_vec();
        products.push(product(9, "Shed", "garage", 100));
        let catalog = CatalogService::new(products).unwrap();
        let counts: Vec<(&str, usize)> = catalog.get_categories().iter().map(|c| (c.id, c.count)).collect();
        assert_eq!(counts, vec![("living-room", 0), ("bedroom", 0), ("dining", 2), ("office", 1), ("outdoor", 1)]);
        // unknown categories still take part in search
        assert_eq!(ids(&catalog.search_products("garage", &ProductQuery::default()).unwrap().products), vec![9]);
    }

    #[test]
    fn test_suggestions_dedupe_and_truncate() {
        let catalog = furniture();
        assert_eq!(catalog.get_search_suggestions("oak", 10), vec!["Oak Table", "Oak", "Oak Chair"]);
        assert_eq!(catalog.get_search_suggestions("oak", 2), vec!["Oak Table", "Oak"]);
        assert_eq!(catalog.get_search_suggestions("WOOD", 10), vec!["wood"]);
        assert!(catalog.get_search_suggestions("", 10).is_empty());
        assert!(catalog.get_search_suggestions("   ", 10).is_empty());
    }

    #[test]
    fn test_related_products() {
        let catalog = furniture();
        assert_eq!(ids(&catalog.get_related_products(1, 4)), vec![2]);
        assert!(catalog.get_related_products(4, 4).is_empty());
        assert!(catalog.get_related_products(99, 4).is_empty());
    }

    #[test]
    fn test_products_by_category_overrides_filter() {
        let catalog = furniture();
        let q = ProductQuery { category: Some("office".into()), ..Default::default() };
        assert_eq!(ids(&catalog.products_by_category("dining", &q).unwrap().products), vec![1, 2]);
    }

    #[test]
    fn test_update_stock_floors_at_zero() {
        let mut table = furniture().get_product_by_id(1).unwrap().clone();
        table.stock_quantity = StockLevel::new(3);
        let mut catalog = CatalogService::new(vec![table]).unwrap();

        let updated = catalog.update_product_stock(1, 5).unwrap();
        assert_eq!(updated.stock_quantity.value(), 0);
        assert!(!updated.in_stock);
        assert!(!catalog.get_product_by_id(1).unwrap().in_stock);
        assert!(catalog.update_product_stock(42, 1).is_none());

        let restocked = catalog.restock_product(1, 2).unwrap();
        assert_eq!(restocked.stock_quantity.value(), 2);
        assert!(restocked.in_stock);
    }

    #[test]
    fn test_load_rejects_duplicates_and_repairs_flags() {
        let err = CatalogService::new(vec![product(1, "a", "dining", 1), product(1, "b", "dining", 1)]).unwrap_err();
        assert!(matches!(err, LoadError::DuplicateId(1)));

        let json = r#"[{"id": 1, "title": "Lamp", "category": "office", "discountedPrice": 20,
            "originalPrice": 25, "inStock": true, "stockQuantity": 0, "createdAt": "2024-01-01T00:00:00Z"}]"#;
        let catalog = CatalogService::from_json_str(json).unwrap();
        assert!(!catalog.get_product_by_id(1).unwrap().in_stock);
        assert!(matches!(CatalogService::from_json_str("{"), Err(LoadError::Json(_))));
    }

    #[test]
    fn test_seed_catalog_loads() {
        let catalog = CatalogService::from_json_file(concat!(env!("CARGO_MANIFEST_DIR"), "/data/catalog.json")).unwrap();
        assert!(!catalog.is_empty());
        assert!(catalog.get_categories().iter().all(|c| c.count > 0));
    }

    // -------------------------------------------------------------------------
    // Properties
    // -------------------------------------------------------------------------

    const CATEGORY_POOL: [&str; 6] = ["living-room", "bedroom", "dining", "office", "outdoor", "garage"];

    fn arb_catalog() -> impl Strategy<Value = Vec<Product>> {
        prop::collection::vec((0usize..6, 0u64..100_000, 0u32..=50, 0u32..500, 0u32..5, any::<bool>(), 0i64..10_000), 0..40)
            .prop_map(|rows| {
                rows.into_iter()
                    .enumerate()
                    .map(|(i, (cat, cents, rating, reviews, stock, featured, age))| {
                        let mut p = product(i as u64 + 1, &format!("Item {i}"), CATEGORY_POOL[cat], cents);
                        p.tags = vec![format!("tag{}", i % 3)];
                        p.rating = Rating::new(rating as f32 / 10.0).unwrap();
                        p.reviews = reviews;
                        p.stock_quantity = StockLevel::new(stock);
                        p.in_stock = stock > 0;
                        p.is_featured = featured;
                        p.created_at = Utc.timestamp_opt(1_600_000_000 + age * 3600, 0).unwrap();
                        p
                    })
                    .collect()
            })
    }

    fn arb_query() -> impl Strategy<Value = ProductQuery> {
        (
            prop::option::of(0usize..6),
            prop::option::of(any::<bool>()),
            prop::option::of(any::<bool>()),
            prop::option::of((0u64..100_000, 0u64..100_000)),
            prop::sample::select(vec!["price-low", "price-high", "rating", "newest", "popular", "other"]),
            1u32..6,
            1u32..20,
        )
            .prop_map(|(cat, in_stock, featured, bounds, sort, page, limit)| {
                let (min_price, max_price) = match bounds {
                    Some((a, b)) => (Some(Price::from_cents(a.min(b)).amount()), Some(Price::from_cents(a.max(b)).amount())),
                    None => (None, None),
                };
                ProductQuery {
                    category: cat.map(|c| CATEGORY_POOL[c].to_string()),
                    in_stock,
                    featured,
                    min_price,
                    max_price,
                    sort_by: Some(SortBy::from(sort)),
                    page: Some(page),
                    limit: Some(limit),
                    ..Default::default()
                }
            })
    }

    proptest! {
        #[test]
        fn prop_total_counts_filtered_set(products in arb_catalog(), q in arb_query()) {
            let catalog = CatalogService::new(products).unwrap();
            let page = catalog.get_all_products(&q).unwrap();
            let expected = catalog.products().iter().filter(|p| q.matches(p)).count();
            prop_assert_eq!(page.total, expected);
            prop_assert!(page.products.len() <= q.limit() as usize);
            prop_assert!(page.products.iter().all(|p| q.matches(p)));
        }

        #[test]
        fn prop_filtering_is_idempotent(products in arb_catalog(), q in arb_query()) {
            let catalog = CatalogService::new(products).unwrap();
            let all = ProductQuery { page: Some(1), limit: Some(100), ..q.clone() };
            let once = catalog.get_all_products(&all).unwrap();
            let twice = CatalogService::new(once.products.clone()).unwrap().get_all_products(&all).unwrap();
            prop_assert_eq!(ids(&once.products), ids(&twice.products));
        }

        #[test]
        fn prop_price_high_reverses_price_low(products in arb_catalog()) {
            let prices: HashSet<_> = products.iter().map(|p| p.discounted_price).collect();
            prop_assume!(prices.len() == products.len());
            let catalog = CatalogService::new(products).unwrap();
            let list = |sort_by| ids(&catalog.get_all_products(&ProductQuery { sort_by: Some(sort_by), limit: Some(100), ..Default::default() }).unwrap().products);
            let mut low = list(SortBy::PriceLow);
            low.reverse();
            prop_assert_eq!(low, list(SortBy::PriceHigh));
        }

        #[test]
        fn prop_lookup_round_trips(products in arb_catalog()) {
            let catalog = CatalogService::new(products).unwrap();
            for p in catalog.products() {
                prop_assert_eq!(catalog.get_product_by_id(p.id).unwrap(), p);
            }
        }

        #[test]
        fn prop_empty_search_equals_listing(products in arb_catalog()) {
            let catalog = CatalogService::new(products).unwrap();
            let q = ProductQuery::default();
            prop_assert_eq!(catalog.search_products("", &q).unwrap(), catalog.get_all_products(&q).unwrap());
        }

        #[test]
        fn prop_suggestions_are_unique(products in arb_catalog(), needle in "[a-z0-9 ]{0,4}", limit in 0usize..20) {
            let catalog = CatalogService::new(products).unwrap();
            let suggestions = catalog.get_search_suggestions(&needle, limit);
            let unique: HashSet<_> = suggestions.iter().collect();
            prop_assert_eq!(unique.len(), suggestions.len());
            prop_assert!(suggestions.len() <= limit);
            if needle.trim().is_empty() {
                prop_assert!(suggestions.is_empty());
            }
        }
    }
}
