//! The product store: one product list, a sale getter, a price mutation
//! and its delayed counterpart.

use shopfront_config::{AppConfig, ProductSeed};
use shopfront_store::{ActionContext, LoggingMiddleware, Store, StoreError};
use std::time::Duration;

pub const SALE_PRODUCTS: &str = "saleProducts";
pub const MINUS_PRICE: &str = "minusPrice";
pub const MINUS_PRICE_ASYNC: &str = "minusPriceAsync";

#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub name: String,
    pub price: f64,
}

impl Product {
    pub fn new(name: impl Into<String>, price: f64) -> Self {
        Self {
            name: name.into(),
            price,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductState {
    pub products: Vec<Product>,
}

impl ProductState {
    pub fn from_seeds(seeds: &[ProductSeed]) -> Self {
        Self {
            products: seeds
                .iter()
                .map(|seed| Product::new(seed.name.clone(), seed.price))
                .collect(),
        }
    }
}

/// Every product at half price
pub fn sale_products(state: &ProductState) -> Vec<Product> {
    state
        .products
        .iter()
        .map(|product| Product::new(product.name.clone(), product.price / 2.0))
        .collect()
}

pub fn minus_price(state: &mut ProductState, amount: &f64) {
    for product in &mut state.products {
        product.price -= amount;
    }
}

async fn minus_price_async(
    ctx: ActionContext<ProductState>,
    amount: f64,
    delay: Duration,
) -> anyhow::Result<()> {
    tokio::select! {
        _ = ctx.cancelled() => {
            log::info!("{} cancelled before its delay elapsed", ctx.action());
            return Ok(());
        }
        _ = tokio::time::sleep(delay) => {}
    }

    ctx.commit(MINUS_PRICE, amount)?;
    Ok(())
}

/// Build the product store from configuration
///
/// Payloads are matched by type: `minusPrice` and `minusPriceAsync` take an
/// `f64`, so commit `5.0` rather than `5`. An integer literal is an `i32`
/// and is rejected with `StoreError::PayloadType`.
pub fn product_store(config: &AppConfig) -> Result<Store<ProductState>, StoreError> {
    let delay = Duration::from_millis(config.action_delay_ms);

    Store::builder(ProductState::from_seeds(&config.products))
        .middleware(LoggingMiddleware::new())
        .getter(SALE_PRODUCTS, sale_products)
        .mutation(MINUS_PRICE, minus_price)
        .action(
            MINUS_PRICE_ASYNC,
            move |ctx: ActionContext<ProductState>, amount: f64| {
                minus_price_async(ctx, amount, delay)
            },
        )
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn prices(products: &[Product]) -> Vec<f64> {
        products.iter().map(|p| p.price).collect()
    }

    fn store() -> Store<ProductState> {
        product_store(&AppConfig::default()).unwrap()
    }

    #[test]
    fn test_seed_state() {
        let state = store().state();
        let names: Vec<&str> = state.products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["mouse", "keyboard", "headset", "monitor"]);
        assert_eq!(prices(&state.products), vec![20.0, 40.0, 60.0, 80.0]);
    }

    #[test]
    fn test_sale_products_halves_prices() {
        let store = store();
        let sale: Vec<Product> = store.getter(SALE_PRODUCTS).unwrap();

        assert_eq!(
            sale,
            vec![
                Product::new("mouse", 10.0),
                Product::new("keyboard", 20.0),
                Product::new("headset", 30.0),
                Product::new("monitor", 40.0),
            ]
        );
        assert_eq!(prices(&store.state().products), vec![20.0, 40.0, 60.0, 80.0]);
    }

    #[test]
    fn test_sale_products_is_stable_between_commits() {
        let store = store();
        let first: Vec<Product> = store.getter(SALE_PRODUCTS).unwrap();
        let second: Vec<Product> = store.getter(SALE_PRODUCTS).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_sale_products_follows_state() {
        let store = store();
        store.commit(MINUS_PRICE, 10.0).unwrap();

        let sale: Vec<Product> = store.getter(SALE_PRODUCTS).unwrap();
        assert_eq!(prices(&sale), vec![5.0, 15.0, 25.0, 35.0]);
    }

    #[test]
    fn test_minus_price() {
        let store = store();
        store.commit(MINUS_PRICE, 5.0).unwrap();

        let state = store.state();
        assert_eq!(state.products.len(), 4);
        assert_eq!(state.products[0].name, "mouse");
        assert_eq!(prices(&state.products), vec![15.0, 35.0, 55.0, 75.0]);
    }

    #[test]
    fn test_minus_price_on_arbitrary_state() {
        let mut state = ProductState {
            products: vec![Product::new("a", 1.5), Product::new("b", -2.0)],
        };
        minus_price(&mut state, &0.5);
        assert_eq!(prices(&state.products), vec![1.0, -2.5]);
    }

    #[test]
    fn test_unknown_mutation_leaves_state() {
        let store = store();
        let before = store.state();

        let err = store.commit("doesNotExist", 1.0).unwrap_err();
        assert!(matches!(err, StoreError::UnknownMutation(_)));
        assert_eq!(store.state(), before);
    }

    #[test]
    fn test_integer_payload_rejected() {
        let store = store();
        assert!(matches!(
            store.commit(MINUS_PRICE, 5),
            Err(StoreError::PayloadType { .. })
        ));
        assert_eq!(store.revision(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_minus_price_async_commits_after_delay() {
        let store = store();
        let handle = store.dispatch(MINUS_PRICE_ASYNC, 5.0).unwrap();

        assert_eq!(prices(&store.state().products), vec![20.0, 40.0, 60.0, 80.0]);

        tokio::time::sleep(Duration::from_millis(1999)).await;
        assert_eq!(prices(&store.state().products), vec![20.0, 40.0, 60.0, 80.0]);

        handle.join().await.unwrap();
        assert_eq!(prices(&store.state().products), vec![15.0, 35.0, 55.0, 75.0]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_minus_price_async_cancelled() {
        let store = store();
        let handle = store.dispatch(MINUS_PRICE_ASYNC, 5.0).unwrap();

        tokio::time::sleep(Duration::from_millis(500)).await;
        handle.cancel();
        handle.join().await.unwrap();

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(prices(&store.state().products), vec![20.0, 40.0, 60.0, 80.0]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_configured_delay() {
        let config = AppConfig {
            action_delay_ms: 10,
            ..AppConfig::default()
        };
        let store = product_store(&config).unwrap();
        store.dispatch(MINUS_PRICE_ASYNC, 1.0).unwrap();

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(prices(&store.state().products), vec![19.0, 39.0, 59.0, 79.0]);
    }
}
