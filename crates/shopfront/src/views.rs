//! Plain-text rendering of the two product lists.
//!
//! The views only read from the store; they never change it.

use crate::products::{Product, ProductState, SALE_PRODUCTS};
use shopfront_store::Store;

/// Render a titled product table
pub fn product_list(title: &str, products: &[Product]) -> String {
    let rows: String = products
        .iter()
        .map(|product| format!("  {:<12} {:>8.2}\n", product.name, product.price))
        .collect();
    format!("{}\n{}", title, rows)
}

/// Render the regular list followed by the sale list
pub fn render(store: &Store<ProductState>) -> shopfront_store::Result<String> {
    let state = store.state();
    let sale: Vec<Product> = store.getter(SALE_PRODUCTS)?;

    Ok(format!(
        "{}\n{}",
        product_list("Products", &state.products),
        product_list("On sale", &sale)
    ))
}
