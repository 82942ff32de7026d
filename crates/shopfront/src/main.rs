mod logger;
mod products;
mod views;

use products::{ProductState, MINUS_PRICE, MINUS_PRICE_ASYNC};
use shopfront_config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Pick up RUST_LOG from .env if present
    dotenvy::dotenv().ok();

    let log_file = logger::init()?;
    log::info!("Starting shopfront");

    let config = AppConfig::load();
    let store = products::product_store(&config)?;

    store.subscribe(|commit, state: &ProductState| {
        log::info!(
            "Applied {:?}, prices now {:?}",
            commit,
            state.products.iter().map(|p| p.price).collect::<Vec<_>>()
        );
    });

    println!("{}", views::render(&store)?);

    let amount = config.discount_amount;
    println!("-- {} {}\n", MINUS_PRICE, amount);
    store.commit(MINUS_PRICE, amount)?;
    println!("{}", views::render(&store)?);

    let handle = store.dispatch(MINUS_PRICE_ASYNC, amount)?;
    println!(
        "-- {} {} (applies in {} ms)\n",
        MINUS_PRICE_ASYNC, amount, config.action_delay_ms
    );
    println!("{}", views::render(&store)?);

    handle.join().await?;
    println!("-- {} done\n", MINUS_PRICE_ASYNC);
    println!("{}", views::render(&store)?);

    log::info!("Exiting shopfront");
    println!("Log written to {}", log_file.display());
    Ok(())
}
