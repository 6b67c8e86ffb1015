use crate::commands::build_app_state;
use crate::constants::USD_PER_BILLION;
use crate::models::{PlaceholderKind, Region, Tier};

pub async fn run(region: &str) {
    let region = match Region::from_str(region) {
        Ok(region) => region,
        Err(message) => {
            eprintln!("{}", message);
            std::process::exit(1);
        }
    };

    let app_state = match build_app_state() {
        Ok(state) => state,
        Err(e) => {
            eprintln!("Failed to initialize: {}", e);
            std::process::exit(1);
        }
    };

    println!("Market capitalization classification for {}:", region);
    println!("{}", "-".repeat(72));

    let db = app_state.builder.build(region).await;

    for tier in Tier::all() {
        let records = &db.tiers[&tier];
        println!("\n{} ({}):", tier, records.len());
        for record in records {
            println!(
                "  {:<44} {:<10} ${:>10.2}B",
                record.name,
                record.ticker,
                record.market_cap_usd / USD_PER_BILLION
            );
        }
    }

    if !db.placeholders.is_empty() {
        println!("\nN/A ({}):", db.placeholders.len());
        for placeholder in &db.placeholders {
            let sentinel = match placeholder.kind {
                PlaceholderKind::NoData => "Data N/A",
                PlaceholderKind::Error => "Error",
            };
            println!(
                "  {:<44} {:<10} {:>12}",
                placeholder.name, placeholder.ticker, sentinel
            );
        }
    }

    println!("\n{}", "-".repeat(72));
    println!("Tiers: Large Cap >= $10.0B, Mid Cap $2.0B-$10.0B, Small Cap < $2.0B");
}
