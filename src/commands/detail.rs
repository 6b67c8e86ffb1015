use crate::commands::build_app_state;
use crate::models::PeriodToken;

pub async fn run(ticker: &str, period: &str) {
    let app_state = match build_app_state() {
        Ok(state) => state,
        Err(e) => {
            eprintln!("Failed to initialize: {}", e);
            std::process::exit(1);
        }
    };

    let period = PeriodToken::parse(period);

    match app_state.detail.detail(ticker, period).await {
        Ok(quote) => {
            let json = serde_json::to_string_pretty(&quote)
                .unwrap_or_else(|_| "serialization failed".to_string());
            println!("{}", json);
        }
        Err(e) => {
            eprintln!("Failed to fetch {}: {}", ticker, e);
            std::process::exit(1);
        }
    }
}
