use crate::commands::build_app_state;
use crate::server;

pub async fn run(port: u16) {
    let app_state = match build_app_state() {
        Ok(state) => state,
        Err(e) => {
            eprintln!("Failed to initialize: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server::serve(app_state, port).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}
