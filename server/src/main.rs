use std::env;
use std::process::exit;

use jobs_api::builder::ApiBuilder;
use log::{error, info};
use timesheet_server::{app, BFF_ADDR_VAR, DEFAULT_BFF_ADDR};

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let api = match ApiBuilder::create_from_env() {
        Ok(api) => api,
        Err(err) => {
            error!("Unable to create the job backend client: {err}");
            eprintln!("Unable to create the job backend client: {err}");
            exit(1);
        }
    };
    info!("Relaying to {}", api.base_url());

    let addr = env::var(BFF_ADDR_VAR).unwrap_or_else(|_| DEFAULT_BFF_ADDR.to_string());
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("Unable to listen on {addr}: {err}");
            eprintln!("Unable to listen on {addr}: {err}");
            exit(1);
        }
    };
    println!("Server running on {addr}");

    if let Err(err) = axum::serve(listener, app(api)).await {
        error!("Server stopped: {err}");
        exit(1);
    }
}
