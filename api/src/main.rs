#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

use ::axum::Server;
use dotenvy::dotenv;
use profrag::Config;
use std::{env, net::SocketAddr};
use tracing::info;

use crate::{
    axum::{app, state},
    utils::logger,
};

mod axum;
mod http;
mod utils;

#[tokio::main]
async fn main() {
    dotenv().ok();
    let _guard = logger::setup();

    let config = Config::from_env().expect("Failed to load configuration");
    let app = app::create(state::create(&config));
    let address = SocketAddr::from((
        [0, 0, 0, 0],
        port(env::var("PORT")),
    ));

    info!("⚡ Professor advisor API started on http://{address}");
    Server::bind(&address)
        .serve(app.into_make_service())
        .await
        .expect("Failed to start server");
}

fn port(value: Result<String, env::VarError>) -> u16 {
    value.map_or(8000, |p| p.parse().expect("Invalid $PORT"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_8000() {
        assert_eq!(port(Err(env::VarError::NotPresent)), 8000);
        assert_eq!(port(Ok("3000".to_string())), 3000);
    }

    #[test]
    #[should_panic(expected = "Invalid $PORT")]
    fn names_the_variable_when_malformed() {
        port(Ok("eighty".to_string()));
    }
}
