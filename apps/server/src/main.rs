#![warn(clippy::all, clippy::pedantic)]

use std::path::PathBuf;
use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use anyhow::Context;
use cerc::Cerc;
use clap::Parser;
use dotenvy::dotenv;
use logger::LevelFilter;
use tracing::info;

mod config;
mod error;
mod reporting;
mod routes;
mod tls;

use config::Config;
use error::AppError;
use reporting::Reporting;

/// Full-circle synthetic monitoring probe
#[derive(Parser, Debug)]
#[command(name = "cerc", version, about, long_about = None)]
struct Args {
    /// Configuration file, TOML when it ends in `.toml`, JSON otherwise
    #[arg(env = "CERC_CONFIG")]
    config: PathBuf,

    /// Validate the configuration, print it and exit
    #[arg(long)]
    check: bool,

    /// Default log level, `RUST_LOG` takes precedence
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let args = Args::parse();
    logger::init_with_level(args.log_level);

    let mut config = Config::load(&args.config)?;
    if args.check {
        config.check().map_err(AppError::from)?;
        print!("{config}");
        return Ok(());
    }

    run(config).await.context("cerc server failed")
}

async fn run(mut config: Config) -> Result<(), AppError> {
    let (reporting, reporter) = Reporting::for_config(&mut config)?;
    let reporting = web::Data::new(reporting);

    let cerc = Cerc::new(config.service, Arc::new(reporter))?;
    let router = cerc.router();
    let addr = cerc.options().bind_address();

    let server = HttpServer::new(move || {
        let router = router.clone();
        App::new()
            .app_data(reporting.clone())
            .configure(routes::routes)
            .configure(move |cfg| router.configure(cfg))
    });

    let https = &cerc.options().https;
    let server = if https.is_enabled() {
        let tls = tls::server_config(https)?;
        info!(%addr, "listening with TLS");
        server.bind_rustls_0_23(&addr, tls)?
    } else {
        info!(%addr, "listening");
        server.bind(&addr)?
    };

    cerc.start();
    let result = server.run().await;
    cerc.shutdown().await;

    result?;
    Ok(())
}
