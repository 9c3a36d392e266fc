use std::sync::Arc;

use anyhow::Result;

use crate::core::config::GeoConfig;
use crate::core::geo::Diagnostician;
use crate::core::inquiry::InquiryStore;
use crate::core::llm::build_backends;
use crate::core::terminal;
use crate::interfaces::web::ApiServer;

pub async fn run_serve(config: &GeoConfig, host: String, port: u16) -> Result<()> {
    let diagnostician = Arc::new(Diagnostician::from_config(build_backends(config)?, config));
    let inquiries = InquiryStore::open(&config.database_path)?;

    terminal::print_banner();
    terminal::print_link("API", &format!("http://{}:{}/api", host, port));
    terminal::print_info("Press Ctrl+C to stop.");

    ApiServer::new(diagnostician, inquiries, host, port)
        .serve()
        .await
}
