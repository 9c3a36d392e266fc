use anyhow::Result;

use super::InquireArgs;
use crate::core::config::GeoConfig;
use crate::core::inquiry::{InquiryStore, NewInquiry};
use crate::core::terminal;

pub async fn run_inquire(config: &GeoConfig, args: InquireArgs) -> Result<()> {
    let store = InquiryStore::open(&config.database_path)?;
    let id = store
        .save(&NewInquiry {
            brand: args.brand,
            keyword: args.keyword,
            name: args.name,
            contact: args.contact,
            message: args.message,
        })
        .await?;
    terminal::print_success(&format!("Consulting request #{} received", id));
    Ok(())
}

pub async fn run_inquiries(config: &GeoConfig, limit: usize) -> Result<()> {
    let store = InquiryStore::open(&config.database_path)?;
    let records = store.recent(limit).await?;
    if records.is_empty() {
        terminal::print_info("No consulting requests yet.");
        return Ok(());
    }
    terminal::print_step(&format!("Latest {} consulting requests", records.len()));
    for record in &records {
        terminal::print_inquiry(record);
    }
    Ok(())
}
