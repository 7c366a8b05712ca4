//! Minimal embedding example for cadastro-core
//!
//! This example demonstrates using cadastro-core as a library in a custom
//! application: the store and resolver are application-provided, and the
//! service lifecycle is fully managed by the application.

use cadastro_core::config::CreateFallbackPolicy;
use cadastro_core::error::LookupError;
use cadastro_core::service::{RecordService, UpdateOutcome, UpdateRequest};
use cadastro_core::store::MemoryRecordStore;
use cadastro_core::traits::{AddressResolver, RecordQuery, StatusFilter, normalize_postal_code};
use cadastro_core::Result;

/// Custom resolver for embedded usage: answers from a fixed table
/// instead of calling any external service.
struct TableResolver;

#[async_trait::async_trait]
impl AddressResolver for TableResolver {
    async fn resolve(&self, raw_code: &str) -> std::result::Result<String, LookupError> {
        let code = normalize_postal_code(raw_code)?;
        match code.as_str() {
            "01001000" => Ok("Praça da Sé".to_string()),
            "01310100" => Ok("Avenida Paulista".to_string()),
            _ => Err(LookupError::NotFound),
        }
    }

    fn resolver_name(&self) -> &'static str {
        "table"
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    println!("=== Embedded cadastro-core Example ===\n");

    // Create custom components
    let store = Box::new(MemoryRecordStore::new());
    let resolver = Box::new(TableResolver);

    println!("1. Creating service...");
    let service = RecordService::new(store, resolver, CreateFallbackPolicy::Placeholder);

    println!("2. Creating records...");
    let ana = service.create("Ana Silva", "cliente", "01001-000").await?;
    println!("   created {} at {}", ana.name, ana.address_line);

    let bruno = service
        .create("Bruno Lima", "fornecedor", "01310-100")
        .await?;
    println!("   created {} at {}", bruno.name, bruno.address_line);

    println!("3. Applying a partial update...");
    let outcome = service
        .update(
            ana.id,
            UpdateRequest {
                description: Some("cliente preferencial".to_string()),
                ..Default::default()
            },
        )
        .await?;
    match outcome {
        UpdateOutcome::Applied(record) => println!("   updated: {}", record.description),
        UpdateOutcome::NoChanges(_) => println!("   nothing to change"),
    }

    println!("4. Inactivating one record...");
    service.set_active(bruno.id, false).await?;

    println!("5. Listing active records...");
    for record in service
        .query(RecordQuery::status(StatusFilter::ActiveOnly))
        .await?
    {
        println!("   ID {} | {} | {}", record.id, record.name, record.address_line);
    }

    println!("6. Searching by address...");
    for record in service.search("paulista").await? {
        println!(
            "   ID {} | {} ({})",
            record.id,
            record.name,
            if record.active { "active" } else { "inactive" }
        );
    }

    println!("\n=== Embedding Successful ===");
    println!("Key Points:");
    println!("- Store and resolver are application-provided trait objects");
    println!("- No global state");
    println!("- Registry rules apply identically outside the console");

    Ok(())
}
