// # cadastroctl - console front-end
//
// This is a THIN integration layer only:
// 1. Reading configuration from environment variables
// 2. Initializing tracing and the runtime
// 3. Wiring the store and resolver into the RecordService
// 4. Translating menu input into service calls and formatting results
//
// All registry rules live in cadastro-core. Do not add validation,
// merge, or fallback logic here.
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// ### Record Store
// - `CADASTRO_STORE_TYPE`: Type of store (file, memory). Default: file
// - `CADASTRO_STORE_PATH`: Path to the store file (for file store).
//   Default: cadastro-records.json
//
// ### Address Lookup
// - `CADASTRO_LOOKUP_URL`: Base URL of the lookup service.
//   Default: https://viacep.com.br/ws
// - `CADASTRO_LOOKUP_TIMEOUT_SECS`: Per-request timeout. Default: 5
//
// ### Service
// - `CADASTRO_CREATE_FALLBACK`: What create does when the lookup fails
//   (placeholder, abort). Default: placeholder
// - `CADASTRO_EXPORT_DIR`: Directory export artifacts are written to.
//   Default: current directory
//
// ### Logging
// - `CADASTRO_LOG_LEVEL`: trace, debug, info, warn, error. Default: warn
//   (the menu owns stdout; keep tracing quiet unless debugging)
//
// ## Example
//
// ```bash
// export CADASTRO_STORE_TYPE=file
// export CADASTRO_STORE_PATH=/var/lib/cadastro/records.json
// export CADASTRO_EXPORT_DIR=/var/lib/cadastro/exports
//
// cadastroctl
// ```

use anyhow::Result;
use std::env;
use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

use cadastro_core::config::{
    CadastroConfig, CreateFallbackPolicy, LookupConfig, ServiceConfig, StoreConfig,
};
use cadastro_core::export::ExportOutcome;
use cadastro_core::service::{RecordService, UpdateOutcome, UpdateRequest};
use cadastro_core::store::{FileRecordStore, MemoryRecordStore};
use cadastro_core::traits::{Record, RecordQuery, RecordStore, StatusFilter};
use cadastro_resolver_viacep::ViaCepResolver;

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum CadastroExitCode {
    /// Clean shutdown (operator chose to quit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<CadastroExitCode> for ExitCode {
    fn from(code: CadastroExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
struct Config {
    store_type: String,
    store_path: String,
    lookup_url: String,
    lookup_timeout_secs: u64,
    create_fallback: String,
    export_dir: String,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Ok(Self {
            store_type: env::var("CADASTRO_STORE_TYPE").unwrap_or_else(|_| "file".to_string()),
            store_path: env::var("CADASTRO_STORE_PATH")
                .unwrap_or_else(|_| "cadastro-records.json".to_string()),
            lookup_url: env::var("CADASTRO_LOOKUP_URL")
                .unwrap_or_else(|_| cadastro_resolver_viacep::VIACEP_API_BASE.to_string()),
            lookup_timeout_secs: env::var("CADASTRO_LOOKUP_TIMEOUT_SECS")
                .ok()
                .map(|s| s.parse().unwrap_or(5))
                .unwrap_or(5),
            create_fallback: env::var("CADASTRO_CREATE_FALLBACK")
                .unwrap_or_else(|_| "placeholder".to_string()),
            export_dir: env::var("CADASTRO_EXPORT_DIR").unwrap_or_else(|_| ".".to_string()),
            log_level: env::var("CADASTRO_LOG_LEVEL").unwrap_or_else(|_| "warn".to_string()),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        match self.store_type.as_str() {
            "file" | "memory" => {}
            _ => anyhow::bail!(
                "CADASTRO_STORE_TYPE '{}' is not supported. \
                Supported types: file, memory",
                self.store_type
            ),
        }

        if self.store_type == "file" && self.store_path.is_empty() {
            anyhow::bail!(
                "CADASTRO_STORE_PATH cannot be empty when CADASTRO_STORE_TYPE=file. \
                Set it via: export CADASTRO_STORE_PATH=/var/lib/cadastro/records.json"
            );
        }

        if !self.lookup_url.starts_with("https://") && !self.lookup_url.starts_with("http://") {
            anyhow::bail!(
                "CADASTRO_LOOKUP_URL must use HTTP or HTTPS scheme. Got: {}",
                self.lookup_url
            );
        }

        if !(1..=60).contains(&self.lookup_timeout_secs) {
            anyhow::bail!(
                "CADASTRO_LOOKUP_TIMEOUT_SECS must be between 1 and 60 seconds. Got: {}",
                self.lookup_timeout_secs
            );
        }

        match self.create_fallback.as_str() {
            "placeholder" | "abort" => {}
            _ => anyhow::bail!(
                "CADASTRO_CREATE_FALLBACK '{}' is not valid. \
                Valid policies: placeholder, abort",
                self.create_fallback
            ),
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "CADASTRO_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        Ok(())
    }

    /// Build the typed core configuration
    fn to_core_config(&self) -> CadastroConfig {
        CadastroConfig {
            store: match self.store_type.as_str() {
                "memory" => StoreConfig::Memory,
                _ => StoreConfig::File {
                    path: self.store_path.clone(),
                },
            },
            lookup: LookupConfig {
                base_url: self.lookup_url.clone(),
                timeout_secs: self.lookup_timeout_secs,
            },
            service: ServiceConfig {
                create_fallback: match self.create_fallback.as_str() {
                    "abort" => CreateFallbackPolicy::Abort,
                    _ => CreateFallbackPolicy::Placeholder,
                },
                export_dir: self.export_dir.clone(),
            },
        }
    }
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return CadastroExitCode::ConfigError.into();
        }
    };

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return CadastroExitCode::ConfigError.into();
    }

    // Initialize tracing
    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return CadastroExitCode::ConfigError.into();
    }

    // Enter tokio runtime
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return CadastroExitCode::RuntimeError.into();
        }
    };

    let core_config = config.to_core_config();

    // A store that cannot be opened at startup is fatal; the registry
    // will not run without a reachable store.
    let service = match rt.block_on(build_service(&core_config)) {
        Ok(service) => service,
        Err(e) => {
            eprintln!("Startup error: {}", e);
            error!("startup failed: {}", e);
            return CadastroExitCode::ConfigError.into();
        }
    };

    info!("cadastroctl started");

    let export_dir = core_config.service.export_dir.clone();
    match menu_loop(&rt, &service, Path::new(&export_dir)) {
        Ok(()) => CadastroExitCode::CleanShutdown.into(),
        Err(e) => {
            error!("runtime error: {}", e);
            eprintln!("Fatal error: {}", e);
            CadastroExitCode::RuntimeError.into()
        }
    }
}

/// Wire the configured store and resolver into a service
async fn build_service(config: &CadastroConfig) -> Result<RecordService> {
    config.validate()?;

    let store: Box<dyn RecordStore> = match &config.store {
        StoreConfig::File { path } => {
            info!("opening file store at {}", path);
            Box::new(FileRecordStore::new(path).await?)
        }
        StoreConfig::Memory => {
            info!("using in-memory store (records are lost on exit)");
            Box::new(MemoryRecordStore::new())
        }
    };

    let resolver = ViaCepResolver::new(&config.lookup)?;

    Ok(RecordService::new(
        store,
        Box::new(resolver),
        config.service.create_fallback,
    ))
}

/// Run the interactive menu until the operator quits
///
/// Every operation error is rendered and the loop continues; only I/O
/// failures on the terminal itself abort the session.
fn menu_loop(
    rt: &tokio::runtime::Runtime,
    service: &RecordService,
    export_dir: &Path,
) -> Result<()> {
    println!("==============================================");
    println!("  cadastro - record registry");
    println!("==============================================");

    loop {
        match rt.block_on(service.counts()) {
            Ok(counts) => {
                println!();
                println!(
                    "records: {} total | {} active | {} inactive",
                    counts.total, counts.active, counts.inactive
                );
            }
            Err(e) => println!("\nerror reading record counts: {}", e),
        }

        println!("----------------------------------------------");
        println!("1. create record");
        println!("2. list active");
        println!("3. list inactive");
        println!("4. list all");
        println!("5. search (id or text)");
        println!("6. update record");
        println!("7. activate/inactivate record");
        println!("8. delete record (permanent)");
        println!("9. export to JSON");
        println!("0. quit");
        println!("----------------------------------------------");

        match prompt("option> ")?.as_str() {
            "1" => create_flow(rt, service)?,
            "2" => list_flow(rt, service, StatusFilter::ActiveOnly)?,
            "3" => list_flow(rt, service, StatusFilter::InactiveOnly)?,
            "4" => list_flow(rt, service, StatusFilter::All)?,
            "5" => search_flow(rt, service)?,
            "6" => update_flow(rt, service)?,
            "7" => set_active_flow(rt, service)?,
            "8" => delete_flow(rt, service)?,
            "9" => export_flow(rt, service, export_dir)?,
            "0" => break,
            _ => println!("invalid option"),
        }
    }

    rt.block_on(service.flush())?;
    println!("bye");
    Ok(())
}

fn create_flow(rt: &tokio::runtime::Runtime, service: &RecordService) -> Result<()> {
    let name = prompt("name: ")?;
    let description = prompt("description: ")?;
    let postal_code = prompt("postal code (8 digits): ")?;

    match rt.block_on(service.create(&name, &description, &postal_code)) {
        Ok(record) => println!(
            "created record {} | address: {}",
            record.id, record.address_line
        ),
        Err(e) => println!("error: {}", e),
    }
    Ok(())
}

fn list_flow(
    rt: &tokio::runtime::Runtime,
    service: &RecordService,
    status: StatusFilter,
) -> Result<()> {
    match rt.block_on(service.query(RecordQuery::status(status))) {
        Ok(records) => print_records(&records),
        Err(e) => println!("error: {}", e),
    }
    Ok(())
}

fn search_flow(rt: &tokio::runtime::Runtime, service: &RecordService) -> Result<()> {
    let term = prompt("term (id, name, description or address): ")?;
    match rt.block_on(service.search(&term)) {
        Ok(records) => print_records(&records),
        Err(e) => println!("error: {}", e),
    }
    Ok(())
}

fn update_flow(rt: &tokio::runtime::Runtime, service: &RecordService) -> Result<()> {
    let Some(id) = prompt_id()? else {
        return Ok(());
    };

    let request = UpdateRequest {
        name: Some(prompt("new name (blank keeps current): ")?),
        description: Some(prompt("new description (blank keeps current): ")?),
        postal_code: Some(prompt("new postal code (blank keeps current): ")?),
    };

    match rt.block_on(service.update(id, request)) {
        Ok(UpdateOutcome::Applied(record)) => println!(
            "record {} updated | address: {}",
            record.id, record.address_line
        ),
        Ok(UpdateOutcome::NoChanges(_)) => println!("no changes applied"),
        Err(e) => println!("error: {}", e),
    }
    Ok(())
}

fn set_active_flow(rt: &tokio::runtime::Runtime, service: &RecordService) -> Result<()> {
    let Some(id) = prompt_id()? else {
        return Ok(());
    };

    let active = match prompt("a to activate, i to inactivate: ")?.to_lowercase().as_str() {
        "a" => true,
        "i" => false,
        _ => {
            println!("error: use 'a' to activate or 'i' to inactivate");
            return Ok(());
        }
    };

    match rt.block_on(service.set_active(id, active)) {
        Ok(record) => println!(
            "record {} is now {}",
            record.id,
            if record.active { "ACTIVE" } else { "INACTIVE" }
        ),
        Err(e) => println!("error: {}", e),
    }
    Ok(())
}

fn delete_flow(rt: &tokio::runtime::Runtime, service: &RecordService) -> Result<()> {
    let Some(id) = prompt_id()? else {
        return Ok(());
    };

    // Destructive and irreversible: require explicit confirmation
    let confirm = prompt(&format!("permanently delete record {}? (y/N): ", id))?;
    if confirm.to_lowercase() != "y" {
        println!("delete cancelled");
        return Ok(());
    }

    match rt.block_on(service.delete(id)) {
        Ok(()) => println!("record {} deleted", id),
        Err(e) => println!("error: {}", e),
    }
    Ok(())
}

fn export_flow(
    rt: &tokio::runtime::Runtime,
    service: &RecordService,
    export_dir: &Path,
) -> Result<()> {
    println!("1. export active");
    println!("2. export inactive");
    println!("3. export all");
    let status = match prompt("option> ")?.as_str() {
        "1" => StatusFilter::ActiveOnly,
        "2" => StatusFilter::InactiveOnly,
        "3" => StatusFilter::All,
        _ => {
            println!("invalid option");
            return Ok(());
        }
    };

    match rt.block_on(service.export(status, export_dir)) {
        Ok(ExportOutcome::Written { path, count }) => {
            println!("exported {} record(s) to {}", count, path.display());
        }
        Ok(ExportOutcome::NothingToExport) => {
            println!("no records matched the filter; nothing exported");
        }
        Err(e) => println!("error: {}", e),
    }
    Ok(())
}

fn print_records(records: &[Record]) {
    if records.is_empty() {
        println!("no records found");
        return;
    }
    for record in records {
        println!(
            "ID: {} | {} | {} | postal code: {} | {}",
            record.id,
            record.name,
            if record.active { "ACTIVE" } else { "INACTIVE" },
            record.postal_code,
            record.address_line
        );
    }
}

/// Print a label and read one trimmed line from stdin
fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Prompt for a record id; None means the input wasn't a number
fn prompt_id() -> Result<Option<i64>> {
    let raw = prompt("record id: ")?;
    match raw.parse() {
        Ok(id) => Ok(Some(id)),
        Err(_) => {
            println!("error: id must be an integer");
            Ok(None)
        }
    }
}
