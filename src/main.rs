use clap::{Args, Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use paygate::application::catalog::StatusCatalog;
use paygate::application::executor::PaymentExecutor;
use paygate::application::hierarchy::StatusHierarchy;
use paygate::application::methods::PaymentMethodManager;
use paygate::application::workflow::{PayOutcome, PaymentWorkflow};
use paygate::config::Settings;
use paygate::domain::access::Account;
use paygate::domain::payment::Payment;
use paygate::domain::ports::SharedPaymentStore;
use paygate::domain::status::{StatusDefinition, StatusKind};
use paygate::infrastructure::clock::SystemClock;
use paygate::infrastructure::currency::InMemoryCurrencyStore;
use paygate::infrastructure::in_memory::InMemoryPaymentStore;
#[cfg(feature = "storage-rocksdb")]
use paygate::infrastructure::rocksdb::RocksDBStore;
use paygate::interfaces::csv::status_reader::StatusReader;
use paygate::interfaces::csv::status_writer::StatusWriter;
use paygate::interfaces::json;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON settings file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log filter, overridden by RUST_LOG
    #[arg(long)]
    log_level: Option<String>,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct CatalogArgs {
    /// CSV file with additional statuses (id,label,parent,description)
    #[arg(long)]
    catalog: Option<PathBuf>,
}

#[derive(Args)]
struct PaymentArgs {
    /// JSON array of payment method configurations
    #[arg(long)]
    methods: PathBuf,

    /// JSON payment
    #[arg(long)]
    payment: PathBuf,

    /// Payment method configuration id
    #[arg(long)]
    method: String,

    #[arg(long, default_value_t = 0)]
    account_id: u64,

    /// Permission held by the account, may be repeated
    #[arg(long = "permission")]
    permissions: Vec<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Lists the direct children of a status
    Children {
        kind: String,
        #[command(flatten)]
        catalog: CatalogArgs,
    },
    /// Lists all descendants of a status, breadth first
    Descendants {
        kind: String,
        #[command(flatten)]
        catalog: CatalogArgs,
    },
    /// Lists the ancestors of a status, nearest first
    Ancestors {
        kind: String,
        #[command(flatten)]
        catalog: CatalogArgs,
    },
    /// Tells whether a status is, or descends from, another
    IsA {
        kind: String,
        ancestor: String,
        /// Only proper ancestors count
        #[arg(long)]
        strict: bool,
        #[command(flatten)]
        catalog: CatalogArgs,
    },
    /// Checks whether the account may execute the payment with the method
    Access {
        #[command(flatten)]
        payment: PaymentArgs,
    },
    /// Authorizes and executes the payment with the method.
    ///
    /// Claim codes printed for interrupted payments are held only by this
    /// process, so they cannot be redeemed by a later CLI invocation.
    Pay {
        #[command(flatten)]
        payment: PaymentArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::from_file(path).into_diagnostic()?,
        None => Settings::default(),
    };
    let log_level = cli.log_level.as_deref().unwrap_or(&settings.log_level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    match cli.command {
        Command::Children { kind, catalog } => {
            let hierarchy = load_hierarchy(&catalog)?;
            let children = hierarchy.children(&StatusKind::new(kind)).into_diagnostic()?;
            write_statuses(&hierarchy, &children)
        }
        Command::Descendants { kind, catalog } => {
            let hierarchy = load_hierarchy(&catalog)?;
            let descendants = hierarchy.descendants(&StatusKind::new(kind)).into_diagnostic()?;
            write_statuses(&hierarchy, &descendants)
        }
        Command::Ancestors { kind, catalog } => {
            let hierarchy = load_hierarchy(&catalog)?;
            let ancestors = hierarchy.ancestors(&StatusKind::new(kind)).into_diagnostic()?;
            write_statuses(&hierarchy, &ancestors)
        }
        Command::IsA {
            kind,
            ancestor,
            strict,
            catalog,
        } => {
            let hierarchy = load_hierarchy(&catalog)?;
            let (kind, ancestor) = (StatusKind::new(kind), StatusKind::new(ancestor));
            let related = if strict {
                hierarchy.has_ancestor(&kind, &ancestor)
            } else {
                hierarchy.is_or_has_ancestor(&kind, &ancestor)
            }
            .into_diagnostic()?;
            println!("{related}");
            Ok(())
        }
        Command::Access { payment: args } => {
            let catalog = Arc::new(StatusCatalog::default());
            let manager = load_methods(&args.methods, catalog)?;
            let payment = load_payment(&args.payment)?;
            let account = account(&args);

            let method = manager.create_instance(&args.method).into_diagnostic()?;
            let granted = PaymentExecutor::new()
                .can_execute(&payment, method.as_ref(), &account)
                .await
                .into_diagnostic()?;
            println!("{}", if granted { "granted" } else { "denied" });
            Ok(())
        }
        Command::Pay { payment: args } => {
            let catalog = Arc::new(StatusCatalog::default());
            let manager = load_methods(&args.methods, catalog)?;
            let payment = load_payment(&args.payment)?;
            let account = account(&args);

            let claims = settings.claim_queue(Arc::new(SystemClock));
            let workflow = PaymentWorkflow::new(
                Arc::new(manager),
                PaymentExecutor::new(),
                Arc::new(claims),
                open_store(cli.db_path.as_deref())?,
            );
            match workflow.pay(payment, &args.method, &account).await.into_diagnostic()? {
                PayOutcome::Completed { payment_id } => println!("completed {payment_id}"),
                PayOutcome::Interrupted { claim_code } => println!("interrupted {claim_code}"),
            }
            Ok(())
        }
    }
}

fn load_hierarchy(args: &CatalogArgs) -> Result<Arc<StatusHierarchy>> {
    let catalog = StatusCatalog::default();
    if let Some(path) = &args.catalog {
        let file = File::open(path).into_diagnostic()?;
        for definition in StatusReader::new(file).statuses() {
            catalog.save(definition.into_diagnostic()?).into_diagnostic()?;
        }
    }
    catalog.hierarchy().into_diagnostic()
}

fn write_statuses(hierarchy: &StatusHierarchy, kinds: &[StatusKind]) -> Result<()> {
    let definitions = kinds
        .iter()
        .map(|kind| hierarchy.definition(kind))
        .collect::<paygate::error::Result<Vec<&StatusDefinition>>>()
        .into_diagnostic()?;
    let stdout = io::stdout();
    let mut writer = StatusWriter::new(stdout.lock());
    writer.write_statuses(definitions).into_diagnostic()?;
    Ok(())
}

fn load_methods(path: &Path, catalog: Arc<StatusCatalog>) -> Result<PaymentMethodManager> {
    let manager = PaymentMethodManager::new(catalog, Arc::new(SystemClock));
    let file = File::open(path).into_diagnostic()?;
    for configuration in json::read_method_configurations(file).into_diagnostic()? {
        manager.save_configuration(configuration);
    }
    Ok(manager)
}

fn load_payment(path: &Path) -> Result<Payment> {
    let currencies = InMemoryCurrencyStore::new();
    let file = File::open(path).into_diagnostic()?;
    let payment = json::read_payment(file, &currencies).into_diagnostic()?;
    let currency = currencies.resolve_or_fallback(&payment.currency_code);
    tracing::info!(
        owner_id = payment.owner_id,
        amount = %currency.format_amount(payment.amount().into_diagnostic()?),
        "Loaded payment"
    );
    Ok(payment)
}

fn account(args: &PaymentArgs) -> Account {
    args.permissions
        .iter()
        .fold(Account::new(args.account_id), |account, permission| {
            account.with_permission(permission)
        })
}

fn open_store(db_path: Option<&Path>) -> Result<SharedPaymentStore> {
    #[cfg(feature = "storage-rocksdb")]
    if let Some(path) = db_path {
        let store = RocksDBStore::open(path).into_diagnostic()?;
        return Ok(Arc::new(store));
    }
    #[cfg(not(feature = "storage-rocksdb"))]
    if db_path.is_some() {
        tracing::warn!(
            "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not \
             enabled. Falling back to in-memory storage."
        );
    }
    Ok(Arc::new(InMemoryPaymentStore::new()))
}
