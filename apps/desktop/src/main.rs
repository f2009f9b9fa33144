use std::{path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use client_core::{
    CreateForm, Entity, EntityListController, EntitySchema, FileSlots, KeyedLocalStore,
    LocalStore, NoticeLog, RecordStore, RemoteStore, SlotStorage, TableModel,
};
use shared::{
    domain::Collection,
    protocol::{InventoryItem, Supplier},
};
use tracing::info;

mod terminal;

use terminal::{format_table, print_notice, PromptDialog};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Backend {
    /// REST server with edit and delete.
    Remote,
    /// REST server, delete only.
    RemoteDeleteOnly,
    /// Local JSON slot addressed by position.
    Local,
    /// Local JSON slot with generated keys; supports edit.
    LocalKeyed,
}

#[derive(Parser, Debug)]
struct Args {
    #[arg(long, default_value = "inventory")]
    collection: Collection,
    #[arg(long, value_enum, default_value_t = Backend::Remote)]
    backend: Backend,
    #[arg(long, default_value = "http://127.0.0.1:8000")]
    server_url: String,
    /// Directory for local slots. Defaults to the per-user data directory.
    #[arg(long)]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Print the table (the default).
    List,
    Add {
        name: String,
        detail: String,
    },
    Delete {
        key: String,
    },
    /// Replace a record's fields; omitted values are prompted for.
    Edit {
        key: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        detail: Option<String>,
    },
}

fn resolve_data_dir(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir);
    }
    let base =
        dirs::data_local_dir().ok_or_else(|| anyhow!("unable to resolve local app data dir"))?;
    Ok(base.join("materials"))
}

fn build_store(args: &Args) -> Result<Arc<dyn RecordStore>> {
    match args.collection {
        Collection::Inventory => store_for::<InventoryItem>(args),
        Collection::Suppliers => store_for::<Supplier>(args),
    }
}

fn store_for<E: Entity>(args: &Args) -> Result<Arc<dyn RecordStore>> {
    let local_slots = || -> Result<Arc<dyn SlotStorage>> {
        Ok(Arc::new(FileSlots::new(resolve_data_dir(args.data_dir.clone())?)))
    };
    let store: Arc<dyn RecordStore> = match args.backend {
        Backend::Remote => Arc::new(RemoteStore::<E>::new(&args.server_url)?),
        Backend::RemoteDeleteOnly => {
            Arc::new(RemoteStore::<E>::new(&args.server_url)?.delete_only())
        }
        Backend::Local => Arc::new(LocalStore::<E>::new(local_slots()?)),
        Backend::LocalKeyed => Arc::new(KeyedLocalStore::<E>::new(local_slots()?)),
    };
    Ok(store)
}

async fn run(args: Args, table: Arc<TableModel>, notices: Arc<NoticeLog>) -> Result<()> {
    let store = build_store(&args)?;
    let dialog = match &args.command {
        Some(Command::Edit { name, detail, .. }) => PromptDialog::new(name.clone(), detail.clone()),
        _ => PromptDialog::new(None, None),
    };
    let controller = EntityListController::new(store, table.clone())
        .with_dialog(Arc::new(dialog))
        .with_notices(notices);
    info!(collection = %args.collection, backend = ?args.backend, "opening list");

    controller.initialize().await?;
    let scheme = controller.store().key_scheme();

    match args.command.unwrap_or(Command::List) {
        Command::List => {}
        Command::Add { name, detail } => {
            let mut form = CreateForm::new(name, detail);
            let outcome = controller.on_create_submit(&mut form).await?;
            info!(?outcome, "add finished");
        }
        Command::Delete { key } => {
            let key = scheme.parse(&key)?;
            controller.on_delete_click(&key).await?;
        }
        Command::Edit { key, .. } => {
            let key = scheme.parse(&key)?;
            let row = table
                .row_for(&key)
                .with_context(|| format!("no record with key {key}"))?;
            let outcome = controller.on_edit_click(&key, &row.fields).await?;
            info!(?outcome, "edit finished");
        }
    }

    print!("{}", format_table(controller.schema(), &table.rows()));
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    let schema = schema_for(args.collection);
    let table = Arc::new(TableModel::new());
    let notices = Arc::new(NoticeLog::new());

    let result = run(args, table.clone(), notices.clone()).await;
    let raised = notices.drain();
    for notice in &raised {
        print_notice(notice);
    }

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            if raised.is_empty() {
                eprintln!("error: {error:#}");
            } else if !table.is_empty() {
                eprint!("{}", format_table(schema, &table.rows()));
            }
            ExitCode::FAILURE
        }
    }
}

fn schema_for(collection: Collection) -> EntitySchema {
    match collection {
        Collection::Inventory => InventoryItem::SCHEMA,
        Collection::Suppliers => Supplier::SCHEMA,
    }
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
