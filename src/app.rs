use color_eyre::{eyre::eyre, Result};
use serde::Serialize;
use std::io::Write;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::catalog::{
  CatalogBrand, CatalogEntity, CatalogItem, CatalogService, CatalogType, CreateCatalogBrandRequest,
  CreateCatalogItemRequest, CreateCatalogTypeRequest,
};
use crate::commands::{self, Command, ItemAction, NamedAction};
use crate::config::Config;
use crate::db::LocalStorage;
use crate::session::Session;

const FAILED: &str = "operation failed or returned nothing";

/// Longest wait for telemetry still in flight at exit
const TELEMETRY_DRAIN: Duration = Duration::from_secs(3);

/// Command-line front end over one session
pub struct App {
  session: Session,
}

impl App {
  pub fn new(config: &Config) -> Result<Self> {
    clear_local_storage(config);
    let session = Session::build(config)?;
    Ok(Self { session })
  }

  /// Run a command. Returns false if it produced no result.
  pub async fn run(&self, command: Command) -> Result<bool> {
    match command {
      Command::Shell => self.run_shell().await,
      command => self.execute(command).await,
    }
  }

  /// Deliver outstanding telemetry before the runtime stops.
  pub async fn shutdown(&self) {
    self.session.shutdown(TELEMETRY_DRAIN).await;
  }

  async fn run_shell(&self) -> Result<bool> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
      prompt();
      let Some(line) = lines
        .next_line()
        .await
        .map_err(|e| eyre!("Failed to read from stdin: {}", e))?
      else {
        break;
      };

      let line = line.trim();
      if matches!(line, "exit" | "quit") {
        break;
      }

      match commands::parse_shell_line(line) {
        Ok(None) => {}
        Ok(Some(Command::Shell)) => eprintln!("Already in a shell"),
        Ok(Some(command)) => {
          if let Err(e) = self.execute(command).await {
            tracing::warn!("Shell command failed: {}", e);
            eprintln!("error: {}", e);
          }
        }
        Err(message) => eprintln!("{}", message),
      }
    }

    Ok(true)
  }

  async fn execute(&self, command: Command) -> Result<bool> {
    match command {
      Command::Brands { action } => {
        run_named(
          self.session.brands.as_ref(),
          action,
          |name| CreateCatalogBrandRequest { name },
          |id, name| CatalogBrand { id, name },
        )
        .await
      }
      Command::Types { action } => {
        run_named(
          self.session.types.as_ref(),
          action,
          |name| CreateCatalogTypeRequest { name },
          |id, name| CatalogType { id, name },
        )
        .await
      }
      Command::Items { action } => self.run_items(action).await,
      Command::Shell => Err(eyre!("Shell cannot be nested")),
    }
  }

  async fn run_items(&self, action: ItemAction) -> Result<bool> {
    let items = self.session.items.as_ref();

    match action {
      ItemAction::List { detailed: true } => emit(self.session.list_items_detailed().await?),
      ItemAction::List { detailed: false } => emit(items.list().await?),
      ItemAction::Get { id } => emit(items.get(id).await?),
      ItemAction::Create {
        name,
        price,
        brand,
        type_id,
        description,
        picture_uri,
      } => {
        let request = CreateCatalogItemRequest {
          catalog_brand_id: brand,
          catalog_type_id: type_id,
          name,
          description,
          price,
          picture_uri,
        };
        emit(items.create(&request).await?)
      }
      ItemAction::Update {
        id,
        name,
        price,
        brand,
        type_id,
        description,
        picture_uri,
      } => {
        let Some(current) = items.get(id).await? else {
          return emit(None::<CatalogItem>);
        };

        let changed = CatalogItem {
          id,
          name: name.unwrap_or(current.name),
          description: description.or(current.description),
          price: price.unwrap_or(current.price),
          picture_uri: picture_uri.or(current.picture_uri),
          catalog_brand_id: brand.unwrap_or(current.catalog_brand_id),
          catalog_type_id: type_id.unwrap_or(current.catalog_type_id),
        };
        emit(items.update(&changed).await?)
      }
      ItemAction::Delete { id } => emit(items.delete(id).await?),
    }
  }
}

async fn run_named<E: CatalogEntity>(
  service: &dyn CatalogService<E>,
  action: NamedAction,
  create: impl FnOnce(String) -> E::Create,
  entity: impl FnOnce(i32, String) -> E,
) -> Result<bool> {
  match action {
    NamedAction::List => emit(service.list().await?),
    NamedAction::Get { id } => emit(service.get(id).await?),
    NamedAction::Create { name } => emit(service.create(&create(name)).await?),
    NamedAction::Update { id, name } => emit(service.update(&entity(id, name)).await?),
    NamedAction::Delete { id } => emit(service.delete(id).await?),
  }
}

/// Print a result as JSON, or report that there was none.
fn emit<T: Serialize>(value: Option<T>) -> Result<bool> {
  match value {
    Some(value) => {
      let json = serde_json::to_string_pretty(&value)
        .map_err(|e| eyre!("Failed to format output: {}", e))?;
      println!("{}", json);
      Ok(true)
    }
    None => {
      eprintln!("{}", FAILED);
      Ok(false)
    }
  }
}

fn prompt() {
  eprint!("catalog-admin> ");
  let _ = std::io::stderr().flush();
}

/// Local storage is outside the session; trouble with it is logged, not fatal.
fn clear_local_storage(config: &Config) {
  let cleared =
    LocalStorage::open(config.local_storage.path.as_deref()).and_then(|storage| storage.clear_on_startup());

  if let Err(e) = cleared {
    tracing::warn!("Could not clear local storage: {}", e);
  }
}
