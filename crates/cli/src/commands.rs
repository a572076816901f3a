//! CLI commands

use anyhow::{Result, anyhow, bail};
use catalog_core::{AppConfig, FileStorage, HOME_PATH, LOGIN_PATH, Role, TokenStore};
use catalog_http::types::{Credentials, Product, ProductUpsert};
use catalog_http::services::ProductsError;
use catalog_http::{AuthApiService, AuthSession, CatalogClient, ProductsService};
use clap::{Args, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

use crate::config;
use crate::navigator::TerminalNavigator;

const NOT_SIGNED_IN: &str = "Not signed in. Run `catalog login` first.";
const ROLE_NOT_ALLOWED: &str =
    "Your account is not allowed to access products. Run `catalog login` with another account.";

/// Roles admitted to the products view
const PRODUCTS_ROLES: [&str; 2] = [Role::USER, Role::ADMIN];

/// Flags shared by every command
pub struct GlobalOptions {
    pub config: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub api_base_url: Option<String>,
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in and store the access token
    Login(CredentialArgs),

    /// Create a new account
    Register(CredentialArgs),

    /// Forget the stored access token
    Logout,

    /// Show the signed-in user as described by the stored token
    Whoami,

    /// Browse and manage products
    Products {
        #[command(subcommand)]
        command: ProductCommands,
    },

    /// Configuration file helpers
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Args)]
pub struct CredentialArgs {
    /// Account email address
    #[arg(long)]
    email: String,

    /// Account password
    #[arg(long, env = "CATALOG_PASSWORD", hide_env_values = true)]
    password: String,
}

#[derive(Subcommand)]
pub enum ProductCommands {
    /// List all products
    List,

    /// Show one product
    Get { id: String },

    /// Create a product (admin)
    Create(ProductArgs),

    /// Replace a product's fields (admin)
    Update {
        id: String,
        #[command(flatten)]
        product: ProductArgs,
    },

    /// Delete a product (admin)
    Delete { id: String },
}

#[derive(Args)]
pub struct ProductArgs {
    #[arg(long)]
    name: String,

    #[arg(long)]
    description: Option<String>,

    #[arg(long)]
    price: f64,

    #[arg(long)]
    stock: i64,
}

impl From<ProductArgs> for ProductUpsert {
    fn from(args: ProductArgs) -> Self {
        Self {
            name: args.name,
            description: args.description,
            price: args.price,
            stock: args.stock,
        }
    }
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Write a configuration file with default values
    Init {
        /// Output file path (defaults to <data dir>/catalog.toml)
        output: Option<PathBuf>,
    },
}

/// Everything a command needs, wired once from the configuration
struct App {
    client: CatalogClient,
    session: AuthSession,
    json: bool,
}

impl App {
    /// `view` is the path of the page the command stands in for
    fn new(options: &GlobalOptions, view: &str) -> Result<Self> {
        let app_config: AppConfig = config::load_app_config(
            options.config.as_deref(),
            options.data_dir.as_deref(),
            options.api_base_url.as_deref(),
        )?;
        debug!(base_url = %app_config.api_base_url, data_dir = %app_config.data_dir.display(), "Loaded configuration");

        let tokens = TokenStore::new(Arc::new(FileStorage::in_dir(&app_config.data_dir)));
        let navigator = Arc::new(TerminalNavigator::starting_at(view));
        let client = CatalogClient::from_config(&app_config, tokens.clone(), navigator.clone())?;
        let session = AuthSession::new(tokens, navigator, app_config.role_policy);
        session.restore();

        Ok(Self {
            client,
            session,
            json: options.json,
        })
    }

    fn auth(&self) -> AuthApiService {
        AuthApiService::new(self.client.clone(), self.session.clone())
    }

    fn products(&self) -> ProductsService {
        ProductsService::new(self.client.clone(), self.session.clone())
    }

    fn print<T: Serialize>(&self, value: &T, human: impl FnOnce() -> String) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            println!("{}", human());
        }
        Ok(())
    }

    /// Tell the user to sign in again when a request invalidated the session
    fn hint_if_signed_out(&self) {
        if self.client.is_redirecting() {
            eprintln!("Your session has expired. Run `catalog login` to sign in again.");
        }
    }
}

impl Commands {
    pub async fn execute(self, options: GlobalOptions) -> Result<()> {
        match self {
            Self::Login(args) => login(&App::new(&options, LOGIN_PATH)?, args).await,
            Self::Register(args) => register(&App::new(&options, "/register")?, args).await,
            Self::Logout => {
                App::new(&options, HOME_PATH)?.session.logout();
                println!("Signed out.");
                Ok(())
            }
            Self::Whoami => whoami(&App::new(&options, HOME_PATH)?),
            Self::Products { command } => {
                let app = App::new(&options, "/products")?;
                require_role(&app.session, &PRODUCTS_ROLES)?;
                let result = command.execute(&app).await;
                app.hint_if_signed_out();
                result
            }
            Self::Config { command } => command.execute(options),
        }
    }
}

/// Route guard for commands standing in for a protected view
fn require_role(session: &AuthSession, allowed: &[&str]) -> Result<()> {
    if !session.is_authenticated() {
        bail!(NOT_SIGNED_IN);
    }
    if !session.has_role(allowed) {
        bail!(ROLE_NOT_ALLOWED);
    }
    Ok(())
}

async fn login(app: &App, args: CredentialArgs) -> Result<()> {
    let user = app
        .auth()
        .login(&Credentials::new(args.email, args.password))
        .await?;
    app.print(&user, || {
        let role = user.role.as_ref().map_or("none", |r| r.as_str());
        format!("Signed in as {} ({role}).", user.email)
    })
}

async fn register(app: &App, args: CredentialArgs) -> Result<()> {
    app.auth()
        .register(&Credentials::new(args.email, args.password))
        .await?;
    println!("Registration successful. Run `catalog login` to sign in.");
    Ok(())
}

fn whoami(app: &App) -> Result<()> {
    let Some(user) = app.session.current_user() else {
        bail!(NOT_SIGNED_IN);
    };
    app.print(&user, || {
        let role = user.role.as_ref().map_or("none", |r| r.as_str());
        let mut line = format!("{} ({role})", user.email);
        if let Some(exp) = user.expires_at {
            let state = if user.is_expired_at(chrono::Utc::now()) {
                "expired"
            } else {
                "expires"
            };
            line.push_str(&format!(", token {state} {}", exp.to_rfc3339()));
        }
        line
    })
}

impl ProductCommands {
    async fn execute(self, app: &App) -> Result<()> {
        let products = app.products();
        match self {
            Self::List => {
                let items = products.list().await.map_err(products_failure)?;
                app.print(&items, || {
                    if items.is_empty() {
                        "No products.".to_string()
                    } else {
                        items.iter().map(format_product).collect::<Vec<_>>().join("\n")
                    }
                })
            }
            Self::Get { id } => {
                let product = products.get(&id).await.map_err(products_failure)?;
                app.print(&product, || format_product(&product))
            }
            Self::Create(args) => {
                warn_if_not_admin(&products);
                let product = products.create(&args.into()).await.map_err(products_failure)?;
                app.print(&product, || format!("Created {}", format_product(&product)))
            }
            Self::Update { id, product } => {
                warn_if_not_admin(&products);
                let product = products.update(&id, &product.into()).await.map_err(products_failure)?;
                app.print(&product, || format!("Updated {}", format_product(&product)))
            }
            Self::Delete { id } => {
                warn_if_not_admin(&products);
                products.delete(&id).await.map_err(products_failure)?;
                println!("Deleted product {id}.");
                Ok(())
            }
        }
    }
}

/// Turn a product failure into the message shown to the user
///
/// Server field errors are listed one per line below the message.
fn products_failure(error: ProductsError) -> anyhow::Error {
    let ProductsError::Api(api) = &error else {
        return error.into();
    };
    let mut message = match api.server_message() {
        Some(_) => api.message.clone(),
        None if api.is_forbidden() => "Only administrators can modify products.".to_string(),
        None if api.is_not_found() => "Product not found.".to_string(),
        None => api.message.clone(),
    };
    for violation in api.field_errors() {
        message.push_str(&format!("\n  {}: {}", violation.field, violation.message));
    }
    anyhow!(message)
}

fn warn_if_not_admin(products: &ProductsService) {
    if !products.can_manage() {
        eprintln!("Note: only administrators can modify products; the server may refuse this.");
    }
}

fn format_product(product: &Product) -> String {
    let mut line = format!(
        "{}  {}  {:.2}  stock {}",
        product.id, product.name, product.price, product.stock
    );
    if let Some(description) = product.description.as_deref().filter(|d| !d.is_empty()) {
        line.push_str(&format!("  - {description}"));
    }
    line
}

impl ConfigCommands {
    fn execute(self, options: GlobalOptions) -> Result<()> {
        match self {
            Self::Init { output } => {
                let data_dir = options
                    .data_dir
                    .clone()
                    .unwrap_or_else(catalog_core::config::default_data_dir);
                let path = output.unwrap_or_else(|| data_dir.join(config::CONFIG_FILE));
                config::generate_default_config(&path, options.data_dir)?;
                println!("Generated configuration at: {}", path.display());
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use catalog_core::{NoopNavigator, RolePolicy};
    use catalog_http::ApiError;
    use catalog_http::services::ValidationError;

    fn session_with(payload: &str, policy: RolePolicy) -> AuthSession {
        let tokens = TokenStore::in_memory();
        tokens.set(&format!(
            "eyJhbGciOiJIUzI1NiJ9.{}.sig",
            URL_SAFE_NO_PAD.encode(payload)
        ));
        AuthSession::new(tokens, Arc::new(NoopNavigator), policy)
    }

    #[test]
    fn test_products_guard_requires_sign_in() {
        let session = AuthSession::new(
            TokenStore::in_memory(),
            Arc::new(NoopNavigator),
            RolePolicy::DefaultUser,
        );
        let err = require_role(&session, &PRODUCTS_ROLES).unwrap_err();
        assert_eq!(err.to_string(), NOT_SIGNED_IN);
    }

    #[test]
    fn test_products_guard_rejects_unknown_role() {
        let session = session_with(r#"{"sub":"eve","role":"AUDITOR"}"#, RolePolicy::KnownOnly);
        let err = require_role(&session, &PRODUCTS_ROLES).unwrap_err();
        assert_eq!(err.to_string(), ROLE_NOT_ALLOWED);
    }

    #[test]
    fn test_products_guard_admits_known_roles() {
        let session = session_with(r#"{"sub":"ada","role":"ADMIN"}"#, RolePolicy::KnownOnly);
        assert!(require_role(&session, &PRODUCTS_ROLES).is_ok());

        let session = session_with(r#"{"sub":"bob"}"#, RolePolicy::DefaultUser);
        assert!(require_role(&session, &PRODUCTS_ROLES).is_ok());
    }

    #[test]
    fn test_products_failure_lists_field_errors() {
        let api = ApiError::from_response(
            400,
            Some(serde_json::json!({
                "message": "Validation failed",
                "fieldErrors": [{"field": "price", "message": "must be positive"}]
            })),
        );
        let err = products_failure(ProductsError::Api(api));
        assert_eq!(err.to_string(), "Validation failed\n  price: must be positive");
    }

    #[test]
    fn test_products_failure_explains_bare_statuses() {
        let forbidden = products_failure(ApiError::from_response(403, None).into());
        assert_eq!(forbidden.to_string(), "Only administrators can modify products.");

        let missing = products_failure(ApiError::from_response(404, None).into());
        assert_eq!(missing.to_string(), "Product not found.");

        let denied = ApiError::from_response(403, Some(serde_json::json!({"message": "Access denied"})));
        assert_eq!(products_failure(denied.into()).to_string(), "Access denied");
    }

    #[test]
    fn test_products_failure_keeps_validation_message() {
        let err = products_failure(ValidationError::NameRequired.into());
        assert_eq!(err.to_string(), "Name is required.");
    }

    #[test]
    fn test_format_product() {
        let product = Product {
            id: "p-1".into(),
            name: "Lamp".into(),
            description: Some("Warm white".into()),
            price: 9.5,
            stock: 3,
            created_at: None,
        };
        assert_eq!(
            format_product(&product),
            "p-1  Lamp  9.50  stock 3  - Warm white"
        );
    }

    #[test]
    fn test_product_args_into_upsert() {
        let upsert: ProductUpsert = ProductArgs {
            name: "Lamp".into(),
            description: None,
            price: 1.0,
            stock: 0,
        }
        .into();
        assert_eq!(upsert.name, "Lamp");
        assert_eq!(upsert.description, None);
    }
}
