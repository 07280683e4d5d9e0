//! Command handlers for the admin console CLI.
//!
//! Each subcommand plays the role of one of the console's screens: it
//! calls accessors and renders the result. Reads degrade silently to their
//! empty defaults; failed writes surface as errors, the CLI's failure
//! dialog.
use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::Subcommand;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info};

use crate::api::model::{ListFilter, ListPage, LoginOutcome};
use crate::api::{ApiClient, ApiError};
use crate::guard::{self, Access};
use crate::poller;

static EMAIL_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in and persist the session
    Login {
        email: String,
        /// Password; prompted on stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Clear the persisted session
    Logout,
    /// Show the cached admin profile
    Whoami,
    /// Order management
    #[command(subcommand)]
    Orders(OrdersCmd),
    /// Product catalog
    #[command(subcommand)]
    Products(ProductsCmd),
    /// Categories and sub-categories
    Categories,
    /// Customer list
    Customers {
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        search: Option<String>,
    },
    /// Brand list
    Brands,
    /// Coupon list
    Coupons,
    /// Delivery zones
    #[command(subcommand)]
    Zones(ZonesCmd),
    /// Support tickets
    #[command(subcommand)]
    Tickets(TicketsCmd),
    /// Platform-wide counters
    Stats,
    /// Counters plus cart-recovery overview
    Dashboard,
    /// Notification bell
    #[command(subcommand)]
    Notifications(NotificationsCmd),
    /// Upload an image asset, printing its URL
    Upload { file: PathBuf },
}

#[derive(Debug, Subcommand)]
pub enum OrdersCmd {
    List {
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        status: Option<String>,
    },
    Show {
        id: i64,
    },
    Status {
        id: i64,
        status: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum ProductsCmd {
    List {
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        search: Option<String>,
    },
    /// Create or update a product from a JSON draft file
    Save {
        file: PathBuf,
    },
    Delete {
        id: i64,
    },
}

#[derive(Debug, Subcommand)]
pub enum ZonesCmd {
    List,
    /// Toggle surge pricing for a zone
    Surge {
        id: i64,
        multiplier: f64,
        #[arg(long)]
        off: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum TicketsCmd {
    List,
    Reply { id: i64, message: String },
}

#[derive(Debug, Subcommand)]
pub enum NotificationsCmd {
    History,
    /// Poll for new notifications until interrupted
    Watch,
}

fn requires_auth(cmd: &Command) -> bool {
    !matches!(cmd, Command::Login { .. } | Command::Logout)
}

pub async fn run(client: &ApiClient, poll_interval: Duration, cmd: Command) -> Result<()> {
    if requires_auth(&cmd) && guard::check(client.session()) == Access::RedirectToLogin {
        bail!("not signed in; run `ec-admin login <email>` first");
    }

    match cmd {
        Command::Login { email, password } => login(client, &email, password).await,
        Command::Logout => {
            client.logout();
            println!("signed out");
            Ok(())
        }
        Command::Whoami => whoami(client),
        Command::Orders(cmd) => orders(client, cmd).await,
        Command::Products(cmd) => products(client, cmd).await,
        Command::Categories => categories(client).await,
        Command::Customers { page, limit, search } => {
            let filter = ListFilter {
                page,
                limit,
                search,
                ..Default::default()
            };
            print_page("customers", client.customers(&filter).await)
        }
        Command::Brands => print_rows("brands", client.brands().await),
        Command::Coupons => print_rows("coupons", client.coupons().await),
        Command::Zones(cmd) => zones(client, cmd).await,
        Command::Tickets(cmd) => tickets(client, cmd).await,
        Command::Stats => {
            print_json(&serde_json::to_value(client.stats().await)?);
            Ok(())
        }
        Command::Dashboard => dashboard(client).await,
        Command::Notifications(cmd) => notifications(client, poll_interval, cmd).await,
        Command::Upload { file } => match client.upload_image(&file).await {
            Ok(url) => {
                println!("{}", url);
                Ok(())
            }
            Err(err) => {
                error!(error = %err, "upload failed");
                Err(anyhow::Error::new(err).context("upload failed"))
            }
        },
    }
}

async fn login(client: &ApiClient, email: &str, password: Option<String>) -> Result<()> {
    if !EMAIL_SHAPE.is_match(email) {
        bail!("'{}' does not look like an email address", email);
    }
    let password = match password {
        Some(p) => p,
        None => prompt_password()?,
    };
    if password.is_empty() {
        bail!("password must not be empty");
    }

    match client.login(email, &password).await {
        LoginOutcome::Success => {
            let name = client
                .session()
                .user()
                .and_then(|u| u.get("name").and_then(Value::as_str).map(str::to_owned))
                .unwrap_or_else(|| email.to_string());
            info!("session persisted");
            println!("signed in as {}", name);
            Ok(())
        }
        LoginOutcome::Failure { message } => bail!(message),
    }
}

fn whoami(client: &ApiClient) -> Result<()> {
    match client.session().user() {
        Some(user) => {
            print_json(&user);
            Ok(())
        }
        None => {
            println!("signed in, but no cached profile");
            Ok(())
        }
    }
}

async fn orders(client: &ApiClient, cmd: OrdersCmd) -> Result<()> {
    match cmd {
        OrdersCmd::List {
            page,
            limit,
            search,
            status,
        } => {
            let filter = ListFilter {
                page,
                limit,
                search,
                status,
                ..Default::default()
            };
            let page = client.orders(&filter).await;
            for order in &page.data {
                println!(
                    "#{} {} {} {}",
                    order.get("id").cloned().unwrap_or(Value::Null),
                    field(order, "customer"),
                    field(order, "date"),
                    field(order, "type"),
                );
            }
            print_meta(&page);
            Ok(())
        }
        OrdersCmd::Show { id } => match client.order(id).await {
            Some(order) => {
                print_json(&order);
                Ok(())
            }
            None => {
                println!("order {} not found", id);
                Ok(())
            }
        },
        OrdersCmd::Status { id, status } => {
            confirm_write("order status update", client.update_order_status(id, &status).await)
        }
    }
}

async fn products(client: &ApiClient, cmd: ProductsCmd) -> Result<()> {
    match cmd {
        ProductsCmd::List { page, limit, search } => {
            let filter = ListFilter {
                page,
                limit,
                search,
                ..Default::default()
            };
            let page = client.products(&filter).await;
            for product in &page.data {
                println!(
                    "#{} {} [{}] qty={}",
                    product.get("id").cloned().unwrap_or(Value::Null),
                    field(product, "name"),
                    field(product, "status"),
                    product.get("quantity").cloned().unwrap_or(json!(0)),
                );
            }
            print_meta(&page);
            Ok(())
        }
        ProductsCmd::Save { file } => {
            let draft = load_draft(&file)?;
            confirm_write("product save", client.save_product(&draft).await)
        }
        ProductsCmd::Delete { id } => confirm_write("product delete", client.delete_product(id).await),
    }
}

async fn categories(client: &ApiClient) -> Result<()> {
    let cats = client.categories().await;
    let subs = client.sub_categories().await;
    for cat in &cats {
        println!("{} {}", cat.get("id").cloned().unwrap_or(Value::Null), field(cat, "name"));
        for sub in &subs {
            if sub.get("parent_id") == cat.get("id") {
                println!(
                    "  └ {} {}",
                    sub.get("id").cloned().unwrap_or(Value::Null),
                    field(sub, "name")
                );
            }
        }
    }
    println!("{} categories, {} sub-categories", cats.len(), subs.len());
    Ok(())
}

async fn zones(client: &ApiClient, cmd: ZonesCmd) -> Result<()> {
    match cmd {
        ZonesCmd::List => print_rows("zones", client.zones().await),
        ZonesCmd::Surge { id, multiplier, off } => confirm_write(
            "surge toggle",
            client.toggle_surge(id, !off, multiplier).await,
        ),
    }
}

async fn tickets(client: &ApiClient, cmd: TicketsCmd) -> Result<()> {
    match cmd {
        TicketsCmd::List => print_rows("tickets", client.tickets().await),
        TicketsCmd::Reply { id, message } => {
            confirm_write("ticket reply", client.reply_to_ticket(id, &message).await)
        }
    }
}

async fn dashboard(client: &ApiClient) -> Result<()> {
    let (stats, automation) = futures::future::join(client.stats(), client.automation_stats()).await;
    print_json(&json!({ "platform": stats, "automation": automation }));
    Ok(())
}

async fn notifications(
    client: &ApiClient,
    poll_interval: Duration,
    cmd: NotificationsCmd,
) -> Result<()> {
    match cmd {
        NotificationsCmd::History => print_rows("notifications", client.notification_history().await),
        NotificationsCmd::Watch => {
            info!(interval_ms = poll_interval.as_millis() as u64, "watching notifications");
            poller::watch(client, poll_interval, |entry| {
                println!("{} {}", field(entry, "title"), field(entry, "message"));
            })
            .await;
            Ok(())
        }
    }
}

/// Reads a JSON draft file, stamping a millisecond draft id onto records
/// that do not carry one yet so the save routes to create.
fn load_draft(path: &Path) -> Result<Value> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read draft {}", path.display()))?;
    let mut record: Value =
        serde_json::from_str(&raw).with_context(|| format!("invalid JSON in {}", path.display()))?;
    if let Some(map) = record.as_object_mut() {
        if !map.contains_key("id") {
            map.insert("id".into(), json!(Utc::now().timestamp_millis()));
        }
    }
    Ok(record)
}

fn confirm_write(action: &str, result: Result<Value, ApiError>) -> Result<()> {
    match result {
        Ok(body) => {
            if !body.is_null() {
                print_json(&body);
            }
            info!("{} succeeded", action);
            Ok(())
        }
        Err(err) => {
            error!(error = %err, "{} failed", action);
            Err(anyhow::Error::new(err).context(format!("{} failed", action)))
        }
    }
}

fn prompt_password() -> Result<String> {
    print!("password: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end().to_string())
}

fn field<'a>(record: &'a Value, key: &str) -> &'a str {
    record.get(key).and_then(Value::as_str).unwrap_or("-")
}

fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(rendered) => println!("{}", rendered),
        Err(_) => println!("{}", value),
    }
}

fn print_rows(label: &str, rows: Vec<Value>) -> Result<()> {
    for row in &rows {
        print_json(row);
    }
    println!("{} {}", rows.len(), label);
    Ok(())
}

fn print_page(label: &str, page: ListPage) -> Result<()> {
    for row in &page.data {
        print_json(row);
    }
    print_meta(&page);
    println!("{} shown: {}", label, page.data.len());
    Ok(())
}

fn print_meta(page: &ListPage) {
    println!(
        "page {}/{} ({} total)",
        page.meta.page, page.meta.total_pages, page.meta.total
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn email_shape_check() {
        assert!(EMAIL_SHAPE.is_match("admin@example.com"));
        assert!(!EMAIL_SHAPE.is_match("not-an-email"));
        assert!(!EMAIL_SHAPE.is_match("a@b"));
        assert!(!EMAIL_SHAPE.is_match("spaces in@here.com"));
    }

    #[test]
    fn drafts_without_id_get_a_millisecond_stamp() {
        let td = tempdir().unwrap();
        let path = td.path().join("draft.json");
        std::fs::write(&path, r#"{ "name": "Cold Brew", "quantity": "12" }"#).unwrap();

        let draft = load_draft(&path).unwrap();
        let id = draft["id"].as_i64().unwrap();
        // Millisecond timestamps are 13 digits, far above any id ceiling.
        assert!(id > 1_000_000_000_000);
    }

    #[test]
    fn drafts_with_id_are_left_alone() {
        let td = tempdir().unwrap();
        let path = td.path().join("draft.json");
        std::fs::write(&path, r#"{ "id": 42, "name": "Espresso" }"#).unwrap();

        let draft = load_draft(&path).unwrap();
        assert_eq!(draft["id"], 42);
    }
}
