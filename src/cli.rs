use std::path::PathBuf;
use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{error, info, warn};
use crate::app_system::RegisterSystem;
use crate::clients::Recovery;
use crate::domain::{Cart, Money, Product, ProductCreate, ProductPatch, Quantity, Sale};
use crate::reports::{Dashboard, Report, ReportOptions};
use crate::session::Session;

#[derive(Parser, Debug)]
#[command(name = "register", version, about = "Single-register point of sale")]
pub struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, env = "REGISTER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Overrides `data_dir` from the configuration
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Keep everything in memory for this run
    #[arg(long, global = true)]
    pub in_memory: bool,

    #[arg(long, short = 'u', global = true, env = "REGISTER_USER", default_value = "cashier")]
    pub user: String,

    #[arg(long, short = 'p', global = true, env = "REGISTER_PASSWORD", hide_env_values = true, default_value = "")]
    pub password: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage the product catalog
    #[command(subcommand)]
    Products(ProductsCommand),
    /// Ring up products and check out. Each item is `<product id>` or
    /// `<product id>:<quantity>`
    Sell {
        #[arg(required = true)]
        items: Vec<String>,
    },
    /// Browse recorded sales
    #[command(subcommand)]
    Sales(SalesCommand),
    /// Revenue, daily totals, top sellers and low stock
    Report(OutputArgs),
    /// Summary cards and the last seven days
    Dashboard(OutputArgs),
    /// Resolve a checkout left unfinished by a previous run
    Recover,
    /// Seed a small catalog in memory and run one checkout
    Demo,
}

#[derive(Subcommand, Debug)]
pub enum ProductsCommand {
    List(OutputArgs),
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        price: Money,
        #[arg(long, allow_negative_numbers = true)]
        stock: i64,
    },
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        price: Option<Money>,
        #[arg(long, allow_negative_numbers = true)]
        stock: Option<i64>,
    },
    Delete {
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum SalesCommand {
    List(OutputArgs),
    Show { id: String },
}

#[derive(Args, Debug, Clone, Copy)]
pub struct OutputArgs {
    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

pub async fn run(command: Command, system: &RegisterSystem, session: &Session, options: &ReportOptions) -> Result<()> {
    match command {
        Command::Products(cmd) => products(cmd, system, session).await,
        Command::Sell { items } => sell(&items, system).await,
        Command::Sales(cmd) => sales(cmd, system).await,
        Command::Report(output) => {
            let (sales, products) = snapshot(system).await?;
            let report = Report::build(&sales, &products, options);
            if output.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
            Ok(())
        }
        Command::Dashboard(output) => {
            let (sales, products) = snapshot(system).await?;
            let today = chrono::Utc::now().date_naive();
            let dashboard = Dashboard::build(&sales, &products, options.low_stock_threshold, today);
            if output.json {
                println!("{}", serde_json::to_string_pretty(&dashboard)?);
            } else {
                println!("Total sales:        {}", dashboard.total_sales);
                println!("Total products:     {}", dashboard.product_count);
                println!("Low stock products: {}", dashboard.low_stock_count);
                for day in &dashboard.last_seven_days {
                    println!("  {}  {}", day.date, day.total);
                }
            }
            Ok(())
        }
        Command::Recover => {
            // recovery already ran during startup
            match &system.recovery {
                Recovery::Clean => println!("No unfinished checkout"),
                Recovery::RolledForward { checkout_id, sale_id } => {
                    println!("Checkout {} was recorded as sale {}", checkout_id, sale_id)
                }
                Recovery::RolledBack { checkout_id, restocked } => {
                    println!("Checkout {} rolled back, {} stock change(s) restored", checkout_id, restocked.len())
                }
            }
            Ok(())
        }
        Command::Demo => demo(system).await,
    }
}

async fn products(cmd: ProductsCommand, system: &RegisterSystem, session: &Session) -> Result<()> {
    let client = &system.product_client;
    match cmd {
        ProductsCommand::List(output) => {
            let products = client.list_products().await?;
            if output.json {
                println!("{}", serde_json::to_string_pretty(&products)?);
            } else {
                print_products(&products);
            }
        }
        ProductsCommand::Add { name, price, stock } => {
            session.require_admin("add product")?;
            let stock = Quantity::try_from(stock)?;
            let id = client.create_product(ProductCreate::new(name, price, stock)).await?;
            println!("{}", id);
        }
        ProductsCommand::Update { id, name, price, stock } => {
            session.require_admin("update product")?;
            let patch = ProductPatch {
                name,
                price,
                stock: stock.map(Quantity::try_from).transpose()?,
            };
            if patch.is_empty() {
                bail!("nothing to update: pass --name, --price or --stock");
            }
            let product = client.update_product(id, patch).await?;
            print_products(std::slice::from_ref(&product));
        }
        ProductsCommand::Delete { id } => {
            session.require_admin("delete product")?;
            client.delete_product(id.clone()).await?;
            println!("Deleted {}", id);
        }
    }
    Ok(())
}

/// Builds a cart from `<id>[:<qty>]` tokens against the current catalog.
pub fn fill_cart(cart: &mut Cart, catalog: &[Product], items: &[String]) -> Result<()> {
    for token in items {
        let (id, quantity) = match token.split_once(':') {
            Some((id, qty)) => {
                let qty: i64 = qty.parse().with_context(|| format!("invalid quantity in {:?}", token))?;
                (id, Some(qty))
            }
            None => (token.as_str(), None),
        };
        let Some(product) = catalog.iter().find(|p| p.id == id) else {
            warn!(product_id = id, "Product not found");
            eprintln!("Product not found: {}", id);
            continue;
        };
        if !product.in_stock() {
            warn!(product_id = id, "Product is out of stock");
            eprintln!("Product is out of stock: {}", id);
            continue;
        }
        cart.add(product);
        if let Some(qty) = quantity {
            let current = cart.line(id).map(|line| i64::from(line.quantity)).unwrap_or(0);
            // `id:qty` adds qty units on top of anything already rung up
            cart.set_quantity(id, current.saturating_sub(1).saturating_add(qty));
        }
    }
    Ok(())
}

async fn sell(items: &[String], system: &RegisterSystem) -> Result<()> {
    let catalog = system.product_client.list_products().await?;
    let mut cart = Cart::new();
    fill_cart(&mut cart, &catalog, items)?;

    for line in cart.lines() {
        info!(product_id = %line.product_id, quantity = line.quantity, subtotal = %line.subtotal(), "In cart");
    }

    match system.checkout_client.checkout(&mut cart).await {
        Ok(outcome) => {
            if !outcome.printed {
                println!("{}", outcome.receipt.text);
            }
            eprintln!("Checkout successful: sale {} recorded, total {}", outcome.sale.id, outcome.sale.total);
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Checkout failed");
            bail!("Checkout failed. An error occurred during checkout, please try again.")
        }
    }
}

async fn sales(cmd: SalesCommand, system: &RegisterSystem) -> Result<()> {
    match cmd {
        SalesCommand::List(output) => {
            let sales = system.sale_client.list_sales().await?;
            if output.json {
                println!("{}", serde_json::to_string_pretty(&sales)?);
            } else {
                println!("{:<16} {:<20} {:>6} {:>10}", "ID", "DATE", "ITEMS", "TOTAL");
                for sale in &sales {
                    println!(
                        "{:<16} {:<20} {:>6} {:>10}",
                        sale.id,
                        sale.date.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M:%S"),
                        sale.item_count(),
                        sale.total.to_string()
                    );
                }
            }
        }
        SalesCommand::Show { id } => {
            let Some(sale) = system.sale_client.get_sale(id.clone()).await? else {
                bail!("Sale not found: {}", id);
            };
            print_sale(&sale);
        }
    }
    Ok(())
}

async fn snapshot(system: &RegisterSystem) -> Result<(Vec<Sale>, Vec<Product>)> {
    let sales = system.sale_client.list_sales().await?;
    let products = system.product_client.list_products().await?;
    Ok((sales, products))
}

async fn demo(system: &RegisterSystem) -> Result<()> {
    let client = &system.product_client;
    let bread = client
        .create_product(ProductCreate::new("Bread", Money::from_cents(250), Quantity::new(20)))
        .await?;
    let milk = client
        .create_product(ProductCreate::new("Milk", Money::from_cents(100), Quantity::new(12)))
        .await?;
    client
        .create_product(ProductCreate::new("Eggs", Money::from_cents(320), Quantity::new(4)))
        .await?;

    sell(&[format!("{}:2", bread), format!("{}:3", milk)], system).await?;

    print_products(&client.list_products().await?);
    let (sales, products) = snapshot(system).await?;
    print_report(&Report::build(&sales, &products, &ReportOptions::default()));
    Ok(())
}

fn print_products(products: &[Product]) {
    println!("{:<14} {:<24} {:>10} {:>7}", "ID", "NAME", "PRICE", "STOCK");
    for p in products {
        println!("{:<14} {:<24} {:>10} {:>7}", p.id, p.name, p.price.to_string(), p.stock.get());
    }
}

fn print_sale(sale: &Sale) {
    println!("Sale {}", sale.id);
    println!("Date: {}", sale.date.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M:%S"));
    for item in &sale.items {
        println!("  {} - Quantity: {} - Price: {}", item.name, item.quantity, item.price);
    }
    println!("Total: {}", sale.total);
}

fn print_report(report: &Report) {
    println!("Total revenue:       {}", report.total_revenue);
    println!("Average order value: {}", report.average_order_value);
    println!("Sales by date:");
    for day in &report.sales_by_date {
        println!("  {}  {}", day.date, day.total);
    }
    println!("Top selling products:");
    for product in &report.top_selling_products {
        println!("  {} ({})", product.name, product.quantity);
    }
    println!("Low stock:");
    for product in &report.low_stock {
        println!("  {} - Current Stock: {}", product.name, product.stock);
    }
}
