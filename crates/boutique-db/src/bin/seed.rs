//! # Seed Data Generator
//!
//! Fills a development database with a catalogue and two users.
//!
//! ## Usage
//! ```bash
//! # 60 products (default) into ./data/boutique.db
//! cargo run -p boutique-db --bin seed
//!
//! # Custom amount and path
//! cargo run -p boutique-db --bin seed -- --count 200 --db ./data/dev.db
//! ```
//!
//! ## Generated Data
//! - Products across collections (salon, cuisine, chambre, jardin), each
//!   in a few finishes, with deterministic prices and stock. Roughly one in
//!   ten is flagged unavailable so the catalogue filter has something to hide.
//! - `admin@boutique.local` (admin) and `client@boutique.local` (customer),
//!   keyed by the google ids printed at the end.
//!
//! The summary is printed as JSON so scripts can pick up product ids.

use serde::Serialize;
use std::env;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use boutique_db::{Database, DbConfig, NewProduct};

/// Collections and the items they contain.
const COLLECTIONS: &[(&str, &[&str])] = &[
    (
        "Salon",
        &[
            "Canapé trois places",
            "Fauteuil club",
            "Table basse",
            "Lampadaire",
            "Tapis berbère",
            "Coussin lin",
            "Étagère murale",
        ],
    ),
    (
        "Cuisine",
        &[
            "Cocotte fonte",
            "Planche à découper",
            "Service à café",
            "Carafe verre",
            "Torchons coton",
            "Moulin à poivre",
        ],
    ),
    (
        "Chambre",
        &[
            "Parure de lit",
            "Lampe de chevet",
            "Plaid laine",
            "Miroir rond",
            "Table de nuit",
        ],
    ),
    (
        "Jardin",
        &[
            "Chaise pliante",
            "Jardinière",
            "Lanterne",
            "Arrosoir zinc",
        ],
    ),
];

/// Finish variants and their price supplement in cents.
const FINISHES: &[(&str, i64)] = &[("naturel", 0), ("noir", 500), ("blanc", 300), ("terracotta", 800)];

const BRANDS: &[&str] = &["Maison Lumière", "Atelier Nord", "Terre & Fil"];

#[derive(Debug, Serialize)]
struct SeedSummary {
    database: PathBuf,
    products: Vec<SeededProduct>,
    admin_google_id: String,
    customer_google_id: String,
}

#[derive(Debug, Serialize)]
struct SeededProduct {
    id: String,
    name: String,
    price_cents: i64,
    stock: i64,
    is_available: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = env::args().collect();

    let mut count: usize = 60;
    let mut db_path = PathBuf::from("./data/boutique.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if let Some(value) = args.get(i + 1) {
                    count = value.parse().unwrap_or(count);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if let Some(value) = args.get(i + 1) {
                    db_path = PathBuf::from(value);
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Boutique seed data generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 60)");
                println!("  -d, --db <PATH>    Database file path (default: ./data/boutique.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => warn!(arg = %other, "Ignoring unknown argument"),
        }
        i += 1;
    }

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db = Database::new(DbConfig::new(&db_path)).await?;
    info!(path = %db_path.display(), "Connected, migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        warn!(existing, "Database already has products, skipping seed");
        return Ok(());
    }

    let admin = db
        .users()
        .upsert("seed-admin", "admin@boutique.local", Some("Admin"), None, true)
        .await?;
    let customer = db
        .users()
        .upsert("seed-customer", "client@boutique.local", Some("Camille"), Some("Durand"), false)
        .await?;

    let mut seeded = Vec::with_capacity(count);
    let mut index = 0usize;

    'outer: for (collection, items) in COLLECTIONS {
        for item in items.iter() {
            for (finish, supplement) in FINISHES {
                if seeded.len() >= count {
                    break 'outer;
                }

                let input = generate_product(collection, item, finish, *supplement, index);
                index += 1;

                match db.products().insert(&input).await {
                    Ok(product) => seeded.push(SeededProduct {
                        id: product.id,
                        name: product.name,
                        price_cents: product.price_cents,
                        stock: product.stock,
                        is_available: product.is_available,
                    }),
                    Err(e) => warn!(name = %input.name, error = %e, "Failed to insert product"),
                }
            }
        }
    }

    info!(products = seeded.len(), "Seed complete");

    let summary = SeedSummary {
        database: db_path,
        products: seeded,
        admin_google_id: admin.google_id,
        customer_google_id: customer.google_id,
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);

    db.close().await;
    Ok(())
}

/// Builds one deterministic product from its position in the catalogue.
fn generate_product(collection: &str, item: &str, finish: &str, supplement: i64, seed: usize) -> NewProduct {
    // 9,90 € .. 89,80 €
    let base_price = 990 + ((seed as i64 * 137) % 8000) / 10 * 10;
    let stock = (seed as i64 * 7) % 25;

    let mut product = NewProduct::new(format!("{item} {finish}"), base_price + supplement, stock)
        .brand(BRANDS[seed % BRANDS.len()])
        .description(format!("Collection {collection}, finition {finish}."));

    if seed % 10 == 9 {
        product = product.unavailable();
    }

    product
}
