//! # Seed Data Generator
//!
//! Populates the database with test data for development.
//!
//! ## Usage
//! ```bash
//! # Generate 500 products (default)
//! cargo run -p mercado-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p mercado-db --bin seed -- --count 2000
//!
//! # Specify database path
//! cargo run -p mercado-db --bin seed -- --db ./data/mercado.db
//! ```
//!
//! ## Generated Data
//! Creates categories, two suppliers, and realistic grocery products:
//! - Bebidas (refrigerantes, sucos, agua)
//! - Mercearia (arroz, feijao, massas)
//! - Laticinios (leite, queijo, iogurte)
//! - Limpeza (detergente, sabao)
//! - Higiene (sabonete, shampoo)
//!
//! Each product has a unique EAN-style barcode, a price derived
//! deterministically from its index, cost at 60-80% of price, and
//! random-ish starting stock.

use chrono::Utc;
use std::env;
use uuid::Uuid;

use mercado_core::{Category, Product, Supplier};
use mercado_db::{Database, DbConfig};

/// Categories with representative product names.
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "Bebidas",
        &[
            "Refrigerante Cola 2L",
            "Refrigerante Guarana 2L",
            "Suco de Laranja 1L",
            "Suco de Uva 1L",
            "Agua Mineral 500ml",
            "Agua com Gas 500ml",
            "Cerveja Pilsen Lata",
            "Cha Mate 1.5L",
            "Energetico 250ml",
            "Agua de Coco 1L",
        ],
    ),
    (
        "Mercearia",
        &[
            "Arroz Branco 5kg",
            "Feijao Preto 1kg",
            "Feijao Carioca 1kg",
            "Macarrao Espaguete 500g",
            "Farinha de Trigo 1kg",
            "Acucar Refinado 1kg",
            "Sal Refinado 1kg",
            "Oleo de Soja 900ml",
            "Cafe Torrado 500g",
            "Molho de Tomate 340g",
            "Milho em Conserva 200g",
            "Biscoito Recheado 140g",
        ],
    ),
    (
        "Laticinios",
        &[
            "Leite Integral 1L",
            "Leite Desnatado 1L",
            "Queijo Mussarela 150g",
            "Queijo Prato 150g",
            "Iogurte Natural 170g",
            "Manteiga 200g",
            "Requeijao 200g",
            "Creme de Leite 200g",
        ],
    ),
    (
        "Limpeza",
        &[
            "Detergente Neutro 500ml",
            "Sabao em Po 1kg",
            "Agua Sanitaria 1L",
            "Desinfetante 500ml",
            "Esponja de Aco",
            "Amaciante 2L",
        ],
    ),
    (
        "Higiene",
        &[
            "Sabonete 90g",
            "Shampoo 350ml",
            "Condicionador 350ml",
            "Creme Dental 90g",
            "Papel Higienico 4un",
            "Desodorante Aerosol",
        ],
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    let mut count: usize = 500;
    let mut db_path = String::from("./mercado_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(500);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Mercado POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 500)");
                println!("  -d, --db <PATH>    Database file path (default: ./mercado_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Mercado POS Seed Data Generator");
    println!("===============================");
    println!("Database: {}", db_path);
    println!("Products: {}", count);
    println!();

    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("Connected, migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("Database already has {} products", existing);
        println!("Skipping seed to avoid duplicates.");
        println!("Delete the database file to regenerate.");
        return Ok(());
    }

    // Suppliers
    for (name, tax_id) in [
        ("Distribuidora Sul Ltda", "12.345.678/0001-90"),
        ("Atacado Norte SA", "98.765.432/0001-10"),
    ] {
        let now = Utc::now();
        db.suppliers()
            .insert(&Supplier {
                id: Uuid::new_v4().to_string(),
                name: name.to_string(),
                tax_id: tax_id.to_string(),
                email: None,
                phone: None,
                is_active: true,
                created_at: now,
                updated_at: now,
            })
            .await?;
    }
    println!("Seeded 2 suppliers");

    // Categories + products
    println!();
    println!("Generating products...");

    let mut generated = 0;
    let start = std::time::Instant::now();

    'outer: for (category_idx, (category_name, products)) in CATEGORIES.iter().enumerate() {
        let now = Utc::now();
        let category = Category {
            id: Uuid::new_v4().to_string(),
            name: category_name.to_string(),
            description: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        db.categories().insert(&category).await?;

        // Cycle product names with a numeric suffix until the quota for
        // this category is filled.
        let per_category = count.div_ceil(CATEGORIES.len());
        for n in 0..per_category {
            if generated >= count {
                break 'outer;
            }

            let base = products[n % products.len()];
            let seed = category_idx * 10_000 + n;
            let product = generate_product(&category.id, base, n / products.len(), seed);

            if let Err(e) = db.products().insert(&product).await {
                eprintln!("Failed to insert {}: {}", product.barcode, e);
                continue;
            }

            generated += 1;
            if generated % 500 == 0 {
                println!("  Generated {} products...", generated);
            }
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("Generated {} products in {:?}", generated, elapsed);

    let results = db.products().search("arroz", 10).await?;
    println!("Search 'arroz': {} results", results.len());

    println!();
    println!("Seed complete!");

    Ok(())
}

/// Generates a single product with deterministic pseudo-random data.
fn generate_product(category_id: &str, name: &str, variant: usize, seed: usize) -> Product {
    let now = Utc::now();

    // EAN-style barcode (789 = Brazil prefix; checksum not validated)
    let barcode = format!("789{:010}", seed);

    // Price R$1.99 - R$29.99
    let price_cents = 199 + ((seed * 37) % 2800) as i64;

    // Cost at 60-80% of price
    let cost_pct = 60 + (seed % 20) as i64;
    let cost_cents = price_cents * cost_pct / 100;

    let full_name = if variant == 0 {
        name.to_string()
    } else {
        format!("{} (marca {})", name, variant + 1)
    };

    Product {
        id: Uuid::new_v4().to_string(),
        barcode,
        name: full_name,
        category_id: category_id.to_string(),
        cost_cents,
        price_cents,
        stock_qty: (seed % 101) as i64,
        min_stock_qty: 10,
        unit: "UN".to_string(),
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}
