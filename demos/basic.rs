//! Basic usage example for varstore
//!
//! This example demonstrates the fundamental operations:
//! - Opening a store
//! - Appending records
//! - Loading all live records
//! - Random access by logical index
//! - Tombstone deletion

use varstore::{Matricula, Options, Store};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::init();

    // Open store (will be created if it doesn't exist)
    let options = Options::default()
        .data_file_name("matricula_data.dat")
        .index_file_name("matricula_meta.dat");
    let store = Store::open("./example_data", options)?;

    println!("Store opened successfully");

    // Append some records
    println!("Adding records...");
    store.add(&Matricula::new("C001", 1, 1000.50, "first enrollment"))?;
    store.add(&Matricula::new("C002", 2, 1500.75, "second enrollment with a note"))?;
    store.add(&Matricula::new("C003", 3, 2000.00, "third enrollment"))?;
    println!("Added 3 records");

    // Load all live records
    println!("Loading records...");
    for (i, record) in store.load()?.iter().enumerate() {
        println!("  {} => {}, {}, {}, {}", i, record.code, record.cycle, record.fee, record.note);
    }

    // Random access by logical index
    let record = store.read_record(1)?;
    println!("Record 1 => {}, {}, {}, {}", record.code, record.cycle, record.fee, record.note);

    // Remove record 1
    println!("Removing record 1...");
    store.remove(1)?;

    // Try to read the removed record
    match store.read_record(1) {
        Ok(_) => println!("record 1 still exists (unexpected)"),
        Err(e) => println!("record 1 was removed: {}", e),
    }

    // Load again: the removed record is skipped, order is preserved
    println!("Loading records after removal...");
    for (i, record) in store.load()?.iter().enumerate() {
        println!("  {} => {}, {}, {}, {}", i, record.code, record.cycle, record.fee, record.note);
    }

    Ok(())
}
