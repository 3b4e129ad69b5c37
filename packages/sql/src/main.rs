#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the coordinate UPDATE script generator.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use clap::Parser;
use kabkota_sql::{
    DEFAULT_INPUT, DEFAULT_OUTPUT, DEFAULT_SCHEMA, DEFAULT_TABLE, TableRef, parse_delimiter,
    read_rows, write_script,
};

#[derive(Parser)]
#[command(
    name = "kabkota_sql",
    about = "Generate coordinate UPDATE statements for review"
)]
struct Cli {
    /// Input table (`id, name, province_id, latitude, longitude`, header row skipped)
    #[arg(long, default_value = DEFAULT_INPUT)]
    input: PathBuf,
    /// Output SQL script
    #[arg(long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,
    /// Field delimiter of the input table (`\t` for tab)
    #[arg(long, default_value = ";")]
    delimiter: String,
    /// Schema of the target table
    #[arg(long, default_value = DEFAULT_SCHEMA)]
    schema: String,
    /// Target table
    #[arg(long, default_value = DEFAULT_TABLE)]
    table: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let delimiter = parse_delimiter(&cli.delimiter)?;
    let read = read_rows(File::open(&cli.input)?, delimiter)?;
    log::info!(
        "Read {} rows from {} ({} skipped)",
        read.rows.len(),
        cli.input.display(),
        read.skipped
    );

    let table = TableRef::new(cli.schema, cli.table);
    let writer = BufWriter::new(File::create(&cli.output)?);
    write_script(writer, &table, &read.rows, chrono::Utc::now())?;

    log::info!(
        "Generated {} with {} UPDATE statements against {table}",
        cli.output.display(),
        read.rows.len()
    );
    log::warn!("Review the SQL before executing it; nothing has been applied");

    Ok(())
}
