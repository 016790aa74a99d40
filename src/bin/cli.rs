//! FlatDB - interactive shell

use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing_subscriber::EnvFilter;

use flatdb::catalog::TableSchema;
use flatdb::command::{self, Command};
use flatdb::storage::{Row, Store};

/// Directory holding the data files and the schema snapshot
const DATA_DIR: &str = "data";

/// Print welcome banner
fn print_banner() {
    println!("FlatDB v0.1");
    println!("Type 'help' for available commands.");
    println!("Type 'exit' to exit the program.");
}

/// Print help message
fn print_help() {
    println!(
        r#"
Supported commands:
  select * from <table>
  insert into <table> values (<values>)
  delete from <table> where <id>
  create table <table> (<column> <TYPE>, ...)   with INT and TEXT(n)
  show tables
  drop table <table>
  help
  exit
"#
    );
}

/// Format rows as a fixed-width table with a header line
fn format_rows(schema: &TableSchema, rows: &[Row]) -> String {
    let mut widths: Vec<usize> = schema.columns().iter().map(|c| c.name.len()).collect();
    for row in rows {
        for (i, value) in row.values().iter().enumerate() {
            widths[i] = widths[i].max(value.to_string().len());
        }
    }

    let mut out = String::new();
    for (col, w) in schema.columns().iter().zip(&widths) {
        out.push_str(&format!("{:<width$}  ", col.name, width = *w));
    }
    out.push('\n');

    for row in rows {
        for (value, w) in row.values().iter().zip(&widths) {
            out.push_str(&format!("{:<width$}  ", value, width = *w));
        }
        out.push('\n');
    }

    out.push_str(&format!("{} row(s)\n", rows.len()));
    out
}

/// Execute one command line. Returns false when the shell should exit.
fn execute(line: &str, store: &mut Store) -> bool {
    let cmd = match command::parse(line) {
        Ok(cmd) => cmd,
        Err(e) => {
            eprintln!("{}", e);
            return true;
        }
    };

    match cmd {
        Command::Empty => {}
        Command::Help => print_help(),
        Command::Exit => {
            println!("Exiting FlatDB.");
            return false;
        }
        Command::ShowTables => {
            let tables = store.list_tables();
            if tables.is_empty() {
                println!("No tables defined.");
            }
            for table in tables {
                println!("{}", table);
            }
        }
        Command::CreateTable { table, columns } => match store.create_table(&table, &columns) {
            Ok(()) => println!("Created table {}", table),
            Err(e) => eprintln!("{}", e),
        },
        Command::Insert { table, values } => match store.insert(&table, &values) {
            Ok(()) => println!("Row inserted."),
            Err(e) => eprintln!("{}", e),
        },
        Command::SelectAll { table } => {
            // The schema is cloned up front: the header needs it after
            // select_all has taken the mutable borrow.
            let schema = store.registry().lookup(&table).cloned();
            match store.select_all(&table) {
                Ok(rows) => {
                    if rows.is_empty() {
                        println!("No rows found.");
                    } else if let Some(schema) = schema {
                        print!("{}", format_rows(&schema, rows));
                    }
                }
                Err(e) => eprintln!("{}", e),
            }
        }
        Command::DeleteById { table, id } => match store.delete_where_id(&table, id) {
            Ok(()) => println!("Deleted row with id {}", id),
            Err(e) => eprintln!("{}", e),
        },
        Command::DropTable { table } => match store.drop_table(&table) {
            Ok(()) => println!("Dropped table {}", table),
            Err(e) => eprintln!("{}", e),
        },
    }
    true
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut store = Store::open(DATA_DIR)?;
    print_banner();

    let mut rl = DefaultEditor::new()?;
    loop {
        match rl.readline("db > ") {
            Ok(line) => {
                let _ = rl.add_history_entry(line.as_str());
                if !execute(&line, &mut store) {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}
