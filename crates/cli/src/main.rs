// TableTalk CLI - ask free-text questions about a spreadsheet, headless.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tabletalk_engine::{ColumnType, Dataset};
use tabletalk_query::{answer, Answer, Payload};

const EXIT_SUCCESS: u8 = 0;
const EXIT_ERROR: u8 = 1;
const EXIT_IO_ERROR: u8 = 3;

#[derive(Parser)]
#[command(name = "tt")]
#[command(about = "Chat with a spreadsheet (CSV/XLSX) from the terminal")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask one question and print the answer
    #[command(after_help = "\
Examples:
  tt ask sales.xlsx 'what is the average sales'
  tt ask people.csv 'how many rows where age > 30' --json")]
    Ask {
        /// Spreadsheet file (xlsx, xls, ods, csv, tsv)
        file: PathBuf,
        /// Free-text question
        question: String,
        /// Print the raw result descriptor as JSON
        #[arg(long)]
        json: bool,
    },

    /// Interactive question loop against one file
    Chat {
        file: PathBuf,
    },

    /// Show the dataset summary (shape, columns, first rows)
    Info {
        file: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Ask { file, question, json } => cmd_ask(&file, &question, json),
        Commands::Chat { file } => cmd_chat(&file),
        Commands::Info { file } => cmd_info(&file),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(code) => ExitCode::from(code),
    }
}

fn load(file: &PathBuf) -> Result<Dataset, u8> {
    tabletalk_io::ingest_path(file).map_err(|e| {
        eprintln!("error: {e}");
        EXIT_IO_ERROR
    })
}

fn cmd_ask(file: &PathBuf, question: &str, json: bool) -> Result<(), u8> {
    let dataset = load(file)?;
    let result = answer(&dataset, question);
    if json {
        let out = serde_json::to_string_pretty(&result).map_err(|e| {
            eprintln!("error: {e}");
            EXIT_ERROR
        })?;
        println!("{out}");
    } else {
        print_answer(&result);
    }
    Ok(())
}

fn cmd_chat(file: &PathBuf) -> Result<(), u8> {
    let dataset = load(file)?;
    print_shape(&dataset);
    print_suggestions(&dataset);
    println!("Type a question, or 'quit' to exit.\n");

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush().ok();
        let mut line = String::new();
        if stdin.lock().read_line(&mut line).unwrap_or(0) == 0 {
            break;
        }
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if matches!(question, "quit" | "exit" | "q") {
            break;
        }
        print_answer(&answer(&dataset, question));
        println!();
    }
    Ok(())
}

fn cmd_info(file: &PathBuf) -> Result<(), u8> {
    let dataset = load(file)?;
    print_shape(&dataset);
    for column in dataset.columns() {
        println!("  {} ({})", column.name, column.ty);
    }
    println!();
    print_payload(&tabletalk_query::preview(&dataset));
    Ok(())
}

fn print_shape(dataset: &Dataset) {
    let (rows, cols) = dataset.shape();
    println!("{}: {} rows, {} columns", dataset.file_name(), rows, cols);
}

/// Suggested questions derived from the actual column types, so the
/// user sees what the engine can do with this file.
fn print_suggestions(dataset: &Dataset) {
    let numeric = dataset.first_column_of(ColumnType::Number);
    let textual = dataset.first_column_of(ColumnType::Text);

    let mut suggestions = Vec::new();
    if let Some(n) = numeric {
        suggestions.push(format!("what is the average {}", n.name));
    }
    if let Some(t) = textual {
        suggestions.push(format!("show a pie chart of {}", t.name));
        if let Some(n) = numeric {
            suggestions.push(format!("compare {} by {}", n.name, t.name));
        }
    }
    suggestions.push("how many rows are there".to_string());

    println!("Try:");
    for s in &suggestions {
        println!("  - {s}");
    }
}

fn print_answer(result: &Answer) {
    println!("{}", result.text);
    if let Some(payload) = &result.payload {
        println!();
        print_payload(payload);
    }
}

fn print_payload(payload: &Payload) {
    match payload {
        Payload::Table { headers, rows, title } => {
            println!("{title}");
            let widths: Vec<usize> = headers
                .iter()
                .enumerate()
                .map(|(i, h)| {
                    rows.iter()
                        .map(|r| r.get(i).map(String::len).unwrap_or(0))
                        .chain(std::iter::once(h.len()))
                        .max()
                        .unwrap_or(0)
                })
                .collect();
            print_row(headers, &widths);
            println!(
                "{}",
                widths
                    .iter()
                    .map(|w| "-".repeat(*w))
                    .collect::<Vec<_>>()
                    .join("-+-")
            );
            for row in rows {
                print_row(row, &widths);
            }
        }
        Payload::Chart { series, value_key, title, .. } => {
            println!("{title}");
            let scale: f64 = series
                .iter()
                .map(|p| chart_value(p, value_key))
                .fold(0.0, f64::max);
            for point in series {
                let value = chart_value(point, value_key);
                let bar_len = if scale > 0.0 {
                    ((value / scale) * 40.0).round() as usize
                } else {
                    0
                };
                println!(
                    "  {:<16} {:<8} {}",
                    point.category,
                    trim_number(value),
                    "#".repeat(bar_len)
                );
            }
        }
    }
}

fn chart_value(point: &tabletalk_query::SeriesPoint, value_key: &str) -> f64 {
    if value_key == "aggregate" {
        point.aggregate.unwrap_or(point.count as f64)
    } else {
        point.count as f64
    }
}

fn trim_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n:.2}")
    }
}

fn print_row(cells: &[String], widths: &[usize]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(c, w)| format!("{c:<width$}", width = w))
        .collect::<Vec<_>>()
        .join(" | ");
    println!("{line}");
}
