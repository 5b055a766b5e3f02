//! CLI tool for gridview - renders a synthetic grid headlessly and prints
//! what each pass drew as JSON
//!
//! Usage:
//!   gridview_cli <rows> <cols>                      # One full render
//!   gridview_cli <rows> <cols> --scroll 3           # Then scroll down 3 rows
//!   gridview_cli <rows> <cols> --config grid.json   # With a JSON config

#![allow(clippy::exit)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::indexing_slicing)]

use std::env;
use std::fs;
use std::io::{self, Write};

use gridview::config::GridConfig;
use gridview::provider::TableProvider;
use gridview::render::RecordingSurface;
use gridview::viewer::{EventLog, GridView};
use serde::Serialize;

#[derive(Serialize)]
struct Pass<'a> {
    label: &'a str,
    stats: gridview::render::RenderStats,
    scroll_blits: usize,
    first_row: u32,
}

fn usage() -> ! {
    eprintln!("Usage: gridview_cli <rows> <cols> [--scroll N] [--config grid.json]");
    std::process::exit(1);
}

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        usage();
    }

    let rows: u32 = args[1].parse().unwrap_or_else(|_| usage());
    let cols: u32 = args[2].parse().unwrap_or_else(|_| usage());

    let mut scroll = None;
    let mut config = GridConfig::default();
    let mut rest = args[3..].iter();
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--scroll" => {
                scroll = rest.next().and_then(|n| n.parse::<u32>().ok());
                if scroll.is_none() {
                    usage();
                }
            }
            "--config" => {
                let Some(path) = rest.next() else { usage() };
                let json = match fs::read_to_string(path) {
                    Ok(j) => j,
                    Err(e) => {
                        eprintln!("Error reading {}: {}", path, e);
                        std::process::exit(1);
                    }
                };
                config = match GridConfig::from_json(&json) {
                    Ok(c) => c,
                    Err(e) => {
                        eprintln!("Error in {}: {}", path, e);
                        std::process::exit(1);
                    }
                };
            }
            _ => usage(),
        }
    }

    let provider = TableProvider::synthetic(rows, cols);
    let mut view = match GridView::new(Box::new(provider), RecordingSurface::new(1024, 768), config) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Error creating grid: {}", e);
            std::process::exit(1);
        }
    };
    let events = EventLog::new();
    view.add_listener(Box::new(events.clone()));

    let mut passes = Vec::new();
    let stats = view.render();
    passes.push(Pass {
        label: "initial",
        stats,
        scroll_blits: 0,
        first_row: view.viewport().first_row,
    });

    if let Some(n) = scroll {
        view.surface_mut().clear_ops();
        view.scroll_to(view.viewport().first_row.saturating_add(n), view.viewport().first_column);
        let scroll_blits = view.surface().scroll_ops().len();
        let stats = view.flush().unwrap_or_default();
        passes.push(Pass {
            label: "scroll",
            stats,
            scroll_blits,
            first_row: view.viewport().first_row,
        });
    }

    let out = serde_json::json!({
        "passes": passes,
        "events": events.events(),
    });
    let json = serde_json::to_string_pretty(&out).unwrap();
    io::stdout().write_all(json.as_bytes()).unwrap();
    println!();
}
