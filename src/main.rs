//! # Quire CLI
//!
//! Usage:
//!   quire input.json -o output.json
//!   echo '{ ... }' | quire -o output.json
//!   quire --example > report.json

use std::env;
use std::fs;
use std::io::{self, Read};

fn main() {
    let args: Vec<String> = env::args().collect();

    // Handle --example flag
    if args.iter().any(|a| a == "--example") {
        print!("{}", example_report_json());
        return;
    }

    // Read input
    let input = if args.len() > 1 && !args[1].starts_with('-') {
        fs::read_to_string(&args[1]).expect("Failed to read input file")
    } else {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf).expect("Failed to read stdin");
        buf
    };

    // Parse output path
    let output_path = args
        .windows(2)
        .find(|w| w[0] == "-o")
        .map(|w| w[1].clone())
        .unwrap_or_else(|| "output.json".to_string());

    // Render
    match quire::render_json(&input) {
        Ok(bytes) => {
            fs::write(&output_path, &bytes).expect("Failed to write output");
            eprintln!("✓ Written {} bytes to {}", bytes.len(), output_path);
        }
        Err(e) => {
            eprintln!("✗ {}", e);
            std::process::exit(1);
        }
    }
}

fn example_report_json() -> &'static str {
    r##"{
  "page": {
    "size": [612, 792],
    "layout": "portrait",
    "margin_top": 72,
    "margin_bottom": 72,
    "margin_left": 72,
    "margin_right": 72
  },
  "default": {
    "font": "Helvetica",
    "font_size": 11
  },
  "header": {
    "height": 36,
    "style": { "font_size": 9, "color": "#666666" },
    "items": [
      { "object_type": "text", "content": "Quarterly Operations Report" },
      { "object_type": "hline", "style": { "line_width": 0.5 } }
    ]
  },
  "footer": {
    "height": 24,
    "style": { "font_size": 8, "color": "#999999", "align": "center" },
    "items": [
      { "object_type": "text", "content": "Confidential" }
    ]
  },
  "items": [
    {
      "object_type": "text",
      "content": "Q3 Summary",
      "style": { "font": "Helvetica-Bold", "font_size": 18 }
    },
    {
      "object_type": "text",
      "content": "Shipments held steady through the quarter while returns fell for the third consecutive period. The table below breaks volumes out by depot.",
      "style": { "align": "justify", "line_height": 16 }
    },
    { "object_type": "hline" },
    {
      "object_type": "table",
      "content": {
        "title": "Depot volumes",
        "columns": [
          { "key": "depot", "name": "Depot", "width": "40%" },
          { "key": "shipped", "name": "Shipped" },
          { "key": "returned", "name": "Returned" }
        ],
        "thead": { "style": { "font": "Helvetica-Bold", "background_color": "#eeeeee" } },
        "data": [
          { "cells": { "depot": "North", "shipped": "1,204", "returned": "31" } },
          { "cells": { "depot": "Central", "shipped": "987", "returned": "18" } },
          { "cells": { "depot": "South", "shipped": "1,455", "returned": "12" } }
        ]
      }
    },
    { "object_type": "pagebreak" },
    {
      "object_type": "text",
      "content": "Appendix",
      "style": { "font": "Helvetica-Bold", "font_size": 14 }
    }
  ]
}"##
}
