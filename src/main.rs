use std::path::PathBuf;

use clap::Parser;
use cutlist::api::OptimizeResponse;
use cutlist::render;
use cutlist::solver::{Solver, SolverConfig};
use cutlist::types::{Demand, Rect, Solution};
use tracing::Level;

#[derive(Parser)]
#[command(
    name = "cutlist",
    about = "Guillotine cut-list optimizer for rectangular sheet stock"
)]
struct Cli {
    /// Stock sheet dimensions (WxH, e.g. 2440x1220)
    #[arg(long)]
    sheet: String,

    /// Parts as NAME:WxH:QTY, append :fixed to forbid rotating a part (e.g. Door:600x2000:2 Shelf:300x800:4:fixed)
    #[arg(long = "parts", num_args = 1.., required = true)]
    parts: Vec<String>,

    /// Blade kerf width (default: 0)
    #[arg(long, default_value_t = 0)]
    kerf: u32,

    /// Disable part rotation for every part
    #[arg(long)]
    no_rotate: bool,

    /// Search time limit in seconds
    #[arg(long, default_value_t = 5.0)]
    time_limit: f64,

    /// Write the layout diagram as SVG to this file
    #[arg(long)]
    svg: Option<PathBuf>,

    /// Print the full report as JSON
    #[arg(long)]
    json: bool,

    /// Log search progress to stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_dimensions(s: &str) -> Result<Rect, String> {
    let parts: Vec<&str> = s.split('x').collect();
    if parts.len() != 2 {
        return Err(format!("invalid dimensions '{}', expected WxH", s));
    }
    let width = parts[0]
        .parse::<u32>()
        .map_err(|_| format!("invalid width in '{}'", s))?;
    let height = parts[1]
        .parse::<u32>()
        .map_err(|_| format!("invalid height in '{}'", s))?;
    if width == 0 || height == 0 {
        return Err(format!("dimensions must be non-zero in '{}'", s));
    }
    Ok(Rect::new(width, height))
}

fn parse_part(s: &str) -> Result<Demand, String> {
    let fields: Vec<&str> = s.split(':').collect();
    let can_rotate = match fields.as_slice() {
        [_, _, _] => true,
        [_, _, _, "fixed"] => false,
        _ => return Err(format!("invalid part '{}', expected NAME:WxH:QTY[:fixed]", s)),
    };
    let name = fields[0].trim();
    if name.is_empty() {
        return Err(format!("missing part name in '{}'", s));
    }
    let rect = parse_dimensions(fields[1])?;
    let qty = fields[2]
        .parse::<u32>()
        .map_err(|_| format!("invalid quantity in '{}'", s))?;
    Ok(Demand::new(name, rect, qty, can_rotate))
}

fn print_solution(solution: &Solution, exhaustive: bool) {
    for (i, sheet) in solution.sheets.iter().enumerate() {
        println!("Sheet {}:", i + 1);
        for p in &sheet.placements {
            let rot = if p.rotated { " [rotated]" } else { "" };
            println!("  {} {} @ ({}, {}){}", p.part_name, p.rect, p.x, p.y, rot);
        }
        if !sheet.cuts.is_empty() {
            println!("  Cuts:");
            for c in &sheet.cuts {
                if c.is_vertical() {
                    println!("    {:>3}. vertical   x={} from y={} to y={}", c.index, c.x1, c.y1, c.y2);
                } else {
                    println!("    {:>3}. horizontal y={} from x={} to x={}", c.index, c.y1, c.x1, c.x2);
                }
            }
        }
        println!();
    }

    println!(
        "Summary: {} sheet{} used, {:.1}% waste{}",
        solution.sheet_count(),
        if solution.sheet_count() == 1 { "" } else { "s" },
        solution.total_waste_percent(),
        if exhaustive { "" } else { " (search stopped at time limit)" },
    );
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(level)
        .init();

    let stock = parse_dimensions(&cli.sheet).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    let demands: Vec<Demand> = cli
        .parts
        .iter()
        .map(|p| parse_part(p))
        .collect::<Result<Vec<_>, _>>()
        .unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        });

    let outcome = SolverConfig::new(stock)
        .with_kerf(cli.kerf)
        .with_rotation(!cli.no_rotate)
        .with_time_limit_secs(cli.time_limit)
        .and_then(|config| Solver::new(config, demands).solve())
        .unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        });

    if let (Some(path), Some(solution)) = (&cli.svg, &outcome.solution)
        && let Err(e) = std::fs::write(path, render::render_svg(&solution.sheets))
    {
        eprintln!("Error: cannot write {}: {}", path.display(), e);
        std::process::exit(1);
    }

    let solved = outcome.solution.is_some();
    if cli.json {
        let response = OptimizeResponse::from(outcome);
        match serde_json::to_string_pretty(&response) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    } else if let Some(solution) = &outcome.solution {
        print_solution(solution, outcome.exhaustive);
    } else {
        println!("No solution found within the time limit.");
    }

    if !solved {
        std::process::exit(2);
    }
}
