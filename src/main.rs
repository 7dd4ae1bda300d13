use clap::Parser;
use cutplan::render;
use cutplan::types::{EngineKind, RequiredPanel, Settings, StockPanel};
use cutplan::create_packer;

#[derive(Parser)]
#[command(name = "cutplan", about = "2D rectangular cutting stock optimizer")]
struct Cli {
    /// Stock sheets as LxW:qty with optional price (e.g. 2440x1220:3 or 2440x1220:3:25.50)
    #[arg(long = "stock", num_args = 1..)]
    stock: Vec<String>,

    /// Required pieces as LxW:qty with optional label (e.g. 600x400:4 or 600x400:4:Shelf)
    #[arg(long = "cuts", num_args = 1..)]
    cuts: Vec<String>,

    /// Blade kerf width (default: 0)
    #[arg(long, default_value_t = 0.0)]
    kerf: f64,

    /// Preserve grain direction (disables piece rotation)
    #[arg(long)]
    grain: bool,

    /// Edge banding thickness; enables the banding adjustment
    #[arg(long)]
    banding: Option<f64>,

    /// Edge trim amount; enables the trimming adjustment
    #[arg(long)]
    trim: Option<f64>,

    /// Estimate cost from the opened sheets' prices
    #[arg(long)]
    price: bool,

    /// Placement engine: grid-heuristic or maximal-rectangles
    #[arg(long, default_value = "grid-heuristic")]
    engine: String,

    /// Show ASCII layout of each sheet
    #[arg(long)]
    layout: bool,
}

fn parse_dimensions(s: &str) -> Result<(f64, f64), String> {
    let parts: Vec<&str> = s.split('x').collect();
    if parts.len() != 2 {
        return Err(format!("invalid dimensions '{}', expected LxW", s));
    }
    let length = parts[0]
        .parse::<f64>()
        .map_err(|_| format!("invalid length in '{}'", s))?;
    let width = parts[1]
        .parse::<f64>()
        .map_err(|_| format!("invalid width in '{}'", s))?;
    if length <= 0.0 || width <= 0.0 {
        return Err(format!("dimensions must be positive in '{}'", s));
    }
    Ok((length, width))
}

fn parse_quantity(s: &str, src: &str) -> Result<u32, String> {
    let qty = s
        .parse::<u32>()
        .map_err(|_| format!("invalid quantity in '{}'", src))?;
    if qty == 0 {
        return Err(format!("quantity must be non-zero in '{}'", src));
    }
    Ok(qty)
}

fn parse_stock(s: &str) -> Result<StockPanel, String> {
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() < 2 || parts.len() > 3 {
        return Err(format!("invalid stock '{}', expected LxW:qty[:price]", s));
    }
    let (length, width) = parse_dimensions(parts[0])?;
    let quantity = parse_quantity(parts[1], s)?;
    let price = match parts.get(2) {
        Some(p) => Some(
            p.parse::<f64>()
                .map_err(|_| format!("invalid price in '{}'", s))?,
        ),
        None => None,
    };
    Ok(StockPanel {
        length,
        width,
        quantity,
        price,
    })
}

fn parse_cut(s: &str) -> Result<RequiredPanel, String> {
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() < 2 || parts.len() > 3 {
        return Err(format!("invalid cut '{}', expected LxW:qty[:label]", s));
    }
    let (length, width) = parse_dimensions(parts[0])?;
    let quantity = parse_quantity(parts[1], s)?;
    Ok(RequiredPanel {
        length,
        width,
        quantity,
        label: parts.get(2).map(|l| l.to_string()),
        color: None,
    })
}

fn main() {
    let cli = Cli::parse();

    let stock: Vec<StockPanel> = cli
        .stock
        .iter()
        .map(|s| parse_stock(s))
        .collect::<Result<Vec<_>, _>>()
        .unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        });

    let required: Vec<RequiredPanel> = cli
        .cuts
        .iter()
        .map(|c| parse_cut(c))
        .collect::<Result<Vec<_>, _>>()
        .unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        });

    let engine = cli.engine.parse::<EngineKind>().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });
    let settings = Settings {
        engine,
        kerf_width: cli.kerf,
        consider_grain: cli.grain,
        calculate_price: cli.price,
        include_edge_banding: cli.banding.is_some(),
        edge_banding_thickness: cli.banding.unwrap_or(0.0),
        include_edge_trimming: cli.trim.is_some(),
        edge_trim_amount: cli.trim.unwrap_or(0.0),
    };

    let mut packer = create_packer(engine, settings);
    packer.add_stock_panels(&stock);
    packer.add_required_panels(&required);
    let result = packer.pack();

    for (i, sheet) in result.layouts.iter().enumerate() {
        println!("Sheet {} ({}x{}):", i + 1, sheet.length, sheet.width);
        for cut in &sheet.cuts {
            let rot = if cut.rotated { " [rotated]" } else { "" };
            let label = cut
                .label
                .as_deref()
                .map(|l| format!(" {}", l))
                .unwrap_or_default();
            println!(
                "  {}x{} @ ({}, {}){}{}",
                cut.length, cut.width, cut.x, cut.y, label, rot
            );
        }
        if cli.layout {
            print!("{}", render::render_layout(sheet));
        }
        println!();
    }

    if !result.remaining_panels.is_empty() {
        println!("Unplaced pieces:");
        for panel in &result.remaining_panels {
            println!(
                "  {}x{}{}",
                panel.original_length,
                panel.original_width,
                panel
                    .label
                    .as_deref()
                    .map(|l| format!(" ({})", l))
                    .unwrap_or_default()
            );
        }
        println!();
    }

    let stats = &result.stats;
    print!(
        "Summary: {} sheet{} used, yield {:.1}%, cut length {:.0}",
        stats.stock_panels_used,
        if stats.stock_panels_used == 1 { "" } else { "s" },
        stats.material_yield,
        stats.total_cut_length,
    );
    if let Some(cost) = stats.estimated_cost {
        print!(", estimated cost {:.2}", cost);
    }
    println!();
}
