use std::fs::File;
use std::io::BufWriter;

use clap::Parser;

use watershed_separation::flow::FlowIntegrator;
use watershed_separation::separation::{WatershedSeparation, DEFAULT_PAIR_MAX_DIST};
use watershed_separation::synthetic::{generate, SyntheticParams, REGION_ATTR};

#[derive(Parser, Debug)]
#[command(name = "watershed_separation")]
#[command(about = "Compute hydrological separation between neighboring basins")]
struct Args {
    /// Subdivision depth of the synthetic drainage network
    #[arg(short, long, default_value = "3")]
    depth: usize,

    /// Children per basin in the synthetic network
    #[arg(short, long, default_value = "3")]
    fanout: usize,

    /// Side length of the root basin in coordinate units
    #[arg(long, default_value = "100000")]
    extent: f64,

    /// Random seed (uses a random seed if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Maximum centroid distance for the neighbor search
    #[arg(long, default_value_t = DEFAULT_PAIR_MAX_DIST)]
    max_dist: f64,

    /// Keep only pairs with separation strictly above this value
    #[arg(long)]
    min_separation: Option<f64>,

    /// Keep only pairs that differ on this basin attribute
    #[arg(long)]
    lower_res: Option<String>,

    /// Export the filtered payload as JSON
    #[arg(long)]
    export: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(rand::random);
    println!("Seed: {seed}");

    let params = SyntheticParams {
        depth: args.depth,
        fanout: args.fanout,
        extent: args.extent,
        ..SyntheticParams::default()
    };
    let (basins, outflows) = generate(&params, seed)?;
    println!(
        "Generated {} basins ({} recorded outflow points)",
        basins.len(),
        outflows.len()
    );

    let flow = FlowIntegrator::new(basins, outflows)?;
    let mut watershed = WatershedSeparation::with_max_dist(&flow, args.max_dist)?;

    if let Some(min_val) = args.min_separation {
        watershed.filter_min_val(min_val);
    }
    if let Some(attr) = &args.lower_res {
        watershed.filter_lower_res(attr)?;
    }

    let payload = watershed.payload();
    println!(
        "{} of {} neighbor pairs after filtering",
        payload.len(),
        watershed.pairs().len()
    );

    if !payload.is_empty() {
        let mut separations: Vec<f64> = payload.iter().map(|r| r.separation).collect();
        separations.sort_unstable_by(f64::total_cmp);
        let mean = separations.iter().sum::<f64>() / separations.len() as f64;
        println!(
            "Separation min {:.1}, median {:.1}, mean {:.1}, max {:.1}",
            separations[0],
            separations[separations.len() / 2],
            mean,
            separations[separations.len() - 1]
        );

        let mut top: Vec<_> = payload.iter().collect();
        top.sort_unstable_by(|a, b| b.separation.total_cmp(&a.separation));
        println!("Most separated neighbor pairs:");
        for record in top.iter().take(5) {
            let region_a = watershed
                .basins()
                .attribute(record.a, REGION_ATTR)
                .unwrap_or("?");
            let region_b = watershed
                .basins()
                .attribute(record.b, REGION_ATTR)
                .unwrap_or("?");
            println!(
                "  {:>4} ({region_a}) | {:>4} ({region_b})  separation {:.1}",
                record.a, record.b, record.separation
            );
        }
    }

    if let Some(path) = &args.export {
        let file = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(file, payload)?;
        println!("Payload written to {path}");
    }

    Ok(())
}
