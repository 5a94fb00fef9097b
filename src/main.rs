use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use college_town_ttest::{run_pipeline, PipelineConfig, PipelineReport, ReferenceMode};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ReferenceArg {
    /// 2008q2 vs 2009q2 (or the quarters set in --config)
    Fixed,
    /// Quarter before the recession start vs. the recession bottom
    Recession,
}

#[derive(Parser, Debug)]
#[command(name = "college-town-ttest")]
#[command(version)]
#[command(about = "Test whether college towns' home prices held up better in the recession", long_about = None)]
struct Cli {
    /// JSON configuration file (missing fields use defaults)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// College town listing
    #[arg(long, value_name = "FILE")]
    towns: Option<PathBuf>,

    /// Quarterly GDP workbook (.xls/.xlsx) or its CSV export
    #[arg(long, value_name = "FILE")]
    gdp: Option<PathBuf>,

    /// Monthly city home values
    #[arg(long, value_name = "FILE")]
    housing: Option<PathBuf>,

    /// How to choose the comparison quarters
    #[arg(long, value_enum)]
    reference: Option<ReferenceArg>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Debug-level logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

/// Initialize tracing subscriber; RUST_LOG overrides the default level
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_config(cli: &Cli) -> Result<PipelineConfig> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    if let Some(path) = &cli.towns {
        config.town_list_path = path.clone();
    }
    if let Some(path) = &cli.gdp {
        config.gdp_path = path.clone();
    }
    if let Some(path) = &cli.housing {
        config.housing_path = path.clone();
    }
    if let Some(reference) = cli.reference {
        config.reference_mode = match reference {
            ReferenceArg::Fixed => ReferenceMode::Fixed,
            ReferenceArg::Recession => ReferenceMode::Recession,
        };
    }

    Ok(config)
}

fn print_report(report: &PipelineReport) {
    let result = &report.result;

    println!("🎓 College Towns vs. the Great Recession");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    println!("\n📉 Recession window");
    println!("   start:  {}", report.recession.start);
    println!("   end:    {}", report.recession.end);
    println!("   bottom: {}", report.recession.bottom);

    println!("\n🏠 Housing data");
    println!("   {} regions × {} quarters", report.region_count, report.quarter_count);
    println!(
        "   price ratio = {} / {}",
        report.reference_quarters.before, report.reference_quarters.after
    );

    println!("\n🔗 Groups");
    println!(
        "   college towns:     {:>6} rows, {:>6} with ratio, mean {:.4}",
        report.college_town_count, result.college_town_count, result.college_town_mean
    );
    println!(
        "   non-college towns: {:>6} rows, {:>6} with ratio, mean {:.4}",
        report.non_college_town_count, result.non_college_town_count, result.non_college_town_mean
    );

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("   t = {:.4} (df = {})", result.t_statistic, result.degrees_of_freedom);
    println!("   p = {:e}", result.p_value);
    if result.is_significant {
        println!("✅ Significant difference; {} fared better", result.better_group);
    } else {
        println!(
            "✓ No significant difference ({} had the lower mean ratio)",
            result.better_group
        );
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = build_config(&cli)?;
    let report = run_pipeline(&config).context("Pipeline failed")?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}
