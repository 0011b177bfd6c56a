use clap::Parser;
use sp_node::{run_demo, DemoConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Runs the double-spend demonstration: an honest miner and a colluding
/// adversary mine from a shared genesis block until the adversary's
/// withheld fork overtakes the public chain and reorganizes away a
/// payment a vendor already shipped goods against.
#[derive(Parser, Debug)]
#[command(
    name = "sp-node",
    version,
    about = "Double-spend demonstration node",
    long_about = "Runs an honest miner and a colluding double-spend adversary \
                  against a shared genesis block and reports whether the \
                  adversary's private fork reorganized away the vendor's payment."
)]
struct Cli {
    /// Mining ticks each miner keeps running for after the attack resolves,
    /// to let the final reorg settle before the chain is inspected.
    #[arg(long, default_value_t = 6, env = "SPN_TICKS_AFTER_ATTACK")]
    ticks_after_attack: u32,

    /// Milliseconds each miner sleeps between mining ticks.
    #[arg(long, default_value_t = 50, env = "SPN_TICK_DELAY_MS")]
    tick_delay_ms: u64,

    /// Suppress log output to stderr.
    #[arg(short, long, default_value_t = false, env = "SPN_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let log_filter = if cli.quiet {
        EnvFilter::new("off")
    } else {
        EnvFilter::from_default_env().add_directive("sp_node=info".parse()?)
    };
    tracing_subscriber::fmt().with_env_filter(log_filter).init();

    let config = DemoConfig {
        ticks_after_attack: cli.ticks_after_attack,
        tick_delay_ms: cli.tick_delay_ms,
        quiet: cli.quiet,
    };

    info!(
        ticks_after_attack = config.ticks_after_attack,
        tick_delay_ms = config.tick_delay_ms,
        "starting double-spend demonstration"
    );

    let report = run_demo(config).await?;

    info!(
        canonical_chain_length = report.canonical_chain_length,
        adversary_final_mode = ?report.adversary_final_mode,
        vendor_payment_hash = %report.vendor_payment_hash,
        survived = report.vendor_payment_survived_on_canonical_chain,
        "demonstration complete"
    );

    if report.double_spend_succeeded {
        println!(
            "double-spend succeeded: the vendor's payment ({}) was reorganized off the canonical chain",
            report.vendor_payment_hash
        );
    } else {
        println!(
            "double-spend failed: the vendor's payment ({}) still stands on the canonical chain",
            report.vendor_payment_hash
        );
    }

    Ok(())
}
