use sp_miner::Mode;
use sp_node::{run_demo, DemoConfig};

/// End-to-end rendition of the double-spend scenario: an honest miner and
/// a colluding adversary share a genesis block; the adversary pays a
/// lightweight client who pays a vendor, the vendor ships, the client
/// refunds the adversary, and the adversary's withheld fork overtakes the
/// public chain — reorganizing the vendor's payment off the canonical
/// chain.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn double_spend_demo_reorganizes_the_vendor_payment_away() {
    let cfg = DemoConfig {
        ticks_after_attack: 4,
        tick_delay_ms: 20,
        quiet: true,
    };

    let report = run_demo(cfg).await.expect("demo run completes");

    assert_eq!(report.adversary_final_mode, Mode::Init);
    assert!(!report.vendor_payment_survived_on_canonical_chain);
    assert!(report.double_spend_succeeded);
    assert!(report.canonical_chain_length >= 3);
}
