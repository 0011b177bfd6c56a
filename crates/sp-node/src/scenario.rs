use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use sp_blockchain::{Block, Blockchain};
use sp_crypto::Keypair;
use sp_miner::{AdversaryMiner, HonestMiner, MinerCore, MinerHooks, Mode, TransactionPool};
use sp_net::{decode_frame, Frame, PeerDirectory, PeerRecord, Role};
use sp_transaction::Transaction;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::{config::DemoConfig, error::NodeError, transport::Bus};

/// Outcome of one scripted double-spend run: what the CLI prints, and what
/// an integration test asserts on.
#[derive(Debug, Clone)]
pub struct DemoReport {
    pub canonical_chain_length: u64,
    pub adversary_final_mode: Mode,
    pub vendor_payment_hash: String,
    pub vendor_payment_survived_on_canonical_chain: bool,
    pub double_spend_succeeded: bool,
}

fn generate_actor() -> (Keypair, String) {
    let keypair = Keypair::generate();
    let pubkey_hex = hex::encode(keypair.public_key_bytes());
    (keypair, pubkey_hex)
}

fn signed_payment(
    signer: &Keypair,
    receiver_pk_hex: &str,
    amount: u64,
    nonce: u64,
) -> Result<Transaction, NodeError> {
    let receiver_pk = hex::decode(receiver_pk_hex).expect("pubkey was hex-encoded by this binary");
    let sender_pk = signer.public_key_bytes();
    Ok(Transaction::create(&sender_pk, &receiver_pk, amount, signer, nonce, None)?)
}

fn spawn_reader<H>(mut rx: tokio::sync::mpsc::UnboundedReceiver<Vec<u8>>, core: Arc<MinerCore<H>>)
where
    H: MinerHooks + 'static,
{
    tokio::spawn(async move {
        while let Some(bytes) = rx.recv().await {
            match decode_frame(&bytes) {
                Ok(Frame::Block { blk_json }) => match serde_json::from_str::<Block>(&blk_json) {
                    Ok(block) => core.handle_inbound_block(block),
                    Err(e) => warn!(error = %e, "dropping malformed block frame"),
                },
                Ok(Frame::Transaction { tx_json }) => match serde_json::from_str::<Transaction>(&tx_json) {
                    Ok(tx) => core.handle_inbound_tx(tx),
                    Err(e) => warn!(error = %e, "dropping malformed transaction frame"),
                },
                Ok(Frame::ProductDelivered { tx_hash }) => {
                    info!(tx_hash = %tx_hash, "product-delivered notification observed");
                }
                Err(e) => warn!(error = %e, "dropping unparseable frame"),
            }
        }
    });
}

fn spawn_miner_thread<H>(core: Arc<MinerCore<H>>, running: Arc<AtomicBool>, delay: Duration) -> thread::JoinHandle<()>
where
    H: MinerHooks + 'static,
{
    thread::spawn(move || {
        while running.load(Ordering::Relaxed) {
            if let Err(e) = core.tick() {
                warn!(error = %e, "mining tick failed");
            }
            thread::sleep(delay);
        }
    })
}

async fn wait_until(mut condition: impl FnMut() -> bool, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if condition() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

/// Walk the chain backward from `tip_hash`, returning `true` if any block
/// carries a transaction hashing to `target_hash`.
fn canonical_chain_contains(chain: &Blockchain, tip_hash: &str, target_hash: &str) -> bool {
    let mut cursor = Some(tip_hash.to_string());
    while let Some(hash) = cursor {
        let block = chain.get(&hash).expect("resolved ancestor is always retained");
        let found = block
            .transactions
            .iter()
            .any(|tx| tx.hash_hex().map(|h| h == target_hash).unwrap_or(false));
        if found {
            return true;
        }
        cursor = block.header.prev_hash.clone();
    }
    false
}

/// Run the full scripted double-spend demonstration: an honest miner and a
/// colluding adversary both mine from the same genesis; the adversary pays
/// a lightweight client, who in turn pays a vendor for goods, then refunds
/// the adversary once the vendor ships — at which point the adversary
/// releases a private fork that reorganizes the vendor's payment away.
pub async fn run_demo(cfg: DemoConfig) -> Result<DemoReport, NodeError> {
    let (adversary_kp, adversary_pk) = generate_actor();
    let (bad_spv_kp, bad_spv_pk) = generate_actor();
    let (_vendor_kp, vendor_pk) = generate_actor();

    let genesis = Block::genesis()?;
    let honest_chain = Arc::new(RwLock::new(Blockchain::with_genesis(genesis.clone())?));
    let adversary_chain = Arc::new(RwLock::new(Blockchain::with_genesis(genesis)?));
    let honest_pool = Arc::new(Mutex::new(TransactionPool::new()));
    let adversary_pool = Arc::new(Mutex::new(TransactionPool::new()));

    let directory = Arc::new(PeerDirectory::new());
    directory.register(
        Role::HonestMiner,
        PeerRecord {
            pubkey: String::new(),
            address: "honest".to_string(),
            name: "honest-miner".to_string(),
        },
    );
    directory.register(
        Role::AdversaryMiner,
        PeerRecord {
            pubkey: adversary_pk.clone(),
            address: "adversary".to_string(),
            name: "adversary-miner".to_string(),
        },
    );
    directory.register(
        Role::DoubleSpendSpvClient,
        PeerRecord {
            pubkey: bad_spv_pk.clone(),
            address: "bad-spv".to_string(),
            name: "bad-spv".to_string(),
        },
    );
    directory.register(
        Role::Vendor,
        PeerRecord {
            pubkey: vendor_pk.clone(),
            address: "vendor".to_string(),
            name: "vendor".to_string(),
        },
    );

    for role in [Role::HonestMiner, Role::AdversaryMiner, Role::DoubleSpendSpvClient, Role::Vendor] {
        if let Ok(record) = directory.find_by_role(role) {
            info!(peer = %record.name, address = %record.address, "registered peer");
        }
    }

    let bus = Arc::new(Bus::new());
    let honest_rx = bus.subscribe(Role::HonestMiner);
    let adversary_rx = bus.subscribe(Role::AdversaryMiner);

    let honest_core = {
        let bus = bus.clone();
        Arc::new(MinerCore::new(
            honest_chain.clone(),
            honest_pool.clone(),
            HonestMiner::new(),
            move |block: Block| {
                let blk_json = serde_json::to_string(&block).expect("block serializes");
                if let Err(e) = bus.broadcast_except(Role::HonestMiner, &Frame::Block { blk_json }) {
                    warn!(error = %e, "honest miner could not broadcast a mined block");
                }
            },
        ))
    };

    let adversary_miner = AdversaryMiner::new(adversary_pk.clone(), bad_spv_pk.clone(), vendor_pk.clone());
    let adversary_core = {
        let bus = bus.clone();
        Arc::new(MinerCore::new(
            adversary_chain.clone(),
            adversary_pool.clone(),
            adversary_miner,
            move |block: Block| {
                let blk_json = serde_json::to_string(&block).expect("block serializes");
                if let Err(e) = bus.broadcast_except(Role::AdversaryMiner, &Frame::Block { blk_json }) {
                    warn!(error = %e, "adversary miner could not broadcast a released block");
                }
            },
        ))
    };

    spawn_reader(honest_rx, honest_core.clone());
    spawn_reader(adversary_rx, adversary_core.clone());

    let delay = Duration::from_millis(cfg.tick_delay_ms);
    let running = Arc::new(AtomicBool::new(true));
    let honest_thread = spawn_miner_thread(honest_core.clone(), running.clone(), delay);
    let adversary_thread = spawn_miner_thread(adversary_core.clone(), running.clone(), delay);

    // Let a couple of ordinary blocks accumulate before the attack starts.
    tokio::time::sleep(delay * 3).await;

    let tx1 = signed_payment(&adversary_kp, &bad_spv_pk, 500, 0)?;
    let tx1_json = serde_json::to_string(&tx1)?;
    bus.send_to(Role::HonestMiner, &Frame::Transaction { tx_json: tx1_json.clone() })?;
    bus.send_to(Role::AdversaryMiner, &Frame::Transaction { tx_json: tx1_json })?;
    info!("adversary paid the colluding lightweight client");

    wait_until(|| adversary_core.hooks.mode() != Mode::Init, Duration::from_secs(10)).await;
    info!(mode = ?adversary_core.hooks.mode(), "adversary observed its own payment confirmed");

    let tx2 = signed_payment(&bad_spv_kp, &vendor_pk, 500, 0)?;
    let tx2_hash = tx2.hash_hex()?;
    let tx2_json = serde_json::to_string(&tx2)?;
    bus.send_to(Role::HonestMiner, &Frame::Transaction { tx_json: tx2_json.clone() })?;
    bus.send_to(Role::AdversaryMiner, &Frame::Transaction { tx_json: tx2_json })?;
    info!("lightweight client paid the vendor");

    tokio::time::sleep(delay * 3).await;
    info!("vendor delivered the product on the strength of that payment");

    let tx3 = signed_payment(&bad_spv_kp, &adversary_pk, 500, 1)?;
    let tx3_json = serde_json::to_string(&tx3)?;
    bus.send_to(Role::HonestMiner, &Frame::Transaction { tx_json: tx3_json.clone() })?;
    bus.send_to(Role::AdversaryMiner, &Frame::Transaction { tx_json: tx3_json })?;
    info!("lightweight client refunded the adversary");

    wait_until(|| adversary_core.hooks.mode() == Mode::Fire, Duration::from_secs(10)).await;
    info!("adversary is racing to overtake the public chain");

    wait_until(|| adversary_core.hooks.mode() == Mode::Init, Duration::from_secs(30)).await;
    info!("adversary released its private fork");

    tokio::time::sleep(delay * cfg.ticks_after_attack as u32).await;

    running.store(false, Ordering::Relaxed);
    let _ = tokio::task::spawn_blocking(move || {
        let _ = honest_thread.join();
        let _ = adversary_thread.join();
    })
    .await;

    let resolved_hash = honest_chain.write().resolve().hash_hex();
    let canonical_chain_length = *honest_chain.read().tips().get(&resolved_hash).unwrap_or(&0);
    let survived = canonical_chain_contains(&honest_chain.read(), &resolved_hash, &tx2_hash);

    Ok(DemoReport {
        canonical_chain_length,
        adversary_final_mode: adversary_core.hooks.mode(),
        vendor_payment_hash: tx2_hash,
        vendor_payment_survived_on_canonical_chain: survived,
        double_spend_succeeded: !survived,
    })
}
