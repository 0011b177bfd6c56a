/// Runtime knobs for the double-spend demonstration run.
#[derive(Debug, Clone)]
pub struct DemoConfig {
    /// How many mining ticks each miner runs before the process exits,
    /// once the scripted attack timeline has played out.
    pub ticks_after_attack: u32,

    /// Milliseconds each miner sleeps between ticks, so the gossip tasks
    /// get a chance to run between blocks on a single-core machine.
    pub tick_delay_ms: u64,

    /// Suppress log output to stderr.
    pub quiet: bool,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            ticks_after_attack: 6,
            tick_delay_ms: 50,
            quiet: false,
        }
    }
}
