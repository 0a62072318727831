//! ARQ Sender - Reliable datagram sender
//!
//! Transmits a run of fixed-size messages over UDP using either the
//! stop-and-wait or the sliding-window scheme, then prints transfer
//! statistics. The receiver must be started with matching parameters.

use arq::io::UdpChannel;
use arq::{FrameCodec, SlidingWindowSender, StopWaitSender, RETRANSMIT_TIMEOUT_US};
use arq_cli::{display_summary, message_payload, Config, Mode, SenderConfig, TransferSummary};
use clap::Parser;
use std::net::SocketAddr;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "arq-sender")]
#[command(about = "Reliable UDP sender", long_about = None)]
struct Args {
    /// Receiver address (host:port)
    #[arg(short, long)]
    remote: Option<SocketAddr>,

    /// Local bind address
    #[arg(short, long, default_value = "0.0.0.0:0")]
    bind: SocketAddr,

    /// Transfer scheme (stopwait, sliding)
    #[arg(short, long, default_value = "sliding")]
    mode: String,

    /// Number of messages to send
    #[arg(short, long, default_value = "100")]
    count: u64,

    /// Window size (sliding mode)
    #[arg(short, long, default_value = "4")]
    window_size: u32,

    /// Payload size in bytes
    #[arg(short, long, default_value = "32")]
    payload_len: usize,

    /// Retransmission threshold in microseconds
    #[arg(short, long, default_value_t = RETRANSMIT_TIMEOUT_US)]
    timeout_us: u64,

    /// Configuration file ([sender] section overrides the flags above)
    #[arg(long)]
    config: Option<String>,
}

fn sender_config(args: &Args) -> anyhow::Result<SenderConfig> {
    if let Some(path) = &args.config {
        let config = Config::from_file(path)?;
        return config
            .sender
            .ok_or_else(|| anyhow::anyhow!("config file has no [sender] section"));
    }

    let mode = match args.mode.as_str() {
        "stopwait" => Mode::StopWait,
        "sliding" => Mode::Sliding,
        other => anyhow::bail!("unknown mode '{}', expected stopwait or sliding", other),
    };

    Ok(SenderConfig {
        remote: args
            .remote
            .ok_or_else(|| anyhow::anyhow!("--remote is required without --config"))?,
        bind: Some(args.bind),
        mode,
        count: args.count,
        window_size: args.window_size,
        payload_len: args.payload_len,
        timeout_us: args.timeout_us,
    })
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let config = sender_config(&args)?;
    config.validate()?;

    let bind = config.bind.unwrap_or("0.0.0.0:0".parse()?);
    let channel = UdpChannel::connect(bind, config.remote)?;
    tracing::info!(
        local = %channel.local_addr()?,
        remote = %config.remote,
        mode = ?config.mode,
        count = config.count,
        "sender starting"
    );

    let codec = FrameCodec::new(config.payload_len);
    let payload_len = config.payload_len;
    let source = move |msg_num: u64| message_payload(msg_num, payload_len);

    let start = Instant::now();
    let retransmissions = match config.mode {
        Mode::StopWait => {
            let mut sender = StopWaitSender::with_timeout(channel, codec, config.timeout_us);
            sender.transmit(config.count, source)?
        }
        Mode::Sliding => {
            let mut sender = SlidingWindowSender::with_timeout(
                channel,
                codec,
                config.window_size,
                config.timeout_us,
            );
            sender.transmit(config.count, source)?
        }
    };
    let elapsed = start.elapsed();

    tracing::info!(retransmissions, ?elapsed, "transfer complete");
    display_summary(
        "sender",
        &TransferSummary {
            messages: config.count,
            payload_len: config.payload_len,
            retransmissions,
            elapsed,
        },
    );

    Ok(())
}
