//! ARQ Receiver - Reliable datagram receiver
//!
//! Waits for a sender, receives a run of fixed-size messages over UDP
//! using either the stop-and-wait or the sliding-window scheme, verifies
//! the payload contents, and prints transfer statistics.

use arq::io::{ArqSocket, UdpChannel};
use arq::{FrameCodec, SlidingWindowReceiver, StopWaitReceiver};
use arq_cli::{display_summary, message_payload, Config, Mode, ReceiverConfig, TransferSummary};
use clap::Parser;
use std::net::SocketAddr;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "arq-receiver")]
#[command(about = "Reliable UDP receiver", long_about = None)]
struct Args {
    /// Listen address (host:port)
    #[arg(short, long, default_value = "0.0.0.0:4500")]
    listen: SocketAddr,

    /// Transfer scheme (stopwait, sliding)
    #[arg(short, long, default_value = "sliding")]
    mode: String,

    /// Number of messages to receive
    #[arg(short, long, default_value = "100")]
    count: u64,

    /// Window size (sliding mode)
    #[arg(short, long, default_value = "4")]
    window_size: u32,

    /// Payload size in bytes
    #[arg(short, long, default_value = "32")]
    payload_len: usize,

    /// Configuration file ([receiver] section overrides the flags above)
    #[arg(long)]
    config: Option<String>,
}

fn receiver_config(args: &Args) -> anyhow::Result<ReceiverConfig> {
    if let Some(path) = &args.config {
        let config = Config::from_file(path)?;
        return config
            .receiver
            .ok_or_else(|| anyhow::anyhow!("config file has no [receiver] section"));
    }

    let mode = match args.mode.as_str() {
        "stopwait" => Mode::StopWait,
        "sliding" => Mode::Sliding,
        other => anyhow::bail!("unknown mode '{}', expected stopwait or sliding", other),
    };

    Ok(ReceiverConfig {
        listen: args.listen,
        mode,
        count: args.count,
        window_size: args.window_size,
        payload_len: args.payload_len,
    })
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let config = receiver_config(&args)?;
    config.validate()?;

    let socket = ArqSocket::bind(config.listen)?;
    tracing::info!(listen = %socket.local_addr()?, mode = ?config.mode, "waiting for sender");

    // First frame tells us who the sender is; it stays queued for the
    // protocol loop to consume.
    let peer = socket.wait_peer()?;
    tracing::info!(%peer, "sender connected");
    let channel = UdpChannel::from_socket(socket, peer);

    let codec = FrameCodec::new(config.payload_len);
    let payload_len = config.payload_len;

    let mut delivered = 0u64;
    let mut corrupt = 0u64;
    let mut sink = |payload: bytes::Bytes| {
        if payload != message_payload(delivered, payload_len) {
            corrupt += 1;
            tracing::warn!(msg_num = delivered, "payload mismatch");
        }
        delivered += 1;
    };

    let start = Instant::now();
    match config.mode {
        Mode::StopWait => {
            let mut receiver = StopWaitReceiver::new(channel, codec);
            receiver.receive(config.count, &mut sink)?;
        }
        Mode::Sliding => {
            let mut receiver = SlidingWindowReceiver::new(channel, codec, config.window_size);
            receiver.receive(config.count, &mut sink)?;
        }
    }
    let elapsed = start.elapsed();

    tracing::info!(delivered, corrupt, ?elapsed, "transfer complete");
    if corrupt > 0 {
        tracing::error!(corrupt, "some payloads did not match the expected pattern");
    }
    display_summary(
        "receiver",
        &TransferSummary {
            messages: delivered,
            payload_len: config.payload_len,
            retransmissions: 0,
            elapsed,
        },
    );

    Ok(())
}
