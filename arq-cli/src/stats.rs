//! Statistics display and formatting

use std::time::Duration;

/// Summary of a completed transfer
#[derive(Debug, Clone)]
pub struct TransferSummary {
    /// Messages delivered (receiver) or acknowledged (sender)
    pub messages: u64,
    /// Payload bytes per message
    pub payload_len: usize,
    /// Retransmitted frames (sender side; 0 for receivers)
    pub retransmissions: u64,
    /// Wall-clock duration of the transfer
    pub elapsed: Duration,
}

impl TransferSummary {
    pub fn payload_bytes(&self) -> u64 {
        self.messages * self.payload_len as u64
    }

    pub fn throughput_bps(&self) -> u64 {
        let micros = self.elapsed.as_micros();
        if micros == 0 {
            return 0;
        }
        ((self.payload_bytes() as u128 * 8 * 1_000_000) / micros) as u64
    }
}

/// Format bytes in human-readable form
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Format bandwidth in human-readable form
pub fn format_bandwidth(bps: u64) -> String {
    const KBPS: u64 = 1000;
    const MBPS: u64 = KBPS * 1000;
    const GBPS: u64 = MBPS * 1000;

    if bps >= GBPS {
        format!("{:.2} Gbps", bps as f64 / GBPS as f64)
    } else if bps >= MBPS {
        format!("{:.2} Mbps", bps as f64 / MBPS as f64)
    } else if bps >= KBPS {
        format!("{:.2} Kbps", bps as f64 / KBPS as f64)
    } else {
        format!("{} bps", bps)
    }
}

/// Format duration in human-readable form
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;

    if hours > 0 {
        format!("{}h {:02}m {:02}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {:02}s", minutes, seconds)
    } else if secs > 0 {
        format!("{}s", seconds)
    } else {
        format!("{}ms", duration.as_millis())
    }
}

/// Display a transfer summary
pub fn display_summary(role: &str, summary: &TransferSummary) {
    println!("\n┌─────────────────────────────────────────────┐");
    println!("│ TRANSFER SUMMARY ({:8})                  │", role);
    println!("├─────────────────────────────────────────────┤");
    println!("│ Messages:        {:20}       │", summary.messages);
    println!(
        "│ Payload:         {:20}       │",
        format_bytes(summary.payload_bytes())
    );
    println!("│ Retransmissions: {:20}       │", summary.retransmissions);
    println!(
        "│ Elapsed:         {:20}       │",
        format_duration(summary.elapsed)
    );
    println!(
        "│ Throughput:      {:20}       │",
        format_bandwidth(summary.throughput_bps())
    );
    println!("└─────────────────────────────────────────────┘");
}
