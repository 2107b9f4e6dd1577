//! Byte-level upload progress.

use tokio::sync::mpsc;

/// Bytes handed to the transport so far, out of the total body size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadProgress {
    /// Bytes sent.
    pub sent: u64,
    /// Total bytes to send.
    pub total: u64,
}

impl UploadProgress {
    /// Whole percentage in `0..=100`, rounded to nearest.
    ///
    /// An empty body reports 0 until the upload finishes.
    #[must_use]
    pub fn percent(self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        let sent = u128::from(self.sent.min(self.total));
        let total = u128::from(self.total);
        let pct = (sent * 100 + total / 2) / total;
        // pct <= 100 because sent <= total
        u8::try_from(pct).unwrap_or(100)
    }
}

/// Sending half of a progress channel.
///
/// Reports never fail: once the receiver is gone, progress is simply dropped.
#[derive(Debug, Clone)]
pub struct ProgressSender {
    tx: mpsc::UnboundedSender<UploadProgress>,
}

impl ProgressSender {
    /// Create a linked sender/receiver pair.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<UploadProgress>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Report `sent` of `total` bytes.
    pub fn report(&self, sent: u64, total: u64) {
        let _ = self.tx.send(UploadProgress { sent, total });
    }
}
