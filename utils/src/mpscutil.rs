use std::sync::mpsc;

/// Sends `value` on `sender`, logging a warning if the receiver has gone away.
pub fn send_or_log_warning<T>(sender: &mpsc::Sender<T>, description: &str, value: T) {
    if let Err(mpsc::SendError(_)) = sender.send(value) {
        log::warn!("Dropped {description}: receiver has gone away.");
    }
}
