//! Human-readable status lines for the bulk question stream.
use crate::BulkStatus;

const QUESTION_PREVIEW_CHARS: usize = 60;

/// Renders milliseconds as `1h 2m 3s`, rounding up to whole seconds.
pub fn format_countdown(ms: u64) -> String {
    let total_seconds = ms.div_ceil(1000);
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    let mut parts = Vec::with_capacity(3);
    if hours > 0 {
        parts.push(format!("{hours}h"));
    }
    if minutes > 0 || hours > 0 {
        parts.push(format!("{minutes}m"));
    }
    parts.push(format!("{seconds}s"));
    parts.join(" ")
}

/// Cuts `text` to `max` characters, ending with an ellipsis when shortened.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

pub fn waiting_status(index: usize, total: usize, elapsed_ms: u64, timeout_ms: u64) -> String {
    let total = if total == 0 { index.max(1) } else { total };
    let mut parts = vec![
        format!("Waiting for reply {index}/{total}"),
        format!("elapsed {}", format_countdown(elapsed_ms)),
    ];
    if timeout_ms > 0 {
        let remaining = timeout_ms.saturating_sub(elapsed_ms);
        parts.push(format!("time left {}", format_countdown(remaining)));
    }
    parts.join(" - ")
}

/// `index` is the number of questions already answered.
pub fn delay_status(index: usize, total: usize, remaining_ms: u64) -> String {
    let next = index + 1;
    let total = if total == 0 { next } else { total };
    if remaining_ms == 0 {
        format!("Next question starting ({next}/{total}).")
    } else {
        format!(
            "Next question in {} ({next}/{total}).",
            format_countdown(remaining_ms)
        )
    }
}

pub fn bulk_status_text(status: &BulkStatus) -> String {
    match status {
        BulkStatus::Queued { total, .. } => format!("Bulk queue ready: {total} question(s)."),
        BulkStatus::QueuedMore { added, pending, .. } => {
            format!("Added {added} question(s). Pending: {pending}.")
        }
        BulkStatus::Started { total, .. } => format!("Bulk run started ({total} question(s))."),
        BulkStatus::Asking {
            index,
            total,
            question,
            ..
        } => format!(
            "Asking {index}/{total}: {}",
            truncate(question, QUESTION_PREVIEW_CHARS)
        ),
        BulkStatus::WaitingReply {
            index,
            total,
            elapsed_ms,
            timeout_ms,
            ..
        } => waiting_status(*index, *total, *elapsed_ms, *timeout_ms),
        BulkStatus::Answered { index, total, .. } => format!("Received {index}/{total}."),
        BulkStatus::Delay {
            index,
            total,
            remaining_ms,
            ..
        } => delay_status(*index, *total, *remaining_ms),
        BulkStatus::Complete { processed } => {
            format!("Bulk Q&A finished ({processed} question(s)).")
        }
        BulkStatus::Error { error } => {
            let error = if error.is_empty() { "Unknown error" } else { error };
            format!("Bulk Q&A stopped: {}.", error.trim_end_matches('.'))
        }
    }
}
