//! DiffResult → notification messages.

use crate::constants::{fields, EMPTY_VALUE};
use crate::diff::{DiffResult, RecordDiff};
use crate::labels::FieldLabels;
use crate::notify::message::{
    NotificationBatch, NotifyMessage, COLOR_ADDED, COLOR_CHANGED, COLOR_REMOVED,
};
use crate::record::{clean_number, NormalizedRecord};
use crate::settings::NotifySettings;

/// Build the notification batch for a diff, `None` when nothing changed.
///
/// Messages come in diff order: added, changed, removed.
pub fn format_diff(
    diff: &DiffResult,
    settings: &NotifySettings,
    labels: &FieldLabels,
) -> Option<NotificationBatch> {
    if diff.is_empty() {
        return None;
    }

    let mut messages = Vec::with_capacity(diff.len());
    messages.extend(diff.added.iter().map(|d| added_message(d, settings, labels)));
    messages.extend(diff.changed.iter().map(|d| changed_message(d, settings, labels)));
    messages.extend(diff.removed.iter().map(|d| removed_message(d, settings, labels)));

    let (added, changed, removed) = diff.counts();
    let summary = format!(
        "📢 TWSE 競價拍賣資料更新：新增 {added} 筆、異動 {changed} 筆、移除 {removed} 筆"
    );

    Some(NotificationBatch { summary, messages })
}

/// Single message used to verify a webhook is reachable.
pub fn test_message(settings: &NotifySettings, sent_at: &str) -> NotifyMessage {
    NotifyMessage::new("✅ Webhook 已正確連線", COLOR_ADDED)
        .description("TWSE 競價拍賣行事曆的通知功能運作正常。\n當拍賣資料有任何變動時，會自動在此頻道發送通知。")
        .field("測試時間", sent_at, true)
        .field("通知類型", "新增 / 更新 / 移除", true)
        .footer(settings.footer.as_str())
}

fn added_message(diff: &RecordDiff, settings: &NotifySettings, labels: &FieldLabels) -> NotifyMessage {
    let record = &diff.record;
    let bid_period = format!("{} ~ {}", or_dash(record.bid_start()), or_dash(record.bid_end()));

    let mut message = NotifyMessage::new(format!("🆕 新增競拍｜{}", title_name(record)), COLOR_ADDED)
        .field(labels.label(fields::OPEN_DATE), or_dash(record.open_date()), true)
        .field("投標期間", bid_period, true)
        .field(labels.label(fields::LISTING_DATE), or_dash(record.listing_date()), true)
        .field(labels.label(fields::QUANTITY), or_dash(&clean_number(record.quantity())), true)
        .field(labels.label(fields::MIN_PRICE), or_dash(&clean_number(record.min_price())), true)
        .field(labels.label(fields::MARKET), or_dash(record.market()), true)
        .field(labels.label(fields::LEAD_UNDERWRITER), or_dash(record.lead_underwriter()), true);

    if record.is_cancelled() {
        message = message.field(labels.label(fields::CANCEL_REASON), record.cancel_reason(), false);
    }

    message.footer(settings.footer.as_str())
}

fn changed_message(diff: &RecordDiff, settings: &NotifySettings, labels: &FieldLabels) -> NotifyMessage {
    let record = &diff.record;
    let mut message = NotifyMessage::new(format!("✏️ 資料異動｜{}", title_name(record)), COLOR_CHANGED)
        .description(format!("{}：{}", labels.label(fields::OPEN_DATE), or_dash(record.open_date())));

    for change in &diff.changes {
        message = message.field(
            change.label.as_str(),
            format!("{} → {}", or_dash(&change.old), or_dash(&change.new)),
            false,
        );
    }

    message.footer(settings.footer.as_str())
}

fn removed_message(diff: &RecordDiff, settings: &NotifySettings, labels: &FieldLabels) -> NotifyMessage {
    let record = &diff.record;
    NotifyMessage::new(format!("🗑️ 已移除｜{}", title_name(record)), COLOR_REMOVED)
        .field(labels.label(fields::OPEN_DATE), or_dash(record.open_date()), true)
        .footer(settings.footer.as_str())
}

fn title_name(record: &NormalizedRecord) -> String {
    format!("{}（{}）", or_dash(record.name()), or_dash(record.code()))
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() { EMPTY_VALUE } else { value }
}
