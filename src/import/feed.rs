use serde_json::{Map, Value};

use super::amount::parse_money;
use crate::bank::RawRecord;

const TYPENAME: &str = "__typename";
const GENERIC_EVENT: &str = "GenericFeedEvent";

/// Pix transfers arrive as generic events; their title tells the direction.
const PIX_TITLES: &[(&str, &str)] = &[
    ("Transferência enviada", "PixTransferOutEvent"),
    ("Transferência recebida", "PixTransferInEvent"),
    ("Transferência Recebida", "PixTransferInEvent"),
    ("Reembolso recebido", "PixTransferOutReversalEvent"),
    ("Reembolso enviado", "PixTransferInReversalEvent"),
];

/// Events whose amount is only present inside `detail`.
const RESERVE_EVENTS: &[&str] = &["AddToReserveEvent", "RemoveFromReserveEvent"];

/// Rewrite the raw account feed into the shape the parser expects: Pix
/// generic events get their real kind and an amount, reserve movements get
/// an amount, and the remaining generic events are dropped.
pub(crate) fn normalize_account_feed(raw: Vec<RawRecord>) -> Vec<RawRecord> {
    let before = raw.len();
    let normalized: Vec<RawRecord> = raw.into_iter().filter_map(normalize_event).collect();
    tracing::info!(
        raw_count = before,
        normalized_count = normalized.len(),
        "Normalized account feed"
    );
    normalized
}

fn normalize_event(mut event: RawRecord) -> Option<RawRecord> {
    // Anything without a kind goes through untouched so the parser logs it.
    let Some(object) = event.as_object_mut() else {
        return Some(event);
    };
    let typename = object
        .get(TYPENAME)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    if typename == GENERIC_EVENT {
        let title = object.get("title").and_then(Value::as_str).unwrap_or_default();
        let (_, pix_kind) = PIX_TITLES.iter().find(|(t, _)| *t == title)?;
        object.insert(TYPENAME.into(), Value::from(*pix_kind));
        fill_amount_from_detail(object);
    } else if RESERVE_EVENTS.contains(&typename.as_str()) {
        fill_amount_from_detail(object);
    }
    Some(event)
}

/// Left untouched when the detail holds no amount; the parser then rejects
/// the record for its missing amount.
fn fill_amount_from_detail(event: &mut Map<String, Value>) {
    let detail = event.get("detail").and_then(Value::as_str).unwrap_or_default();
    let amount = parse_money(detail)
        .and_then(|d| d.to_string().parse::<f64>().ok())
        .and_then(serde_json::Number::from_f64);
    match amount {
        Some(amount) => {
            event.insert("amount".into(), Value::Number(amount));
        }
        None => tracing::warn!(?event, "No amount found in event detail"),
    }
}

#[cfg(test)]
#[path = "feed_tests.rs"]
mod tests;
