use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::amount::float_to_decimal;
use super::{parse_uuid, RecordError};
use crate::bank::RawRecord;
use crate::models::{AccountStatement, EventKind};

/// Stand-in for an incoming transfer whose sender the bank does not report.
pub(crate) const UNKNOWN_ACCOUNT: &str = "UNKNOWN";

/// Fields every account event carries.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventFields {
    id: String,
    amount: f64,
    detail: String,
    post_date: String,
    title: String,
}

/// Counterparty object as sent. An empty object counts as absent.
type Counterparty = Map<String, Value>;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OutgoingTransfer {
    #[serde(flatten)]
    fields: EventFields,
    #[serde(default)]
    destination_account: Option<Counterparty>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IncomingTransfer {
    #[serde(flatten)]
    fields: EventFields,
    #[serde(default)]
    origin_account: Option<Counterparty>,
}

/// Account feed entry, keyed on the upstream `__typename`.
#[derive(Debug, Deserialize)]
#[serde(tag = "__typename")]
enum RawAccountEvent {
    TransferOutEvent(OutgoingTransfer),
    PixTransferOutEvent(OutgoingTransfer),
    TransferInEvent(IncomingTransfer),
    BillPaymentEvent(EventFields),
    BarcodePaymentEvent(EventFields),
    TransferOutReversalEvent(EventFields),
    RemoveFromReserveEvent(EventFields),
    AddToReserveEvent(EventFields),
    DebitPurchaseEvent(EventFields),
    DebitWithdrawalFeeEvent(EventFields),
    DebitWithdrawalEvent(EventFields),
}

impl RawAccountEvent {
    /// Split into kind, common fields and the counterparty name.
    fn into_parts(self) -> Result<(EventKind, EventFields, Option<String>), RecordError> {
        let parts = match self {
            Self::TransferOutEvent(t) => {
                let name = match non_empty(t.destination_account) {
                    Some(account) => counterparty_name("destinationAccount", &account)?,
                    None => None,
                };
                (EventKind::TransferOut, t.fields, name)
            }
            Self::PixTransferOutEvent(t) => {
                let name = match non_empty(t.destination_account) {
                    Some(account) => counterparty_name("destinationAccount", &account)?,
                    None => t.fields.detail.lines().next().map(str::to_string),
                };
                (EventKind::PixTransferOut, t.fields, name)
            }
            Self::TransferInEvent(t) => {
                // Only a missing name key means the sender is unknown; an
                // explicit null is left for validation to reject.
                let origin = t.origin_account.unwrap_or_default();
                let name = if origin.contains_key("name") {
                    counterparty_name("originAccount", &origin)?
                } else {
                    Some(UNKNOWN_ACCOUNT.to_string())
                };
                (EventKind::TransferIn, t.fields, name)
            }
            Self::BillPaymentEvent(f) => (EventKind::BillPayment, f, None),
            Self::BarcodePaymentEvent(f) => (EventKind::BarcodePayment, f, None),
            Self::TransferOutReversalEvent(f) => (EventKind::TransferOutReversal, f, None),
            Self::RemoveFromReserveEvent(f) => (EventKind::RemoveFromReserve, f, None),
            Self::AddToReserveEvent(f) => (EventKind::AddToReserve, f, None),
            Self::DebitPurchaseEvent(f) => (EventKind::DebitPurchase, f, None),
            Self::DebitWithdrawalFeeEvent(f) => (EventKind::DebitWithdrawalFee, f, None),
            Self::DebitWithdrawalEvent(f) => (EventKind::DebitWithdrawal, f, None),
        };
        Ok(parts)
    }
}

fn non_empty(account: Option<Counterparty>) -> Option<Counterparty> {
    account.filter(|a| !a.is_empty())
}

fn counterparty_name(
    field: &'static str,
    account: &Counterparty,
) -> Result<Option<String>, RecordError> {
    match account.get("name") {
        Some(Value::String(name)) => Ok(Some(name.clone())),
        Some(Value::Null) => Ok(None),
        Some(other) => Err(RecordError::field(field, format!("name is not text: {other}"))),
        None => Err(RecordError::field(field, "account has no name".into())),
    }
}

/// Parse and validate raw account events, skipping (and logging) the bad
/// ones. Relative order of the good records is kept.
pub(crate) fn parse_account_statements(raw: &[RawRecord]) -> Vec<AccountStatement> {
    tracing::info!(account_statements_count = raw.len(), "Starting parsing of account statements");

    let mut parsed = Vec::with_capacity(raw.len());
    for record in raw {
        match parse_account_statement(record) {
            Ok(statement) => parsed.push(statement),
            Err(e) => tracing::error!(error = %e, statement = %record, "Could not parse statement"),
        }
    }

    tracing::info!(parsed_account_statements_count = parsed.len(), "Parsed account statements");
    parsed
}

pub(crate) fn parse_account_statement(record: &RawRecord) -> Result<AccountStatement, RecordError> {
    let (kind, fields, account_name) = RawAccountEvent::deserialize(record)?.into_parts()?;

    let post_date = NaiveDate::parse_from_str(&fields.post_date, "%Y-%m-%d")
        .map_err(|e| RecordError::field("postDate", format!("'{}': {e}", fields.post_date)))?;

    let mut statement = AccountStatement::new(
        parse_uuid("id", &fields.id)?,
        kind,
        float_to_decimal("amount", fields.amount)?,
        fields.detail,
        post_date,
        fields.title,
    );
    if kind.is_transfer_out() {
        statement.destination_account = account_name;
    } else if kind.is_transfer_in() {
        statement.origin_account = account_name;
    }

    statement.validate()?;
    Ok(statement)
}

#[cfg(test)]
#[path = "account_tests.rs"]
mod tests;
