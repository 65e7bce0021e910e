use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

use super::validation::{check_amount, max_chars, require_text, ValidationError};

/// Event kinds the checking-account feed can produce for a persisted statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    TransferOut,
    BillPayment,
    BarcodePayment,
    PixTransferOut,
    TransferOutReversal,
    TransferIn,
    RemoveFromReserve,
    AddToReserve,
    DebitPurchase,
    DebitWithdrawalFee,
    DebitWithdrawal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventGroup {
    Debit,
    Credit,
    Reserve,
    Other,
}

impl EventKind {
    /// Upstream `__typename` for the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TransferOut => "TransferOutEvent",
            Self::BillPayment => "BillPaymentEvent",
            Self::BarcodePayment => "BarcodePaymentEvent",
            Self::PixTransferOut => "PixTransferOutEvent",
            Self::TransferOutReversal => "TransferOutReversalEvent",
            Self::TransferIn => "TransferInEvent",
            Self::RemoveFromReserve => "RemoveFromReserveEvent",
            Self::AddToReserve => "AddToReserveEvent",
            Self::DebitPurchase => "DebitPurchaseEvent",
            Self::DebitWithdrawalFee => "DebitWithdrawalFeeEvent",
            Self::DebitWithdrawal => "DebitWithdrawalEvent",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::all().iter().copied().find(|k| k.as_str() == s)
    }

    /// Case-insensitive match on the typename, with or without the
    /// `Event` suffix (`transferin`, `TransferInEvent`).
    pub fn parse_lenient(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::all().iter().copied().find(|k| {
            let name = k.as_str();
            name.eq_ignore_ascii_case(s)
                || name
                    .strip_suffix("Event")
                    .is_some_and(|short| short.eq_ignore_ascii_case(s))
        })
    }

    pub fn all() -> &'static [EventKind] {
        &[
            Self::TransferOut,
            Self::BillPayment,
            Self::BarcodePayment,
            Self::PixTransferOut,
            Self::TransferOutReversal,
            Self::TransferIn,
            Self::RemoveFromReserve,
            Self::AddToReserve,
            Self::DebitPurchase,
            Self::DebitWithdrawalFee,
            Self::DebitWithdrawal,
        ]
    }

    pub fn group(&self) -> EventGroup {
        match self {
            Self::TransferOut | Self::BillPayment | Self::BarcodePayment | Self::PixTransferOut => {
                EventGroup::Debit
            }
            Self::TransferOutReversal | Self::TransferIn => EventGroup::Credit,
            Self::RemoveFromReserve | Self::AddToReserve => EventGroup::Reserve,
            Self::DebitPurchase | Self::DebitWithdrawalFee | Self::DebitWithdrawal => {
                EventGroup::Other
            }
        }
    }

    /// Kinds whose name ends in `TransferOutEvent`.
    pub fn is_transfer_out(&self) -> bool {
        self.as_str().ends_with("TransferOutEvent")
    }

    pub fn is_transfer_in(&self) -> bool {
        *self == Self::TransferIn
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown event kind '{0}'")]
pub struct UnknownEventKind(pub String);

impl FromStr for EventKind {
    type Err = UnknownEventKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| UnknownEventKind(s.to_string()))
    }
}

impl std::fmt::Display for EventGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Debit => "Debit",
            Self::Credit => "Credit",
            Self::Reserve => "Reserve",
            Self::Other => "Other",
        };
        write!(f, "{label}")
    }
}

/// One checking-account event.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountStatement {
    pub id: Option<i64>,
    pub external_id: Uuid,
    pub destination_account: Option<String>,
    pub origin_account: Option<String>,
    pub amount: Decimal,
    pub detail: String,
    pub post_date: NaiveDate,
    pub title: String,
    pub kind: EventKind,
}

impl AccountStatement {
    pub const ACCOUNT_NAME_MAX_LEN: usize = 256;
    pub const TITLE_MAX_LEN: usize = 128;

    pub fn new(
        external_id: Uuid,
        kind: EventKind,
        amount: Decimal,
        detail: String,
        post_date: NaiveDate,
        title: String,
    ) -> Self {
        Self {
            id: None,
            external_id,
            destination_account: None,
            origin_account: None,
            amount,
            detail,
            post_date,
            title,
            kind,
        }
    }

    /// Counterparty of the transfer: destination for outgoing transfers,
    /// origin for incoming ones.
    pub fn account_name(&self) -> Option<&str> {
        if self.kind.is_transfer_out() {
            self.destination_account.as_deref()
        } else if self.kind.is_transfer_in() {
            self.origin_account.as_deref()
        } else {
            None
        }
    }

    /// Field-level checks followed by the cross-field invariants.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_amount("amount", self.amount)?;
        require_text("detail", &self.detail)?;
        require_text("title", &self.title)?;
        max_chars("title", &self.title, Self::TITLE_MAX_LEN)?;
        if let Some(name) = &self.destination_account {
            max_chars("destination_account", name, Self::ACCOUNT_NAME_MAX_LEN)?;
        }
        if let Some(name) = &self.origin_account {
            max_chars("origin_account", name, Self::ACCOUNT_NAME_MAX_LEN)?;
        }

        let has_destination = is_set(&self.destination_account);
        let has_origin = is_set(&self.origin_account);

        if has_destination && has_origin {
            return Err(ValidationError::AccountsMutuallyExclusive);
        }
        if self.kind.is_transfer_in() && !has_origin {
            return Err(ValidationError::MissingOriginAccount);
        }
        if self.kind.is_transfer_out() && !has_destination {
            return Err(ValidationError::MissingDestinationAccount);
        }
        Ok(())
    }
}

fn is_set(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|s| !s.is_empty())
}

impl std::fmt::Display for AccountStatement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({}) {}: R$ {:.2}",
            self.post_date.format("%Y-%m-%d"),
            self.detail,
            self.amount
        )
    }
}
