//! Test doubles and raw feed fixtures shared by the unit tests.
#![allow(clippy::unwrap_used)]

use anyhow::Result;
use chrono::Duration;
use serde_json::json;
use std::cell::{Cell, RefCell};

use crate::bank::{RawRecord, StatementSource};
use crate::cache::{Cache, MemoryCache};

/// In-memory upstream that counts how often each feed is requested.
pub(crate) struct FakeSource {
    pub(crate) cards: Vec<RawRecord>,
    pub(crate) feed: Vec<RawRecord>,
    pub(crate) card_calls: Cell<usize>,
    pub(crate) feed_calls: Cell<usize>,
    pub(crate) fail: bool,
}

impl FakeSource {
    pub(crate) fn new(cards: Vec<RawRecord>, feed: Vec<RawRecord>) -> Self {
        Self {
            cards,
            feed,
            card_calls: Cell::new(0),
            feed_calls: Cell::new(0),
            fail: false,
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(Vec::new(), Vec::new())
        }
    }
}

impl StatementSource for FakeSource {
    fn card_statements(&self) -> Result<Vec<RawRecord>> {
        self.card_calls.set(self.card_calls.get() + 1);
        if self.fail {
            anyhow::bail!("upstream unavailable");
        }
        Ok(self.cards.clone())
    }

    fn account_feed(&self) -> Result<Vec<RawRecord>> {
        self.feed_calls.set(self.feed_calls.get() + 1);
        if self.fail {
            anyhow::bail!("upstream unavailable");
        }
        Ok(self.feed.clone())
    }
}

/// Cache wrapper that records every operation.
#[derive(Default)]
pub(crate) struct RecordingCache {
    pub(crate) inner: MemoryCache,
    pub(crate) ops: RefCell<Vec<String>>,
}

impl RecordingCache {
    pub(crate) fn gets(&self) -> usize {
        self.count("get")
    }

    pub(crate) fn sets(&self) -> usize {
        self.count("set")
    }

    fn count(&self, op: &str) -> usize {
        self.ops
            .borrow()
            .iter()
            .filter(|o| o.starts_with(op))
            .count()
    }
}

impl Cache for RecordingCache {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.ops.borrow_mut().push(format!("get {key}"));
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        self.ops.borrow_mut().push(format!("set {key}"));
        self.inner.set(key, value, ttl)
    }

    fn expire(&self, key: &str) -> Result<()> {
        self.ops.borrow_mut().push(format!("expire {key}"));
        self.inner.expire(key)
    }
}

// ── Fixtures ──────────────────────────────────────────────────

pub(crate) fn raw_card(id: &str, amount_cents: i64, description: &str) -> RawRecord {
    json!({
        "_links": {"self": {"href": format!("https://bank.example/api/transactions/{id}")}},
        "account": "0cedea55-3fa8-4c4d-b72a-1bab24f0fb0a",
        "amount": amount_cents,
        "amount_without_iof": amount_cents,
        "category": "transaction",
        "description": description,
        "details": {"status": "settled", "subcategory": "card_not_present"},
        "href": format!("nuapp://transaction/{id}"),
        "id": id,
        "source": "upfront_national",
        "time": "2021-03-21T10:56:13Z",
        "title": "serviços",
        "tokenized": true
    })
}

pub(crate) fn raw_transfer_out(id: &str, name: &str) -> RawRecord {
    json!({
        "id": id,
        "__typename": "TransferOutEvent",
        "title": "Transferência enviada",
        "detail": format!("{name} - R$ 50,00"),
        "postDate": "2021-04-14",
        "amount": 50.0,
        "destinationAccount": {"name": name}
    })
}

pub(crate) fn raw_transfer_in(id: &str, name: &str) -> RawRecord {
    json!({
        "id": id,
        "__typename": "TransferInEvent",
        "title": "Transferência recebida",
        "detail": "R$ 1.500,00",
        "postDate": "2021-04-10",
        "amount": 1500.0,
        "originAccount": {"name": name}
    })
}

pub(crate) fn raw_bill_payment(id: &str) -> RawRecord {
    json!({
        "id": id,
        "__typename": "BillPaymentEvent",
        "title": "Pagamento da fatura",
        "detail": "Cartão Nubank - R$ 1.234,56",
        "postDate": "2021-04-05",
        "amount": 1234.56
    })
}

pub(crate) const CARD_ID_1: &str = "4ecd9a59-3747-4af4-9192-a969b23cf513";
pub(crate) const CARD_ID_2: &str = "a9f1b3c2-6d4e-4f5a-8b7c-1d2e3f4a5b6c";
pub(crate) const ACCOUNT_ID_1: &str = "5f3b0c7e-1a2b-4c3d-9e8f-0a1b2c3d4e5f";
pub(crate) const ACCOUNT_ID_2: &str = "6a4c1d8f-2b3c-4d5e-8f90-1b2c3d4e5f60";
pub(crate) const ACCOUNT_ID_3: &str = "7b5d2e90-3c4d-4e6f-9a01-2c3d4e5f6071";
