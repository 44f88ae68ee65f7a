//! # Receipts
//!
//! A [`Receipt`] is the projection of one transaction that the printer
//! needs: identifier, timestamp, issuer, line items and total. It is built
//! once per print job, validated on construction and never mutated.
//!
//! Amounts are integer currency units ([`Money`]); no floating point is
//! involved anywhere between the caller and the printed line.
//!
//! ## Example
//!
//! ```
//! use struk::receipt::Receipt;
//!
//! let receipt = Receipt::builder("INV-0042", "Warung Kopi")
//!     .item("Es Kopi Susu", 18_000, 2)
//!     .item("Roti Bakar", 15_000, 1)
//!     .total(51_000)
//!     .footer("Terima kasih")
//!     .build()?;
//! assert_eq!(receipt.total().to_string(), "Rp51.000");
//! # Ok::<(), struk::error::ReceiptError>(())
//! ```

mod composer;

pub use composer::Composer;

use std::fmt;

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::ReceiptError;

/// Default document label printed under the issuer name.
pub const DEFAULT_LABEL: &str = "RECEIPT";

/// An amount in integer currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(pub u64);

impl Money {
    pub fn units(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Money {
    /// `Rp` prefix, `.` between thousands: 25000 -> `Rp25.000`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.0.to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }
        f.pad(&format!("Rp{grouped}"))
    }
}

/// One (name, unit price, quantity) line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    pub unit_price: Money,
    pub quantity: u32,
}

impl LineItem {
    pub fn new(name: impl Into<String>, unit_price: u64, quantity: u32) -> Self {
        Self {
            name: name.into(),
            unit_price: Money(unit_price),
            quantity,
        }
    }

    /// `quantity * unit_price`, or `None` on overflow.
    pub fn subtotal(&self) -> Option<Money> {
        self.unit_price
            .0
            .checked_mul(u64::from(self.quantity))
            .map(Money)
    }
}

/// Unvalidated receipt data as supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptDraft {
    pub id: String,
    pub issuer: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub timestamp: Option<NaiveDateTime>,
    pub items: Vec<LineItem>,
    /// Caller-computed total; must equal the sum of subtotals.
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub footer: Vec<String>,
    /// Optional payload printed as a QR code above the footer.
    #[serde(default)]
    pub qr: Option<String>,
}

/// A validated receipt.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "ReceiptDraft")]
pub struct Receipt {
    id: String,
    issuer: String,
    label: String,
    timestamp: NaiveDateTime,
    items: Vec<LineItem>,
    total: Money,
    footer: Vec<String>,
    qr: Option<String>,
}

impl Receipt {
    pub fn builder(id: impl Into<String>, issuer: impl Into<String>) -> ReceiptBuilder {
        ReceiptBuilder {
            draft: ReceiptDraft {
                id: id.into(),
                issuer: issuer.into(),
                ..Default::default()
            },
        }
    }

    /// Parse caller JSON into a validated receipt.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn total(&self) -> Money {
        self.total
    }

    pub fn footer(&self) -> &[String] {
        &self.footer
    }

    pub fn qr(&self) -> Option<&str> {
        self.qr.as_deref()
    }
}

impl TryFrom<ReceiptDraft> for Receipt {
    type Error = ReceiptError;

    fn try_from(draft: ReceiptDraft) -> Result<Self, Self::Error> {
        if draft.items.is_empty() {
            return Err(ReceiptError::EmptyItems);
        }

        let mut computed: u64 = 0;
        for item in &draft.items {
            if item.quantity == 0 {
                return Err(ReceiptError::ZeroQuantity {
                    name: item.name.clone(),
                });
            }
            let subtotal = item.subtotal().ok_or_else(|| ReceiptError::AmountOverflow {
                what: format!("subtotal of {:?}", item.name),
            })?;
            computed = computed
                .checked_add(subtotal.0)
                .ok_or_else(|| ReceiptError::AmountOverflow {
                    what: "receipt total".to_string(),
                })?;
        }

        if let Some(expected) = draft.total {
            if expected != computed {
                return Err(ReceiptError::TotalMismatch { expected, computed });
            }
        }

        Ok(Self {
            id: draft.id,
            issuer: draft.issuer,
            label: draft.label.unwrap_or_else(|| DEFAULT_LABEL.to_string()),
            timestamp: draft.timestamp.unwrap_or_else(|| Local::now().naive_local()),
            items: draft.items,
            total: Money(computed),
            footer: draft.footer,
            qr: draft.qr,
        })
    }
}

/// Chained construction of a [`Receipt`].
#[derive(Debug, Clone)]
pub struct ReceiptBuilder {
    draft: ReceiptDraft,
}

impl ReceiptBuilder {
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.draft.label = Some(label.into());
        self
    }

    pub fn timestamp(mut self, timestamp: NaiveDateTime) -> Self {
        self.draft.timestamp = Some(timestamp);
        self
    }

    pub fn item(mut self, name: impl Into<String>, unit_price: u64, quantity: u32) -> Self {
        self.draft.items.push(LineItem::new(name, unit_price, quantity));
        self
    }

    /// Caller-supplied total, checked against the items on `build`.
    pub fn total(mut self, total: u64) -> Self {
        self.draft.total = Some(total);
        self
    }

    pub fn footer(mut self, line: impl Into<String>) -> Self {
        self.draft.footer.push(line.into());
        self
    }

    pub fn qr(mut self, payload: impl Into<String>) -> Self {
        self.draft.qr = Some(payload.into());
        self
    }

    pub fn build(self) -> Result<Receipt, ReceiptError> {
        Receipt::try_from(self.draft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_grouping() {
        assert_eq!(Money(0).to_string(), "Rp0");
        assert_eq!(Money(999).to_string(), "Rp999");
        assert_eq!(Money(1_000).to_string(), "Rp1.000");
        assert_eq!(Money(25_000).to_string(), "Rp25.000");
        assert_eq!(Money(100_000).to_string(), "Rp100.000");
        assert_eq!(Money(1_234_567).to_string(), "Rp1.234.567");
    }

    #[test]
    fn test_money_honours_width_and_alignment() {
        assert_eq!(format!("{:>12}", Money(25_000)), "    Rp25.000");
        assert_eq!(format!("{:<10}|", Money(5_000)), "Rp5.000   |");
        assert_eq!(format!("{:^9}", Money(1)), "   Rp1   ");
    }

    #[test]
    fn test_subtotal() {
        assert_eq!(LineItem::new("A", 10_000, 2).subtotal(), Some(Money(20_000)));
        assert_eq!(LineItem::new("A", u64::MAX, 2).subtotal(), None);
    }

    #[test]
    fn test_build_computes_total() {
        let receipt = Receipt::builder("1", "Shop")
            .item("A", 10_000, 2)
            .item("B", 5_000, 1)
            .build()
            .unwrap();
        assert_eq!(receipt.total(), Money(25_000));
        assert_eq!(receipt.label(), DEFAULT_LABEL);
    }

    #[test]
    fn test_total_mismatch_is_rejected() {
        let err = Receipt::builder("1", "Shop")
            .item("A", 10_000, 2)
            .total(19_000)
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ReceiptError::TotalMismatch {
                expected: 19_000,
                computed: 20_000
            }
        );
    }

    #[test]
    fn test_empty_and_zero_quantity_rejected() {
        assert_eq!(
            Receipt::builder("1", "Shop").build().unwrap_err(),
            ReceiptError::EmptyItems
        );
        assert!(matches!(
            Receipt::builder("1", "Shop").item("A", 1, 0).build(),
            Err(ReceiptError::ZeroQuantity { .. })
        ));
    }

    #[test]
    fn test_total_overflow_rejected() {
        let err = Receipt::builder("1", "Shop")
            .item("A", u64::MAX, 1)
            .item("B", 1, 1)
            .build()
            .unwrap_err();
        assert!(matches!(err, ReceiptError::AmountOverflow { .. }));
    }

    #[test]
    fn test_from_json() {
        let receipt = Receipt::from_json(
            r#"{
                "id": "ORD-7",
                "issuer": "Toko Maju",
                "timestamp": "2026-10-18T09:30:00",
                "items": [
                    { "name": "Teh", "unit_price": 4000, "quantity": 3 }
                ],
                "total": 12000,
                "qr": "https://example.com/o/7"
            }"#,
        )
        .unwrap();
        assert_eq!(receipt.id(), "ORD-7");
        assert_eq!(receipt.total(), Money(12_000));
        assert_eq!(receipt.qr(), Some("https://example.com/o/7"));
        assert!(receipt.footer().is_empty());
    }

    #[test]
    fn test_from_json_rejects_mismatched_total() {
        let result = Receipt::from_json(
            r#"{ "id": "x", "issuer": "y",
                 "items": [{ "name": "A", "unit_price": 1, "quantity": 1 }],
                 "total": 2 }"#,
        );
        assert!(result.unwrap_err().to_string().contains("total mismatch"));
    }
}
