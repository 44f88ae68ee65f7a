//! # Receipt Composer
//!
//! Lays a [`Receipt`] out as an ordered [`Program`]:
//!
//! ```text
//!          Warung Kopi            centered, bold
//!            RECEIPT              centered
//!                                 feed 1
//! Date   : 18/10/2026 09:30       left
//! Order  : INV-0042
//! Issuer : Warung Kopi
//! --------------------------------
//! Es Kopi Susu
//!        2 x Rp18.000  Rp36.000   right
//! --------------------------------
//! TOTAL                 Rp36.000  bold
//! --------------------------------
//!             [QR]                optional, centered
//!          Terima kasih           centered
//!                                 feed 3, cut
//! ```

use super::{LineItem, Receipt};
use crate::ir::{Op, Program};
use crate::printer::PrinterProfile;
use crate::protocol::text::{Alignment, TextStyle};

/// Lines fed after the footer so the receipt clears the tear bar.
pub const TEAR_OFF_FEED: u8 = 3;

const DATE_FORMAT: &str = "%d/%m/%Y %H:%M";

/// Turns receipts into programs for one paper profile.
#[derive(Debug, Clone, Copy)]
pub struct Composer {
    profile: PrinterProfile,
}

impl Default for Composer {
    fn default() -> Self {
        Self::new(PrinterProfile::default())
    }
}

impl Composer {
    pub fn new(profile: PrinterProfile) -> Self {
        Self { profile }
    }

    pub fn separator(&self) -> String {
        "-".repeat(self.profile.columns)
    }

    /// Left text and right text on one line, padded to the paper width.
    pub fn columns(&self, left: &str, right: &str) -> String {
        let used = left.chars().count() + right.chars().count();
        let padding = self.profile.columns.saturating_sub(used).max(1);
        format!("{left}{}{right}", " ".repeat(padding))
    }

    /// `qty x unit  subtotal` for one item.
    pub fn item_line(item: &LineItem) -> String {
        let subtotal = item.subtotal().unwrap_or_default();
        format!("{} x {}  {}", item.quantity, item.unit_price, subtotal)
    }

    pub fn compose(&self, receipt: &Receipt) -> Program {
        let mut program = Program::with_init();

        // Header
        program.push(Op::styled(receipt.issuer(), TextStyle::BOLD, Alignment::Center));
        program.push(Op::styled(receipt.label(), TextStyle::NORMAL, Alignment::Center));
        program.push(Op::Feed(1));

        // Metadata
        let date = receipt.timestamp().format(DATE_FORMAT).to_string();
        program.push(Op::aligned(format!("Date   : {date}"), Alignment::Left));
        program.push(Op::text(format!("Order  : {}", receipt.id())));
        program.push(Op::text(format!("Issuer : {}", receipt.issuer())));
        program.push(Op::text(self.separator()));

        // Items
        for item in receipt.items() {
            program.push(Op::aligned(item.name.clone(), Alignment::Left));
            program.push(Op::aligned(Self::item_line(item), Alignment::Right));
        }
        program.push(Op::aligned(self.separator(), Alignment::Left));

        // Total
        program.push(Op::styled(
            self.columns("TOTAL", &receipt.total().to_string()),
            TextStyle::BOLD,
            Alignment::Left,
        ));
        program.push(Op::SetStyle(TextStyle::NORMAL));
        program.push(Op::text(self.separator()));

        if let Some(payload) = receipt.qr() {
            program.push(Op::SetAlign(Alignment::Center));
            program.push(Op::QrStore {
                data: payload.as_bytes().to_vec(),
                module_size: self.profile.qr_module_size,
            });
            program.push(Op::QrPrint);
            program.push(Op::Feed(1));
        }

        for line in receipt.footer() {
            program.push(Op::aligned(line.clone(), Alignment::Center));
        }

        program.push(Op::Feed(TEAR_OFF_FEED));
        program.push(Op::Cut);
        program
    }
}
