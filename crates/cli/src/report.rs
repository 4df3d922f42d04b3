use std::fmt;

use tabsplit_core::{DisplayConfig, Session, Totals};
use tabsplit_ocr::ExtractedReceipt;

/// Plain-text summary: items with their sharers, then per-person totals.
pub struct Report<'a> {
    pub session: &'a Session,
    pub totals: &'a Totals,
    pub extracted: &'a ExtractedReceipt,
    pub display: &'a DisplayConfig,
}

impl Report<'_> {
    fn write_items(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = self.display.currency_symbol.as_str();
        let people = self.session.participants();
        let items = self.session.items();

        writeln!(f, "Items:")?;
        if items.is_empty() {
            writeln!(f, "  (no priced lines found)")?;
        }
        let width = items
            .iter()
            .map(|i| i.description().chars().count())
            .max()
            .unwrap_or(0);
        for (index, item) in items.iter().enumerate() {
            let sharers: Vec<String> = self
                .session
                .assignments()
                .get(index)
                .filter_map(|p| people.display_name(p, &self.display.placeholder_label))
                .map(|n| n.into_owned())
                .collect();
            let sharers = if sharers.is_empty() {
                "-".to_string()
            } else {
                sharers.join(", ")
            };
            writeln!(
                f,
                "  {:>2}. {:<width$}  {:>12}  {}",
                index + 1,
                item.description(),
                item.price().display_with(symbol),
                sharers,
            )?;
        }
        Ok(())
    }

    fn write_totals(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = self.display.currency_symbol.as_str();

        writeln!(f, "Totals:")?;
        for (label, amount) in self.totals.named() {
            writeln!(f, "  {label}: {}", amount.display_with(symbol))?;
        }
        if !self.totals.unassigned.is_zero() {
            writeln!(f, "Unassigned: {}", self.totals.unassigned.display_with(symbol))?;
        }
        Ok(())
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_items(f)?;
        self.write_totals(f)?;

        let symbol = self.display.currency_symbol.as_str();
        if let Some(stated) = self.extracted.stated_total.filter(|_| self.extracted.total_mismatch()) {
            let sum = match self.extracted.item_sum() {
                Some(sum) => sum.display_with(symbol),
                None => "out of range".to_string(),
            };
            writeln!(
                f,
                "Note: receipt total {} differs from item sum {sum}",
                stated.display_with(symbol),
            )?;
        }
        Ok(())
    }
}
