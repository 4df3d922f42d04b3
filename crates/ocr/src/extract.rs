use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use rust_decimal::Decimal;
use tabsplit_core::{Item, Money, ParserConfig};

use crate::types::ExtractedReceipt;

// ── Compiled regex cache ─────────────────────────────────────────────────────

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

// The description must end in something other than a digit, comma or period,
// so the price is always the whole trailing run of those characters.
re!(re_item_line,
    r"^(?P<description>.*[^0-9,.])(?P<price>[0-9,.]+)$");

re!(re_summary_label,
    r"(?i)^\s*(?:sub\s*-?\s*total|grand\s+total|total|net\s+amount|amount\s+(?:due|payable)|balance(?:\s+due)?|tax|vat|gst|hst|pst|cgst|sgst|service\s+(?:charge|tax)|round(?:ing|\s*off)|change|cash|card|visa|tendered|paid)\b");

re!(re_total_label,
    r"(?i)^\s*(?:grand\s+total|total(?:\s+due)?|net\s+amount|amount\s+(?:due|payable)|balance\s+due)\b");

// ── Public extraction API ─────────────────────────────────────────────────────

/// Trimmed, non-blank lines of `text`. The iterator is lazy and can be cloned
/// to walk the lines again.
pub fn cleaned_lines(text: &str) -> impl Iterator<Item = &str> + Clone + '_ {
    text.lines().map(str::trim).filter(|l| !l.is_empty())
}

/// Items from every line shaped like `description price`, in source order.
pub fn parse_items(text: &str) -> Vec<Item> {
    Extractor::extract(text, &ParserConfig::default()).items
}

/// Splits a single cleaned line into an item. `None` when the line has no
/// trailing price or the price does not parse.
pub fn parse_line(line: &str) -> Option<Item> {
    let (description, price) = split_line(line)?;
    Item::new(description, price).ok()
}

pub struct Extractor;

impl Extractor {
    pub fn extract(ocr_text: &str, config: &ParserConfig) -> ExtractedReceipt {
        let mut receipt = ExtractedReceipt::default();

        for line in cleaned_lines(ocr_text) {
            let Some((description, price)) = split_line(line) else {
                receipt.unmatched_lines += 1;
                continue;
            };

            if re_total_label().is_match(description) {
                receipt.stated_total = Some(price);
            }
            if config.skip_summary_lines && re_summary_label().is_match(description) {
                receipt.skipped_summary_lines += 1;
                continue;
            }

            match Item::new(description, price) {
                Ok(item) => receipt.items.push(item),
                Err(_) => receipt.unmatched_lines += 1,
            }
        }

        receipt
    }
}

fn split_line(line: &str) -> Option<(&str, Money)> {
    let caps = re_item_line().captures(line)?;
    let description = caps.name("description")?.as_str().trim();
    let price = parse_price(caps.name("price")?.as_str())?;
    Some((description, price))
}

// ── Price parsing ─────────────────────────────────────────────────────────────

/// Parses a run of digits, commas and periods. Commas are thousands
/// separators and are dropped; more than one period is rejected.
fn parse_price(token: &str) -> Option<Money> {
    let clean = token.replace(',', "");
    if !clean.bytes().any(|b| b.is_ascii_digit()) || clean.matches('.').count() > 1 {
        return None;
    }

    let clean = clean.strip_suffix('.').unwrap_or(&clean);
    let clean = if clean.starts_with('.') {
        format!("0{clean}")
    } else {
        clean.to_string()
    };

    Decimal::from_str(&clean).ok().map(Money::new)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
