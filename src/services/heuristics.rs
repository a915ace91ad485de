//! Best-effort statement field extraction with regular expressions.
//!
//! Each field has an ordered list of independent matchers. The first matcher
//! that yields a non-empty value wins; later matchers are not consulted.

use regex::{Captures, Regex};

use crate::models::CreditCardInfo;

/// Turns the captures of a successful match into a field value.
pub type Render = fn(&Captures<'_>) -> Option<String>;

pub trait FieldMatcher: Send + Sync {
    fn try_extract(&self, text: &str) -> Option<String>;
}

/// A regex plus a function that renders its captures into a field value.
pub struct CaptureMatcher {
    regex: Regex,
    render: Render,
}

impl CaptureMatcher {
    pub fn new(pattern: &str, render: Render) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(pattern)?,
            render,
        })
    }
}

impl FieldMatcher for CaptureMatcher {
    fn try_extract(&self, text: &str) -> Option<String> {
        let caps = self.regex.captures(text)?;
        (self.render)(&caps).filter(|value| !value.is_empty())
    }
}

fn group(caps: &Captures<'_>, index: usize) -> Option<String> {
    caps.get(index).map(|m| m.as_str().trim().to_string())
}

fn first_group(caps: &Captures<'_>) -> Option<String> {
    group(caps, 1)
}

fn upper_first_group(caps: &Captures<'_>) -> Option<String> {
    group(caps, 1).map(|value| value.to_uppercase())
}

fn date_range(caps: &Captures<'_>) -> Option<String> {
    Some(format!("{} to {}", group(caps, 1)?, group(caps, 2)?))
}

fn amount_without_commas(caps: &Captures<'_>) -> Option<String> {
    group(caps, 1).map(|value| value.replace(',', ""))
}

/// Returns the first non-empty value produced by `matchers`, in order.
pub fn first_match(matchers: &[Box<dyn FieldMatcher>], text: &str) -> Option<String> {
    matchers.iter().find_map(|matcher| matcher.try_extract(text))
}

pub struct StatementMatchers {
    card_variant: Vec<Box<dyn FieldMatcher>>,
    card_last_digits: Vec<Box<dyn FieldMatcher>>,
    billing_cycle: Vec<Box<dyn FieldMatcher>>,
    payment_due_date: Vec<Box<dyn FieldMatcher>>,
    total_due_amount: Vec<Box<dyn FieldMatcher>>,
}

fn build(specs: &[(&str, Render)]) -> Result<Vec<Box<dyn FieldMatcher>>, regex::Error> {
    specs
        .iter()
        .map(|(pattern, render)| {
            CaptureMatcher::new(pattern, *render).map(|m| Box::new(m) as Box<dyn FieldMatcher>)
        })
        .collect()
}

const AMOUNT_PREFIX: &str = r"(?:rs\.?|₹|inr)?\s*([0-9,]+\.?\d*)";

impl StatementMatchers {
    pub fn new() -> Result<Self, regex::Error> {
        let card_variant = build(&[
            (r"(?i)\b(visa|mastercard|amex|american express|discover|rupay)\b", upper_first_group),
            (r"(?i)(visa|mastercard|amex|american express|discover|rupay)\s+credit\s+card", upper_first_group),
        ])?;

        let card_last_digits = build(&[
            (r"(?i)card\s*(?:no\.?|number)?\s*[:\-]?\s*(?:x{2,}|\*{2,})\s*(\d{2,4})", first_group),
            (r"(?i)credit\s*card\s*ending\s*(?:in\s*)?(\d{2,4})", first_group),
            (r"(?i)(?:x{4,}|\*{4,})\s*(\d{4})", first_group),
            (r"(?i)card\s*ending\s*(\d{4})", first_group),
            (r"\d{4}\s+\d{4}\s+\d{4}\s+(\d{4})", first_group),
            (r"(?i)a/c\s*no[:.\s]*(?:x+|\*+)\s*(\d{4})", first_group),
        ])?;

        let billing_cycle = build(&[
            (
                r"(?i)(?:statement|billing)\s*(?:period|cycle|date)\s*[:\-]?\s*(\d{1,2}\s+[A-Za-z]{3,9}\s+\d{4})\s*(?:to|-)\s*(\d{1,2}\s+[A-Za-z]{3,9}\s+\d{4})",
                date_range,
            ),
            (
                r"(?i)(?:statement|billing)\s*(?:period|cycle|date)\s*[:\-]?\s*(\d{1,2}[/\-]\d{1,2}[/\-]\d{2,4})\s*(?:to|-)\s*(\d{1,2}[/\-]\d{1,2}[/\-]\d{2,4})",
                date_range,
            ),
            (
                r"(?i)from[:\s]+(\d{1,2}\s+[A-Za-z]{3,9}\s+\d{4})\s*(?:to|-)\s*(\d{1,2}\s+[A-Za-z]{3,9}\s+\d{4})",
                date_range,
            ),
        ])?;

        let payment_due_date = build(&[
            (r"(?i)payment\s+due\s+(?:date|by)[:\s]*(\d{1,2}\s+[A-Za-z]{3,9}\s+\d{4})", first_group),
            (r"(?i)due\s+date[:\s]*(\d{1,2}\s+[A-Za-z]{3,9}\s+\d{4})", first_group),
            (r"(?i)pay\s+by[:\s]*(\d{1,2}\s+[A-Za-z]{3,9}\s+\d{4})", first_group),
            (r"(?i)payment\s+due[:\s]*(\d{1,2}[/\-]\d{1,2}[/\-]\d{2,4})", first_group),
        ])?;

        let amount_patterns = [
            format!(r"(?i)(?:total\s*)?(?:amount\s*)?(?:due|outstanding|payable)[:\s]*{}", AMOUNT_PREFIX),
            format!(r"(?i)outstanding\s*balance[:\s]*{}", AMOUNT_PREFIX),
            format!(r"(?i)total\s*balance[:\s]*{}", AMOUNT_PREFIX),
            format!(r"(?i)minimum\s*(?:amount\s*)?due[:\s]*{}", AMOUNT_PREFIX),
            format!(r"(?i)current\s*(?:outstanding|balance)[:\s]*{}", AMOUNT_PREFIX),
        ];
        let amount_specs: Vec<(&str, Render)> = amount_patterns
            .iter()
            .map(|pattern| (pattern.as_str(), amount_without_commas as Render))
            .collect();
        let total_due_amount = build(&amount_specs)?;

        Ok(Self {
            card_variant,
            card_last_digits,
            billing_cycle,
            payment_due_date,
            total_due_amount,
        })
    }

    /// Extracts whatever fields the text yields. Transactions are left empty.
    pub fn extract(&self, text: &str) -> CreditCardInfo {
        let normalized = normalize_whitespace(text);

        let info = CreditCardInfo {
            card_last_4: first_match(&self.card_last_digits, &normalized),
            card_variant: first_match(&self.card_variant, &normalized),
            billing_cycle: first_match(&self.billing_cycle, &normalized),
            payment_due_date: first_match(&self.payment_due_date, &normalized),
            total_due_amount: first_match(&self.total_due_amount, &normalized),
            transactions: Vec::new(),
        };

        tracing::debug!(?info, "Heuristic extraction finished");
        info
    }
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matchers() -> StatementMatchers {
        StatementMatchers::new().unwrap()
    }

    #[test]
    fn extracts_fields_from_statement_text() {
        let text = "HDFC Bank VISA Credit Card\n\
                    Card No: XXXX XXXX XXXX 4821\n\
                    Statement Period: 12 Dec 2024 to 10 Jan 2025\n\
                    Payment Due Date: 29 Jan 2025\n\
                    Total Amount Due: Rs. 5,342.00";

        let info = matchers().extract(text);

        assert_eq!(info.card_variant.as_deref(), Some("VISA"));
        assert_eq!(info.card_last_4.as_deref(), Some("4821"));
        assert_eq!(info.billing_cycle.as_deref(), Some("12 Dec 2024 to 10 Jan 2025"));
        assert_eq!(info.payment_due_date.as_deref(), Some("29 Jan 2025"));
        assert_eq!(info.total_due_amount.as_deref(), Some("5342.00"));
        assert!(info.transactions.is_empty());
    }

    #[test]
    fn numeric_billing_cycle_and_due_date() {
        let text = "Billing cycle 01/12/2024 - 31/12/2024. Payment due: 15/01/2025";
        let info = matchers().extract(text);

        assert_eq!(info.billing_cycle.as_deref(), Some("01/12/2024 to 31/12/2024"));
        assert_eq!(info.payment_due_date.as_deref(), Some("15/01/2025"));
    }

    #[test]
    fn earlier_matcher_wins() {
        // Both "credit card ending" and the full 4x4 number are present; the
        // ending pattern is listed first.
        let text = "Credit card ending in 1111 for 4000 1234 5678 9999";
        let info = matchers().extract(text);
        assert_eq!(info.card_last_4.as_deref(), Some("1111"));
    }

    #[test]
    fn full_card_number_fallback() {
        let info = matchers().extract("Number 4000 1234 5678 9999 issued");
        assert_eq!(info.card_last_4.as_deref(), Some("9999"));
    }

    #[test]
    fn unrelated_text_yields_nothing() {
        let info = matchers().extract("Thank you for banking with us.");
        assert!(info.is_empty());
    }

    #[test]
    fn first_match_skips_matchers_without_values() {
        struct Fixed(Option<&'static str>);
        impl FieldMatcher for Fixed {
            fn try_extract(&self, _text: &str) -> Option<String> {
                self.0.map(str::to_string)
            }
        }

        let list: Vec<Box<dyn FieldMatcher>> = vec![
            Box::new(Fixed(None)),
            Box::new(Fixed(Some("second"))),
            Box::new(Fixed(Some("third"))),
        ];
        assert_eq!(first_match(&list, "anything").as_deref(), Some("second"));
        assert_eq!(first_match(&[], "anything"), None);
    }
}
