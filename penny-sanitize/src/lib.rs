//! penny-sanitize: masks personally-identifiable substrings in extracted
//! bank-statement text before it crosses the trust boundary to a hosted LLM.
//!
//! Masking runs as a fixed sequence of passes. Order matters: later
//! patterns must never re-match text an earlier pass already replaced, and
//! the name heuristic runs after addresses so street names don't get
//! treated as people. The output keeps enough structure (last four digits,
//! merchant names, amounts, dates) for transaction extraction to work.

use anyhow::Result;
use regex::{Captures, Regex};
use sha2::{Digest, Sha256};

pub const NAME_MASK: &str = "[NAME REMOVED]";
pub const ROUTING_MASK: &str = "[ROUTING REMOVED]";
pub const SSN_MASK: &str = "[SSN REMOVED]";
pub const PHONE_MASK: &str = "[PHONE REMOVED]";
pub const EMAIL_MASK: &str = "[EMAIL REMOVED]";
pub const ADDRESS_MASK: &str = "[ADDRESS REMOVED]";

/// One replacement made during sanitization: the synthetic token and the
/// original text it stands for. Request-scoped output only; never persisted
/// and there is no restoration path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Masked {
    pub token: String,
    pub original: String,
}

/// Result of one sanitization call
#[derive(Debug, Clone, PartialEq)]
pub struct Sanitized {
    pub text: String,
    pub mappings: Vec<Masked>,
    pub original_len: usize,
    pub masked_len: usize,
}

/// Case-insensitive substrings that mark a capitalized-word run as a
/// business or bank phrase rather than a personal name. Matches containing
/// any of these are preserved verbatim.
const BUSINESS_KEYWORDS: &[&str] = &[
    "bank",
    "credit union",
    "national",
    "federal",
    "account",
    "balance",
    "statement",
    "checking",
    "savings",
    "deposit",
    "withdrawal",
    "payment",
    "purchase",
    "transfer",
    "payroll",
    "direct",
    "salary",
    "interest",
    "dividend",
    "transaction",
    "beginning",
    "ending",
    "total",
    "summary",
    "supercenter",
    "store",
    "shop",
    "market",
    "grocery",
    "foods",
    "restaurant",
    "cafe",
    "coffee",
    "pizza",
    "grill",
    "deli",
    "bakery",
    "pharmacy",
    "airlines",
    "airways",
    "hotel",
    "gas",
    "fuel",
    "station",
    "electric",
    "energy",
    "utility",
    "insurance",
    "mortgage",
    "wireless",
    "mobile",
    "telecom",
    "fitness",
    "club",
    "llc",
    "inc",
    "corp",
    "company",
    "holdings",
    "services",
    "systems",
    "solutions",
    "group",
    "enterprises",
    "international",
];

/// Known false positives of the name heuristic: a three-word match can
/// swallow the first word of a brand phrase, leaving the mask glued to the
/// brand's second word. These exact phrases get restored.
const BRAND_CORRECTIONS: &[(&str, &str)] = &[
    ("[NAME REMOVED] Supercenter", "Walmart Supercenter"),
    ("[NAME REMOVED] Club", "Sams Club"),
    ("[NAME REMOVED] Depot", "Home Depot"),
    ("[NAME REMOVED] Buy", "Best Buy"),
    ("[NAME REMOVED] Joes", "Trader Joes"),
    ("[NAME REMOVED] Foods", "Whole Foods"),
];

/// Rewrite `input` with all PII masked. The input is never mutated; the
/// returned mapping records what each token replaced.
pub fn sanitize(input: &str) -> Result<Sanitized> {
    let mut mappings: Vec<Masked> = Vec::new();
    let mut text = input.to_string();

    text = mask_account_numbers(&text, &mut mappings)?;
    text = mask_fixed(
        &text,
        // standalone 9-digit runs (routing numbers)
        &Regex::new(r"\b\d{9}\b")?,
        ROUTING_MASK,
        &mut mappings,
    );
    text = mask_fixed(
        &text,
        // 3-2-4 with separators; bare 9-digit runs were taken above
        &Regex::new(r"\b\d{3}[-. ]\d{2}[-. ]\d{4}\b")?,
        SSN_MASK,
        &mut mappings,
    );
    text = mask_phone_numbers(&text, &mut mappings)?;
    text = mask_fixed(
        &text,
        &Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}")?,
        EMAIL_MASK,
        &mut mappings,
    );
    text = mask_fixed(
        &text,
        &Regex::new(
            r"\b\d{1,5}\s+(?:[A-Za-z]+\s+){1,4}(?:St|Street|Ave|Avenue|Rd|Road|Blvd|Boulevard|Ln|Lane|Dr|Drive|Ct|Court|Way|Pl|Place)\b",
        )?,
        ADDRESS_MASK,
        &mut mappings,
    );
    text = mask_names(&text, &mut mappings)?;
    text = mask_account_holder_lines(&text, &mut mappings)?;
    text = mask_check_numbers(&text, &mut mappings)?;
    text = mask_card_numbers(&text, &mut mappings)?;

    for (wrong, brand) in BRAND_CORRECTIONS {
        if text.contains(wrong) {
            text = text.replace(wrong, brand);
        }
    }

    Ok(Sanitized {
        original_len: input.len(),
        masked_len: text.len(),
        text,
        mappings,
    })
}

/// Last-4-preserving mask used for account and card numbers
fn last_four_mask(digits: &str) -> String {
    let last4 = &digits[digits.len().saturating_sub(4)..];
    format!("****-****-****-{last4}")
}

/// Deterministic short token for an account-like number, derived from the
/// SHA-256 of its digits.
fn account_token(digits: &str) -> String {
    let hash = Sha256::digest(digits.as_bytes());
    format!("[ACCT-{}]", &hex::encode(hash)[..8])
}

fn digits_of(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Pass 1: long digit sequences resembling account numbers, plain or
/// grouped in fours. Only runs of 13-20 digits are masked.
fn mask_account_numbers(text: &str, mappings: &mut Vec<Masked>) -> Result<String> {
    let re = Regex::new(r"\b\d{4}(?:[ -]\d{4}){2,4}(?:[ -]\d{1,8})?\b|\b\d{13,20}\b")?;
    Ok(re
        .replace_all(text, |caps: &Captures| {
            let m = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
            let digits = digits_of(m);
            if !(13..=20).contains(&digits.len()) {
                return m.to_string();
            }
            mappings.push(Masked {
                token: account_token(&digits),
                original: m.to_string(),
            });
            last_four_mask(&digits)
        })
        .into_owned())
}

/// Replace every match with a fixed placeholder, recording the originals
fn mask_fixed(text: &str, re: &Regex, mask: &str, mappings: &mut Vec<Masked>) -> String {
    re.replace_all(text, |caps: &Captures| {
        let m = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
        mappings.push(Masked {
            token: mask.to_string(),
            original: m.to_string(),
        });
        mask.to_string()
    })
    .into_owned()
}

/// Pass 4: phone-shaped sequences with 10-15 digits
fn mask_phone_numbers(text: &str, mappings: &mut Vec<Masked>) -> Result<String> {
    let re = Regex::new(r"(?:\+\d{1,4}[ .-]?)?\(?\d{1,4}\)?[ .-]?\d{3}[ .-]?\d{4}\b")?;
    Ok(re
        .replace_all(text, |caps: &Captures| {
            let m = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
            let count = digits_of(m).len();
            if !(10..=15).contains(&count) {
                return m.to_string();
            }
            mappings.push(Masked {
                token: PHONE_MASK.to_string(),
                original: m.to_string(),
            });
            PHONE_MASK.to_string()
        })
        .into_owned())
}

/// Pass 7: two or three consecutive capitalized words are treated as a
/// personal name unless the phrase carries a business keyword.
fn mask_names(text: &str, mappings: &mut Vec<Masked>) -> Result<String> {
    let re = Regex::new(r"\b[A-Z][a-z]+(?: [A-Z][a-z]+){1,2}\b")?;
    Ok(re
        .replace_all(text, |caps: &Captures| {
            let m = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
            let lower = m.to_lowercase();
            if BUSINESS_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
                return m.to_string();
            }
            mappings.push(Masked {
                token: NAME_MASK.to_string(),
                original: m.to_string(),
            });
            NAME_MASK.to_string()
        })
        .into_owned())
}

/// Pass 8: "Account Holder:" lines keep the label, lose the value. Catches
/// values the name heuristic missed (single names, all-caps names).
fn mask_account_holder_lines(text: &str, mappings: &mut Vec<Masked>) -> Result<String> {
    let re = Regex::new(r"(?i)account holder:\s*(?:\[NAME REMOVED\]|[A-Za-z][A-Za-z .'-]*)")?;
    Ok(re
        .replace_all(text, |caps: &Captures| {
            let m = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
            if !m.contains(NAME_MASK) {
                mappings.push(Masked {
                    token: NAME_MASK.to_string(),
                    original: m.to_string(),
                });
            }
            format!("Account Holder: {NAME_MASK}")
        })
        .into_owned())
}

/// Pass 9: check numbers, prefix preserved
fn mask_check_numbers(text: &str, mappings: &mut Vec<Masked>) -> Result<String> {
    let re = Regex::new(r"(?i)(check #)\s*(\d+)")?;
    Ok(re
        .replace_all(text, |caps: &Captures| {
            mappings.push(Masked {
                token: "[REMOVED]".to_string(),
                original: caps[2].to_string(),
            });
            format!("{}[REMOVED]", &caps[1])
        })
        .into_owned())
}

/// Pass 10: card numbers with a major-network prefix that slipped past the
/// account pass (digit runs broken up by other punctuation, etc.)
fn mask_card_numbers(text: &str, mappings: &mut Vec<Masked>) -> Result<String> {
    let re =
        Regex::new(r"\b(?:4\d{3}|5[1-5]\d{2}|3[47]\d{2}|6011|65\d{2})(?:[ -]?\d{4}){2,3}\b")?;
    Ok(re
        .replace_all(text, |caps: &Captures| {
            let m = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
            let digits = digits_of(m);
            if !(13..=16).contains(&digits.len()) {
                return m.to_string();
            }
            mappings.push(Masked {
                token: account_token(&digits),
                original: m.to_string(),
            });
            last_four_mask(&digits)
        })
        .into_owned())
}
