//! Text canonicalization shared by every builder and the query resolver.
//!
//! Index terms and queries go through the same [`normalize`], so a query matches a
//! term exactly when both normalize to the same string. [`slugify`] is the coarser
//! form used to match free text against taxonomy slugs.

use std::sync::LazyLock;

use regex::Regex;

/// Normalize free text for term matching.
///
/// - casefold
/// - dash variants become `-`, Greek beta becomes `b`
/// - separators (`+ / & , _ : ; | . ( ) [ ] { } < > ! ?`, quotes) become spaces
/// - any other punctuation is removed; internal hyphens are kept
/// - whitespace is collapsed and trimmed
pub fn normalize(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();

    let mut out = String::with_capacity(lowered.len());
    for c in lowered.chars() {
        match c {
            '\u{2010}' | '\u{2011}' | '\u{2012}' | '\u{2013}' | '\u{2014}' | '\u{2015}'
            | '\u{2212}' | '\u{FE63}' | '\u{FF0D}' | '-' => out.push('-'),
            'β' | 'ϐ' => out.push('b'),
            '+' | '/' | '\\' | '&' | ',' | '_' | ':' | ';' | '|' | '.' | '(' | ')' | '['
            | ']' | '{' | '}' | '<' | '>' | '!' | '?' | '"' | '\u{201C}' | '\u{201D}'
            | '\u{2018}' | '\u{2019}' => out.push(' '),
            c if c.is_whitespace() => out.push(' '),
            c if c.is_alphanumeric() => out.push(c),
            _ => {}
        }
    }

    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Reduce text to a slug: normalized, with every run of non-alphanumerics as `_`.
pub fn slugify(raw: &str) -> String {
    static NON_ALNUM_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}]+").expect("valid regex"));

    let normalized = normalize(raw);
    NON_ALNUM_RE
        .replace_all(&normalized, "_")
        .trim_matches('_')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_casefolds_and_collapses() {
        assert_eq!(normalize("  BPC-157  "), "bpc-157");
        assert_eq!(normalize("Sleep   &  Circadian"), "sleep circadian");
        assert_eq!(normalize("CJC-1295 + Ipamorelin"), "cjc-1295 ipamorelin");
        assert_eq!(normalize("tesamorelin/ipamorelin"), "tesamorelin ipamorelin");
    }

    #[test]
    fn normalize_unicode_variants() {
        assert_eq!(normalize("Thymosin β4"), "thymosin b4");
        assert_eq!(normalize("GHK\u{2013}Cu"), "ghk-cu");
        assert_eq!(normalize("\u{201C}Melanotan II\u{201D}"), "melanotan ii");
    }

    #[test]
    fn normalize_drops_other_punctuation() {
        assert_eq!(normalize("Crohn's"), "crohns");
        assert_eq!(normalize("Semaglutide®"), "semaglutide");
        assert_eq!(normalize("sleep_circadian"), "sleep circadian");
    }

    #[test]
    fn normalize_empty_inputs() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
        assert_eq!(normalize("+/&"), "");
    }

    #[test]
    fn slugify_matches_across_separator_styles() {
        assert_eq!(slugify("CYP3A4 Inhibitors"), "cyp3a4_inhibitors");
        assert_eq!(slugify("cyp3a4-inhibitors"), "cyp3a4_inhibitors");
        assert_eq!(slugify("  SSRIs / SNRIs "), "ssris_snris");
        assert_eq!(slugify("--"), "");
    }
}
