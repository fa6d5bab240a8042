//! HTML fragment helpers shared by every page.
//!
//! Text taken from a snapshot goes through [`esc`] before it is
//! interpolated; markup produced here is otherwise plain `format!`.

use std::fmt;

use url::form_urlencoded;

/// Shown when the losing side has no losses but some wins.
pub const INFINITE_RATIO: &str = "∞";

/// Display adapter that escapes `& < > " '` while formatting, for element
/// content and quoted attributes.
pub fn esc(s: &str) -> Escaped<'_> {
    Escaped(s)
}

pub struct Escaped<'a>(&'a str);

impl fmt::Display for Escaped<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rest = self.0;
        while let Some(idx) = rest.find(['&', '<', '>', '"', '\'']) {
            f.write_str(&rest[..idx])?;
            f.write_str(match rest.as_bytes()[idx] {
                b'&' => "&amp;",
                b'<' => "&lt;",
                b'>' => "&gt;",
                b'"' => "&quot;",
                _ => "&#39;",
            })?;
            rest = &rest[idx + 1..];
        }
        f.write_str(rest)
    }
}

/// `value / capacity` clamped into `[0, 1]`. A zero capacity is empty.
pub fn fill_ratio(value: f64, capacity: f64) -> f64 {
    if capacity <= 0.0 || !value.is_finite() {
        return 0.0;
    }
    (value / capacity).clamp(0.0, 1.0)
}

/// Bar width as a CSS percentage, e.g. `37.5%`.
pub fn bar_width(value: f64, capacity: f64) -> String {
    format!("{}%", fill_ratio(value, capacity) * 100.0)
}

pub fn win_loss_ratio(wins: u64, losses: u64) -> String {
    if losses > 0 {
        format!("{:.2}", wins as f64 / losses as f64)
    } else if wins > 0 {
        INFINITE_RATIO.to_string()
    } else {
        "0.00".to_string()
    }
}

/// `1234567` -> `1,234,567`.
pub fn group_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// A single full-width row for empty tables.
pub fn placeholder_row(colspan: usize, message: &str) -> String {
    format!(
        r#"<td colspan="{colspan}" class="empty-data-message">{}</td>"#,
        esc(message)
    )
}

/// A titled value card. `value` is markup and must already be escaped.
pub fn card(title: &str, value: &str, class: &str) -> String {
    format!(
        r#"<div class="card-title">{}</div><div class="{}">{}</div>"#,
        esc(title),
        esc(class),
        value
    )
}

/// Percent-encodes a value for a URL path segment or query. Only
/// alphanumerics and `*-._` pass through; spaces become `%20`.
pub fn encode_component(s: &str) -> String {
    form_urlencoded::byte_serialize(s.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// A deep link to the character page.
pub fn char_link(name: &str) -> String {
    format!(
        r#"<a href="charinfo.html?name={}" target="_blank">{}</a>"#,
        encode_component(&name.to_lowercase()),
        esc(name)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn escape(s: &str) -> String {
        esc(s).to_string()
    }

    #[test]
    fn escapes_the_five_characters() {
        assert_eq!(
            escape(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
        assert_eq!(escape("plain"), "plain");
        assert_eq!(escape(""), "");
        assert_eq!(escape("Кирилица & co"), "Кирилица &amp; co");
    }

    #[test]
    fn escaped_output_has_no_raw_specials() {
        let out = escape("<<&&>>\"\"''");
        for raw in ['<', '>', '"', '\''] {
            assert!(!out.contains(raw), "{raw} leaked into {out}");
        }
        assert_eq!(out.matches('&').count(), 10);
    }

    #[test]
    fn ratio_is_clamped() {
        assert_eq!(fill_ratio(4.0, 8.0), 0.5);
        assert_eq!(fill_ratio(12.0, 8.0), 1.0);
        assert_eq!(fill_ratio(-1.0, 8.0), 0.0);
        assert_eq!(fill_ratio(3.0, 0.0), 0.0);
        assert_eq!(bar_width(3.0, 8.0), "37.5%");
        assert_eq!(bar_width(9.0, 8.0), "100%");
    }

    #[test]
    fn win_loss_ratio_sentinels() {
        assert_eq!(win_loss_ratio(5, 0), INFINITE_RATIO);
        assert_eq!(win_loss_ratio(0, 0), "0.00");
        assert_eq!(win_loss_ratio(0, 4), "0.00");
        assert_eq!(win_loss_ratio(7, 2), "3.50");
        assert_eq!(win_loss_ratio(1, 3), "0.33");
    }

    #[test]
    fn thousands_grouping() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(3_520_485_254), "3,520,485,254");
        assert_eq!(group_thousands(-12_345), "-12,345");
    }

    #[test]
    fn links_escape_their_text() {
        assert_eq!(
            char_link("Bob<x>"),
            r#"<a href="charinfo.html?name=bob%3Cx%3E" target="_blank">Bob&lt;x&gt;</a>"#
        );
    }

    #[test]
    fn link_names_cannot_split_the_query() {
        assert_eq!(
            char_link("a&b=c d"),
            r#"<a href="charinfo.html?name=a%26b%3Dc%20d" target="_blank">a&amp;b=c d</a>"#
        );
    }

    #[test]
    fn components_keep_separators_out() {
        assert_eq!(encode_component("sorsi"), "sorsi");
        assert_eq!(encode_component("../x"), "..%2Fx");
        assert_eq!(encode_component("a?b#c"), "a%3Fb%23c");
        assert_eq!(encode_component("a+b c"), "a%2Bb%20c");
    }
}
