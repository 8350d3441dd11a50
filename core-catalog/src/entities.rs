//! HTML entity decoding for display fields.
//!
//! WordPress escapes product titles and taxonomy names before they reach the
//! JSON payload (`Drum &amp; Bass`, `Rock &#039;n&#039; Roll`). Only the
//! references WordPress actually emits are handled; anything unrecognised is
//! left as written.

/// Longest reference we try to match, including `&` and `;`.
const MAX_REFERENCE_LEN: usize = 10;

pub fn decode_entities(input: &str) -> String {
    if !input.contains('&') {
        return input.to_string();
    }

    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let candidate = &rest[amp..];

        let decoded = candidate
            .char_indices()
            .take(MAX_REFERENCE_LEN)
            .find(|&(_, c)| c == ';')
            .and_then(|(end, _)| decode_reference(&candidate[1..end]).map(|c| (c, end)));

        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &candidate[end + 1..];
            }
            None => {
                out.push('&');
                rest = &candidate[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn decode_reference(body: &str) -> Option<char> {
    if let Some(numeric) = body.strip_prefix('#') {
        let code = match numeric.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => numeric.parse::<u32>().ok()?,
        };
        return char::from_u32(code);
    }

    let c = match body {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        "ndash" => '\u{2013}',
        "mdash" => '\u{2014}',
        "lsquo" => '\u{2018}',
        "rsquo" => '\u{2019}',
        "ldquo" => '\u{201c}',
        "rdquo" => '\u{201d}',
        "hellip" => '\u{2026}',
        _ => return None,
    };
    Some(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_named_and_numeric_references() {
        assert_eq!(decode_entities("Drum &amp; Bass"), "Drum & Bass");
        assert_eq!(decode_entities("Rock &#039;n&#039; Roll"), "Rock 'n' Roll");
        assert_eq!(decode_entities("&quot;Live&quot; &lt;2LP&gt;"), "\"Live\" <2LP>");
        assert_eq!(decode_entities("Caf&#xE9;"), "Café");
        assert_eq!(decode_entities("Side A&#8217;s"), "Side A\u{2019}s");
    }

    #[test]
    fn leaves_unknown_or_unterminated_references() {
        assert_eq!(decode_entities("R&B"), "R&B");
        assert_eq!(decode_entities("A & B"), "A & B");
        assert_eq!(decode_entities("&bogus;"), "&bogus;");
        assert_eq!(decode_entities("&#xZZ;"), "&#xZZ;");
        assert_eq!(decode_entities("trailing &"), "trailing &");
    }

    #[test]
    fn plain_text_is_unchanged() {
        assert_eq!(decode_entities("Untitled"), "Untitled");
        assert_eq!(decode_entities(""), "");
    }
}
