pub mod alternative_me;
pub mod binance;
pub mod coinmarketcap;
pub mod gemini;

pub use alternative_me::FearGreedClient;
pub use binance::BinanceClient;
pub use coinmarketcap::CoinMarketCapClient;
pub use gemini::GeminiClient;

const BODY_SNIPPET_LEN: usize = 200;

/// Trim an upstream error body to a loggable size without cutting through
/// a multi-byte character.
pub(crate) fn body_snippet(text: &str) -> &str {
    if text.len() <= BODY_SNIPPET_LEN {
        return text;
    }
    let mut end = BODY_SNIPPET_LEN;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    // ====== Body Snippet Tests ======

    #[test]
    fn test_body_snippet_passes_short_bodies_through() {
        assert_eq!(body_snippet("symbol not found"), "symbol not found");
        assert_eq!(body_snippet(""), "");
    }

    #[test]
    fn test_body_snippet_caps_long_ascii_bodies() {
        let body = "x".repeat(500);
        assert_eq!(body_snippet(&body).len(), 200);
    }

    #[test]
    fn test_body_snippet_backs_off_mid_character_cuts() {
        // 199 ASCII bytes, then a two-byte character spanning bytes 199..201:
        // byte 200 is not a boundary, so the cut must land at 199.
        let body = format!("{}é tail that pushes the body past the cap", "a".repeat(199));
        let snippet = body_snippet(&body);

        assert_eq!(snippet.len(), 199);
        assert!(snippet.chars().all(|c| c == 'a'));
    }

    #[test]
    fn test_body_snippet_handles_wide_characters_throughout() {
        // Three-byte characters: 200 is not a multiple of three, so a naive
        // byte slice would split one of them.
        let body = "€".repeat(100);
        let snippet = body_snippet(&body);

        assert_eq!(snippet.len(), 198);
        assert_eq!(snippet.chars().count(), 66);
    }
}
