//! Emoji removal for submitted text

use regex::Regex;
use std::sync::OnceLock;

fn emoji_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(concat!(
            "[",
            r"\x{1F600}-\x{1F64F}", // emoticons
            r"\x{1F300}-\x{1F5FF}", // symbols & pictographs
            r"\x{1F680}-\x{1F6FF}", // transport & map
            r"\x{1F1E0}-\x{1F1FF}", // flags
            r"\x{2600}-\x{26FF}",   // misc symbols
            r"\x{2700}-\x{27BF}",   // dingbats
            r"\x{1F900}-\x{1F9FF}", // supplemental symbols
            r"\x{1FA70}-\x{1FAFF}",
            r"\x{24C2}",
            r"\x{1F170}-\x{1F251}", // enclosed alphanumerics
            r"\x{FE0F}",            // variation selector 16
            r"\x{200D}",            // zero width joiner
            "]+"
        ))
        .expect("emoji regex must compile")
    })
}

/// Remove emoji and pictograph code points, leaving all other text intact
pub fn remove_emojis(text: &str) -> String {
    emoji_re().replace_all(text, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_common_emoji() {
        assert_eq!(remove_emojis("Flood alert 🌊🚨 in Assam"), "Flood alert  in Assam");
        assert_eq!(remove_emojis("😀"), "");
    }

    #[test]
    fn test_strips_flags_and_zwj_sequences() {
        assert_eq!(remove_emojis("India 🇮🇳 wins"), "India  wins");
        assert_eq!(remove_emojis("team 👨‍👩‍👧 photo"), "team  photo");
        assert_eq!(remove_emojis("ok ✔️"), "ok ");
    }

    #[test]
    fn test_keeps_non_latin_scripts() {
        let hindi = "मुंबई में बारिश";
        let chinese = "北京新闻";
        let tamil = "சென்னை";
        assert_eq!(remove_emojis(hindi), hindi);
        assert_eq!(remove_emojis(chinese), chinese);
        assert_eq!(remove_emojis(tamil), tamil);
    }

    #[test]
    fn test_plain_text_unchanged() {
        let text = "Budget 2024: fiscal deficit at 5.1% (estimate)";
        assert_eq!(remove_emojis(text), text);
    }
}
