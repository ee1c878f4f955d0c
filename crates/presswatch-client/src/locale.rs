// UI string localization
//
// Small static table for the strings the conversation layer itself
// produces (synthetic error messages, progress placeholders). Unknown
// languages and unknown keys fall back to English.

const STRINGS: &[(&str, &str, &str)] = &[
    // (key, language, text)
    ("research_failed", "en", "Sorry, the research run failed"),
    ("research_failed", "az", "Üzr istəyirik, araşdırma alınmadı"),
    ("research_failed", "ru", "К сожалению, исследование не удалось"),
    ("connection_lost", "en", "Connection lost before the report arrived"),
    ("connection_lost", "az", "Hesabat gəlməmiş bağlantı kəsildi"),
    ("connection_lost", "ru", "Соединение прервано до получения отчёта"),
    ("processing", "en", "Processing..."),
    ("processing", "az", "Emal olunur..."),
    ("processing", "ru", "Обработка..."),
];

/// Look up a UI string for a language code, falling back to English.
pub fn ui_text(language: &str, key: &str) -> &'static str {
    STRINGS
        .iter()
        .find(|(k, lang, _)| *k == key && *lang == language)
        .or_else(|| STRINGS.iter().find(|(k, lang, _)| *k == key && *lang == "en"))
        .map(|(_, _, text)| *text)
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_localized_lookup() {
        assert_eq!(ui_text("az", "processing"), "Emal olunur...");
        assert_eq!(ui_text("ru", "processing"), "Обработка...");
    }

    #[test]
    fn test_unknown_language_falls_back_to_english() {
        assert_eq!(ui_text("de", "processing"), "Processing...");
    }

    #[test]
    fn test_unknown_key_is_empty() {
        assert_eq!(ui_text("en", "no_such_key"), "");
    }
}
