/// Display name for a language code, if the code is one we know
pub fn language_name(code: &str) -> Option<&'static str> {
    let name = match code {
        "en" => "English",
        "zh" => "Chinese",
        "hi" => "Hindi",
        "es" => "Spanish",
        "fr" => "French",
        "ar" => "Arabic",
        "bn" => "Bengali",
        "ru" => "Russian",
        "pt" => "Portuguese",
        "id" => "Indonesian",
        "ur" => "Urdu",
        "ja" => "Japanese",
        "de" => "German",
        "pa" => "Punjabi",
        "jv" => "Javanese",
        "sw" => "Swahili",
        "te" => "Telugu",
        "vi" => "Vietnamese",
        "ko" => "Korean",
        "mr" => "Marathi",
        "ta" => "Tamil",
        "it" => "Italian",
        "tr" => "Turkish",
        "pl" => "Polish",
        "uk" => "Ukrainian",
        "nl" => "Dutch",
        "fa" => "Persian",
        "th" => "Thai",
        "gu" => "Gujarati",
        "ro" => "Romanian",
        "uz" => "Uzbek",
        "am" => "Amharic",
        "bg" => "Bulgarian",
        "ms" => "Malay",
        "ca" => "Catalan",
        "hu" => "Hungarian",
        "sv" => "Swedish",
        "cs" => "Czech",
        "el" => "Greek",
        "he" => "Hebrew",
        "no" => "Norwegian",
        "fi" => "Finnish",
        "da" => "Danish",
        "sk" => "Slovak",
        "lt" => "Lithuanian",
        "sl" => "Slovenian",
        "et" => "Estonian",
        "lv" => "Latvian",
        "mt" => "Maltese",
        "be" => "Belarusian",
        "mhr" => "Eastern Mari",
        "mrj" => "Hill Mari",
        "tt" => "Tatar",
        "emj" => "Eastern Meohja",
        _ => return None,
    };
    Some(name)
}
