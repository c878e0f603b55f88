/// Regex tables for Russian legal-norm references.
///
/// Patterns are plain strings so they can be inspected and tested on their
/// own; each consumer compiles the ones it needs once.
pub mod norms {
    /// "ст. 20.1", "статья 12", "статьи 6.1". Group 1 = article number.
    pub const ARTICLE: &str = r"(?i)(?:ст\.?|стать[ьяи])\s*([0-9]+(?:\.[0-9]+)?)\b";

    /// "ч. 1", "часть 2". Group 1 = part number.
    pub const PART: &str = r"(?i)(?:ч\.?|част[ьи])\s*([0-9]+)\b";

    /// Code names as they appear in free text. Group 1 = matched name.
    pub const CODE: &str = r"(?i)\b(коап\s*рф|уголовн\w*\s*кодекс|ук\s*рф|гражданск\w*\s*кодекс|гк\s*рф|упк\s*рф|кпк\s*рф)\b";

    /// Amendment reference: "ФЗ-123-ФЗ от 01.02.2024" (hyphen or en dash).
    pub const AMENDMENT: &str = r"ФЗ[-–]\d{1,4}[-–]ФЗ\s+от\s+\d{2}\.\d{2}\.\d{4}";
}

/// Patterns for citations inside generated answers.
pub mod citations {
    /// Group 1 = article, possibly multi-level ("6.1.1").
    pub const ARTICLE: &str = r"(?i)\bст\.?\s*(\d+(?:\.\d+)*)";
    /// Group 1 = part.
    pub const PART: &str = r"(?i)\bч\.?\s*(\d+)";
    /// Group 1 = point, possibly multi-level.
    pub const POINT: &str = r"(?i)\bп\.?\s*(\d+(?:\.\d+)*)";

    /// Display name and detection pattern per code, in scan order.
    pub const CODES: &[(&str, &str)] = &[
        ("КоАП РФ", r"(?i)коап\s*рф"),
        ("УК РФ", r"(?i)ук\s*рф"),
        ("ГК РФ", r"(?i)гк\s*рф"),
        ("УПК РФ", r"(?i)упк\s*рф"),
        ("ТК РФ", r"(?i)тк\s*рф"),
        ("НК РФ", r"(?i)нк\s*рф"),
    ];

    /// Ruble amounts: "5 000 ₽", "1 000–2 000 руб.".
    pub const RUBLE_AMOUNT: &str = r"\b\d{1,3}(?:[ \u{00A0}]\d{3})*(?:[–-]\d{1,3}(?:[ \u{00A0}]\d{3})*)?\s*(?:₽|руб\.?)";

    /// Sanction phrases that count as a concrete outcome (lowercase).
    pub const SANCTIONS: &[&str] = &[
        "лишение права управления",
        "обязательные работы",
        "административный арест",
        "предупреждение",
    ];
}

/// Intent heuristics. All patterns run against lowercased text.
pub mod intent {
    /// Meta questions and small talk.
    pub const OFFTOPIC: &[&str] = &[
        r"\b(кто ты|кто вы|что ты можешь|что умеешь|что вы умеете|кто твой автор|как дела)\b",
        r"\b(привет|здорово|добрый день|доброе утро|добрый вечер|спасибо)\b",
    ];

    /// Strong legal indicators.
    pub const LEGAL: &[&str] = &[
        r"\bзакон\b",
        r"\bнорм[аи]\b",
        r"\bкодекс\b",
        r"\bст\.?\s*\d+",
        r"\bстать[ьяи]\b",
        r"\bчаст[ьи]\b",
        r"\bответственност[ьи]\b",
        r"\bнаказани[ея]\b",
        r"\bштраф(ы|а|ов)?\b",
        r"\bсуд\b",
        r"\bиск\b",
        r"\bжалоб[аи]\b",
        r"\bпротокол\b",
        r"\bпостановлени[ея]\b",
        r"\bадминистративн\w*\b",
        r"\bуголовн\w*\b",
        r"\bгражданск\w*\b",
        r"\bтрудов\w*\b",
        r"\bсемейн\w*\b",
        r"\bгибдд\b",
        r"\bдтп\b",
        r"\bроспотребнадзор\b",
        r"\bпристав\w*\b",
        r"\bубийств\w*\b",
        r"\bугроз\w*\b",
        r"\bкраж\w*\b",
        r"\bграбеж\w*\b",
        r"\bразбой\w*\b",
        r"\bмошеннич\w*\b",
        r"\bнаркотик\w*\b",
        r"\bсбы(т|том)\b",
        r"\bхранени\w*\b",
        r"\bпобои\b",
        r"\bвзятк\w*\b",
        r"\bпревышен(ие|и)\s+скорост[ьи]\b",
        r"\bлишени\w*\s+прав\b",
        r"\bалкогол\w*\b",
        r"\bопьянени\w*\b",
        r"\bстоянк\w*\b",
        r"\bпарковк\w*\b",
        r"\bалименты\b",
        r"\bразвод\b",
        r"\bнаследств\w*\b",
        r"\bопек\w*\b",
        r"\bдарени\w*\b",
        r"\bипотек\w*\b",
        r"\bаренд\w*\b",
        r"\bкупл[яе]-?продаж\w*\b",
        r"\bпатент\b",
        r"\bвид на жительств\w*\b",
        r"\bувольнени\w*\b",
        r"\bдисциплинарн\w*\b",
    ];

    /// Short phrasings that are legal questions on their own.
    pub const LEGAL_SHORT: &[&str] = &[
        r"\bчто будет( если)?\b",
        r"\bможно ли\b",
        r"\bштраф за\b",
        r"\bнаказани[ея] за\b",
        r"\bлишени\w* прав\b",
        r"\b(\d{2,3})\s*км/?ч\b",
    ];

    /// Near-legal reference questions. Only consulted when nothing legal matched.
    pub const PARALEGAL: &[&str] = &[
        r"\bкурс(ы)?\b",
        r"\bдоллар(а|ов)?\b",
        r"\bевро\b",
        r"\busd\b",
        r"\beur\b",
        r"\bцб(р| рф)?\b",
        r"\bпогода\b",
        r"\bрецепт\b",
        r"\bновост(и|ь)\b",
        r"\bадрес\b",
        r"\bтелефон\b",
        r"\bгде найти\b",
        r"\bкак добраться\b",
        r"\bинструкция\b",
        r"\bкак сделать\b",
        r"\bлайфхак\b",
        r"\bбанк\w*\b",
        r"\bкарта\b",
        r"\bперевод\b",
        r"\bплатеж\b",
        r"\bвклад\b",
    ];
}
