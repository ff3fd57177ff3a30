//! Arabic text normalization for matching spreadsheet cells.

/// Fold an Arabic (or mixed) string into a comparison key.
///
/// Strips tashkeel and tatweel, unifies alef/ta-marbuta/ya/hamza-carrier
/// variants, maps Arabic-Indic digits to ASCII, lowercases, and collapses
/// whitespace.
pub fn normalize(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_space = false;

    for ch in input.chars() {
        if is_diacritic(ch) || ch == '\u{0640}' {
            continue;
        }
        if ch.is_whitespace() {
            pending_space = !out.is_empty();
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        match fold(ch) {
            Some(c) => out.push(c),
            None => out.extend(ch.to_lowercase()),
        }
    }
    out
}

fn is_diacritic(ch: char) -> bool {
    matches!(ch, '\u{064B}'..='\u{065F}' | '\u{0670}')
}

fn fold(ch: char) -> Option<char> {
    let folded = match ch {
        'أ' | 'إ' | 'آ' | 'ٱ' => 'ا',
        'ة' => 'ه',
        'ى' => 'ي',
        'ؤ' => 'و',
        'ئ' => 'ي',
        '\u{0660}'..='\u{0669}' => digit(ch as u32 - 0x0660),
        // Extended (Persian) digits
        '\u{06F0}'..='\u{06F9}' => digit(ch as u32 - 0x06F0),
        _ => return None,
    };
    Some(folded)
}

fn digit(value: u32) -> char {
    char::from_digit(value, 10).unwrap_or('0')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letter_variants_fold() {
        assert_eq!(normalize("أحمد"), normalize("احمد"));
        assert_eq!(normalize("إدارة"), "اداره");
        assert_eq!(normalize("مستشفى"), "مستشفي");
        assert_eq!(normalize("مؤسسة"), "موسسه");
        assert_eq!(normalize("شاطئ"), "شاطي");
    }

    #[test]
    fn test_diacritics_and_tatweel_stripped() {
        assert_eq!(normalize("مَطْعَم"), "مطعم");
        assert_eq!(normalize("الرحمـــن"), "الرحمن");
        assert_eq!(normalize("هٰذا"), "هذا");
    }

    #[test]
    fn test_digits_case_and_whitespace() {
        assert_eq!(normalize("  فرع   ١٢٣ "), "فرع 123");
        assert_eq!(normalize("Branch\tNo. ۴"), "branch no. 4");
        assert_eq!(normalize(""), "");
    }
}
