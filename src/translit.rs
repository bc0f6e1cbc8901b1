//! Keyboard-layout transliteration.
//!
//! Maps characters typed with the Latin (QWERTY) layout active to the
//! Cyrillic letters on the same physical keys of the standard ЙЦУКЕН
//! layout, so "bdfyjd" typed by mistake still finds "иванов".

const LAYOUT: [(char, char); 33] = [
    ('q', 'й'),
    ('w', 'ц'),
    ('e', 'у'),
    ('r', 'к'),
    ('t', 'е'),
    ('y', 'н'),
    ('u', 'г'),
    ('i', 'ш'),
    ('o', 'щ'),
    ('p', 'з'),
    ('[', 'х'),
    (']', 'ъ'),
    ('a', 'ф'),
    ('s', 'ы'),
    ('d', 'в'),
    ('f', 'а'),
    ('g', 'п'),
    ('h', 'р'),
    ('j', 'о'),
    ('k', 'л'),
    ('l', 'д'),
    (';', 'ж'),
    ('\'', 'э'),
    ('z', 'я'),
    ('x', 'ч'),
    ('c', 'с'),
    ('v', 'м'),
    ('b', 'и'),
    ('n', 'т'),
    ('m', 'ь'),
    (',', 'б'),
    ('.', 'ю'),
    ('/', '.'),
];

/// Cyrillic letter on the same key as `c`, if the key is part of the layout.
pub fn map_key(c: char) -> Option<char> {
    LAYOUT
        .iter()
        .find(|(latin, _)| *latin == c)
        .map(|(_, cyrillic)| *cyrillic)
}

/// Lowercase the input, then substitute every mapped key.
/// Characters outside the layout pass through unchanged.
pub fn transliterate(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .map(|c| map_key(c).unwrap_or(c))
        .collect()
}
