/// Characters that may start a name (ASCII alphabetic or underscore).
pub(super) fn is_letter(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

pub(super) fn is_name_char(ch: char) -> bool {
    is_letter(ch) || ch.is_ascii_digit()
}
