//! Fuzzy matching used to recognise misspelt keywords.

/// Levenshtein distance over chars, computed with a single rolling row.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b_chars.len()).collect();

    for (i, a_char) in a.chars().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, &b_char) in b_chars.iter().enumerate() {
            let cost = usize::from(a_char != b_char);
            let next = (row[j + 1] + 1).min(row[j] + 1).min(diagonal + cost);
            diagonal = row[j + 1];
            row[j + 1] = next;
        }
    }
    row[b_chars.len()]
}

/// True when `word` is a near miss for `target`: not equal, at most two
/// edits away, and long enough that the match is meaningful.
pub fn is_misspelling(word: &str, target: &str) -> bool {
    if word == target || word.chars().count() < 3 {
        return false;
    }
    let limit = if target.chars().count() <= 4 { 1 } else { 2 };
    edit_distance(word, target) <= limit
}
