/// Truncates `text` at the first occurrence of any stop word.
///
/// The earliest match wins no matter which stop word it belongs to.
/// Empty stop words never match.
pub fn enforce_stop_words<'a, S: AsRef<str>>(
    text: &'a str,
    stop: &[S],
) -> &'a str {
    let cut = stop
        .iter()
        .map(AsRef::as_ref)
        .filter(|word| !word.is_empty())
        .filter_map(|word| text.find(word))
        .min();
    match cut {
        Some(idx) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_at_first_occurrence() {
        assert_eq!(
            enforce_stop_words("Hello world, goodbye", &["goodbye"]),
            "Hello world, "
        );
        assert_eq!(
            enforce_stop_words("a goodbye b goodbye", &["goodbye"]),
            "a "
        );
    }

    #[test]
    fn test_earliest_stop_word_wins() {
        let stop = ["world".to_owned(), "Hello".to_owned()];
        assert_eq!(enforce_stop_words("Hello world", &stop), "");
        assert_eq!(enforce_stop_words("Say Hello world", &stop), "Say ");
    }

    #[test]
    fn test_no_match() {
        let stop: [&str; 0] = [];
        assert_eq!(enforce_stop_words("Hello", &stop), "Hello");
        assert_eq!(enforce_stop_words("Hello", &["bye"]), "Hello");
        assert_eq!(enforce_stop_words("Hello", &[""]), "Hello");
        assert_eq!(enforce_stop_words("", &["bye"]), "");
    }
}
