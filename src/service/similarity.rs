/// Share of `before` that changed to become `after`, in percent of the longer
/// text. Two empty texts are identical.
pub fn change_percent(before: &str, after: &str) -> f64 {
    let longest = before.chars().count().max(after.chars().count());
    if longest == 0 {
        return 0.0;
    }
    strsim::levenshtein(before, after) as f64 * 100.0 / longest as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn change_percent_is_relative_to_longer_text() {
        assert_eq!(change_percent("", ""), 0.0);
        assert_eq!(change_percent("abcd", "abcd"), 0.0);
        assert_eq!(change_percent("abcd", "abce"), 25.0);
        assert_eq!(change_percent("", "abc"), 100.0);
    }

    #[test]
    fn change_counts_characters_not_bytes() {
        assert_eq!(change_percent("café", "cafe"), 25.0);
    }

    #[test]
    fn insertion_is_measured_against_the_longer_text() {
        assert_eq!(change_percent("kitten", "sitting"), 300.0 / 7.0);
    }
}
