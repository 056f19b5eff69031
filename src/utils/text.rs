//! Text normalization helpers.

/// Title-case a string: a letter following a non-letter is uppercased, every
/// other letter is lowercased.
///
/// `"data ANALYST - hà nội"` becomes `"Data Analyst - Hà Nội"`.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_letter = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_letter = true;
        } else {
            out.push(c);
            prev_letter = false;
        }
    }
    out
}

/// Collapse every run of whitespace into a single space and trim the ends.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Number of ASCII letters in `s`.
pub fn ascii_alpha_count(s: &str) -> usize {
    s.chars().filter(|c| c.is_ascii_alphabetic()).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("data analyst"), "Data Analyst");
        assert_eq!(title_case("DATA ANALYST"), "Data Analyst");
        assert_eq!(title_case("lên đến 30 tr vnd"), "Lên Đến 30 Tr Vnd");
        assert_eq!(title_case("chưa có kinh nghiệm"), "Chưa Có Kinh Nghiệm");
        assert_eq!(title_case("2nd-level o'brien"), "2Nd-Level O'Brien");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \n\t b   c "), "a b c");
        assert_eq!(collapse_whitespace("\n\n"), "");
    }

    #[test]
    fn test_ascii_alpha_count() {
        assert_eq!(ascii_alpha_count("Hà Nội 2025"), 3);
        assert_eq!(ascii_alpha_count("12 - 15"), 0);
        // Letters carrying diacritics are not counted.
        assert_eq!(ascii_alpha_count("Phân tích dữ liệu bán hàng cho Sở"), 19);
        assert_eq!(ascii_alpha_count("Phân tích dữ liệu bán hàng cho sếp"), 20);
    }
}
