//! Question splitter

/// Separates the question from its enumerated options
pub const OPTIONS_DELIMITER: &str = "\n1.";

/// A raw query split into the bare question and its options block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedQuery<'a> {
    pub question: &'a str,
    /// Everything after the first delimiter, verbatim; empty if absent
    pub options: &'a str,
}

impl<'a> ParsedQuery<'a> {
    pub fn parse(query: &'a str) -> Self {
        match query.split_once(OPTIONS_DELIMITER) {
            Some((question, options)) => Self { question, options },
            None => Self {
                question: query,
                options: "",
            },
        }
    }

    /// Whether the caller expects one of the options as the answer
    pub fn has_options(&self) -> bool {
        !self.options.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splits_on_first_delimiter() {
        let parsed = ParsedQuery::parse("What is 1+1?\n1. one\n2. two");
        assert_eq!(parsed.question, "What is 1+1?");
        assert_eq!(parsed.options, " one\n2. two");
        assert!(parsed.has_options());
    }

    #[test]
    fn test_open_question() {
        let parsed = ParsedQuery::parse("What is ITMO?");
        assert_eq!(parsed.question, "What is ITMO?");
        assert_eq!(parsed.options, "");
        assert!(!parsed.has_options());
    }

    #[test]
    fn test_later_delimiters_stay_in_options() {
        let parsed = ParsedQuery::parse("Q\n1. a\n1. b");
        assert_eq!(parsed.question, "Q");
        assert_eq!(parsed.options, " a\n1. b");
    }

    #[test]
    fn test_delimiter_without_options() {
        let parsed = ParsedQuery::parse("Q\n1.");
        assert_eq!(parsed.question, "Q");
        assert!(!parsed.has_options());
    }

    #[test]
    fn test_number_without_newline_is_not_a_delimiter() {
        let parsed = ParsedQuery::parse("Is 1.5 bigger than 1?");
        assert_eq!(parsed.question, "Is 1.5 bigger than 1?");
        assert!(!parsed.has_options());
    }

    #[test]
    fn test_empty_query() {
        let parsed = ParsedQuery::parse("");
        assert_eq!(parsed.question, "");
        assert!(!parsed.has_options());
    }
}
