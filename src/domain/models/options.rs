//! Query-string option grammar.
//!
//! Options arrive as a single string of `;`-separated tokens. Each token is
//! a flag name optionally followed by one space and a value. The flag is
//! prefixed with `-` before it reaches an adapter:
//!
//! ```
//! use clusterhub::domain::models::parse_option_string;
//!
//! assert_eq!(parse_option_string("O;N 3"), vec!["-O", "-N", "3"]);
//! ```

/// Split an option string into the token sequence handed to `configure`.
///
/// Blank tokens are skipped. Only the first space separates flag and value;
/// the remainder (trimmed) is kept as a single value token.
pub fn parse_option_string(raw: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    for token in raw.split(';') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        match token.split_once(' ') {
            Some((flag, value)) => {
                tokens.push(format!("-{flag}"));
                let value = value.trim();
                if !value.is_empty() {
                    tokens.push(value.to_string());
                }
            }
            None => tokens.push(format!("-{token}")),
        }
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_flag() {
        assert_eq!(parse_option_string("O"), vec!["-O"]);
    }

    #[test]
    fn test_flag_with_value() {
        assert_eq!(parse_option_string("N 3"), vec!["-N", "3"]);
    }

    #[test]
    fn test_mixed_tokens() {
        assert_eq!(
            parse_option_string("O;N 3;I 100"),
            vec!["-O", "-N", "3", "-I", "100"]
        );
    }

    #[test]
    fn test_blank_and_padded_tokens() {
        assert!(parse_option_string("").is_empty());
        assert!(parse_option_string(" ; ;").is_empty());
        assert_eq!(parse_option_string(" N  3 ;O "), vec!["-N", "3", "-O"]);
    }

    #[test]
    fn test_value_keeps_inner_spaces() {
        assert_eq!(
            parse_option_string("A EuclideanDistance -R first-last"),
            vec!["-A", "EuclideanDistance -R first-last"]
        );
    }
}
