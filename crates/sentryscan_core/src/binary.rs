//! Binary content detection heuristics.

/// Number of leading bytes examined when classifying content.
/// Matches how git sniffs binaries; real binary files almost always carry
/// a NUL within their headers.
const BINARY_CHECK_BYTES: usize = 8 * 1024;

/// Minimum share of the examined bytes that must be valid UTF-8 for the
/// content to be treated as text.
const MIN_UTF8_RATIO: f64 = 0.85;

/// Returns `true` if the buffer should be skipped as binary: a NUL byte in
/// the first 8 KiB, or a UTF-8 validity ratio below 85%.
#[must_use]
pub fn is_binary(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(BINARY_CHECK_BYTES)];
    if head.contains(&0) {
        return true;
    }
    utf8_valid_ratio(head) < MIN_UTF8_RATIO
}

/// Fraction of `bytes` that forms valid UTF-8 sequences.
#[expect(
    clippy::cast_precision_loss,
    reason = "the examined window is at most 8 KiB; counts fit losslessly in f64"
)]
fn utf8_valid_ratio(bytes: &[u8]) -> f64 {
    if bytes.is_empty() {
        return 1.0;
    }

    let mut valid = 0usize;
    let mut rest = bytes;
    loop {
        match std::str::from_utf8(rest) {
            Ok(s) => {
                valid += s.len();
                break;
            }
            Err(err) => {
                valid += err.valid_up_to();
                // error_len is None only for a truncated sequence at the end.
                let invalid = err.error_len().unwrap_or(rest.len() - err.valid_up_to());
                let consumed = err.valid_up_to() + invalid;
                if consumed >= rest.len() {
                    break;
                }
                rest = &rest[consumed..];
            }
        }
    }

    valid as f64 / bytes.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_not_binary() {
        assert!(!is_binary(b"hello world"));
        assert!(!is_binary(b"line1\nline2\nline3"));
        assert!(!is_binary(b""));
    }

    #[test]
    fn nul_byte_marks_content_binary() {
        assert!(is_binary(b"hello\0world"));
        assert!(is_binary(b"\0"));
    }

    #[test]
    fn nul_byte_after_check_window_is_ignored() {
        let mut content = vec![b'a'; BINARY_CHECK_BYTES + 100];
        content.push(0);
        assert!(!is_binary(&content));
    }

    #[test]
    fn mostly_invalid_utf8_is_binary() {
        let content = vec![0xFFu8; 1024];
        assert!(is_binary(&content));
    }

    #[test]
    fn mostly_valid_utf8_with_stray_bytes_is_text() {
        // 10 invalid bytes in 1000 keeps the ratio well above 85%.
        let mut content = vec![b'a'; 990];
        content.extend(std::iter::repeat_n(0xFFu8, 10));
        assert!(!is_binary(&content));
    }

    #[test]
    fn ratio_just_below_threshold_is_binary() {
        // 200 invalid bytes out of 1000 gives an 80% ratio.
        let mut content = vec![b'a'; 800];
        content.extend(std::iter::repeat_n(0xFFu8, 200));
        assert!(is_binary(&content));
    }

    #[test]
    fn multibyte_utf8_counts_as_valid() {
        let content = "héllo wörld — ünïcode".repeat(50);
        assert!(!is_binary(content.as_bytes()));
    }

    #[test]
    fn truncated_multibyte_tail_does_not_flip_classification() {
        let mut content = "plain ascii text ".repeat(40).into_bytes();
        // First byte of a two-byte sequence with no continuation.
        content.push(0xC3);
        assert!(!is_binary(&content));
    }
}
