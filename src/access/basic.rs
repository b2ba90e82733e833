use base64ct::{Base64, Encoding};

/// Splits an `Authorization: Basic` header into (login, secret).
///
/// Returns `None` on any malformed input: wrong scheme, bad base64,
/// non-UTF-8 payload, or a payload without a colon. The caller turns
/// `None` into a 401 challenge.
pub fn parse(header: &str) -> Option<(String, String)> {
    let encoded = header
        .strip_prefix("Basic ")
        .or_else(|| header.strip_prefix("basic "))?;
    let decoded = Base64::decode_vec(encoded.trim()).ok()?;
    let text = String::from_utf8(decoded).ok()?;
    let (login, secret) = text.split_once(':')?;
    if login.is_empty() {
        return None;
    }
    Some((login.to_string(), secret.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(raw: &str) -> String {
        format!("Basic {}", Base64::encode_string(raw.as_bytes()))
    }

    #[test]
    fn parses_well_formed_credentials() {
        let (login, secret) = parse(&encode("a@x.com:password1")).unwrap();
        assert_eq!(login, "a@x.com");
        assert_eq!(secret, "password1");
    }

    #[test]
    fn secret_may_contain_colons() {
        let (login, secret) = parse(&encode("a@x.com:pa:ss")).unwrap();
        assert_eq!(login, "a@x.com");
        assert_eq!(secret, "pa:ss");
    }

    #[test]
    fn rejects_wrong_scheme_and_garbage() {
        assert!(parse("Bearer abc").is_none());
        assert!(parse("Basic !!!not-base64!!!").is_none());
        assert!(parse(&encode("no-colon-here")).is_none());
        assert!(parse(&encode(":secret-without-login")).is_none());
    }
}
