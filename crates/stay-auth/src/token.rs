use base64::Engine as _;
use chrono::{DateTime, Utc};

/// Read the `exp` claim of a JWT access token without verifying it.
///
/// Only used for display; the backend remains the authority on whether a
/// token is accepted. Returns `None` for anything that is not a three-part
/// token with a numeric `exp`.
#[must_use]
pub fn access_token_expiry(token: &str) -> Option<DateTime<Utc>> {
    let mut parts = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return None;
    };

    let payload = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .ok()?;
    let claims: serde_json::Value = serde_json::from_slice(&payload).ok()?;
    DateTime::from_timestamp(claims.get("exp")?.as_i64()?, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jwt_with_payload(payload: &str) -> String {
        let engine = base64::engine::general_purpose::URL_SAFE_NO_PAD;
        format!(
            "{}.{}.{}",
            engine.encode(r#"{"alg":"HS256","typ":"JWT"}"#),
            engine.encode(payload),
            engine.encode("sig")
        )
    }

    #[test]
    fn reads_exp_claim() {
        let exp = Utc::now().timestamp() + 3600;
        let token = jwt_with_payload(&format!(r#"{{"user_id":7,"exp":{exp}}}"#));
        assert_eq!(access_token_expiry(&token).map(|dt| dt.timestamp()), Some(exp));
    }

    #[test]
    fn past_exp_is_still_reported() {
        let token = jwt_with_payload(r#"{"exp":1000}"#);
        let expiry = access_token_expiry(&token).unwrap();
        assert_eq!(expiry.timestamp(), 1000);
        assert!(expiry <= Utc::now());
    }

    #[test]
    fn opaque_tokens_have_no_expiry() {
        assert_eq!(access_token_expiry("t1"), None);
        assert_eq!(access_token_expiry("a.b"), None);
        assert_eq!(access_token_expiry("a.b.c.d"), None);
    }

    #[test]
    fn missing_or_non_numeric_exp_is_none() {
        assert_eq!(access_token_expiry(&jwt_with_payload(r#"{"sub":"x"}"#)), None);
        assert_eq!(access_token_expiry(&jwt_with_payload(r#"{"exp":"soon"}"#)), None);
        assert_eq!(access_token_expiry(&jwt_with_payload("not json")), None);
    }
}
