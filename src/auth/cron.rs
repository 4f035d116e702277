use actix_web::HttpRequest;

/// Shared-secret check for the scheduler trigger.
///
/// Accepts `Authorization: Bearer <secret>` or the bare secret. When no
/// secret is configured every caller is accepted (warned about at startup).
pub fn is_authorized_trigger(req: &HttpRequest, secret: Option<&str>) -> bool {
    let Some(secret) = secret else {
        return true;
    };

    let presented = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .map(|h| h.strip_prefix("Bearer ").unwrap_or(h));

    match presented {
        Some(p) => constant_time_eq(p.as_bytes(), secret.as_bytes()),
        None => false,
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_secret_enforced() {
        let ok = TestRequest::default()
            .insert_header(("Authorization", "Bearer s3cret"))
            .to_http_request();
        let bare = TestRequest::default()
            .insert_header(("Authorization", "s3cret"))
            .to_http_request();
        let wrong = TestRequest::default()
            .insert_header(("Authorization", "Bearer nope"))
            .to_http_request();
        let missing = TestRequest::default().to_http_request();

        assert!(is_authorized_trigger(&ok, Some("s3cret")));
        assert!(is_authorized_trigger(&bare, Some("s3cret")));
        assert!(!is_authorized_trigger(&wrong, Some("s3cret")));
        assert!(!is_authorized_trigger(&missing, Some("s3cret")));
    }

    #[test]
    fn test_open_without_secret() {
        let missing = TestRequest::default().to_http_request();
        assert!(is_authorized_trigger(&missing, None));
    }
}
