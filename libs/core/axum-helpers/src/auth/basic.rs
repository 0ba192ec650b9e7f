use axum::http::{HeaderMap, HeaderValue, header};
use base64::{Engine, engine::general_purpose::STANDARD};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BasicAuthError {
    #[error("Authorization header is not valid ASCII")]
    MalformedHeader,

    #[error("Basic credentials are not valid base64-encoded UTF-8")]
    InvalidEncoding,

    #[error("Basic credentials must have the form 'username:password'")]
    MissingSeparator,
}

/// Username/password pair from an `Authorization: Basic ...` header.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl BasicCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Extract Basic credentials from request headers.
    ///
    /// Returns `Ok(None)` when there is no `Authorization` header or it uses a
    /// different scheme; malformed Basic credentials are an error.
    pub fn from_headers(headers: &HeaderMap) -> Result<Option<Self>, BasicAuthError> {
        let Some(value) = headers.get(header::AUTHORIZATION) else {
            return Ok(None);
        };
        let value = value
            .to_str()
            .map_err(|_| BasicAuthError::MalformedHeader)?;

        let Some((scheme, encoded)) = value.trim().split_once(' ') else {
            return Ok(None);
        };
        if !scheme.eq_ignore_ascii_case("basic") {
            return Ok(None);
        }

        Self::decode(encoded.trim()).map(Some)
    }

    fn decode(encoded: &str) -> Result<Self, BasicAuthError> {
        let bytes = STANDARD
            .decode(encoded)
            .map_err(|_| BasicAuthError::InvalidEncoding)?;
        let decoded = String::from_utf8(bytes).map_err(|_| BasicAuthError::InvalidEncoding)?;

        // Passwords may contain ':'; usernames may not.
        let (username, password) = decoded
            .split_once(':')
            .ok_or(BasicAuthError::MissingSeparator)?;

        Ok(Self::new(username, password))
    }

    /// Encode as an `Authorization` header value.
    pub fn to_header_value(&self) -> HeaderValue {
        let encoded = STANDARD.encode(format!("{}:{}", self.username, self.password));
        // base64 output is always visible ASCII
        HeaderValue::from_str(&format!("Basic {encoded}"))
            .unwrap_or_else(|_| HeaderValue::from_static("Basic"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_no_header_is_anonymous() {
        assert_eq!(BasicCredentials::from_headers(&HeaderMap::new()), Ok(None));
    }

    #[test]
    fn test_other_scheme_is_ignored() {
        let headers = headers_with("Bearer abc.def.ghi");
        assert_eq!(BasicCredentials::from_headers(&headers), Ok(None));
    }

    #[test]
    fn test_decodes_valid_credentials() {
        // "alice:s3cret"
        let headers = headers_with("Basic YWxpY2U6czNjcmV0");
        let creds = BasicCredentials::from_headers(&headers).unwrap().unwrap();
        assert_eq!(creds, BasicCredentials::new("alice", "s3cret"));
    }

    #[test]
    fn test_scheme_is_case_insensitive() {
        let headers = headers_with("basic YWxpY2U6czNjcmV0");
        assert!(BasicCredentials::from_headers(&headers).unwrap().is_some());
    }

    #[test]
    fn test_password_may_contain_colon() {
        let header = BasicCredentials::new("bob", "a:b:c").to_header_value();
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, header);

        let creds = BasicCredentials::from_headers(&headers).unwrap().unwrap();
        assert_eq!(creds.username, "bob");
        assert_eq!(creds.password, "a:b:c");
    }

    #[test]
    fn test_invalid_base64() {
        let headers = headers_with("Basic !!!not-base64!!!");
        assert_eq!(
            BasicCredentials::from_headers(&headers),
            Err(BasicAuthError::InvalidEncoding)
        );
    }

    #[test]
    fn test_missing_separator() {
        // "alice"
        let headers = headers_with("Basic YWxpY2U=");
        assert_eq!(
            BasicCredentials::from_headers(&headers),
            Err(BasicAuthError::MissingSeparator)
        );
    }

    #[test]
    fn test_debug_redacts_password() {
        let rendered = format!("{:?}", BasicCredentials::new("alice", "s3cret"));
        assert!(rendered.contains("alice"));
        assert!(!rendered.contains("s3cret"));
    }
}
