//! AWS Signature Version 4 request signing.
//!
//! Builds the canonical request, the string to sign and the derived signing
//! key with HMAC-SHA256, then returns the headers to attach to the request.
//! Paths are encoded a second time for the canonical URI, as every service
//! except S3 expects.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use reqwest::Url;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

use super::credentials::AwsCredentials;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// Signs requests for one service in one region.
#[derive(Clone, Debug)]
pub struct RequestSigner {
    credentials: AwsCredentials,
    region: String,
    service: &'static str,
}

impl RequestSigner {
    pub fn new(credentials: AwsCredentials, region: impl Into<String>, service: &'static str) -> Self {
        Self {
            credentials,
            region: region.into(),
            service,
        }
    }

    /// Compute the signing headers for a request.
    ///
    /// `headers` are the headers that will be sent and must be signed; `host`
    /// and `x-amz-date` are added here. The returned pairs must be attached
    /// to the outgoing request unchanged.
    pub fn sign(
        &self,
        method: &str,
        url: &Url,
        headers: &[(&str, &str)],
        payload: &[u8],
        now: DateTime<Utc>,
    ) -> Vec<(&'static str, String)> {
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let date = now.format("%Y%m%d").to_string();

        let mut signed: BTreeMap<String, String> = headers
            .iter()
            .map(|(name, value)| (name.to_ascii_lowercase(), canonical_header_value(value)))
            .collect();
        signed.insert("host".to_string(), host_header(url));
        signed.insert("x-amz-date".to_string(), amz_date.clone());
        if let Some(token) = self.credentials.session_token() {
            signed.insert("x-amz-security-token".to_string(), token.to_string());
        }

        let (creq, signed_headers) = canonical_request(method, url, &signed, &sha256_hex(payload));
        let scope = format!("{}/{}/{}/aws4_request", date, self.region, self.service);
        let string_to_sign = format!(
            "{}\n{}\n{}\n{}",
            ALGORITHM,
            amz_date,
            scope,
            sha256_hex(creq.as_bytes())
        );

        let key = signing_key(
            self.credentials.secret_access_key(),
            &date,
            &self.region,
            self.service,
        );
        let signature = hex_encode(&hmac_sha256(&key, string_to_sign.as_bytes()));

        let authorization = format!(
            "{} Credential={}/{}, SignedHeaders={}, Signature={}",
            ALGORITHM,
            self.credentials.access_key_id(),
            scope,
            signed_headers,
            signature
        );

        let mut out = vec![("x-amz-date", amz_date), ("authorization", authorization)];
        if let Some(token) = self.credentials.session_token() {
            out.push(("x-amz-security-token", token.to_string()));
        }
        out
    }
}

/// Build the canonical request. Returns it with the signed header list.
fn canonical_request(
    method: &str,
    url: &Url,
    headers: &BTreeMap<String, String>,
    payload_hash: &str,
) -> (String, String) {
    let path = if url.path().is_empty() { "/" } else { url.path() };
    let canonical_uri = uri_encode(path, false);

    let mut query: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (uri_encode(&k, true), uri_encode(&v, true)))
        .collect();
    query.sort();
    let canonical_query = query
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let canonical_headers: String = headers
        .iter()
        .map(|(name, value)| format!("{}:{}\n", name, value))
        .collect();
    let signed_headers = headers.keys().cloned().collect::<Vec<_>>().join(";");

    let creq = format!(
        "{}\n{}\n{}\n{}\n{}\n{}",
        method, canonical_uri, canonical_query, canonical_headers, signed_headers, payload_hash
    );
    (creq, signed_headers)
}

/// Derive the signing key for a date, region and service.
fn signing_key(secret: &str, date: &str, region: &str, service: &str) -> Vec<u8> {
    let k_date = hmac_sha256(format!("AWS4{}", secret).as_bytes(), date.as_bytes());
    let k_region = hmac_sha256(&k_date, region.as_bytes());
    let k_service = hmac_sha256(&k_region, service.as_bytes());
    hmac_sha256(&k_service, b"aws4_request")
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

fn sha256_hex(data: &[u8]) -> String {
    hex_encode(&Sha256::digest(data))
}

fn host_header(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    }
}

/// Trim and collapse runs of whitespace.
fn canonical_header_value(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Percent-encode everything except unreserved characters.
///
/// `/` is kept unless `encode_slash` is set.
pub(crate) fn uri_encode(input: &str, encode_slash: bool) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            b'/' if !encode_slash => out.push('/'),
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

/// Encode bytes as lowercase hex.
pub(crate) fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const EXAMPLE_SECRET: &str = "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY";

    #[test]
    fn signing_key_matches_published_example() {
        let key = signing_key(EXAMPLE_SECRET, "20120215", "us-east-1", "iam");
        assert_eq!(
            hex_encode(&key),
            "f4780e2d9f65fa895f9c67b32ce1baf0b0d8a43505a000a1a9e090d414db404d"
        );
    }

    #[test]
    fn empty_payload_hash() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn signs_published_list_users_example() {
        let signer = RequestSigner::new(
            AwsCredentials::new("AKIDEXAMPLE", EXAMPLE_SECRET),
            "us-east-1",
            "iam",
        );
        let url = Url::parse("https://iam.amazonaws.com/?Action=ListUsers&Version=2010-05-08").unwrap();
        let now = Utc.with_ymd_and_hms(2015, 8, 30, 12, 36, 0).unwrap();

        let headers = signer.sign(
            "GET",
            &url,
            &[("Content-Type", "application/x-www-form-urlencoded; charset=utf-8")],
            b"",
            now,
        );

        assert_eq!(headers[0], ("x-amz-date", "20150830T123600Z".to_string()));
        assert_eq!(
            headers[1].1,
            "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20150830/us-east-1/iam/aws4_request, \
             SignedHeaders=content-type;host;x-amz-date, \
             Signature=5d672d79c15b13162d9279b0855cfba6789a8edb4c82c400e06b5924a6f2b5d7"
        );
    }

    #[test]
    fn canonical_request_is_deterministic_and_sorted() {
        let url = Url::parse("https://example.com/v1/apps/p-1?b=2&a=1").unwrap();
        let mut headers = BTreeMap::new();
        headers.insert("x-amz-date".to_string(), "20240101T000000Z".to_string());
        headers.insert("host".to_string(), "example.com".to_string());

        let (first, signed) = canonical_request("GET", &url, &headers, "abc");
        let (second, _) = canonical_request("GET", &url, &headers, "abc");

        assert_eq!(first, second);
        assert_eq!(signed, "host;x-amz-date");
        assert_eq!(
            first,
            "GET\n/v1/apps/p-1\na=1&b=2\nhost:example.com\nx-amz-date:20240101T000000Z\n\nhost;x-amz-date\nabc"
        );
    }

    #[test]
    fn canonical_uri_double_encodes_escaped_segments() {
        let url = Url::parse("https://example.com/users/a%20b").unwrap();
        let (creq, _) = canonical_request("GET", &url, &BTreeMap::new(), "x");
        assert!(creq.starts_with("GET\n/users/a%2520b\n"));
    }

    #[test]
    fn session_token_is_signed_and_returned() {
        let signer = RequestSigner::new(
            AwsCredentials::new("AKID", "secret").with_session_token("tok"),
            "eu-west-1",
            "dynamodb",
        );
        let url = Url::parse("https://dynamodb.eu-west-1.amazonaws.com/").unwrap();
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        let headers = signer.sign("POST", &url, &[], b"{}", now);

        assert_eq!(headers.len(), 3);
        assert_eq!(headers[2], ("x-amz-security-token", "tok".to_string()));
        assert!(headers[1].1.contains("SignedHeaders=host;x-amz-date;x-amz-security-token"));
    }

    #[test]
    fn host_includes_non_default_port() {
        let url = Url::parse("http://localhost:8000/").unwrap();
        assert_eq!(host_header(&url), "localhost:8000");
    }

    #[test]
    fn uri_encode_keeps_unreserved() {
        assert_eq!(uri_encode("a-b_c.d~e/f", false), "a-b_c.d~e/f");
        assert_eq!(uri_encode("a/b c", true), "a%2Fb%20c");
    }
}
