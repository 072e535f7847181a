//! oauth::request
//!
//! Turns a request description plus the live credentials into a signed,
//! transport-ready request.
//!
//! # Design
//!
//! [`RequestBuilder`] adds the protocol parameters (`oauth_consumer_key`,
//! `oauth_nonce`, `oauth_signature_method`, `oauth_timestamp`,
//! `oauth_version`, and `oauth_token` when a token is held), signs the full
//! parameter set, and returns a [`SignedRequest`]. The signed request can be
//! rendered two ways:
//!
//! - [`SignedRequest::to_query_request`]: every parameter, signature
//!   included, in the query string. Only the request-token leg uses this.
//! - [`SignedRequest::to_header_request`]: protocol parameters in an
//!   `Authorization: OAuth ...` header, user parameters in the query (GET) or
//!   a form body (POST).
//!
//! Both renderings carry exactly the parameters that were signed.
//!
//! # Example
//!
//! ```ignore
//! let request = RequestBuilder::new(&credentials)
//!     .build(url, HttpMethod::Get, &[("count".into(), "20".into())], &[])?
//!     .to_header_request();
//! let response = transport.send(request).await?;
//! ```

use rand::distr::Alphanumeric;
use rand::Rng;

use super::credentials::Credentials;
use super::encoding::{append_query, encode_pairs, percent_encode};
use super::errors::OAuthError;
use super::signature::{normalize_parameters, sign, SIGNATURE_METHOD};
use crate::transport::{HttpMethod, HttpRequest, AUTHORIZATION, CONTENT_TYPE, FORM_CONTENT_TYPE};

/// Value of `oauth_version`.
pub const OAUTH_VERSION: &str = "1.0";

/// Length of generated nonces.
pub const NONCE_LEN: usize = 42;

/// Generate a random alphanumeric nonce of [`NONCE_LEN`] characters.
pub fn generate_nonce() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(NONCE_LEN)
        .map(char::from)
        .collect()
}

/// The per-request timestamp and nonce.
///
/// Split out so tests can pin both and reproduce a signature exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Freshness {
    /// Seconds since the Unix epoch.
    pub timestamp: i64,
    /// Single-use random string.
    pub nonce: String,
}

impl Freshness {
    /// Current time and a fresh random nonce.
    pub fn generate() -> Self {
        Self {
            timestamp: chrono::Utc::now().timestamp(),
            nonce: generate_nonce(),
        }
    }

    /// Fixed values.
    pub fn fixed(timestamp: i64, nonce: impl Into<String>) -> Self {
        Self {
            timestamp,
            nonce: nonce.into(),
        }
    }
}

/// A request whose parameter set has been signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    method: HttpMethod,
    url: String,
    user_params: Vec<(String, String)>,
    /// Protocol parameters, `oauth_signature` excluded.
    oauth_params: Vec<(String, String)>,
    signature: String,
}

impl SignedRequest {
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// The URL as supplied, including any query it already had.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The `oauth_signature` value.
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Protocol parameters including `oauth_signature`.
    pub fn oauth_parameters(&self) -> Vec<(String, String)> {
        let mut params = self.oauth_params.clone();
        params.push(("oauth_signature".to_string(), self.signature.clone()));
        params
    }

    /// Every signed parameter (user and protocol, signature excluded), in
    /// canonical order.
    pub fn parameters(&self) -> Vec<(String, String)> {
        let mut all: Vec<(String, String)> = self
            .user_params
            .iter()
            .chain(self.oauth_params.iter())
            .cloned()
            .collect();
        all.sort_by(|a, b| {
            (percent_encode(&a.0), percent_encode(&a.1))
                .cmp(&(percent_encode(&b.0), percent_encode(&b.1)))
        });
        all
    }

    /// The canonical parameter string that went into the base string.
    pub fn normalized_parameters(&self) -> String {
        normalize_parameters(
            self.user_params
                .iter()
                .chain(self.oauth_params.iter())
                .map(|(k, v)| (k.as_str(), v.as_str())),
        )
    }

    /// `OAuth k="v", ...` over the protocol parameters.
    pub fn authorization_header(&self) -> String {
        let mut params = self.oauth_parameters();
        params.sort();
        let rendered = params
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", percent_encode(k), percent_encode(v)))
            .collect::<Vec<_>>()
            .join(", ");
        format!("OAuth {}", rendered)
    }

    /// Render with every parameter in the query string and no body.
    pub fn to_query_request(&self) -> HttpRequest {
        let all = self.user_params.iter().cloned().chain(self.oauth_parameters());
        let query = encode_pairs_owned(all);
        HttpRequest::new(self.method, append_query(&self.url, &query))
    }

    /// Render with protocol parameters in the `Authorization` header.
    pub fn to_header_request(&self) -> HttpRequest {
        let user = encode_pairs(
            self.user_params
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str())),
        );

        let request = match self.method {
            HttpMethod::Get => HttpRequest::new(self.method, append_query(&self.url, &user)),
            HttpMethod::Post if user.is_empty() => HttpRequest::new(self.method, &self.url),
            HttpMethod::Post => HttpRequest::new(self.method, &self.url)
                .with_header(CONTENT_TYPE, FORM_CONTENT_TYPE)
                .with_body(user),
        };

        request.with_header(AUTHORIZATION, self.authorization_header())
    }
}

fn encode_pairs_owned<I>(pairs: I) -> String
where
    I: IntoIterator<Item = (String, String)>,
{
    let pairs: Vec<(String, String)> = pairs.into_iter().collect();
    encode_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
}

/// Signs requests with the credentials it borrows.
#[derive(Debug, Clone, Copy)]
pub struct RequestBuilder<'a> {
    credentials: &'a Credentials,
}

impl<'a> RequestBuilder<'a> {
    pub fn new(credentials: &'a Credentials) -> Self {
        Self { credentials }
    }

    /// Build and sign with a fresh nonce and the current time.
    ///
    /// `extra_oauth` carries leg-specific protocol parameters such as
    /// `oauth_callback` or `oauth_verifier`.
    ///
    /// # Errors
    ///
    /// [`OAuthError::Encoding`] when the URL cannot be canonicalized.
    pub fn build(
        &self,
        url: &str,
        method: HttpMethod,
        user_params: &[(String, String)],
        extra_oauth: &[(String, String)],
    ) -> Result<SignedRequest, OAuthError> {
        self.build_with(url, method, user_params, extra_oauth, Freshness::generate())
    }

    /// Build and sign with a caller-supplied timestamp and nonce.
    pub fn build_with(
        &self,
        url: &str,
        method: HttpMethod,
        user_params: &[(String, String)],
        extra_oauth: &[(String, String)],
        freshness: Freshness,
    ) -> Result<SignedRequest, OAuthError> {
        let consumer = self.credentials.consumer();
        let token = self.credentials.signing_token();

        let mut oauth_params = vec![
            ("oauth_consumer_key".to_string(), consumer.key().to_string()),
            ("oauth_nonce".to_string(), freshness.nonce),
            (
                "oauth_signature_method".to_string(),
                SIGNATURE_METHOD.to_string(),
            ),
            (
                "oauth_timestamp".to_string(),
                freshness.timestamp.to_string(),
            ),
            ("oauth_version".to_string(), OAUTH_VERSION.to_string()),
        ];
        if let Some(token) = token {
            oauth_params.push(("oauth_token".to_string(), token.token().to_string()));
        }
        oauth_params.extend(extra_oauth.iter().cloned());

        let signed: Vec<(String, String)> = user_params
            .iter()
            .chain(oauth_params.iter())
            .cloned()
            .collect();
        let token_secret = token.map(|t| t.secret()).unwrap_or("");
        let signature = sign(method, url, &signed, consumer.secret(), token_secret)?;

        Ok(SignedRequest {
            method,
            url: url.to_string(),
            user_params: user_params.to_vec(),
            oauth_params,
            signature,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oauth::credentials::{ConsumerCredentials, TokenPair};

    const REQUEST_TOKEN_URL: &str = "https://api.example.com/oauth/request_token";
    const UPDATE_URL: &str = "https://api.twitter.com/1.1/statuses/update.json";

    fn consumer_only() -> Credentials {
        Credentials::new(ConsumerCredentials::new("CK", "xvz1evFS4wEEPTGEFPHBog"))
    }

    fn authorized() -> Credentials {
        Credentials::new(ConsumerCredentials::new(
            "xvz1evFS4wEEPTGEFPHBog",
            "kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw",
        ))
        .with_access_token(
            TokenPair::new(
                "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb",
                "LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE",
            )
            .expect("token pair"),
        )
    }

    fn status_params() -> Vec<(String, String)> {
        vec![
            (
                "status".to_string(),
                "Hello Ladies + Gentlemen, a signed OAuth request!".to_string(),
            ),
            ("include_entities".to_string(), "true".to_string()),
        ]
    }

    fn status_update() -> SignedRequest {
        RequestBuilder::new(&authorized())
            .build_with(
                UPDATE_URL,
                HttpMethod::Post,
                &status_params(),
                &[],
                Freshness::fixed(1318622958, "kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg"),
            )
            .expect("build")
    }

    #[test]
    fn nonce_is_alphanumeric_and_fresh() {
        let a = generate_nonce();
        let b = generate_nonce();
        assert_eq!(a.len(), NONCE_LEN);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
    }

    #[test]
    fn generated_freshness_uses_current_time() {
        let before = chrono::Utc::now().timestamp();
        let freshness = Freshness::generate();
        assert!(freshness.timestamp >= before);
        assert_eq!(freshness.nonce.len(), NONCE_LEN);
    }

    #[test]
    fn request_token_leg_signature() {
        let signed = RequestBuilder::new(&consumer_only())
            .build_with(
                REQUEST_TOKEN_URL,
                HttpMethod::Post,
                &[],
                &[],
                Freshness::fixed(1300000000, "abc123"),
            )
            .expect("build");

        assert_eq!(signed.signature(), "tUjCoPHTPnm2HLCvTBdCtffNsZo=");
        assert!(signed
            .oauth_parameters()
            .iter()
            .all(|(k, _)| k != "oauth_token"));
    }

    #[test]
    fn access_token_signs_and_is_sent() {
        let signed = status_update();
        assert_eq!(signed.signature(), "hCtSmYh+iHYCEqBWrE7C7hYmtUk=");
        assert!(signed.oauth_parameters().contains(&(
            "oauth_token".to_string(),
            "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb".to_string()
        )));
    }

    #[test]
    fn request_token_used_when_no_access_token() {
        let mut creds = consumer_only();
        creds.set_request_token(TokenPair::new("req", "req-secret").expect("pair"));

        let signed = RequestBuilder::new(&creds)
            .build_with(
                REQUEST_TOKEN_URL,
                HttpMethod::Post,
                &[],
                &[],
                Freshness::fixed(1, "n"),
            )
            .expect("build");

        let expected = sign(
            HttpMethod::Post,
            REQUEST_TOKEN_URL,
            &[
                ("oauth_consumer_key".into(), "CK".into()),
                ("oauth_nonce".into(), "n".into()),
                ("oauth_signature_method".into(), "HMAC-SHA1".into()),
                ("oauth_timestamp".into(), "1".into()),
                ("oauth_version".into(), "1.0".into()),
                ("oauth_token".into(), "req".into()),
            ],
            "xvz1evFS4wEEPTGEFPHBog",
            "req-secret",
        )
        .expect("sign");
        assert_eq!(signed.signature(), expected);
    }

    #[test]
    fn extra_oauth_parameters_are_signed_and_sent() {
        let signed = RequestBuilder::new(&consumer_only())
            .build_with(
                REQUEST_TOKEN_URL,
                HttpMethod::Post,
                &[],
                &[("oauth_callback".to_string(), "oob".to_string())],
                Freshness::fixed(1300000000, "abc123"),
            )
            .expect("build");

        assert_ne!(signed.signature(), "tUjCoPHTPnm2HLCvTBdCtffNsZo=");
        assert!(signed.normalized_parameters().contains("oauth_callback=oob"));
        assert!(signed
            .authorization_header()
            .contains("oauth_callback=\"oob\""));
    }

    #[test]
    fn parameters_are_in_canonical_order() {
        let signed = status_update();
        let keys: Vec<String> = signed.parameters().into_iter().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            vec![
                "include_entities",
                "oauth_consumer_key",
                "oauth_nonce",
                "oauth_signature_method",
                "oauth_timestamp",
                "oauth_token",
                "oauth_version",
                "status",
            ]
        );
    }

    #[test]
    fn header_rendering_for_post() {
        let request = status_update().to_header_request();

        assert_eq!(request.url, UPDATE_URL);
        assert_eq!(request.header(CONTENT_TYPE), Some(FORM_CONTENT_TYPE));
        assert_eq!(
            request.body.as_deref(),
            Some(
                "status=Hello%20Ladies%20%2B%20Gentlemen%2C%20a%20signed%20OAuth%20request%21\
                 &include_entities=true"
            )
        );

        let header = request.header(AUTHORIZATION).expect("authorization header");
        assert!(header.starts_with("OAuth "));
        assert!(header.contains("oauth_signature=\"hCtSmYh%2BiHYCEqBWrE7C7hYmtUk%3D\""));
        assert!(header.contains("oauth_consumer_key=\"xvz1evFS4wEEPTGEFPHBog\""));
        assert!(!header.contains("status"));
    }

    #[test]
    fn header_rendering_for_get_uses_query() {
        let signed = RequestBuilder::new(&authorized())
            .build(
                "https://api.example.com/timeline.json",
                HttpMethod::Get,
                &[("count".to_string(), "5".to_string())],
                &[],
            )
            .expect("build");
        let request = signed.to_header_request();

        assert_eq!(request.url, "https://api.example.com/timeline.json?count=5");
        assert!(request.body.is_none());
        assert!(request.header(AUTHORIZATION).is_some());
    }

    #[test]
    fn header_rendering_appends_to_existing_query() {
        let signed = RequestBuilder::new(&authorized())
            .build(
                "https://api.example.com/timeline.json?trim_user=1",
                HttpMethod::Get,
                &[("count".to_string(), "5".to_string())],
                &[],
            )
            .expect("build");

        assert_eq!(
            signed.to_header_request().url,
            "https://api.example.com/timeline.json?trim_user=1&count=5"
        );
    }

    #[test]
    fn header_rendering_puts_query_before_fragment() {
        let signed = RequestBuilder::new(&authorized())
            .build(
                "https://api.example.com/timeline.json#latest",
                HttpMethod::Get,
                &[("count".to_string(), "5".to_string())],
                &[],
            )
            .expect("build");

        assert_eq!(
            signed.to_header_request().url,
            "https://api.example.com/timeline.json?count=5#latest"
        );
    }

    #[test]
    fn query_rendering_carries_everything() {
        let signed = RequestBuilder::new(&consumer_only())
            .build_with(
                REQUEST_TOKEN_URL,
                HttpMethod::Post,
                &[],
                &[("oauth_callback".to_string(), "http://cb.example/done".to_string())],
                Freshness::fixed(1300000000, "abc123"),
            )
            .expect("build");
        let request = signed.to_query_request();

        assert!(request.url.starts_with(REQUEST_TOKEN_URL));
        assert!(request.url.contains("oauth_consumer_key=CK"));
        assert!(request.url.contains("oauth_nonce=abc123"));
        assert!(request
            .url
            .contains("oauth_callback=http%3A%2F%2Fcb.example%2Fdone"));
        assert!(request.url.contains(&format!(
            "oauth_signature={}",
            percent_encode(signed.signature())
        )));
        assert!(request.header(AUTHORIZATION).is_none());
        assert!(request.body.is_none());
    }

    #[test]
    fn invalid_url_fails_before_signing() {
        let err = RequestBuilder::new(&consumer_only())
            .build("not a url", HttpMethod::Get, &[], &[])
            .unwrap_err();
        assert!(matches!(err, OAuthError::Encoding(_)));
    }
}
