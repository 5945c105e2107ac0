use std::time::Duration;

use reqwest::Url;

use crate::args::{
    DEFAULT_CONTENT_TYPE, DEFAULT_TARGET_URL, ECHO_BODY, ECHO_TARGET_URL, FailurePolicy,
    HttpMethod, PositiveUsize, StressArgs,
};
use crate::error::{AppError, AppResult, HttpError, ValidationError};

/// Everything a stress run needs, validated.
#[derive(Debug, Clone)]
pub struct StressPlan {
    pub url: Url,
    pub method: HttpMethod,
    pub body: Option<String>,
    pub content_type: String,
    pub count: usize,
    pub max_in_flight: Option<PositiveUsize>,
    pub timeout: Option<Duration>,
    pub expect_status: Option<u16>,
    pub failure_policy: FailurePolicy,
    pub print_bodies: bool,
}

impl StressPlan {
    /// `count` plain GETs against `url`.
    ///
    /// # Errors
    ///
    /// Returns an error when `url` is not an absolute http(s) URL.
    pub fn get(url: &str, count: usize) -> AppResult<Self> {
        Ok(Self {
            url: parse_target_url(url)?,
            method: HttpMethod::Get,
            body: None,
            content_type: DEFAULT_CONTENT_TYPE.to_owned(),
            count,
            max_in_flight: None,
            timeout: None,
            expect_status: None,
            failure_policy: FailurePolicy::FailFast,
            print_bodies: true,
        })
    }

    /// `count` POSTs of `body` as `text/plain` against `url`.
    ///
    /// # Errors
    ///
    /// Returns an error when `url` is not an absolute http(s) URL.
    pub fn post(url: &str, body: &str, count: usize) -> AppResult<Self> {
        let mut plan = Self::get(url, count)?;
        plan.method = HttpMethod::Post;
        plan.body = Some(body.to_owned());
        Ok(plan)
    }

    /// Resolve CLI (and config-applied) arguments into a plan.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid URL, a body on a GET request, or echo
    /// mode combined with an explicit body or method.
    pub fn from_args(args: &StressArgs) -> AppResult<Self> {
        let mut plan = if args.echo {
            if args.data.is_some() || args.method == HttpMethod::Post {
                return Err(AppError::validation(ValidationError::EchoConflict));
            }
            let url = args.url.as_deref().unwrap_or(ECHO_TARGET_URL);
            Self::post(url, ECHO_BODY, args.count)?
        } else {
            let url = args.url.as_deref().unwrap_or(DEFAULT_TARGET_URL);
            match (args.method, args.data.as_deref()) {
                (HttpMethod::Get, Some(_)) => {
                    return Err(AppError::validation(ValidationError::BodyRequiresPost));
                }
                (HttpMethod::Get, None) => Self::get(url, args.count)?,
                (HttpMethod::Post, body) => Self::post(url, body.unwrap_or_default(), args.count)?,
            }
        };
        plan.content_type.clone_from(&args.content_type);
        plan.max_in_flight = args.max_in_flight;
        plan.timeout = args.timeout;
        plan.expect_status = args.expect_status;
        plan.failure_policy = args.failure_policy;
        plan.print_bodies = !args.quiet;
        Ok(plan)
    }

    /// Label used on the timing line, e.g. `100 requests`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} requests", self.count)
    }
}

/// Parse and check an absolute http(s) URL.
///
/// # Errors
///
/// Returns an error for unparsable URLs or non-http schemes.
pub fn parse_target_url(raw: &str) -> Result<Url, HttpError> {
    let url = Url::parse(raw.trim()).map_err(|source| HttpError::InvalidUrl {
        url: raw.to_owned(),
        source,
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(HttpError::UnsupportedScheme {
            scheme: other.to_owned(),
        }),
    }
}
