use reqwest::Client;
use tracing::debug;

use crate::args::DEFAULT_USER_AGENT;
use crate::error::HttpError;

use super::plan::StressPlan;

/// Build the shared client for a run. No client-wide timeout is set;
/// `plan.timeout` is applied per request.
///
/// # Errors
///
/// Returns an error when the TLS backend cannot be initialised.
pub fn build_client(plan: &StressPlan) -> Result<Client, HttpError> {
    debug!(
        max_in_flight = plan.max_in_flight.map(|limit| limit.get()),
        "building HTTP client"
    );
    Client::builder()
        .user_agent(DEFAULT_USER_AGENT)
        .build()
        .map_err(|source| HttpError::BuildClientFailed { source })
}
