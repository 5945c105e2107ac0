use std::error::Error;
use std::io::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Url};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, trace, warn};

use crate::args::{FailurePolicy, HttpMethod};
use crate::error::{AppError, AppResult, HttpError};

use super::client::build_client;
use super::plan::StressPlan;
use super::report::{StressReport, TaskOutcome};

/// Per-request settings shared by every task of a run.
struct TaskTemplate {
    url: Url,
    method: HttpMethod,
    body: String,
    content_type: String,
    timeout: Option<Duration>,
    expect_status: Option<u16>,
    print_bodies: bool,
}

impl TaskTemplate {
    fn from_plan(plan: &StressPlan) -> Self {
        Self {
            url: plan.url.clone(),
            method: plan.method,
            body: plan.body.clone().unwrap_or_default(),
            content_type: plan.content_type.clone(),
            timeout: plan.timeout,
            expect_status: plan.expect_status,
            print_bodies: plan.print_bodies,
        }
    }

    fn request_error(&self, index: usize, source: reqwest::Error) -> HttpError {
        if source.is_timeout()
            && let Some(timeout) = self.timeout
        {
            return HttpError::TimedOut { index, timeout };
        }
        HttpError::TaskFailed {
            index,
            cause: error_chain(&source),
            source,
        }
    }
}

/// Fire `plan.count` requests at once and wait for them.
///
/// With [`FailurePolicy::FailFast`] the first failure is returned and the
/// requests still in flight are aborted. With [`FailurePolicy::Collect`]
/// every request runs to completion and failures are kept in the report.
///
/// # Errors
///
/// Returns an error when the client cannot be built, or on the first failed
/// request under `FailFast`.
pub async fn run_stress(plan: &StressPlan) -> AppResult<StressReport> {
    let client = build_client(plan)?;
    let template = Arc::new(TaskTemplate::from_plan(plan));
    let limiter = plan
        .max_in_flight
        .map(|limit| Arc::new(Semaphore::new(limit.get())));
    let mut report = StressReport::new(plan)?;

    info!(
        url = %plan.url,
        method = plan.method.as_str(),
        "{}: started",
        report.label
    );
    let started = Instant::now();

    let mut tasks = JoinSet::new();
    for index in 0..plan.count {
        tasks.spawn(execute_task(
            client.clone(),
            Arc::clone(&template),
            limiter.clone(),
            index,
        ));
    }

    while let Some(joined) = tasks.join_next().await {
        let result = match joined {
            Ok(result) => result,
            Err(source) => Err(HttpError::TaskAborted { source }),
        };
        match result {
            Ok(outcome) => report.record_success(outcome)?,
            Err(err) => match plan.failure_policy {
                FailurePolicy::FailFast => {
                    tasks.abort_all();
                    return Err(AppError::http(err));
                }
                FailurePolicy::Collect => {
                    warn!("{}", err);
                    report.record_failure(err);
                }
            },
        }
    }

    report.finish(started.elapsed());
    Ok(report)
}

async fn execute_task(
    client: Client,
    template: Arc<TaskTemplate>,
    limiter: Option<Arc<Semaphore>>,
    index: usize,
) -> Result<TaskOutcome, HttpError> {
    let _permit = match limiter {
        Some(limiter) => Some(
            limiter
                .acquire_owned()
                .await
                .map_err(|source| HttpError::LimiterClosed { index, source })?,
        ),
        None => None,
    };

    let started = Instant::now();
    let mut request = match template.method {
        HttpMethod::Get => client.get(template.url.clone()),
        HttpMethod::Post => client
            .post(template.url.clone())
            .header(CONTENT_TYPE, template.content_type.as_str())
            .body(template.body.clone()),
    };
    if let Some(timeout) = template.timeout {
        request = request.timeout(timeout);
    }

    let response = request
        .send()
        .await
        .map_err(|source| template.request_error(index, source))?;
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .map_err(|source| template.request_error(index, source))?;
    let latency = started.elapsed();

    if template.print_bodies {
        print_body(&mut std::io::stdout().lock(), index, &body)?;
    }
    if let Some(expected) = template.expect_status
        && status != expected
    {
        return Err(HttpError::UnexpectedStatus {
            index,
            status,
            expected,
        });
    }

    trace!(index, status, latency_ms = latency.as_millis(), "request completed");
    Ok(TaskOutcome {
        index,
        status,
        body,
        latency,
    })
}

/// One body per line. A closed stdout (e.g. piped into `head`) is an error
/// for this request rather than a panic.
pub(super) fn print_body<W: Write>(
    out: &mut W,
    index: usize,
    body: &str,
) -> Result<(), HttpError> {
    writeln!(out, "{}", body).map_err(|source| HttpError::PrintBody { index, source })
}

/// `err` followed by each nested source, joined with `: `.
fn error_chain(err: &dyn Error) -> String {
    let mut rendered = err.to_string();
    let mut current = err.source();
    while let Some(source) = current {
        let text = source.to_string();
        if !rendered.contains(&text) {
            rendered.push_str(": ");
            rendered.push_str(&text);
        }
        current = source.source();
    }
    rendered
}
