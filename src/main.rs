mod args;
mod chain;
mod config;
mod entry;
mod error;
mod http;
mod logger;
mod metrics;
mod server;
mod shutdown;

use error::AppResult;

fn main() -> AppResult<()> {
    entry::run()
}
