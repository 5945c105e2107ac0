use clap::{ArgMatches, CommandFactory, FromArgMatches};
use tracing::{error, info};

use crate::args::{ChainArgs, CliArgs, Command, ServeArgs, StressArgs};
use crate::chain::{CountingRequest, counting_chain};
use crate::config::{apply_config, load_config};
use crate::error::AppResult;
use crate::http::{StressPlan, run_stress};
use crate::server::{Router, Server, parse_listen_addr};
use crate::shutdown::{setup_signal_shutdown_handler, shutdown_channel};

pub(crate) fn run() -> AppResult<()> {
    let matches = CliArgs::command().get_matches();
    let mut args = CliArgs::from_arg_matches(&matches)?;

    crate::logger::init_logging(args.verbose, args.no_color);

    let result = apply_config_file(&mut args, &matches).and_then(|()| execute(args.command));
    if let Err(err) = &result {
        error!("{}", err);
    }
    result
}

fn apply_config_file(args: &mut CliArgs, matches: &ArgMatches) -> AppResult<()> {
    if let Some(config) = load_config(args.config.as_deref())? {
        apply_config(args, matches, &config)?;
    }
    Ok(())
}

fn execute(command: Command) -> AppResult<()> {
    match command {
        Command::Chain(chain) => run_chain(&chain),
        Command::Stress(stress) => block_on_runtime(run_stress_command(&stress)),
        Command::Serve(serve) => block_on_runtime(run_serve(&serve)),
    }
}

fn block_on_runtime<F>(future: F) -> AppResult<()>
where
    F: Future<Output = AppResult<()>>,
{
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(future)
}

fn run_chain(args: &ChainArgs) -> AppResult<()> {
    let chain = counting_chain(args.handlers, args.stop_at)?;
    let request = chain.handle(CountingRequest::default())?;
    info!(handlers = chain.len(), count = request.count, "Chain finished");
    println!("{}", serde_json::to_string(&request)?);
    Ok(())
}

async fn run_stress_command(args: &StressArgs) -> AppResult<()> {
    let plan = StressPlan::from_args(args)?;
    let report = run_stress(&plan).await?;

    println!("{}", report.timing_line());
    let (p50, p90, p99) = report.latency_percentiles();
    info!(
        succeeded = report.succeeded(),
        failed = report.failures.len(),
        "Latency p50={}ms p90={}ms p99={}ms",
        p50,
        p90,
        p99
    );

    report.into_result()?;
    Ok(())
}

async fn run_serve(args: &ServeArgs) -> AppResult<()> {
    let addr = parse_listen_addr(&args.listen)?;
    let server = Server::bind(addr, Router::default_routes()).await?;

    let (shutdown_tx, shutdown_rx) = shutdown_channel();
    let signal_handle = setup_signal_shutdown_handler(&shutdown_tx);

    server.run(shutdown_rx).await;
    signal_handle.abort();
    Ok(())
}
