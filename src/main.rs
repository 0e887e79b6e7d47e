use colored::Colorize;
use std::process::ExitCode;
use wg_config_gen::cli::{parse_args, Parsed};
use wg_config_gen::logging::{init_logging, level_for};
use wg_config_gen::output::RenderMeta;
use wg_config_gen::tools::{HttpLookup, IpRouteProbe, SystemRunner, WgKeyTool};
use wg_config_gen::run;

#[tokio::main]
async fn main() -> ExitCode {
    // Do as little as possible in main.rs as it can't contain any tests
    dotenv::dotenv().ok();

    let opts = match parse_args(std::env::args_os()) {
        Ok(Parsed::Run(opts)) => opts,
        Ok(Parsed::Help(help)) => {
            println!("{help}");
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(e.exit_code() as u8);
        }
    };

    if let Err(e) = init_logging(level_for(opts.verbose, opts.development)) {
        eprintln!("Error initializing log4rs: {e}");
    }
    log::info!("#Start main()");

    let runner = SystemRunner::default();
    let probe = IpRouteProbe::new(&runner);
    let lookup = HttpLookup::from_env();
    let keys = WgKeyTool::new(&runner);

    match run(&opts, &runner, &probe, &lookup, &keys, &RenderMeta::now()).await {
        Ok(report) => {
            for archive in &report.archives {
                println!("{} {}", "created".green(), opts.outdir.join(archive).display());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{e}");
            eprintln!("{} {e}", "ERROR".on_red());
            ExitCode::from(e.exit_code() as u8)
        }
    }
}
