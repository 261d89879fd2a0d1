use analog_lib::AnalogError;
use analog_lib::cli::Cli;
use clap::Parser;

fn error_code(err: &anyhow::Error) -> &'static str {
    err.downcast_ref::<AnalogError>()
        .map(AnalogError::code)
        .unwrap_or("error")
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    analog_lib::init_tracing(cli.verbose);

    if let Err(err) = analog_lib::run(cli).await {
        eprintln!("ERROR: {} - {}", error_code(&err), err);
        std::process::exit(1);
    }
}
