use std::path::PathBuf;

use clap::Parser;
use clap::ValueEnum;

use livecheck_core::config;
use livecheck_core::tracing_ext::init_tracing;

mod serve;

#[derive(Parser)]
#[command(author, about, version)]
struct Opt {
    /// Path to a configuration file in a YAML format.
    ///
    /// The LIVECHECK_CONFIG environment variable is used if this option is
    /// not specified.  Its value has to be an absolute path.
    #[arg(short, long, env = "LIVECHECK_CONFIG")]
    config: PathBuf,

    /// Logging format.
    #[arg(long, env = "LIVECHECK_LOG_FORMAT", value_enum, default_value = "text")]
    log_format: LogFormat,
}

#[derive(Clone, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() {
    let opt = Opt::parse();

    init_tracing(match opt.log_format {
        LogFormat::Text => "text",
        LogFormat::Json => "json",
    });

    let config = config::load(&opt.config);

    serve::main(config).await;
}
