//! # mdgen CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use mdgen_cli::generate::{run_generate, GenerateArgs};
use mdgen_cli::types::{run_types, TypesArgs};
use mdgen_cli::verify::{run_verify, VerifyArgs};

/// Model decoder generator.
///
/// Emits presence, reset, and validation methods for every record type
/// reachable from a schema's roots.
#[derive(Parser, Debug)]
#[command(name = "mdgen", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    /// Ignored when RUST_LOG is set.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate code from a schema manifest.
    Generate(GenerateArgs),

    /// Check that a generated file matches what the schema produces.
    Verify(VerifyArgs),

    /// List the record types reachable from the roots.
    Types(TypesArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let result = match cli.command {
        Commands::Generate(args) => run_generate(&args),
        Commands::Verify(args) => run_verify(&args),
        Commands::Types(args) => run_types(&args),
    };

    ExitCode::from(exit_status(result))
}

/// Map a handler result to the process exit status, logging a failure once.
fn exit_status(result: anyhow::Result<u8>) -> u8 {
    match result {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e:#}");
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_with_overrides() {
        let cli = Cli::try_parse_from([
            "mdgen", "generate", "--schema", "schema.yaml", "--root", "A", "--root", "B", "--package", "v2",
            "--out", "gen.go",
        ])
        .unwrap();
        let Commands::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(args.schema.roots, vec!["A", "B"]);
        assert_eq!(args.schema.package.as_deref(), Some("v2"));
        assert_eq!(args.out.as_deref(), Some(std::path::Path::new("gen.go")));
    }

    #[test]
    fn verify_requires_out() {
        assert!(Cli::try_parse_from(["mdgen", "verify", "--schema", "schema.yaml"]).is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["mdgen", "types", "--schema", "s.yaml", "-vv", "--json", "--log-json"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(cli.log_json);
        assert!(matches!(cli.command, Commands::Types(ref args) if args.json));
    }

    #[test]
    fn failure_is_reported_once() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        use tracing_subscriber::layer::{Context, SubscriberExt};
        use tracing_subscriber::Layer;

        struct CountErrors(Arc<AtomicUsize>);

        impl<S: tracing::Subscriber> Layer<S> for CountErrors {
            fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
                if *event.metadata().level() == tracing::Level::ERROR {
                    self.0.fetch_add(1, Ordering::SeqCst);
                }
            }
        }

        let errors = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(CountErrors(Arc::clone(&errors)));
        tracing::subscriber::with_default(subscriber, || {
            assert_eq!(exit_status(Ok(0)), 0);
            assert_eq!(exit_status(Ok(1)), 1);
            assert_eq!(exit_status(Err(anyhow::anyhow!("schema not found"))), 1);
        });
        assert_eq!(errors.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn command_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
