use crate::CLAP_STYLING;
use clap::arg;
use tailsift_core::extract::{DEFAULT_OUTPUT, DEFAULT_RUNTIME};

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("tailsift")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("tailsift")
        .styles(CLAP_STYLING)
        .about(
            "Harvest reusable Tailwind-styled components from a PHP/HTML project into a \
            categorized, de-duplicated catalog.",
        )
        .arg(
            arg!(<PROJECT_DIR>)
                .required(true)
                .help("Root directory of the project to scan")
                .value_parser(clap::value_parser!(String)),
        )
        .arg(
            arg!(-o --"output" <PATH>)
                .required(false)
                .help("Where to write the component catalog")
                .default_value(DEFAULT_OUTPUT),
        )
        .arg(
            arg!(-f --"format" <FORMAT>)
                .required(false)
                .help("Report format: text, json")
                .value_parser(["text", "json"])
                .default_value("text"),
        )
        .arg(
            arg!(-e --"execute-php")
                .required(false)
                .help("Also execute PHP pages and scan their rendered output")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            arg!(-p --"php-path" <PATH>)
                .required(false)
                .help("PHP executable used with --execute-php")
                .default_value(DEFAULT_RUNTIME),
        )
        .arg(
            arg!(-t --"threads" <NUM_WORKERS>)
                .required(false)
                .help("The number of files processed in parallel.")
                .value_parser(clap::value_parser!(usize))
                .default_value("4"),
        )
        .arg(arg!(-q --"quiet" "Suppress banner and per-file output").required(false))
}
