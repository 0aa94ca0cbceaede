use tailsift::commands::command_argument_builder;
use tailsift::handlers::handle_extract;
use tailsift_core::print_banner;

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let matches = cmd.get_matches();
    let quiet = matches.get_flag("quiet");

    // Show banner unless --quiet flag is set
    if !quiet {
        print_banner();
    }

    handle_extract(&matches).await;
}
