use clap::Parser;
use floating_ball::gui::HostModel;
use floating_ball::loader::registry::Registry;
use floating_ball::{config, runtime, suppression};
use relm4::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "floating-ball", version, about, long_about = None)]
struct Cli {
    /// Launch query, e.g. "floating-ball=0" to suppress the widget
    #[arg(short, long)]
    query: Option<String>,

    /// Write a starter configuration file and exit
    #[arg(long)]
    write_config: bool,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if cli.write_config {
        match config::write_default_config() {
            Ok(path) => println!("{}", path.display()),
            Err(e) => log::error!("failed to write configuration: {}", e),
        }
        return;
    }

    if let Some(query) = cli.query {
        suppression::set_launch_query(query);
    }

    // stages assets and waits for the core entry point in the background
    runtime::start_background_services();

    let app = RelmApp::new("org.floatingball.FloatingBall");
    app.run::<HostModel>(Registry::global());
}
