mod cli;
mod logging;
mod profiles;
mod stream;

fn main() -> anyhow::Result<()> {
    logging::init();
    cli::run()
}
