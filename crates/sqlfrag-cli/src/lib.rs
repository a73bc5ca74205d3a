mod cli;
mod config;
mod escape;
mod render;

pub fn run(args: Vec<String>) -> anyhow::Result<()> {
    let cmd = cli::parse_args(&args)?;
    match cmd {
        cli::Command::Help(topic) => {
            cli::print_help(topic);
            Ok(())
        }
        cli::Command::Render(args) => {
            let sql = render::run(&args)?;
            println!("{sql}");
            Ok(())
        }
        cli::Command::Escape(args) => {
            println!("{}", escape::run(&args));
            Ok(())
        }
    }
}
