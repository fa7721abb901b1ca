use std::process;

use pixelveil::cli;

fn main()
{
    if let Err(err) = cli::run()
    {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}
