use rgetenv::cli::Options;
use rgetenv::log;
use structopt::StructOpt;

fn main() {
    let opts = Options::from_args();
    if opts.verbose {
        log::set_verbose();
    }

    let (pid, name) = match opts.validate() {
        Ok(v) => v,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    match rgetenv::read_remote_env(pid, &name) {
        Ok(Some(value)) => {
            println!("{}", value);
            std::process::exit(0);
        }
        Ok(None) => {
            std::process::exit(0);
        }
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}
