use clap::{Arg, Command};

pub fn build_cli() -> Command {
    Command::new("fdc-monitor")
        .version(crate::VERSION)
        .about("Field bus register monitor: TCP polling client and register server")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Path to a TOML configuration file"),
        )
        .subcommand(
            Command::new("poll")
                .about("Poll a register server and print decoded values")
                .arg(
                    Arg::new("host")
                        .short('H')
                        .long("host")
                        .value_name("HOST")
                        .help("Server host to connect to"),
                )
                .arg(
                    Arg::new("port")
                        .short('p')
                        .long("port")
                        .value_name("PORT")
                        .help("Server TCP port"),
                )
                .arg(
                    Arg::new("interval")
                        .short('i')
                        .long("interval")
                        .value_name("MS")
                        .help("Poll interval in milliseconds"),
                )
                .arg(
                    Arg::new("addresses")
                        .short('a')
                        .long("addresses")
                        .value_name("LIST")
                        .help("Comma separated 1-based register addresses to poll"),
                )
                .arg(
                    Arg::new("format")
                        .short('f')
                        .long("format")
                        .value_name("FORMAT")
                        .help("Output format: console, json or csv"),
                )
                .arg(
                    Arg::new("output-file")
                        .short('o')
                        .long("output-file")
                        .value_name("FILE")
                        .help("Append formatted samples to this file instead of stdout"),
                ),
        )
        .subcommand(
            Command::new("serve")
                .about("Run the register server")
                .arg(
                    Arg::new("bind")
                        .short('b')
                        .long("bind")
                        .value_name("ADDR")
                        .help("Address to bind"),
                )
                .arg(
                    Arg::new("port")
                        .short('p')
                        .long("port")
                        .value_name("PORT")
                        .help("TCP port to listen on"),
                )
                .arg(
                    Arg::new("rows")
                        .short('r')
                        .long("rows")
                        .value_name("COUNT")
                        .help("Number of register rows in the table"),
                ),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_arguments_parse() {
        let matches = build_cli()
            .try_get_matches_from([
                "fdc-monitor",
                "poll",
                "--host",
                "10.0.0.2",
                "--port",
                "1502",
                "--addresses",
                "11107,11201",
                "--format",
                "json",
            ])
            .expect("parses");
        let (name, sub) = matches.subcommand().expect("subcommand");
        assert_eq!(name, "poll");
        assert_eq!(sub.get_one::<String>("host").unwrap(), "10.0.0.2");
        assert_eq!(sub.get_one::<String>("addresses").unwrap(), "11107,11201");
    }

    #[test]
    fn test_serve_arguments_parse() {
        let matches = build_cli()
            .try_get_matches_from(["fdc-monitor", "serve", "-b", "127.0.0.1", "-p", "1502"])
            .expect("parses");
        let (name, sub) = matches.subcommand().expect("subcommand");
        assert_eq!(name, "serve");
        assert_eq!(sub.get_one::<String>("bind").unwrap(), "127.0.0.1");
    }
}
