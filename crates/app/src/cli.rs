use clap::{Parser, ValueEnum};

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[arg(long, default_value = "serve")]
    pub mode: Mode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Apply pending migrations (when backed by Postgres) and serve HTTP.
    Serve,
    /// Apply pending migrations and exit.
    Migrate,
}

impl Mode {
    pub fn run_server(self) -> bool {
        matches!(self, Mode::Serve)
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{Cli, Mode};

    #[test]
    fn defaults_to_serve() {
        let cli = Cli::parse_from(["remark"]);
        assert_eq!(cli.mode, Mode::Serve);
        assert!(cli.mode.run_server());
    }

    #[test]
    fn parses_migrate_mode() {
        let cli = Cli::parse_from(["remark", "--mode", "migrate"]);
        assert_eq!(cli.mode, Mode::Migrate);
        assert!(!cli.mode.run_server());
    }
}
