use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "uecrash")]
#[command(version)]
#[command(about = "Extract files from uecrash crash report containers", long_about = None)]
#[command(after_help = "Examples:\n  \
  uecrash UECC-Windows.uecrash -d crash   extract all files into ./crash\n  \
  uecrash -v UECC-Windows.uecrash         show header and entry table\n\n\
Exit status: 0 all entries extracted, 1 some entries failed, 2 archive aborted")]
pub struct Cli {
    /// uecrash archive path
    #[arg(value_name = "FILE")]
    pub file: String,

    /// List files (short format)
    #[arg(short = 'l')]
    pub list: bool,

    /// List verbosely, including header fields
    #[arg(short = 'v')]
    pub verbose: bool,

    /// Extract files into exdir
    #[arg(short = 'd', value_name = "DIR")]
    pub extract_dir: Option<String>,

    /// Quiet mode (-qq => quieter)
    #[arg(short = 'q', action = clap::ArgAction::Count)]
    pub quiet: u8,
}

impl Cli {
    pub fn is_listing(&self) -> bool {
        self.list || self.verbose
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet > 0
    }

    pub fn is_very_quiet(&self) -> bool {
        self.quiet > 1
    }

    /// Log level implied by the quiet flags.
    pub fn log_level(&self) -> log::LevelFilter {
        match self.quiet {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Error,
            _ => log::LevelFilter::Off,
        }
    }
}
