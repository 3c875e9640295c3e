//! Code to deal with executable parameters.

use pagination_basics::graph::{self, Config};
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use termcolor::{Color, ColorSpec, StandardStream, WriteColor};

pub use clap::Parser;

/// Sign in to Microsoft Graph and page through a response
#[derive(Debug, clap::Parser)]
#[clap(version, about)]
pub struct Params {
    /// Whether or not to output in color
    #[clap(long, default_value = "auto", value_name = "WHEN", global = true)]
    pub color: ColorChoice,

    /// Verbosity (may be repeated up to three times)
    #[clap(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Debug, clap::Subcommand)]
pub enum Command {
    /// Start the web server
    Serve(ServeParams),
    /// Print the version
    Version,
}

/// Parameters for the `serve` subcommand
#[derive(Debug, clap::Args)]
pub struct ServeParams {
    /// Address to bind to
    #[arg(long, default_value = "localhost:5000")]
    pub bind: String,

    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Application (client) ID
    #[arg(long, env = "GRAPH_CLIENT_ID")]
    pub client_id: Option<String>,

    /// Client secret
    #[arg(long, env = "GRAPH_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// Redirect URI registered with the identity provider
    #[arg(long, env = "GRAPH_REDIRECT_URI")]
    pub redirect_uri: Option<String>,

    /// Scope to request (may be repeated; replaces the configured scopes)
    #[arg(long = "scope", value_name = "SCOPE")]
    pub scopes: Vec<String>,

    /// Directory to serve under `/static`
    #[arg(long, default_value = "static")]
    pub static_dir: PathBuf,
}

impl ServeParams {
    /// Build the session configuration.
    ///
    /// Starts from the configuration file, if any, then applies flags and
    /// environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can’t be loaded or a required value is
    /// missing.
    pub fn graph_config(&self) -> graph::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };

        if let Some(client_id) = &self.client_id {
            config.client_id.clone_from(client_id);
        }
        if let Some(client_secret) = &self.client_secret {
            config.client_secret.clone_from(client_secret);
        }
        if let Some(redirect_uri) = &self.redirect_uri {
            config.redirect_uri.clone_from(redirect_uri);
        }
        if !self.scopes.is_empty() {
            config.scopes.clone_from(&self.scopes);
        }

        config.validate()?;
        Ok(config)
    }
}

impl Params {
    /// Print a warning message in error color to `err_stream()`.
    pub fn warn<S: AsRef<str>>(&self, message: S) -> io::Result<()> {
        let mut err_out = self.err_stream();
        err_out.set_color(&error_color())?;
        err_out.write_all(message.as_ref().as_bytes())?;
        err_out.reset()?;

        Ok(())
    }

    /// Get stream to use for errors.
    pub fn err_stream(&self) -> StandardStream {
        StandardStream::stderr(self.color_choice(&io::stderr()))
    }

    /// Whether or not to output on a stream in color.
    ///
    /// Checks if passed stream is a terminal.
    pub fn color_choice<T: IsTerminal>(
        &self,
        stream: &T,
    ) -> termcolor::ColorChoice {
        if self.color == ColorChoice::Auto && !stream.is_terminal() {
            termcolor::ColorChoice::Never
        } else {
            self.color.into()
        }
    }
}

/// Whether or not to output in color
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, clap::ValueEnum)]
pub enum ColorChoice {
    /// Output in color when running in a terminal that supports it
    #[default]
    Auto,

    /// Always output in color
    Always,

    /// Never output in color
    Never,
}

impl From<ColorChoice> for termcolor::ColorChoice {
    fn from(choice: ColorChoice) -> Self {
        match choice {
            ColorChoice::Auto => Self::Auto,
            ColorChoice::Always => Self::Always,
            ColorChoice::Never => Self::Never,
        }
    }
}

/// Returns color used to output errors.
pub fn error_color() -> ColorSpec {
    let mut color = ColorSpec::new();
    color.set_fg(Some(Color::Red));
    color.set_intense(true);
    color
}
