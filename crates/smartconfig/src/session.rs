//! Configuration session: command line, discovery, load, and watch.
//!
//! A [`Session`] carries everything the process needs to know about one
//! configuration load: program name and version, where to search for the
//! configuration file, and how to watch it. [`Session::run`] drives the
//! whole sequence and reports the result as an [`Outcome`];
//! [`Session::load_config`] is the process entry point that prints
//! terminal output and exits.
//!
//! # Sequence
//!
//! 1. Derive flags from the record's schema and register them together
//!    with the built-in flags (`--config/-c`, `--version`, `--help`,
//!    `--gen-yaml`, `--gen-json`).
//! 2. Parse the command line. A parse error or `--help` ends the run.
//! 3. Locate the configuration file (`--config PATH`, else `config.<ext>`
//!    in the search directory).
//! 4. Load: current record, annotation defaults, file, command line.
//! 5. `--version`, `--gen-yaml` and `--gen-json` end the run.
//! 6. If a file was located, start watching it.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Error;
use crate::file::FileUtils;
use crate::flags::FlagSet;
use crate::loader::Loader;
use crate::schema::Schema;
use crate::warning::Warning;
use crate::watch::{ConfigHandle, DEFAULT_DEBOUNCE, Reloader};

/// A type that can be loaded by a [`Session`].
///
/// Blanket-implemented; derive `Schema`, `Serialize` and `Deserialize` on
/// the record and it qualifies.
pub trait Record: Schema + Serialize + DeserializeOwned + Send + Sync + 'static {}

impl<T> Record for T where T: Schema + Serialize + DeserializeOwned + Send + Sync + 'static {}

/// A run that ended before a live configuration was handed out.
#[derive(Debug)]
#[non_exhaustive]
pub enum Terminal {
    /// `--help`: rendered help, for standard output.
    Help(String),

    /// `--version`: version text, for standard error.
    Version(String),

    /// `--gen-yaml`: the loaded record as YAML, for standard output.
    Yaml(String),

    /// `--gen-json`: the loaded record as JSON, for standard output.
    Json(String),

    /// The command line did not parse.
    ParseFailure(clap::Error),
}

impl Terminal {
    /// Write the output to the stream it belongs on.
    pub fn print(&self) {
        match self {
            Self::Help(text) | Self::Yaml(text) | Self::Json(text) => print!("{text}"),
            Self::Version(text) => eprint!("{text}"),
            Self::ParseFailure(err) => {
                let _ = err.print();
            }
        }
    }

    /// Print and exit the process with status 0.
    pub fn exit(&self) -> ! {
        self.print();
        std::process::exit(0)
    }
}

/// Result of [`Session::run`].
#[derive(Debug)]
pub enum Outcome<T> {
    /// A terminal branch was taken; nothing is being watched.
    Exit(Terminal),

    /// The configuration is loaded (and watched, if a file was found).
    Running(ConfigHandle<T>),
}

impl<T> Outcome<T> {
    /// The handle, if the run did not end in a terminal branch.
    #[must_use]
    pub fn running(self) -> Option<ConfigHandle<T>> {
        match self {
            Self::Running(handle) => Some(handle),
            Self::Exit(_) => None,
        }
    }

    /// The terminal branch, if one was taken.
    #[must_use]
    pub const fn terminal(&self) -> Option<&Terminal> {
        match self {
            Self::Exit(terminal) => Some(terminal),
            Self::Running(_) => None,
        }
    }
}

/// One configuration session.
///
/// ```rust,ignore
/// use smartconfig::Session;
///
/// let handle = Session::new("services", "1.0.0")
///     .version_detail("built from main")
///     .load_config(Config::default());
///
/// let port = handle.read(|c| c.one.port);
/// ```
#[derive(Clone, Debug)]
pub struct Session {
    name: String,
    version: String,
    version_detail: Option<String>,
    search_dir: PathBuf,
    debounce: Duration,
    strict_defaults: bool,
    args: Option<Vec<OsString>>,
}

impl Session {
    /// Create a session for program `name` at `version`.
    #[must_use]
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            version_detail: None,
            search_dir: PathBuf::from("."),
            debounce: DEFAULT_DEBOUNCE,
            strict_defaults: false,
            args: None,
        }
    }

    /// Extra text printed after the version number by `--version`.
    #[must_use]
    pub fn version_detail(mut self, detail: impl Into<String>) -> Self {
        self.version_detail = Some(detail.into());
        self
    }

    /// Directory searched for `config.<ext>` (default: `.`).
    #[must_use]
    pub fn search_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.search_dir = dir.into();
        self
    }

    /// Quiet period between the last file event and the reload.
    #[must_use]
    pub const fn debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Turn unparseable annotation defaults into [`Error::InvalidDefault`].
    #[must_use]
    pub const fn strict_defaults(mut self, strict: bool) -> Self {
        self.strict_defaults = strict;
        self
    }

    /// Parse these arguments instead of the process arguments.
    ///
    /// As with [`std::env::args`], the first item is the program name.
    #[must_use]
    pub fn args<I, A>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<OsString>,
    {
        self.args = Some(args.into_iter().map(Into::into).collect());
        self
    }

    /// The clap command for record type `T`, with its flag set.
    #[must_use]
    pub fn command<T: Schema>(&self) -> (Command, FlagSet) {
        let flags = FlagSet::from_schema::<T>();
        (self.build_command(&flags), flags)
    }

    /// Run the session for `record`.
    ///
    /// Warnings are logged and otherwise ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDefault`] in strict mode, [`Error::Serialize`]
    /// if `--gen-yaml`/`--gen-json` output fails, and [`Error::Watch`] if the
    /// watcher cannot be installed.
    pub fn run<T: Record>(&self, record: T) -> Result<Outcome<T>, Error> {
        self.run_with(FlagSet::from_schema::<T>(), record)
    }

    /// Run the session as the process entry point.
    ///
    /// Warnings are printed to standard error. Terminal branches print
    /// their output and exit with status 0; errors are reported and exit
    /// with status 1, except a failed `--gen-*` which exits with status 0.
    ///
    /// The returned handle owns the file watcher: keep it for as long as
    /// the process should follow changes to the configuration file.
    #[must_use = "dropping the handle stops watching the configuration file"]
    pub fn load_config<T: Record>(&self, record: T) -> ConfigHandle<T> {
        let flags = FlagSet::from_schema::<T>();
        for warning in flags.warnings() {
            eprintln!("{warning}");
        }

        match self.run_with(flags, record) {
            Ok(Outcome::Running(handle)) => handle,
            Ok(Outcome::Exit(terminal)) => terminal.exit(),
            Err(err @ Error::Serialize { .. }) => {
                eprintln!("error: {err}");
                std::process::exit(0)
            }
            Err(err) => {
                eprintln!("{:?}", miette::Report::new(err));
                std::process::exit(1)
            }
        }
    }

    fn run_with<T: Record>(&self, flags: FlagSet, record: T) -> Result<Outcome<T>, Error> {
        for warning in flags.warnings() {
            tracing::warn!(flag = warning.flag_name(), "{warning}");
        }

        if self.strict_defaults
            && let Some(Warning::InvalidDefault { name, value, kind }) = flags
                .warnings()
                .iter()
                .find(|w| matches!(w, Warning::InvalidDefault { .. }))
        {
            return Err(Error::InvalidDefault {
                name: name.clone(),
                value: value.clone(),
                kind: *kind,
            });
        }

        let mut command = self.build_command(&flags);
        let matches = match self.parse(&mut command) {
            Ok(matches) => matches,
            Err(err) => return Ok(Outcome::Exit(Terminal::ParseFailure(err))),
        };

        if matches.get_flag("help") {
            let mut help = command.render_help().to_string();
            if !help.ends_with('\n') {
                help.push('\n');
            }
            return Ok(Outcome::Exit(Terminal::Help(help)));
        }

        let explicit = matches.get_one::<PathBuf>("config").map(PathBuf::as_path);
        let (config_file, file_value) = match FileUtils::locate(explicit, &self.search_dir) {
            Some((path, value)) => (Some(path), Some(value)),
            None => (None, None),
        };

        let loader = Loader::new(flags.defaults(), flags.overrides(&matches), config_file);

        let loaded = match loader.load_with(&record, file_value) {
            Ok(loaded) => loaded,
            Err(err) => {
                tracing::warn!(error = %err, "unable to decode configuration, keeping supplied values");
                record
            }
        };

        if matches.get_flag("version") {
            return Ok(Outcome::Exit(Terminal::Version(self.version_text())));
        }

        if matches.get_flag("gen-yaml") {
            return Ok(Outcome::Exit(Terminal::Yaml(to_yaml(&loaded)?)));
        }

        if matches.get_flag("gen-json") {
            return Ok(Outcome::Exit(Terminal::Json(to_json(&loaded)?)));
        }

        let config_file = loader.config_file().map(Path::to_path_buf);
        let reloader = Arc::new(Reloader::new(loaded, move |current: &T| loader.load(current)));
        let handle = ConfigHandle::new(reloader.clone(), config_file.clone());

        match config_file {
            #[cfg(feature = "watch")]
            Some(path) => {
                let watcher = crate::watch::ConfigWatcher::start(reloader, &path, self.debounce)?;
                Ok(Outcome::Running(handle.with_watcher(watcher)))
            }
            #[cfg(not(feature = "watch"))]
            Some(path) => {
                tracing::debug!(path = %path.display(), "file watching disabled");
                Ok(Outcome::Running(handle))
            }
            None => {
                tracing::debug!("no configuration file found, not watching");
                Ok(Outcome::Running(handle))
            }
        }
    }

    fn parse(&self, command: &mut Command) -> Result<ArgMatches, clap::Error> {
        match &self.args {
            Some(args) => command.try_get_matches_from_mut(args.clone()),
            None => command.try_get_matches_from_mut(std::env::args_os()),
        }
    }

    fn version_text(&self) -> String {
        match &self.version_detail {
            Some(detail) => format!("{}\n{detail}\n", self.version),
            None => format!("{}\n", self.version),
        }
    }

    fn build_command(&self, flags: &FlagSet) -> Command {
        let command = Command::new(self.name.clone())
            .about(format!("{}(version {})", self.name, self.version))
            .disable_help_flag(true)
            .disable_version_flag(true)
            .arg(
                Arg::new("config")
                    .short('c')
                    .long("config")
                    .value_name("FILENAME")
                    .value_parser(value_parser!(PathBuf))
                    .help("config FILENAME, default to config.yaml or config.json"),
            )
            .arg(
                Arg::new("version")
                    .long("version")
                    .action(ArgAction::SetTrue)
                    .help("just print version number only"),
            )
            .arg(
                Arg::new("help")
                    .long("help")
                    .action(ArgAction::SetTrue)
                    .help("show this message"),
            )
            .arg(
                Arg::new("gen-yaml")
                    .long("gen-yaml")
                    .action(ArgAction::SetTrue)
                    .help("generate config.yaml"),
            )
            .arg(
                Arg::new("gen-json")
                    .long("gen-json")
                    .action(ArgAction::SetTrue)
                    .help("generate config.json"),
            );

        flags.register(command)
    }
}

/// Serialize `record` as YAML.
///
/// # Errors
///
/// Returns [`Error::Serialize`] if the record cannot be serialized.
#[cfg(feature = "yaml")]
pub fn to_yaml<T: Serialize>(record: &T) -> Result<String, Error> {
    serde_saphyr::to_string(record).map_err(|e| Error::serialize("YAML", e))
}

/// Serialize `record` as YAML.
///
/// # Errors
///
/// Always fails: YAML support is compiled out.
#[cfg(not(feature = "yaml"))]
pub fn to_yaml<T: Serialize>(_record: &T) -> Result<String, Error> {
    Err(Error::serialize("YAML", "the `yaml` feature is disabled"))
}

/// Serialize `record` as JSON with a four-space indent and a trailing
/// newline.
///
/// # Errors
///
/// Returns [`Error::Serialize`] if the record cannot be serialized.
pub fn to_json<T: Serialize>(record: &T) -> Result<String, Error> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);

    record
        .serialize(&mut serializer)
        .map_err(|e| Error::serialize("JSON", e))?;
    out.push(b'\n');

    String::from_utf8(out).map_err(|e| Error::serialize("JSON", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde::Deserialize;

    use crate::schema::{FieldShape, Shape};

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Server {
        ip: String,
        port: u16,
    }

    impl Schema for Server {
        fn shape() -> Shape {
            Shape::Record(vec![
                FieldShape::new("ip", "H|127.0.0.1|Listen {IP}", <String as Schema>::shape),
                FieldShape::new("port", "p|8080|Listen port", <u16 as Schema>::shape),
            ])
        }
    }

    fn session(args: &[&str]) -> Session {
        let dir = std::env::temp_dir().join("smartconfig-session-unit-empty");
        let _ = std::fs::create_dir_all(&dir);

        Session::new("server", "1.2.3")
            .search_dir(dir)
            .args(std::iter::once("server").chain(args.iter().copied()))
    }

    #[test]
    fn test_defaults_without_file() {
        let handle = session(&[]).run(Server::default()).unwrap().running().unwrap();

        assert_eq!(
            *handle.get(),
            Server {
                ip: "127.0.0.1".to_string(),
                port: 8080
            }
        );
        assert!(handle.config_file().is_none());
        assert!(!handle.is_watching());
    }

    #[test]
    fn test_flags_override_defaults() {
        let handle = session(&["-p", "9000", "--ip=::1"])
            .run(Server::default())
            .unwrap()
            .running()
            .unwrap();

        assert_eq!(handle.read(|s| s.port), 9000);
        assert_eq!(handle.read(|s| s.ip.clone()), "::1");
    }

    #[test]
    fn test_help_is_terminal() {
        let outcome = session(&["--help"]).run(Server::default()).unwrap();

        match outcome.terminal() {
            Some(Terminal::Help(text)) => {
                assert!(text.contains("--ip <IP>"));
                assert!(text.contains("--gen-yaml"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_version_with_detail() {
        let outcome = Session::new("server", "1.2.3")
            .version_detail("commit abc")
            .search_dir(std::env::temp_dir().join("smartconfig-session-unit-empty"))
            .args(["server", "--version"])
            .run(Server::default())
            .unwrap();

        match outcome.terminal() {
            Some(Terminal::Version(text)) => assert_eq!(text, "1.2.3\ncommit abc\n"),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_bad_flag_value_is_terminal() {
        let outcome = session(&["--port", "notanumber"])
            .run(Server::default())
            .unwrap();

        assert!(matches!(
            outcome.terminal(),
            Some(Terminal::ParseFailure(_))
        ));
    }

    #[test]
    fn test_gen_json_format() {
        let outcome = session(&["--gen-json", "-p", "81"])
            .run(Server::default())
            .unwrap();

        match outcome.terminal() {
            Some(Terminal::Json(text)) => assert_eq!(
                text,
                "{\n    \"ip\": \"127.0.0.1\",\n    \"port\": 81\n}\n"
            ),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_command_lists_builtin_and_derived_flags() {
        let (command, flags) = session(&[]).command::<Server>();
        let ids: Vec<_> = command.get_arguments().map(|a| a.get_id().to_string()).collect();

        assert_eq!(ids, ["config", "version", "help", "gen-yaml", "gen-json", "ip", "port"]);
        assert_eq!(flags.flags().len(), 2);
    }
}
