//! Keel entrypoint.
//!
//! Loads a document, replays a key script through the editing core and saves
//! the result. The core never touches the file system; this binary is the
//! external collaborator that owns file I/O and the `:w` / `:q` family of
//! commands the core hands back.
use anyhow::{Context, Result};
use clap::Parser;
use core_actions::Editor;
use core_config::{Config, load_from};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing::{debug, error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "keel", version, about = "Keel modal editing engine")]
struct Args {
    /// File to edit. A missing file starts empty and is created on `:w`.
    pub path: Option<PathBuf>,
    /// Keys to replay, in vi notation (`dw`, `ihi<Esc>`, `:wq<CR>`).
    #[arg(long = "keys", conflicts_with = "keys_file")]
    pub keys: Option<String>,
    /// Read the key script from a file.
    #[arg(long = "keys-file")]
    pub keys_file: Option<PathBuf>,
    /// Write the final document here instead of printing it to stdout.
    #[arg(long = "output")]
    pub output: Option<PathBuf>,
    /// Optional configuration file path (overrides discovery of `keel.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
}

struct AppStartup {
    log_guard: Option<WorkerGuard>,
}

impl AppStartup {
    fn new() -> Self {
        Self { log_guard: None }
    }

    fn run(&mut self, args: &Args) -> Result<Session> {
        let config = load_from(args.config.clone())?;
        self.configure_logging(config.log_filter())?;
        Self::install_panic_hook();

        info!(target: "runtime", "startup");
        let mut session = Session::open(args.path.clone(), &config)?;
        session.fallback = args.output.clone();
        let status = session.editor.status();
        info!(
            target: "runtime.startup",
            path = session.path.as_ref().map(|p| p.display().to_string()).as_deref(),
            config = config.path.as_ref().map(|p| p.display().to_string()).as_deref(),
            lines = status.line_count,
            undo_depth = config.editor().undo_depth,
            shift_width = config.editor().shift_width,
            "bootstrap_complete"
        );
        Ok(session)
    }

    fn configure_logging(&mut self, default_filter: &str) -> Result<()> {
        let log_dir = Path::new(".");
        let log_path = log_dir.join("keel.log");
        if log_path.exists() {
            let _ = std::fs::remove_file(&log_path);
        }

        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));
        let file_appender = tracing_appender::rolling::never(log_dir, "keel.log");
        let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
        match tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(nb_writer)
            .with_ansi(false)
            .try_init()
        {
            Ok(_) => {
                self.log_guard = Some(guard);
            }
            Err(_err) => {
                // Global tracing subscriber already installed; drop guard so writer shuts down.
            }
        }

        Ok(())
    }

    fn install_panic_hook() {
        static HOOK: Once = Once::new();
        HOOK.call_once(|| {
            let default_panic = std::panic::take_hook();
            std::panic::set_hook(Box::new(move |info| {
                tracing::error!(target: "runtime.panic", ?info, "panic");
                default_panic(info);
            }));
        });
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// How a replay ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ReplayOutcome {
    quit: bool,
    keys_consumed: usize,
}

/// One open document plus the file it came from.
struct Session {
    editor: Editor,
    path: Option<PathBuf>,
    /// `:w` target when the session has no path (`--output`).
    fallback: Option<PathBuf>,
    writes: usize,
}

impl Session {
    fn open(path: Option<PathBuf>, config: &Config) -> Result<Self> {
        let mut editor = Editor::with_config(config);
        if let Some(path) = path.as_ref() {
            match std::fs::read_to_string(path) {
                Ok(content) => {
                    debug!(target: "io", file = %path.display(), size_bytes = content.len(), "file_read_ok");
                    editor.load_text(&content);
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    info!(target: "io", file = %path.display(), "file_not_found_starting_empty");
                }
                Err(e) => {
                    return Err(e).with_context(|| format!("reading {}", path.display()));
                }
            }
        }
        Ok(Self {
            editor,
            path,
            fallback: None,
            writes: 0,
        })
    }

    /// Feed `keys` to the editor, running the commands it hands back. Stops at
    /// the first command that quits.
    fn replay(&mut self, keys: &[char]) -> Result<ReplayOutcome> {
        for (idx, &key) in keys.iter().enumerate() {
            let result = self.editor.handle_key(key);
            let Some(cmd) = result.command else {
                continue;
            };
            if self.execute(&cmd)? == Flow::Quit {
                let remaining = keys.len() - idx - 1;
                if remaining > 0 {
                    debug!(target: "runtime", remaining, "keys_ignored_after_quit");
                }
                return Ok(ReplayOutcome {
                    quit: true,
                    keys_consumed: idx + 1,
                });
            }
        }
        Ok(ReplayOutcome {
            quit: false,
            keys_consumed: keys.len(),
        })
    }

    fn execute(&mut self, cmd: &str) -> Result<Flow> {
        let (name, arg) = match cmd.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, Some(arg.trim()).filter(|a| !a.is_empty())),
            None => (cmd, None),
        };
        debug!(target: "runtime", command = name, has_arg = arg.is_some(), "command");
        match name {
            "w" => {
                self.write(arg.map(Path::new))?;
                Ok(Flow::Continue)
            }
            "wq" | "x" => {
                if name == "wq" || self.editor.state().dirty {
                    self.write(arg.map(Path::new))?;
                }
                Ok(if self.editor.state().dirty {
                    Flow::Continue
                } else {
                    Flow::Quit
                })
            }
            "q" => {
                if self.editor.state().dirty {
                    self.editor
                        .state_mut()
                        .set_message("no write since last change (add ! to override)");
                    warn!(target: "runtime", "quit_refused_dirty");
                    Ok(Flow::Continue)
                } else {
                    Ok(Flow::Quit)
                }
            }
            "q!" => Ok(Flow::Quit),
            other => {
                self.editor
                    .state_mut()
                    .set_message(format!("not an editor command: {other}"));
                warn!(target: "runtime", command = other, "command_unsupported");
                Ok(Flow::Continue)
            }
        }
    }

    /// Save to `target`, the session path or the fallback, in that order.
    /// Without any of them the failure is reported on the status line.
    fn write(&mut self, target: Option<&Path>) -> Result<()> {
        let Some(path) = target
            .or(self.path.as_deref())
            .or(self.fallback.as_deref())
            .map(Path::to_path_buf)
        else {
            self.editor.state_mut().set_message("no file name");
            warn!(target: "io", "write_without_file_name");
            return Ok(());
        };
        let text = self.editor.state().text_for_save();
        std::fs::write(&path, &text).with_context(|| format!("writing {}", path.display()))?;
        self.editor.state_mut().mark_saved();
        if self.path.is_none() && target.is_some() {
            self.path = Some(path.clone());
        }
        self.writes += 1;
        info!(target: "io", file = %path.display(), size_bytes = text.len(), "file_write_ok");
        Ok(())
    }
}

fn read_key_script(args: &Args) -> Result<Vec<char>> {
    let script = match (&args.keys, &args.keys_file) {
        (Some(keys), _) => keys.clone(),
        (None, Some(file)) => {
            let raw = std::fs::read_to_string(file)
                .with_context(|| format!("reading key script {}", file.display()))?;
            raw.trim_end_matches(['\r', '\n']).to_string()
        }
        (None, None) => String::new(),
    };
    core_events::parse_keys(&script).context("parsing key script")
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut startup = AppStartup::new();
    let mut session = startup.run(&args)?;
    let keys = read_key_script(&args)?;

    let outcome = session.replay(&keys)?;
    let status = session.editor.status();
    info!(
        target: "runtime",
        quit = outcome.quit,
        keys = outcome.keys_consumed,
        writes = session.writes,
        mode = status.mode.label(),
        line = status.line,
        column = status.column,
        dirty = status.dirty,
        status_message = status.message.as_deref(),
        "replay_complete"
    );

    if let Some(output) = args.output.as_ref() {
        let text = session.editor.state().text_for_save();
        std::fs::write(output, text).with_context(|| format!("writing {}", output.display()))?;
    } else if !outcome.quit || session.writes == 0 {
        let mut stdout = io::stdout().lock();
        if let Err(e) = stdout.write_all(session.editor.state().text_for_save().as_bytes()) {
            error!(target: "io", ?e, "stdout_write_error");
            return Err(e).context("writing document to stdout");
        }
    }
    info!(target: "runtime", "shutdown");
    Ok(())
}
