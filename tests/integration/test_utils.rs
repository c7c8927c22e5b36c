//! Shared test utilities for integration tests
//!
//! Provides isolated workspaces, a scripted shell writing into a buffer, and small
//! data sets that every estimator can fit quickly.

use mlsh::session::Session;
use mlsh::shell::{Dispatcher, Registry, Renderer, Shell};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

/// Global mutex to serialize XDG environment variable access across all tests
static XDG_ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Environment variable state to restore after test
struct EnvState {
    home: Option<String>,
    xdg_config_home: Option<String>,
}

impl EnvState {
    fn capture() -> Self {
        Self {
            home: std::env::var("HOME").ok(),
            xdg_config_home: std::env::var("XDG_CONFIG_HOME").ok(),
        }
    }

    fn restore(self) {
        match self.home {
            Some(orig) => std::env::set_var("HOME", orig),
            None => std::env::remove_var("HOME"),
        }
        match self.xdg_config_home {
            Some(orig) => std::env::set_var("XDG_CONFIG_HOME", orig),
            None => std::env::remove_var("XDG_CONFIG_HOME"),
        }
    }
}

/// Run `f` with HOME and XDG_CONFIG_HOME pointing into `test_dir`.
///
/// Keeps a developer's own `~/.config/mlsh/config.toml` out of the tests.
pub fn with_xdg_env<F, R>(test_dir: &TempDir, f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = XDG_ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let env_state = EnvState::capture();

    let test_home = test_dir.path().join("home");
    std::fs::create_dir_all(&test_home).unwrap();
    std::env::set_var("HOME", test_home.to_str().unwrap());
    std::env::set_var("XDG_CONFIG_HOME", test_dir.path().to_str().unwrap());

    let result = f();

    env_state.restore();
    result
}

/// Workspace config that keeps cross-validation small.
pub const FAST_CONFIG: &str = r#"
[ml]
n_splits = 3
tuning_folds = 2
"#;

/// A temporary workspace with its own XDG home.
pub struct TestWorkspace {
    root: TempDir,
    xdg: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        let workspace = Self {
            root: TempDir::new().unwrap(),
            xdg: TempDir::new().unwrap(),
        };
        workspace.write_config(FAST_CONFIG);
        workspace
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    pub fn data_dir(&self) -> PathBuf {
        self.root.path().join("data")
    }

    pub fn projects_dir(&self) -> PathBuf {
        self.root.path().join("projects")
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.path().join("config").join("config.toml")
    }

    pub fn write_config(&self, content: &str) {
        let path = self.config_path();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    pub fn write_data(&self, file_name: &str, content: &str) {
        std::fs::create_dir_all(self.data_dir()).unwrap();
        std::fs::write(self.data_dir().join(file_name), content).unwrap();
    }

    pub fn open_session(&self, config_file: Option<PathBuf>) -> Session {
        with_xdg_env(&self.xdg, || {
            Session::open(self.root.path().to_path_buf(), config_file).unwrap()
        })
    }

    /// Uncolored shell over this workspace, printing into a buffer.
    pub fn shell(&self) -> Shell<Vec<u8>> {
        Shell::new(
            Dispatcher::new(Registry::standard().unwrap()),
            self.open_session(None),
            Renderer::new(false),
            Vec::new(),
        )
    }
}

/// Run one line and return only what it printed.
pub fn run(shell: &mut Shell<Vec<u8>>, line: &str) -> String {
    let before = shell.output().len();
    shell.run_line(line).unwrap();
    String::from_utf8_lossy(&shell.output()[before..]).into_owned()
}

/// Two well separated classes, interleaved so every fold sees both.
pub fn classification_csv() -> String {
    let mut csv = String::from("id,width,height,species\n");
    for i in 0..30 {
        let (base, label) = if i % 2 == 0 { (1.0, "small") } else { (8.0, "large") };
        let jitter = (i % 5) as f64 * 0.1;
        csv.push_str(&format!(
            "{},{:.1},{:.1},{}\n",
            i,
            base + jitter,
            base * 2.0 - jitter,
            label
        ));
    }
    csv
}

/// `y = 2x + 1` on twelve points, plus one row with a missing value.
pub fn regression_csv() -> String {
    let mut csv = String::from("x,y\n");
    for i in 0..12 {
        csv.push_str(&format!("{},{}\n", i, 2 * i + 1));
    }
    csv.push_str("12,\n");
    csv
}
