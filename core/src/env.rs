use std::collections::HashMap;
use std::fmt::Debug;
use std::path::PathBuf;

/// Source of environment variables and the user's home directory.
///
/// Only configuration resolution reads it, once, when a client is built.
pub trait Env: Debug + Send + Sync + 'static {
    /// Value of `key`, or `None` if it is unset or not valid utf-8.
    fn var(&self, key: &str) -> Option<String>;

    /// Home directory of the current user, if known.
    fn home_dir(&self) -> Option<PathBuf>;

    /// Value of the first of `keys` that is set to a non-empty string.
    ///
    /// An empty variable counts as unset so `FOO=` can't shadow a fallback.
    fn first_var(&self, keys: &[&str]) -> Option<String> {
        keys.iter()
            .filter_map(|key| self.var(key))
            .find(|v| !v.is_empty())
    }
}

/// Process environment.
#[derive(Debug, Copy, Clone)]
pub struct OsEnv;

impl Env for OsEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var_os(key)?.into_string().ok()
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn home_dir(&self) -> Option<PathBuf> {
        #[allow(deprecated)]
        std::env::home_dir()
    }

    #[cfg(target_arch = "wasm32")]
    fn home_dir(&self) -> Option<PathBuf> {
        None
    }
}

/// Fixed set of variables, for tests and embedding.
///
/// ```
/// use bucketwire_core::{Env, StaticEnv};
///
/// let env = StaticEnv::new()
///     .with_var("BUCKETWIRE_REGION", "eu-west-1")
///     .with_home_dir("/home/alice");
/// assert_eq!(env.var("BUCKETWIRE_REGION").as_deref(), Some("eu-west-1"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticEnv {
    /// The home directory to report.
    pub home_dir: Option<PathBuf>,
    /// The variables to report.
    pub envs: HashMap<String, String>,
}

impl StaticEnv {
    /// An empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a variable.
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.insert(key.into(), value.into());
        self
    }

    /// Set the home directory.
    pub fn with_home_dir(mut self, home: impl Into<PathBuf>) -> Self {
        self.home_dir = Some(home.into());
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for StaticEnv {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            home_dir: None,
            envs: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl Env for StaticEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.envs.get(key).cloned()
    }

    fn home_dir(&self) -> Option<PathBuf> {
        self.home_dir.clone()
    }
}

/// Empty environment, installed by [`crate::Context::new`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEnv;

impl Env for NoopEnv {
    fn var(&self, _key: &str) -> Option<String> {
        None
    }

    fn home_dir(&self) -> Option<PathBuf> {
        None
    }
}
