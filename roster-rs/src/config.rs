//! Contains the system configuration.
//!
//! Provides access to the system configuration which is loaded from the **config/settings.yml**
//! file. Note that we observe this file for changes and reload it once a change is detected.
//! Therefore each user of the config should attach itself to the [Config::notifier] and
//! re-process the config once a change message is received.
//!
//! Note that the **Config** struct is kind of constant and can be obtained from the
//! [Directory](crate::builder::Directory) once and then kept around. However, when using
//! **Config::current()** to obtain the current config handle, this should not be stored, as it
//! will not be updated once a new config has been loaded.
//!
//! The following keys are known:
//! ```yaml
//! directory:
//!     page_size: 10
//! source:
//!     file: "data/employees.json"
//! geo:
//!     places:
//!         - name: "Shillong"
//!           lat: 25.578
//!           lon: 91.893
//! ```
//!
//! # Examples
//!
//! Reading the config:
//! ```
//! # use roster::config::Config;
//! let config = Config::new("settings.yml");
//! config.load_from_string("directory: { page_size: 25 }", None).unwrap();
//!
//! assert_eq!(config.current().query("directory.page_size").as_i64(), Some(25));
//! assert_eq!(config.current().query("source.file").as_str(), None);
//! ```
//!
//! Attaching a change listener:
//! ```no_run
//! # use roster::builder::Builder;
//! # #[tokio::main]
//! # async fn main() {
//! let directory = Builder::new().enable_config().build().await;
//!
//! if let Some(config) = directory.config() {
//!     let mut notifier = config.notifier();
//!     tokio::spawn(async move {
//!         loop {
//!             // Wait for a config change...
//!             match notifier.recv().await {
//!                 Ok(_) => log::info!("Config update received..."),
//!                 _ => return,
//!             }
//!         }
//!     });
//! }
//! # }
//! ```
use std::path::Path;
use std::sync::{Arc, Weak};
use std::time::SystemTime;

use anyhow::Context;
use arc_swap::ArcSwap;
use yaml_rust::{Yaml, YamlLoader};

/// Contains the path of the config file which is used by [install].
pub const DEFAULT_CONFIG_FILE: &str = "config/settings.yml";

/// Provides access to the system configuration.
///
/// Most probably a config instance is installed by the [Builder](crate::builder::Builder) and
/// can be obtained via `directory.config()`. Note that it is highly recommended to register a
/// change listener by calling `Config::notifier()` as we expect all components to pick up config
/// changes without restarting the application.
pub struct Config {
    filename: String,
    tx: tokio::sync::broadcast::Sender<()>,
    config: ArcSwap<(Yaml, Option<SystemTime>)>,
}

/// Represents the change listener.
///
/// Internally this is simply the receiver of a broadcast. The actual message being broadcast
/// can and should be ignored. All that matters is, once a message has been received, the config
/// was changed and needs to be re-processed.
pub type ChangeNotifier = tokio::sync::broadcast::Receiver<()>;

/// Represents a handle to the currently loaded configuration.
///
/// Note that this handle should not be stored or kept around for long, as it will not be updated
/// if the underlying config changed.
pub struct Handle {
    config: Arc<(Yaml, Option<SystemTime>)>,
}

impl Config {
    /// Creates a new config reading the given file.
    ///
    /// Note that this will not install a change listener. This is only done by the
    /// [install] function.
    pub fn new(file: &str) -> Self {
        let (tx, _) = tokio::sync::broadcast::channel(1);
        Config {
            filename: file.to_owned(),
            config: ArcSwap::new(Arc::new((Yaml::Null, None))),
            tx,
        }
    }

    /// Returns the name of the underlying file.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Obtains a change notifier which receives a message once the config changed.
    pub fn notifier(&self) -> ChangeNotifier {
        self.tx.subscribe()
    }

    /// Obtains a handle to the currently loaded configuration.
    pub fn current(&self) -> Handle {
        Handle {
            config: self.config.load_full(),
        }
    }

    /// Determines the last modified date of the config file on disk.
    #[cfg(not(test))]
    async fn last_modified(&self) -> Option<SystemTime> {
        tokio::fs::metadata(&self.filename)
            .await
            .ok()
            .filter(|meta| meta.is_file())
            .and_then(|meta| meta.modified().ok())
    }

    /// Forces the config to read the underlying file.
    ///
    /// A missing file is not an error, the config simply remains empty so that all defaults
    /// apply.
    pub async fn load(&self) -> anyhow::Result<()> {
        log::info!("Loading config file {}...", &self.filename);

        match tokio::fs::metadata(&self.filename).await {
            Ok(metadata) if metadata.is_file() => {}
            _ => {
                log::info!("Config file doesn't exist - skipping config load.");
                return Ok(());
            }
        }

        let config_data = tokio::fs::read_to_string(&self.filename)
            .await
            .with_context(|| format!("Cannot load config file {}", &self.filename))?;

        let last_modified = tokio::fs::metadata(&self.filename)
            .await
            .ok()
            .and_then(|metadata| metadata.modified().ok());

        self.load_from_string(config_data.as_str(), last_modified)
    }

    /// Validates and writes the given config data into the underlying file.
    ///
    /// # Example
    ///
    /// ```
    /// # use roster::config::Config;
    /// # #[tokio::main]
    /// # async fn main() {
    /// let config = Config::new("roster_test_config.yml");
    ///
    /// // Write a config file...
    /// assert_eq!(config.store("
    /// directory:
    ///     page_size: 25
    /// ").await.is_ok(), true);
    ///
    /// // Load it back and verify its contents (in a fully running setup, this would
    /// // happen automatically via the config watcher...)
    /// assert_eq!(config.load().await.is_ok(), true);
    /// assert_eq!(config.current().query("directory.page_size").as_i64().unwrap(), 25);
    ///
    /// // Writing an invalid config file is prevented...
    /// assert_eq!(config.store("directory: \"test").await.is_err(), true);
    ///
    /// // Therefore the original config is still present...
    /// assert_eq!(config.load().await.is_ok(), true);
    /// assert_eq!(config.current().query("directory.page_size").as_i64().unwrap(), 25);
    ///
    /// let _ = std::fs::remove_file("roster_test_config.yml");
    /// # }
    /// ```
    pub async fn store(&self, config: &str) -> anyhow::Result<()> {
        log::info!(
            "Programmatically updating the config file {}...",
            &self.filename
        );

        if let Err(error) = YamlLoader::load_from_str(config) {
            Err(anyhow::anyhow!("Cannot parse config data: {}", error))
        } else {
            tokio::fs::write(&self.filename, config)
                .await
                .context("Failed to write to config file!")?;
            log::info!("Config has been updated successfully!");

            Ok(())
        }
    }

    /// Loads a configuration from the given string instead of a file.
    ///
    /// This is intended to be used in test environments where we cannot / do not want to load
    /// a config file from disk. A malformed config is rejected and the previous one is kept.
    pub fn load_from_string(
        &self,
        data: &str,
        last_modified: Option<SystemTime>,
    ) -> anyhow::Result<()> {
        let mut docs = YamlLoader::load_from_str(data).map_err(|error| {
            anyhow::anyhow!("Cannot parse config file {}: {}", &self.filename, error)
        })?;

        let doc = if docs.is_empty() {
            Yaml::Null
        } else {
            docs.swap_remove(0)
        };

        self.config.store(Arc::new((doc, last_modified)));

        // Notify all listeners - we ignore if there are none...
        let _ = self.tx.send(());

        Ok(())
    }
}

impl Handle {
    /// Provides access to the currently loaded configuration.
    pub fn config(&self) -> &Yaml {
        &self.config.0
    }

    /// Resolves a dotted path like "directory.page_size" against the loaded configuration.
    ///
    /// Returns `Yaml::BadValue` if any segment along the path is missing.
    pub fn query(&self, query: impl AsRef<str>) -> &Yaml {
        query
            .as_ref()
            .split('.')
            .fold(&self.config.0, |node, key| &node[key])
    }
}

/// Creates a **Config** for the given file, loads it and installs a change listener.
///
/// The listener only watches the "last modified" date of the file and will not perform a
/// structural comparison. It stops once the returned config is dropped.
///
/// Note that this method is also called by the [Builder](crate::builder::Builder) unless the
/// **Config** part is disabled.
pub async fn install(file: impl AsRef<Path>) -> Arc<Config> {
    let file = file.as_ref();
    if let Some(parent) = file.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        if let Err(error) = tokio::fs::create_dir_all(parent).await {
            log::warn!(
                "Failed to create config base directory {}: {}",
                parent.to_string_lossy(),
                error
            )
        }
    }

    let config = Arc::new(Config::new(&file.to_string_lossy()));

    if let Err(error) = config.load().await {
        log::error!("{:#}", error);
    }

    run_config_change_monitor(Arc::downgrade(&config));

    config
}

#[cfg(test)]
fn run_config_change_monitor(_config: Weak<Config>) {
    // No automatic updates during testing...
}

#[cfg(not(test))]
fn run_config_change_monitor(config: Weak<Config>) {
    let _ = tokio::spawn(async move {
        loop {
            tokio::time::sleep(std::time::Duration::from_secs(2)).await;
            let config = match config.upgrade() {
                Some(config) => config,
                None => return,
            };

            let last_modified = config.last_modified().await;
            let last_loaded = config.config.load().1;

            // Reload if a file is present and newer than the one previously loaded...
            if last_modified.is_some() && (last_loaded.is_none() || last_modified > last_loaded) {
                match config.load().await {
                    Ok(_) => log::info!("System configuration was re-loaded."),
                    Err(error) => log::error!("Failed to re-load system config: {:#}", error),
                }
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use std::time::SystemTime;

    #[test]
    fn ensure_config_update_works() {
        crate::testing::test_async(async {
            let config = std::sync::Arc::new(Config::new("settings.yml"));

            // Load an initial config...
            config
                .load_from_string("test: 42", Some(SystemTime::now()))
                .unwrap();

            // Setup a task which notifies our oneshot channel once the config changes...
            let mut change_notifier = config.notifier();
            let (tx, rx) = tokio::sync::oneshot::channel();
            let _ = tokio::spawn(async move {
                if change_notifier.recv().await.is_ok() {
                    let _ = tx.send(());
                }
            });

            assert_eq!(config.current().query("test").as_i64().unwrap(), 42);

            // Ensure that a malformed config is simply ignored...
            assert_eq!(
                config
                    .load_from_string("test: 'invalid", Some(SystemTime::now()))
                    .is_err(),
                true
            );
            assert_eq!(config.current().query("test").as_i64().unwrap(), 42);

            // Change the config...
            config
                .load_from_string("test: 4242", Some(SystemTime::now()))
                .unwrap();

            match rx.await {
                Ok(()) => (),
                _ => panic!("Received invalid value..."),
            };

            assert_eq!(config.current().query("test").as_i64().unwrap(), 4242);
        });
    }

    #[test]
    fn nested_keys_are_resolved() {
        let config = Config::new("settings.yml");
        config
            .load_from_string(
                "geo:\n    places:\n        - name: Leh\n          lat: 34.152\n          lon: 77.577\n",
                None,
            )
            .unwrap();

        let handle = config.current();
        let places = handle.query("geo.places").as_vec().unwrap();
        assert_eq!(places[0]["name"].as_str(), Some("Leh"));
        assert_eq!(places[0]["lat"].as_f64(), Some(34.152));
        assert_eq!(handle.query("geo.unknown.key").is_badvalue(), true);
        assert_eq!(handle.query("geo.places.name").is_badvalue(), true);
    }

    #[test]
    fn missing_files_leave_the_config_empty() {
        crate::testing::test_async(async {
            let config = Config::new("/this/config/does/not/exist.yml");

            assert_eq!(config.load().await.is_ok(), true);
            assert_eq!(config.current().config().is_null(), true);
        });
    }
}
