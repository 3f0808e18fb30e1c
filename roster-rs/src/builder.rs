//! Provides a builder which can be used to setup and initialize the directory.
//!
//! This wires up logging, the config, the geo resolver and the session store. As logging and
//! config are optional (e.g. a test wants neither), the builder permits to selectively enable
//! or disable them.
//!
//! # Example
//! Setting up the directory with all features enabled:
//! ```no_run
//! # use roster::builder::Builder;
//! #[tokio::main]
//! async fn main() {
//!     // Enable all features and build the directory...
//!     let directory = Builder::new().enable_all().build().await;
//!
//!     // Load the data of the current session...
//!     match directory.load().await {
//!         Ok(batch) => log::info!("{} employees loaded.", batch.len()),
//!         Err(error) => log::error!("{}", error),
//!     }
//! }
//! ```
use std::sync::{Arc, Weak};

use arc_swap::ArcSwap;
use tokio::sync::broadcast::error::RecvError;
use yaml_rust::Yaml;

use crate::batch::Batch;
use crate::config::{Config, Handle, DEFAULT_CONFIG_FILE};
use crate::errors::LoadResult;
use crate::geo::{Coordinates, GeoResolver};
use crate::query::PAGE_SIZE;
use crate::session::SessionStore;
use crate::source::FileSource;
use crate::view::DirectoryView;
use crate::{init_logging, ROSTER_REVISION, ROSTER_VERSION};

/// Contains the payload file which is used if none is configured.
pub const DEFAULT_SOURCE_FILE: &str = "data/employees.json";

/// Initializes the directory by creating and initializing all components.
///
/// # Example
/// Setting up a directory without logging and config, as done in tests:
/// ```
/// # use roster::builder::Builder;
/// # #[tokio::main]
/// # async fn main() {
/// let directory = Builder::new().build().await;
///
/// assert_eq!(directory.config().is_none(), true);
/// assert_eq!(directory.page_size(), 10);
/// assert_eq!(directory.source().to_string(), "file data/employees.json");
/// # }
/// ```
pub struct Builder {
    setup_logging: bool,
    setup_config: bool,
    config_file: String,
}

impl Default for Builder {
    fn default() -> Self {
        Builder::new()
    }
}

impl Builder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Builder {
            setup_logging: false,
            setup_config: false,
            config_file: DEFAULT_CONFIG_FILE.to_owned(),
        }
    }

    /// Enables all features.
    pub fn enable_all(mut self) -> Self {
        self.setup_logging = true;
        self.setup_config = true;

        self
    }

    /// Enables the automatic setup of the logging system.
    ///
    /// Using this, we properly initialize **simplelog** to log to stdout.
    pub fn enable_logging(mut self) -> Self {
        self.setup_logging = true;
        self
    }

    /// Disables the automatic setup of the logging system after [enable_all()](Builder::enable_all)
    /// has been used.
    pub fn disable_logging(mut self) -> Self {
        self.setup_logging = false;
        self
    }

    /// Installs a [Config](crate::config::Config) and loads the **settings.yml**.
    ///
    /// For more details see: [config](crate::config)
    pub fn enable_config(mut self) -> Self {
        self.setup_config = true;
        self
    }

    /// Disables setting up a **Config** instance after [enable_all()](Builder::enable_all)
    /// has been used.
    pub fn disable_config(mut self) -> Self {
        self.setup_config = false;
        self
    }

    /// Specifies the config file to load instead of **config/settings.yml**.
    ///
    /// Note that this has only an effect if the config is enabled.
    pub fn with_config_file(mut self, file: impl Into<String>) -> Self {
        self.config_file = file.into();
        self
    }

    /// Builds the [Directory] with all the enabled components being set up.
    pub async fn build(self) -> Directory {
        if self.setup_logging {
            init_logging();
        }

        log::info!(
            "||. ROSTER (v {} - rev {}) running on {} core(s) in {} CPU(s)",
            ROSTER_VERSION,
            ROSTER_REVISION,
            num_cpus::get(),
            num_cpus::get_physical()
        );

        let config = if self.setup_config {
            Some(crate::config::install(&self.config_file).await)
        } else {
            None
        };

        let geo = Arc::new(ArcSwap::new(Arc::new(create_resolver(config.as_deref()))));
        if let Some(config) = &config {
            run_geo_update_listener(config, Arc::downgrade(&geo));
        }

        Directory {
            config,
            session: Arc::new(SessionStore::new()),
            geo,
        }
    }
}

/// Provides access to all components of an initialized directory.
pub struct Directory {
    config: Option<Arc<Config>>,
    session: Arc<SessionStore>,
    geo: Arc<ArcSwap<GeoResolver>>,
}

impl Directory {
    /// Returns the config if it has been enabled in the [Builder].
    pub fn config(&self) -> Option<&Arc<Config>> {
        self.config.as_ref()
    }

    /// Returns the session store which caches the current batch.
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Returns the geo resolver which knows the built-in and all configured places.
    pub fn geo(&self) -> Arc<GeoResolver> {
        self.geo.load_full()
    }

    /// Returns the configured page size (**directory.page_size**).
    pub fn page_size(&self) -> usize {
        self.config
            .as_ref()
            .and_then(|config| {
                config
                    .current()
                    .query("directory.page_size")
                    .as_i64()
                    .filter(|size| *size > 0)
            })
            .map(|size| size as usize)
            .unwrap_or(PAGE_SIZE)
    }

    /// Returns the source which provides the payload (**source.file**).
    pub fn source(&self) -> FileSource {
        let file = self
            .config
            .as_ref()
            .and_then(|config| config.current().query("source.file").as_str().map(str::to_owned))
            .unwrap_or_else(|| DEFAULT_SOURCE_FILE.to_owned());

        FileSource::new(file)
    }

    /// Creates a fresh list view using the configured page size.
    pub fn view(&self) -> DirectoryView {
        DirectoryView::new(self.page_size())
    }

    /// Loads the batch of the current session from the configured source.
    pub async fn load(&self) -> LoadResult<Arc<Batch>> {
        self.session.load(&self.source()).await
    }

    /// Ends the current session by dropping all cached data.
    pub fn logout(&self) {
        self.session.invalidate();
    }
}

/// Creates a resolver which knows the built-in places and all places listed in **geo.places**.
fn create_resolver(config: Option<&Config>) -> GeoResolver {
    let places = config
        .map(|config| configured_places(&config.current()))
        .unwrap_or_default();

    GeoResolver::with_places(places)
}

fn configured_places(handle: &Handle) -> Vec<(String, Coordinates)> {
    let mut result = Vec::new();
    for place in handle.query("geo.places").as_vec().into_iter().flatten() {
        match (
            place["name"].as_str(),
            as_number(&place["lat"]),
            as_number(&place["lon"]),
        ) {
            (Some(name), Some(lat), Some(lon)) => {
                result.push((name.to_owned(), Coordinates::new(lat, lon)))
            }
            _ => log::warn!("Ignoring an invalid entry in geo.places: {:?}", place),
        }
    }

    result
}

fn as_number(value: &Yaml) -> Option<f64> {
    value
        .as_f64()
        .or_else(|| value.as_i64().map(|value| value as f64))
}

/// Rebuilds the geo resolver whenever the config changes.
///
/// The listener stops once either the config or the directory is dropped.
fn run_geo_update_listener(config: &Arc<Config>, geo: Weak<ArcSwap<GeoResolver>>) {
    let mut notifier = config.notifier();
    let config = Arc::downgrade(config);

    let _ = tokio::spawn(async move {
        loop {
            match notifier.recv().await {
                Ok(_) | Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => return,
            }

            match (config.upgrade(), geo.upgrade()) {
                (Some(config), Some(geo)) => {
                    let resolver = create_resolver(Some(config.as_ref()));
                    log::info!("Geo resolver updated - {} places known.", resolver.len());
                    geo.store(Arc::new(resolver));
                }
                _ => return,
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use crate::builder::{Builder, DEFAULT_SOURCE_FILE};
    use crate::geo::Coordinates;
    use std::time::Duration;

    #[test]
    fn defaults_apply_without_config() {
        crate::testing::test_async(async {
            let directory = Builder::new().build().await;

            assert_eq!(directory.config().is_none(), true);
            assert_eq!(directory.page_size(), 10);
            assert_eq!(directory.geo().len(), 48);
            assert_eq!(
                directory.source().to_string(),
                format!("file {}", DEFAULT_SOURCE_FILE)
            );
            assert_eq!(directory.view().page_size(), 10);
        });
    }

    #[test]
    fn settings_are_read_from_the_config_file() {
        crate::testing::test_async(async {
            let file = std::env::temp_dir().join("roster-builder-settings.yml");
            tokio::fs::write(
                &file,
                "directory:\n    page_size: 25\nsource:\n    file: /tmp/staff.json\ngeo:\n    places:\n        - name: Leh\n          lat: 34.152\n          lon: 77\n        - name: Broken\n",
            )
            .await
            .unwrap();

            let directory = Builder::new()
                .enable_config()
                .with_config_file(file.to_string_lossy())
                .build()
                .await;

            assert_eq!(directory.page_size(), 25);
            assert_eq!(directory.source().to_string(), "file /tmp/staff.json");
            assert_eq!(directory.geo().len(), 49);
            assert_eq!(
                directory.geo().resolve(Some("leh")),
                Some(Coordinates::new(34.152, 77.))
            );

            let _ = tokio::fs::remove_file(&file).await;
        });
    }

    #[test]
    fn geo_resolver_follows_config_changes() {
        crate::testing::test_async(async {
            let file = std::env::temp_dir().join("roster-builder-reload.yml");
            let _ = tokio::fs::remove_file(&file).await;

            let directory = Builder::new()
                .enable_config()
                .with_config_file(file.to_string_lossy())
                .build()
                .await;
            assert_eq!(directory.geo().resolve(Some("Shillong")), None);

            directory
                .config()
                .unwrap()
                .load_from_string(
                    "geo: { places: [ { name: Shillong, lat: 25.578, lon: 91.893 } ] }",
                    None,
                )
                .unwrap();

            let mut attempts = 0;
            while directory.geo().len() == 48 && attempts < 100 {
                tokio::time::sleep(Duration::from_millis(10)).await;
                attempts += 1;
            }

            assert_eq!(
                directory.geo().resolve(Some("Shillong")),
                Some(Coordinates::new(25.578, 91.893))
            );
        });
    }

    #[test]
    fn logout_drops_the_session() {
        crate::testing::test_async(async {
            let directory = Builder::new().build().await;
            let _ = directory
                .session()
                .replace(crate::batch::Batch::new(Vec::new()));

            directory.logout();

            assert_eq!(directory.session().current().is_none(), true);
        });
    }
}
