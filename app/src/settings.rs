use std::{
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use align::{
    MatchConfig, SimilarityMetric, DEFAULT_ACCEPTANCE_THRESHOLD, DEFAULT_GAP_MARKER,
    DEFAULT_WINDOW_OFFSETS,
};
use camino::{Utf8Path, Utf8PathBuf};
use shorts_core::timecode::DEFAULT_FRAME_RATE;

const QUALIFIER: &str = "io";
const ORGANIZATION: &str = "vauntware";
const APP: &str = "shortify";
const APP_CAPS: &str = "SHORTIFY";

const GAP_MARKER_KEY: &str = "gap_marker";
const ACCEPTANCE_THRESHOLD_KEY: &str = "acceptance_threshold";
const FRAME_RATE_KEY: &str = "frame_rate";
const SIMILARITY_METRIC_KEY: &str = "similarity_metric";
const WINDOW_OFFSETS_KEY: &str = "window_offsets";
const RESOLVE_TIMEOUT_KEY: &str = "resolve_timeout_ms";

const DEFAULT_CONFIG_FILE: &str = "shortify.toml";

type ExtConfigBuilder = config::ConfigBuilder<config::builder::DefaultState>;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    ConfigError(#[from] config::ConfigError),
    #[error("unable to get user home directory")]
    NoUserHome,
    #[error("path is not utf8: {:?}", _0)]
    NonUtf8Path(PathBuf),
    #[error("config file does not exist: {0}")]
    MissingFile(Utf8PathBuf),
    #[error(transparent)]
    Metric(#[from] align::UnknownMetric),
    #[error("`{key}` is out of range: {value}")]
    OutOfRange { key: &'static str, value: i64 },
    #[error(transparent)]
    Invalid(#[from] align::AlignmentError),
}

fn camino_path(std_path: &Path) -> Result<&Utf8Path, ConfigError> {
    Utf8Path::from_path(std_path).ok_or_else(|| ConfigError::NonUtf8Path(std_path.to_path_buf()))
}

fn new_config_builder() -> ExtConfigBuilder {
    // unwraps are if our KEYs are not strings. These are statics, so its safe.
    config::Config::builder()
        .set_default(GAP_MARKER_KEY, DEFAULT_GAP_MARKER)
        .unwrap()
        .set_default(ACCEPTANCE_THRESHOLD_KEY, DEFAULT_ACCEPTANCE_THRESHOLD)
        .unwrap()
        .set_default(FRAME_RATE_KEY, DEFAULT_FRAME_RATE)
        .unwrap()
        .set_default(
            SIMILARITY_METRIC_KEY,
            SimilarityMetric::default().to_string(),
        )
        .unwrap()
        .set_default(WINDOW_OFFSETS_KEY, DEFAULT_WINDOW_OFFSETS.to_vec())
        .unwrap()
        .set_default(RESOLVE_TIMEOUT_KEY, Option::<i64>::None)
        .unwrap()
}

fn environment(source: Option<config::Map<String, String>>) -> config::Environment {
    config::Environment::with_prefix(APP_CAPS)
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key(WINDOW_OFFSETS_KEY)
        .source(source)
}

#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config_dir: Option<Utf8PathBuf>,
    config_path: Option<Utf8PathBuf>,
    load_environment: bool,
    environment_source: Option<config::Map<String, String>>,
    config_builder: ExtConfigBuilder,
}

impl ConfigBuilder {
    #[cfg(test)]
    pub fn new_test_config(root: &Path) -> Result<ConfigBuilder, ConfigError> {
        let root = camino_path(root)?;
        Ok(ConfigBuilder {
            config_dir: Some(root.join("config_dir")),
            config_path: None,
            load_environment: false,
            environment_source: None,
            config_builder: new_config_builder(),
        })
    }

    pub fn new() -> Result<Self, ConfigError> {
        let dirs = directories::ProjectDirs::from(QUALIFIER, ORGANIZATION, APP)
            .ok_or(ConfigError::NoUserHome)?;
        let config_dir = camino_path(dirs.config_dir())?.to_path_buf();
        Ok(Self {
            config_dir: Some(config_dir),
            config_path: None,
            load_environment: false,
            environment_source: None,
            config_builder: new_config_builder(),
        })
    }

    /// Built-in defaults only, no user config directory.
    pub fn defaults() -> Self {
        Self {
            config_dir: None,
            config_path: None,
            load_environment: false,
            environment_source: None,
            config_builder: new_config_builder(),
        }
    }

    /// Should we load configuration from the environment?
    pub fn load_environment(mut self, load_environment: bool) -> Self {
        self.load_environment = load_environment;
        self
    }

    #[cfg(test)]
    fn environment_source(mut self, vars: &[(&str, &str)]) -> Self {
        self.load_environment = true;
        self.environment_source = Some(
            vars.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        );
        self
    }

    /// An explicit config file. Unlike the default file, it must exist.
    pub fn config_file(mut self, config_file: Option<&Path>) -> Result<Self, ConfigError> {
        self.config_path = config_file
            .map(|p| camino_path(p).map(|p| p.to_path_buf()))
            .transpose()?;
        Ok(self)
    }

    fn set_override<T: Into<config::Value>>(mut self, key: &str, value: Option<T>) -> Self {
        self.config_builder = self
            .config_builder
            .set_override_option(key, value)
            .unwrap();
        self
    }

    pub fn gap_marker(self, gap_marker: Option<&str>) -> Self {
        self.set_override(GAP_MARKER_KEY, gap_marker)
    }

    pub fn acceptance_threshold(self, threshold: Option<f64>) -> Self {
        self.set_override(ACCEPTANCE_THRESHOLD_KEY, threshold)
    }

    pub fn frame_rate(self, frame_rate: Option<u32>) -> Self {
        self.set_override(FRAME_RATE_KEY, frame_rate)
    }

    pub fn similarity_metric(self, metric: Option<SimilarityMetric>) -> Self {
        self.set_override(SIMILARITY_METRIC_KEY, metric.map(|m| m.to_string()))
    }

    pub fn resolve_timeout_ms(self, timeout_ms: Option<u64>) -> Self {
        self.set_override(RESOLVE_TIMEOUT_KEY, timeout_ms)
    }

    pub fn build(mut self) -> Result<Settings, ConfigError> {
        let cfg_file = match self.config_path {
            Some(path) if !path.exists() => return Err(ConfigError::MissingFile(path)),
            Some(path) => Some(path),
            None => self
                .config_dir
                .map(|dir| dir.join(DEFAULT_CONFIG_FILE))
                .filter(|path| path.exists()),
        };

        if let Some(path) = &cfg_file {
            log::debug!("loading config file {}", path);
            self.config_builder = self
                .config_builder
                .add_source(config::File::from(path.as_std_path()));
        }

        if self.load_environment {
            self.config_builder = self
                .config_builder
                .add_source(environment(self.environment_source))
        }

        let settings = Settings {
            inner: self.config_builder.build().map_err(ConfigError::from)?,
            config_file: cfg_file,
        };
        log::trace!("{:#?}", settings);
        Ok(settings)
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    inner: config::Config,
    config_file: Option<Utf8PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            // building from set_default values only cannot fail
            inner: new_config_builder().build().unwrap(),
            config_file: None,
        }
    }
}

impl Settings {
    /// The config file that was loaded, if any.
    pub fn config_file(&self) -> Option<&Utf8Path> {
        self.config_file.as_deref()
    }

    pub fn gap_marker(&self) -> Result<String, ConfigError> {
        Ok(self.inner.get_string(GAP_MARKER_KEY)?)
    }

    pub fn acceptance_threshold(&self) -> Result<f64, ConfigError> {
        Ok(self.inner.get_float(ACCEPTANCE_THRESHOLD_KEY)?)
    }

    pub fn frame_rate(&self) -> Result<u32, ConfigError> {
        let value = self.inner.get_int(FRAME_RATE_KEY)?;
        u32::try_from(value).map_err(|_| ConfigError::OutOfRange {
            key: FRAME_RATE_KEY,
            value,
        })
    }

    pub fn similarity_metric(&self) -> Result<SimilarityMetric, ConfigError> {
        let name = self.inner.get_string(SIMILARITY_METRIC_KEY)?;
        Ok(SimilarityMetric::from_str(&name)?)
    }

    pub fn window_offsets(&self) -> Result<Vec<i64>, ConfigError> {
        // a single value in the environment is parsed as a plain int
        if let Ok(v) = self.inner.get_int(WINDOW_OFFSETS_KEY) {
            return Ok(vec![v]);
        }
        self.inner
            .get_array(WINDOW_OFFSETS_KEY)?
            .into_iter()
            .map(|v| v.into_int().map_err(ConfigError::from))
            .collect()
    }

    pub fn resolve_timeout(&self) -> Result<Option<Duration>, ConfigError> {
        match self.inner.get::<Option<i64>>(RESOLVE_TIMEOUT_KEY)? {
            None => Ok(None),
            Some(ms) if ms < 0 => Err(ConfigError::OutOfRange {
                key: RESOLVE_TIMEOUT_KEY,
                value: ms,
            }),
            Some(ms) => Ok(Some(Duration::from_millis(ms as u64))),
        }
    }

    /// Collect the matching keys into a validated [`MatchConfig`].
    pub fn match_config(&self) -> Result<MatchConfig, ConfigError> {
        let cfg = MatchConfig {
            gap_marker: self.gap_marker()?,
            acceptance_threshold: self.acceptance_threshold()?,
            frame_rate: self.frame_rate()?,
            similarity_metric: self.similarity_metric()?,
            window_offsets: self.window_offsets()?,
        };
        cfg.validate()?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_config(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn defaults() {
        let root = tempfile::tempdir().unwrap();
        let settings = ConfigBuilder::new_test_config(root.path())
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(settings.match_config().unwrap(), MatchConfig::default());
        assert_eq!(settings.resolve_timeout().unwrap(), None);
        assert_eq!(settings.config_file(), None);
    }

    #[test]
    fn default_settings_match_builder_defaults() {
        assert_eq!(
            Settings::default().match_config().unwrap(),
            MatchConfig::default()
        );
    }

    #[test]
    fn default_config_file_is_picked_up() {
        let root = tempfile::tempdir().unwrap();
        let config_dir = root.path().join("config_dir");
        std::fs::create_dir_all(&config_dir).unwrap();
        write_config(
            &config_dir,
            DEFAULT_CONFIG_FILE,
            "acceptance_threshold = 0.9\nsimilarity_metric = \"word\"\n",
        );
        let settings = ConfigBuilder::new_test_config(root.path())
            .unwrap()
            .build()
            .unwrap();
        let cfg = settings.match_config().unwrap();
        assert_eq!(cfg.acceptance_threshold, 0.9);
        assert_eq!(cfg.similarity_metric, SimilarityMetric::WordRatio);
        assert!(settings.config_file().is_some());
    }

    #[test]
    fn explicit_config_file() {
        let root = tempfile::tempdir().unwrap();
        let path = write_config(
            root.path(),
            "custom.toml",
            "gap_marker = \"<gap>\"\nframe_rate = 30\nwindow_offsets = [0, 1]\nresolve_timeout_ms = 250\n",
        );
        let settings = ConfigBuilder::new_test_config(root.path())
            .unwrap()
            .config_file(Some(&path))
            .unwrap()
            .build()
            .unwrap();
        let cfg = settings.match_config().unwrap();
        assert_eq!(cfg.gap_marker, "<gap>");
        assert_eq!(cfg.frame_rate, 30);
        assert_eq!(cfg.window_offsets, vec![0, 1]);
        assert_eq!(
            settings.resolve_timeout().unwrap(),
            Some(Duration::from_millis(250))
        );
    }

    #[test]
    fn missing_explicit_config_file() {
        let root = tempfile::tempdir().unwrap();
        let err = ConfigBuilder::new_test_config(root.path())
            .unwrap()
            .config_file(Some(&root.path().join("nope.toml")))
            .unwrap()
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingFile(_)));
    }

    #[test]
    fn environment_overrides_file() {
        let root = tempfile::tempdir().unwrap();
        let path = write_config(root.path(), "custom.toml", "acceptance_threshold = 0.9\n");
        let settings = ConfigBuilder::new_test_config(root.path())
            .unwrap()
            .config_file(Some(&path))
            .unwrap()
            .environment_source(&[
                ("SHORTIFY_ACCEPTANCE_THRESHOLD", "0.65"),
                ("SHORTIFY_WINDOW_OFFSETS", "0,-2,3"),
                ("OTHER_FRAME_RATE", "60"),
            ])
            .build()
            .unwrap();
        let cfg = settings.match_config().unwrap();
        assert_eq!(cfg.acceptance_threshold, 0.65);
        assert_eq!(cfg.window_offsets, vec![0, -2, 3]);
        assert_eq!(cfg.frame_rate, DEFAULT_FRAME_RATE);
    }

    #[test]
    fn overrides_win() {
        let root = tempfile::tempdir().unwrap();
        let settings = ConfigBuilder::new_test_config(root.path())
            .unwrap()
            .environment_source(&[("SHORTIFY_FRAME_RATE", "60")])
            .frame_rate(Some(24))
            .acceptance_threshold(Some(0.6))
            .similarity_metric(Some(SimilarityMetric::CharacterRatio))
            .gap_marker(None)
            .build()
            .unwrap();
        let cfg = settings.match_config().unwrap();
        assert_eq!(cfg.frame_rate, 24);
        assert_eq!(cfg.acceptance_threshold, 0.6);
        assert_eq!(cfg.similarity_metric, SimilarityMetric::CharacterRatio);
        assert_eq!(cfg.gap_marker, DEFAULT_GAP_MARKER);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let root = tempfile::tempdir().unwrap();
        let settings = ConfigBuilder::new_test_config(root.path())
            .unwrap()
            .acceptance_threshold(Some(1.5))
            .build()
            .unwrap();
        assert!(matches!(
            settings.match_config(),
            Err(ConfigError::Invalid(_))
        ));

        let settings = ConfigBuilder::new_test_config(root.path())
            .unwrap()
            .environment_source(&[("SHORTIFY_SIMILARITY_METRIC", "soundex")])
            .build()
            .unwrap();
        assert!(matches!(
            settings.match_config(),
            Err(ConfigError::Metric(_))
        ));
    }
}
