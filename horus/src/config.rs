//! YAML configuration: the static device registry and process-wide settings.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use horus_core::HSBK;
use log::info;
use serde::{de, Deserialize, Deserializer};
use thiserror::Error;

use crate::device::Device;
use crate::products::ProductCatalog;
use crate::transport::Protocol;

pub const CONFIG_FILE_ENV: &str = "CONFIG_FILE";
pub const PRODUCTS_FILE_ENV: &str = "PRODUCTS_FILE";
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("cannot parse the {what}: {source}")]
    Parse {
        what: String,
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Identifies this process in every request header.
    #[serde(default)]
    pub source: u32,
    /// Brightness a toggle turns lights on at.
    #[serde(default = "default_max_brightness")]
    pub max_brightness: u16,
    /// Product catalog to use instead of the built-in table.
    #[serde(default)]
    pub products_file: Option<PathBuf>,
    #[serde(default)]
    pub lifx: Vec<DeviceConfig>,
}

fn default_max_brightness() -> u16 {
    HSBK::ON.brightness
}

impl Default for Config {
    fn default() -> Config {
        Config {
            source: 0,
            max_brightness: default_max_brightness(),
            products_file: None,
            lifx: Vec::new(),
        }
    }
}

/// One entry of the `lifx` list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DeviceConfig {
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub address: Option<String>,
    /// Accepts `56700` as well as `"56700"`.
    #[serde(default, deserialize_with = "deserialize_port")]
    pub port: Option<u16>,
    #[serde(default)]
    pub protocol: Protocol,
    /// Device id in hex, e.g. `d073d5000001`.  Requests are tagged when it is missing.
    #[serde(default, deserialize_with = "deserialize_target")]
    pub target: Option<[u8; 8]>,
}

impl DeviceConfig {
    pub fn to_device(&self, source: u32) -> Device {
        Device::new(&self.uuid, self.address.clone(), self.port, self.protocol)
            .with_label(&self.label)
            .with_target(self.target)
            .with_source(source)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Port {
    Number(u16),
    Text(String),
}

fn deserialize_port<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u16>, D::Error> {
    match Option::<Port>::deserialize(d)? {
        None => Ok(None),
        Some(Port::Number(port)) => Ok(Some(port)),
        Some(Port::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(Port::Text(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("invalid port {:?}", s))),
    }
}

fn deserialize_target<'de, D: Deserializer<'de>>(d: D) -> Result<Option<[u8; 8]>, D::Error> {
    match Option::<String>::deserialize(d)? {
        None => Ok(None),
        Some(s) => parse_target(&s).map(Some).map_err(de::Error::custom),
    }
}

/// Parses a hex device id, with or without `:` separators, padding it to 8 bytes.
pub fn parse_target(s: &str) -> Result<[u8; 8], String> {
    let bytes = hex::decode(s.replace(':', "")).map_err(|e| format!("invalid target {:?}: {}", s, e))?;
    if bytes.len() > 8 {
        return Err(format!("invalid target {:?}: longer than 8 bytes", s));
    }
    let mut target = [0; 8];
    target[..bytes.len()].copy_from_slice(&bytes);
    Ok(target)
}

impl Config {
    pub fn from_yaml_str(s: &str) -> Result<Config, ConfigError> {
        serde_yaml::from_str(s).map_err(|source| ConfigError::Parse {
            what: "configuration".to_owned(),
            source,
        })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let path = path.as_ref();
        info!("Loading configuration from {}", path.display());
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        let config = Config::from_yaml_str(&data)?;
        info!("{} device(s) configured", config.lifx.len());
        Ok(config)
    }

    /// `explicit`, else `$CONFIG_FILE`, else `config.yaml`.
    pub fn path(explicit: Option<PathBuf>) -> PathBuf {
        pick_path(explicit, env::var_os(CONFIG_FILE_ENV)).unwrap_or_else(|| DEFAULT_CONFIG_FILE.into())
    }

    /// The product catalog named by `explicit`, else `$PRODUCTS_FILE`, else `productsFile`.
    /// Without any of them the built-in table is used.
    pub fn catalog(&self, explicit: Option<PathBuf>) -> Result<ProductCatalog, ConfigError> {
        match pick_path(explicit, env::var_os(PRODUCTS_FILE_ENV)).or_else(|| self.products_file.clone()) {
            Some(path) => ProductCatalog::load(path),
            None => Ok(ProductCatalog::builtin()),
        }
    }
}

fn pick_path(explicit: Option<PathBuf>, from_env: Option<OsString>) -> Option<PathBuf> {
    explicit.or_else(|| from_env.filter(|v| !v.is_empty()).map(PathBuf::from))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
source: 1234
maxBrightness: 30000
apiKey: ignored
lifx:
  - uuid: d073d5000001
    label: kitchen
    address: 192.168.1.20
    port: "56700"
    protocol: udp
    target: d0:73:d5:00:00:01
  - uuid: d073d5000002
    label: desk
    address: desk.lan
    port: 56701
  - uuid: d073d5000003
"#;

    #[test]
    fn parse_sample() {
        let config = Config::from_yaml_str(SAMPLE).unwrap();
        assert_eq!(config.source, 1234);
        assert_eq!(config.max_brightness, 30000);
        assert_eq!(config.lifx.len(), 3);

        let kitchen = &config.lifx[0];
        assert_eq!(kitchen.port, Some(56700));
        assert_eq!(kitchen.protocol, Protocol::Udp);
        assert_eq!(kitchen.target, Some([0xd0, 0x73, 0xd5, 0, 0, 1, 0, 0]));

        assert_eq!(config.lifx[1].port, Some(56701));
        assert_eq!(config.lifx[1].target, None);

        let bare = &config.lifx[2];
        assert_eq!(bare.address, None);
        assert_eq!(bare.port, None);
    }

    #[test]
    fn defaults() {
        let config = Config::from_yaml_str("lifx: []").unwrap();
        assert_eq!(config.source, 0);
        assert_eq!(config.max_brightness, HSBK::ON.brightness);
        assert!(config.products_file.is_none());
    }

    #[test]
    fn bad_port() {
        let err = Config::from_yaml_str("lifx:\n  - uuid: a\n    port: \"http\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("configuration"));
    }

    #[test]
    fn bad_target() {
        assert!(parse_target("zz").is_err());
        assert!(parse_target("d073d5000001000000").is_err());
        assert_eq!(parse_target("d073d5").unwrap(), [0xd0, 0x73, 0xd5, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.lifx[0].label, "kitchen");
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(dir.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn path_precedence() {
        assert_eq!(
            pick_path(Some("a.yaml".into()), Some("b.yaml".into())),
            Some(PathBuf::from("a.yaml"))
        );
        assert_eq!(pick_path(None, Some("b.yaml".into())), Some(PathBuf::from("b.yaml")));
        assert_eq!(pick_path(None, Some(OsString::new())), None);
        assert_eq!(pick_path(None, None), None);
    }

    #[test]
    fn catalog_from_products_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"- id: 7\n  name: Test Light\n  vendor: Acme\n").unwrap();

        let config = Config::default();
        let catalog = config.catalog(Some(file.path().to_owned())).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get(7).unwrap().vendor, "Acme");
    }
}
