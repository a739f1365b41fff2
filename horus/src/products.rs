use std::collections::HashMap;
use std::fs;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// What a product can do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Capabilities {
    #[serde(rename = "hasColor", default)]
    pub has_color: bool,
    #[serde(rename = "hasIR", default)]
    pub has_ir: bool,
    #[serde(rename = "hasMultiZone", default)]
    pub has_multizone: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub vendor: String,
    /// Hardware version.  Zero in the catalog; filled in from what the device reports.
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub capabilities: Capabilities,
}

/// Product id to product, built once at startup and only read afterwards.
#[derive(Debug, Clone, Default)]
pub struct ProductCatalog {
    products: HashMap<u32, Product>,
}

// (id, name, color, infrared, multizone)
#[rustfmt::skip]
const BUILTIN: &[(u32, &str, bool, bool, bool)] = &[
    (1, "Original 1000", true, false, false),
    (3, "Color 650", true, false, false),
    (10, "White 800 (Low Voltage)", false, false, false),
    (11, "White 800 (High Voltage)", false, false, false),
    (18, "White 900 BR30 (Low Voltage)", false, false, false),
    (20, "Color 1000 BR30", true, false, false),
    (22, "Color 1000", true, false, false),
    (27, "LIFX A19", true, false, false),
    (28, "LIFX BR30", true, false, false),
    (29, "LIFX+ A19", true, true, false),
    (30, "LIFX+ BR30", true, true, false),
    (31, "LIFX Z", true, false, true),
    (32, "LIFX Z 2", true, false, true),
    (36, "LIFX Downlight", true, false, false),
    (37, "LIFX Downlight", true, false, false),
    (38, "LIFX Beam", true, false, true),
    (43, "LIFX A19", true, false, false),
    (44, "LIFX BR30", true, false, false),
    (45, "LIFX+ A19", true, true, false),
    (46, "LIFX+ BR30", true, true, false),
    (49, "LIFX Mini", true, false, false),
    (50, "LIFX Mini Day and Dusk", false, false, false),
    (51, "LIFX Mini White", false, false, false),
    (52, "LIFX GU10", true, false, false),
    (55, "LIFX Tile", true, false, false),
    (59, "LIFX Mini Color", true, false, false),
    (60, "LIFX Mini Day and Dusk", false, false, false),
    (61, "LIFX Mini White", false, false, false),
];

impl ProductCatalog {
    pub fn new(products: Vec<Product>) -> ProductCatalog {
        ProductCatalog {
            products: products.into_iter().map(|p| (p.id, p)).collect(),
        }
    }

    /// The products known at build time, used when no catalog file is given.
    pub fn builtin() -> ProductCatalog {
        ProductCatalog::new(
            BUILTIN
                .iter()
                .map(|&(id, name, has_color, has_ir, has_multizone)| Product {
                    id,
                    name: name.to_owned(),
                    vendor: "LIFX".to_owned(),
                    version: 0,
                    capabilities: Capabilities {
                        has_color,
                        has_ir,
                        has_multizone,
                    },
                })
                .collect(),
        )
    }

    /// Parses a YAML list of products.  A later entry wins over an earlier one with the same id.
    pub fn from_yaml_str(s: &str) -> Result<ProductCatalog, ConfigError> {
        let products: Vec<Product> = serde_yaml::from_str(s).map_err(|source| ConfigError::Parse {
            what: "product catalog".to_owned(),
            source,
        })?;
        Ok(ProductCatalog::new(products))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<ProductCatalog, ConfigError> {
        let path = path.as_ref();
        info!("Parsing products file {}", path.display());
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        ProductCatalog::from_yaml_str(&data)
    }

    pub fn get(&self, id: u32) -> Option<&Product> {
        self.products.get(&id)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_lookup() {
        let catalog = ProductCatalog::builtin();
        let z = catalog.get(31).unwrap();
        assert_eq!(z.name, "LIFX Z");
        assert!(z.capabilities.has_multizone);
        assert!(catalog.get(29).unwrap().capabilities.has_ir);
        assert!(!catalog.get(10).unwrap().capabilities.has_color);
        assert!(catalog.get(9999).is_none());
    }

    #[test]
    fn parse_yaml() {
        let catalog = ProductCatalog::from_yaml_str(
            r#"
- id: 27
  name: LIFX A19
  vendor: LIFX
  capabilities:
    hasColor: true
    hasIR: false
    hasMultiZone: false
- id: 90
  name: LIFX Clean
  vendor: LIFX
"#,
        )
        .unwrap();
        assert_eq!(catalog.len(), 2);
        assert!(catalog.get(27).unwrap().capabilities.has_color);
        assert_eq!(catalog.get(90).unwrap().capabilities, Capabilities::default());
    }

    #[test]
    fn bad_yaml() {
        let err = ProductCatalog::from_yaml_str("- id: [nope").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
