use std::fs;

use anyhow::Context;
use horus::{Capabilities, Product};
use serde::Deserialize;

/// One vendor block of the published `products.json`.
#[derive(Deserialize, Debug)]
pub struct LifxProducts {
    pub vid: u32,
    pub name: String,
    pub products: Vec<LifxProduct>,
    pub defaults: LifxFeatures,
}

/// Only the features the catalog keeps.  Missing ones fall back to the vendor defaults.
#[derive(Deserialize, Debug, Default)]
pub struct LifxFeatures {
    #[serde(default)]
    color: Option<bool>,
    #[serde(default)]
    infrared: Option<bool>,
    #[serde(default)]
    multizone: Option<bool>,
}

#[derive(Deserialize, Debug)]
pub struct LifxProduct {
    pub pid: u32,
    pub name: String,
    #[serde(default)]
    pub features: LifxFeatures,
}

impl LifxProducts {
    fn catalog_entries(&self) -> impl Iterator<Item = Product> + '_ {
        self.products.iter().map(move |prd| {
            let pick = |f: fn(&LifxFeatures) -> Option<bool>| {
                f(&prd.features).or_else(|| f(&self.defaults)).unwrap_or(false)
            };
            Product {
                id: prd.pid,
                name: prd.name.clone(),
                vendor: self.name.clone(),
                version: 0,
                capabilities: Capabilities {
                    has_color: pick(|f| f.color),
                    has_ir: pick(|f| f.infrared),
                    has_multizone: pick(|f| f.multizone),
                },
            }
        })
    }
}

/// Turns the vendor's `products.json` into the catalog YAML `horus` loads.
pub fn convert_products(json: &str) -> anyhow::Result<String> {
    let vendors: Vec<LifxProducts> = serde_json::from_str(json).context("cannot parse products.json")?;
    let products: Vec<Product> = vendors.iter().flat_map(|v| v.catalog_entries()).collect();
    Ok(serde_yaml::to_string(&products)?)
}

pub fn update_products(input: &str, output: &str) -> anyhow::Result<()> {
    let json = fs::read_to_string(input).with_context(|| format!("cannot read {}", input))?;
    let yaml = convert_products(&json)?;
    fs::write(output, yaml).with_context(|| format!("cannot write {}", output))?;
    println!("wrote {}", output);
    Ok(())
}
