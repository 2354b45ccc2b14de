//! Event output schema: which columns appear, in which order, per event type.
//!
//! The simulator writes a sidecar XML document next to each scenario
//! describing its CSV output. The relevant subtree:
//!
//! ```xml
//! <configuration>
//!   <output>
//!     ...
//!     <subscriptions>
//!       <subscription id="VehicleUpdates">
//!         <entries>
//!           <entry>Updated:VehicleUpdates</entry>
//!           <entry>Updated:Time</entry>
//!           <entry>Updated:Name</entry>
//!           <entry>Updated:Position.Latitude</entry>
//!         </entries>
//!       </subscription>
//!     </subscriptions>
//!   </output>
//! </configuration>
//! ```
//!
//! Entry text is normalized into flat column names: a leading "Updated:"
//! token is stripped and internal periods are removed ("Position.Latitude"
//! becomes "PositionLatitude"). The first entry of every subscription holds
//! the event-type discriminator and is renamed to the literal "Event".

use crate::error::{Error, Result};

use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

/// Mapping from event-type id to its ordered column names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaRegistry {
    schemas: BTreeMap<String, Vec<String>>,
}

impl SchemaRegistry {
    /// Load and parse the output schema document at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::NotFound {
                what: "output schema document".to_string(),
                path: path.to_path_buf(),
            });
        }
        let text = fs::read_to_string(path)?;
        Self::from_xml(&text).map_err(|e| match e {
            Error::SchemaParse(msg) => {
                Error::SchemaParse(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    /// Parse the schema from XML text.
    pub fn from_xml(text: &str) -> Result<Self> {
        let doc = roxmltree::Document::parse(text)
            .map_err(|e| Error::SchemaParse(format!("invalid XML: {}", e)))?;

        let updated_re = Regex::new(r"^Updated:")
            .map_err(|e| Error::SchemaParse(e.to_string()))?;

        let mut schemas: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for sub in doc
            .descendants()
            .filter(|n| n.has_tag_name("subscription"))
        {
            let id = sub.attribute("id").ok_or_else(|| {
                Error::SchemaParse("subscription element without id attribute".to_string())
            })?;

            let mut fields: Vec<String> = sub
                .descendants()
                .filter(|n| n.has_tag_name("entry"))
                .map(|n| normalize_field(&updated_re, n.text().unwrap_or("")))
                .collect();

            if fields.is_empty() {
                return Err(Error::SchemaParse(format!(
                    "event type '{}' declares no fields",
                    id
                )));
            }

            // First entry always holds the event-type discriminator.
            fields[0] = "Event".to_string();

            let mut seen = BTreeSet::new();
            for f in &fields {
                if f.is_empty() {
                    return Err(Error::SchemaParse(format!(
                        "event type '{}' has an empty field name",
                        id
                    )));
                }
                if !seen.insert(f.as_str()) {
                    return Err(Error::SchemaParse(format!(
                        "event type '{}' has duplicate field '{}'",
                        id, f
                    )));
                }
            }

            if schemas.insert(id.to_string(), fields).is_some() {
                return Err(Error::SchemaParse(format!(
                    "duplicate event type '{}' in schema",
                    id
                )));
            }
        }

        if schemas.is_empty() {
            return Err(Error::SchemaParse(
                "schema document declares no event types".to_string(),
            ));
        }

        Ok(Self { schemas })
    }

    /// Event-type ids, sorted.
    pub fn event_types(&self) -> Vec<&str> {
        self.schemas.keys().map(String::as_str).collect()
    }

    /// Ordered column names for one event type.
    pub fn fields(&self, event_type: &str) -> Result<&[String]> {
        self.schemas
            .get(event_type)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::UnknownEventType(event_type.to_string()))
    }
}

fn normalize_field(updated_re: &Regex, raw: &str) -> String {
    updated_re.replace(raw.trim(), "").replace('.', "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SCHEMA_XML: &str = r#"
        <configuration>
          <output id="file">
            <sink>file</sink>
            <subscriptions>
              <subscription id="VehicleUpdates">
                <entries>
                  <entry>Updated:VehicleUpdates</entry>
                  <entry>Updated:Time</entry>
                  <entry>Updated:Name</entry>
                  <entry>Updated:Speed</entry>
                  <entry>Updated:Position.Latitude</entry>
                  <entry>Updated:Position.Longitude</entry>
                </entries>
              </subscription>
              <subscription id="RsuRegistration">
                <entries>
                  <entry>RsuRegistration</entry>
                  <entry>Time</entry>
                  <entry>Mapping.Name</entry>
                  <entry>Mapping.Position.Latitude</entry>
                </entries>
              </subscription>
            </subscriptions>
          </output>
        </configuration>
    "#;

    #[test]
    fn parses_event_types_and_normalized_fields() {
        let reg = SchemaRegistry::from_xml(SCHEMA_XML).unwrap();
        assert_eq!(reg.event_types(), vec!["RsuRegistration", "VehicleUpdates"]);
        assert_eq!(
            reg.fields("VehicleUpdates").unwrap(),
            &[
                "Event",
                "Time",
                "Name",
                "Speed",
                "PositionLatitude",
                "PositionLongitude",
            ]
        );
        // "Updated:" prefix is optional; dots are stripped either way.
        assert_eq!(
            reg.fields("RsuRegistration").unwrap(),
            &["Event", "Time", "MappingName", "MappingPositionLatitude"]
        );
    }

    #[test]
    fn parsing_is_deterministic() {
        let a = SchemaRegistry::from_xml(SCHEMA_XML).unwrap();
        let b = SchemaRegistry::from_xml(SCHEMA_XML).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn unknown_event_type_errors() {
        let reg = SchemaRegistry::from_xml(SCHEMA_XML).unwrap();
        let err = reg.fields("ChargingUpdates").unwrap_err();
        assert!(matches!(err, Error::UnknownEventType(_)), "got {err:?}");
    }

    #[test]
    fn empty_subscription_is_rejected() {
        let xml = r#"
            <configuration><output><subscriptions>
              <subscription id="VehicleUpdates"><entries/></subscription>
            </subscriptions></output></configuration>
        "#;
        let err = SchemaRegistry::from_xml(xml).unwrap_err();
        assert!(matches!(err, Error::SchemaParse(_)), "got {err:?}");
    }

    #[test]
    fn empty_entry_is_rejected() {
        // Normalizes to an empty column name; only the first entry may be
        // contentless (it is renamed to Event regardless).
        let xml = r#"
            <configuration><output><subscriptions>
              <subscription id="VehicleUpdates">
                <entries>
                  <entry>VehicleUpdates</entry>
                  <entry>Time</entry>
                  <entry/>
                </entries>
              </subscription>
            </subscriptions></output></configuration>
        "#;
        let err = SchemaRegistry::from_xml(xml).unwrap_err();
        assert!(matches!(err, Error::SchemaParse(_)), "got {err:?}");
    }

    #[test]
    fn duplicate_field_is_rejected() {
        let xml = r#"
            <configuration><output><subscriptions>
              <subscription id="VehicleUpdates">
                <entries>
                  <entry>VehicleUpdates</entry>
                  <entry>Time</entry>
                  <entry>Time</entry>
                </entries>
              </subscription>
            </subscriptions></output></configuration>
        "#;
        let err = SchemaRegistry::from_xml(xml).unwrap_err();
        assert!(matches!(err, Error::SchemaParse(_)), "got {err:?}");
    }

    #[test]
    fn malformed_document_is_rejected() {
        let err = SchemaRegistry::from_xml("<configuration>").unwrap_err();
        assert!(matches!(err, Error::SchemaParse(_)), "got {err:?}");
    }

    #[test]
    fn missing_file_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let err = SchemaRegistry::load(&tmp.path().join("output_config.xml")).unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }), "got {err:?}");
    }
}
