/*!
The [`BridgeConfig`] type.
*/

use serde::Deserialize;

use crate::source::{self, SourceId};

/**
Configuration for the bridge.

The configuration can be deserialized from any format `serde` supports:

```
# fn main() -> Result<(), Box<dyn std::error::Error>> {
let config: diag_bridge::BridgeConfig = serde_json::from_str(r#"{ "source": ["message", "trace"] }"#)?;

assert_eq!(2, config.sources().len());
# Ok(())
# }
```
*/
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BridgeConfig {
    #[serde(default)]
    source: Vec<String>,
}

impl BridgeConfig {
    /**
    Create a configuration that subscribes to the given source names, like `message` or `ffdc`.
    */
    pub fn new<S: Into<String>>(sources: impl IntoIterator<Item = S>) -> Self {
        BridgeConfig {
            source: sources.into_iter().map(Into::into).collect(),
        }
    }

    /**
    The configured source names, as written.
    */
    pub fn sources(&self) -> &[String] {
        &self.source
    }

    /**
    The configured names that don't refer to a known source.
    */
    pub fn unknown_sources(&self) -> Vec<String> {
        source::validate(self.source.iter().map(String::as_str))
    }

    /**
    The sources the configuration resolves to.

    Unknown names are skipped. A source named more than once is yielded more than once.
    */
    pub fn resolve(&self) -> impl Iterator<Item = SourceId> + '_ {
        self.source.iter().filter_map(|name| source::resolve(name))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::source::SourceKind;

    #[test]
    fn deserialize_sources() {
        let config: BridgeConfig =
            serde_json::from_str(r#"{ "source": ["message", " FFDC ", "audit"] }"#).unwrap();

        assert_eq!(3, config.sources().len());
        assert_eq!(vec!["audit".to_owned()], config.unknown_sources());

        let resolved: BTreeSet<_> = config.resolve().collect();

        assert_eq!(
            BTreeSet::from([
                SourceId::new(SourceKind::Message),
                SourceId::new(SourceKind::Ffdc)
            ]),
            resolved
        );
    }

    #[test]
    fn deserialize_missing_sources() {
        let config: BridgeConfig = serde_json::from_str("{}").unwrap();

        assert_eq!(BridgeConfig::default(), config);
        assert_eq!(0, config.resolve().count());
    }
}
