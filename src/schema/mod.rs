//! Versioned configuration shapes and the chain that upgrades them.
//!
//! Every released `apiVersion` has its own module holding a frozen copy of
//! the document shape and the conversion into the next version. Documents
//! are decoded strictly at their declared version and then stepped forward
//! until they reach [`LATEST`].

use std::fmt::{self, Display, Formatter};

use log::debug;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

#[macro_use]
mod one_of;
#[macro_use]
mod convert;

pub mod latest;
pub mod v1beta10;
pub mod v1beta11;
pub mod v1beta12;
pub mod v1beta13;
pub mod v1beta6;
pub mod v1beta7;
pub mod v1beta8;
pub mod v1beta9;

pub use convert::IntoNext;
pub use one_of::OneOfError;

pub const LATEST: &str = latest::VERSION;
pub const KIND: &str = "Config";

#[derive(Error, Debug)]
pub enum Error {
    #[error("read document header: {0}")]
    Header(#[source] serde_yaml::Error),
    #[error("missing apiVersion")]
    MissingVersion,
    #[error("unrecognized apiVersion {0:?}")]
    UnrecognizedVersion(String),
    #[error("unsupported kind {0:?}, expected \"Config\"")]
    Kind(String),
    #[error("parse {version} document: {source}")]
    Parse {
        version: &'static str,
        source: serde_yaml::Error,
    },
    #[error("upgrade {from} to {to}: {source}")]
    Upgrade {
        from: &'static str,
        to: &'static str,
        source: UpgradeError,
    },
}

/// A value that can't be carried into the next version.
#[derive(Error, Debug)]
pub enum UpgradeError {
    #[error(transparent)]
    OneOf(#[from] OneOfError),
    #[error("unknown execution environment {name:?}")]
    UnknownExecutionEnvironment { name: String },
    #[error("decode {name} execution environment properties: {source}")]
    ExecutionEnvironmentProperties {
        name: String,
        source: serde_yaml::Error,
    },
    #[error("artifact {image:?}: unknown builder plugin {name:?}")]
    UnknownPlugin { image: String, name: String },
    #[error("artifact {image:?}: decode {plugin} plugin properties: {source}")]
    PluginProperties {
        image: String,
        plugin: String,
        source: serde_yaml::Error,
    },
    #[error("artifact {image:?}: {artifact_type} artifacts can't be built on the cluster")]
    ClusterArtifact {
        image: String,
        artifact_type: &'static str,
    },
    #[error("artifact {image:?}: cacheFrom is not supported by cluster builds")]
    ClusterCacheFrom { image: String },
    #[error("profile {profile:?}: kaniko settings need the profile to list its own artifacts")]
    KanikoProfileWithoutArtifacts { profile: String },
}

/// A conversion that went through but could not keep the old meaning exactly.
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    IncompatibleSyncPattern {
        image: String,
        profile: Option<String>,
        pattern: String,
        dest: String,
    },
}

impl Display for Warning {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Warning::IncompatibleSyncPattern {
                image,
                profile,
                pattern,
                dest,
            } => {
                write!(f, "artifact {image:?}")?;
                if let Some(profile) = profile {
                    write!(f, " (profile {profile:?})")?;
                }
                write!(
                    f,
                    ": sync pattern {pattern:?} -> {dest:?} flattens directories and can't be reproduced exactly"
                )
            }
        }
    }
}

/// A document decoded at the version it declares.
#[derive(Debug, Clone, PartialEq)]
pub enum VersionedConfig {
    V1beta6(v1beta6::Config),
    V1beta7(v1beta7::Config),
    V1beta8(v1beta8::Config),
    V1beta9(v1beta9::Config),
    V1beta10(v1beta10::Config),
    V1beta11(v1beta11::Config),
    V1beta12(v1beta12::Config),
    V1beta13(v1beta13::Config),
    V2alpha1(latest::Config),
}

macro_rules! impl_from_config {
    ($($variant:ident => $module:ident),* $(,)?) => {
        $(
            impl From<$module::Config> for VersionedConfig {
                fn from(config: $module::Config) -> Self {
                    VersionedConfig::$variant(config)
                }
            }
        )*
    };
}

impl_from_config!(
    V1beta6 => v1beta6,
    V1beta7 => v1beta7,
    V1beta8 => v1beta8,
    V1beta9 => v1beta9,
    V1beta10 => v1beta10,
    V1beta11 => v1beta11,
    V1beta12 => v1beta12,
    V1beta13 => v1beta13,
    V2alpha1 => latest,
);

impl VersionedConfig {
    pub fn api_version(&self) -> &'static str {
        match self {
            Self::V1beta6(_) => v1beta6::VERSION,
            Self::V1beta7(_) => v1beta7::VERSION,
            Self::V1beta8(_) => v1beta8::VERSION,
            Self::V1beta9(_) => v1beta9::VERSION,
            Self::V1beta10(_) => v1beta10::VERSION,
            Self::V1beta11(_) => v1beta11::VERSION,
            Self::V1beta12(_) => v1beta12::VERSION,
            Self::V1beta13(_) => v1beta13::VERSION,
            Self::V2alpha1(_) => latest::VERSION,
        }
    }

    /// Steps one version forward. The latest version upgrades to itself.
    pub fn upgrade(self, warnings: &mut Vec<Warning>) -> Result<Self, Error> {
        let from = self.api_version();
        let (to, upgraded) = match self {
            Self::V1beta6(c) => (v1beta7::VERSION, c.upgrade(warnings).map(Self::from)),
            Self::V1beta7(c) => (v1beta8::VERSION, c.upgrade(warnings).map(Self::from)),
            Self::V1beta8(c) => (v1beta9::VERSION, c.upgrade(warnings).map(Self::from)),
            Self::V1beta9(c) => (v1beta10::VERSION, c.upgrade(warnings).map(Self::from)),
            Self::V1beta10(c) => (v1beta11::VERSION, c.upgrade(warnings).map(Self::from)),
            Self::V1beta11(c) => (v1beta12::VERSION, c.upgrade(warnings).map(Self::from)),
            Self::V1beta12(c) => (v1beta13::VERSION, c.upgrade(warnings).map(Self::from)),
            Self::V1beta13(c) => (latest::VERSION, c.upgrade(warnings).map(Self::from)),
            Self::V2alpha1(c) => return Ok(Self::V2alpha1(c.upgrade())),
        };
        upgraded.map_err(|source| Error::Upgrade { from, to, source })
    }
}

pub struct SchemaVersion {
    pub api_version: &'static str,
    parse: fn(&[u8]) -> Result<VersionedConfig, serde_yaml::Error>,
}

impl SchemaVersion {
    /// Strictly decodes a document of this version.
    pub fn parse(&self, bytes: &[u8]) -> Result<VersionedConfig, Error> {
        (self.parse)(bytes).map_err(|source| Error::Parse {
            version: self.api_version,
            source,
        })
    }
}

fn parse_as<C>(bytes: &[u8]) -> Result<VersionedConfig, serde_yaml::Error>
where
    C: DeserializeOwned + Into<VersionedConfig>,
{
    serde_yaml::from_slice::<C>(bytes).map(Into::into)
}

/// Every known version, oldest first.
pub static SCHEMA_VERSIONS: &[SchemaVersion] = &[
    SchemaVersion {
        api_version: v1beta6::VERSION,
        parse: parse_as::<v1beta6::Config>,
    },
    SchemaVersion {
        api_version: v1beta7::VERSION,
        parse: parse_as::<v1beta7::Config>,
    },
    SchemaVersion {
        api_version: v1beta8::VERSION,
        parse: parse_as::<v1beta8::Config>,
    },
    SchemaVersion {
        api_version: v1beta9::VERSION,
        parse: parse_as::<v1beta9::Config>,
    },
    SchemaVersion {
        api_version: v1beta10::VERSION,
        parse: parse_as::<v1beta10::Config>,
    },
    SchemaVersion {
        api_version: v1beta11::VERSION,
        parse: parse_as::<v1beta11::Config>,
    },
    SchemaVersion {
        api_version: v1beta12::VERSION,
        parse: parse_as::<v1beta12::Config>,
    },
    SchemaVersion {
        api_version: v1beta13::VERSION,
        parse: parse_as::<v1beta13::Config>,
    },
    SchemaVersion {
        api_version: latest::VERSION,
        parse: parse_as::<latest::Config>,
    },
];

pub fn find(api_version: &str) -> Option<&'static SchemaVersion> {
    SCHEMA_VERSIONS.iter().find(|v| v.api_version == api_version)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentHeader {
    api_version: Option<String>,
    kind: Option<String>,
}

#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub struct Upgraded {
    pub config: latest::Config,
    /// Version the document was written against.
    pub from: &'static str,
    /// Lossy conversions made on the way. Callers must surface these.
    pub warnings: Vec<Warning>,
}

/// Decodes a document at its declared version and upgrades it to [`LATEST`].
pub fn parse_and_upgrade(bytes: &[u8]) -> Result<Upgraded, Error> {
    let header: DocumentHeader = serde_yaml::from_slice(bytes).map_err(Error::Header)?;
    let api_version = header.api_version.ok_or(Error::MissingVersion)?;
    if let Some(kind) = header.kind {
        if kind != KIND {
            return Err(Error::Kind(kind));
        }
    }
    let version = find(&api_version).ok_or(Error::UnrecognizedVersion(api_version))?;
    debug!("parsing {} document", version.api_version);

    let mut config = version.parse(bytes)?;
    let mut warnings = Vec::new();
    loop {
        config = match config {
            VersionedConfig::V2alpha1(config) => {
                return Ok(Upgraded {
                    config,
                    from: version.api_version,
                    warnings,
                })
            }
            older => {
                let from = older.api_version();
                let newer = older.upgrade(&mut warnings)?;
                debug!("upgraded from {} to {}", from, newer.api_version());
                newer
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn versions_are_unique_and_end_with_latest() {
        let mut seen: Vec<&str> = SCHEMA_VERSIONS.iter().map(|v| v.api_version).collect();
        assert_eq!(seen.last(), Some(&LATEST));
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), SCHEMA_VERSIONS.len());
    }

    #[test]
    fn find_known_and_unknown() {
        assert_eq!(find("skaffold/v1beta9").map(|v| v.api_version), Some(v1beta9::VERSION));
        assert!(find("skaffold/v9").is_none());
    }

    #[test]
    fn missing_version() {
        let err = parse_and_upgrade(b"kind: Config\n").unwrap_err();
        assert!(matches!(err, Error::MissingVersion), "{err}");
    }

    #[test]
    fn unrecognized_version() {
        let err = parse_and_upgrade(b"apiVersion: skaffold/v0\nkind: Config\n").unwrap_err();
        match err {
            Error::UnrecognizedVersion(v) => assert_eq!(v, "skaffold/v0"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn wrong_kind() {
        let err = parse_and_upgrade(b"apiVersion: skaffold/v2alpha1\nkind: Policy\n").unwrap_err();
        assert!(matches!(err, Error::Kind(ref k) if k == "Policy"), "{err}");
    }

    #[test]
    fn unknown_field_is_a_parse_error_naming_the_field() {
        let doc = "apiVersion: skaffold/v1beta6\nkind: Config\nbuild:\n  artifacts:\n  - imageName: app\n";
        let err = parse_and_upgrade(doc.as_bytes()).unwrap_err();
        match &err {
            Error::Parse { version, .. } => assert_eq!(*version, v1beta6::VERSION),
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("imageName"), "{err}");

        let doc = "apiVersion: skaffold/v1beta8\nkind: Config\nbuild:\n  artifacts:\n  - image: app\n    plugin: {}\n";
        let err = parse_and_upgrade(doc.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Parse { version, .. } if version == v1beta8::VERSION));
    }

    #[test]
    fn field_from_a_newer_version_is_rejected() {
        let doc = "apiVersion: skaffold/v1beta11\nkind: Config\nmetadata:\n  name: app\n";
        assert!(matches!(
            parse_and_upgrade(doc.as_bytes()),
            Err(Error::Parse { .. })
        ));
    }

    #[test]
    fn latest_is_a_fixed_point() {
        let doc = "apiVersion: skaffold/v2alpha1\nkind: Config\nbuild:\n  artifacts:\n  - image: app\n    docker:\n      dockerfile: Dockerfile.dev\n";
        let upgraded = parse_and_upgrade(doc.as_bytes()).unwrap();
        assert_eq!(upgraded.from, LATEST);
        assert!(upgraded.warnings.is_empty());

        let mut warnings = vec![];
        let again = VersionedConfig::from(upgraded.config.clone())
            .upgrade(&mut warnings)
            .unwrap();
        assert_eq!(again, VersionedConfig::V2alpha1(upgraded.config));
        assert!(warnings.is_empty());
    }

    #[test]
    fn oldest_document_reaches_latest() {
        let doc = r#"
apiVersion: skaffold/v1beta6
kind: Config
build:
  artifacts:
  - image: app
    plugin:
      name: docker
      properties:
        dockerfile: Dockerfile.app
  local:
    push: false
deploy:
  kustomize:
    path: overlays/dev
"#;
        let upgraded = parse_and_upgrade(doc.as_bytes()).unwrap();
        assert_eq!(upgraded.from, v1beta6::VERSION);
        let config = upgraded.config;
        assert_eq!(config.api_version, LATEST);
        assert_eq!(config.build.artifacts[0].image, "app");
        assert_eq!(
            config.build.artifacts[0].artifact_type,
            Some(latest::ArtifactType::Docker(latest::DockerArtifact {
                dockerfile: "Dockerfile.app".into(),
                ..Default::default()
            }))
        );
        assert_eq!(
            config.build.build_type,
            Some(latest::BuildType::Local(latest::LocalBuild {
                push: Some(false),
                ..Default::default()
            }))
        );
        assert_eq!(
            config.deploy.deploy_type,
            Some(latest::DeployType::Kustomize(latest::KustomizeDeploy {
                paths: vec!["overlays/dev".into()],
                ..Default::default()
            }))
        );
    }

    #[test]
    fn failing_step_is_annotated_with_the_version_pair() {
        let doc = r#"
apiVersion: skaffold/v1beta7
kind: Config
build:
  artifacts:
  - image: app
    plugin:
      name: docker
      properties:
        dockerfilePath: Dockerfile
"#;
        match parse_and_upgrade(doc.as_bytes()).unwrap_err() {
            Error::Upgrade { from, to, source } => {
                assert_eq!(from, v1beta7::VERSION);
                assert_eq!(to, v1beta8::VERSION);
                assert!(matches!(source, UpgradeError::PluginProperties { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn warnings_survive_the_whole_chain() {
        let doc = r#"
apiVersion: skaffold/v1beta9
kind: Config
build:
  artifacts:
  - image: app
    sync:
      "src/**/nested/*.js": /app
"#;
        let upgraded = parse_and_upgrade(doc.as_bytes()).unwrap();
        assert_eq!(
            upgraded.warnings,
            vec![Warning::IncompatibleSyncPattern {
                image: "app".into(),
                profile: None,
                pattern: "src/**/nested/*.js".into(),
                dest: "/app".into(),
            }]
        );
    }

    #[test]
    fn warning_message_names_profile() {
        let warning = Warning::IncompatibleSyncPattern {
            image: "app".into(),
            profile: Some("dev".into()),
            pattern: "a/**/b/*.js".into(),
            dest: ".".into(),
        };
        let message = warning.to_string();
        assert!(message.contains("\"app\""));
        assert!(message.contains("profile \"dev\""));
        assert!(message.contains("a/**/b/*.js"));
    }
}
