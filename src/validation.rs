//! Semantic checks on an upgraded configuration.
//!
//! Decoding already rejects unknown fields and conflicting alternatives.
//! What remains are the rules that span several parts of the document.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::schema::latest::{Artifact, ArtifactType, BuildType, Config, PortForwardResource, Sync};

const PORT_FORWARD_RESOURCE_TYPES: &[&str] = &[
    "pod",
    "deployment",
    "service",
    "replicaset",
    "replicationcontroller",
    "statefulset",
    "daemonset",
    "cronjob",
    "job",
];

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("duplicate image {0:?}: artifact image names must be unique")]
    DuplicateImage(String),
    #[error("unknown build dependency {dependency:?} for artifact {image:?}")]
    UnknownDependency { image: String, dependency: String },
    #[error("cycle detected in build dependencies involving {0:?}")]
    Cycle(String),
    #[error("invalid build dependency for artifact {image:?}: alias {alias:?} repeated")]
    RepeatedAlias { image: String, alias: String },
    #[error("invalid build dependency for artifact {image:?}: alias {alias:?} doesn't match required pattern [a-zA-Z_][a-zA-Z0-9_]*")]
    InvalidAlias { image: String, alias: String },
    #[error("artifact {0:?} is a kaniko artifact, which needs the cluster build type")]
    KanikoWithoutCluster(String),
    #[error("artifact {image:?} has a manual sync rule without {field}")]
    IncompleteSyncRule { image: String, field: &'static str },
    #[error("sync rule pattern {src:?} does not have prefix {strip:?}")]
    SyncStrip { src: String, strip: String },
    #[error("{0} is not a valid resource type for port forwarding")]
    PortForwardResourceType(String),
}

/// Returns every problem found, in document order.
pub fn validate(config: &Config) -> Vec<Error> {
    let artifacts = &config.build.artifacts;
    let mut errors = vec![];
    errors.extend(unique_images(artifacts));
    errors.extend(unique_aliases(artifacts));
    errors.extend(acyclic_dependencies(artifacts));
    errors.extend(valid_aliases(artifacts));
    errors.extend(kaniko_needs_cluster(config));
    errors.extend(sync_rules(artifacts));
    errors.extend(port_forward_resources(&config.port_forward));
    errors
}

fn unique_images(artifacts: &[Artifact]) -> Vec<Error> {
    let mut seen = BTreeSet::new();
    let mut reported = BTreeSet::new();
    let mut errors = vec![];
    for artifact in artifacts {
        let image = artifact.image.as_str();
        if !seen.insert(image) && reported.insert(image) {
            errors.push(Error::DuplicateImage(image.to_string()));
        }
    }
    errors
}

fn unique_aliases(artifacts: &[Artifact]) -> Vec<Error> {
    let mut errors = vec![];
    for artifact in artifacts {
        let mut seen = BTreeSet::new();
        let mut reported = BTreeSet::new();
        for dependency in &artifact.requires {
            let alias = dependency.alias.as_str();
            if !seen.insert(alias) && reported.insert(alias) {
                errors.push(Error::RepeatedAlias {
                    image: artifact.image.clone(),
                    alias: alias.to_string(),
                });
            }
        }
    }
    errors
}

/// Stops at the first unknown dependency or cycle.
fn acyclic_dependencies(artifacts: &[Artifact]) -> Vec<Error> {
    let by_image: BTreeMap<&str, &Artifact> =
        artifacts.iter().map(|a| (a.image.as_str(), a)).collect();
    let mut visited = BTreeSet::new();
    for artifact in artifacts {
        let mut marked = BTreeSet::new();
        if let Err(err) = dfs(artifact, &by_image, &mut visited, &mut marked) {
            return vec![err];
        }
    }
    vec![]
}

fn dfs<'a>(
    artifact: &'a Artifact,
    by_image: &BTreeMap<&str, &'a Artifact>,
    visited: &mut BTreeSet<&'a str>,
    marked: &mut BTreeSet<&'a str>,
) -> Result<(), Error> {
    let image = artifact.image.as_str();
    if marked.contains(image) {
        return Err(Error::Cycle(image.to_string()));
    }
    if !visited.insert(image) {
        return Ok(());
    }
    marked.insert(image);
    for dependency in &artifact.requires {
        let required = by_image
            .get(dependency.image.as_str())
            .ok_or_else(|| Error::UnknownDependency {
                image: image.to_string(),
                dependency: dependency.image.clone(),
            })?;
        dfs(required, by_image, visited, marked)?;
    }
    marked.remove(image);
    Ok(())
}

fn valid_aliases(artifacts: &[Artifact]) -> Vec<Error> {
    artifacts
        .iter()
        .filter(|a| {
            matches!(
                a.artifact_type,
                Some(ArtifactType::Docker(_)) | Some(ArtifactType::Custom(_))
            )
        })
        .flat_map(|a| {
            a.requires
                .iter()
                .filter(|d| !is_identifier(&d.alias))
                .map(|d| Error::InvalidAlias {
                    image: a.image.clone(),
                    alias: d.alias.clone(),
                })
        })
        .collect()
}

static IDENTIFIER: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new("^[a-zA-Z_][a-zA-Z0-9_]*$"));

fn is_identifier(alias: &str) -> bool {
    IDENTIFIER.as_ref().is_ok_and(|re| re.is_match(alias))
}

fn kaniko_needs_cluster(config: &Config) -> Vec<Error> {
    if matches!(config.build.build_type, Some(BuildType::Cluster(_))) {
        return vec![];
    }
    config
        .build
        .artifacts
        .iter()
        .filter(|a| matches!(a.artifact_type, Some(ArtifactType::Kaniko(_))))
        .map(|a| Error::KanikoWithoutCluster(a.image.clone()))
        .collect()
}

fn sync_rules(artifacts: &[Artifact]) -> Vec<Error> {
    let mut errors = vec![];
    for artifact in artifacts {
        let Some(Sync::Manual(rules)) = &artifact.sync else {
            continue;
        };
        for rule in rules {
            if rule.src.is_empty() {
                errors.push(Error::IncompleteSyncRule {
                    image: artifact.image.clone(),
                    field: "src",
                });
            }
            if rule.dest.is_empty() {
                errors.push(Error::IncompleteSyncRule {
                    image: artifact.image.clone(),
                    field: "dest",
                });
            }
            if !rule.src.starts_with(&rule.strip) {
                errors.push(Error::SyncStrip {
                    src: rule.src.clone(),
                    strip: rule.strip.clone(),
                });
            }
        }
    }
    errors
}

fn port_forward_resources(resources: &[PortForwardResource]) -> Vec<Error> {
    resources
        .iter()
        .filter(|r| !PORT_FORWARD_RESOURCE_TYPES.contains(&r.resource_type.to_lowercase().as_str()))
        .map(|r| Error::PortForwardResourceType(r.resource_type.clone()))
        .collect()
}
