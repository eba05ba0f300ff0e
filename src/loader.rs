//! Reading a configuration file into its final, effective form.

use log::debug;
use thiserror::Error;

use crate::config::Defaults;
use crate::defaults;
use crate::profiles::{self, ActivationContext};
use crate::schema::{self, latest::Config, Warning};

#[derive(Error, Debug)]
pub enum Error {
    #[error("read {path}: {err}")]
    ReadFile { err: std::io::Error, path: String },

    #[error("{0}")]
    Schema(#[from] schema::Error),

    #[error("lossy upgrade: {}", .0.iter().map(Warning::to_string).collect::<Vec<_>>().join("; "))]
    Lossy(Vec<Warning>),

    #[error("{0}")]
    Profiles(#[from] profiles::Error),
}

#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Profiles requested by name. A `-` prefix keeps one from auto-activating.
    pub profiles: Vec<String>,
    pub activation: ActivationContext,
    pub defaults: Defaults,
    pub skip_defaults: bool,
    /// Refuse documents that could only be upgraded with warnings.
    pub fail_on_warnings: bool,
}

#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded {
    pub config: Config,
    pub from: &'static str,
    pub warnings: Vec<Warning>,
    /// Profiles applied, in order.
    pub profiles: Vec<String>,
}

pub fn load(path: &str, options: &LoadOptions) -> Result<Loaded, Error> {
    let bytes = std::fs::read(path).map_err(|err| Error::ReadFile {
        err,
        path: path.to_string(),
    })?;
    debug!("loading {}", path);
    load_bytes(&bytes, options)
}

pub fn load_bytes(bytes: &[u8], options: &LoadOptions) -> Result<Loaded, Error> {
    let upgraded = schema::parse_and_upgrade(bytes)?;
    if options.fail_on_warnings && !upgraded.warnings.is_empty() {
        return Err(Error::Lossy(upgraded.warnings));
    }

    let profiles =
        profiles::activated_profiles(&upgraded.config, &options.profiles, &options.activation)?;
    let mut config = profiles::apply_profiles(&upgraded.config, &profiles)?;
    if !options.skip_defaults {
        defaults::set(&mut config, &options.defaults);
    }

    Ok(Loaded {
        config,
        from: upgraded.from,
        warnings: upgraded.warnings,
        profiles,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::latest::{BuildType, DeployType, GoogleCloudBuild, LocalBuild};
    use pretty_assertions::assert_eq;

    const DOC: &str = r#"
apiVersion: skaffold/v1beta9
kind: Config
build:
  artifacts:
  - image: app
    sync:
      "src/**/*.js": /app
deploy:
  kubectl: {}
profiles:
- name: gcb
  build:
    googleCloudBuild:
      projectId: my-project
"#;

    #[test]
    fn defaults_and_warnings() {
        let loaded = load_bytes(DOC.as_bytes(), &LoadOptions::default()).unwrap();
        assert_eq!(loaded.from, "skaffold/v1beta9");
        assert_eq!(loaded.warnings.len(), 1);
        assert!(loaded.profiles.is_empty());
        assert_eq!(
            loaded.config.build.build_type,
            Some(BuildType::Local(LocalBuild::default()))
        );
        match &loaded.config.deploy.deploy_type {
            Some(DeployType::Kubectl(kubectl)) => assert_eq!(kubectl.manifests, vec!["k8s/*.yaml"]),
            other => panic!("unexpected deploy type {other:?}"),
        }
        assert_eq!(loaded.config.profiles.len(), 1);
    }

    #[test]
    fn skip_defaults() {
        let options = LoadOptions {
            skip_defaults: true,
            ..Default::default()
        };
        let loaded = load_bytes(DOC.as_bytes(), &options).unwrap();
        assert_eq!(loaded.config.build.build_type, None);
        assert_eq!(loaded.config.build.tag_policy, None);
    }

    #[test]
    fn requested_profile() {
        let options = LoadOptions {
            profiles: vec!["gcb".into()],
            ..Default::default()
        };
        let loaded = load_bytes(DOC.as_bytes(), &options).unwrap();
        assert_eq!(loaded.profiles, vec!["gcb"]);
        assert!(loaded.config.profiles.is_empty());
        assert_eq!(
            loaded.config.build.build_type,
            Some(BuildType::GoogleCloudBuild(GoogleCloudBuild {
                project_id: "my-project".into(),
                docker_image: "gcr.io/cloud-builders/docker".into(),
                ..Default::default()
            }))
        );
    }

    #[test]
    fn fail_on_warnings() {
        let options = LoadOptions {
            fail_on_warnings: true,
            ..Default::default()
        };
        match load_bytes(DOC.as_bytes(), &options) {
            Err(Error::Lossy(warnings)) => assert_eq!(warnings.len(), 1),
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn unknown_profile() {
        let options = LoadOptions {
            profiles: vec!["prod".into()],
            ..Default::default()
        };
        assert!(matches!(
            load_bytes(DOC.as_bytes(), &options),
            Err(Error::Profiles(profiles::Error::NotFound(_)))
        ));
    }

    #[test]
    fn schema_errors_pass_through() {
        assert!(matches!(
            load_bytes(b"kind: Config\n", &LoadOptions::default()),
            Err(Error::Schema(schema::Error::MissingVersion))
        ));
    }
}
