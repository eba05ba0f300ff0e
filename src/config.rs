use serde::Deserialize;
use serde_inline_default::serde_inline_default;
use thiserror::Error;

const DEFAULT_CONFIG: &str = include_str!("../default.toml");

#[derive(Error, Debug)]
pub enum Error {
    #[error("read {path}: {err}")]
    ReadFile { err: std::io::Error, path: String },
    #[error("parse {path}: {err}")]
    Parse { err: toml::de::Error, path: String },
}

/// A skfix.toml file.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct File {
    pub description: Option<String>,
    #[serde(default = "Default::default")]
    pub defaults: Defaults,
    #[serde(default = "Default::default")]
    pub upgrade: Upgrade,
}

impl Default for File {
    fn default() -> Self {
        // The default config is compiled into the program, so
        // make sure to test default() to catch panics compile-time.
        toml::from_str(DEFAULT_CONFIG).unwrap()
    }
}

impl File {
    /// Reads a user configuration file and layers it over the built-in one.
    pub fn default_with_user_config_file(path: &str) -> Result<Self, Error> {
        let user = std::fs::read_to_string(path).map_err(|err| Error::ReadFile {
            err,
            path: path.to_string(),
        })?;
        Self::default_with_user_config(&user).map_err(|err| Error::Parse {
            err,
            path: path.to_string(),
        })
    }

    pub fn default_with_user_config(user: &str) -> Result<Self, toml::de::Error> {
        let mut base: toml::Table = toml::from_str(DEFAULT_CONFIG)?;
        let user: toml::Table = toml::from_str(user)?;
        merge(&mut base, user);
        toml::Value::Table(base).try_into()
    }
}

/// Tables are merged key by key, anything else is replaced.
fn merge(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        if let (Some(toml::Value::Table(existing)), toml::Value::Table(nested)) =
            (base.get_mut(&key), &value)
        {
            merge(existing, nested.clone());
            continue;
        }
        base.insert(key, value);
    }
}

/// Values filled into unset fields of a loaded configuration.
#[serde_inline_default]
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Defaults {
    #[serde_inline_default(".".to_string())]
    pub workspace: String,
    #[serde_inline_default("Dockerfile".to_string())]
    pub dockerfile: String,
    #[serde_inline_default(vec!["k8s/*.yaml".to_string()])]
    pub kubectl_manifests: Vec<String>,
    #[serde_inline_default(".".to_string())]
    pub kustomize_path: String,
    #[serde_inline_default("gcr.io/cloud-builders/docker".to_string())]
    pub cloud_build_docker_image: String,
    #[serde_inline_default("gcr.io/kaniko-project/executor:v0.10.0".to_string())]
    pub kaniko_image: String,
    #[serde_inline_default("default".to_string())]
    pub cluster_namespace: String,
    #[serde_inline_default("20m".to_string())]
    pub cluster_timeout: String,
    #[serde_inline_default("kaniko-secret".to_string())]
    pub cluster_pull_secret_name: String,
    #[serde_inline_default("project.toml".to_string())]
    pub buildpacks_project_descriptor: String,
    #[serde_inline_default(vec![".".to_string()])]
    pub custom_dependency_paths: Vec<String>,
}

impl Default for Defaults {
    fn default() -> Self {
        toml::from_str("").unwrap()
    }
}

#[serde_inline_default]
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Upgrade {
    /// Treat lossy conversions as errors.
    #[serde_inline_default(false)]
    pub fail_on_lossy_sync: bool,
}

impl Default for Upgrade {
    fn default() -> Self {
        toml::from_str("").unwrap()
    }
}

#[cfg(test)]
pub mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    pub fn load_default_configuration() {
        let cfg = File::default();
        assert_eq!(cfg.description, Some("Default configuration file".into()));
        assert_eq!(cfg.defaults, Defaults::default());
        assert!(!cfg.upgrade.fail_on_lossy_sync);
    }

    #[test]
    pub fn inline_defaults() {
        let defaults = Defaults::default();
        assert_eq!(defaults.workspace, ".");
        assert_eq!(defaults.dockerfile, "Dockerfile");
        assert_eq!(defaults.kubectl_manifests, vec!["k8s/*.yaml"]);
        assert_eq!(defaults.custom_dependency_paths, vec!["."]);
    }

    #[test]
    pub fn user_file_overrides_single_keys() {
        let cfg = File::default_with_user_config(
            r#"
[defaults]
dockerfile = "Containerfile"

[upgrade]
fail_on_lossy_sync = true
"#,
        )
        .unwrap();
        assert_eq!(cfg.defaults.dockerfile, "Containerfile");
        assert_eq!(cfg.defaults.workspace, ".");
        assert!(cfg.upgrade.fail_on_lossy_sync);
        assert_eq!(cfg.description, Some("Default configuration file".into()));
    }

    #[test]
    pub fn unreadable_user_file() {
        let err = File::default_with_user_config_file("/nonexistent/skfix.toml").unwrap_err();
        assert!(matches!(err, Error::ReadFile { ref path, .. } if path == "/nonexistent/skfix.toml"));
    }

    #[test]
    pub fn invalid_user_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"[defaults]\nworkspace = 3\n").unwrap();
        let path = file.path().to_str().unwrap().to_string();
        assert!(matches!(
            File::default_with_user_config_file(&path),
            Err(Error::Parse { .. })
        ));
    }
}
