use serde::de::DeserializeOwned;

use super::*;
use crate::schema::v1beta8 as next;
use crate::schema::{IntoNext, OneOfError, UpgradeError, Warning};

carry_over!(next =>
    TagPolicy { git_commit, sha256, env_template, date_time },
    GitTagger {},
    ShaTagger {},
    EnvTemplateTagger { template },
    DateTimeTagger { format, timezone },
    LocalBuild { push, use_docker_cli, use_buildkit },
    GoogleCloudBuild { project_id, disk_size_gb, machine_type, timeout, docker_image, maven_image, gradle_image },
    KanikoBuildContext { gcs_bucket, local_dir },
    LocalDir {},
    KanikoCache { repo },
    KanikoBuild { build_context, cache, flags, pull_secret, pull_secret_name, namespace, timeout, image, docker_config },
    DockerConfig { path, secret_name },
    TestCase { image, structure_tests },
    DeployConfig { helm, kubectl, kustomize },
    KubectlDeploy { manifests, remote_manifests, flags },
    KubectlFlags { global, apply, delete },
    HelmDeploy { releases, flags },
    HelmDeployFlags { global, install, upgrade },
    KustomizeDeploy { path, flags },
    HelmRelease {
        name, chart_path, values_files, values, namespace, version, set_values, set_value_templates,
        wait, recreate_pods, skip_build_dependencies, overrides, packaged, image_strategy
    },
    HelmPackaged { version, app_version },
    HelmImageStrategy { fqn, helm },
    HelmFqnConfig { property },
    HelmConventionConfig {},
    JsonPatch { op, path, from, value },
    Activation { env, kube_context, command },
    DockerArtifact { dockerfile, target, build_args, cache_from },
    BazelArtifact { target, args },
    JibMavenArtifact { module, profile, args },
    JibGradleArtifact { project, args },
);

const ARTIFACT_TYPES: &[&str] = &["docker", "bazel", "jibMaven", "jibGradle", "plugin"];
const BUILD_TYPES: &[&str] = &["local", "googleCloudBuild", "kaniko", "executionEnvironment"];

impl Config {
    /// Unwinds builder plugins and execution environments into the concrete
    /// artifact and build types they name.
    pub fn upgrade(self, _warnings: &mut Vec<Warning>) -> Result<next::Config, UpgradeError> {
        let Config {
            api_version: _,
            kind,
            build,
            test,
            deploy,
            profiles,
        } = self;
        Ok(next::Config {
            api_version: next::VERSION.to_string(),
            kind,
            build: upgrade_build(build)?,
            test: test.into_next(),
            deploy: deploy.into_next(),
            profiles: profiles
                .into_iter()
                .map(upgrade_profile)
                .collect::<Result<_, _>>()?,
        })
    }
}

fn upgrade_profile(profile: Profile) -> Result<next::Profile, UpgradeError> {
    let Profile {
        name,
        build,
        test,
        deploy,
        patches,
        activation,
    } = profile;
    Ok(next::Profile {
        name,
        build: upgrade_build(build)?,
        test: test.into_next(),
        deploy: deploy.into_next(),
        patches: patches.into_next(),
        activation: activation.into_next(),
    })
}

fn upgrade_build(build: BuildConfig) -> Result<next::BuildConfig, UpgradeError> {
    let BuildConfig {
        artifacts,
        tag_policy,
        execution_environment,
        local,
        google_cloud_build,
        kaniko,
    } = build;
    let mut upgraded = next::BuildConfig {
        artifacts: artifacts
            .into_iter()
            .map(upgrade_artifact)
            .collect::<Result<_, _>>()?,
        tag_policy: tag_policy.into_next(),
        local: local.into_next(),
        google_cloud_build: google_cloud_build.into_next(),
        kaniko: kaniko.into_next(),
    };
    let Some(ExecutionEnvironment { name, properties }) = execution_environment else {
        return Ok(upgraded);
    };

    let inline: Vec<&'static str> = [
        upgraded.local.is_some(),
        upgraded.google_cloud_build.is_some(),
        upgraded.kaniko.is_some(),
    ]
    .into_iter()
    .zip(BUILD_TYPES)
    .filter_map(|(set, key)| set.then_some(*key))
    .collect();
    if !inline.is_empty() {
        let mut found = inline;
        found.push("executionEnvironment");
        return Err(OneOfError {
            group: "BuildType",
            choices: BUILD_TYPES,
            found,
        }
        .into());
    }

    let properties_error = |source| UpgradeError::ExecutionEnvironmentProperties {
        name: name.clone(),
        source,
    };
    match name.as_str() {
        "local" => upgraded.local = Some(decode(properties).map_err(properties_error)?),
        "googleCloudBuild" => {
            upgraded.google_cloud_build = Some(decode(properties).map_err(properties_error)?)
        }
        _ => return Err(UpgradeError::UnknownExecutionEnvironment { name }),
    }
    Ok(upgraded)
}

fn upgrade_artifact(artifact: Artifact) -> Result<next::Artifact, UpgradeError> {
    let Artifact {
        image,
        context,
        sync,
        docker,
        bazel,
        jib_maven,
        jib_gradle,
        plugin,
    } = artifact;
    let mut upgraded = next::Artifact {
        image,
        context,
        sync,
        docker: docker.into_next(),
        bazel: bazel.into_next(),
        jib_maven: jib_maven.into_next(),
        jib_gradle: jib_gradle.into_next(),
    };
    let Some(BuilderPlugin { name, properties }) = plugin else {
        return Ok(upgraded);
    };

    let concrete: Vec<&'static str> = [
        upgraded.docker.is_some(),
        upgraded.bazel.is_some(),
        upgraded.jib_maven.is_some(),
        upgraded.jib_gradle.is_some(),
    ]
    .into_iter()
    .zip(ARTIFACT_TYPES)
    .filter_map(|(set, key)| set.then_some(*key))
    .collect();
    if !concrete.is_empty() {
        let mut found = concrete;
        found.push("plugin");
        return Err(OneOfError {
            group: "ArtifactType",
            choices: ARTIFACT_TYPES,
            found,
        }
        .into());
    }

    let properties_error = |source| UpgradeError::PluginProperties {
        image: upgraded.image.clone(),
        plugin: name.clone(),
        source,
    };
    match name.as_str() {
        "docker" => upgraded.docker = Some(decode(properties).map_err(properties_error)?),
        "bazel" => upgraded.bazel = Some(decode(properties).map_err(properties_error)?),
        _ => {
            return Err(UpgradeError::UnknownPlugin {
                image: upgraded.image,
                name,
            })
        }
    }
    Ok(upgraded)
}

/// Decodes free-form properties strictly through the concrete type.
fn decode<T: DeserializeOwned>(
    properties: BTreeMap<String, serde_yaml::Value>,
) -> Result<T, serde_yaml::Error> {
    let mapping: serde_yaml::Mapping = properties
        .into_iter()
        .map(|(key, value)| (serde_yaml::Value::String(key), value))
        .collect();
    serde_yaml::from_value(serde_yaml::Value::Mapping(mapping))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn upgrade(doc: &str) -> Result<next::Config, UpgradeError> {
        let config: Config = serde_yaml::from_str(doc).unwrap();
        config.upgrade(&mut vec![])
    }

    #[test]
    fn plugins_become_concrete_types() {
        let doc = r#"
apiVersion: skaffold/v1beta7
kind: Config
build:
  tagPolicy:
    sha256: {}
  artifacts:
  - image: gcr.io/k8s-skaffold/docker
    plugin:
      name: docker
      properties:
        dockerfile: path/to/Dockerfile
        buildArgs:
          PROXY: null
  - image: gcr.io/k8s-skaffold/bazel
    context: ./examples/bazel
    plugin:
      name: bazel
      properties:
        target: //:skaffold_example.tar
  - image: gcr.io/k8s-skaffold/jib
    jibMaven:
      module: server
deploy:
  kubectl:
    manifests:
    - k8s/*
profiles:
- name: gcb
  build:
    artifacts:
    - image: gcr.io/k8s-skaffold/bazel
      plugin:
        name: bazel
        properties:
          target: //:gcb.tar
    googleCloudBuild:
      projectId: my-project
"#;
        let expected = r#"
apiVersion: skaffold/v1beta8
kind: Config
build:
  tagPolicy:
    sha256: {}
  artifacts:
  - image: gcr.io/k8s-skaffold/docker
    docker:
      dockerfile: path/to/Dockerfile
      buildArgs:
        PROXY: null
  - image: gcr.io/k8s-skaffold/bazel
    context: ./examples/bazel
    bazel:
      target: //:skaffold_example.tar
  - image: gcr.io/k8s-skaffold/jib
    jibMaven:
      module: server
deploy:
  kubectl:
    manifests:
    - k8s/*
profiles:
- name: gcb
  build:
    artifacts:
    - image: gcr.io/k8s-skaffold/bazel
      bazel:
        target: //:gcb.tar
    googleCloudBuild:
      projectId: my-project
"#;
        let expected: next::Config = serde_yaml::from_str(expected).unwrap();
        assert_eq!(upgrade(doc).unwrap(), expected);
    }

    #[test]
    fn execution_environment_becomes_build_type() {
        let doc = r#"
build:
  executionEnvironment:
    name: googleCloudBuild
    properties:
      projectId: k8s-skaffold
      diskSizeGb: 100
profiles:
- name: local
  build:
    executionEnvironment:
      name: local
      properties:
        push: false
"#;
        let upgraded = upgrade(doc).unwrap();
        assert_eq!(
            upgraded.build.google_cloud_build,
            Some(next::GoogleCloudBuild {
                project_id: "k8s-skaffold".into(),
                disk_size_gb: 100,
                ..Default::default()
            })
        );
        assert_eq!(
            upgraded.profiles[0].build.local,
            Some(next::LocalBuild {
                push: Some(false),
                ..Default::default()
            })
        );
    }

    #[test]
    fn execution_environment_without_properties() {
        let upgraded = upgrade("build:\n  executionEnvironment:\n    name: local\n").unwrap();
        assert_eq!(upgraded.build.local, Some(next::LocalBuild::default()));
    }

    #[test]
    fn execution_environment_next_to_build_type_is_ambiguous() {
        let doc = "build:\n  executionEnvironment:\n    name: local\n  kaniko: {}\n";
        match upgrade(doc).unwrap_err() {
            UpgradeError::OneOf(err) => {
                assert_eq!(err.group, "BuildType");
                assert_eq!(err.found, vec!["kaniko", "executionEnvironment"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_execution_environment() {
        let doc = "build:\n  executionEnvironment:\n    name: minikube\n";
        match upgrade(doc).unwrap_err() {
            UpgradeError::UnknownExecutionEnvironment { name } => assert_eq!(name, "minikube"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn undecodable_execution_environment_properties() {
        let doc = r#"
build:
  executionEnvironment:
    name: googleCloudBuild
    properties:
      project: k8s-skaffold
"#;
        assert!(matches!(
            upgrade(doc).unwrap_err(),
            UpgradeError::ExecutionEnvironmentProperties { ref name, .. } if name == "googleCloudBuild"
        ));
    }

    #[test]
    fn unknown_plugin() {
        let doc = r#"
build:
  artifacts:
  - image: app
    plugin:
      name: buildpacks
"#;
        match upgrade(doc).unwrap_err() {
            UpgradeError::UnknownPlugin { image, name } => {
                assert_eq!(image, "app");
                assert_eq!(name, "buildpacks");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn undecodable_properties() {
        let doc = r#"
build:
  artifacts:
  - image: app
    plugin:
      name: bazel
      properties:
        target: [not, a, string]
"#;
        assert!(matches!(
            upgrade(doc).unwrap_err(),
            UpgradeError::PluginProperties { ref plugin, .. } if plugin == "bazel"
        ));
    }

    #[test]
    fn plugin_next_to_concrete_type_is_ambiguous() {
        let doc = r#"
build:
  artifacts:
  - image: app
    bazel:
      target: //:app.tar
    plugin:
      name: docker
"#;
        match upgrade(doc).unwrap_err() {
            UpgradeError::OneOf(err) => assert_eq!(err.found, vec!["bazel", "plugin"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn docker_plugin_without_properties() {
        let doc = r#"
build:
  artifacts:
  - image: app
    plugin:
      name: docker
"#;
        let upgraded = upgrade(doc).unwrap();
        assert_eq!(
            upgraded.build.artifacts[0].docker,
            Some(next::DockerArtifact::default())
        );
    }
}
