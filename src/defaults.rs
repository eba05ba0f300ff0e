//! Filling unset fields of a loaded configuration.

use crate::config::Defaults;
use crate::schema::latest::{
    Artifact, ArtifactType, BuildType, Config, CustomDependencies, DeployType, DockerArtifact,
    GitTagger, KubectlDeploy, LocalBuild, TagPolicy,
};

fn set_if_empty(value: &mut String, default: &str) {
    if value.is_empty() {
        *value = default.to_string();
    }
}

pub fn set(config: &mut Config, defaults: &Defaults) {
    let build = &mut config.build;
    if build.tag_policy.is_none() {
        build.tag_policy = Some(TagPolicy::GitCommit(GitTagger::default()));
    }
    match build
        .build_type
        .get_or_insert_with(|| BuildType::Local(LocalBuild::default()))
    {
        BuildType::Local(_) => {}
        BuildType::GoogleCloudBuild(gcb) => {
            set_if_empty(&mut gcb.docker_image, &defaults.cloud_build_docker_image)
        }
        BuildType::Cluster(cluster) => {
            set_if_empty(&mut cluster.namespace, &defaults.cluster_namespace);
            set_if_empty(&mut cluster.timeout, &defaults.cluster_timeout);
            set_if_empty(&mut cluster.pull_secret_name, &defaults.cluster_pull_secret_name);
        }
    }
    for artifact in &mut build.artifacts {
        set_artifact(artifact, defaults);
    }

    let deploy_type = config
        .deploy
        .deploy_type
        .get_or_insert_with(|| DeployType::Kubectl(KubectlDeploy::default()));
    match deploy_type {
        DeployType::Kubectl(kubectl) if kubectl.manifests.is_empty() => {
            kubectl.manifests = defaults.kubectl_manifests.clone()
        }
        DeployType::Kustomize(kustomize) if kustomize.paths.is_empty() => {
            kustomize.paths = vec![defaults.kustomize_path.clone()]
        }
        _ => {}
    }
}

fn set_artifact(artifact: &mut Artifact, defaults: &Defaults) {
    set_if_empty(&mut artifact.context, &defaults.workspace);
    match artifact
        .artifact_type
        .get_or_insert_with(|| ArtifactType::Docker(DockerArtifact::default()))
    {
        ArtifactType::Docker(docker) => set_if_empty(&mut docker.dockerfile, &defaults.dockerfile),
        ArtifactType::Kaniko(kaniko) => {
            set_if_empty(&mut kaniko.dockerfile, &defaults.dockerfile);
            set_if_empty(&mut kaniko.image, &defaults.kaniko_image);
        }
        ArtifactType::Buildpacks(buildpacks) => set_if_empty(
            &mut buildpacks.project_descriptor,
            &defaults.buildpacks_project_descriptor,
        ),
        ArtifactType::Custom(custom) => {
            let dependencies = custom.dependencies.get_or_insert_with(CustomDependencies::default);
            let unset = dependencies.dockerfile.is_none()
                && dependencies.command.is_empty()
                && dependencies.paths.is_empty();
            if unset {
                dependencies.paths = defaults.custom_dependency_paths.clone();
            }
        }
        ArtifactType::Bazel(_) | ArtifactType::Jib(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::latest::{ClusterDetails, CustomArtifact, KanikoArtifact, KustomizeDeploy};
    use pretty_assertions::assert_eq;

    fn defaulted(doc: &str) -> Config {
        let mut config: Config = serde_yaml::from_str(doc).unwrap();
        set(&mut config, &Defaults::default());
        config
    }

    #[test]
    fn empty_config() {
        let config = defaulted("apiVersion: skaffold/v2alpha1\nkind: Config\n");
        assert_eq!(config.build.tag_policy, Some(TagPolicy::GitCommit(GitTagger::default())));
        assert_eq!(
            config.build.build_type,
            Some(BuildType::Local(LocalBuild::default()))
        );
        assert_eq!(
            config.deploy.deploy_type,
            Some(DeployType::Kubectl(KubectlDeploy {
                manifests: vec!["k8s/*.yaml".into()],
                ..Default::default()
            }))
        );
    }

    #[test]
    fn artifacts() {
        let config = defaulted(
            r#"
build:
  artifacts:
  - image: untyped
  - image: custom
    context: ./custom
    custom:
      buildCommand: ./build.sh
  - image: buildpacks
    buildpacks:
      builder: heroku/buildpacks
"#,
        );
        let artifacts = &config.build.artifacts;
        assert_eq!(artifacts[0].context, ".");
        assert_eq!(
            artifacts[0].artifact_type,
            Some(ArtifactType::Docker(DockerArtifact {
                dockerfile: "Dockerfile".into(),
                ..Default::default()
            }))
        );
        assert_eq!(artifacts[1].context, "./custom");
        assert_eq!(
            artifacts[1].artifact_type,
            Some(ArtifactType::Custom(CustomArtifact {
                build_command: "./build.sh".into(),
                dependencies: Some(CustomDependencies {
                    paths: vec![".".into()],
                    ..Default::default()
                }),
            }))
        );
        match &artifacts[2].artifact_type {
            Some(ArtifactType::Buildpacks(b)) => assert_eq!(b.project_descriptor, "project.toml"),
            other => panic!("unexpected artifact type {other:?}"),
        }
    }

    #[test]
    fn custom_dependencies_from_a_dockerfile_or_command_get_no_paths() {
        let config = defaulted(
            r#"
build:
  artifacts:
  - image: from-dockerfile
    custom:
      dependencies:
        dockerfile:
          path: Dockerfile.custom
  - image: from-command
    custom:
      dependencies:
        command: ./deps.sh
"#,
        );
        for artifact in &config.build.artifacts {
            match &artifact.artifact_type {
                Some(ArtifactType::Custom(custom)) => {
                    let dependencies = custom.dependencies.as_ref().unwrap();
                    assert!(dependencies.paths.is_empty(), "{}", artifact.image)
                }
                other => panic!("unexpected artifact type {other:?}"),
            }
        }
    }

    #[test]
    fn cluster_and_kaniko() {
        let config = defaulted(
            r#"
build:
  cluster:
    namespace: builds
  artifacts:
  - image: app
    kaniko: {}
"#,
        );
        assert_eq!(
            config.build.build_type,
            Some(BuildType::Cluster(ClusterDetails {
                pull_secret_name: "kaniko-secret".into(),
                namespace: "builds".into(),
                timeout: "20m".into(),
                ..Default::default()
            }))
        );
        assert_eq!(
            config.build.artifacts[0].artifact_type,
            Some(ArtifactType::Kaniko(KanikoArtifact {
                dockerfile: "Dockerfile".into(),
                image: "gcr.io/kaniko-project/executor:v0.10.0".into(),
                ..Default::default()
            }))
        );
    }

    #[test]
    fn explicit_values_are_kept() {
        let config = defaulted(
            r#"
build:
  tagPolicy:
    sha256: {}
  googleCloudBuild:
    dockerImage: gcr.io/my/docker
deploy:
  kustomize: {}
"#,
        );
        assert_eq!(config.build.tag_policy, Some(TagPolicy::Sha256(Default::default())));
        match &config.build.build_type {
            Some(BuildType::GoogleCloudBuild(gcb)) => assert_eq!(gcb.docker_image, "gcr.io/my/docker"),
            other => panic!("unexpected build type {other:?}"),
        }
        assert_eq!(
            config.deploy.deploy_type,
            Some(DeployType::Kustomize(KustomizeDeploy {
                paths: vec![".".into()],
                ..Default::default()
            }))
        );
    }

    #[test]
    fn defaults_come_from_tool_config() {
        let mut config = Config::default();
        let defaults = Defaults {
            kubectl_manifests: vec!["deploy/*.yml".into()],
            ..Defaults::default()
        };
        set(&mut config, &defaults);
        assert_eq!(
            config.deploy.deploy_type,
            Some(DeployType::Kubectl(KubectlDeploy {
                manifests: vec!["deploy/*.yml".into()],
                ..Default::default()
            }))
        );
    }
}
