use super::*;
use crate::schema::v1beta7 as next;
use crate::schema::{IntoNext, UpgradeError, Warning};

carry_over!(next =>
    BuildConfig { artifacts, tag_policy, execution_environment, local, google_cloud_build, kaniko },
    ExecutionEnvironment { name, properties },
    BuilderPlugin { name, properties },
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
    Artifact { image, context, sync, docker, bazel, jib_maven, jib_gradle, plugin },
    Profile { name, build, test, deploy, patches, activation },
    JsonPatch { op, path, from, value },
    Activation { env, kube_context, command },
    DockerArtifact { dockerfile, target, build_args, cache_from },
    BazelArtifact { target, args },
    JibMavenArtifact { module, profile, args },
    JibGradleArtifact { project, args },
);

impl Config {
    /// Same shape, new tag.
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
            build: build.into_next(),
            test: test.into_next(),
            deploy: deploy.into_next(),
            profiles: profiles.into_next(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn everything_is_carried_over() {
        let doc = r#"
apiVersion: skaffold/v1beta6
kind: Config
build:
  tagPolicy:
    envTemplate:
      template: "{{.IMAGE_NAME}}:{{.VERSION}}"
  artifacts:
  - image: gcr.io/k8s-skaffold/app
    sync:
      "*.js": .
    plugin:
      name: docker
      properties:
        dockerfile: Dockerfile.dev
  executionEnvironment:
    name: googleCloudBuild
    properties:
      projectId: k8s-skaffold
deploy:
  helm:
    flags:
      install: [--atomic]
    releases:
    - name: app
      chartPath: charts/app
      setValueTemplates:
        image.tag: "{{.DIGEST}}"
      overrides:
        replicas: 2
      imageStrategy:
        fqn:
          property: image
profiles:
- name: dev
  activation:
  - kubeContext: minikube
  patches:
  - path: /build/artifacts/0/image
    value: app-dev
"#;
        let config: Config = serde_yaml::from_str(doc).unwrap();
        let upgraded = config.upgrade(&mut vec![]).unwrap();
        let expected: next::Config =
            serde_yaml::from_str(&doc.replace("v1beta6", "v1beta7")).unwrap();
        assert_eq!(upgraded, expected);
    }
}
