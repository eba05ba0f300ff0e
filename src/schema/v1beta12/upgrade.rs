use super::*;
use crate::schema::v1beta13 as next;
use crate::schema::{IntoNext, UpgradeError, Warning};

carry_over!(next =>
    Config { api_version, kind, metadata, build, test, deploy, port_forward, profiles },
    Metadata { name },
    PortForwardResource { resource_type, resource_name, namespace, port, local_port },
    BuildConfig { artifacts, insecure_registries, tag_policy, local, google_cloud_build, cluster },
    TagPolicy { git_commit, sha256, env_template, date_time },
    GitTagger { variant },
    ShaTagger {},
    EnvTemplateTagger { template },
    DateTimeTagger { format, timezone },
    GoogleCloudBuild { project_id, disk_size_gb, machine_type, timeout, docker_image, maven_image, gradle_image },
    DockerConfig { path, secret_name },
    KanikoBuildContext { gcs_bucket, local_dir },
    Artifact { image, context, sync, docker, bazel, jib_maven, jib_gradle, kaniko, custom },
    Sync { manual, infer },
    SyncRule { src, dest, strip },
    DockerArtifact { dockerfile, target, build_args, network, cache_from, no_cache },
    KanikoArtifact { flags, dockerfile, target, build_args, build_context, image, cache, reproducible },
    CustomArtifact { build_command, dependencies },
    CustomDependencies { dockerfile, command, paths, ignore },
    DockerfileDependency { path, build_args },
    BazelArtifact { target, args },
    JibMavenArtifact { module, profile, args },
    JibGradleArtifact { project, args },
    TestCase { image, structure_tests },
    DeployConfig { status_check_deadline_seconds, helm, kubectl, kustomize },
    KubectlDeploy { manifests, remote_manifests, flags },
    KubectlFlags { global, apply, delete },
    HelmDeploy { releases, flags },
    HelmDeployFlags { global, install, upgrade },
    KustomizeDeploy { path, flags },
    HelmRelease {
        name, chart_path, values_files, values, namespace, version, set_values, set_value_templates,
        wait, recreate_pods, skip_build_dependencies, use_helm_secrets, remote, overrides, packaged,
        image_strategy
    },
    HelmPackaged { version, app_version },
    HelmImageStrategy { fqn, helm },
    HelmFqnConfig { property },
    HelmConventionConfig { explicit_registry },
    Profile { name, build, test, deploy, port_forward, patches, activation },
    JsonPatch { op, path, from, value },
    Activation { env, kube_context, command },
);

impl IntoNext<next::LocalBuild> for LocalBuild {
    fn into_next(self) -> next::LocalBuild {
        let LocalBuild {
            push,
            use_docker_cli,
            use_buildkit,
        } = self;
        next::LocalBuild {
            push,
            use_docker_cli,
            use_buildkit: use_buildkit.unwrap_or(false),
        }
    }
}

impl IntoNext<next::ClusterDetails> for ClusterDetails {
    fn into_next(self) -> next::ClusterDetails {
        let ClusterDetails {
            pull_secret,
            pull_secret_name,
            namespace,
            timeout,
            docker_config,
        } = self;
        next::ClusterDetails {
            http_proxy: String::new(),
            https_proxy: String::new(),
            pull_secret,
            pull_secret_name,
            namespace,
            timeout,
            docker_config: docker_config.into_next(),
            resources: None,
        }
    }
}

impl IntoNext<next::LocalDir> for LocalDir {
    fn into_next(self) -> next::LocalDir {
        let LocalDir {} = self;
        next::LocalDir {
            init_image: String::new(),
        }
    }
}

impl IntoNext<next::KanikoCache> for KanikoCache {
    fn into_next(self) -> next::KanikoCache {
        let KanikoCache { repo } = self;
        next::KanikoCache {
            repo,
            host_path: String::new(),
        }
    }
}

impl Config {
    /// Adds proxy and resource settings for cluster builds and makes
    /// `useBuildkit` a plain flag, unset meaning off.
    pub fn upgrade(self, _warnings: &mut Vec<Warning>) -> Result<next::Config, UpgradeError> {
        let mut config: next::Config = self.into_next();
        config.api_version = next::VERSION.to_string();
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn upgrade(doc: &str) -> next::Config {
        let config: Config = serde_yaml::from_str(doc).unwrap();
        config.upgrade(&mut vec![]).unwrap()
    }

    #[test]
    fn unset_buildkit_is_off() {
        let upgraded = upgrade(
            r#"
apiVersion: skaffold/v1beta12
build:
  local:
    push: false
profiles:
- name: buildkit
  build:
    local:
      useBuildkit: true
- name: classic
  build:
    local:
      useBuildkit: false
"#,
        );
        assert_eq!(upgraded.api_version, "skaffold/v1beta13");
        let local = upgraded.build.local.unwrap();
        assert_eq!((local.push, local.use_buildkit), (Some(false), false));
        let buildkit: Vec<_> = upgraded
            .profiles
            .iter()
            .map(|p| p.build.local.as_ref().unwrap().use_buildkit)
            .collect();
        assert_eq!(buildkit, vec![true, false]);
    }

    #[test]
    fn cluster_settings_are_carried_over() {
        let doc = r#"
apiVersion: skaffold/v1beta12
kind: Config
metadata:
  name: app
build:
  insecureRegistries: [localhost:5000]
  artifacts:
  - image: app
    kaniko:
      buildContext:
        localDir: {}
      cache:
        repo: gcr.io/cache
  cluster:
    pullSecretName: kaniko-secret
    dockerConfig:
      path: ~/.docker/config.json
deploy:
  statusCheckDeadlineSeconds: 120
  kubectl: {}
portForward:
- resourceType: deployment
  resourceName: app
  port: 8080
  localPort: 9000
"#;
        let expected: next::Config =
            serde_yaml::from_str(&doc.replace("v1beta12", "v1beta13")).unwrap();
        assert_eq!(upgrade(doc), expected);
    }
}
