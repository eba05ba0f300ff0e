use super::*;
use crate::schema::v1beta12 as next;
use crate::schema::{IntoNext, UpgradeError, Warning};

carry_over!(next =>
    TagPolicy { git_commit, sha256, env_template, date_time },
    GitTagger { variant },
    ShaTagger {},
    EnvTemplateTagger { template },
    DateTimeTagger { format, timezone },
    LocalBuild { push, use_docker_cli, use_buildkit },
    GoogleCloudBuild { project_id, disk_size_gb, machine_type, timeout, docker_image, maven_image, gradle_image },
    ClusterDetails { pull_secret, pull_secret_name, namespace, timeout, docker_config },
    DockerConfig { path, secret_name },
    KanikoBuildContext { gcs_bucket, local_dir },
    LocalDir {},
    KanikoCache { repo },
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
    KubectlDeploy { manifests, remote_manifests, flags },
    KubectlFlags { global, apply, delete },
    HelmDeploy { releases, flags },
    HelmDeployFlags { global, install, upgrade },
    KustomizeDeploy { path, flags },
    HelmPackaged { version, app_version },
    HelmImageStrategy { fqn, helm },
    HelmFqnConfig { property },
    JsonPatch { op, path, from, value },
    Activation { env, kube_context, command },
);

impl IntoNext<next::BuildConfig> for BuildConfig {
    fn into_next(self) -> next::BuildConfig {
        let BuildConfig {
            artifacts,
            tag_policy,
            local,
            google_cloud_build,
            cluster,
        } = self;
        next::BuildConfig {
            artifacts: artifacts.into_next(),
            insecure_registries: vec![],
            tag_policy: tag_policy.into_next(),
            local: local.into_next(),
            google_cloud_build: google_cloud_build.into_next(),
            cluster: cluster.into_next(),
        }
    }
}

impl IntoNext<next::DeployConfig> for DeployConfig {
    fn into_next(self) -> next::DeployConfig {
        let DeployConfig {
            helm,
            kubectl,
            kustomize,
        } = self;
        next::DeployConfig {
            status_check_deadline_seconds: None,
            helm: helm.into_next(),
            kubectl: kubectl.into_next(),
            kustomize: kustomize.into_next(),
        }
    }
}

impl IntoNext<next::HelmRelease> for HelmRelease {
    fn into_next(self) -> next::HelmRelease {
        let HelmRelease {
            name,
            chart_path,
            values_files,
            values,
            namespace,
            version,
            set_values,
            set_value_templates,
            wait,
            recreate_pods,
            skip_build_dependencies,
            overrides,
            packaged,
            image_strategy,
        } = self;
        next::HelmRelease {
            name,
            chart_path,
            values_files,
            values,
            namespace,
            version,
            set_values,
            set_value_templates,
            wait,
            recreate_pods,
            skip_build_dependencies,
            use_helm_secrets: false,
            remote: false,
            overrides,
            packaged: packaged.into_next(),
            image_strategy: image_strategy.into_next(),
        }
    }
}

impl IntoNext<next::HelmConventionConfig> for HelmConventionConfig {
    fn into_next(self) -> next::HelmConventionConfig {
        let HelmConventionConfig {} = self;
        next::HelmConventionConfig {
            explicit_registry: false,
        }
    }
}

impl IntoNext<next::Profile> for Profile {
    fn into_next(self) -> next::Profile {
        let Profile {
            name,
            build,
            test,
            deploy,
            patches,
            activation,
        } = self;
        next::Profile {
            name,
            build: build.into_next(),
            test: test.into_next(),
            deploy: deploy.into_next(),
            port_forward: vec![],
            patches: patches.into_next(),
            activation: activation.into_next(),
        }
    }
}

impl Config {
    /// Only additions: metadata, port forwarding, insecure registries, the
    /// rollout status deadline and more helm settings.
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
            metadata: next::Metadata::default(),
            build: build.into_next(),
            test: test.into_next(),
            deploy: deploy.into_next(),
            port_forward: vec![],
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
apiVersion: skaffold/v1beta11
kind: Config
build:
  tagPolicy:
    gitCommit:
      variant: AbbrevTreeSha
  artifacts:
  - image: app
    sync:
      infer: ["**/*.html"]
    custom:
      buildCommand: ./build.sh
      dependencies:
        dockerfile:
          path: Dockerfile
          buildArgs:
            FLAG: null
  - image: other
    docker:
      network: host
      noCache: true
deploy:
  helm:
    releases:
    - name: app
      chartPath: charts/app
      imageStrategy:
        helm: {}
profiles:
- name: dev
  activation:
  - env: ENV=dev
"#;
        let config: Config = serde_yaml::from_str(doc).unwrap();
        let upgraded = config.upgrade(&mut vec![]).unwrap();
        let expected: next::Config =
            serde_yaml::from_str(&doc.replace("v1beta11", "v1beta12")).unwrap();
        assert_eq!(upgraded, expected);
    }
}
