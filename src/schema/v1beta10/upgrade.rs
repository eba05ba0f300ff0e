use super::*;
use crate::schema::v1beta11 as next;
use crate::schema::{IntoNext, UpgradeError, Warning};

carry_over!(next =>
    BuildConfig { artifacts, tag_policy, local, google_cloud_build, cluster },
    TagPolicy { git_commit, sha256, env_template, date_time },
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
    SyncRule { src, dest, strip },
    BazelArtifact { target, args },
    JibMavenArtifact { module, profile, args },
    JibGradleArtifact { project, args },
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
    Profile { name, build, test, deploy, patches, activation },
    JsonPatch { op, path, from, value },
    Activation { env, kube_context, command },
);

impl IntoNext<next::GitTagger> for GitTagger {
    fn into_next(self) -> next::GitTagger {
        let GitTagger {} = self;
        next::GitTagger {
            variant: String::new(),
        }
    }
}

impl IntoNext<next::Sync> for Sync {
    fn into_next(self) -> next::Sync {
        let Sync { manual } = self;
        next::Sync {
            manual: manual.into_next(),
            infer: vec![],
        }
    }
}

impl IntoNext<next::Artifact> for Artifact {
    fn into_next(self) -> next::Artifact {
        let Artifact {
            image,
            context,
            sync,
            docker,
            bazel,
            jib_maven,
            jib_gradle,
            kaniko,
        } = self;
        next::Artifact {
            image,
            context,
            sync: sync.into_next(),
            docker: docker.into_next(),
            bazel: bazel.into_next(),
            jib_maven: jib_maven.into_next(),
            jib_gradle: jib_gradle.into_next(),
            kaniko: kaniko.into_next(),
            custom: None,
        }
    }
}

impl IntoNext<next::DockerArtifact> for DockerArtifact {
    fn into_next(self) -> next::DockerArtifact {
        let DockerArtifact {
            dockerfile,
            target,
            build_args,
            cache_from,
        } = self;
        next::DockerArtifact {
            dockerfile,
            target,
            build_args,
            network: String::new(),
            cache_from,
            no_cache: false,
        }
    }
}

impl IntoNext<next::KanikoArtifact> for KanikoArtifact {
    fn into_next(self) -> next::KanikoArtifact {
        let KanikoArtifact {
            flags,
            dockerfile,
            target,
            build_args,
            build_context,
            image,
            cache,
        } = self;
        next::KanikoArtifact {
            flags,
            dockerfile,
            target,
            build_args,
            build_context: build_context.into_next(),
            image,
            cache: cache.into_next(),
            reproducible: false,
        }
    }
}

impl Config {
    /// Only additions: custom artifacts, inferred sync, tagger variants and
    /// more docker and kaniko settings. Nothing existing changes.
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
apiVersion: skaffold/v1beta10
kind: Config
build:
  tagPolicy:
    gitCommit: {}
  artifacts:
  - image: app
    sync:
      manual:
      - src: "src/**/*.js"
        dest: /app
        strip: src/
    docker:
      dockerfile: Dockerfile.dev
      cacheFrom: [app:latest]
  - image: cluster-built
    kaniko:
      buildContext:
        gcsBucket: my-bucket
      cache:
        repo: gcr.io/cache
  cluster:
    namespace: builds
    dockerConfig:
      secretName: docker-cfg
deploy:
  kustomize:
    path: overlays/dev
profiles:
- name: gcb
  build:
    googleCloudBuild:
      projectId: k8s-skaffold
      mavenImage: maven:3
  patches:
  - op: remove
    path: /build/artifacts/1
"#;
        let config: Config = serde_yaml::from_str(doc).unwrap();
        let upgraded = config.upgrade(&mut vec![]).unwrap();
        let expected: next::Config =
            serde_yaml::from_str(&doc.replace("v1beta10", "v1beta11")).unwrap();
        assert_eq!(upgraded, expected);
    }
}
