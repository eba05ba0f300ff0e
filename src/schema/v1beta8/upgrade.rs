use super::*;
use crate::schema::v1beta9 as next;
use crate::schema::{IntoNext, UpgradeError, Warning};

carry_over!(next =>
    TagPolicy { git_commit, sha256, env_template, date_time },
    GitTagger {},
    ShaTagger {},
    EnvTemplateTagger { template },
    DateTimeTagger { format, timezone },
    GoogleCloudBuild { project_id, disk_size_gb, machine_type, timeout, docker_image, maven_image, gradle_image },
    KanikoBuildContext { gcs_bucket, local_dir },
    LocalDir {},
    KanikoCache { repo },
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
    Activation { env, kube_context, command },
    DockerArtifact { dockerfile, target, build_args, cache_from },
    BazelArtifact { target, args },
    JibMavenArtifact { module, profile, args },
    JibGradleArtifact { project, args },
);

impl IntoNext<next::LocalBuild> for LocalBuild {
    fn into_next(self) -> next::LocalBuild {
        let LocalBuild {
            push,
            use_docker_cli,
            use_buildkit,
        } = self;
        next::LocalBuild {
            skip_push: push.map(|push| !push),
            use_docker_cli,
            use_buildkit,
        }
    }
}

/// Patch paths whose target moved. Matched on whole pointer segments.
const PATCH_PATHS: &[(&str, &str)] = &[
    ("/build/kaniko/pullSecret", "/build/cluster/pullSecret"),
    ("/build/kaniko/pullSecretName", "/build/cluster/pullSecretName"),
    ("/build/kaniko/namespace", "/build/cluster/namespace"),
    ("/build/kaniko/timeout", "/build/cluster/timeout"),
    ("/build/kaniko/dockerConfig", "/build/cluster/dockerConfig"),
];

impl Config {
    /// A kaniko build becomes a cluster build whose artifacts are kaniko
    /// artifacts carrying the executor settings. `push` turns into
    /// `skipPush`.
    pub fn upgrade(self, _warnings: &mut Vec<Warning>) -> Result<next::Config, UpgradeError> {
        let Config {
            api_version: _,
            kind,
            build,
            test,
            deploy,
            profiles,
        } = self;
        let base_has_artifacts = !build.artifacts.is_empty();
        let (build, executor) = upgrade_build(build, None)?;
        Ok(next::Config {
            api_version: next::VERSION.to_string(),
            kind,
            build,
            test: test.into_next(),
            deploy: deploy.into_next(),
            profiles: profiles
                .into_iter()
                .map(|profile| upgrade_profile(profile, executor.as_ref(), base_has_artifacts))
                .collect::<Result<_, _>>()?,
        })
    }
}

/// Executor settings that used to live on the kaniko build and now belong
/// to each artifact.
#[derive(Default, PartialEq)]
struct KanikoExecutor {
    build_context: Option<next::KanikoBuildContext>,
    cache: Option<next::KanikoCache>,
    flags: Vec<String>,
    image: String,
}

/// Profile artifacts without a build type of their own are built by the base
/// build type, so a base kaniko executor applies to them too.
fn upgrade_profile(
    profile: Profile,
    base: Option<&KanikoExecutor>,
    base_has_artifacts: bool,
) -> Result<next::Profile, UpgradeError> {
    let Profile {
        name,
        build,
        test,
        deploy,
        patches,
        activation,
    } = profile;

    let own_build_type =
        build.local.is_some() || build.google_cloud_build.is_some() || build.kaniko.is_some();
    if let Some(kaniko) = &build.kaniko {
        let (_, executor) = split_kaniko(kaniko.clone());
        if build.artifacts.is_empty() && (base_has_artifacts || executor != KanikoExecutor::default()) {
            return Err(UpgradeError::KanikoProfileWithoutArtifacts { profile: name });
        }
    }
    let inherited = if own_build_type { None } else { base };

    let (build, _) = upgrade_build(build, inherited)?;
    Ok(next::Profile {
        name,
        build,
        test: test.into_next(),
        deploy: deploy.into_next(),
        patches: patches.into_iter().map(upgrade_patch).collect(),
        activation: activation.into_next(),
    })
}

fn upgrade_patch(patch: JsonPatch) -> next::JsonPatch {
    let JsonPatch {
        op,
        path,
        from,
        value,
    } = patch;
    next::JsonPatch {
        op,
        path: migrate_path(path),
        from: migrate_path(from),
        value,
    }
}

fn migrate_path(path: String) -> String {
    for (old, new) in PATCH_PATHS {
        if let Some(rest) = path.strip_prefix(old) {
            if rest.is_empty() || rest.starts_with('/') {
                return format!("{new}{rest}");
            }
        }
    }
    path
}

fn upgrade_build(
    build: BuildConfig,
    inherited: Option<&KanikoExecutor>,
) -> Result<(next::BuildConfig, Option<KanikoExecutor>), UpgradeError> {
    let BuildConfig {
        artifacts,
        tag_policy,
        local,
        google_cloud_build,
        kaniko,
    } = build;

    let (cluster, executor) = match kaniko {
        Some(kaniko) => {
            let (cluster, executor) = split_kaniko(kaniko);
            (Some(cluster), Some(executor))
        }
        None => (None, None),
    };
    let applied = executor.as_ref().or(inherited);
    let artifacts = artifacts
        .into_iter()
        .map(|artifact| upgrade_artifact(artifact, applied))
        .collect::<Result<_, _>>()?;

    Ok((
        next::BuildConfig {
            artifacts,
            tag_policy: tag_policy.into_next(),
            local: local.into_next(),
            google_cloud_build: google_cloud_build.into_next(),
            cluster,
        },
        executor,
    ))
}

fn split_kaniko(kaniko: KanikoBuild) -> (next::ClusterDetails, KanikoExecutor) {
    let KanikoBuild {
        build_context,
        cache,
        flags,
        pull_secret,
        pull_secret_name,
        namespace,
        timeout,
        image,
        docker_config,
    } = kaniko;
    (
        next::ClusterDetails {
            pull_secret,
            pull_secret_name,
            namespace,
            timeout,
            docker_config: docker_config.into_next(),
        },
        KanikoExecutor {
            build_context: build_context.into_next(),
            cache: cache.into_next(),
            flags,
            image,
        },
    )
}

fn upgrade_artifact(
    artifact: Artifact,
    executor: Option<&KanikoExecutor>,
) -> Result<next::Artifact, UpgradeError> {
    let Artifact {
        image,
        context,
        sync,
        docker,
        bazel,
        jib_maven,
        jib_gradle,
    } = artifact;
    let Some(executor) = executor else {
        return Ok(next::Artifact {
            image,
            context,
            sync,
            docker: docker.into_next(),
            bazel: bazel.into_next(),
            jib_maven: jib_maven.into_next(),
            jib_gradle: jib_gradle.into_next(),
            kaniko: None,
        });
    };

    let other = [
        (bazel.is_some(), "bazel"),
        (jib_maven.is_some(), "jibMaven"),
        (jib_gradle.is_some(), "jibGradle"),
    ]
    .into_iter()
    .find_map(|(set, key)| set.then_some(key));
    if let Some(artifact_type) = other {
        return Err(UpgradeError::ClusterArtifact {
            image,
            artifact_type,
        });
    }
    let DockerArtifact {
        dockerfile,
        target,
        build_args,
        cache_from,
    } = docker.unwrap_or_default();
    if !cache_from.is_empty() {
        return Err(UpgradeError::ClusterCacheFrom { image });
    }
    Ok(next::Artifact {
        image,
        context,
        sync,
        kaniko: Some(next::KanikoArtifact {
            flags: executor.flags.clone(),
            dockerfile,
            target,
            build_args,
            build_context: executor.build_context.clone(),
            image: executor.image.clone(),
            cache: executor.cache.clone(),
        }),
        ..Default::default()
    })
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
    fn kaniko_becomes_cluster() {
        let doc = r#"
apiVersion: skaffold/v1beta8
kind: Config
build:
  artifacts:
  - image: app
    docker:
      dockerfile: Dockerfile.app
      buildArgs:
        VERSION: "1"
  - image: untyped
    sync:
      "*.html": /srv
  kaniko:
    buildContext:
      gcsBucket: my-bucket
    cache:
      repo: gcr.io/cache
    flags: [--verbosity=debug]
    pullSecretName: kaniko-secret
    namespace: builds
    timeout: 30m
    image: gcr.io/kaniko-project/executor:v0.10.0
    dockerConfig:
      secretName: docker-cfg
profiles:
- name: cluster
  patches:
  - path: /build/kaniko/namespace
    value: other
  - op: copy
    from: /build/kaniko/timeout
    path: /build/kaniko/pullSecret
"#;
        let expected = r#"
apiVersion: skaffold/v1beta9
kind: Config
build:
  artifacts:
  - image: app
    kaniko:
      dockerfile: Dockerfile.app
      buildArgs:
        VERSION: "1"
      buildContext:
        gcsBucket: my-bucket
      cache:
        repo: gcr.io/cache
      flags: [--verbosity=debug]
      image: gcr.io/kaniko-project/executor:v0.10.0
  - image: untyped
    sync:
      "*.html": /srv
    kaniko:
      buildContext:
        gcsBucket: my-bucket
      cache:
        repo: gcr.io/cache
      flags: [--verbosity=debug]
      image: gcr.io/kaniko-project/executor:v0.10.0
  cluster:
    pullSecretName: kaniko-secret
    namespace: builds
    timeout: 30m
    dockerConfig:
      secretName: docker-cfg
profiles:
- name: cluster
  patches:
  - path: /build/cluster/namespace
    value: other
  - op: copy
    from: /build/cluster/timeout
    path: /build/cluster/pullSecret
"#;
        let expected: next::Config = serde_yaml::from_str(expected).unwrap();
        assert_eq!(upgrade(doc).unwrap(), expected);
    }

    #[test]
    fn push_becomes_skip_push() {
        let doc = r#"
build:
  local:
    push: true
profiles:
- name: quiet
  build:
    local:
      push: false
- name: unset
  build:
    local:
      useDockerCLI: true
"#;
        let upgraded = upgrade(doc).unwrap();
        let skip_push = |build: &next::BuildConfig| build.local.as_ref().unwrap().skip_push;
        assert_eq!(skip_push(&upgraded.build), Some(false));
        assert_eq!(skip_push(&upgraded.profiles[0].build), Some(true));
        assert_eq!(skip_push(&upgraded.profiles[1].build), None);
    }

    #[test]
    fn profile_artifacts_inherit_the_base_executor() {
        let doc = r#"
build:
  artifacts:
  - image: app
  kaniko:
    image: my/executor
profiles:
- name: other-images
  build:
    artifacts:
    - image: other
      docker:
        dockerfile: Dockerfile.other
- name: local
  build:
    artifacts:
    - image: other
    local: {}
"#;
        let upgraded = upgrade(doc).unwrap();
        assert_eq!(
            upgraded.profiles[0].build.artifacts[0].kaniko,
            Some(next::KanikoArtifact {
                dockerfile: "Dockerfile.other".into(),
                image: "my/executor".into(),
                ..Default::default()
            })
        );
        assert_eq!(upgraded.profiles[1].build.artifacts[0].kaniko, None);
    }

    #[test]
    fn kaniko_profile_without_artifacts() {
        let doc = r#"
build:
  artifacts:
  - image: app
    docker:
      dockerfile: Dockerfile.prod
profiles:
- name: incluster
  build:
    kaniko:
      buildContext:
        gcsBucket: my-bucket
      image: my/executor
"#;
        match upgrade(doc).unwrap_err() {
            UpgradeError::KanikoProfileWithoutArtifacts { profile } => {
                assert_eq!(profile, "incluster")
            }
            other => panic!("unexpected error: {other}"),
        }

        // Nothing to re-express: no base artifacts and no executor settings.
        let doc = "profiles:\n- name: incluster\n  build:\n    kaniko:\n      namespace: builds\n";
        let upgraded = upgrade(doc).unwrap();
        assert!(upgraded.profiles[0].build.cluster.is_some());
    }

    #[test]
    fn non_docker_artifact_under_kaniko() {
        let doc = r#"
build:
  artifacts:
  - image: app
    bazel:
      target: //:app.tar
  kaniko: {}
"#;
        match upgrade(doc).unwrap_err() {
            UpgradeError::ClusterArtifact {
                image,
                artifact_type,
            } => {
                assert_eq!(image, "app");
                assert_eq!(artifact_type, "bazel");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn cache_from_under_kaniko() {
        let doc = r#"
build:
  artifacts:
  - image: app
    docker:
      cacheFrom: [app:latest]
  kaniko: {}
"#;
        assert!(matches!(
            upgrade(doc).unwrap_err(),
            UpgradeError::ClusterCacheFrom { .. }
        ));
    }

    #[test]
    fn unrelated_patch_paths_are_kept() {
        assert_eq!(
            migrate_path("/build/kaniko/pullSecretNameX".into()),
            "/build/kaniko/pullSecretNameX"
        );
        assert_eq!(
            migrate_path("/build/kaniko/dockerConfig/path".into()),
            "/build/cluster/dockerConfig/path"
        );
        assert_eq!(migrate_path("/deploy/helm".into()), "/deploy/helm");
        assert_eq!(migrate_path(String::new()), "");
    }
}
